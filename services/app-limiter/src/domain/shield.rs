//! 屏蔽策略与执行状态

use std::collections::BTreeSet;

use serde::Serialize;

use super::selection::Selection;
use super::token::{ApplicationToken, CategoryToken, WebDomainToken};

/// 单个屏蔽目标的配置
///
/// `None` 表示"未配置"，与"配置为空集合"不同：执行层区分这两种状态，
/// 因此 `Specific` 永远不持有空集合，统一通过 [`ShieldPolicy::from_set`] 构造
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "tokens", rename_all = "camelCase")]
pub enum ShieldPolicy<T: Ord> {
    None,
    Specific(BTreeSet<T>),
}

impl<T: Ord> Default for ShieldPolicy<T> {
    fn default() -> Self {
        Self::None
    }
}

impl<T: Ord> ShieldPolicy<T> {
    pub fn from_set(tokens: BTreeSet<T>) -> Self {
        if tokens.is_empty() {
            Self::None
        } else {
            Self::Specific(tokens)
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Specific(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Specific(tokens) => tokens.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tokens(&self) -> Option<&BTreeSet<T>> {
        match self {
            Self::None => None,
            Self::Specific(tokens) => Some(tokens),
        }
    }

    pub fn contains(&self, token: &T) -> bool {
        self.tokens().is_some_and(|tokens| tokens.contains(token))
    }
}

/// 域名屏蔽范围：域名令牌及其所依附的父应用（浏览器）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainScope {
    pub domains: BTreeSet<WebDomainToken>,
    pub parent_application: ApplicationToken,
}

/// 最近一次成功下发的输入
///
/// [`EnforcementState`] 只由它推导，从不单独修改
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedPolicy {
    pub application_tokens: BTreeSet<ApplicationToken>,
    pub category_tokens: BTreeSet<CategoryToken>,
    pub domain_scope: Option<DomainScope>,
    pub content_filter_enabled: bool,
}

impl AppliedPolicy {
    /// 替换应用与分类部分，域名与内容过滤保持不变
    pub fn with_selection(&self, selection: &Selection) -> Self {
        Self {
            application_tokens: selection.application_tokens.clone(),
            category_tokens: selection.category_tokens.clone(),
            ..self.clone()
        }
    }

    /// 替换域名部分，空集合视为清除
    pub fn with_domains(&self, domains: BTreeSet<WebDomainToken>, parent: &ApplicationToken) -> Self {
        let domain_scope = (!domains.is_empty()).then(|| DomainScope {
            domains,
            parent_application: parent.clone(),
        });
        Self {
            domain_scope,
            ..self.clone()
        }
    }

    pub fn derive_state(&self) -> EnforcementState {
        EnforcementState::derive(self)
    }
}

/// 执行状态：当前已推送到执行层的内容的镜像
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnforcementState {
    pub shielded_applications: ShieldPolicy<ApplicationToken>,
    pub shielded_categories: ShieldPolicy<CategoryToken>,
    pub blocked_domains: ShieldPolicy<WebDomainToken>,
    pub content_filter_enabled: bool,
}

impl EnforcementState {
    /// 由已下发的输入推导执行状态
    ///
    /// 域名屏蔽生效时父应用并入应用屏蔽集合；清除域名屏蔽后父应用随之移出，
    /// 但用户显式选择的应用仍保持屏蔽
    pub fn derive(applied: &AppliedPolicy) -> Self {
        let mut applications = applied.application_tokens.clone();
        let mut domains = BTreeSet::new();

        if let Some(scope) = &applied.domain_scope {
            if !scope.domains.is_empty() {
                applications.insert(scope.parent_application.clone());
                domains.extend(scope.domains.iter().cloned());
            }
        }

        Self {
            shielded_applications: ShieldPolicy::from_set(applications),
            shielded_categories: ShieldPolicy::from_set(applied.category_tokens.clone()),
            blocked_domains: ShieldPolicy::from_set(domains),
            content_filter_enabled: applied.content_filter_enabled,
        }
    }

    pub fn shielded_application_count(&self) -> usize {
        self.shielded_applications.len()
    }
}

//! 限制范围（Selection）

use std::collections::BTreeSet;

use super::token::{ApplicationToken, CategoryToken};

/// 控制方选择的限制范围
///
/// 三个集合均为有序集合：相等性只取决于元素，与插入顺序和重复无关
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub application_tokens: BTreeSet<ApplicationToken>,
    pub category_tokens: BTreeSet<CategoryToken>,
    /// 原始域名字符串，转换为令牌发生在执行层
    pub web_domains: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_applications<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.application_tokens
            .extend(tokens.into_iter().map(ApplicationToken::new));
        self
    }

    pub fn with_categories<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category_tokens
            .extend(tokens.into_iter().map(CategoryToken::new));
        self
    }

    pub fn with_web_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.web_domains.extend(domains.into_iter().map(Into::into));
        self
    }

    /// 应用与分类均为空
    ///
    /// 域名限制与应用限制相互独立，不参与判断
    pub fn is_empty(&self) -> bool {
        self.application_tokens.is_empty() && self.category_tokens.is_empty()
    }

    pub fn has_web_domains(&self) -> bool {
        !self.web_domains.is_empty()
    }

    pub fn application_count(&self) -> usize {
        self.application_tokens.len()
    }
}

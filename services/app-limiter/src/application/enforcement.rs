//! 执行层适配器
//!
//! 把策略转换为执行层推送，并维护执行状态镜像。
//! 所有会改变策略的推送都在同一把异步锁（mutation lane）内完成，
//! 远端策略下发与选择器回调不会交错写入

use std::collections::BTreeSet;
use std::sync::Arc;

use limiter_errors::{AppError, AppResult};
use limiter_telemetry::METRIC_ENFORCEMENT_PUSHES_TOTAL;
use metrics::counter;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{
    AppliedPolicy, ApplicationToken, EnforcementState, EnforcementStore, PolicyModel, Selection,
    WebDomainToken,
};

/// 本次推送涉及的目标
#[derive(Debug, Clone, Copy)]
struct PushTargets {
    applications: bool,
    categories: bool,
    domains: bool,
}

/// 域名屏蔽结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainShieldOutcome {
    /// 实际屏蔽的域名数量
    pub applied: usize,
    /// 无法转换为令牌而被丢弃的原始字符串
    pub rejected: Vec<String>,
}

/// 完整选择下发结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub state: EnforcementState,
    pub domains: DomainShieldOutcome,
}

/// 把域名字符串转换为令牌，返回 (令牌集合, 被丢弃的字符串)
pub fn convert_domains<I, S>(domains: I) -> (BTreeSet<WebDomainToken>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens = BTreeSet::new();
    let mut rejected = Vec::new();

    for domain in domains {
        let domain = domain.as_ref();
        match WebDomainToken::parse(domain) {
            Some(token) => {
                tokens.insert(token);
            }
            None => rejected.push(domain.to_string()),
        }
    }

    (tokens, rejected)
}

/// 执行层适配器
pub struct EnforcementAdapter {
    store: Arc<dyn EnforcementStore>,
    model: Arc<PolicyModel>,
    applied: Mutex<AppliedPolicy>,
}

impl EnforcementAdapter {
    pub fn new(store: Arc<dyn EnforcementStore>, model: Arc<PolicyModel>) -> Self {
        Self {
            store,
            model,
            applied: Mutex::new(AppliedPolicy::default()),
        }
    }

    /// 下发应用与分类屏蔽
    ///
    /// 空集合推送"未配置"而不是空集合
    pub async fn apply_app_and_category_shield(&self, selection: &Selection) -> AppResult<EnforcementState> {
        let mut applied = self.applied.lock().await;
        let next = applied.with_selection(selection);

        if selection.application_tokens.is_empty() {
            debug!("Empty application tokens, clearing application shield");
        }
        if selection.category_tokens.is_empty() {
            debug!("Empty category tokens, clearing category shield");
        }

        let state = self.push(
            &next,
            PushTargets {
                applications: true,
                categories: true,
                domains: false,
            },
        )?;
        *applied = next;

        info!(
            applications = state.shielded_applications.len(),
            categories = state.shielded_categories.len(),
            "Application and category shield applied"
        );
        Ok(state)
    }

    /// 下发域名屏蔽
    ///
    /// 无法转换的域名被丢弃并在结果中返回；过滤后为空时同时清除域名屏蔽和父应用屏蔽
    pub async fn apply_domain_shield<I, S>(
        &self,
        domains: I,
        parent_application: &ApplicationToken,
    ) -> AppResult<DomainShieldOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (tokens, rejected) = convert_domains(domains);
        if !rejected.is_empty() {
            warn!(rejected = ?rejected, "Dropping domains that cannot be converted to tokens");
        }

        let applied_count = tokens.len();
        let accepted: BTreeSet<String> = tokens.iter().map(|t| t.as_str().to_string()).collect();
        let mut applied = self.applied.lock().await;
        let next = applied.with_domains(tokens, parent_application);

        self.push(
            &next,
            PushTargets {
                applications: true,
                categories: false,
                domains: true,
            },
        )?;
        *applied = next;
        self.model.replace_web_domains(accepted).await;

        if applied_count == 0 {
            info!(parent = %parent_application, "Removed web domain and parent application shields");
        } else {
            info!(
                domains = applied_count,
                parent = %parent_application,
                "Web domain shield applied"
            );
        }

        Ok(DomainShieldOutcome {
            applied: applied_count,
            rejected,
        })
    }

    /// 下发完整选择（应用、分类、域名）并写入策略模型
    ///
    /// 等价于在同一次持锁内依次执行 [`Self::apply_app_and_category_shield`] 与
    /// [`Self::apply_domain_shield`]。只有全部推送成功后才更新策略模型与镜像，
    /// 模型中的域名是规范化后实际生效的集合
    pub async fn apply_selection(
        &self,
        selection: &Selection,
        parent_application: &ApplicationToken,
    ) -> AppResult<ApplyOutcome> {
        let (tokens, rejected) = convert_domains(&selection.web_domains);
        if !rejected.is_empty() {
            warn!(rejected = ?rejected, "Dropping domains that cannot be converted to tokens");
        }
        let applied_domains = tokens.len();
        let enforced = Selection {
            web_domains: tokens.iter().map(|t| t.as_str().to_string()).collect(),
            ..selection.clone()
        };

        let mut applied = self.applied.lock().await;
        let next = applied
            .with_selection(selection)
            .with_domains(tokens, parent_application);

        let state = self.push(
            &next,
            PushTargets {
                applications: true,
                categories: true,
                domains: true,
            },
        )?;
        *applied = next;
        self.model.set_selection(enforced).await;

        info!(
            applications = state.shielded_applications.len(),
            categories = state.shielded_categories.len(),
            domains = state.blocked_domains.len(),
            "Selection applied"
        );

        Ok(ApplyOutcome {
            state,
            domains: DomainShieldOutcome {
                applied: applied_domains,
                rejected,
            },
        })
    }

    /// 只记录选择，不推送
    ///
    /// 与推送共用 mutation lane，不会覆盖正在进行的下发所写入的模型
    pub async fn record_selection(&self, selection: Selection) {
        let _applied = self.applied.lock().await;
        self.model.set_selection(selection).await;
        debug!("Selection recorded without enforcement");
    }

    /// 设置内容过滤（幂等）
    pub async fn set_content_filter(&self, enabled: bool) -> AppResult<()> {
        let mut applied = self.applied.lock().await;

        let result = self.store.set_content_filter(enabled);
        record_push("content_filter", &result);
        result.map_err(push_failure)?;

        applied.content_filter_enabled = enabled;
        info!(enabled, "Content filter updated");
        Ok(())
    }

    /// 内容过滤是否开启，直接读取执行层
    pub fn is_content_filter_enabled(&self) -> AppResult<bool> {
        self.store.content_filter_enabled().map_err(push_failure)
    }

    /// 当前屏蔽的应用数量
    ///
    /// 优先使用执行层实际生效的数量；执行层未配置应用屏蔽时退回到策略模型中的选择数量
    pub async fn current_shielded_app_count(&self) -> AppResult<usize> {
        match self.store.shielded_application_count().map_err(push_failure)? {
            Some(count) => Ok(count),
            None => Ok(self.model.application_count().await),
        }
    }

    /// 当前执行状态镜像
    pub async fn current_state(&self) -> EnforcementState {
        self.applied.lock().await.derive_state()
    }

    /// 按目标推送，调用方必须持有 mutation lane
    fn push(&self, next: &AppliedPolicy, targets: PushTargets) -> AppResult<EnforcementState> {
        let state = next.derive_state();

        if targets.applications {
            let result = self.store.set_application_shield(&state.shielded_applications);
            record_push("applications", &result);
            result.map_err(push_failure)?;
        }
        if targets.categories {
            let result = self.store.set_category_shield(&state.shielded_categories);
            record_push("categories", &result);
            result.map_err(push_failure)?;
        }
        if targets.domains {
            let result = self.store.set_web_domain_shield(&state.blocked_domains);
            record_push("web_domains", &result);
            result.map_err(push_failure)?;
        }

        Ok(state)
    }
}

fn record_push<T>(target: &'static str, result: &AppResult<T>) {
    let outcome = if result.is_ok() { "ok" } else { "error" };
    counter!(METRIC_ENFORCEMENT_PUSHES_TOTAL, "target" => target, "outcome" => outcome).increment(1);
}

fn push_failure(error: AppError) -> AppError {
    match error {
        AppError::Enforcement(_) => error,
        other => AppError::enforcement(other.message().to_string()),
    }
}

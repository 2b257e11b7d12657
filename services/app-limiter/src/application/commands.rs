//! 命令与查询定义

use limiter_cqrs_core::{Command, Query};

use super::codec::EncodedPolicy;
use super::enforcement::{ApplyOutcome, DomainShieldOutcome};
use crate::domain::{AuthorizationMode, SelectionPurpose};

/// 展示选择器并返回编码后的选择（取消时为 None）
#[derive(Debug, Clone)]
pub struct BeginSelectionCommand {
    pub purpose: SelectionPurpose,
    pub apply_locally: bool,
}

impl Command for BeginSelectionCommand {
    type Result = Option<EncodedPolicy>;

    fn name(&self) -> &'static str {
        "begin_selection"
    }
}

/// 请求授权
#[derive(Debug, Clone)]
pub struct RequestAuthorizationCommand {
    pub mode: AuthorizationMode,
}

impl Command for RequestAuthorizationCommand {
    type Result = bool;

    fn name(&self) -> &'static str {
        "request_authorization"
    }
}

/// 应用远端下发的策略
#[derive(Debug, Clone)]
pub struct ApplyRemotePolicyCommand {
    pub encoded: EncodedPolicy,
}

impl Command for ApplyRemotePolicyCommand {
    type Result = ApplyOutcome;

    fn name(&self) -> &'static str {
        "apply_remote_policy"
    }
}

/// 开关内容过滤
#[derive(Debug, Clone)]
pub struct SetContentFilterCommand {
    pub enabled: bool,
}

impl Command for SetContentFilterCommand {
    type Result = bool;

    fn name(&self) -> &'static str {
        "set_content_filter"
    }
}

/// 设置域名屏蔽
#[derive(Debug, Clone)]
pub struct SetWebDomainRestrictionsCommand {
    pub domains: Vec<String>,
    /// 未指定时使用配置中的默认浏览器
    pub browser_bundle_id: Option<String>,
}

impl Command for SetWebDomainRestrictionsCommand {
    type Result = DomainShieldOutcome;

    fn name(&self) -> &'static str {
        "set_web_domain_restrictions"
    }
}

/// 当前屏蔽的应用数量
#[derive(Debug, Clone)]
pub struct BlockedAppCountQuery;

impl Query for BlockedAppCountQuery {
    type Result = usize;

    fn name(&self) -> &'static str {
        "blocked_app_count"
    }
}

/// 内容过滤状态
#[derive(Debug, Clone)]
pub struct ContentFilterStatusQuery;

impl Query for ContentFilterStatusQuery {
    type Result = bool;

    fn name(&self) -> &'static str {
        "content_filter_status"
    }
}

/// 平台版本描述
#[derive(Debug, Clone)]
pub struct PlatformVersionQuery;

impl Query for PlatformVersionQuery {
    type Result = String;

    fn name(&self) -> &'static str {
        "platform_version"
    }
}

//! Command trait 定义

use async_trait::async_trait;
use limiter_errors::AppResult;

/// Command trait
///
/// 会改变策略模型、执行层或授权状态的操作
pub trait Command: Send + Sync {
    type Result: Send;

    /// 用于日志与指标的操作名
    fn name(&self) -> &'static str;
}

/// Command Handler trait
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, command: C) -> AppResult<C::Result>;
}

//! Query trait 定义

use async_trait::async_trait;
use limiter_errors::AppResult;

/// Query trait
///
/// 只读操作，不进入执行层的 mutation lane
pub trait Query: Send + Sync {
    type Result: Send;

    /// 用于日志与指标的操作名
    fn name(&self) -> &'static str;
}

/// Query Handler trait
#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    async fn handle(&self, query: Q) -> AppResult<Q::Result>;
}

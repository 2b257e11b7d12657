//! app-limiter - 应用、分类与域名限制策略核心
//!
//! 捕获选择、转换为可执行的屏蔽策略并推送给执行层，
//! 同时把选择编码后交给另一台设备原样应用

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

use std::sync::Arc;

use limiter_bootstrap::Infrastructure;
use limiter_errors::AppResult;

pub use api::{Collaborators, CommandDispatcher, MethodCall, MethodResponse, ReplySink};

/// 用宿主提供的协作方构建调度器
pub fn register(infra: &Infrastructure, collaborators: Collaborators) -> AppResult<Arc<CommandDispatcher>> {
    CommandDispatcher::new(infra.config(), collaborators).map(Arc::new)
}

//! limiter-bootstrap - 统一启动骨架
//!
//! 宿主注册插件时调用一次：加载配置、初始化日志与指标，再交给插件构建调度器

mod infrastructure;
mod runtime;
mod starter;

pub use infrastructure::*;
pub use runtime::*;
pub use starter::*;

//! 内存实现
//!
//! 不依赖真实平台的端口实现，用于本地运行与测试

mod authorization_center;
mod enforcement_store;
mod platform;
mod presenter;

pub use authorization_center::{RequestBehavior, ScriptedAuthorizationCenter};
pub use enforcement_store::{InMemoryEnforcementStore, StoreSnapshot};
pub use platform::StaticPlatform;
pub use presenter::ScriptedPresenter;

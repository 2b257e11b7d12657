//! 宿主方法通道边界

pub mod dispatcher;
pub mod method;
pub mod reply;

pub use dispatcher::{Collaborators, CommandDispatcher};
pub use method::{Method, MethodCall, MethodResponse};
pub use reply::ReplySink;

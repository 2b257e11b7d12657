//! limiter-cqrs-core - CQRS 核心库
//!
//! Command/Query trait、Handler、Middleware

mod command;
mod middleware;
mod query;

pub use command::*;
pub use middleware::*;
pub use query::*;

//! Middleware 定义

use async_trait::async_trait;
use limiter_errors::AppResult;

use crate::{Command, Query};

/// Command Middleware trait
///
/// `before` 返回错误时命令不会被执行
#[async_trait]
pub trait CommandMiddleware: Send + Sync {
    async fn before<C: Command>(&self, command: &C) -> AppResult<()>;
    async fn after<C: Command>(&self, command: &C, result: &AppResult<C::Result>)
    where
        C::Result: Sync;
}

/// Query Middleware trait
#[async_trait]
pub trait QueryMiddleware: Send + Sync {
    async fn before<Q: Query>(&self, query: &Q) -> AppResult<()>;
    async fn after<Q: Query>(&self, query: &Q, result: &AppResult<Q::Result>)
    where
        Q::Result: Sync;
}

/// 日志中间件
pub struct LoggingMiddleware;

#[async_trait]
impl CommandMiddleware for LoggingMiddleware {
    async fn before<C: Command>(&self, command: &C) -> AppResult<()> {
        tracing::debug!(command = command.name(), "Executing command");
        Ok(())
    }

    async fn after<C: Command>(&self, command: &C, result: &AppResult<C::Result>)
    where
        C::Result: Sync,
    {
        match result {
            Ok(_) => tracing::debug!(command = command.name(), "Command executed successfully"),
            Err(e) => tracing::error!(
                command = command.name(),
                code = e.code(),
                "Command failed: {}",
                e
            ),
        }
    }
}

#[async_trait]
impl QueryMiddleware for LoggingMiddleware {
    async fn before<Q: Query>(&self, query: &Q) -> AppResult<()> {
        tracing::debug!(query = query.name(), "Executing query");
        Ok(())
    }

    async fn after<Q: Query>(&self, query: &Q, result: &AppResult<Q::Result>)
    where
        Q::Result: Sync,
    {
        match result {
            Ok(_) => tracing::debug!(query = query.name(), "Query executed successfully"),
            Err(e) => tracing::error!(
                query = query.name(),
                code = e.code(),
                "Query failed: {}",
                e
            ),
        }
    }
}

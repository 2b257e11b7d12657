//! 可编排的授权服务

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use limiter_errors::{AppError, AppResult};
use tracing::debug;

use crate::domain::{AuthorizationCenter, AuthorizationMode, AuthorizationStatus};

/// 下一次授权请求的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBehavior {
    /// 用户同意
    Grant,
    /// 用户拒绝
    Deny,
    /// 系统服务出错
    Fail(String),
}

#[derive(Debug)]
struct Script {
    statuses: HashMap<AuthorizationMode, AuthorizationStatus>,
    behavior: RequestBehavior,
    delay: Option<Duration>,
}

/// 可编排的授权服务
#[derive(Debug)]
pub struct ScriptedAuthorizationCenter {
    script: Mutex<Script>,
    requests: AtomicUsize,
}

impl ScriptedAuthorizationCenter {
    /// 所有模式未决定，请求时同意
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                statuses: HashMap::new(),
                behavior: RequestBehavior::Grant,
                delay: None,
            }),
            requests: AtomicUsize::new(0),
        }
    }

    /// 所有模式都已授权
    pub fn approved() -> Self {
        let center = Self::new();
        center.set_status(AuthorizationMode::Individual, AuthorizationStatus::Approved);
        center.set_status(AuthorizationMode::ChildSupervised, AuthorizationStatus::Approved);
        center
    }

    /// 直接改变状态，模拟用户在系统设置中授权或撤销
    pub fn set_status(&self, mode: AuthorizationMode, status: AuthorizationStatus) {
        self.lock().statuses.insert(mode, status);
    }

    pub fn set_behavior(&self, behavior: RequestBehavior) {
        self.lock().behavior = behavior;
    }

    /// 让授权请求挂起一段时间后再返回
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    /// 已发起的授权请求次数
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ScriptedAuthorizationCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthorizationCenter for ScriptedAuthorizationCenter {
    fn status(&self, mode: AuthorizationMode) -> AuthorizationStatus {
        self.lock().statuses.get(&mode).copied().unwrap_or_default()
    }

    async fn request_authorization(&self, mode: AuthorizationMode) -> AppResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let delay = self.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut script = self.lock();
        debug!(%mode, behavior = ?script.behavior, "Scripted authorization request");
        match script.behavior.clone() {
            RequestBehavior::Grant => {
                script.statuses.insert(mode, AuthorizationStatus::Approved);
                Ok(())
            }
            RequestBehavior::Deny => {
                script.statuses.insert(mode, AuthorizationStatus::Denied);
                Ok(())
            }
            RequestBehavior::Fail(message) => Err(AppError::internal(message)),
        }
    }
}

//! 授权模式、授权状态与授权服务端口

use async_trait::async_trait;
use limiter_errors::AppResult;
use serde::{Deserialize, Serialize};

/// 授权模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthorizationMode {
    /// 本机用户自我限制
    Individual,
    /// 家长监护的儿童设备
    ChildSupervised,
}

impl std::fmt::Display for AuthorizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorizationMode::Individual => write!(f, "individual"),
            AuthorizationMode::ChildSupervised => write!(f, "childSupervised"),
        }
    }
}

/// 授权状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Denied,
    Approved,
}

impl AuthorizationStatus {
    pub fn is_approved(self) -> bool {
        self == AuthorizationStatus::Approved
    }
}

impl std::fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorizationStatus::NotDetermined => write!(f, "notDetermined"),
            AuthorizationStatus::Denied => write!(f, "denied"),
            AuthorizationStatus::Approved => write!(f, "approved"),
        }
    }
}

/// 系统授权服务端口
///
/// 授权状态由系统持有，可随时在系统设置中被撤销
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorizationCenter: Send + Sync {
    /// 查询当前状态，无副作用
    fn status(&self, mode: AuthorizationMode) -> AuthorizationStatus;

    /// 发起授权流程，挂起直到系统给出结果
    ///
    /// 用户取消或服务不可用时返回错误；返回 `Ok` 不代表已授权，需重新查询状态
    async fn request_authorization(&self, mode: AuthorizationMode) -> AppResult<()>;
}

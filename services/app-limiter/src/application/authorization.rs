//! 授权网关
//!
//! 包装系统授权服务。授权结果从不缓存：每个特权操作执行前都重新查询

use std::sync::Arc;

use limiter_errors::{AppError, AppResult};
use tracing::{info, warn};

use crate::domain::{AuthorizationCenter, AuthorizationMode, AuthorizationStatus};

/// 授权网关
pub struct AuthorizationGateway {
    center: Arc<dyn AuthorizationCenter>,
}

impl AuthorizationGateway {
    pub fn new(center: Arc<dyn AuthorizationCenter>) -> Self {
        Self { center }
    }

    /// 查询当前授权状态
    pub fn status(&self, mode: AuthorizationMode) -> AuthorizationStatus {
        self.center.status(mode)
    }

    /// 请求授权
    ///
    /// 已授权时立即返回。系统请求在独立任务中运行：调用方放弃等待不会取消系统请求，
    /// 只是忽略其结果
    pub async fn request_authorization(&self, mode: AuthorizationMode) -> AppResult<AuthorizationStatus> {
        let current = self.center.status(mode);
        if current.is_approved() {
            return Ok(current);
        }

        info!(%mode, status = %current, "Requesting authorization");

        let center = Arc::clone(&self.center);
        let request = tokio::spawn(async move { center.request_authorization(mode).await });

        match request.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(%mode, error = %e, "Authorization request failed");
                return Err(match e {
                    AppError::PermissionDenied(_) | AppError::Authorization(_) => e,
                    other => AppError::authorization(format!(
                        "Failed to request {} authorization: {}",
                        mode,
                        other.message()
                    )),
                });
            }
            Err(join_error) => {
                return Err(AppError::authorization(format!(
                    "Authorization request aborted: {}",
                    join_error
                )));
            }
        }

        let status = self.center.status(mode);
        info!(%mode, %status, "Authorization request completed");
        Ok(status)
    }

    /// 确保已授权，必要时发起请求
    pub async fn ensure_approved(&self, mode: AuthorizationMode) -> AppResult<()> {
        let status = self.request_authorization(mode).await?;
        if status.is_approved() {
            Ok(())
        } else {
            Err(AppError::permission_denied(match mode {
                AuthorizationMode::Individual => "User denied permission",
                AuthorizationMode::ChildSupervised => "User denied Family Controls permission",
            }))
        }
    }
}

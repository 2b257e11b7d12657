//! limiter-errors - 统一错误处理
//!
//! 每个错误对应一个稳定的边界错误码，调用方（宿主应用）按错误码分支处理

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Unsupported platform: {0}")]
    Unsupported(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Presentation failed: {0}")]
    Presentation(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Enforcement push failed: {0}")]
    Enforcement(String),

    #[error("Selection in progress: {0}")]
    SelectionInProgress(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn presentation(msg: impl Into<String>) -> Self {
        Self::Presentation(msg.into())
    }

    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn decoding(msg: impl Into<String>) -> Self {
        Self::Decoding(msg.into())
    }

    pub fn enforcement(msg: impl Into<String>) -> Self {
        Self::Enforcement(msg.into())
    }

    pub fn selection_in_progress(msg: impl Into<String>) -> Self {
        Self::SelectionInProgress(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 转换为边界错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unsupported(_) => "UNSUPPORTED",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::Authorization(_) => "AUTH_ERROR",
            Self::Presentation(_) => "PRESENT_ERROR",
            Self::InvalidArgs(_) => "INVALID_ARGS",
            Self::Encoding(_) => "ENCODING_ERROR",
            Self::Decoding(_) => "DECODING_ERROR",
            Self::Enforcement(_) => "ENFORCEMENT_ERROR",
            Self::SelectionInProgress(_) => "SELECTION_IN_PROGRESS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// 调用方重新发起同一操作是否有意义
    ///
    /// 平台版本过低、展示失败、负载损坏重试也不会成功
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_)
                | Self::Authorization(_)
                | Self::Enforcement(_)
                | Self::SelectionInProgress(_)
        )
    }

    /// 错误的原始描述（不含分类前缀）
    pub fn message(&self) -> &str {
        match self {
            Self::Unsupported(msg)
            | Self::PermissionDenied(msg)
            | Self::Authorization(msg)
            | Self::Presentation(msg)
            | Self::InvalidArgs(msg)
            | Self::Encoding(msg)
            | Self::Decoding(msg)
            | Self::Enforcement(msg)
            | Self::SelectionInProgress(msg)
            | Self::Internal(msg) => msg,
        }
    }

    /// 转换为边界错误负载
    pub fn to_error_payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.code().to_string(),
            message: self.message().to_string(),
            details: None,
        }
    }
}

/// 边界错误负载
///
/// 与宿主方法通道约定的 `(code, message, details)` 三元组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<AppError> for ErrorPayload {
    fn from(err: AppError) -> Self {
        err.to_error_payload()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

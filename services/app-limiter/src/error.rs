use limiter_errors::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LimiterError {
    #[error("Malformed policy payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("Unsupported policy version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("Unrepresentable {kind} token: {value:?}")]
    UnrepresentableToken { kind: &'static str, value: String },
    #[error("Invalid platform version: {0:?}")]
    InvalidPlatformVersion(String),
    #[error("{0} is required")]
    MissingArgument(&'static str),
    #[error("Invalid argument {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },
}

impl LimiterError {
    /// 编码方向的错误（本机选择无法序列化）
    pub fn into_encoding(self) -> AppError {
        AppError::encoding(self.to_string())
    }

    /// 解码方向的错误（远端负载无法接受）
    pub fn into_decoding(self) -> AppError {
        AppError::decoding(self.to_string())
    }
}

impl From<LimiterError> for AppError {
    fn from(error: LimiterError) -> Self {
        match error {
            LimiterError::MalformedPayload(_) | LimiterError::UnsupportedVersion { .. } => {
                AppError::decoding(error.to_string())
            }
            LimiterError::UnrepresentableToken { .. } => AppError::encoding(error.to_string()),
            LimiterError::InvalidPlatformVersion(_) => AppError::unsupported(error.to_string()),
            LimiterError::MissingArgument(_) | LimiterError::InvalidArgument { .. } => {
                AppError::invalid_args(error.to_string())
            }
        }
    }
}

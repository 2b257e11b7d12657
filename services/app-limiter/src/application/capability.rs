//! 平台能力检查
//!
//! 在调度入口统一执行一次，先于参数解析、授权网关和执行层

use std::sync::Arc;

use limiter_errors::{AppError, AppResult};
use tracing::warn;

use crate::domain::{PlatformInfo, PlatformVersion};

/// 平台能力检查
pub struct CapabilityGate {
    platform: Arc<dyn PlatformInfo>,
    minimum: PlatformVersion,
}

impl CapabilityGate {
    pub fn new(platform: Arc<dyn PlatformInfo>, minimum: PlatformVersion) -> Self {
        Self { platform, minimum }
    }

    /// 当前平台版本是否满足最低要求，无法解析的版本视为不满足
    pub fn check(&self) -> AppResult<()> {
        let reported = self.platform.system_version();
        match reported.parse::<PlatformVersion>() {
            Ok(version) if version >= self.minimum => Ok(()),
            Ok(_) => Err(AppError::unsupported(format!(
                "{} {}+ required",
                self.platform.system_name(),
                self.minimum_label()
            ))),
            Err(e) => {
                warn!(version = %reported, error = %e, "Unparseable platform version");
                Err(AppError::unsupported(e.to_string()))
            }
        }
    }

    /// 最低版本的简短写法，例如 "16" 或 "16.4"
    fn minimum_label(&self) -> String {
        let PlatformVersion { major, minor, patch } = self.minimum;
        match (minor, patch) {
            (0, 0) => major.to_string(),
            (_, 0) => format!("{}.{}", major, minor),
            _ => self.minimum.to_string(),
        }
    }
}

//! 平台信息端口与版本比较

use std::str::FromStr;

use crate::error::LimiterError;

/// 平台信息端口
pub trait PlatformInfo: Send + Sync {
    /// 系统名称，例如 "iOS"
    fn system_name(&self) -> String;

    /// 系统版本，例如 "17.2.1"
    fn system_version(&self) -> String;

    /// 宿主展示用的版本描述
    fn description(&self) -> String {
        format!("{} {}", self.system_name(), self.system_version())
    }
}

/// 点分系统版本，缺省的次版本与修订号按 0 处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlatformVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PlatformVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl FromStr for PlatformVersion {
    type Err = LimiterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LimiterError::InvalidPlatformVersion(s.to_string());

        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(invalid());
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl std::fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

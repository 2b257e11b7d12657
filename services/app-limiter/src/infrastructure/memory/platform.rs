//! 固定平台信息

use crate::domain::PlatformInfo;

/// 固定版本的平台
#[derive(Debug, Clone)]
pub struct StaticPlatform {
    name: String,
    version: String,
}

impl StaticPlatform {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn ios(version: impl Into<String>) -> Self {
        Self::new("iOS", version)
    }
}

impl PlatformInfo for StaticPlatform {
    fn system_name(&self) -> String {
        self.name.clone()
    }

    fn system_version(&self) -> String {
        self.version.clone()
    }
}

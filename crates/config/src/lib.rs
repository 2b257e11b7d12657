//! limiter-config - 配置加载库

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// 环境变量前缀，例如 `APP_LIMITER_PLATFORM__MINIMUM_VERSION=17`
pub const ENV_PREFIX: &str = "APP_LIMITER_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 平台能力配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// 支持的最低系统版本，低于该版本的所有特权操作返回 UNSUPPORTED
    #[serde(default = "default_minimum_version", deserialize_with = "version_string")]
    pub minimum_version: String,
}

/// 环境变量中的 `17` 会被解析成数字，这里统一转回字符串
fn version_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(u64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

fn default_minimum_version() -> String {
    "16.0".to_string()
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            minimum_version: default_minimum_version(),
        }
    }
}

/// 执行层配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// 域名屏蔽所依附的浏览器 bundle id
    #[serde(default = "default_browser_bundle_id")]
    pub browser_bundle_id: String,
}

fn default_browser_bundle_id() -> String {
    "com.apple.mobilesafari".to_string()
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            browser_bundle_id: default_browser_bundle_id(),
        }
    }
}

/// 遥测配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
    /// 安装 Prometheus recorder
    #[serde(default)]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
            metrics_enabled: false,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub enforcement: EnforcementConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_app_name() -> String {
    "app-limiter".to_string()
}

fn default_app_env() -> String {
    "development".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_env: default_app_env(),
            platform: PlatformConfig::default(),
            enforcement: EnforcementConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 优先级（低到高）：内置默认值、`default.toml`、`{APP_ENV}.toml`、`APP_LIMITER_*` 环境变量
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());

        let config: Self = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

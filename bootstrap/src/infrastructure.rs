//! 基础设施资源
//!
//! 插件进程内共享的配置与指标句柄

use limiter_config::AppConfig;
use limiter_errors::AppResult;
use limiter_telemetry::init_metrics;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

/// 基础设施资源容器
pub struct Infrastructure {
    /// 应用配置
    config: AppConfig,
    /// Prometheus 句柄（未启用或宿主已安装 recorder 时为 None）
    metrics: Option<PrometheusHandle>,
}

impl Infrastructure {
    /// 从配置创建基础设施资源
    ///
    /// 指标 recorder 安装失败不影响插件运行
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let metrics = if config.telemetry.metrics_enabled {
            match init_metrics() {
                Ok(handle) => {
                    info!("Prometheus recorder installed");
                    Some(handle)
                }
                Err(e) => {
                    warn!("{}, continuing without metrics export", e);
                    None
                }
            }
        } else {
            info!("Metrics export not enabled, skipping");
            None
        };

        Ok(Self { config, metrics })
    }

    /// 获取应用配置
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Prometheus 文本格式的指标快照
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(PrometheusHandle::render)
    }
}

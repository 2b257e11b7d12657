//! 运行时初始化

use limiter_config::AppConfig;
use limiter_telemetry::{init_tracing, init_tracing_json};
use tracing::info;

/// 初始化日志
///
/// 生产环境或显式配置时输出 JSON。宿主已安装 subscriber 时保留宿主的
pub fn init_runtime(config: &AppConfig) {
    let installed = if config.telemetry.json || config.is_production() {
        init_tracing_json(&config.telemetry.log_level)
    } else {
        init_tracing(&config.telemetry.log_level)
    };

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        subscriber_installed = installed,
        "Runtime initialized"
    );
}

//! 插件启动器

use limiter_config::AppConfig;
use limiter_errors::{AppError, AppResult};
use tracing::info;

use crate::infrastructure::Infrastructure;
use crate::runtime::init_runtime;

/// 启动插件
///
/// 1. 加载配置
/// 2. 初始化日志
/// 3. 创建基础设施资源
/// 4. 调用插件提供的闭包完成注册
///
/// # 示例
///
/// ```ignore
/// let dispatcher = limiter_bootstrap::start("config", |infra| {
///     app_limiter::register(&infra, collaborators)
/// })?;
/// ```
pub fn start<F, T>(config_dir: &str, register: F) -> AppResult<T>
where
    F: FnOnce(Infrastructure) -> AppResult<T>,
{
    let config = AppConfig::load(config_dir)
        .map_err(|e| AppError::internal(format!("Failed to load configuration: {}", e)))?;
    init_runtime(&config);

    let infra = Infrastructure::from_config(config)?;
    let plugin = register(infra)?;

    info!("Plugin registered");
    Ok(plugin)
}

//! 执行层端口
//!
//! 真正拦截应用和网络访问的平台机制。所有推送都是同步、尽力而为的，
//! 没有事务，也不会回滚

use limiter_errors::AppResult;

use super::shield::ShieldPolicy;
use super::token::{ApplicationToken, CategoryToken, WebDomainToken};

/// 执行层 trait
pub trait EnforcementStore: Send + Sync {
    /// 设置应用屏蔽，`ShieldPolicy::None` 表示清除
    fn set_application_shield(&self, shield: &ShieldPolicy<ApplicationToken>) -> AppResult<()>;

    /// 设置分类屏蔽
    fn set_category_shield(&self, shield: &ShieldPolicy<CategoryToken>) -> AppResult<()>;

    /// 设置域名屏蔽
    fn set_web_domain_shield(&self, shield: &ShieldPolicy<WebDomainToken>) -> AppResult<()>;

    /// 设置成人内容自动过滤
    fn set_content_filter(&self, enabled: bool) -> AppResult<()>;

    /// 内容过滤是否开启
    fn content_filter_enabled(&self) -> AppResult<bool>;

    /// 实际生效的应用屏蔽数量，未配置应用屏蔽时返回 `None`
    fn shielded_application_count(&self) -> AppResult<Option<usize>>;
}

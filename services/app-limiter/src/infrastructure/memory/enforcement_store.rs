//! 内存执行层

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use limiter_errors::{AppError, AppResult};

use crate::domain::{ApplicationToken, CategoryToken, EnforcementStore, ShieldPolicy, WebDomainToken};

/// 执行层当前持有的配置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub applications: ShieldPolicy<ApplicationToken>,
    pub categories: ShieldPolicy<CategoryToken>,
    pub web_domains: ShieldPolicy<WebDomainToken>,
    pub content_filter: bool,
}

/// 内存执行层
#[derive(Debug, Default)]
pub struct InMemoryEnforcementStore {
    state: Mutex<StoreSnapshot>,
    failing: AtomicBool,
    pushes: AtomicUsize,
}

impl InMemoryEnforcementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以已有配置启动，模拟进程重启前残留的屏蔽
    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
            ..Self::default()
        }
    }

    /// 当前配置（用于测试）
    pub fn snapshot(&self) -> StoreSnapshot {
        self.lock().clone()
    }

    /// 让后续推送全部失败（用于测试）
    pub fn fail_pushes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// 已尝试的推送次数
    pub fn push_count(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, StoreSnapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self, target: &str, apply: impl FnOnce(&mut StoreSnapshot)) -> AppResult<()> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::enforcement(format!("Store rejected {} update", target)));
        }
        let mut state = self.lock();
        apply(&mut *state);
        Ok(())
    }
}

impl EnforcementStore for InMemoryEnforcementStore {
    fn set_application_shield(&self, shield: &ShieldPolicy<ApplicationToken>) -> AppResult<()> {
        self.write("application shield", |s| s.applications = shield.clone())
    }

    fn set_category_shield(&self, shield: &ShieldPolicy<CategoryToken>) -> AppResult<()> {
        self.write("category shield", |s| s.categories = shield.clone())
    }

    fn set_web_domain_shield(&self, shield: &ShieldPolicy<WebDomainToken>) -> AppResult<()> {
        self.write("web domain shield", |s| s.web_domains = shield.clone())
    }

    fn set_content_filter(&self, enabled: bool) -> AppResult<()> {
        self.write("content filter", |s| s.content_filter = enabled)
    }

    fn content_filter_enabled(&self) -> AppResult<bool> {
        Ok(self.lock().content_filter)
    }

    fn shielded_application_count(&self) -> AppResult<Option<usize>> {
        let state = self.lock();
        Ok(state
            .applications
            .is_configured()
            .then(|| state.applications.len()))
    }
}

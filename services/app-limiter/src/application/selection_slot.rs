//! 进程内至多一个进行中的选择流程

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use limiter_errors::{AppError, AppResult};

/// 选择流程占位
#[derive(Debug, Default)]
pub struct SelectionSlot {
    busy: Arc<AtomicBool>,
}

impl SelectionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 占用槽位，已被占用时立即失败，不影响正在进行的流程
    pub fn try_acquire(&self) -> AppResult<SelectionGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::selection_in_progress("Another app selection is already pending"))?;

        Ok(SelectionGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// 槽位守卫，drop 时释放（成功、取消、出错或调用方放弃等待）
#[derive(Debug)]
pub struct SelectionGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SelectionGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

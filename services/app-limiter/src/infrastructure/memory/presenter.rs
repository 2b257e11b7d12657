//! 可编排的选择器

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use limiter_errors::{AppError, AppResult};
use tokio::sync::Notify;

use crate::domain::{PickerOutcome, PresentationRequest, SelectionPresenter};

#[derive(Debug, Default)]
struct Queue {
    outcomes: VecDeque<AppResult<PickerOutcome>>,
    presentations: Vec<PresentationRequest>,
}

/// 按预设顺序返回结果的选择器，队列为空时视为用户取消
#[derive(Debug, Default)]
pub struct ScriptedPresenter {
    queue: Mutex<Queue>,
    /// 设置后，展示会挂起直到 [`ScriptedPresenter::release`]
    gate: Option<Arc<Notify>>,
    presented: Notify,
}

impl ScriptedPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次展示都等待外部放行，模拟用户停留在选择器界面
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::default()
        }
    }

    pub fn push_outcome(&self, outcome: PickerOutcome) {
        self.lock().outcomes.push_back(Ok(outcome));
    }

    /// 下一次展示失败，例如找不到可挂载的界面
    pub fn push_error(&self, error: AppError) {
        self.lock().outcomes.push_back(Err(error));
    }

    /// 放行一次挂起的展示
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// 等待下一次展示开始
    pub async fn wait_presented(&self) {
        self.presented.notified().await;
    }

    /// 已收到的展示请求
    pub fn presentations(&self) -> Vec<PresentationRequest> {
        self.lock().presentations.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SelectionPresenter for ScriptedPresenter {
    async fn present(&self, request: PresentationRequest) -> AppResult<PickerOutcome> {
        self.lock().presentations.push(request);
        self.presented.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.lock()
            .outcomes
            .pop_front()
            .unwrap_or(Ok(PickerOutcome::Cancelled))
    }
}

//! 选择器展示端口

use async_trait::async_trait;
use limiter_errors::AppResult;

use super::selection::Selection;

/// 本次选择的用途，随展示请求显式传递
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPurpose {
    /// 选择要限制的应用
    Discourage,
    /// 选择要放行的应用
    Encourage,
}

/// 展示请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationRequest {
    pub purpose: SelectionPurpose,
    /// 选择器的初始值，即策略模型中的当前选择
    pub initial_selection: Selection,
    pub apply_locally: bool,
}

/// 选择器结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Completed(Selection),
    Cancelled,
}

/// 宿主 UI 端口
///
/// 找不到可挂载的界面时返回 `AppError::Presentation`
#[async_trait]
pub trait SelectionPresenter: Send + Sync {
    async fn present(&self, request: PresentationRequest) -> AppResult<PickerOutcome>;
}

//! 策略模型
//!
//! 进程内唯一的选择状态持有者，显式构造后以 `Arc` 传给调度器和执行层

use std::collections::BTreeSet;

use tokio::sync::RwLock;

use super::selection::Selection;

/// 策略模型
#[derive(Debug, Default)]
pub struct PolicyModel {
    selection: RwLock<Selection>,
}

impl PolicyModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(selection: Selection) -> Self {
        Self {
            selection: RwLock::new(selection),
        }
    }

    pub async fn get_selection(&self) -> Selection {
        self.selection.read().await.clone()
    }

    pub async fn set_selection(&self, selection: Selection) {
        *self.selection.write().await = selection;
    }

    /// 只替换域名部分，应用与分类保持不变
    pub async fn replace_web_domains(&self, web_domains: BTreeSet<String>) {
        self.selection.write().await.web_domains = web_domains;
    }

    pub async fn is_empty(&self) -> bool {
        self.selection.read().await.is_empty()
    }

    pub async fn has_web_domains(&self) -> bool {
        self.selection.read().await.has_web_domains()
    }

    pub async fn application_count(&self) -> usize {
        self.selection.read().await.application_count()
    }
}

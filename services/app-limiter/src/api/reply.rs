//! 调用结果回传
//!
//! 每次调用恰好回传一次：`send` 消费 sink，未回传就被丢弃时由 `Drop` 回传 INTERNAL

use limiter_errors::AppError;
use tokio::sync::oneshot;
use tracing::{debug, error};

use super::method::MethodResponse;

/// 结果回传通道
#[derive(Debug)]
pub struct ReplySink {
    method: String,
    sender: Option<oneshot::Sender<MethodResponse>>,
}

impl ReplySink {
    /// 创建回传通道，调用方持有接收端
    pub fn channel(method: impl Into<String>) -> (Self, oneshot::Receiver<MethodResponse>) {
        let (sender, receiver) = oneshot::channel();
        let sink = Self {
            method: method.into(),
            sender: Some(sender),
        };
        (sink, receiver)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// 回传结果
    pub fn send(mut self, response: MethodResponse) {
        self.deliver(response);
    }

    fn deliver(&mut self, response: MethodResponse) {
        if let Some(sender) = self.sender.take() {
            if sender.send(response).is_err() {
                debug!(method = %self.method, "Caller stopped waiting, reply discarded");
            }
        }
    }
}

impl Drop for ReplySink {
    fn drop(&mut self) {
        if self.sender.is_some() {
            error!(method = %self.method, "Invocation ended without a reply");
            self.deliver(AppError::internal("Invocation ended without a reply").into());
        }
    }
}

//! 本地调试入口
//!
//! 使用内存协作方，从标准输入逐行读取 JSON 方法调用并输出响应

use std::sync::Arc;

use app_limiter::infrastructure::memory::{
    InMemoryEnforcementStore, ScriptedAuthorizationCenter, ScriptedPresenter, StaticPlatform,
};
use app_limiter::{Collaborators, MethodCall, ReplySink};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let collaborators = Collaborators {
        authorization: Arc::new(ScriptedAuthorizationCenter::new()),
        store: Arc::new(InMemoryEnforcementStore::new()),
        presenter: Arc::new(ScriptedPresenter::new()),
        platform: Arc::new(StaticPlatform::ios("17.2")),
    };

    let dispatcher = limiter_bootstrap::start("config", |infra| {
        app_limiter::register(&infra, collaborators)
    })?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let call: MethodCall = match serde_json::from_str(&line) {
            Ok(call) => call,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed method call");
                continue;
            }
        };

        let (sink, receiver) = ReplySink::channel(call.method.clone());
        dispatcher.handle(call, sink);
        let response = receiver.await?;

        let mut output = serde_json::to_vec(&response)?;
        output.push(b'\n');
        stdout.write_all(&output).await?;
        stdout.flush().await?;
    }

    Ok(())
}

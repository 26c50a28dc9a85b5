//! Relay command line dispatcher.
//!
//! Reads a request descriptor as JSON on stdin, dispatches it and prints the
//! response as JSON. An optional first argument names a JSON config file.
//!
//! ```text
//! echo '{"method":"GET","url":"http://localhost:8080/hello","params":{"q":"a b"}}' | relay
//! ```

use relay::prelude::*;
use std::io::Read;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Stand-in proxy actor: answers every task with the descriptor of the
/// request it received.
struct EchoProxy;

#[async_trait]
impl TaskHandler for EchoProxy {
    async fn on_start(&mut self, ctx: &ActorContext) -> Result<(), TaskError> {
        tracing::info!("Starting actor: {}", ctx.actor);
        Ok(())
    }

    async fn handle(
        &mut self,
        task: TaskMessage,
        _ctx: &ActorContext,
    ) -> Result<TaskReply, TaskError> {
        let descriptor = RequestDescriptor::from(&task.request);
        Ok(TaskReply::Response(RawResponse::json(&descriptor)?))
    }

    async fn on_stop(&mut self, ctx: &ActorContext) -> Result<(), TaskError> {
        tracing::info!("Stopping actor: {}", ctx.actor);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!("Loading config from {}", path);
            RelayConfig::from_json(&std::fs::read(path)?)?
        }
        None => RelayConfig::default(),
    };

    let mut input = Vec::new();
    std::io::stdin().read_to_end(&mut input)?;
    let descriptor = RequestDescriptor::from_json(&input)?;
    let request = descriptor.to_request()?;

    let actors = Arc::new(LocalActorSystem::new(&config));
    actors
        .spawn(config.proxy_target.clone(), Box::new(EchoProxy))
        .await?;

    let bridge = DispatchBridge::new(
        Arc::new(HyperTransport::new(&config)),
        actors.clone(),
        &config,
    );

    let response = bridge.dispatch_default(request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    actors.shutdown().await;
    Ok(())
}

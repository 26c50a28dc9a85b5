//! # Relay - request building and bounded-wait dispatch
//!
//! Relay builds outbound REST-style requests and delivers them either
//! straight over a transport or through an actor that answers
//! asynchronously. Whichever path is taken, the caller waits for at most a
//! timeout it chooses and gets back exactly one [`Response`].
//!
//! ## Architecture
//!
//! ```text
//!  RequestDescriptor ──► RequestBuilder ──► Request
//!                                              │
//!                                              ▼
//!                                      ┌───────────────┐
//!                                      │DispatchBridge │  route table
//!                                      └───────────────┘
//!                                         │         │
//!                             Direct      │         │      Proxy
//!                                         ▼         ▼
//!                              ┌──────────────┐  ┌──────────────────────┐
//!                              │  Transport   │  │ ActorSystem::ask     │
//!                              │  (hyper)     │  │  mailbox ─► actor    │
//!                              └──────────────┘  │  reply ◄── oneshot   │
//!                                                └──────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use relay::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct VmProxy;
//!
//! #[async_trait]
//! impl TaskHandler for VmProxy {
//!     async fn handle(
//!         &mut self,
//!         task: TaskMessage,
//!         _ctx: &ActorContext,
//!     ) -> Result<TaskReply, TaskError> {
//!         Ok(TaskReply::Text(format!("handled {}", task.request.url())))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = RelayConfig::new().default_route(DispatchRoute::Proxy);
//!
//!     let actors = Arc::new(LocalActorSystem::new(&config));
//!     actors.spawn("vmproxy", Box::new(VmProxy)).await?;
//!
//!     let bridge = DispatchBridge::new(
//!         Arc::new(HyperTransport::new(&config)),
//!         actors.clone(),
//!         &config,
//!     );
//!
//!     let request = RequestBuilder::get("http://cluster/vm/status")
//!         .add_param("id", "42")?
//!         .build()?;
//!     let response = bridge.dispatch(request, Duration::from_secs(5)).await?;
//!     println!("{:?}: {:?}", response.outcome, response.payload);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod proxy;
pub mod transport;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::config::RelayConfig;
    pub use crate::dispatch::{BlockingBridge, DispatchBridge, DispatchRoute, RouteRule};
    pub use crate::error::{DeliveryError, RequestError, TransportFailure};
    pub use crate::http::{
        Body, Outcome, Payload, Request, RequestBuilder, RequestDescriptor, RequestMethod,
        Response, StatusCode,
    };
    pub use crate::proxy::{
        ActorContext, ActorSystem, LocalActorSystem, ProxyTarget, TaskError, TaskHandler,
        TaskMessage, TaskReply,
    };
    pub use crate::transport::{HyperTransport, RawResponse, Transport};
    pub use async_trait::async_trait;
}

// Re-export for convenience
pub use config::RelayConfig;
pub use dispatch::{BlockingBridge, DispatchBridge};
pub use error::RequestError;
pub use http::{Request, RequestBuilder, RequestDescriptor, Response};

//! Actor proxy path.
//!
//! Tasks are delivered to a named actor with [`ActorSystem::ask`], which
//! returns a [`PendingReply`] right after the message is accepted. The actor
//! answers once through the [`ReplySender`] that travelled with the message.
//! If the asking side stops waiting, the pending reply is dropped and the
//! actor's answer goes nowhere.

mod handler;
mod system;

pub use handler::{ActorContext, TaskError, TaskHandler};
pub use system::LocalActorSystem;

use crate::error::DeliveryError;
use crate::http::Request;
use crate::transport::RawResponse;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;

/// Name of an actor that accepts tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyTarget(String);

impl ProxyTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProxyTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProxyTarget {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ProxyTarget {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A request wrapped for delivery to an actor.
#[derive(Debug, Clone)]
pub struct TaskMessage {
    /// Identifier of the dispatch that produced this task.
    pub id: String,
    pub request: Request,
}

impl TaskMessage {
    pub fn new(id: impl Into<String>, request: Request) -> Self {
        Self {
            id: id.into(),
            request,
        }
    }
}

/// What an actor sends back.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskReply {
    /// An HTTP-shaped response.
    Response(RawResponse),
    /// A bare text answer.
    Text(String),
    /// A structured answer.
    Document(Value),
    /// An answer of a kind the dispatch bridge does not understand.
    Opaque { type_name: String },
}

impl From<RawResponse> for TaskReply {
    fn from(response: RawResponse) -> Self {
        TaskReply::Response(response)
    }
}

/// Sending half of a reply channel. Consumed by [`send`](Self::send), so an
/// actor can answer a task at most once.
#[derive(Debug)]
pub struct ReplySender {
    sender: oneshot::Sender<TaskReply>,
}

impl ReplySender {
    /// Deliver the reply. Returns `false` when nobody is waiting anymore.
    pub fn send(self, reply: TaskReply) -> bool {
        self.sender.send(reply).is_ok()
    }

    /// Whether the asking side has stopped waiting.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Future resolving to an actor's reply.
#[derive(Debug)]
pub struct PendingReply {
    target: ProxyTarget,
    receiver: oneshot::Receiver<TaskReply>,
}

impl PendingReply {
    /// Create a connected reply sender and pending reply for `target`.
    pub fn channel(target: ProxyTarget) -> (ReplySender, PendingReply) {
        let (sender, receiver) = oneshot::channel();
        (ReplySender { sender }, PendingReply { target, receiver })
    }

    pub fn target(&self) -> &ProxyTarget {
        &self.target
    }
}

impl Future for PendingReply {
    type Output = Result<TaskReply, DeliveryError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(reply)) => Poll::Ready(Ok(reply)),
            // Sender dropped without answering.
            Poll::Ready(Err(_)) => Poll::Ready(Err(DeliveryError::Disconnected {
                target: self.target.to_string(),
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Delivers tasks to actors.
#[async_trait]
pub trait ActorSystem: Send + Sync {
    /// Hand `message` to `target` and return a handle to its reply.
    ///
    /// `timeout` is the caller's budget for the whole exchange; the caller
    /// enforces it, implementations may use it to skip stale work.
    async fn ask(
        &self,
        target: &ProxyTarget,
        message: TaskMessage,
        timeout: Duration,
    ) -> Result<PendingReply, DeliveryError>;
}

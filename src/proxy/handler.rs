//! Task handler trait and context for local actors.

use crate::proxy::{TaskMessage, TaskReply};
use crate::http::StatusCode;
use crate::transport::RawResponse;
use async_trait::async_trait;
use tokio::time::Instant;

/// Context handed to a [`TaskHandler`] for each call.
#[derive(Debug, Clone)]
pub struct ActorContext {
    /// Name the actor is registered under.
    pub actor: String,
    /// Id of the task being handled, empty during start and stop.
    pub task_id: String,
    /// Point after which the asking side no longer waits.
    pub deadline: Option<Instant>,
}

impl ActorContext {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            task_id: String::new(),
            deadline: None,
        }
    }

    pub(crate) fn for_task(
        &self,
        task_id: impl Into<String>,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            actor: self.actor.clone(),
            task_id: task_id.into(),
            deadline,
        }
    }

    /// Whether the asking side is still within its budget.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Work run by a local actor.
///
/// An actor owns its handler and feeds it one task at a time, so `handle`
/// takes `&mut self` and can keep plain state between tasks.
#[async_trait]
pub trait TaskHandler: Send {
    /// Called once before the actor accepts messages.
    async fn on_start(&mut self, ctx: &ActorContext) -> Result<(), TaskError> {
        let _ = ctx;
        Ok(())
    }

    /// Handle one task.
    async fn handle(
        &mut self,
        task: TaskMessage,
        ctx: &ActorContext,
    ) -> Result<TaskReply, TaskError>;

    /// Called once after the mailbox has been drained on stop.
    async fn on_stop(&mut self, ctx: &ActorContext) -> Result<(), TaskError> {
        let _ = ctx;
        Ok(())
    }
}

/// Error returned by a [`TaskHandler`]. Turned into an error response for the
/// asking side.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct TaskError {
    pub message: String,
    pub code: u16,
}

impl TaskError {
    /// Create a new TaskError.
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_code(500, message)
    }

    /// Create a TaskError with a specific code.
    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(404, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(400, message)
    }
}

impl From<TaskError> for RawResponse {
    fn from(err: TaskError) -> Self {
        RawResponse::new(StatusCode(err.code))
            .header("content-type", "text/plain; charset=utf-8")
            .body(err.message)
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(err: serde_json::Error) -> Self {
        TaskError::bad_request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_task_error_into_response() {
        let response: RawResponse = TaskError::not_found("no such item").into();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body.as_ref(), b"no such item");
    }

    #[test]
    fn test_task_error_display() {
        assert_eq!(TaskError::bad_request("nope").to_string(), "[400] nope");
    }

    #[tokio::test(start_paused = true)]
    async fn test_context_expiry() {
        let deadline = Instant::now() + Duration::from_millis(50);
        let ctx = ActorContext::new("worker").for_task("t-1", Some(deadline));
        assert!(!ctx.is_expired());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(ctx.is_expired());
        assert!(!ActorContext::new("worker").is_expired());
    }
}

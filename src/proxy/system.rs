//! In-process actor system with bounded mailboxes.

use crate::config::RelayConfig;
use crate::error::DeliveryError;
use crate::proxy::handler::{ActorContext, TaskError, TaskHandler};
use crate::proxy::{ActorSystem, PendingReply, ProxyTarget, ReplySender, TaskMessage, TaskReply};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

struct Envelope {
    message: TaskMessage,
    reply: ReplySender,
    /// `None` when the timeout reaches past what `Instant` can represent.
    deadline: Option<Instant>,
}

/// A running actor.
struct ActorEntry {
    mailbox: mpsc::Sender<Envelope>,
    task: JoinHandle<()>,
}

/// Runs each registered [`TaskHandler`] as an actor on its own tokio task.
///
/// An actor processes its mailbox one message at a time. A full mailbox
/// refuses new messages instead of waiting for room.
pub struct LocalActorSystem {
    actors: RwLock<HashMap<String, ActorEntry>>,
    mailbox_capacity: usize,
    stop_grace: Duration,
}

impl LocalActorSystem {
    /// Create an actor system using the configured mailbox capacity and
    /// stop grace period.
    pub fn new(config: &RelayConfig) -> Self {
        Self::with_capacity(config.mailbox_capacity).stop_grace(config.grace())
    }

    pub fn with_capacity(mailbox_capacity: usize) -> Self {
        Self {
            actors: RwLock::new(HashMap::new()),
            mailbox_capacity: mailbox_capacity.max(1),
            stop_grace: RelayConfig::default().grace(),
        }
    }

    /// Set how long `stop` waits for an actor before aborting it.
    pub fn stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    /// Start `handler` as an actor named `name`.
    ///
    /// `on_start` runs before the actor is reachable; if it fails the actor
    /// is not registered.
    pub async fn spawn(
        &self,
        name: impl Into<String>,
        mut handler: Box<dyn TaskHandler>,
    ) -> Result<ProxyTarget, TaskError> {
        let name = name.into();

        if self.actors.read().await.contains_key(&name) {
            return Err(TaskError::new(format!(
                "Actor '{}' is already running",
                name
            )));
        }

        let context = ActorContext::new(&name);
        if let Err(e) = handler.on_start(&context).await {
            error!("Failed to start actor '{}': {}", name, e);
            return Err(e);
        }

        let mut actors = self.actors.write().await;
        if actors.contains_key(&name) {
            return Err(TaskError::new(format!(
                "Actor '{}' is already running",
                name
            )));
        }

        let (mailbox, inbox) = mpsc::channel(self.mailbox_capacity);
        let task = tokio::spawn(run_actor(context, handler, inbox));
        actors.insert(name.clone(), ActorEntry { mailbox, task });

        info!("Started actor: {}", name);
        Ok(ProxyTarget::new(name))
    }

    /// Stop an actor. Messages already in its mailbox are still handled,
    /// then `on_stop` runs. An actor that has not finished within the stop
    /// grace period is aborted.
    pub async fn stop(&self, name: &str) -> Result<(), TaskError> {
        let ActorEntry { mailbox, mut task } = self
            .actors
            .write()
            .await
            .remove(name)
            .ok_or_else(|| TaskError::not_found(format!("Actor '{}' not found", name)))?;

        // Closing the mailbox ends the actor loop once it is drained.
        drop(mailbox);
        match tokio::time::timeout(self.stop_grace, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Actor '{}' terminated abnormally: {}", name, e),
            Err(_) => {
                warn!(
                    "Actor '{}' did not stop within {:?}, aborting",
                    name, self.stop_grace
                );
                task.abort();
            }
        }

        info!("Stopped actor: {}", name);
        Ok(())
    }

    /// Stop every actor.
    pub async fn shutdown(&self) {
        let names: Vec<String> = self.actors.read().await.keys().cloned().collect();
        for name in names {
            if let Err(e) = self.stop(&name).await {
                warn!("Error stopping actor '{}': {}", name, e);
            }
        }
    }

    /// Names of all running actors.
    pub async fn list(&self) -> Vec<String> {
        let actors = self.actors.read().await;
        let mut names: Vec<String> = actors.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.actors.read().await.contains_key(name)
    }
}

impl Default for LocalActorSystem {
    fn default() -> Self {
        Self::new(&RelayConfig::default())
    }
}

#[async_trait]
impl ActorSystem for LocalActorSystem {
    async fn ask(
        &self,
        target: &ProxyTarget,
        message: TaskMessage,
        timeout: Duration,
    ) -> Result<PendingReply, DeliveryError> {
        let actors = self.actors.read().await;
        let entry = actors
            .get(target.as_str())
            .ok_or_else(|| DeliveryError::UnknownTarget {
                target: target.to_string(),
            })?;

        let (reply, pending) = PendingReply::channel(target.clone());
        let envelope = Envelope {
            message,
            reply,
            deadline: Instant::now().checked_add(timeout),
        };

        entry.mailbox.try_send(envelope).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::MailboxFull {
                target: target.to_string(),
            },
            TrySendError::Closed(_) => DeliveryError::Disconnected {
                target: target.to_string(),
            },
        })?;

        Ok(pending)
    }
}

async fn run_actor(
    context: ActorContext,
    mut handler: Box<dyn TaskHandler>,
    mut inbox: mpsc::Receiver<Envelope>,
) {
    while let Some(Envelope {
        message,
        reply,
        deadline,
    }) = inbox.recv().await
    {
        if reply.is_closed() {
            debug!(
                "Actor '{}' skipping task {}: nobody is waiting",
                context.actor, message.id
            );
            continue;
        }

        let task_context = context.for_task(&message.id, deadline);
        let task_id = message.id.clone();
        let answer = match handler.handle(message, &task_context).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Actor '{}' failed task {}: {}", context.actor, task_id, e);
                TaskReply::Response(e.into())
            }
        };

        if !reply.send(answer) {
            debug!(
                "Actor '{}' discarded reply to task {}: asker stopped waiting",
                context.actor, task_id
            );
        }
    }

    if let Err(e) = handler.on_stop(&context).await {
        error!("Error during stop of actor '{}': {}", context.actor, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{RequestBuilder, StatusCode};
    use crate::transport::RawResponse;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl TaskHandler for Echo {
        async fn handle(
            &mut self,
            task: TaskMessage,
            _ctx: &ActorContext,
        ) -> Result<TaskReply, TaskError> {
            Ok(TaskReply::Response(
                RawResponse::new(StatusCode(200)).body(task.request.body_bytes()),
            ))
        }
    }

    struct Lifecycle {
        started: Arc<AtomicBool>,
        stopped: Arc<AtomicBool>,
        handled: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TaskHandler for Lifecycle {
        async fn on_start(&mut self, _ctx: &ActorContext) -> Result<(), TaskError> {
            self.started.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn handle(
            &mut self,
            _task: TaskMessage,
            _ctx: &ActorContext,
        ) -> Result<TaskReply, TaskError> {
            self.handled.fetch_add(1, Ordering::SeqCst);
            Ok(TaskReply::Text("ok".to_string()))
        }

        async fn on_stop(&mut self, _ctx: &ActorContext) -> Result<(), TaskError> {
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailsToStart;

    #[async_trait]
    impl TaskHandler for FailsToStart {
        async fn on_start(&mut self, _ctx: &ActorContext) -> Result<(), TaskError> {
            Err(TaskError::new("boom"))
        }

        async fn handle(
            &mut self,
            _task: TaskMessage,
            _ctx: &ActorContext,
        ) -> Result<TaskReply, TaskError> {
            unreachable!("never started")
        }
    }

    fn task(id: &str, body: &str) -> TaskMessage {
        let request = RequestBuilder::post("http://cluster/task")
            .add_body(body)
            .build()
            .unwrap();
        TaskMessage::new(id, request)
    }

    #[tokio::test]
    async fn test_ask_round_trip() {
        let system = LocalActorSystem::default();
        let target = system.spawn("echo", Box::new(Echo)).await.unwrap();

        let pending = system
            .ask(&target, task("t-1", "hello"), Duration::from_secs(1))
            .await
            .unwrap();

        match pending.await.unwrap() {
            TaskReply::Response(raw) => assert_eq!(raw.body.as_ref(), b"hello"),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_target() {
        let system = LocalActorSystem::default();
        let err = system
            .ask(&"missing".into(), task("t-1", ""), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DeliveryError::UnknownTarget {
                target: "missing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_duplicate_spawn_rejected() {
        let system = LocalActorSystem::default();
        system.spawn("echo", Box::new(Echo)).await.unwrap();
        assert!(system.spawn("echo", Box::new(Echo)).await.is_err());
        assert_eq!(system.list().await, vec!["echo".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_start_not_registered() {
        let system = LocalActorSystem::default();
        let err = system.spawn("bad", Box::new(FailsToStart)).await.unwrap_err();
        assert_eq!(err.message, "boom");
        assert!(!system.contains("bad").await);
    }

    #[tokio::test]
    async fn test_lifecycle_and_drain_on_stop() {
        let started = Arc::new(AtomicBool::new(false));
        let stopped = Arc::new(AtomicBool::new(false));
        let handled = Arc::new(AtomicUsize::new(0));
        let system = LocalActorSystem::default();

        let target = system
            .spawn(
                "life",
                Box::new(Lifecycle {
                    started: started.clone(),
                    stopped: stopped.clone(),
                    handled: handled.clone(),
                }),
            )
            .await
            .unwrap();
        assert!(started.load(Ordering::SeqCst));

        let first = system
            .ask(&target, task("t-1", ""), Duration::from_secs(1))
            .await
            .unwrap();
        let second = system
            .ask(&target, task("t-2", ""), Duration::from_secs(1))
            .await
            .unwrap();

        system.stop("life").await.unwrap();

        assert_eq!(first.await, Ok(TaskReply::Text("ok".to_string())));
        assert_eq!(second.await, Ok(TaskReply::Text("ok".to_string())));
        assert_eq!(handled.load(Ordering::SeqCst), 2);
        assert!(stopped.load(Ordering::SeqCst));
        assert!(!system.contains("life").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_aborts_stuck_actor_after_grace() {
        struct Stuck;

        #[async_trait]
        impl TaskHandler for Stuck {
            async fn handle(
                &mut self,
                _task: TaskMessage,
                _ctx: &ActorContext,
            ) -> Result<TaskReply, TaskError> {
                std::future::pending().await
            }
        }

        let system = LocalActorSystem::default().stop_grace(Duration::from_millis(200));
        let target = system.spawn("stuck", Box::new(Stuck)).await.unwrap();
        let pending = system
            .ask(&target, task("t-1", ""), Duration::from_secs(1))
            .await
            .unwrap();
        tokio::task::yield_now().await;

        let started = Instant::now();
        system.stop("stuck").await.unwrap();

        assert_eq!(started.elapsed(), Duration::from_millis(200));
        assert!(!system.contains("stuck").await);
        assert_eq!(
            pending.await,
            Err(DeliveryError::Disconnected {
                target: "stuck".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_ask_with_unbounded_timeout() {
        let system = LocalActorSystem::default();
        let target = system.spawn("echo", Box::new(Echo)).await.unwrap();

        let reply = system
            .ask(&target, task("t-1", "hi"), Duration::MAX)
            .await
            .unwrap()
            .await
            .unwrap();
        assert!(matches!(reply, TaskReply::Response(r) if r.body.as_ref() == b"hi"));
    }

    #[tokio::test]
    async fn test_stop_unknown_actor() {
        let system = LocalActorSystem::default();
        let err = system.stop("ghost").await.unwrap_err();
        assert_eq!(err.code, 404);
    }

    #[tokio::test]
    async fn test_full_mailbox_refuses() {
        struct Stuck;

        #[async_trait]
        impl TaskHandler for Stuck {
            async fn handle(
                &mut self,
                _task: TaskMessage,
                _ctx: &ActorContext,
            ) -> Result<TaskReply, TaskError> {
                std::future::pending().await
            }
        }

        let system = LocalActorSystem::with_capacity(1);
        let target = system.spawn("stuck", Box::new(Stuck)).await.unwrap();

        // The first task occupies the actor, the second fills the mailbox.
        let _busy = system
            .ask(&target, task("t-1", ""), Duration::from_secs(1))
            .await
            .unwrap();
        tokio::task::yield_now().await;
        let _queued = system
            .ask(&target, task("t-2", ""), Duration::from_secs(1))
            .await
            .unwrap();

        let err = system
            .ask(&target, task("t-3", ""), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DeliveryError::MailboxFull {
                target: "stuck".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_handler_error_becomes_error_response() {
        struct Rejects;

        #[async_trait]
        impl TaskHandler for Rejects {
            async fn handle(
                &mut self,
                _task: TaskMessage,
                _ctx: &ActorContext,
            ) -> Result<TaskReply, TaskError> {
                Err(TaskError::bad_request("missing field"))
            }
        }

        let system = LocalActorSystem::default();
        let target = system.spawn("rejects", Box::new(Rejects)).await.unwrap();
        let reply = system
            .ask(&target, task("t-1", ""), Duration::from_secs(1))
            .await
            .unwrap()
            .await
            .unwrap();

        match reply {
            TaskReply::Response(raw) => assert_eq!(raw.status.0, 400),
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}

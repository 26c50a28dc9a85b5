//! Thread-blocking front end for callers outside an async runtime.

use crate::dispatch::bridge::DispatchBridge;
use crate::dispatch::routing::DispatchRoute;
use crate::error::RequestError;
use crate::http::{Request, Response};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// Wraps a [`DispatchBridge`] and its own tokio runtime so that a plain
/// thread can dispatch and block until the bridge reaches a terminal state.
///
/// Must not be used (or dropped) from inside another tokio runtime.
pub struct BlockingBridge {
    bridge: DispatchBridge,
    runtime: Runtime,
}

impl BlockingBridge {
    /// Create a blocking bridge with a single background worker thread, which
    /// keeps local actors running between calls.
    pub fn new(bridge: DispatchBridge) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("relay-dispatch")
            .enable_all()
            .build()?;
        Ok(Self::with_runtime(bridge, runtime))
    }

    pub fn with_runtime(bridge: DispatchBridge, runtime: Runtime) -> Self {
        Self { bridge, runtime }
    }

    pub fn bridge(&self) -> &DispatchBridge {
        &self.bridge
    }

    /// Run a future on the bridge's runtime, e.g. to start actors.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Dispatch and block for at most `timeout` plus scheduling jitter.
    pub fn dispatch(&self, request: Request, timeout: Duration) -> Result<Response, RequestError> {
        self.runtime.block_on(self.bridge.dispatch(request, timeout))
    }

    /// Dispatch with the configured default timeout.
    pub fn dispatch_default(&self, request: Request) -> Result<Response, RequestError> {
        self.runtime.block_on(self.bridge.dispatch_default(request))
    }

    /// Dispatch over an explicit path.
    pub fn dispatch_via(
        &self,
        route: DispatchRoute,
        request: Request,
        timeout: Duration,
    ) -> Result<Response, RequestError> {
        self.runtime
            .block_on(self.bridge.dispatch_via(route, request, timeout))
    }
}

//! Dispatch of built requests over the direct or actor-proxy path.

mod blocking;
mod bridge;
mod routing;

pub use blocking::BlockingBridge;
pub use bridge::DispatchBridge;
pub use routing::{DispatchRoute, RouteRule, RouteTable};

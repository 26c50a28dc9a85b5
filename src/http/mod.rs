//! Request construction and response types.

mod body;
mod builder;
mod descriptor;
mod headers;
pub mod params;
mod request;
mod response;

pub use body::Body;
pub use builder::RequestBuilder;
pub use descriptor::RequestDescriptor;
pub use headers::Headers;
pub use request::{Request, RequestMethod};
pub use response::{Outcome, Payload, Response, StatusCode};

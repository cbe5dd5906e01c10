//! Request capability used by the step executor.

pub mod client;
pub mod method;
pub mod request;
pub mod response;

pub use client::{ReqwestTransport, Transport};
pub use method::HttpMethod;
pub use request::OutgoingRequest;
pub use response::HttpResponse;

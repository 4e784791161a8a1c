//! Shared plumbing for the pipeline crates.

pub mod env_file;
pub mod http;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use env_file::{EnvFile, EnvFileError};
pub use http::{BoxFuture, HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

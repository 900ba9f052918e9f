//! Client for the DeHashed API.
//!
//! `ApiClient` performs one authenticated POST per call and classifies the
//! outcome into an `ApiResult` or an `ApiError`. The operation catalog in
//! `operations` turns typed arguments into endpoint/payload pairs.

pub mod client;
pub mod error;
pub mod operations;
pub mod request;
pub mod transport;

pub use client::{resolve_api_key, ApiClient, ClientContext};
pub use error::{ApiError, ErrorKind};
pub use operations::{ChannelType, Operation, ReverseWhois, SearchRequest, TaskSpec, WhoisQuery};
pub use request::{ApiResult, Endpoint, LogicalRequest};
pub use transport::{HttpTransport, RawResponse, Transport};

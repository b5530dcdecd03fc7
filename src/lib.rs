//! `boundreq` is a blocking HTTP request engine with bounded attempts:
//! every attempt has a deadline covering connect, write and the whole body
//! read, decoded bodies are capped in size, and a pluggable checker and
//! backoff strategy drive retries.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use boundreq::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut request = HttpRequest::new("https://api.example.com/v1/items")?;
//!     request
//!         .set_method(HttpMethod::Post)
//!         .append_parameters(["name", "demo", "tag", "a&b"])?
//!         .append_header("Accept", "application/json")?
//!         .set_timeout(Duration::from_secs(3))?
//!         .set_max_size_bytes(4 * 1024 * 1024)?
//!         .set_retry_policy_with_strategy(
//!             3,
//!             RejectServerErrors,
//!             Backoff::linear(Duration::from_millis(100)),
//!         )?;
//!
//!     let response = request.execute_and_return_response()?;
//!     match response.failure() {
//!         Some(failure) => eprintln!("gave up: {failure}"),
//!         None => println!("status={} body={:?}", response.code(), response.text_lossy()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Failure Model
//!
//! - Invalid configuration is an [`Error`], returned by the offending setter
//!   or by `execute*` before any network activity.
//! - Transport failures (connect, deadline, size cap, decoding) never escape
//!   as errors. They produce an [`HttpResponse`] with code `-1` and an
//!   [`AttemptError`], which the [`ResponseChecker`] sees like any other
//!   response.
//! - The last attempt's response is returned whether or not the checker
//!   accepts it.

mod body;
mod client;
mod error;
mod method;
mod multimap;
mod payload;
mod proxy;
mod request;
mod response;
mod retry;
mod size;
mod util;

pub mod shortcuts;

pub use crate::client::{DEFAULT_MAX_REDIRECTS, HttpClient, HttpClientBuilder};
pub use crate::error::{AttemptError, Error, ErrorCode, FailureKind};
pub use crate::method::{HttpMethod, UnknownMethod};
pub use crate::multimap::NamedValues;
pub use crate::payload::Payload;
pub use crate::proxy::{
    HTTP_PROXY_HOST_ENV, HTTP_PROXY_PORT_ENV, HTTPS_PROXY_HOST_ENV, HTTPS_PROXY_PORT_ENV,
    PROXY_ENABLED_ENV, ProxyAddress, ProxySettings, resolve_proxy,
};
pub use crate::request::{
    DEFAULT_MAX_RETRY_COUNT, DEFAULT_MAX_SIZE_BYTES, DEFAULT_TIMEOUT, HttpRequest,
};
pub use crate::response::{HttpResponse, TRANSPORT_FAILURE_CODE};
pub use crate::retry::{Backoff, RejectServerErrors, ResponseChecker, RetryStrategy, TransportOk};
pub use crate::size::{
    BYTES_PER_GB, BYTES_PER_KB, BYTES_PER_MB, BYTES_PER_PB, BYTES_PER_TB, format_data_size,
    parse_data_size,
};

pub type BoundreqResult<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{
        AttemptError, Backoff, BoundreqResult, Error, ErrorCode, FailureKind, HttpClient,
        HttpClientBuilder, HttpMethod, HttpRequest, HttpResponse, NamedValues, Payload,
        ProxySettings, RejectServerErrors, ResponseChecker, RetryStrategy, TransportOk,
    };
}

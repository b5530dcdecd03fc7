use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;

use crate::error::AttemptError;
use crate::multimap::NamedValues;
use crate::size::format_data_size;

/// Status code reported when no status line was obtained, or when the body
/// could not be read to completion.
pub const TRANSPORT_FAILURE_CODE: i32 = -1;

/// Outcome of one attempt. Nothing in it can change after construction.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    code: i32,
    bytes: Option<Bytes>,
    headers: Option<HeaderMap>,
    failure: Option<Arc<AttemptError>>,
}

impl HttpResponse {
    pub(crate) fn completed(code: u16, bytes: Option<Bytes>, headers: Option<HeaderMap>) -> Self {
        Self {
            code: i32::from(code),
            bytes,
            headers,
            failure: None,
        }
    }

    pub(crate) fn failed(headers: Option<HeaderMap>, failure: AttemptError) -> Self {
        Self {
            code: TRANSPORT_FAILURE_CODE,
            bytes: None,
            headers,
            failure: Some(Arc::new(failure)),
        }
    }

    /// HTTP status, or [`TRANSPORT_FAILURE_CODE`].
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Decoded body; `None` when it was not requested or could not be read.
    pub fn bytes(&self) -> Option<&Bytes> {
        self.bytes.as_ref()
    }

    pub fn into_bytes(self) -> Option<Bytes> {
        self.bytes
    }

    pub fn text_lossy(&self) -> Option<String> {
        self.bytes
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Response headers; `None` when the connection failed before any arrived.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.headers.as_ref()
    }

    /// First value of `name` (case-insensitive), if it is valid visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    /// Headers as a multi-value map with lowercase names, in arrival order.
    pub fn headers_by_name(&self) -> NamedValues {
        let Some(headers) = &self.headers else {
            return NamedValues::new();
        };
        headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect()
    }

    pub fn failure(&self) -> Option<&AttemptError> {
        self.failure.as_deref()
    }

    pub fn has_failure(&self) -> bool {
        self.failure.is_some()
    }
}

impl fmt::Display for HttpResponse {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "HttpResponse{{code={}", self.code)?;
        if let Some(bytes) = &self.bytes {
            write!(formatter, ", body={}", format_data_size(bytes.len() as u64))?;
        }
        if let Some(headers) = &self.headers {
            write!(formatter, ", headers={}", headers.len())?;
        }
        if let Some(failure) = &self.failure {
            write!(formatter, ", failure={failure}")?;
        }
        formatter.write_str("}")
    }
}

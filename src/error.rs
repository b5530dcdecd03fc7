use std::fmt;

use thiserror::Error;

use crate::method::HttpMethod;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Phase of a single attempt that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    /// The connection could not be opened (DNS, refused, proxy, TLS handshake).
    Connect,
    /// The request body could not be prepared or written.
    Write,
    /// The exchange broke before a status line was obtained.
    Transport,
    /// The response body could not be read.
    Read,
    /// The attempt ran past its deadline.
    Deadline,
    /// The decoded response body grew past the configured cap.
    SizeLimit,
    /// The response body could not be decompressed.
    Decode,
}

impl FailureKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Write => "write",
            Self::Transport => "transport",
            Self::Read => "read",
            Self::Deadline => "deadline",
            Self::SizeLimit => "size_limit",
            Self::Decode => "decode",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Transport-level failure of one attempt, carried inside an
/// [`HttpResponse`](crate::HttpResponse) rather than returned as an error.
#[derive(Debug)]
pub struct AttemptError {
    kind: FailureKind,
    message: String,
    source: Option<BoxError>,
}

impl AttemptError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn with_source(
        kind: FailureKind,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_deadline(&self) -> bool {
        self.kind == FailureKind::Deadline
    }

    pub fn is_size_limit(&self) -> bool {
        self.kind == FailureKind::SizeLimit
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} ({})", self.message, self.kind)?;
        if let Some(source) = &self.source {
            write!(formatter, ": {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AttemptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    InvalidUrl,
    OddItemCount,
    BlankName,
    InvalidHeaderName,
    InvalidHeaderValue,
    PayloadConflict,
    BodyNotAllowed,
    NonPositive,
    MissingName,
    IndexOutOfRange,
    AmbiguousValue,
    InvalidDataSize,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::OddItemCount => "odd_item_count",
            Self::BlankName => "blank_name",
            Self::InvalidHeaderName => "invalid_header_name",
            Self::InvalidHeaderValue => "invalid_header_value",
            Self::PayloadConflict => "payload_conflict",
            Self::BodyNotAllowed => "body_not_allowed",
            Self::NonPositive => "non_positive",
            Self::MissingName => "missing_name",
            Self::IndexOutOfRange => "index_out_of_range",
            Self::AmbiguousValue => "ambiguous_value",
            Self::InvalidDataSize => "invalid_data_size",
        }
    }
}

/// Usage errors: raised synchronously by the call that breaks the contract,
/// before any state changes and before any network activity.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("'{url}' is not a valid URL")]
    InvalidUrl { url: String },
    #[error(
        "{argument}s should be given as name/value pairs, but an odd number of items ({count}) was found"
    )]
    OddItemCount { argument: &'static str, count: usize },
    #[error("each {argument} name should be a non-blank string, but found '{name}'")]
    BlankName { argument: &'static str, name: String },
    #[error("invalid header name {name}: {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },
    #[error("invalid header value for {name}: {source}")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },
    #[error("can't send parameters and binary entity with a single request")]
    PayloadConflict,
    #[error("can't write binary entity to '{url}' with {method} method")]
    BodyNotAllowed { method: HttpMethod, url: String },
    #[error("argument '{argument}' is zero or negative")]
    NonPositive { argument: &'static str },
    #[error("there is no {argument} named '{name}'")]
    MissingName { argument: &'static str, name: String },
    #[error("{argument} '{name}' has no value at index {index} ({len} values present)")]
    IndexOutOfRange {
        argument: &'static str,
        name: String,
        index: usize,
        len: usize,
    },
    #[error("expected only one {argument} named '{name}' but {count} have been found")]
    AmbiguousValue {
        argument: &'static str,
        name: String,
        count: usize,
    },
    #[error("'{text}' is not a valid data size")]
    InvalidDataSize { text: String },
}

impl Error {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidUrl { .. } => ErrorCode::InvalidUrl,
            Self::OddItemCount { .. } => ErrorCode::OddItemCount,
            Self::BlankName { .. } => ErrorCode::BlankName,
            Self::InvalidHeaderName { .. } => ErrorCode::InvalidHeaderName,
            Self::InvalidHeaderValue { .. } => ErrorCode::InvalidHeaderValue,
            Self::PayloadConflict => ErrorCode::PayloadConflict,
            Self::BodyNotAllowed { .. } => ErrorCode::BodyNotAllowed,
            Self::NonPositive { .. } => ErrorCode::NonPositive,
            Self::MissingName { .. } => ErrorCode::MissingName,
            Self::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            Self::AmbiguousValue { .. } => ErrorCode::AmbiguousValue,
            Self::InvalidDataSize { .. } => ErrorCode::InvalidDataSize,
        }
    }
}

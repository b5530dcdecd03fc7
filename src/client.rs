use std::thread::sleep;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::{CONNECTION, CONTENT_ENCODING, CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, Method, Uri};
use tracing::{debug, info_span, warn};

use crate::BoundreqResult;
use crate::body::{
    ContentEncoding, DeadlineReader, ReadBodyError, decoding_reader, read_to_end_limited,
    should_decode,
};
use crate::error::{AttemptError, Error, FailureKind};
use crate::payload::gzip_body;
use crate::proxy::ProxySettings;
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::size::format_data_size;
use crate::util::{parse_header_name, parse_header_value, redact_url_for_logs};

pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Runs [`HttpRequest`]s: one blocking attempt at a time, retried as the
/// request's checker and strategy dictate.
///
/// The client holds configuration only. Each attempt opens its own
/// connection and closes it before returning, so a client can be shared
/// freely between threads.
#[derive(Clone, Debug)]
pub struct HttpClient {
    proxy: ProxySettings,
    max_redirects: u32,
}

impl Default for HttpClient {
    fn default() -> Self {
        HttpClientBuilder::default().build()
    }
}

#[derive(Clone, Debug)]
pub struct HttpClientBuilder {
    proxy: ProxySettings,
    max_redirects: u32,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            proxy: ProxySettings::disabled(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl HttpClientBuilder {
    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = proxy;
        self
    }

    /// Reads proxy settings from `BOUNDREQ_*` environment variables.
    pub fn proxy_from_env(self) -> Self {
        self.proxy(ProxySettings::from_env())
    }

    /// Redirects are followed transparently up to this many hops; `0` returns
    /// the redirect response itself.
    pub fn max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn build(self) -> HttpClient {
        HttpClient {
            proxy: self.proxy,
            max_redirects: self.max_redirects,
        }
    }
}

/// Everything about a request that stays the same across attempts.
struct PreparedRequest {
    method: Method,
    uri: Uri,
    scheme: String,
    redacted_url: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    gzip: bool,
    timeout: Duration,
    max_size_bytes: usize,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn proxy_settings(&self) -> &ProxySettings {
        &self.proxy
    }

    pub fn max_redirects(&self) -> u32 {
        self.max_redirects
    }

    /// Runs every attempt the request allows and returns the response of the
    /// last one performed, body included.
    ///
    /// Only precondition failures are returned as `Err`, always before any
    /// network activity. Transport failures come back as a response with code
    /// `-1` and a [`failure`](HttpResponse::failure).
    pub fn execute(&self, request: &HttpRequest) -> BoundreqResult<HttpResponse> {
        self.execute_attempts(request, true)
    }

    /// Like [`execute`](Self::execute), without reading response bodies.
    pub fn execute_for_code(&self, request: &HttpRequest) -> BoundreqResult<i32> {
        self.execute_attempts(request, false)
            .map(|response| response.code())
    }

    fn execute_attempts(
        &self,
        request: &HttpRequest,
        read_body: bool,
    ) -> BoundreqResult<HttpResponse> {
        let prepared = prepare(request)?;
        let max_attempts = request.max_retry_count().max(1);
        let span = info_span!(
            "boundreq.execute",
            method = %prepared.method,
            uri = %prepared.redacted_url,
            max_attempts = max_attempts
        );
        let _enter = span.enter();

        for attempt in 1..max_attempts {
            let response = self.run_attempt(&prepared, attempt, max_attempts, read_body);
            if request.response_checker().accepts(&response) {
                return Ok(response);
            }
            let delay = request.retry_strategy().delay_for_attempt(attempt);
            debug!(
                attempt = attempt,
                code = response.code(),
                delay_ms = delay.as_millis() as u64,
                "response rejected, retrying"
            );
            if !delay.is_zero() {
                sleep(delay);
            }
        }
        Ok(self.run_attempt(&prepared, max_attempts, max_attempts, read_body))
    }

    fn run_attempt(
        &self,
        prepared: &PreparedRequest,
        attempt: usize,
        max_attempts: usize,
        read_body: bool,
    ) -> HttpResponse {
        let started = Instant::now();
        debug!(attempt = attempt, max_attempts = max_attempts, "sending attempt");

        let response = self.attempt(prepared, started, read_body);
        match response.failure() {
            Some(failure) => warn!(
                attempt = attempt,
                kind = failure.kind().as_str(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %failure,
                "attempt failed"
            ),
            None => debug!(
                attempt = attempt,
                status = response.code(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "attempt completed"
            ),
        }
        response
    }

    /// One connect/write/read cycle. The agent, and with it the connection,
    /// is dropped before this returns.
    fn attempt(&self, prepared: &PreparedRequest, started: Instant, read_body: bool) -> HttpResponse {
        let agent = self.make_agent(prepared);

        let sent = match &prepared.body {
            Some(body) => {
                let body = match encode_body(body, prepared.gzip) {
                    Ok(body) => body,
                    Err(failure) => return HttpResponse::failed(None, failure),
                };
                build_request(prepared, body).map(|request| agent.run(request))
            }
            None => build_request(prepared, ()).map(|request| agent.run(request)),
        };
        let mut response = match sent {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                let kind = classify_ureq_error(&error);
                let message = match kind {
                    FailureKind::Deadline => format!(
                        "no response from '{}' within {}ms",
                        prepared.redacted_url,
                        prepared.timeout.as_millis()
                    ),
                    _ => format!("can't exchange with '{}'", prepared.redacted_url),
                };
                return HttpResponse::failed(None, AttemptError::with_source(kind, message, error));
            }
            Err(error) => {
                return HttpResponse::failed(
                    None,
                    AttemptError::with_source(
                        FailureKind::Write,
                        format!("can't build request to '{}'", prepared.redacted_url),
                        error,
                    ),
                );
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        if !read_body {
            return HttpResponse::completed(status.as_u16(), None, Some(headers));
        }

        let encoding = if should_decode(&prepared.method, status) {
            ContentEncoding::from_headers(&headers)
        } else {
            ContentEncoding::Identity
        };
        let raw = DeadlineReader::new(
            response.body_mut().as_reader(),
            started,
            prepared.timeout,
        );
        let read = decoding_reader(encoding, raw)
            .map_err(ReadBodyError::Read)
            .and_then(|mut reader| read_to_end_limited(&mut reader, prepared.max_size_bytes));

        match read {
            Ok(bytes) => HttpResponse::completed(status.as_u16(), Some(bytes), Some(headers)),
            Err(ReadBodyError::TooLarge { actual_bytes }) => HttpResponse::failed(
                Some(headers),
                AttemptError::new(
                    FailureKind::SizeLimit,
                    format!(
                        "response body from '{}' exceeds the {} limit ({actual_bytes} bytes read)",
                        prepared.redacted_url,
                        format_data_size(prepared.max_size_bytes as u64)
                    ),
                ),
            ),
            Err(ReadBodyError::Read(error)) => {
                let kind = classify_read_error(&error, encoding);
                let message = match kind {
                    FailureKind::Deadline => format!(
                        "can't read response from '{}' within {}ms",
                        prepared.redacted_url,
                        prepared.timeout.as_millis()
                    ),
                    FailureKind::Decode => format!(
                        "can't decode {} response from '{}'",
                        encoding.as_str(),
                        prepared.redacted_url
                    ),
                    _ => format!("can't read response from '{}'", prepared.redacted_url),
                };
                HttpResponse::failed(Some(headers), AttemptError::with_source(kind, message, error))
            }
        }
    }

    fn make_agent(&self, prepared: &PreparedRequest) -> ureq::Agent {
        let proxy = self
            .proxy
            .resolve(&prepared.scheme)
            .and_then(|address| match ureq::Proxy::new(&address.to_uri()) {
                Ok(proxy) => Some(proxy),
                Err(error) => {
                    debug!(proxy = %address, error = %error, "ignoring unusable proxy");
                    None
                }
            });
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(self.max_redirects)
            .max_idle_connections(0)
            .max_idle_connections_per_host(0)
            .timeout_global(Some(prepared.timeout))
            .timeout_connect(Some(prepared.timeout))
            .proxy(proxy)
            .build();
        config.new_agent()
    }
}

fn prepare(request: &HttpRequest) -> BoundreqResult<PreparedRequest> {
    request.check_sendable()?;

    let outgoing = request.outgoing_url();
    let invalid = || Error::InvalidUrl {
        url: outgoing.clone(),
    };
    let url = url::Url::parse(&outgoing).map_err(|_| invalid())?;
    let uri = url.as_str().parse::<Uri>().map_err(|_| invalid())?;

    let body = request.outgoing_body();
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    if let Some(content_type) = request.payload().content_type()
        && body.is_some()
    {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        if request.is_gzip() {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        }
    }
    for (name, values) in request.header_values().iter() {
        let header_name = parse_header_name(name)?;
        for (index, value) in values.iter().enumerate() {
            let header_value = parse_header_value(name, value)?;
            if index == 0 {
                headers.insert(header_name.clone(), header_value);
            } else {
                headers.append(header_name.clone(), header_value);
            }
        }
    }

    // Write methods always send a body so the length is explicit.
    let body = match body {
        Some(body) => Some(body),
        None if request.method().allows_body() => Some(Bytes::new()),
        None => None,
    };

    Ok(PreparedRequest {
        method: request.method().into(),
        uri,
        scheme: url.scheme().to_owned(),
        redacted_url: redact_url_for_logs(&outgoing),
        headers,
        body,
        gzip: request.is_gzip() && request.payload().content_type().is_some(),
        timeout: request.timeout(),
        max_size_bytes: request.max_size_bytes(),
    })
}

fn encode_body(body: &Bytes, gzip: bool) -> Result<Vec<u8>, AttemptError> {
    if !gzip {
        return Ok(body.to_vec());
    }
    gzip_body(body).map_err(|error| {
        AttemptError::with_source(FailureKind::Write, "can't compress request body", error)
    })
}

fn build_request<B>(prepared: &PreparedRequest, body: B) -> Result<http::Request<B>, http::Error>
where
    B: ureq::AsSendBody,
{
    let mut builder = http::Request::builder()
        .method(prepared.method.clone())
        .uri(prepared.uri.clone());
    for (name, value) in &prepared.headers {
        builder = builder.header(name, value);
    }
    builder.body(body)
}

fn classify_ureq_error(error: &ureq::Error) -> FailureKind {
    match error {
        ureq::Error::Timeout(_) => FailureKind::Deadline,
        ureq::Error::HostNotFound
        | ureq::Error::ConnectionFailed
        | ureq::Error::ConnectProxyFailed(_) => FailureKind::Connect,
        ureq::Error::Io(source) => match source.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => FailureKind::Deadline,
            std::io::ErrorKind::NotFound
            | std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected
            | std::io::ErrorKind::AddrNotAvailable => FailureKind::Connect,
            _ => FailureKind::Transport,
        },
        _ => FailureKind::Transport,
    }
}

fn classify_read_error(error: &std::io::Error, encoding: ContentEncoding) -> FailureKind {
    if matches!(
        error.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    ) {
        return FailureKind::Deadline;
    }
    if let Some(ureq_error) = wrapped_ureq_error(error) {
        return match classify_ureq_error(ureq_error) {
            FailureKind::Deadline => FailureKind::Deadline,
            _ => FailureKind::Read,
        };
    }
    if encoding != ContentEncoding::Identity
        && matches!(
            error.kind(),
            std::io::ErrorKind::InvalidData | std::io::ErrorKind::InvalidInput
        )
    {
        return FailureKind::Decode;
    }
    FailureKind::Read
}

fn wrapped_ureq_error(io_error: &std::io::Error) -> Option<&ureq::Error> {
    io_error
        .get_ref()
        .and_then(|source| source.downcast_ref::<ureq::Error>())
}

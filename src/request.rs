use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::BoundreqResult;
use crate::client::HttpClient;
use crate::error::Error;
use crate::method::HttpMethod;
use crate::multimap::NamedValues;
use crate::payload::Payload;
use crate::response::HttpResponse;
use crate::retry::{Backoff, ResponseChecker, RetryStrategy, TransportOk};
use crate::util::{
    append_query_pair, encode_component, is_blank, parse_header_name, parse_header_value,
    validate_url,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_MAX_RETRY_COUNT: usize = 1;
pub const DEFAULT_MAX_SIZE_BYTES: usize = 1024 * 1024 * 1024;

const PARAMETER: &str = "parameter";
const HEADER: &str = "header";

/// Mutable description of a request, configured first and executed afterwards.
///
/// Every setter checks its arguments before touching any state, so a call
/// that returns an error leaves the request exactly as it was.
///
/// ```no_run
/// use std::time::Duration;
/// use boundreq::prelude::*;
///
/// let mut request = HttpRequest::new("http://127.0.0.1:8081/data")?;
/// request
///     .append_parameter("size", 1024)?
///     .set_timeout(Duration::from_secs(2))?
///     .set_retry_policy(3, RejectServerErrors)?;
/// let response = request.execute_and_return_response()?;
/// println!("{response}");
/// # Ok::<(), boundreq::Error>(())
/// ```
#[derive(Clone)]
pub struct HttpRequest {
    url: String,
    method: HttpMethod,
    payload: Payload,
    headers: NamedValues,
    gzip: bool,
    timeout: Duration,
    max_retry_count: usize,
    response_checker: Arc<dyn ResponseChecker>,
    retry_strategy: Arc<dyn RetryStrategy>,
    max_size_bytes: usize,
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HttpRequest")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("payload", &self.payload)
            .field("headers", &self.headers)
            .field("gzip", &self.gzip)
            .field("timeout", &self.timeout)
            .field("max_retry_count", &self.max_retry_count)
            .field("max_size_bytes", &self.max_size_bytes)
            .finish_non_exhaustive()
    }
}

impl HttpRequest {
    pub fn new(url: impl Into<String>) -> BoundreqResult<Self> {
        let url = url.into();
        validate_url(&url)?;
        Ok(Self {
            url,
            method: HttpMethod::default(),
            payload: Payload::Empty,
            headers: NamedValues::new(),
            gzip: false,
            timeout: DEFAULT_TIMEOUT,
            max_retry_count: DEFAULT_MAX_RETRY_COUNT,
            response_checker: Arc::new(TransportOk),
            retry_strategy: Arc::new(Backoff::default()),
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
        })
    }

    /// Creates a request with initial parameters given as alternating names and values.
    pub fn create<I, S>(url: impl Into<String>, parameters: I) -> BoundreqResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut request = Self::new(url)?;
        request.append_parameters(parameters)?;
        Ok(request)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn set_method(&mut self, method: HttpMethod) -> &mut Self {
        self.method = method;
        self
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn parameters(&self, name: &str) -> &[String] {
        match &self.payload {
            Payload::Parameters(parameters) => parameters.get(name),
            _ => &[],
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters(name).first().map(String::as_str)
    }

    /// Like [`parameter`](Self::parameter), but more than one value is an error.
    pub fn single_parameter(&self, name: &str) -> BoundreqResult<Option<&str>> {
        single_value(PARAMETER, name, self.parameters(name))
    }

    pub fn parameters_snapshot(&self) -> NamedValues {
        self.payload.parameters().cloned().unwrap_or_default()
    }

    /// Appends alternating names and values. Both are form-encoded here.
    pub fn append_parameters<I, S>(&mut self, parameters: I) -> BoundreqResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pairs = self.validated_parameters(parameters)?;
        self.edit_parameters(|parameters| {
            for (name, value) in pairs {
                parameters.append(name, value);
            }
        });
        Ok(self)
    }

    pub fn append_parameter(
        &mut self,
        name: &str,
        value: impl Display,
    ) -> BoundreqResult<&mut Self> {
        let value = value.to_string();
        self.append_parameters([name, value.as_str()])
    }

    /// Inserts alternating names and values in front of existing values, keeping
    /// their relative order.
    pub fn prepend_parameters<I, S>(&mut self, parameters: I) -> BoundreqResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pairs = self.validated_parameters(parameters)?;
        self.edit_parameters(|parameters| {
            for (name, value) in pairs.into_iter().rev() {
                parameters.prepend(name, value);
            }
        });
        Ok(self)
    }

    pub fn prepend_parameter(
        &mut self,
        name: &str,
        value: impl Display,
    ) -> BoundreqResult<&mut Self> {
        let value = value.to_string();
        self.prepend_parameters([name, value.as_str()])
    }

    pub fn remove_parameters(&mut self, name: &str) -> BoundreqResult<&mut Self> {
        self.require_parameter(name)?;
        self.edit_parameters(|parameters| parameters.remove_all(name));
        Ok(self)
    }

    pub fn remove_parameter(&mut self, name: &str, index: usize) -> BoundreqResult<&mut Self> {
        let len = self.require_parameter(name)?;
        check_index(PARAMETER, name, index, len)?;
        self.edit_parameters(|parameters| parameters.remove_at(name, index));
        Ok(self)
    }

    pub fn remove_first_parameter(&mut self, name: &str) -> BoundreqResult<&mut Self> {
        self.require_parameter(name)?;
        self.edit_parameters(|parameters| parameters.remove_first(name));
        Ok(self)
    }

    pub fn remove_last_parameter(&mut self, name: &str) -> BoundreqResult<&mut Self> {
        self.require_parameter(name)?;
        self.edit_parameters(|parameters| parameters.remove_last(name));
        Ok(self)
    }

    pub fn remove_all_parameters(&mut self) -> &mut Self {
        self.edit_parameters(NamedValues::clear);
        self
    }

    pub fn binary_entity(&self) -> Option<&Bytes> {
        self.payload.binary()
    }

    pub fn has_binary_entity(&self) -> bool {
        self.payload.binary().is_some()
    }

    /// Raw body for write methods. Fails when parameters are already attached.
    pub fn set_binary_entity(&mut self, entity: impl Into<Bytes>) -> BoundreqResult<&mut Self> {
        if matches!(self.payload, Payload::Parameters(_)) {
            return Err(Error::PayloadConflict);
        }
        self.payload = Payload::Binary(entity.into());
        Ok(self)
    }

    pub fn remove_binary_entity(&mut self) -> &mut Self {
        if self.has_binary_entity() {
            self.payload = Payload::Empty;
        }
        self
    }

    pub fn is_gzip(&self) -> bool {
        self.gzip
    }

    /// Compresses the request body. Many servers do not accept compressed
    /// form parameters in their default configuration.
    pub fn set_gzip(&mut self, gzip: bool) -> &mut Self {
        self.gzip = gzip;
        self
    }

    pub fn headers(&self, name: &str) -> &[String] {
        self.headers.get(name)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.first(name)
    }

    pub fn single_header(&self, name: &str) -> BoundreqResult<Option<&str>> {
        single_value(HEADER, name, self.headers.get(name))
    }

    pub fn headers_snapshot(&self) -> NamedValues {
        self.headers.clone()
    }

    /// Appends alternating header names and values. Values are sent as given.
    pub fn append_headers<I, S>(&mut self, headers: I) -> BoundreqResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (name, value) in validated_headers(headers)? {
            self.headers.append(name, value);
        }
        Ok(self)
    }

    pub fn append_header(&mut self, name: &str, value: &str) -> BoundreqResult<&mut Self> {
        self.append_headers([name, value])
    }

    pub fn prepend_headers<I, S>(&mut self, headers: I) -> BoundreqResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (name, value) in validated_headers(headers)?.into_iter().rev() {
            self.headers.prepend(name, value);
        }
        Ok(self)
    }

    pub fn prepend_header(&mut self, name: &str, value: &str) -> BoundreqResult<&mut Self> {
        self.prepend_headers([name, value])
    }

    pub fn remove_headers(&mut self, name: &str) -> BoundreqResult<&mut Self> {
        self.headers
            .remove_all(name)
            .ok_or_else(|| missing(HEADER, name))?;
        Ok(self)
    }

    pub fn remove_header(&mut self, name: &str, index: usize) -> BoundreqResult<&mut Self> {
        let len = self.headers.get(name).len();
        if len == 0 {
            return Err(missing(HEADER, name));
        }
        check_index(HEADER, name, index, len)?;
        self.headers.remove_at(name, index);
        Ok(self)
    }

    pub fn remove_first_header(&mut self, name: &str) -> BoundreqResult<&mut Self> {
        self.headers
            .remove_first(name)
            .ok_or_else(|| missing(HEADER, name))?;
        Ok(self)
    }

    pub fn remove_last_header(&mut self, name: &str) -> BoundreqResult<&mut Self> {
        self.headers
            .remove_last(name)
            .ok_or_else(|| missing(HEADER, name))?;
        Ok(self)
    }

    pub fn remove_all_headers(&mut self) -> &mut Self {
        self.headers.clear();
        self
    }

    pub(crate) fn header_values(&self) -> &NamedValues {
        &self.headers
    }

    /// One deadline shared by connect, write and read of a single attempt.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> BoundreqResult<&mut Self> {
        if timeout.is_zero() {
            return Err(Error::NonPositive {
                argument: "timeout",
            });
        }
        self.timeout = timeout;
        Ok(self)
    }

    pub fn set_timeout_millis(&mut self, timeout_millis: u64) -> BoundreqResult<&mut Self> {
        self.set_timeout(Duration::from_millis(timeout_millis))
    }

    /// Total number of attempts, not additional retries.
    pub fn max_retry_count(&self) -> usize {
        self.max_retry_count
    }

    pub fn response_checker(&self) -> &dyn ResponseChecker {
        self.response_checker.as_ref()
    }

    pub fn retry_strategy(&self) -> &dyn RetryStrategy {
        self.retry_strategy.as_ref()
    }

    pub fn set_retry_policy(
        &mut self,
        max_retry_count: usize,
        response_checker: impl ResponseChecker + 'static,
    ) -> BoundreqResult<&mut Self> {
        self.set_retry_policy_with_strategy(max_retry_count, response_checker, Backoff::default())
    }

    pub fn set_retry_policy_with_strategy(
        &mut self,
        max_retry_count: usize,
        response_checker: impl ResponseChecker + 'static,
        retry_strategy: impl RetryStrategy + 'static,
    ) -> BoundreqResult<&mut Self> {
        if max_retry_count == 0 {
            return Err(Error::NonPositive {
                argument: "max_retry_count",
            });
        }
        self.max_retry_count = max_retry_count;
        self.response_checker = Arc::new(response_checker);
        self.retry_strategy = Arc::new(retry_strategy);
        Ok(self)
    }

    /// Cap on the decoded response body.
    pub fn max_size_bytes(&self) -> usize {
        self.max_size_bytes
    }

    pub fn set_max_size_bytes(&mut self, max_size_bytes: usize) -> BoundreqResult<&mut Self> {
        if max_size_bytes == 0 {
            return Err(Error::NonPositive {
                argument: "max_size_bytes",
            });
        }
        self.max_size_bytes = max_size_bytes;
        Ok(self)
    }

    /// Runs all attempts and returns the final status code, `-1` when the last
    /// attempt failed in transport. The body is not read.
    pub fn execute(&self) -> BoundreqResult<i32> {
        HttpClient::default().execute_for_code(self)
    }

    pub fn execute_and_return_response(&self) -> BoundreqResult<HttpResponse> {
        HttpClient::default().execute(self)
    }

    pub fn execute_with(&self, client: &HttpClient) -> BoundreqResult<HttpResponse> {
        client.execute(self)
    }

    /// Fails for a body on a method that can't carry one.
    pub(crate) fn check_sendable(&self) -> BoundreqResult<()> {
        if !self.method.allows_body() && self.has_binary_entity() {
            return Err(Error::BodyNotAllowed {
                method: self.method,
                url: self.url.clone(),
            });
        }
        Ok(())
    }

    /// URL put on the wire: GET/HEAD carry their parameters in the query string.
    pub(crate) fn outgoing_url(&self) -> String {
        let Payload::Parameters(parameters) = &self.payload else {
            return self.url.clone();
        };
        if self.method.allows_body() {
            return self.url.clone();
        }
        parameters
            .pairs()
            .fold(self.url.clone(), |url, (name, value)| {
                append_query_pair(&url, name, value)
            })
    }

    /// Body bytes for write methods, before compression.
    pub(crate) fn outgoing_body(&self) -> Option<Bytes> {
        if !self.method.allows_body() {
            return None;
        }
        self.payload.body_bytes()
    }

    fn validated_parameters<I, S>(&self, parameters: I) -> BoundreqResult<Vec<(String, String)>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.has_binary_entity() {
            return Err(Error::PayloadConflict);
        }
        validate_url(&self.url)?;
        Ok(validated_pairs(PARAMETER, parameters)?
            .into_iter()
            .map(|(name, value)| (encode_component(&name), encode_component(&value)))
            .collect())
    }

    fn require_parameter(&self, name: &str) -> BoundreqResult<usize> {
        match self.parameters(name).len() {
            0 => Err(missing(PARAMETER, name)),
            len => Ok(len),
        }
    }

    /// Applies `edit` to the parameter map, keeping the payload tag in sync.
    /// A binary payload is left alone.
    fn edit_parameters<R>(&mut self, edit: impl FnOnce(&mut NamedValues) -> R) -> R {
        match &mut self.payload {
            Payload::Parameters(parameters) => {
                let result = edit(parameters);
                if parameters.is_empty() {
                    self.payload = Payload::Empty;
                }
                result
            }
            Payload::Empty => {
                let mut parameters = NamedValues::new();
                let result = edit(&mut parameters);
                if !parameters.is_empty() {
                    self.payload = Payload::Parameters(parameters);
                }
                result
            }
            Payload::Binary(_) => edit(&mut NamedValues::new()),
        }
    }
}

fn validated_pairs<I, S>(argument: &'static str, items: I) -> BoundreqResult<Vec<(String, String)>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items = items
        .into_iter()
        .map(|item| item.as_ref().to_owned())
        .collect::<Vec<_>>();
    if items.len() % 2 != 0 {
        return Err(Error::OddItemCount {
            argument,
            count: items.len(),
        });
    }

    let mut pairs = Vec::with_capacity(items.len() / 2);
    let mut items = items.into_iter();
    while let (Some(name), Some(value)) = (items.next(), items.next()) {
        if is_blank(&name) {
            return Err(Error::BlankName { argument, name });
        }
        pairs.push((name, value));
    }
    Ok(pairs)
}

fn validated_headers<I, S>(headers: I) -> BoundreqResult<Vec<(String, String)>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pairs = validated_pairs(HEADER, headers)?;
    for (name, value) in &pairs {
        parse_header_name(name)?;
        parse_header_value(name, value)?;
    }
    Ok(pairs)
}

fn single_value<'a>(
    argument: &'static str,
    name: &str,
    values: &'a [String],
) -> BoundreqResult<Option<&'a str>> {
    match values {
        [] => Ok(None),
        [value] => Ok(Some(value.as_str())),
        _ => Err(Error::AmbiguousValue {
            argument,
            name: name.to_owned(),
            count: values.len(),
        }),
    }
}

fn check_index(argument: &'static str, name: &str, index: usize, len: usize) -> BoundreqResult<()> {
    if index >= len {
        return Err(Error::IndexOutOfRange {
            argument,
            name: name.to_owned(),
            index,
            len,
        });
    }
    Ok(())
}

fn missing(argument: &'static str, name: &str) -> Error {
    Error::MissingName {
        argument,
        name: name.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;

    use super::{DEFAULT_MAX_RETRY_COUNT, DEFAULT_MAX_SIZE_BYTES, DEFAULT_TIMEOUT, HttpRequest};
    use crate::error::ErrorCode;
    use crate::method::HttpMethod;
    use crate::payload::Payload;
    use crate::response::HttpResponse;

    fn request() -> HttpRequest {
        HttpRequest::new("http://127.0.0.1:8081/data").expect("valid url")
    }

    #[test]
    fn defaults_match_documented_values() {
        let request = request();
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(request.max_retry_count(), DEFAULT_MAX_RETRY_COUNT);
        assert_eq!(request.max_size_bytes(), DEFAULT_MAX_SIZE_BYTES);
        assert!(!request.is_gzip());
        assert!(request.payload().is_empty());
        assert_eq!(
            request.retry_strategy().delay_for_attempt(2),
            Duration::from_millis(500)
        );
        assert!(
            request
                .response_checker()
                .accepts(&HttpResponse::completed(500, None, None))
        );
    }

    #[test]
    fn construction_rejects_invalid_urls() {
        let error = HttpRequest::new("not a url").expect_err("invalid url");
        assert_eq!(error.code(), ErrorCode::InvalidUrl);
        let error = HttpRequest::create("", ["a", "b"]).expect_err("blank url");
        assert_eq!(error.code(), ErrorCode::InvalidUrl);
    }

    #[test]
    fn parameters_are_encoded_and_ordered() {
        let mut request = HttpRequest::create(
            "http://localhost/search",
            ["q", "rust lang", "tag", "a&b", "q", "second"],
        )
        .expect("valid parameters");
        request.append_parameter("size", 1024).expect("append");

        assert_eq!(request.parameters("q"), ["rust+lang", "second"]);
        assert_eq!(request.parameter("tag"), Some("a%26b"));
        assert_eq!(request.parameter("size"), Some("1024"));
        assert_eq!(
            request.outgoing_url(),
            "http://localhost/search?q=rust+lang&q=second&tag=a%26b&size=1024"
        );
        assert!(request.outgoing_body().is_none());
    }

    #[test]
    fn write_methods_send_parameters_in_body() {
        let mut request = request();
        request
            .set_method(HttpMethod::Post)
            .append_parameters(["a", "1", "b", "2"])
            .expect("append");

        assert_eq!(request.outgoing_url(), "http://127.0.0.1:8081/data");
        assert_eq!(
            request.outgoing_body(),
            Some(Bytes::from_static(b"a=1&b=2"))
        );
    }

    #[test]
    fn prepend_keeps_given_order_in_front() {
        let mut request = request();
        request.append_parameters(["k", "x"]).expect("append");
        request
            .prepend_parameters(["k", "1", "k", "2"])
            .expect("prepend");
        request.prepend_parameter("k", "0").expect("prepend one");

        assert_eq!(request.parameters("k"), ["0", "1", "2", "x"]);
    }

    #[test]
    fn invalid_pairs_leave_request_untouched() {
        let mut request = request();
        request.append_parameters(["a", "1"]).expect("append");

        let odd = request
            .append_parameters(["b", "2", "c"])
            .expect_err("odd count");
        assert_eq!(odd.code(), ErrorCode::OddItemCount);

        let blank = request
            .append_parameters(["b", "2", " ", "3"])
            .expect_err("blank name");
        assert_eq!(blank.code(), ErrorCode::BlankName);

        assert_eq!(
            request.parameters_snapshot().pairs().collect::<Vec<_>>(),
            vec![("a", "1")]
        );
    }

    #[test]
    fn parameters_and_binary_entity_exclude_each_other() {
        let mut request = request();
        request.set_method(HttpMethod::Put);
        request.set_binary_entity(vec![1_u8, 2, 3]).expect("entity");

        let error = request
            .append_parameters(["a", "1"])
            .expect_err("conflict");
        assert_eq!(error.code(), ErrorCode::PayloadConflict);
        assert_eq!(
            request.payload(),
            &Payload::Binary(Bytes::from_static(&[1, 2, 3]))
        );

        request.remove_binary_entity();
        request.append_parameters(["a", "1"]).expect("append");
        let error = request
            .set_binary_entity(Bytes::from_static(b"x"))
            .expect_err("conflict");
        assert_eq!(error.code(), ErrorCode::PayloadConflict);
        assert!(!request.has_binary_entity());
    }

    #[test]
    fn removing_parameters_requires_existing_name() {
        let mut request = HttpRequest::create("http://localhost/", ["a", "1", "a", "2", "a", "3"])
            .expect("parameters");

        request.remove_parameter("a", 1).expect("remove index");
        assert_eq!(request.parameters("a"), ["1", "3"]);

        let error = request.remove_parameter("a", 5).expect_err("index");
        assert_eq!(error.code(), ErrorCode::IndexOutOfRange);
        let error = request.remove_first_parameter("b").expect_err("missing");
        assert_eq!(error.code(), ErrorCode::MissingName);
        let error = request.remove_parameters("b").expect_err("missing");
        assert_eq!(error.code(), ErrorCode::MissingName);

        request.remove_last_parameter("a").expect("remove last");
        request.remove_first_parameter("a").expect("remove first");
        assert!(request.payload().is_empty());

        request.remove_all_parameters().remove_all_parameters();
        assert!(request.payload().is_empty());
    }

    #[test]
    fn remove_all_parameters_keeps_binary_entity() {
        let mut request = request();
        request.set_binary_entity(&b"raw"[..]).expect("entity");
        request.remove_all_parameters();
        assert!(request.has_binary_entity());
    }

    #[test]
    fn headers_keep_raw_values_and_order() {
        let mut request = request();
        request
            .append_headers(["X-Trace", "a b", "Accept", "text/plain"])
            .expect("append");
        request.append_header("X-Trace", "c").expect("append one");
        request.prepend_header("X-Trace", "first").expect("prepend");

        assert_eq!(request.headers("X-Trace"), ["first", "a b", "c"]);
        assert_eq!(request.header("Accept"), Some("text/plain"));
        assert_eq!(
            request.single_header("X-Trace").expect_err("many").code(),
            ErrorCode::AmbiguousValue
        );
        assert_eq!(request.single_header("Accept").expect("one"), Some("text/plain"));
        assert_eq!(request.single_header("Missing").expect("none"), None);

        let snapshot = request.headers_snapshot();
        request.remove_headers("X-Trace").expect("remove");
        assert_eq!(snapshot.get("X-Trace").len(), 3);
        assert!(request.headers("X-Trace").is_empty());
        assert_eq!(
            request.remove_last_header("X-Trace").expect_err("missing").code(),
            ErrorCode::MissingName
        );
    }

    #[test]
    fn malformed_headers_are_rejected() {
        let mut request = request();
        let error = request
            .append_header("Bad Name", "v")
            .expect_err("space in name");
        assert_eq!(error.code(), ErrorCode::InvalidHeaderName);
        let error = request
            .append_header("X-Ok", "line\nbreak")
            .expect_err("newline in value");
        assert_eq!(error.code(), ErrorCode::InvalidHeaderValue);
        assert!(request.headers_snapshot().is_empty());
    }

    #[test]
    fn non_positive_limits_are_rejected() {
        let mut request = request();
        assert_eq!(
            request.set_timeout_millis(0).expect_err("zero").code(),
            ErrorCode::NonPositive
        );
        assert_eq!(
            request.set_max_size_bytes(0).expect_err("zero").code(),
            ErrorCode::NonPositive
        );
        assert_eq!(
            request
                .set_retry_policy(0, |_: &HttpResponse| true)
                .expect_err("zero")
                .code(),
            ErrorCode::NonPositive
        );
        assert_eq!(request.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(request.max_retry_count(), 1);

        request
            .set_timeout_millis(950)
            .expect("timeout")
            .set_retry_policy_with_strategy(
                5,
                |response: &HttpResponse| response.code() < 500,
                |_: usize| Duration::ZERO,
            )
            .expect("policy");
        assert_eq!(request.timeout(), Duration::from_millis(950));
        assert_eq!(request.max_retry_count(), 5);
    }

    #[test]
    fn binary_entity_on_get_is_refused_before_sending() {
        let mut request = request();
        request.set_binary_entity(&b"payload"[..]).expect("entity");
        let error = request.check_sendable().expect_err("get with body");
        assert_eq!(error.code(), ErrorCode::BodyNotAllowed);

        request.set_method(HttpMethod::Post);
        assert!(request.check_sendable().is_ok());
        assert_eq!(
            request.outgoing_body(),
            Some(Bytes::from_static(b"payload"))
        );
    }
}

//! One-call helpers for the common GET and POST cases.
//!
//! `parameters` are alternating names and values, as accepted by
//! [`HttpRequest::append_parameters`]. A `timeout` of `None` keeps the
//! request default.

use std::time::Duration;

use crate::BoundreqResult;
use crate::method::HttpMethod;
use crate::request::HttpRequest;
use crate::response::HttpResponse;

pub fn new_request<I, S>(url: &str, parameters: I) -> BoundreqResult<HttpRequest>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    HttpRequest::create(url, parameters)
}

pub fn execute_get_request<I, S>(
    timeout: Option<Duration>,
    url: &str,
    parameters: I,
) -> BoundreqResult<i32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    shortcut(HttpMethod::Get, timeout, url, parameters)?.execute()
}

pub fn execute_get_request_and_return_response<I, S>(
    timeout: Option<Duration>,
    url: &str,
    parameters: I,
) -> BoundreqResult<HttpResponse>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    shortcut(HttpMethod::Get, timeout, url, parameters)?.execute_and_return_response()
}

pub fn execute_post_request<I, S>(
    timeout: Option<Duration>,
    url: &str,
    parameters: I,
) -> BoundreqResult<i32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    shortcut(HttpMethod::Post, timeout, url, parameters)?.execute()
}

pub fn execute_post_request_and_return_response<I, S>(
    timeout: Option<Duration>,
    url: &str,
    parameters: I,
) -> BoundreqResult<HttpResponse>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    shortcut(HttpMethod::Post, timeout, url, parameters)?.execute_and_return_response()
}

fn shortcut<I, S>(
    method: HttpMethod,
    timeout: Option<Duration>,
    url: &str,
    parameters: I,
) -> BoundreqResult<HttpRequest>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut request = HttpRequest::create(url, parameters)?;
    request.set_method(method);
    if let Some(timeout) = timeout {
        request.set_timeout(timeout)?;
    }
    Ok(request)
}

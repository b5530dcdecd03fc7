use http::header::{HeaderName, HeaderValue};

use crate::error::Error;

pub(crate) fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Form-encodes one name or value (`application/x-www-form-urlencoded`, UTF-8).
pub(crate) fn encode_component(text: &str) -> String {
    url::form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

pub(crate) fn validate_url(url: &str) -> Result<(), Error> {
    let invalid = || Error::InvalidUrl {
        url: url.to_owned(),
    };
    if is_blank(url) {
        return Err(invalid());
    }
    let parsed = url::Url::parse(url).map_err(|_| invalid())?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(invalid());
    }
    Ok(())
}

/// Appends an already encoded `name=value` pair to the query of `url`,
/// keeping any fragment at the end.
pub(crate) fn append_query_pair(url: &str, name: &str, value: &str) -> String {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((left, right)) => (left, Some(right)),
        None => (url, None),
    };

    let separator = match without_fragment.split_once('?') {
        None => "?",
        Some((_, "")) => "",
        Some((_, query)) if query.ends_with('&') => "",
        Some(_) => "&",
    };

    let mut appended = format!("{without_fragment}{separator}{name}={value}");
    if let Some(fragment) = fragment {
        appended.push('#');
        appended.push_str(fragment);
    }
    appended
}

pub(crate) fn parse_header_name(name: &str) -> Result<HeaderName, Error> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|source| Error::InvalidHeaderName {
        name: name.to_owned(),
        source,
    })
}

pub(crate) fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|source| Error::InvalidHeaderValue {
        name: name.to_owned(),
        source,
    })
}

pub(crate) fn redact_url_for_logs(url_text: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(url_text) else {
        return url_text.split('?').next().unwrap_or(url_text).to_owned();
    };

    let _ = parsed.set_username("");
    let _ = parsed.set_password(None);
    parsed.set_query(None);
    parsed.set_fragment(None);
    parsed.to_string()
}

use std::io::{self, Write};

use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;

use crate::multimap::NamedValues;

pub(crate) const OCTET_STREAM: &str = "application/octet-stream";
pub(crate) const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// What a request carries besides its headers.
///
/// Parameters and a binary entity are mutually exclusive, so they live in one
/// enum. Parameters of GET/HEAD requests are sent in the query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Payload {
    #[default]
    Empty,
    /// Form parameters, names and values already URL-encoded.
    Parameters(NamedValues),
    Binary(Bytes),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn parameters(&self) -> Option<&NamedValues> {
        match self {
            Self::Parameters(parameters) => Some(parameters),
            _ => None,
        }
    }

    pub fn binary(&self) -> Option<&Bytes> {
        match self {
            Self::Binary(entity) => Some(entity),
            _ => None,
        }
    }

    pub(crate) fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Parameters(_) => Some(FORM_URLENCODED),
            Self::Binary(_) => Some(OCTET_STREAM),
        }
    }

    /// Bytes to put on the wire, before optional compression.
    pub(crate) fn body_bytes(&self) -> Option<Bytes> {
        match self {
            Self::Empty => None,
            Self::Parameters(parameters) => Some(Bytes::from(encode_form(parameters))),
            Self::Binary(entity) => Some(entity.clone()),
        }
    }
}

/// Joins already encoded pairs as `name=value&name=value`.
pub(crate) fn encode_form(parameters: &NamedValues) -> String {
    let mut encoded = String::new();
    for (name, value) in parameters.pairs() {
        if !encoded.is_empty() {
            encoded.push('&');
        }
        encoded.push_str(name);
        encoded.push('=');
        encoded.push_str(value);
    }
    encoded
}

pub(crate) fn gzip_body(body: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(body.len() / 2 + 64), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use bytes::Bytes;
    use flate2::read::GzDecoder;

    use super::{FORM_URLENCODED, OCTET_STREAM, Payload, encode_form, gzip_body};
    use crate::multimap::NamedValues;

    #[test]
    fn form_encoding_repeats_names_per_value() {
        let parameters: NamedValues = [("a", "1"), ("b", "x+y"), ("a", "2")].into_iter().collect();
        assert_eq!(encode_form(&parameters), "a=1&a=2&b=x+y");
    }

    #[test]
    fn content_type_follows_payload_kind() {
        assert_eq!(Payload::Empty.content_type(), None);
        assert_eq!(
            Payload::Parameters(NamedValues::new()).content_type(),
            Some(FORM_URLENCODED)
        );
        assert_eq!(
            Payload::Binary(Bytes::from_static(b"x")).content_type(),
            Some(OCTET_STREAM)
        );
    }

    #[test]
    fn gzip_body_round_trips() {
        let original = b"Trololo \xd0\xa2 payload ".repeat(64);
        let compressed = gzip_body(&original).expect("gzip should succeed");
        assert!(compressed.len() < original.len());

        let mut decoded = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut decoded)
            .expect("gzip should decode");
        assert_eq!(decoded, original);
    }
}

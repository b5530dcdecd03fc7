use std::io::{self, Read};
use std::time::{Duration, Instant};

use bytes::Bytes;
use flate2::Crc;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use http::header::CONTENT_ENCODING;
use http::{HeaderMap, Method, StatusCode};

const READ_CHUNK_BYTES: usize = 8 * 1024;

const ZIP_LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const ZIP_LOCAL_HEADER_REST_BYTES: usize = 26;
const ZIP_FLAG_DATA_DESCRIPTOR: u16 = 0x0008;
const ZIP_METHOD_STORED: u16 = 0;
const ZIP_METHOD_DEFLATED: u16 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ContentEncoding {
    Identity,
    Gzip,
    Deflate,
    Zip,
}

impl ContentEncoding {
    /// Unknown or missing encodings are read as identity.
    pub(crate) fn from_headers(headers: &HeaderMap) -> Self {
        let Some(value) = headers
            .get(CONTENT_ENCODING)
            .and_then(|value| value.to_str().ok())
        else {
            return Self::Identity;
        };
        let value = value.trim();
        if value.eq_ignore_ascii_case("gzip") {
            Self::Gzip
        } else if value.eq_ignore_ascii_case("deflate") {
            Self::Deflate
        } else if value.eq_ignore_ascii_case("zip") {
            Self::Zip
        } else {
            Self::Identity
        }
    }

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
            Self::Zip => "zip",
        }
    }
}

/// Responses that cannot carry an encoded body are passed through untouched.
pub(crate) fn should_decode(method: &Method, status: StatusCode) -> bool {
    if *method == Method::HEAD {
        return false;
    }
    !(status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED)
}

pub(crate) fn decoding_reader<'a, R>(
    encoding: ContentEncoding,
    reader: R,
) -> io::Result<Box<dyn Read + 'a>>
where
    R: Read + 'a,
{
    Ok(match encoding {
        ContentEncoding::Identity => Box::new(reader),
        ContentEncoding::Gzip => Box::new(GzDecoder::new(reader)),
        ContentEncoding::Deflate => Box::new(ZlibDecoder::new(reader)),
        ContentEncoding::Zip => open_first_zip_entry(reader)?,
    })
}

/// Fails every read once `timeout` has passed since `started`.
///
/// The check runs between reads, so a read that is already blocked is only
/// bounded by the transport's own timeout.
pub(crate) struct DeadlineReader<R> {
    inner: R,
    started: Instant,
    timeout: Duration,
    bytes_read: u64,
}

impl<R> DeadlineReader<R> {
    pub(crate) fn new(inner: R, started: Instant, timeout: Duration) -> Self {
        Self {
            inner,
            started,
            timeout,
            bytes_read: 0,
        }
    }

    fn check_deadline(&self) -> io::Result<()> {
        let elapsed = self.started.elapsed();
        if elapsed > self.timeout {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!(
                    "read timed out after {}ms (limit {}ms, {} bytes received)",
                    elapsed.as_millis(),
                    self.timeout.as_millis(),
                    self.bytes_read
                ),
            ));
        }
        Ok(())
    }
}

impl<R: Read> Read for DeadlineReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_deadline()?;
        let read = self.inner.read(buf)?;
        self.bytes_read = self.bytes_read.saturating_add(read as u64);
        if read > 0 {
            self.check_deadline()?;
        }
        Ok(read)
    }
}

#[derive(Debug)]
pub(crate) enum ReadBodyError {
    Read(io::Error),
    TooLarge { actual_bytes: usize },
}

/// Reads everything, never holding more than `max_bytes` plus one chunk.
pub(crate) fn read_to_end_limited<R: Read>(
    reader: &mut R,
    max_bytes: usize,
) -> Result<Bytes, ReadBodyError> {
    let mut collected = Vec::new();
    let mut chunk = [0_u8; READ_CHUNK_BYTES];

    loop {
        let read = match reader.read(&mut chunk) {
            Ok(read) => read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(ReadBodyError::Read(error)),
        };
        if read == 0 {
            break;
        }
        let needed = collected.len().saturating_add(read);
        if needed > max_bytes {
            return Err(ReadBodyError::TooLarge {
                actual_bytes: needed,
            });
        }
        if needed > collected.capacity() {
            let target = collected
                .capacity()
                .saturating_mul(2)
                .max(needed)
                .min(max_bytes);
            collected.reserve_exact(target - collected.len());
        }
        collected.extend_from_slice(&chunk[..read]);
    }

    Ok(Bytes::from(collected))
}

/// Positions `reader` on the data of the first local entry of a zip stream.
/// A stream that does not start with a local entry decodes to nothing.
fn open_first_zip_entry<'a, R>(mut reader: R) -> io::Result<Box<dyn Read + 'a>>
where
    R: Read + 'a,
{
    let mut signature = [0_u8; 4];
    if read_fully_or_eof(&mut reader, &mut signature)? < signature.len()
        || u32::from_le_bytes(signature) != ZIP_LOCAL_HEADER_SIGNATURE
    {
        return Ok(Box::new(io::empty()));
    }

    let mut header = [0_u8; ZIP_LOCAL_HEADER_REST_BYTES];
    reader.read_exact(&mut header)?;
    let u16_at = |offset: usize| u16::from_le_bytes([header[offset], header[offset + 1]]);
    let u32_at = |offset: usize| {
        u32::from_le_bytes([
            header[offset],
            header[offset + 1],
            header[offset + 2],
            header[offset + 3],
        ])
    };

    let flags = u16_at(2);
    let method = u16_at(4);
    let crc = u32_at(10);
    let compressed_size = u64::from(u32_at(14));
    let uncompressed_size = u64::from(u32_at(18));
    let skip = u64::from(u16_at(22)) + u64::from(u16_at(24));
    io::copy(&mut (&mut reader).take(skip), &mut io::sink())?;

    let sizes_known = flags & ZIP_FLAG_DATA_DESCRIPTOR == 0;
    let expected = sizes_known.then_some((crc, uncompressed_size));
    match method {
        ZIP_METHOD_STORED if sizes_known => Ok(Box::new(ChecksumReader::new(
            reader.take(compressed_size),
            expected,
        ))),
        ZIP_METHOD_STORED => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "stored zip entry without sizes in its local header",
        )),
        ZIP_METHOD_DEFLATED if sizes_known => Ok(Box::new(ChecksumReader::new(
            DeflateDecoder::new(reader.take(compressed_size)),
            expected,
        ))),
        ZIP_METHOD_DEFLATED => Ok(Box::new(DeflateDecoder::new(reader))),
        other => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported zip compression method {other}"),
        )),
    }
}

fn read_fully_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
    Ok(filled)
}

struct ChecksumReader<R> {
    inner: R,
    crc: Crc,
    length: u64,
    expected: Option<(u32, u64)>,
}

impl<R> ChecksumReader<R> {
    fn new(inner: R, expected: Option<(u32, u64)>) -> Self {
        Self {
            inner,
            crc: Crc::new(),
            length: 0,
            expected,
        }
    }
}

impl<R: Read> Read for ChecksumReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        if read > 0 {
            self.crc.update(&buf[..read]);
            self.length = self.length.saturating_add(read as u64);
            return Ok(read);
        }
        if !buf.is_empty()
            && let Some((crc, length)) = self.expected
            && (self.crc.sum() != crc || self.length != length)
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "corrupt zip entry: expected crc {crc:08x} and {length} bytes, got crc {:08x} and {} bytes",
                    self.crc.sum(),
                    self.length
                ),
            ));
        }
        Ok(0)
    }
}

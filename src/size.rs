//! Human-readable data sizes with 1024-based units.

use crate::error::Error;

pub const BYTES_PER_KB: u64 = 1024;
pub const BYTES_PER_MB: u64 = 1024 * BYTES_PER_KB;
pub const BYTES_PER_GB: u64 = 1024 * BYTES_PER_MB;
pub const BYTES_PER_TB: u64 = 1024 * BYTES_PER_GB;
pub const BYTES_PER_PB: u64 = 1024 * BYTES_PER_TB;

const UNITS: [(u64, &str); 5] = [
    (BYTES_PER_PB, "PB"),
    (BYTES_PER_TB, "TB"),
    (BYTES_PER_GB, "GB"),
    (BYTES_PER_MB, "MB"),
    (BYTES_PER_KB, "kB"),
];

/// Formats `size` with the largest unit it reaches: `"1 GB"`, `"1.5 kB"`, `"12 B"`.
pub fn format_data_size(size: u64) -> String {
    for (unit, unit_name) in UNITS {
        if size >= unit {
            if size % unit == 0 {
                return format!("{} {unit_name}", size / unit);
            }
            return format!("{:.1} {unit_name}", size as f64 / unit as f64);
        }
    }
    format!("{size} B")
}

/// Parses sizes such as `"10 MB"`, `"1.5kB"`, `"2G"` or `"512"`. Blank input is zero.
pub fn parse_data_size(text: &str) -> Result<u64, Error> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    let invalid = || Error::InvalidDataSize {
        text: text.to_owned(),
    };

    let upper = trimmed.to_ascii_uppercase();
    let mut rest = upper.as_str();
    rest = rest.strip_suffix('B').unwrap_or(rest);

    let multiplier = match rest.chars().last() {
        Some('K') => BYTES_PER_KB,
        Some('M') => BYTES_PER_MB,
        Some('G') => BYTES_PER_GB,
        Some('T') => BYTES_PER_TB,
        Some('P') => BYTES_PER_PB,
        _ => 1,
    };
    if multiplier != 1 {
        rest = &rest[..rest.len() - 1];
    }
    rest = rest.strip_suffix(' ').unwrap_or(rest);

    if !is_valid_number(rest) {
        return Err(invalid());
    }
    let number = rest.parse::<f64>().map_err(|_| invalid())?;
    let bytes = number * multiplier as f64;
    if bytes >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(bytes as u64)
}

fn is_valid_number(text: &str) -> bool {
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text, None),
    };

    let integer_ok = integer == "0"
        || (!integer.is_empty()
            && integer.len() <= 6
            && !integer.starts_with('0')
            && integer.bytes().all(|byte| byte.is_ascii_digit()));
    let fraction_ok = fraction.is_none_or(|fraction| {
        !fraction.is_empty()
            && fraction.len() <= 5
            && fraction.bytes().all(|byte| byte.is_ascii_digit())
    });
    integer_ok && fraction_ok
}

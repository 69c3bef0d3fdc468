//! Date and date-time literal handling.
//!
//! Resolution accepts dates in two surface shapes: punctuated ISO-style
//! strings (`2019-03-27 08:45`) and compact all-digit literals
//! (`201903270845`). Compact literals are rewritten into the punctuated
//! form before use. A separate round-up step pads a partial literal with
//! maximal missing components so that `time <= bound` behaves as
//! "happened on or before this partial date", making partial-date bounds
//! inclusive.
//!
//! Field validation here is intentionally lenient (hour 24, minute 60 and
//! second 60 pass the shape check); `chrono` has the final say when a
//! bound is parsed into an instant.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::Result;
use crate::index::IndexSnapshot;

/// How a naive date-time literal is anchored to an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeZoneMode {
    /// The literal is in the caller's local time; shift by the configured
    /// offset to reach UTC.
    Local,
    /// The literal is already UTC.
    Utc,
}

/// Rewrite a compact all-digit date/time literal into punctuated form.
///
/// Exactly three shapes are allowed:
///
/// * 8 digits — `YYYYMMDD` becomes `YYYY-MM-DD`
/// * 12 digits — `YYYYMMDDHHMM` becomes `YYYY-MM-DD HH:MM`
/// * 14 digits — `YYYYMMDDHHMMSS` becomes `YYYY-MM-DD HH:MM:SS`
///
/// Any other length, any non-digit character, or a field outside the
/// accepted ranges (year 1970..=2100, month 1..=12, day 1..=31, hour <= 24,
/// minute <= 60, second <= 60) yields `None`.
pub fn expand_compact_datetime(text: &str) -> Option<String> {
    let n = text.len();
    if n != 8 && n != 12 && n != 14 {
        return None;
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut expanded = String::with_capacity(19);
    for (i, b) in text.bytes().enumerate() {
        if i >= 4 && i % 2 == 0 {
            expanded.push(match i {
                4 | 6 => '-',
                8 => ' ',
                _ => ':',
            });
        }
        expanded.push(b as char);
    }

    let year: u32 = text[0..4].parse().ok()?;
    if !(1970..=2100).contains(&year) {
        return None;
    }
    let month: u32 = text[4..6].parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let day: u32 = text[6..8].parse().ok()?;
    if !(1..=31).contains(&day) {
        return None;
    }
    if n > 8 {
        let hour: u32 = text[8..10].parse().ok()?;
        if hour > 24 {
            return None;
        }
        let minute: u32 = text[10..12].parse().ok()?;
        if minute > 60 {
            return None;
        }
        if n == 14 {
            let second: u32 = text[12..14].parse().ok()?;
            if second > 60 {
                return None;
            }
        }
    }

    Some(expanded)
}

/// [`expand_compact_datetime`], additionally rejecting strings that match
/// an existing hash prefix in the index.
///
/// All-digit strings are valid hex, so a compact date can also be a real
/// hash prefix. Callers use this mode in contexts where digits are assumed
/// to mean a date unless the index proves otherwise.
pub fn expand_compact_datetime_unless_hash<S>(snapshot: &S, text: &str) -> Result<Option<String>>
where
    S: IndexSnapshot + ?Sized,
{
    let Some(expanded) = expand_compact_datetime(text) else {
        return Ok(None);
    };
    if snapshot.any_hash_starts_with(text)? {
        return Ok(None);
    }
    Ok(Some(expanded))
}

/// True when the first ten characters have the shape `DDDD-DD-DD`.
///
/// A shape probe only; trailing content is allowed and the full literal is
/// validated when the bound is parsed into an instant.
pub fn starts_with_iso_date(text: &str) -> bool {
    let b = text.as_bytes();
    if b.len() < 10 {
        return false;
    }
    b[0].is_ascii_digit()
        && b[1].is_ascii_digit()
        && b[2].is_ascii_digit()
        && b[3].is_ascii_digit()
        && b[4] == b'-'
        && b[5].is_ascii_digit()
        && b[6].is_ascii_digit()
        && b[7] == b'-'
        && b[8].is_ascii_digit()
        && b[9].is_ascii_digit()
}

/// Pad a partial date-time literal so it can serve as an inclusive upper
/// bound.
///
/// * `YYYY-MM-DD HH:MM:SS` gains `.999`
/// * `YYYY-MM-DD HH:MM` gains `:59.999`
/// * `YYYY-MM-DD` gains ` 23:59:59.999`
///
/// The shape is decided by length alone; anything else is returned
/// unchanged.
pub fn roundup_date_bound(text: &str) -> String {
    match text.len() {
        19 => format!("{}.999", text),
        16 => format!("{}:59.999", text),
        10 => format!("{} 23:59:59.999", text),
        _ => text.to_string(),
    }
}

/// Parse a (possibly rounded-up) bound literal into a UTC instant.
///
/// An explicit RFC 3339 offset wins outright; otherwise the punctuated
/// forms are tried from most to least specific (`T` and space separators
/// both accepted) and the naive result is anchored per `mode`, using
/// `local_offset` for [`TimeZoneMode::Local`].
pub fn parse_instant_bound(
    text: &str,
    mode: TimeZoneMode,
    local_offset: FixedOffset,
) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = parse_naive_bound(text)?;
    match mode {
        TimeZoneMode::Utc => Some(naive.and_utc()),
        TimeZoneMode::Local => local_offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

fn parse_naive_bound(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0)
}

//! Layout auto-detection for datetime strings with no caller-supplied layout.

use std::sync::LazyLock;

use super::layout::Layout;
use super::{parse_fields, DateTimeValue};
use crate::error::{TransformError, TransformResult};

// Tried in order; the first layout that consumes the whole input wins. Layouts with an
// offset token come first so `...T03:04:05+07:00` is never read as naive.
const CANDIDATES: &[&str] = &[
    "2006-01-02T15:04:05.999999999Z07:00",
    "2006-01-02 15:04:05.999999999Z07:00",
    "2006-01-02T15:04Z07:00",
    "2006-01-02 15:04Z07:00",
    "Mon, 02 Jan 2006 15:04:05 -0700",
    "02 Jan 2006 15:04:05 -0700",
    "Mon Jan _2 15:04:05 -0700 2006",
    "2006-01-02T15:04:05.999999999",
    "2006-01-02 15:04:05.999999999",
    "2006-01-02T15:04",
    "2006-01-02 15:04",
    "2006/01/02 15:04:05.999999999",
    "2006/01/02 15:04",
    "01/02/2006 15:04:05.999999999",
    "01/02/2006 3:04:05 PM",
    "01/02/2006 3:04 PM",
    "01/02/2006 15:04",
    "20060102T150405",
    "Mon Jan _2 15:04:05 2006",
    "Mon, 02 Jan 2006 15:04:05",
    "Jan _2 2006 15:04:05",
    "02 Jan 2006 15:04:05",
    "January 2, 2006 15:04:05",
    "2006-01-02",
    "2006/01/02",
    "2006.01.02",
    "01/02/2006",
    "01-02-2006",
    "20060102",
    "January 2, 2006",
    "Jan 2, 2006",
    "2 January 2006",
    "2 Jan 2006",
    "02-Jan-2006",
];

const UTC_SUFFIXES: &[&str] = &[" UTC", " GMT", "UTC", "GMT", "Z"];

static LAYOUTS: LazyLock<Vec<Layout>> =
    LazyLock::new(|| CANDIDATES.iter().map(|l| Layout::compile(l)).collect());

fn try_layouts(input: &str) -> Option<DateTimeValue> {
    LAYOUTS.iter().find_map(|layout| {
        let (local, offset) = parse_fields(input, layout).ok()?;
        Some(match offset {
            Some(offset) => DateTimeValue::from_offset(local.and_local_timezone(offset).single()?),
            None => DateTimeValue::Naive(local),
        })
    })
}

/// Parses `input` against the built-in layouts, inferring whether it carried a zone.
///
/// A trailing `Z`, `UTC` or `GMT` marks an otherwise naive value as UTC.
pub fn smart_parse(input: &str) -> TransformResult<DateTimeValue> {
    let trimmed = input.trim();
    if let Some(value) = try_layouts(trimmed) {
        return Ok(value);
    }
    for suffix in UTC_SUFFIXES {
        let Some(rest) = trimmed.strip_suffix(suffix) else {
            continue;
        };
        if let Some(DateTimeValue::Naive(local)) = try_layouts(rest.trim_end()) {
            return Ok(DateTimeValue::from_utc(local.and_utc()));
        }
    }
    Err(TransformError::parse(input, "unable to detect date/time layout"))
}

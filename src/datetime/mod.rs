//! Timezone-aware datetime normalization.
//!
//! Parsing either follows a caller-supplied [`layout`] or auto-detects one
//! ([`smart_parse`]). The result is a [`DateTimeValue`] that knows whether it carries a
//! zone, which drives both the `fromTZ`/`toTZ` handling in [`parse_date_time`] and
//! RFC3339 rendering.
//!
//! ```rust
//! use schema_ingest::datetime::parse_date_time;
//!
//! let v = parse_date_time("2020-01-02 03:04:05", "", false, "America/New_York", "UTC").unwrap();
//! assert_eq!(v.rfc3339(), "2020-01-02T08:04:05+00:00");
//! ```

pub mod layout;
mod smart;
mod value;

use std::fmt;
use std::str::FromStr;

use chrono::format::{self, Parsed};
use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, SubsecRound, Utc};

use crate::error::{TransformError, TransformResult};

pub use layout::Layout;
pub use smart::smart_parse;
pub use value::{load_zone, DateTimeValue, ZoneId};

/// Unit of an integer epoch timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochUnit {
    Second,
    Millisecond,
}

impl EpochUnit {
    pub fn name(self) -> &'static str {
        match self {
            Self::Second => "SECOND",
            Self::Millisecond => "MILLISECOND",
        }
    }
}

impl fmt::Display for EpochUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EpochUnit {
    type Err = TransformError;

    /// Accepts exactly `SECOND` or `MILLISECOND`; anything else is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SECOND" => Ok(Self::Second),
            "MILLISECOND" => Ok(Self::Millisecond),
            _ => Err(TransformError::parse(s, "unknown epoch unit")),
        }
    }
}

// Wall-clock fields plus the offset, if the layout captured one. Only a layout with no
// time field at all yields midnight. A 12-hour clock without a meridiem reads as AM and
// an hour without minutes sits on the hour.
pub(crate) fn parse_fields(
    input: &str,
    layout: &Layout,
) -> Result<(NaiveDateTime, Option<FixedOffset>), format::ParseError> {
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, input, layout.items().iter())?;
    let date = parsed.to_naive_date()?;
    let has_time = parsed.hour_div_12.is_some()
        || parsed.hour_mod_12.is_some()
        || parsed.minute.is_some()
        || parsed.second.is_some();
    let time = if has_time {
        if parsed.hour_mod_12.is_some() && parsed.hour_div_12.is_none() {
            parsed.set_ampm(false)?;
        }
        if parsed.hour_mod_12.is_some() && parsed.minute.is_none() {
            parsed.set_minute(0)?;
        }
        parsed.to_naive_time()?
    } else {
        NaiveTime::default()
    };
    Ok((date.and_time(time), parsed.to_fixed_offset().ok()))
}

/// Strict parse against `layout`.
///
/// Whether the result has a zone comes from `layout_has_tz`, not from the match: with
/// `false` the wall clock is kept as written; with `true` a captured offset is used, or
/// UTC if the layout has no numeric offset token (e.g. only `MST`).
pub fn parse_with_layout(
    input: &str,
    layout: &Layout,
    layout_has_tz: bool,
) -> TransformResult<DateTimeValue> {
    let (local, offset) = parse_fields(input, layout)
        .map_err(|e| TransformError::parse(input, format!("does not match layout: {e}")))?;
    if !layout_has_tz {
        return Ok(DateTimeValue::Naive(local));
    }
    match offset {
        Some(offset) => local
            .and_local_timezone(offset)
            .single()
            .map(DateTimeValue::from_offset)
            .ok_or_else(|| TransformError::parse(input, "invalid local time for offset")),
        None => Ok(DateTimeValue::from_utc(local.and_utc())),
    }
}

/// Parses `input` and normalizes its zone.
///
/// * empty `layout`: auto-detect, zone presence inferred from the text;
/// * otherwise: strict layout parse, zone presence taken from `layout_has_tz`;
/// * a zoneless value with non-empty `from_tz` is declared to be `from_tz` wall time;
/// * non-empty `to_tz` converts a zoned value (same instant) or, for a value that is
///   still zoneless, declares its wall clock to be `to_tz` time.
pub fn parse_date_time(
    input: &str,
    layout: &str,
    layout_has_tz: bool,
    from_tz: &str,
    to_tz: &str,
) -> TransformResult<DateTimeValue> {
    let mut value = if layout.is_empty() {
        smart_parse(input)?
    } else {
        parse_with_layout(input, &Layout::compile(layout), layout_has_tz)?
    };
    if !value.has_tz() && !from_tz.is_empty() {
        value = value.overwrite_tz(load_zone(from_tz)?)?;
    }
    if !to_tz.is_empty() {
        let tz = load_zone(to_tz)?;
        value = if value.has_tz() {
            value.convert_tz(tz)?
        } else {
            value.overwrite_tz(tz)?
        };
    }
    Ok(value)
}

/// Epoch value of `value` in `unit`. Zoneless values are read as UTC.
pub fn to_epoch(value: &DateTimeValue, unit: EpochUnit) -> i64 {
    let instant = value.instant();
    match unit {
        EpochUnit::Second => instant.timestamp(),
        EpochUnit::Millisecond => instant.timestamp_millis(),
    }
}

/// Builds a zoned value from an epoch in `unit`, localized to `tz` (UTC when `None`).
pub fn from_epoch(epoch: i64, unit: EpochUnit, tz: Option<&str>) -> TransformResult<DateTimeValue> {
    let zone = load_zone(tz.filter(|tz| !tz.is_empty()).unwrap_or("UTC"))?;
    let at = match unit {
        EpochUnit::Second => DateTime::from_timestamp(epoch, 0),
        EpochUnit::Millisecond => DateTime::from_timestamp_millis(epoch),
    }
    .ok_or_else(|| TransformError::parse(epoch.to_string(), format!("epoch out of range for unit {unit}")))?;
    DateTimeValue::from_utc(at)
        .convert_tz(zone)
        .map_err(|_| TransformError::parse(epoch.to_string(), format!("epoch out of range in {}", zone.name())))
}

/// The current instant in UTC, truncated to whole seconds.
pub fn now() -> DateTimeValue {
    DateTimeValue::from_utc(Utc::now().trunc_subsecs(0))
}

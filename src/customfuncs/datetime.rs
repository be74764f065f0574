//! Datetime custom functions built on [`crate::datetime`].
//!
//! Blank datetime/epoch inputs produce `""` rather than an error so optional source
//! fields pass through untouched. Epoch units are checked first, so a bad unit fails
//! even for a blank input.

use crate::datetime::{self, EpochUnit};
use crate::error::{TransformError, TransformResult};
use crate::transformctx::Ctx;

// strconv.ParseBool-compatible spellings.
fn parse_flag(s: &str) -> TransformResult<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(TransformError::parse(s, "invalid boolean")),
    }
}

/// Parses `datetime` with `layout` (auto-detect when empty) and renders it as RFC3339.
///
/// `layout_tz` says whether the layout carries a zone; it is only read when a layout is
/// given and an empty value means `false`.
pub fn date_time_layout_to_rfc3339(
    _ctx: Option<&Ctx>,
    datetime: &str,
    layout: &str,
    layout_tz: &str,
    from_tz: &str,
    to_tz: &str,
) -> TransformResult<String> {
    if datetime.trim().is_empty() {
        return Ok(String::new());
    }
    let layout_has_tz = if !layout.is_empty() && !layout_tz.is_empty() {
        parse_flag(layout_tz)?
    } else {
        false
    };
    let value = datetime::parse_date_time(datetime, layout, layout_has_tz, from_tz, to_tz)?;
    Ok(value.rfc3339())
}

/// [`date_time_layout_to_rfc3339`] with an auto-detected layout.
pub fn date_time_to_rfc3339(
    ctx: Option<&Ctx>,
    datetime: &str,
    from_tz: &str,
    to_tz: &str,
) -> TransformResult<String> {
    date_time_layout_to_rfc3339(ctx, datetime, "", "", from_tz, to_tz)
}

/// Epoch of `datetime` in `unit` (`SECOND` or `MILLISECOND`).
///
/// A zoneless `datetime` is read in `from_tz`, or UTC when that is empty.
pub fn date_time_to_epoch(
    _ctx: Option<&Ctx>,
    datetime: &str,
    from_tz: &str,
    unit: &str,
) -> TransformResult<String> {
    let unit: EpochUnit = unit.parse()?;
    if datetime.trim().is_empty() {
        return Ok(String::new());
    }
    let value = datetime::parse_date_time(datetime, "", false, from_tz, "")?;
    Ok(datetime::to_epoch(&value, unit).to_string())
}

/// RFC3339 rendering of an integer epoch in `unit`, localized to `tz` (UTC when `None`).
pub fn epoch_to_date_time_rfc3339(
    _ctx: Option<&Ctx>,
    epoch: &str,
    unit: &str,
    tz: Option<&str>,
) -> TransformResult<String> {
    let unit: EpochUnit = unit.parse()?;
    if epoch.trim().is_empty() {
        return Ok(String::new());
    }
    let n: i64 = epoch
        .parse()
        .map_err(|e| TransformError::parse(epoch, format!("invalid epoch: {e}")))?;
    Ok(datetime::from_epoch(n, unit, tz)?.rfc3339())
}

/// Current UTC time as RFC3339.
pub fn now(_ctx: Option<&Ctx>) -> TransformResult<String> {
    Ok(datetime::now().rfc3339())
}

use std::fmt;

use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{TransformError, TransformResult};

/// Zone attached to a [`DateTimeValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneId {
    /// An IANA zone, e.g. `America/New_York`.
    Named(Tz),
    /// A bare UTC offset taken from the input text.
    Offset(FixedOffset),
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(tz) => f.write_str(tz.name()),
            Self::Offset(off) => write!(f, "{off}"),
        }
    }
}

/// Resolves an IANA zone name. Unknown names are parse errors.
pub fn load_zone(name: &str) -> TransformResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| TransformError::parse(name, "unknown time zone"))
}

/// A parsed datetime: wall-clock fields, plus a zone only when one is known.
///
/// Formatting branches on the variant; a `Naive` value never gets an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeValue {
    Naive(NaiveDateTime),
    Zoned { at: DateTime<FixedOffset>, zone: ZoneId },
}

impl DateTimeValue {
    pub fn from_offset(at: DateTime<FixedOffset>) -> Self {
        Self::Zoned {
            at,
            zone: ZoneId::Offset(*at.offset()),
        }
    }

    pub fn from_utc(at: DateTime<Utc>) -> Self {
        Self::Zoned {
            at: at.fixed_offset(),
            zone: ZoneId::Named(Tz::UTC),
        }
    }

    pub fn has_tz(&self) -> bool {
        matches!(self, Self::Zoned { .. })
    }

    /// Wall-clock fields.
    pub fn local(&self) -> NaiveDateTime {
        match self {
            Self::Naive(naive) => *naive,
            Self::Zoned { at, .. } => at.naive_local(),
        }
    }

    pub fn zone(&self) -> Option<ZoneId> {
        match self {
            Self::Naive(_) => None,
            Self::Zoned { zone, .. } => Some(*zone),
        }
    }

    /// The instant this value denotes; naive values are read as UTC.
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            Self::Naive(naive) => naive.and_utc(),
            Self::Zoned { at, .. } => at.with_timezone(&Utc),
        }
    }

    /// Declares the wall-clock fields to be local time in `tz`, without moving them.
    ///
    /// A wall time inside a DST gap is read with the offset in effect before the gap;
    /// an ambiguous one resolves to the earlier instant. Wall times at the edge of the
    /// representable range fail rather than overflow.
    pub fn overwrite_tz(self, tz: Tz) -> TransformResult<Self> {
        let local = self.local();
        let margin = Duration::days(2);
        if local.checked_sub_signed(margin).is_none() || local.checked_add_signed(margin).is_none() {
            return Err(TransformError::parse(local.to_string(), "date/time out of range"));
        }
        let at = match tz.from_local_datetime(&local) {
            LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => at,
            LocalResult::None => {
                let before = tz
                    .offset_from_utc_datetime(&(local - Duration::days(1)))
                    .fix();
                let shifted = local - Duration::seconds(i64::from(before.local_minus_utc()));
                tz.from_utc_datetime(&shifted)
            }
        };
        Ok(Self::Zoned {
            at: localize(at.with_timezone(&Utc), tz)?,
            zone: ZoneId::Named(tz),
        })
    }

    /// Moves the value into `tz`, keeping the instant. Naive values are read as UTC.
    ///
    /// Fails if the local time in `tz` falls outside the representable range.
    pub fn convert_tz(self, tz: Tz) -> TransformResult<Self> {
        Ok(Self::Zoned {
            at: localize(self.instant(), tz)?,
            zone: ZoneId::Named(tz),
        })
    }

    /// RFC3339 rendering: an offset suffix only when the value has a zone.
    ///
    /// Zero fractional seconds are omitted and UTC prints as `+00:00`.
    pub fn rfc3339(&self) -> String {
        match self {
            Self::Naive(naive) => naive.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Self::Zoned { at, .. } => at.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        }
    }
}

// `instant` as seen in `tz`, provided its wall clock is representable.
fn localize(instant: DateTime<Utc>, tz: Tz) -> TransformResult<DateTime<FixedOffset>> {
    let offset = tz.offset_from_utc_datetime(&instant.naive_utc()).fix();
    instant
        .naive_utc()
        .checked_add_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .map(|_| instant.with_timezone(&offset))
        .ok_or_else(|| {
            TransformError::parse(
                instant.to_rfc3339_opts(SecondsFormat::AutoSi, false),
                format!("out of range in {}", tz.name()),
            )
        })
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rfc3339())
    }
}

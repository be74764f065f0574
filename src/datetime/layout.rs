//! Reference-time layouts.
//!
//! A layout spells out how the reference instant `Mon Jan 2 15:04:05 MST 2006` would be
//! written (`2006-01-02T15:04:05Z07:00`, `01/02/2006 3:04PM`, ...). Layouts are
//! compiled into `chrono` format items once and then used for strict parsing. A layout
//! containing `%` is treated as a strftime layout instead.

use chrono::format::{Fixed, Item, Numeric, Pad, StrftimeItems};

/// A compiled layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    items: Vec<Item<'static>>,
    has_offset: bool,
}

impl Layout {
    /// Compiles a reference-time layout, or a strftime layout if `layout` contains `%`
    /// anywhere.
    ///
    /// The switch is all or nothing: in a strftime layout reference tokens such as
    /// `2006` are plain literals, and a reference layout cannot contain a literal `%`.
    pub fn compile(layout: &str) -> Self {
        if layout.contains('%') {
            let items: Vec<Item<'static>> = StrftimeItems::new(layout)
                .map(|item| item.to_owned())
                .collect();
            let has_offset = items.iter().any(is_offset_item);
            return Self { items, has_offset };
        }
        compile_reference(layout)
    }

    pub fn items(&self) -> &[Item<'static>] {
        &self.items
    }

    /// True if the layout contains a numeric UTC-offset token.
    pub fn has_offset(&self) -> bool {
        self.has_offset
    }
}

fn is_offset_item(item: &Item<'_>) -> bool {
    matches!(
        item,
        Item::Fixed(
            Fixed::TimezoneOffset
                | Fixed::TimezoneOffsetColon
                | Fixed::TimezoneOffsetDoubleColon
                | Fixed::TimezoneOffsetTripleColon
                | Fixed::TimezoneOffsetZ
                | Fixed::TimezoneOffsetColonZ
        )
    )
}

const fn num(n: Numeric, pad: Pad) -> Item<'static> {
    Item::Numeric(n, pad)
}

const fn fixed(f: Fixed) -> Item<'static> {
    Item::Fixed(f)
}

// Longest tokens first within each leading character.
const TOKENS: &[(&str, Item<'static>)] = &[
    ("January", fixed(Fixed::LongMonthName)),
    ("Jan", fixed(Fixed::ShortMonthName)),
    ("Monday", fixed(Fixed::LongWeekdayName)),
    ("Mon", fixed(Fixed::ShortWeekdayName)),
    ("MST", fixed(Fixed::TimezoneName)),
    ("2006", num(Numeric::Year, Pad::Zero)),
    ("002", num(Numeric::Ordinal, Pad::Zero)),
    ("01", num(Numeric::Month, Pad::Zero)),
    ("02", num(Numeric::Day, Pad::Zero)),
    ("03", num(Numeric::Hour12, Pad::Zero)),
    ("04", num(Numeric::Minute, Pad::Zero)),
    ("05", num(Numeric::Second, Pad::Zero)),
    ("06", num(Numeric::YearMod100, Pad::Zero)),
    ("15", num(Numeric::Hour, Pad::Zero)),
    ("_2", num(Numeric::Day, Pad::Space)),
    ("1", num(Numeric::Month, Pad::None)),
    ("2", num(Numeric::Day, Pad::None)),
    ("3", num(Numeric::Hour12, Pad::None)),
    ("4", num(Numeric::Minute, Pad::None)),
    ("5", num(Numeric::Second, Pad::None)),
    ("PM", fixed(Fixed::UpperAmPm)),
    ("pm", fixed(Fixed::LowerAmPm)),
    ("-07:00:00", fixed(Fixed::TimezoneOffsetDoubleColon)),
    ("-07:00", fixed(Fixed::TimezoneOffsetColon)),
    ("-0700", fixed(Fixed::TimezoneOffset)),
    ("-07", fixed(Fixed::TimezoneOffsetTripleColon)),
    ("Z07:00", fixed(Fixed::TimezoneOffsetColonZ)),
    ("Z0700", fixed(Fixed::TimezoneOffsetZ)),
];

fn compile_reference(layout: &str) -> Layout {
    let mut items = Vec::new();
    let mut has_offset = false;
    let mut literal = String::new();
    let mut rest = layout;

    while !rest.is_empty() {
        // `_2006` is an underscore followed by the year, not a padded day.
        if rest.starts_with("_2006") {
            literal.push('_');
            rest = &rest[1..];
            continue;
        }
        if let Some((len, item)) = fraction_at(rest).or_else(|| token_at(rest)) {
            if !literal.is_empty() {
                items.push(Item::OwnedLiteral(std::mem::take(&mut literal).into_boxed_str()));
            }
            has_offset |= is_offset_item(&item);
            items.push(item);
            rest = &rest[len..];
            continue;
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            literal.push(c);
        }
        rest = chars.as_str();
    }
    if !literal.is_empty() {
        items.push(Item::OwnedLiteral(literal.into_boxed_str()));
    }
    Layout { items, has_offset }
}

fn token_at(s: &str) -> Option<(usize, Item<'static>)> {
    TOKENS
        .iter()
        .find(|(token, _)| s.starts_with(token))
        .map(|(token, item)| (token.len(), item.clone()))
}

// `.000` is a fixed-width fraction, `.999` an optional one; the run must not be
// followed by another digit.
fn fraction_at(s: &str) -> Option<(usize, Item<'static>)> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'.') {
        return None;
    }
    let digit = *bytes.get(1)?;
    if digit != b'0' && digit != b'9' {
        return None;
    }
    let run = bytes[1..].iter().take_while(|&&b| b == digit).count();
    if bytes.get(1 + run).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    let item = match (digit, run) {
        (b'0', 3) => Fixed::Nanosecond3,
        (b'0', 6) => Fixed::Nanosecond6,
        (b'0', 9) => Fixed::Nanosecond9,
        _ => Fixed::Nanosecond,
    };
    Some((1 + run, Item::Fixed(item)))
}

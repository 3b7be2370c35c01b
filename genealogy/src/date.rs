//! Partial dates and date ranges
//!
//! Genealogy dates are usually incomplete: a year, a year and month, a
//! decade literal, or an open/closed range. [`PartialDate`] keeps only the
//! components that are known, and [`DateOrRange`] is the sum of an exact
//! date and a [`DateRange`].
//!
//! Two textual forms are supported:
//! - the wire grammar (`ABT 1 SEP 1990`, `BET 1990 AND 1991`, `AFT 1990`,
//!   `BEF 1990`), parsed by [`parse_wire`] and produced by `to_wire`;
//! - English prose (`about 1 September 1990`), produced by `Display`.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};

/// Wire tokens for months, indexed by `month - 1`.
const MONTH_TOKENS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Decade literal meaning "no date at all".
const UNKNOWN_LITERAL: &str = "unknown";

// ============================================================================
// Qualifier
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    Abt,
    Cal,
    Est,
}

impl Qualifier {
    /// Accepts `abt`, `cal`, `est` and `guess` (an alias of `abt`), any case.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "abt" | "guess" => Some(Qualifier::Abt),
            "cal" => Some(Qualifier::Cal),
            "est" => Some(Qualifier::Est),
            _ => None,
        }
    }

    pub fn wire_token(&self) -> &'static str {
        match self {
            Qualifier::Abt => "ABT",
            Qualifier::Cal => "CAL",
            Qualifier::Est => "EST",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Qualifier::Abt => "about",
            Qualifier::Cal => "calculated",
            Qualifier::Est => "estimated",
        }
    }
}

// ============================================================================
// PartialDate
// ============================================================================

/// A date where any component may be unknown.
///
/// Either some of `year`/`month`/`day` are set, or `text` holds a literal
/// that could not be parsed, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<Qualifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PartialDate {
    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Default::default()
        }
    }

    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: Some(day),
            ..Default::default()
        }
    }

    /// Build from numeric components where zero means "absent".
    /// Returns `None` when every component is zero.
    pub fn from_parts(year: i32, month: u32, day: u32, qualifier: Option<&str>) -> Option<Self> {
        if year == 0 && month == 0 && day == 0 {
            return None;
        }
        Some(Self {
            year: (year != 0).then_some(year),
            month: (month != 0).then_some(month),
            day: (day != 0).then_some(day),
            qualifier: qualifier.and_then(Qualifier::parse),
            text: None,
        })
    }

    /// Wrap an unparseable literal such as `1990s`.
    pub fn text(literal: impl Into<String>) -> Self {
        Self {
            text: Some(literal.into()),
            ..Default::default()
        }
    }

    /// Decade fallback: `unknown` and empty strings mean no date.
    pub fn from_decade(literal: &str) -> Option<Self> {
        let literal = literal.trim();
        if literal.is_empty() || literal.eq_ignore_ascii_case(UNKNOWN_LITERAL) {
            None
        } else {
            Some(Self::text(literal))
        }
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn is_structured(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.day.is_some()
    }

    /// A year is required, and month/day must be in range when present.
    pub fn is_valid(&self) -> bool {
        self.year.is_some()
            && self.month.is_none_or(|m| (1..=12).contains(&m))
            && self.day.is_none_or(|d| (1..=31).contains(&d))
    }

    /// Calendar date with missing month/day normalized to 1.
    pub fn to_calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month.unwrap_or(1), self.day.unwrap_or(1))
    }

    /// Wire form, e.g. `ABT 1 SEP 1990`.
    pub fn to_wire(&self) -> String {
        if let Some(text) = &self.text {
            return text.clone();
        }
        let mut parts: Vec<String> = Vec::new();
        if let Some(q) = self.qualifier {
            parts.push(q.wire_token().to_string());
        }
        if let Some(day) = self.day {
            parts.push(day.to_string());
        }
        if let Some(token) = self.month.and_then(month_token) {
            parts.push(token.to_string());
        }
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        parts.join(" ")
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = &self.text {
            return write!(f, "{text}");
        }
        let mut parts: Vec<String> = Vec::new();
        if let Some(q) = self.qualifier {
            parts.push(q.describe().to_string());
        }
        if let Some(day) = self.day {
            parts.push(day.to_string());
        }
        if let Some(month) = self.month.and_then(month_name) {
            parts.push(month.to_string());
        }
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        write!(f, "{}", parts.join(" "))
    }
}

fn month_token(month: u32) -> Option<&'static str> {
    MONTH_TOKENS.get(month.checked_sub(1)? as usize).copied()
}

fn month_name(month: u32) -> Option<&'static str> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
}

/// Order two partial dates.
///
/// Missing years compare equal, so callers must supply their own tie-break.
/// Months only discriminate when both are present. Differing days do not
/// discriminate either: they resolve to the (equal) month ordering, and
/// canonical child and spouse order depends on that.
pub fn compare_dates(a: &PartialDate, b: &PartialDate) -> Ordering {
    let (Some(y1), Some(y2)) = (a.year, b.year) else {
        return Ordering::Equal;
    };
    if y1 != y2 {
        return y1.cmp(&y2);
    }
    let (Some(m1), Some(m2)) = (a.month, b.month) else {
        return Ordering::Equal;
    };
    if m1 != m2 {
        return m1.cmp(&m2);
    }
    match (a.day, b.day) {
        (Some(d1), Some(d2)) if d1 != d2 => m1.cmp(&m2),
        _ => Ordering::Equal,
    }
}

// ============================================================================
// Ranges
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PartialDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<PartialDate>,
}

impl DateRange {
    pub fn between(from: PartialDate, to: PartialDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn after(from: PartialDate) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    pub fn before(to: PartialDate) -> Self {
        Self {
            from: None,
            to: Some(to),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    /// Closed ranges overlap when each starts no later than the other ends.
    /// Open ranges never report an overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        match (&self.from, &self.to, &other.from, &other.to) {
            (Some(a_from), Some(a_to), Some(b_from), Some(b_to)) => {
                compare_dates(a_from, b_to) != Ordering::Greater
                    && compare_dates(a_to, b_from) != Ordering::Less
            }
            _ => false,
        }
    }

    pub fn is_valid(&self) -> bool {
        match (&self.from, &self.to) {
            (None, None) => false,
            (Some(from), Some(to)) => {
                from.is_valid() && to.is_valid() && compare_dates(from, to) != Ordering::Greater
            }
            (Some(bound), None) | (None, Some(bound)) => bound.is_valid(),
        }
    }

    pub fn to_wire(&self) -> String {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => format!("BET {} AND {}", from.to_wire(), to.to_wire()),
            (Some(from), None) => format!("AFT {}", from.to_wire()),
            (None, Some(to)) => format!("BEF {}", to.to_wire()),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => write!(f, "between {from} and {to}"),
            (Some(from), None) => write!(f, "after {from}"),
            (None, Some(to)) => write!(f, "before {to}"),
            (None, None) => Ok(()),
        }
    }
}

/// Exactly one of an exact date or a range.
///
/// Serializes as `{"date": {...}}` or `{"dateRange": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateOrRange {
    Date(PartialDate),
    DateRange(DateRange),
}

impl DateOrRange {
    /// The point used for ordering: the exact date, else the range start,
    /// else the range end.
    pub fn sort_key(&self) -> Option<&PartialDate> {
        match self {
            DateOrRange::Date(date) => Some(date),
            DateOrRange::DateRange(range) => range.from.as_ref().or(range.to.as_ref()),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            DateOrRange::Date(date) => date.is_valid(),
            DateOrRange::DateRange(range) => range.is_valid(),
        }
    }

    pub fn as_closed_range(&self) -> Option<&DateRange> {
        match self {
            DateOrRange::DateRange(range) if range.is_closed() => Some(range),
            _ => None,
        }
    }

    pub fn to_wire(&self) -> String {
        match self {
            DateOrRange::Date(date) => date.to_wire(),
            DateOrRange::DateRange(range) => range.to_wire(),
        }
    }
}

impl fmt::Display for DateOrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateOrRange::Date(date) => write!(f, "{date}"),
            DateOrRange::DateRange(range) => write!(f, "{range}"),
        }
    }
}

/// [`compare_dates`] lifted to dates-or-ranges via [`DateOrRange::sort_key`].
pub fn compare_date_or_range(a: &DateOrRange, b: &DateOrRange) -> Ordering {
    match (a.sort_key(), b.sort_key()) {
        (Some(a), Some(b)) => compare_dates(a, b),
        _ => Ordering::Equal,
    }
}

// ============================================================================
// Wire grammar
// ============================================================================

/// Parse a wire-grammar date token.
///
/// Returns `None` for empty input. Input that is not in the grammar is kept
/// verbatim as a text date.
pub fn parse_wire(input: &str) -> Option<DateOrRange> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let tokens: Vec<String> = input
        .split_whitespace()
        .map(|t| t.to_ascii_uppercase())
        .collect();
    let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();

    let parsed = match tokens.as_slice() {
        ["BET", rest @ ..] => rest.iter().position(|t| *t == "AND").and_then(|and| {
            let from = parse_wire_date(&rest[..and])?;
            let to = parse_wire_date(&rest[and + 1..])?;
            Some(DateOrRange::DateRange(DateRange::between(from, to)))
        }),
        ["AFT", rest @ ..] => {
            parse_wire_date(rest).map(|from| DateOrRange::DateRange(DateRange::after(from)))
        }
        ["BEF", rest @ ..] => {
            parse_wire_date(rest).map(|to| DateOrRange::DateRange(DateRange::before(to)))
        }
        _ => parse_wire_date(&tokens).map(DateOrRange::Date),
    };
    Some(parsed.unwrap_or_else(|| DateOrRange::Date(PartialDate::text(input))))
}

fn parse_wire_date(tokens: &[&str]) -> Option<PartialDate> {
    let (qualifier, rest) = match tokens.split_first() {
        Some((first, rest)) => match Qualifier::parse(first) {
            Some(q) => (Some(q), rest),
            None => (None, tokens),
        },
        None => return None,
    };
    let mut date = match rest {
        [year] => PartialDate::year(parse_year(year)?),
        [month, year] => PartialDate {
            year: Some(parse_year(year)?),
            month: Some(parse_month(month)?),
            ..Default::default()
        },
        [day, month, year] => PartialDate {
            year: Some(parse_year(year)?),
            month: Some(parse_month(month)?),
            day: Some(day.parse().ok().filter(|d| (1..=31).contains(d))?),
            ..Default::default()
        },
        _ => return None,
    };
    date.qualifier = qualifier;
    Some(date)
}

fn parse_year(token: &str) -> Option<i32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn parse_month(token: &str) -> Option<u32> {
    MONTH_TOKENS
        .iter()
        .position(|m| *m == token)
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> PartialDate {
        PartialDate {
            year: Some(year),
            month: Some(month),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_parts_treats_zero_as_absent() {
        let date = PartialDate::from_parts(1990, 0, 0, Some("guess")).unwrap();
        assert_eq!(date.year, Some(1990));
        assert_eq!(date.month, None);
        assert_eq!(date.qualifier, Some(Qualifier::Abt));
        assert!(PartialDate::from_parts(0, 0, 0, None).is_none());
    }

    #[test]
    fn test_decade_literals() {
        assert_eq!(PartialDate::from_decade("1990s"), Some(PartialDate::text("1990s")));
        assert_eq!(PartialDate::from_decade("unknown"), None);
        assert_eq!(PartialDate::from_decade(""), None);
    }

    #[test]
    fn test_compare_by_year_then_month() {
        assert_eq!(compare_dates(&PartialDate::year(1901), &ym(1902, 7)), Ordering::Less);
        assert_eq!(compare_dates(&ym(1902, 8), &ym(1902, 7)), Ordering::Greater);
        assert_eq!(compare_dates(&PartialDate::year(1902), &ym(1902, 7)), Ordering::Equal);
        assert_eq!(compare_dates(&PartialDate::default(), &ym(1902, 7)), Ordering::Equal);
    }

    #[test]
    fn test_compare_ignores_day_differences() {
        let a = PartialDate::ymd(1902, 7, 1);
        let b = PartialDate::ymd(1902, 7, 30);
        assert_eq!(compare_dates(&a, &b), Ordering::Equal);
        assert_eq!(compare_dates(&b, &a), Ordering::Equal);
    }

    #[test]
    fn test_range_overlap() {
        let a = DateRange::between(PartialDate::year(1900), PartialDate::year(1910));
        let b = DateRange::between(PartialDate::year(1910), PartialDate::year(1920));
        let c = DateRange::between(PartialDate::year(1911), PartialDate::year(1920));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&DateRange::after(PartialDate::year(1905))));
    }

    #[test]
    fn test_validity() {
        assert!(DateOrRange::Date(PartialDate::year(1990)).is_valid());
        assert!(!DateOrRange::Date(PartialDate::text("1990s")).is_valid());
        assert!(!DateOrRange::DateRange(DateRange::default()).is_valid());
        assert!(DateOrRange::DateRange(DateRange::before(PartialDate::year(1990))).is_valid());
        let inverted = DateRange::between(PartialDate::year(1991), PartialDate::year(1990));
        assert!(!DateOrRange::DateRange(inverted).is_valid());
    }

    #[test]
    fn test_parse_wire_dates() {
        assert_eq!(
            parse_wire("ABT 1 SEP 1990"),
            Some(DateOrRange::Date(
                PartialDate::ymd(1990, 9, 1).with_qualifier(Qualifier::Abt)
            ))
        );
        assert_eq!(
            parse_wire("1 Oct 1990"),
            Some(DateOrRange::Date(PartialDate::ymd(1990, 10, 1)))
        );
        assert_eq!(
            parse_wire("bet 1990 and MAY 1991"),
            Some(DateOrRange::DateRange(DateRange::between(
                PartialDate::year(1990),
                ym(1991, 5)
            )))
        );
        assert_eq!(
            parse_wire("AFT 1990"),
            Some(DateOrRange::DateRange(DateRange::after(PartialDate::year(1990))))
        );
        assert_eq!(
            parse_wire("1990s"),
            Some(DateOrRange::Date(PartialDate::text("1990s")))
        );
        assert_eq!(parse_wire("   "), None);
    }

    #[test]
    fn test_wire_and_prose_rendering() {
        let date = DateOrRange::Date(PartialDate::ymd(1990, 9, 1).with_qualifier(Qualifier::Abt));
        assert_eq!(date.to_wire(), "ABT 1 SEP 1990");
        assert_eq!(date.to_string(), "about 1 September 1990");

        let range = DateOrRange::DateRange(DateRange::between(
            PartialDate::year(1990),
            ym(1991, 5),
        ));
        assert_eq!(range.to_wire(), "BET 1990 AND MAY 1991");
        assert_eq!(range.to_string(), "between 1990 and May 1991");

        let before = DateOrRange::DateRange(DateRange::before(PartialDate::year(1800)));
        assert_eq!(before.to_wire(), "BEF 1800");
        assert_eq!(before.to_string(), "before 1800");

        assert_eq!(PartialDate::text("1990s").to_string(), "1990s");
    }

    #[test]
    fn test_interchange_shape() {
        let date = DateOrRange::Date(PartialDate::year(1990));
        assert_eq!(serde_json::to_string(&date).unwrap(), r#"{"date":{"year":1990}}"#);
        let range = DateOrRange::DateRange(DateRange::after(PartialDate::year(1990)));
        assert_eq!(
            serde_json::to_string(&range).unwrap(),
            r#"{"dateRange":{"from":{"year":1990}}}"#
        );
    }
}

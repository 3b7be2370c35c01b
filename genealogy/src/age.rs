//! Age calculation
//!
//! Derives a lifespan description from a birth and a death date-or-range.
//! Indeterminate results are `None`, never errors.

use std::cmp::Ordering;
use std::fmt;

use chrono::Datelike;
use serde::Serialize;

use crate::date::{compare_date_or_range, parse_wire, DateOrRange, PartialDate, Qualifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AgeDescription {
    Exact {
        years: u32,
        qualifier: Option<Qualifier>,
    },
    MoreThan {
        years: u32,
    },
    LessThan {
        years: u32,
    },
    Between {
        from: u32,
        to: u32,
    },
}

impl fmt::Display for AgeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeDescription::Exact { years, qualifier } => {
                let body = match years {
                    0 => "Less than 1 year".to_string(),
                    1 => "1 year".to_string(),
                    n => format!("{n} years"),
                };
                match qualifier {
                    Some(q) => write!(f, "{} {}", q.describe(), lowercase_first(&body)),
                    None => write!(f, "{body}"),
                }
            }
            AgeDescription::MoreThan { years } => write!(f, "More than {}", years_label(*years)),
            AgeDescription::LessThan { years } => write!(f, "Less than {}", years_label(*years)),
            AgeDescription::Between { from, to } => write!(f, "Between {from} and {to} years"),
        }
    }
}

fn years_label(years: u32) -> String {
    if years == 1 {
        "1 year".to_string()
    } else {
        format!("{years} years")
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Earliest and latest possible instants of one side of the interval.
struct Bounds<'a> {
    lower: Option<&'a PartialDate>,
    upper: Option<&'a PartialDate>,
    exact: bool,
}

impl<'a> Bounds<'a> {
    fn of(value: &'a DateOrRange) -> Self {
        match value {
            DateOrRange::Date(date) => Self {
                lower: Some(date),
                upper: Some(date),
                exact: true,
            },
            DateOrRange::DateRange(range) => Self {
                lower: range.from.as_ref(),
                upper: range.to.as_ref(),
                exact: false,
            },
        }
    }
}

/// Whole years from `from` to `to`, negative when `to` is earlier.
/// Missing month/day count as 1 January, and an anniversary one day short
/// rounds down.
fn whole_years(from: &PartialDate, to: &PartialDate) -> Option<i64> {
    let (from, to) = (from.to_calendar_date()?, to.to_calendar_date()?);
    let (early, late, sign) = if from <= to {
        (from, to, 1)
    } else {
        (to, from, -1)
    };
    let mut years = i64::from(late.year() - early.year());
    if (late.month(), late.day()) < (early.month(), early.day()) {
        years -= 1;
    }
    Some(sign * years)
}

fn qualifier_of(value: &DateOrRange) -> Option<Qualifier> {
    match value {
        DateOrRange::Date(date) => date.qualifier,
        DateOrRange::DateRange(_) => None,
    }
}

/// Describe the age at death.
///
/// Inexact sides are read as brackets: an open bound on either side, or a
/// lower bound met with an upper one, leaves only one computable extreme
/// and gives "More than" / "Less than" instead of "Between".
///
/// Returns `None` when either side is missing or invalid, when death sorts
/// before birth, when two closed ranges overlap, or when the interval has no
/// bound at all (e.g. born after X and died after Y).
pub fn calc_age(birth: Option<&DateOrRange>, death: Option<&DateOrRange>) -> Option<AgeDescription> {
    let (birth, death) = (birth?, death?);
    if !birth.is_valid() || !death.is_valid() {
        return None;
    }
    if compare_date_or_range(birth, death) == Ordering::Greater {
        return None;
    }
    if let (Some(b), Some(d)) = (birth.as_closed_range(), death.as_closed_range()) {
        if b.overlaps(d) {
            return None;
        }
    }

    let b = Bounds::of(birth);
    let d = Bounds::of(death);

    if b.exact && d.exact {
        let years = whole_years(b.lower?, d.lower?)?.unsigned_abs();
        return Some(AgeDescription::Exact {
            years: u32::try_from(years).ok()?,
            qualifier: qualifier_of(birth).or_else(|| qualifier_of(death)),
        });
    }

    // Youngest possible age: latest birth to earliest death.
    let youngest = match (b.upper, d.lower) {
        (Some(born), Some(died)) => Some(whole_years(born, died)?.max(0)),
        _ => None,
    };
    // Oldest possible age: earliest birth to latest death.
    let oldest = match (b.lower, d.upper) {
        (Some(born), Some(died)) => Some(whole_years(born, died)?),
        _ => None,
    };

    match (youngest, oldest) {
        (_, Some(oldest)) if oldest < 0 => None,
        (Some(from), Some(to)) if from == to => Some(AgeDescription::Exact {
            years: u32::try_from(from).ok()?,
            qualifier: None,
        }),
        (Some(from), Some(to)) => Some(AgeDescription::Between {
            from: u32::try_from(from).ok()?,
            to: u32::try_from(to).ok()?,
        }),
        (Some(from), None) => Some(AgeDescription::MoreThan {
            years: u32::try_from(from).ok()?,
        }),
        (None, Some(to)) => Some(AgeDescription::LessThan {
            years: u32::try_from(to).ok()?,
        }),
        (None, None) => None,
    }
}

/// [`calc_age`] over wire-grammar strings; empty strings count as missing.
pub fn calc_age_from_str(birth: &str, death: &str) -> Option<AgeDescription> {
    calc_age(parse_wire(birth).as_ref(), parse_wire(death).as_ref())
}

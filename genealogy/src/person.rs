//! Person records as returned by the upstream genealogy service
//!
//! Field names follow the service's JSON (`Id`, `Name`, `LastNameAtBirth`,
//! ...). Numeric parent ids use 0 or absence for "unknown" and negative
//! values for privacy-redacted profiles; the accessors below make that
//! explicit so callers never test raw numbers.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::date::{DateOrRange, DateRange, PartialDate};
use crate::model::Sex;

/// Prefix of synthesized ids for private profiles, e.g. `~Private-1001`.
pub const PRIVATE_ID_PREFIX: &str = "~Private";

/// Structured dates are `YYYY-MM-DD`, with `00` for unknown components.
static PROFILE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("static regex"));

const PLACEHOLDER_DATE: &str = "0000-00-00";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PhotoData {
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExternalPerson {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name_at_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name_current: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name_other: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father: Option<i64>,
    #[serde(
        default,
        deserialize_with = "person_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub spouses: BTreeMap<i64, ExternalPerson>,
    #[serde(
        default,
        deserialize_with = "person_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub children: BTreeMap<i64, ExternalPerson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date_decade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date_decade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_data: Option<PhotoData>,
    /// Per-field certainty, e.g. `{"BirthDate": "guess"}`.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data_status: HashMap<String, String>,
    /// Present on spouse stubs only.
    #[serde(rename = "marriage_date", default, skip_serializing_if = "Option::is_none")]
    pub marriage_date: Option<String>,
    /// Present on spouse stubs only.
    #[serde(rename = "marriage_location", default, skip_serializing_if = "Option::is_none")]
    pub marriage_location: Option<String>,
}

impl ExternalPerson {
    /// Placeholder returned for keys with no data upstream.
    pub fn is_defined(&self) -> bool {
        self.id != 0
    }

    pub fn is_private(&self) -> bool {
        self.id < 0
    }

    pub fn mother_id(&self) -> Option<i64> {
        self.mother.filter(|id| *id != 0)
    }

    pub fn father_id(&self) -> Option<i64> {
        self.father.filter(|id| *id != 0)
    }

    pub fn sex(&self) -> Option<Sex> {
        match self.gender.as_deref() {
            Some("Male") => Some(Sex::Male),
            Some("Female") => Some(Sex::Female),
            _ => None,
        }
    }

    /// Canonical id: the profile name, or a synthesized private id.
    pub fn key(&self) -> String {
        if self.name.is_empty() && self.is_private() {
            format!("{PRIVATE_ID_PREFIX}{}", self.id)
        } else {
            self.name.clone()
        }
    }

    pub fn given_name(&self) -> Option<&str> {
        non_empty(self.first_name.as_deref()).or_else(|| non_empty(self.real_name.as_deref()))
    }

    pub fn birth_surname(&self) -> Option<&str> {
        non_empty(self.last_name_at_birth.as_deref())
    }

    pub fn current_surname(&self) -> Option<&str> {
        non_empty(self.last_name_current.as_deref())
    }

    pub fn other_surname(&self) -> Option<&str> {
        non_empty(self.last_name_other.as_deref())
    }

    pub fn birth(&self) -> Option<DateOrRange> {
        profile_date(
            self.birth_date.as_deref(),
            self.birth_date_decade.as_deref(),
            self.data_status.get("BirthDate").map(String::as_str),
        )
    }

    pub fn death(&self) -> Option<DateOrRange> {
        profile_date(
            self.death_date.as_deref(),
            self.death_date_decade.as_deref(),
            self.data_status.get("DeathDate").map(String::as_str),
        )
    }

    /// Marriage date recorded on a spouse stub, ignoring the placeholder.
    pub fn marriage(&self) -> Option<DateOrRange> {
        self.marriage_date
            .as_deref()
            .filter(|d| !d.is_empty() && *d != PLACEHOLDER_DATE)
            .map(|d| parse_profile_date(d, None))
    }

    pub fn photo_path(&self) -> Option<&str> {
        self.photo_data
            .as_ref()
            .map(|p| p.path.as_str())
            .filter(|p| !p.is_empty())
    }

    /// Copy with a private id shifted by `offset` and renamed accordingly.
    /// Negative parent ids are shifted by the same offset.
    pub fn with_private_offset(&self, offset: i64) -> ExternalPerson {
        let mut person = self.clone();
        if person.is_private() {
            person.id -= offset;
            person.name = format!("{PRIVATE_ID_PREFIX}{}", person.id);
        }
        person.father = person.father.map(|id| if id < 0 { id - offset } else { id });
        person.mother = person.mother.map(|id| if id < 0 { id - offset } else { id });
        person
    }

    /// Record without its nested spouse and child maps, as embedded in
    /// another person's record.
    pub fn stub(&self) -> ExternalPerson {
        ExternalPerson {
            spouses: BTreeMap::new(),
            children: BTreeMap::new(),
            ..self.clone()
        }
    }

    /// What the service exposes for a redacted profile.
    pub fn private_stub(&self) -> ExternalPerson {
        ExternalPerson {
            id: self.id,
            gender: self.gender.clone(),
            father: self.father,
            mother: self.mother,
            ..Default::default()
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Structured date first, decade fallback second.
fn profile_date(date: Option<&str>, decade: Option<&str>, status: Option<&str>) -> Option<DateOrRange> {
    match date.map(str::trim) {
        Some(d) if !d.is_empty() && d != PLACEHOLDER_DATE => Some(parse_profile_date(d, status)),
        _ => decade
            .and_then(PartialDate::from_decade)
            .map(DateOrRange::Date),
    }
}

/// Parse `YYYY-MM-DD` with the certainty flag: `guess` qualifies the date,
/// `before`/`after` turn it into an open range. Other strings are kept as
/// text.
pub fn parse_profile_date(date: &str, status: Option<&str>) -> DateOrRange {
    let Some(caps) = PROFILE_DATE.captures(date.trim()) else {
        return DateOrRange::Date(PartialDate::text(date.trim()));
    };
    let component = |i: usize| caps[i].parse::<u32>().unwrap_or(0);
    let year = i32::try_from(component(1)).unwrap_or(0);
    let Some(parsed) = PartialDate::from_parts(year, component(2), component(3), status) else {
        return DateOrRange::Date(PartialDate::text(date.trim()));
    };
    match status {
        Some("before") => DateOrRange::DateRange(DateRange::before(parsed)),
        Some("after") => DateOrRange::DateRange(DateRange::after(parsed)),
        _ => DateOrRange::Date(parsed),
    }
}

/// The service sends an empty list instead of an empty object, so accept
/// both. Entries are keyed by the nested record's own id.
fn person_map<'de, D>(deserializer: D) -> Result<BTreeMap<i64, ExternalPerson>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PersonMapVisitor;

    impl<'de> Visitor<'de> for PersonMapVisitor {
        type Value = BTreeMap<i64, ExternalPerson>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a map or list of person records")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(BTreeMap::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut out = BTreeMap::new();
            while let Some((key, mut person)) = map.next_entry::<String, ExternalPerson>()? {
                if person.id == 0 {
                    person.id = key.parse().unwrap_or(0);
                }
                out.insert(person.id, person);
            }
            Ok(out)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut out = BTreeMap::new();
            while let Some(person) = seq.next_element::<ExternalPerson>()? {
                out.insert(person.id, person);
            }
            Ok(out)
        }
    }

    deserializer.deserialize_any(PersonMapVisitor)
}

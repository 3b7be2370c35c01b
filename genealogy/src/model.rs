//! Canonical family graph
//!
//! Individuals and families as handed to the chart renderer. The JSON shape
//! is `{indis: [...], fams: [...]}` with camelCase keys.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::date::DateOrRange;

// ============================================================================
// Identity
// ============================================================================

/// Family key derived from the numeric ids of the two partners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyId(pub String);

impl FamilyId {
    /// `min_max` of the two ids, so argument order never changes identity.
    /// An unknown partner is passed as 0.
    pub fn from_partners(a: i64, b: i64) -> Self {
        Self(format!("{}_{}", a.min(b), a.max(b)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FamilyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A dated, optionally placed event (birth, death, marriage).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub date: Option<DateOrRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

impl Event {
    /// `None` when neither a date nor a place is known.
    pub fn new(date: Option<DateOrRange>, place: Option<String>) -> Option<Self> {
        let place = place.filter(|p| !p.trim().is_empty());
        (date.is_some() || place.is_some()).then_some(Self { date, place })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Individual {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth: Option<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death: Option<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub famc: Option<FamilyId>,
    #[serde(default)]
    pub fams: Vec<FamilyId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hide_id: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub id: FamilyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wife: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub husb: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marriage: Option<Event>,
}

// ============================================================================
// Graph
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyGraph {
    pub indis: Vec<Individual>,
    pub fams: Vec<Family>,
}

impl FamilyGraph {
    pub fn individual(&self, id: &str) -> Option<&Individual> {
        self.indis.iter().find(|i| i.id == id)
    }

    pub fn family(&self, id: &FamilyId) -> Option<&Family> {
        self.fams.iter().find(|f| &f.id == id)
    }

    pub fn individuals_by_id(&self) -> HashMap<&str, &Individual> {
        self.indis.iter().map(|i| (i.id.as_str(), i)).collect()
    }

    pub fn families_by_id(&self) -> HashMap<&FamilyId, &Family> {
        self.fams.iter().map(|f| (&f.id, f)).collect()
    }

    /// Describe every reference that does not resolve inside the graph,
    /// every duplicated individual id and every repeated child.
    /// Empty for a well-formed graph.
    pub fn integrity_violations(&self) -> Vec<String> {
        let indis = self.individuals_by_id();
        let fams = self.families_by_id();
        let mut violations = Vec::new();

        if indis.len() != self.indis.len() {
            violations.push("duplicate individual ids".to_string());
        }
        for indi in &self.indis {
            for fam in indi.famc.iter().chain(indi.fams.iter()) {
                if !fams.contains_key(fam) {
                    violations.push(format!("{} references missing family {}", indi.id, fam));
                }
            }
        }
        for fam in &self.fams {
            for member in fam.wife.iter().chain(fam.husb.iter()).chain(fam.children.iter()) {
                if !indis.contains_key(member.as_str()) {
                    violations.push(format!("{} references missing individual {}", fam.id, member));
                }
            }
            let mut seen = std::collections::HashSet::new();
            for child in &fam.children {
                if !seen.insert(child) {
                    violations.push(format!("{} lists {} twice", fam.id, child));
                }
            }
        }
        violations
    }
}

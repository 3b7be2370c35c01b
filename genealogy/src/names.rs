//! Display names for the detail panel
//!
//! A profile can carry a birth surname, a current surname and an alias.
//! Only the birth name is always shown. The current surname counts as a
//! married name only when a spouse was born with (roughly) that surname,
//! and the alias only when it adds something new.

use serde::{Deserialize, Serialize};

use crate::person::ExternalPerson;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameKind {
    Birth,
    Married,
    Aka,
}

impl NameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameKind::Birth => "birth",
            NameKind::Married => "married",
            NameKind::Aka => "aka",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameVariant {
    pub kind: NameKind,
    pub given: Option<String>,
    pub surname: Option<String>,
}

impl NameVariant {
    /// `Given /Surname/`, the slash convention for surnames.
    pub fn to_wire(&self) -> String {
        match (&self.given, &self.surname) {
            (Some(given), Some(surname)) => format!("{given} /{surname}/"),
            (Some(given), None) => given.clone(),
            (None, Some(surname)) => format!("/{surname}/"),
            (None, None) => String::new(),
        }
    }
}

/// Sørensen–Dice similarity of character bigrams, case-insensitive.
/// Declined forms such as `Skłodowski`/`Skłodowska` score high.
pub fn surname_similarity(a: &str, b: &str) -> f64 {
    strsim::sorensen_dice(&a.to_lowercase(), &b.to_lowercase())
}

/// Name variants of `person`, birth name first.
pub fn name_variants(person: &ExternalPerson, threshold: f64) -> Vec<NameVariant> {
    let given = person.given_name().map(str::to_string);
    let birth = person.birth_surname().or_else(|| person.current_surname());
    let current = person.current_surname();

    let mut variants = Vec::new();
    if given.is_none() && birth.is_none() {
        return variants;
    }
    variants.push(NameVariant {
        kind: NameKind::Birth,
        given: given.clone(),
        surname: birth.map(str::to_string),
    });

    let married = current.filter(|c| Some(*c) != birth).filter(|married| {
        person.spouses.values().any(|spouse| {
            spouse
                .birth_surname()
                .is_some_and(|s| surname_similarity(s, married) >= threshold)
        })
    });
    if let Some(married) = married {
        variants.push(NameVariant {
            kind: NameKind::Married,
            given: given.clone(),
            surname: Some(married.to_string()),
        });
    }

    if let Some(aka) = person
        .other_surname()
        .filter(|o| Some(*o) != birth && Some(*o) != married)
    {
        variants.push(NameVariant {
            kind: NameKind::Aka,
            given,
            surname: Some(aka.to_string()),
        });
    }
    variants
}

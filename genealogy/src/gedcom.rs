//! Canonical graph from parsed GEDCOM records
//!
//! Tokenizing is done elsewhere; this module receives the top-level
//! tagged-entry records and turns `INDI`/`FAM` records into the canonical
//! graph. References to records that do not exist are dropped.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::date::parse_wire;
use crate::entry::{Entry, EntryIndex};
use crate::error::{GenealogyError, Result};
use crate::model::{Event, Family, FamilyGraph, FamilyId, Image, Individual, Sex};
use crate::normalize::{dereference, normalize};

/// A converted file: the normalized graph plus the record index the detail
/// panel resolves pointers against.
#[derive(Debug, Clone)]
pub struct GedcomData {
    pub graph: FamilyGraph,
    pub index: EntryIndex,
}

pub fn convert_records(records: Vec<Entry>) -> Result<GedcomData> {
    let index = EntryIndex::from_records(records);
    let graph = convert_index(&index);
    if graph.indis.is_empty() || graph.fams.is_empty() {
        return Err(GenealogyError::ReadFailed {
            individuals: graph.indis.len(),
            families: graph.fams.len(),
        });
    }
    info!(
        individuals = graph.indis.len(),
        families = graph.fams.len(),
        "Converted GEDCOM records"
    );
    Ok(GedcomData {
        graph: normalize(&graph),
        index,
    })
}

/// Parse a JSON array of top-level records and convert it.
pub fn convert_json(json: &str) -> Result<GedcomData> {
    let records: Vec<Entry> = serde_json::from_str(json)?;
    convert_records(records)
}

fn convert_index(index: &EntryIndex) -> FamilyGraph {
    let indis = index
        .indis
        .iter()
        .map(|(id, record)| convert_individual(id, record, index))
        .collect();
    let fams = index
        .fams
        .iter()
        .map(|(id, record)| convert_family(id, record, index))
        .collect();
    FamilyGraph { indis, fams }
}

/// Target id of a pointer entry, if that record exists.
fn existing<'a>(
    entry: &'a Entry,
    owner: &str,
    exists: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    let target = entry.target()?;
    if exists(target) {
        Some(target)
    } else {
        warn!(owner, tag = %entry.tag, target, "Dropping reference to missing record");
        None
    }
}

fn convert_individual(id: &str, record: &Entry, index: &EntryIndex) -> Individual {
    let (first_name, last_name) = record
        .first_data("NAME")
        .map(split_name)
        .unwrap_or_default();
    let sex = match record.first_data("SEX") {
        Some("M") => Some(Sex::Male),
        Some("F") => Some(Sex::Female),
        _ => None,
    };
    let is_family = |target: &str| index.fams.contains_key(target);

    let famc = record
        .all("FAMC")
        .find_map(|e| existing(e, id, is_family))
        .map(FamilyId::from);
    let mut fams: Vec<FamilyId> = Vec::new();
    for entry in record.all("FAMS") {
        if let Some(target) = existing(entry, id, is_family) {
            let fam = FamilyId::from(target);
            if !fams.contains(&fam) {
                fams.push(fam);
            }
        }
    }

    let images = record
        .all("OBJE")
        .map(|obje| dereference(obje, index, |d| &d.other))
        .filter_map(|obje| {
            let url = obje.first_data("FILE")?;
            let title = obje
                .first_data("TITL")
                .or_else(|| obje.first("FILE").and_then(|f| f.first_data("TITL")));
            Some(Image {
                url: url.to_string(),
                title: title.map(str::to_string),
            })
        })
        .collect();

    Individual {
        id: id.to_string(),
        first_name,
        last_name,
        sex,
        birth: record.first("BIRT").and_then(convert_event),
        death: record.first("DEAT").and_then(convert_event),
        famc,
        fams,
        images,
        hide_id: false,
    }
}

fn convert_family(id: &str, record: &Entry, index: &EntryIndex) -> Family {
    let is_individual = |target: &str| index.indis.contains_key(target);
    let partner = |tag: &str| {
        record
            .all(tag)
            .find_map(|e| existing(e, id, is_individual))
            .map(str::to_string)
    };
    let mut seen = HashSet::new();
    let children = record
        .all("CHIL")
        .filter_map(|e| existing(e, id, is_individual))
        .filter(|child| seen.insert(*child))
        .map(str::to_string)
        .collect();

    Family {
        id: FamilyId::from(id),
        wife: partner("WIFE"),
        husb: partner("HUSB"),
        children,
        marriage: record.first("MARR").and_then(convert_event),
    }
}

fn convert_event(entry: &Entry) -> Option<Event> {
    Event::new(
        entry.first_data("DATE").and_then(parse_wire),
        entry.first_data("PLAC").map(str::to_string),
    )
}

/// `John /Smith/` → (`John`, `Smith`).
fn split_name(name: &str) -> (Option<String>, Option<String>) {
    let clean = |s: &str| {
        let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
        (!s.is_empty()).then_some(s)
    };
    match name.split_once('/') {
        Some((given, rest)) => {
            let surname = rest.split_once('/').map(|(s, _)| s).unwrap_or(rest);
            (clean(given), clean(surname))
        }
        None => (clean(name), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::{DateOrRange, PartialDate};

    fn indi(id: &str, name: &str, sex: &str) -> Entry {
        let mut record = Entry::record("INDI", id);
        record.push("NAME", name);
        record.push("SEX", sex);
        record
    }

    fn records() -> Vec<Entry> {
        let mut father = indi("I1", "John /Smith/", "M");
        father.push("FAMS", "@F1@");
        let mut mother = indi("I2", "Jane /Doe/", "F");
        mother.push("FAMS", "@F1@");
        mother.push("FAMS", "@F404@");
        mother.push("OBJE", "@O1@");
        let mut child = indi("I3", "Tom /Smith/", "M");
        child.push("FAMC", "@F1@");
        child.push("BIRT", "").push("DATE", "ABT 1920");

        let mut fam = Entry::record("FAM", "F1");
        fam.push("HUSB", "@I1@");
        fam.push("WIFE", "@I2@");
        fam.push("CHIL", "@I3@");
        fam.push("CHIL", "@I3@");
        fam.push("CHIL", "@I99@");
        fam.push("MARR", "").push("PLAC", "Boston");

        let mut photo = Entry::record("OBJE", "O1");
        photo.push("FILE", "jane.png");
        photo.push("TITL", "Jane");

        vec![Entry::new(0, "HEAD", ""), father, mother, child, fam, photo]
    }

    #[test]
    fn test_convert_records() {
        let data = convert_records(records()).unwrap();
        let graph = &data.graph;
        assert!(graph.integrity_violations().is_empty());

        let child = graph.individual("I3").unwrap();
        assert_eq!(child.first_name.as_deref(), Some("Tom"));
        assert_eq!(child.last_name.as_deref(), Some("Smith"));
        assert_eq!(child.sex, Some(Sex::Male));
        assert_eq!(
            child.birth.as_ref().and_then(|b| b.date.clone()),
            Some(DateOrRange::Date(
                PartialDate::year(1920).with_qualifier(crate::date::Qualifier::Abt)
            ))
        );

        let fam = graph.family(&FamilyId::from("F1")).unwrap();
        assert_eq!(fam.children, vec!["I3"]);
        assert_eq!(fam.husb.as_deref(), Some("I1"));
        assert_eq!(
            fam.marriage.as_ref().and_then(|m| m.place.as_deref()),
            Some("Boston")
        );

        let mother = graph.individual("I2").unwrap();
        assert_eq!(mother.fams, vec![FamilyId::from("F1")]);
        assert_eq!(mother.images[0].url, "jane.png");
        assert_eq!(mother.images[0].title.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_empty_input_fails_to_read() {
        let err = convert_records(vec![indi("I1", "Solo /One/", "F")]).unwrap_err();
        assert_eq!(err.code(), "READ_FAILED");
        assert_eq!(err.args()["individuals"], "1");
        assert_eq!(err.args()["families"], "0");
    }

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("John  Paul /Smith/"),
            (Some("John Paul".into()), Some("Smith".into()))
        );
        assert_eq!(split_name("/Smith/"), (None, Some("Smith".into())));
        assert_eq!(split_name("Cher"), (Some("Cher".into()), None));
    }
}

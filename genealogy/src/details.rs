//! Detail-panel entry trees
//!
//! Projects the canonical graph into tagged-entry records the detail panel
//! already knows how to render. Dates use the wire grammar.

use std::collections::HashMap;

use crate::config::BuilderConfig;
use crate::entry::{to_pointer, Entry, EntryIndex};
use crate::model::{Event, Family, FamilyGraph, Image, Individual};
use crate::names::NameVariant;

/// Build one `INDI` record per individual and one `FAM` record per family.
/// `names` holds display-name variants keyed by individual id; individuals
/// without an entry get a single name from their first/last name.
pub fn synthesize(
    graph: &FamilyGraph,
    names: &HashMap<String, Vec<NameVariant>>,
    config: &BuilderConfig,
) -> EntryIndex {
    let indis = graph
        .indis
        .iter()
        .map(|indi| {
            let variants = names.get(&indi.id).map(Vec::as_slice).unwrap_or(&[]);
            (indi.id.clone(), individual_record(indi, variants, config))
        })
        .collect();
    let fams = graph
        .fams
        .iter()
        .map(|fam| (fam.id.to_string(), family_record(fam)))
        .collect();
    EntryIndex {
        head: None,
        indis,
        fams,
        other: Default::default(),
    }
}

fn individual_record(indi: &Individual, names: &[NameVariant], config: &BuilderConfig) -> Entry {
    let mut record = Entry::record("INDI", &indi.id);

    if names.is_empty() {
        let name = match (&indi.first_name, &indi.last_name) {
            (Some(first), Some(last)) => format!("{first} /{last}/"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => format!("/{last}/"),
            (None, None) => String::new(),
        };
        if !name.is_empty() {
            record.push("NAME", name);
        }
    }
    for variant in names {
        record
            .push("NAME", variant.to_wire())
            .push("TYPE", variant.kind.as_str());
    }

    if let Some(birth) = &indi.birth {
        push_event(&mut record, "BIRT", birth);
    }
    if let Some(death) = &indi.death {
        push_event(&mut record, "DEAT", death);
    }
    if let Some(famc) = &indi.famc {
        record.push("FAMC", to_pointer(famc.as_str()));
    }
    for fams in &indi.fams {
        record.push("FAMS", to_pointer(fams.as_str()));
    }
    if !indi.hide_id {
        record.push("WWW", config.profile_url(&indi.id));
    }
    for image in &indi.images {
        push_image(&mut record, image);
    }
    record
}

fn family_record(fam: &Family) -> Entry {
    let mut record = Entry::record("FAM", fam.id.as_str());
    if let Some(wife) = &fam.wife {
        record.push("WIFE", to_pointer(wife));
    }
    if let Some(husb) = &fam.husb {
        record.push("HUSB", to_pointer(husb));
    }
    for child in &fam.children {
        record.push("CHIL", to_pointer(child));
    }
    if let Some(marriage) = &fam.marriage {
        push_event(&mut record, "MARR", marriage);
    }
    record
}

fn push_event(record: &mut Entry, tag: &str, event: &Event) {
    let entry = record.push(tag, "");
    if let Some(date) = &event.date {
        entry.push("DATE", date.to_wire());
    }
    if let Some(place) = &event.place {
        entry.push("PLAC", place.clone());
    }
}

fn push_image(record: &mut Entry, image: &Image) {
    let entry = record.push("OBJE", "");
    entry.push("FILE", image.url.clone());
    if let Some(ext) = image
        .url
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.contains('/'))
    {
        entry.push("FORM", ext.to_lowercase());
    }
    if let Some(title) = &image.title {
        entry.push("TITL", title.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::{DateOrRange, DateRange, PartialDate};
    use crate::model::FamilyId;
    use crate::names::NameKind;

    fn graph() -> FamilyGraph {
        FamilyGraph {
            indis: vec![
                Individual {
                    id: "Curie-1".into(),
                    first_name: Some("Marie".into()),
                    last_name: Some("Skłodowska".into()),
                    birth: Event::new(
                        Some(DateOrRange::Date(PartialDate::ymd(1867, 11, 7))),
                        Some("Warsaw".into()),
                    ),
                    fams: vec![FamilyId::from("1_2")],
                    images: vec![Image {
                        url: "https://www.wikitree.com/photo.php/a/b/Marie.JPG".into(),
                        title: Some("Marie".into()),
                    }],
                    ..Default::default()
                },
                Individual {
                    id: "~Private-3".into(),
                    famc: Some(FamilyId::from("1_2")),
                    hide_id: true,
                    ..Default::default()
                },
            ],
            fams: vec![Family {
                id: FamilyId::from("1_2"),
                wife: Some("Curie-1".into()),
                children: vec!["~Private-3".into()],
                marriage: Event::new(
                    Some(DateOrRange::DateRange(DateRange::after(PartialDate::year(1890)))),
                    None,
                ),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_individual_record() {
        let details = synthesize(&graph(), &HashMap::new(), &BuilderConfig::default());
        let marie = &details.indis["Curie-1"];
        assert_eq!(marie.pointer, "@Curie-1@");
        assert_eq!(marie.first_data("NAME"), Some("Marie /Skłodowska/"));
        let birth = marie.first("BIRT").unwrap();
        assert_eq!(birth.first_data("DATE"), Some("7 NOV 1867"));
        assert_eq!(birth.first_data("PLAC"), Some("Warsaw"));
        assert_eq!(marie.first_data("FAMS"), Some("@1_2@"));
        assert_eq!(
            marie.first_data("WWW"),
            Some("https://www.wikitree.com/wiki/Curie-1")
        );
        let image = marie.first("OBJE").unwrap();
        assert_eq!(image.first_data("FORM"), Some("jpg"));
        assert_eq!(image.first_data("TITL"), Some("Marie"));
    }

    #[test]
    fn test_private_individual_has_no_profile_link() {
        let details = synthesize(&graph(), &HashMap::new(), &BuilderConfig::default());
        let private = &details.indis["~Private-3"];
        assert!(private.first("WWW").is_none());
        assert!(private.first("NAME").is_none());
        assert_eq!(private.first_data("FAMC"), Some("@1_2@"));
    }

    #[test]
    fn test_name_variants_carry_type() {
        let mut names = HashMap::new();
        names.insert(
            "Curie-1".to_string(),
            vec![
                NameVariant {
                    kind: NameKind::Birth,
                    given: Some("Marie".into()),
                    surname: Some("Skłodowska".into()),
                },
                NameVariant {
                    kind: NameKind::Married,
                    given: Some("Marie".into()),
                    surname: Some("Curie".into()),
                },
            ],
        );
        let details = synthesize(&graph(), &names, &BuilderConfig::default());
        let types: Vec<&str> = details.indis["Curie-1"]
            .all("NAME")
            .filter_map(|n| n.first_data("TYPE"))
            .collect();
        assert_eq!(types, vec!["birth", "married"]);
    }

    #[test]
    fn test_family_record() {
        let details = synthesize(&graph(), &HashMap::new(), &BuilderConfig::default());
        let fam = &details.fams["1_2"];
        assert_eq!(fam.first_data("WIFE"), Some("@Curie-1@"));
        assert!(fam.first("HUSB").is_none());
        assert_eq!(fam.all("CHIL").count(), 1);
        assert_eq!(
            fam.first("MARR").and_then(|m| m.first_data("DATE")),
            Some("AFT 1890")
        );
    }
}

//! Tagged-entry trees
//!
//! The shape an external GEDCOM tokenizer produces: each entry has a tag,
//! optional pointer (`@I1@`) and data, and nested sub-entries. The detail
//! panel renders these trees directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub level: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pointer: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tree: Vec<Entry>,
}

impl Entry {
    pub fn new(level: u32, tag: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            level,
            tag: tag.into(),
            data: data.into(),
            ..Default::default()
        }
    }

    /// Top-level record whose pointer is `@id@`.
    pub fn record(tag: impl Into<String>, id: &str) -> Self {
        Self {
            pointer: to_pointer(id),
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Append a child entry one level below this one.
    pub fn push(&mut self, tag: &str, data: impl Into<String>) -> &mut Entry {
        self.tree.push(Entry::new(self.level + 1, tag, data));
        let last = self.tree.len() - 1;
        &mut self.tree[last]
    }

    pub fn first(&self, tag: &str) -> Option<&Entry> {
        self.tree.iter().find(|e| e.tag == tag)
    }

    pub fn all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.tree.iter().filter(move |e| e.tag == tag)
    }

    pub fn first_data(&self, tag: &str) -> Option<&str> {
        self.first(tag)
            .map(|e| e.data.trim())
            .filter(|d| !d.is_empty())
    }

    /// The id this entry's data points at, if the data is a pointer.
    pub fn target(&self) -> Option<&str> {
        pointer_id(&self.data)
    }
}

pub fn to_pointer(id: &str) -> String {
    format!("@{id}@")
}

/// `@I1@` → `I1`; `None` when the value is not a pointer.
pub fn pointer_id(value: &str) -> Option<&str> {
    let value = value.trim();
    value
        .strip_prefix('@')
        .and_then(|v| v.strip_suffix('@'))
        .filter(|v| !v.is_empty())
}

/// Records indexed by id (pointer without `@`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Entry>,
    #[serde(default)]
    pub indis: BTreeMap<String, Entry>,
    #[serde(default)]
    pub fams: BTreeMap<String, Entry>,
    #[serde(default)]
    pub other: BTreeMap<String, Entry>,
}

impl EntryIndex {
    /// Sort top-level records into their collections by tag.
    pub fn from_records(records: impl IntoIterator<Item = Entry>) -> Self {
        let mut index = EntryIndex::default();
        for record in records {
            if record.tag == "HEAD" {
                index.head = Some(record);
                continue;
            }
            let Some(id) = pointer_id(&record.pointer).map(str::to_string) else {
                continue;
            };
            let collection = match record.tag.as_str() {
                "INDI" => &mut index.indis,
                "FAM" => &mut index.fams,
                _ => &mut index.other,
            };
            collection.insert(id, record);
        }
        index
    }
}

use anyhow::Result;
use genealogy::{AgeDescription, DateOrRange, EntryIndex, FamilyGraph};
use serde::Serialize;

/// Writes command results to stdout as JSON.
pub struct Output {
    pretty: bool,
}

impl Output {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn print<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        println!("{json}");
        Ok(())
    }
}

// -- Serializable types returned by commands --

/// `{indis, fams}` plus, on request, the detail records.
#[derive(Serialize)]
pub struct GraphReport<'a> {
    #[serde(flatten)]
    pub graph: &'a FamilyGraph,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a EntryIndex>,
}

#[derive(Serialize)]
pub struct AgeReport {
    pub birth: Option<DateOrRange>,
    pub death: Option<DateOrRange>,
    pub age: Option<AgeDescription>,
    pub description: String,
}

impl AgeReport {
    pub fn new(
        birth: Option<DateOrRange>,
        death: Option<DateOrRange>,
        age: Option<AgeDescription>,
    ) -> Self {
        let description = age
            .map(|a| a.to_string())
            .unwrap_or_else(|| "indeterminate".to_string());
        Self {
            birth,
            death,
            age,
            description,
        }
    }
}

//! Kinfold Genealogy Engine
//!
//! Builds a normalized family graph (individuals + families) from a
//! person-keyed genealogy service or from parsed GEDCOM records, with
//! partial-date arithmetic and age descriptions for the detail panel.

pub mod age;
pub mod builder;
pub mod cache;
pub mod config;
pub mod date;
pub mod details;
pub mod entry;
pub mod error;
pub mod gedcom;
pub mod model;
pub mod names;
pub mod normalize;
pub mod person;
pub mod repository;

pub use age::{calc_age, calc_age_from_str, AgeDescription};
pub use builder::{BuildOutput, GraphBuilder, LoadedGraph};
pub use cache::{CachedRepository, KeyValueCache, MemoryCache};
pub use config::BuilderConfig;
pub use date::{parse_wire, DateOrRange, DateRange, PartialDate, Qualifier};
pub use entry::{Entry, EntryIndex};
pub use error::{GenealogyError, Result};
pub use gedcom::{convert_json, convert_records, GedcomData};
pub use model::{Event, Family, FamilyGraph, FamilyId, Image, Individual, Sex};
pub use normalize::{dereference, normalize};
pub use person::ExternalPerson;
pub use repository::{PersonRepository, StaticRepository};

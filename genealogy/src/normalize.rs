//! Canonical ordering of a built graph
//!
//! Children are ordered by birth date and spouse families by marriage date,
//! ties broken by id. The input graph is left untouched so its pre-normalized
//! form can be cached and reused.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::date::{compare_date_or_range, DateOrRange};
use crate::entry::{pointer_id, Entry, EntryIndex};
use crate::model::{Event, FamilyGraph, FamilyId};

/// Copy of `graph` with children and spouse families in canonical order.
pub fn normalize(graph: &FamilyGraph) -> FamilyGraph {
    let births: HashMap<&str, Option<&DateOrRange>> = graph
        .indis
        .iter()
        .map(|i| (i.id.as_str(), event_date(i.birth.as_ref())))
        .collect();
    let marriages: HashMap<&FamilyId, Option<&DateOrRange>> = graph
        .fams
        .iter()
        .map(|f| (&f.id, event_date(f.marriage.as_ref())))
        .collect();

    let fams = graph
        .fams
        .iter()
        .map(|fam| {
            let mut fam = fam.clone();
            sort_stable_by(&mut fam.children, |a, b| {
                compare_optional(
                    births.get(a.as_str()).copied().flatten(),
                    births.get(b.as_str()).copied().flatten(),
                )
                .then_with(|| a.cmp(b))
            });
            fam
        })
        .collect();

    let indis = graph
        .indis
        .iter()
        .map(|indi| {
            let mut indi = indi.clone();
            sort_stable_by(&mut indi.fams, |a, b| {
                compare_optional(
                    marriages.get(a).copied().flatten(),
                    marriages.get(b).copied().flatten(),
                )
                .then_with(|| a.cmp(b))
            });
            indi
        })
        .collect();

    FamilyGraph { indis, fams }
}

fn event_date(event: Option<&Event>) -> Option<&DateOrRange> {
    event.and_then(|e| e.date.as_ref())
}

fn compare_optional(a: Option<&DateOrRange>, b: Option<&DateOrRange>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_date_or_range(a, b),
        _ => Ordering::Equal,
    }
}

/// Insertion sort. The date comparator treats undated entries as equal to
/// everything, which is not a total order, so `slice::sort_by` cannot be
/// relied on here.
fn sort_stable_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Resolve `entry` when its data is a pointer into the collection chosen by
/// `select`; otherwise, or when the pointer dangles, return `entry` itself.
pub fn dereference<'a, F>(entry: &'a Entry, index: &'a EntryIndex, select: F) -> &'a Entry
where
    F: Fn(&'a EntryIndex) -> &'a BTreeMap<String, Entry>,
{
    entry
        .target()
        .and_then(|id| select(index).get(id))
        .unwrap_or(entry)
}

/// Variant of [`dereference`] for raw pointer strings.
pub fn resolve_pointer<'a>(
    pointer: &str,
    collection: &'a BTreeMap<String, Entry>,
) -> Option<&'a Entry> {
    pointer_id(pointer).and_then(|id| collection.get(id))
}

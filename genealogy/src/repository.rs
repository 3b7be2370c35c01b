//! Person repository contract
//!
//! The builder only sees [`PersonRepository`]; transport, retries and
//! timeouts belong to implementations. [`StaticRepository`] answers from an
//! in-memory dump of full person records.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::person::ExternalPerson;

#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// The person identified by `key` followed by all known forebears.
    async fn get_ancestors(&self, key: &str) -> Result<Vec<ExternalPerson>>;

    /// One record per key, in key order, with `Spouses` and `Children`
    /// filled with stubs. Unknown keys yield an empty `ExternalPerson`.
    /// Links to private parents are dropped; private spouses and children
    /// are returned as negative-id stubs.
    async fn get_relatives(&self, keys: &[String]) -> Result<Vec<ExternalPerson>>;
}

#[async_trait]
impl<'a, T: PersonRepository + ?Sized> PersonRepository for &'a T {
    async fn get_ancestors(&self, key: &str) -> Result<Vec<ExternalPerson>> {
        (**self).get_ancestors(key).await
    }

    async fn get_relatives(&self, keys: &[String]) -> Result<Vec<ExternalPerson>> {
        (**self).get_relatives(keys).await
    }
}

#[async_trait]
impl<T: PersonRepository + ?Sized> PersonRepository for Arc<T> {
    async fn get_ancestors(&self, key: &str) -> Result<Vec<ExternalPerson>> {
        (**self).get_ancestors(key).await
    }

    async fn get_relatives(&self, keys: &[String]) -> Result<Vec<ExternalPerson>> {
        (**self).get_relatives(keys).await
    }
}

// ============================================================================
// Static repository
// ============================================================================

/// Repository over a fixed set of person records.
///
/// Records carry their own `Father`/`Mother` ids; spouse links may be
/// declared on either partner (with marriage details on the nested entry)
/// and children are derived from parent ids.
#[derive(Debug, Default, Clone)]
pub struct StaticRepository {
    people: BTreeMap<i64, ExternalPerson>,
    by_name: HashMap<String, i64>,
    spouses: HashMap<i64, BTreeMap<i64, ExternalPerson>>,
    children: HashMap<i64, Vec<i64>>,
}

impl StaticRepository {
    pub fn new(records: impl IntoIterator<Item = ExternalPerson>) -> Self {
        let mut repo = StaticRepository::default();
        for record in records {
            if !record.is_defined() {
                continue;
            }
            if !record.name.is_empty() {
                repo.by_name.insert(record.name.clone(), record.id);
            }
            repo.people.insert(record.id, record);
        }

        for person in repo.people.values() {
            for (spouse_id, link) in &person.spouses {
                let marriage = ExternalPerson {
                    marriage_date: link.marriage_date.clone(),
                    marriage_location: link.marriage_location.clone(),
                    ..Default::default()
                };
                repo.spouses
                    .entry(person.id)
                    .or_default()
                    .entry(*spouse_id)
                    .or_insert_with(|| marriage.clone());
                repo.spouses
                    .entry(*spouse_id)
                    .or_default()
                    .entry(person.id)
                    .or_insert(marriage);
            }
            for parent in person.father_id().into_iter().chain(person.mother_id()) {
                repo.children.entry(parent).or_default().push(person.id);
            }
        }
        repo
    }

    /// Load a JSON array of person records.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<ExternalPerson> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    fn lookup(&self, key: &str) -> Option<&ExternalPerson> {
        self.by_name.get(key).and_then(|id| self.people.get(id))
    }

    /// How a record appears nested in someone else's record.
    fn nested(&self, id: i64) -> Option<ExternalPerson> {
        let person = self.people.get(&id)?;
        Some(if person.is_private() {
            person.private_stub()
        } else {
            without_private_parents(person.stub())
        })
    }

    fn relatives_of(&self, person: &ExternalPerson) -> ExternalPerson {
        let mut record = without_private_parents(person.stub());
        if let Some(links) = self.spouses.get(&person.id) {
            for (spouse_id, link) in links {
                if let Some(mut spouse) = self.nested(*spouse_id) {
                    spouse.marriage_date = link.marriage_date.clone();
                    spouse.marriage_location = link.marriage_location.clone();
                    record.spouses.insert(*spouse_id, spouse);
                }
            }
        }
        for child_id in self.children.get(&person.id).into_iter().flatten() {
            if let Some(child) = self.nested(*child_id) {
                record.children.insert(*child_id, child);
            }
        }
        record
    }
}

fn without_private_parents(mut person: ExternalPerson) -> ExternalPerson {
    person.father = person.father.filter(|id| *id >= 0);
    person.mother = person.mother.filter(|id| *id >= 0);
    person
}

#[async_trait]
impl PersonRepository for StaticRepository {
    async fn get_ancestors(&self, key: &str) -> Result<Vec<ExternalPerson>> {
        let Some(start) = self.lookup(key) else {
            return Ok(Vec::new());
        };
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start.id]);
        let mut out = Vec::new();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            let Some(person) = self.people.get(&id) else {
                continue;
            };
            out.push(if person.is_private() {
                person.private_stub()
            } else {
                person.stub()
            });
            queue.extend(person.father_id());
            queue.extend(person.mother_id());
        }
        Ok(out)
    }

    async fn get_relatives(&self, keys: &[String]) -> Result<Vec<ExternalPerson>> {
        Ok(keys
            .iter()
            .map(|key| match self.lookup(key) {
                Some(person) if !person.is_private() => self.relatives_of(person),
                _ => ExternalPerson::default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: i64, name: &str, father: i64, mother: i64) -> ExternalPerson {
        ExternalPerson {
            id,
            name: name.to_string(),
            father: Some(father),
            mother: Some(mother),
            ..Default::default()
        }
    }

    fn sample() -> StaticRepository {
        let mut child = person(3, "Child-3", 1, 2);
        child.gender = Some("Female".into());
        let mut father = person(1, "Father-1", -5, 0);
        father.spouses.insert(
            2,
            ExternalPerson {
                id: 2,
                marriage_date: Some("1890-00-00".into()),
                ..Default::default()
            },
        );
        let private_grandfather = ExternalPerson {
            id: -5,
            ..Default::default()
        };
        StaticRepository::new(vec![father, person(2, "Mother-2", 0, 0), child, private_grandfather])
    }

    #[tokio::test]
    async fn test_ancestors_include_person_and_private_stubs() {
        let repo = sample();
        let ancestors = repo.get_ancestors("Child-3").await.unwrap();
        let ids: Vec<i64> = ancestors.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 2, -5]);
        let father = &ancestors[1];
        assert_eq!(father.father, Some(-5));
        assert!(ancestors[3].name.is_empty());
    }

    #[tokio::test]
    async fn test_relatives_carry_spouses_and_children() {
        let repo = sample();
        let keys = vec!["Mother-2".to_string(), "Nobody-9".to_string()];
        let relatives = repo.get_relatives(&keys).await.unwrap();
        assert_eq!(relatives.len(), 2);

        let mother = &relatives[0];
        assert_eq!(mother.spouses[&1].name, "Father-1");
        assert_eq!(mother.spouses[&1].marriage_date.as_deref(), Some("1890-00-00"));
        assert_eq!(mother.children[&3].name, "Child-3");

        assert!(!relatives[1].is_defined());
    }

    #[tokio::test]
    async fn test_relatives_drop_private_parent_links() {
        let repo = sample();
        let relatives = repo.get_relatives(&["Father-1".to_string()]).await.unwrap();
        assert_eq!(relatives[0].father, None);
    }

    #[test]
    fn test_from_json() {
        let repo = StaticRepository::from_json(r#"[{"Id": 1, "Name": "A-1"}, {"Id": 0}]"#).unwrap();
        assert_eq!(repo.len(), 1);
        assert!(StaticRepository::from_json("not json").is_err());
    }
}

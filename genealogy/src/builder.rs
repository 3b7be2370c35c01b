//! Family Graph Builder
//!
//! Turns person-keyed repository records into the canonical graph of
//! individuals and families. A build runs in stages:
//! - fetch the root profile
//! - fetch ancestors of the root and each spouse, one concurrent branch each
//! - shift private ids per branch so branches merge without collisions
//! - fetch full records for the ancestors, restoring private parent links
//! - walk descendants generation by generation, up to the configured limit
//! - deduplicate, derive family membership, convert
//!
//! Any repository failure aborts the whole build.

use std::collections::{BTreeMap, HashMap, HashSet};

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::config::BuilderConfig;
use crate::details::synthesize;
use crate::entry::EntryIndex;
use crate::error::{GenealogyError, Result};
use crate::model::{Event, Family, FamilyGraph, FamilyId, Image, Individual, Sex};
use crate::names::{name_variants, NameVariant};
use crate::normalize::normalize;
use crate::person::ExternalPerson;
use crate::repository::PersonRepository;

/// Raw graph plus the display-name variants of each public individual.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub graph: FamilyGraph,
    pub names: HashMap<String, Vec<NameVariant>>,
}

/// Normalized graph with its detail-panel records.
#[derive(Debug, Clone, Default)]
pub struct LoadedGraph {
    pub graph: FamilyGraph,
    pub details: EntryIndex,
}

pub struct GraphBuilder<R> {
    repository: R,
    config: BuilderConfig,
}

/// Ancestor branches after private ids were shifted.
#[derive(Debug, Default)]
struct AncestorSet {
    public_keys: Vec<String>,
    private: Vec<ExternalPerson>,
    private_fathers: HashMap<i64, i64>,
    private_mothers: HashMap<i64, i64>,
}

#[derive(Debug, Default)]
struct FamilyDraft {
    wife: Option<i64>,
    husb: Option<i64>,
    children: Vec<i64>,
    marriage: Option<Event>,
}

impl FamilyDraft {
    fn holds(&self, id: i64) -> bool {
        self.wife == Some(id) || self.husb == Some(id)
    }

    /// Seat a partner by their own gender; unknown gender takes whichever
    /// slot is free.
    fn seat(&mut self, id: i64, sex: Option<Sex>) {
        if self.holds(id) {
            return;
        }
        let (preferred, other) = match sex {
            Some(Sex::Female) => (&mut self.wife, &mut self.husb),
            _ => (&mut self.husb, &mut self.wife),
        };
        if preferred.is_none() {
            *preferred = Some(id);
        } else if other.is_none() {
            *other = Some(id);
        }
    }
}

impl<R: PersonRepository> GraphBuilder<R> {
    pub fn new(repository: R) -> Self {
        Self::with_config(repository, BuilderConfig::default())
    }

    pub fn with_config(repository: R, config: BuilderConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build the normalized graph and its detail records for `root`.
    pub async fn load(&self, root: Option<&str>) -> Result<LoadedGraph> {
        let built = self.build(root).await?;
        let graph = normalize(&built.graph);
        let details = synthesize(&graph, &built.names, &self.config);
        Ok(LoadedGraph { graph, details })
    }

    /// Build the raw, not yet normalized graph around `root`.
    pub async fn build(&self, root: Option<&str>) -> Result<BuildOutput> {
        let root = root
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(GenealogyError::IdNotProvided)?;
        info!(root, "Building family graph");

        let root_person = self.fetch_root(root).await?;

        let mut branch_keys = vec![root_person.name.clone()];
        branch_keys.extend(
            root_person
                .spouses
                .values()
                .filter(|spouse| !spouse.is_private() && !spouse.name.is_empty())
                .map(|spouse| spouse.name.clone()),
        );
        let branches = try_join_all(
            branch_keys
                .iter()
                .map(|key| self.repository.get_ancestors(key)),
        )
        .await?;
        for (key, branch) in branch_keys.iter().zip(&branches) {
            debug!(key = %key, ancestors = branch.len(), "Fetched ancestor branch");
        }

        let ancestors = collect_ancestors(branches, self.config.private_id_offset);
        let mut everyone = self.fetch_relatives(&ancestors.public_keys).await?;
        for person in &mut everyone {
            restore_private_parents(person, &ancestors);
            drop_private_relatives(person);
        }
        everyone.extend(ancestors.private);

        let first_walk_offset = branch_keys.len() as i64;
        everyone.extend(self.walk_descendants(root_person, first_walk_offset).await?);

        let people = dedup(everyone);
        let graph = assemble(&people, &self.config);
        let names = people
            .iter()
            .filter(|person| !person.is_private())
            .map(|person| {
                let variants = name_variants(person, self.config.surname_similarity_threshold);
                (person.key(), variants)
            })
            .collect();

        info!(
            root,
            individuals = graph.indis.len(),
            families = graph.fams.len(),
            "Built family graph"
        );
        Ok(BuildOutput { graph, names })
    }

    async fn fetch_root(&self, key: &str) -> Result<ExternalPerson> {
        let person = self
            .repository
            .get_relatives(&[key.to_string()])
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();
        if !person.is_defined() {
            return Err(GenealogyError::ProfileNotFound {
                key: key.to_string(),
            });
        }
        if person.name.trim().is_empty() {
            return Err(GenealogyError::ProfileNotAccessible {
                key: key.to_string(),
            });
        }
        Ok(person)
    }

    /// `get_relatives` in concurrent batches, results in key order.
    async fn fetch_relatives(&self, keys: &[String]) -> Result<Vec<ExternalPerson>> {
        let batch_size = self.config.relatives_batch_size.max(1);
        let batches = try_join_all(
            keys.chunks(batch_size)
                .map(|batch| self.repository.get_relatives(batch)),
        )
        .await?;
        Ok(batches.into_iter().flatten().collect())
    }

    /// Records of the root's descendants and their spouses. Generation 0 is
    /// the root itself; each later generation depends on the previous one's
    /// children, so generations are fetched one after another.
    async fn walk_descendants(
        &self,
        root: ExternalPerson,
        first_offset: i64,
    ) -> Result<Vec<ExternalPerson>> {
        let mut found = Vec::new();
        let mut current = vec![root];
        let mut generation = 0;

        // Private ids of the previous generation's stubs were shifted by this
        // much; public children fetched now still carry the raw ids.
        let mut parent_offset = 0;

        loop {
            let offset = self.config.private_id_offset * (first_offset + generation as i64);
            let mut seen = HashSet::new();
            let mut next_keys = Vec::new();

            for mut person in current {
                if !person.is_defined() {
                    continue;
                }
                person.father = person.father.map(|id| shift_private(id, parent_offset));
                person.mother = person.mother.map(|id| shift_private(id, parent_offset));
                person.spouses = walk_stubs(&person.spouses, offset);
                person.children = walk_stubs(&person.children, offset);

                for child in person.children.values() {
                    if child.is_private() || child.name.is_empty() {
                        found.push(child.clone());
                    } else if seen.insert(child.name.clone()) {
                        next_keys.push(child.name.clone());
                    }
                }
                let spouses: Vec<ExternalPerson> = person.spouses.values().cloned().collect();
                found.push(person);
                found.extend(spouses);
            }

            generation += 1;
            if next_keys.is_empty() || generation > self.config.generation_limit {
                break;
            }
            debug!(generation, keys = next_keys.len(), "Fetching descendant generation");
            current = self.fetch_relatives(&next_keys).await?;
            parent_offset = offset;
        }
        Ok(found)
    }
}

/// Shift private ids by `offset * branch index` and remember private parent
/// links, which detail fetches do not return. The first branch to mention a
/// person wins.
fn collect_ancestors(branches: Vec<Vec<ExternalPerson>>, offset: i64) -> AncestorSet {
    let mut set = AncestorSet::default();
    let mut seen_keys = HashSet::new();
    for (index, branch) in branches.into_iter().enumerate() {
        let branch_offset = offset * index as i64;
        for person in branch {
            let person = person.with_private_offset(branch_offset);
            if let Some(father) = person.father.filter(|id| *id < 0) {
                set.private_fathers.entry(person.id).or_insert(father);
            }
            if let Some(mother) = person.mother.filter(|id| *id < 0) {
                set.private_mothers.entry(person.id).or_insert(mother);
            }
            if person.is_private() {
                set.private.push(person);
            } else if !person.name.is_empty() && seen_keys.insert(person.name.clone()) {
                set.public_keys.push(person.name);
            }
        }
    }
    set
}

fn shift_private(id: i64, offset: i64) -> i64 {
    if id < 0 {
        id - offset
    } else {
        id
    }
}

/// Spouse or child stubs of one walked person, re-keyed by shifted id.
/// Private stubs get the generation's offset, including their links to other
/// private stubs of the same person. Public stubs lose private parent links,
/// which belong to an ancestor set the walk never saw.
fn walk_stubs(
    stubs: &BTreeMap<i64, ExternalPerson>,
    offset: i64,
) -> BTreeMap<i64, ExternalPerson> {
    stubs
        .values()
        .map(|stub| {
            let stub = if stub.is_private() {
                stub.with_private_offset(offset)
            } else {
                let mut stub = stub.clone();
                stub.father = stub.father.filter(|id| *id >= 0);
                stub.mother = stub.mother.filter(|id| *id >= 0);
                stub
            };
            (stub.id, stub)
        })
        .collect()
}

/// Ancestor detail records keep only public spouses and children. Private
/// ones there are reached through parent links, and their raw ids would
/// collide with ids shifted elsewhere.
fn drop_private_relatives(person: &mut ExternalPerson) {
    person.spouses.retain(|id, _| *id >= 0);
    person.children.retain(|id, _| *id >= 0);
}

fn restore_private_parents(person: &mut ExternalPerson, ancestors: &AncestorSet) {
    if person.father_id().is_none() {
        if let Some(father) = ancestors.private_fathers.get(&person.id) {
            person.father = Some(*father);
        }
    }
    if person.mother_id().is_none() {
        if let Some(mother) = ancestors.private_mothers.get(&person.id) {
            person.mother = Some(*mother);
        }
    }
}

/// First occurrence of each numeric id wins; order is preserved. Spouses
/// only a later copy knows about (private ones from the walk) are merged in.
fn dedup(everyone: Vec<ExternalPerson>) -> Vec<ExternalPerson> {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut people: Vec<ExternalPerson> = Vec::new();
    for person in everyone {
        if !person.is_defined() || person.key().is_empty() {
            continue;
        }
        match index.get(&person.id) {
            Some(&at) => {
                let kept = &mut people[at];
                for (id, spouse) in person.spouses {
                    kept.spouses.entry(id).or_insert(spouse);
                }
            }
            None => {
                index.insert(person.id, people.len());
                people.push(person);
            }
        }
    }
    people
}

/// Families in the order they were first seen.
#[derive(Debug, Default)]
struct FamilyDrafts {
    order: Vec<FamilyId>,
    drafts: HashMap<FamilyId, FamilyDraft>,
}

impl FamilyDrafts {
    fn entry(&mut self, id: FamilyId) -> &mut FamilyDraft {
        if !self.drafts.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.drafts.entry(id).or_default()
    }
}

/// Derive family membership and convert people into the canonical graph.
fn assemble(people: &[ExternalPerson], config: &BuilderConfig) -> FamilyGraph {
    let by_id: HashMap<i64, &ExternalPerson> = people.iter().map(|p| (p.id, p)).collect();
    let mut families = FamilyDrafts::default();

    for person in people {
        let mother = person.mother_id();
        let father = person.father_id();
        if mother.is_none() && father.is_none() {
            continue;
        }
        let family = families.entry(FamilyId::from_partners(
            mother.unwrap_or(0),
            father.unwrap_or(0),
        ));
        for (parent, slot) in [(mother, &mut family.wife), (father, &mut family.husb)] {
            let Some(parent) = parent else { continue };
            if !by_id.contains_key(&parent) {
                warn!(person = %person.key(), parent, "Parent record not found");
            } else if slot.is_none() {
                *slot = Some(parent);
            }
        }
        if !family.children.contains(&person.id) {
            family.children.push(person.id);
        }
    }

    for person in people {
        for spouse in person.spouses.values() {
            let Some(partner) = by_id.get(&spouse.id) else {
                debug!(person = %person.key(), spouse = spouse.id, "Spouse outside graph");
                continue;
            };
            let family = families.entry(FamilyId::from_partners(person.id, spouse.id));
            let mut partners = [(person.id, person.sex()), (partner.id, partner.sex())];
            partners.sort_by_key(|(_, sex)| sex.is_none());
            for (id, sex) in partners {
                family.seat(id, sex);
            }
            if family.marriage.is_none() {
                family.marriage = Event::new(spouse.marriage(), non_empty(&spouse.marriage_location));
            }
        }
    }

    let FamilyDrafts { order, mut drafts } = families;
    let mut famc: HashMap<i64, FamilyId> = HashMap::new();
    let mut fams: HashMap<i64, Vec<FamilyId>> = HashMap::new();
    for id in &order {
        let family = &drafts[id];
        for partner in family.wife.iter().chain(&family.husb) {
            fams.entry(*partner).or_default().push(id.clone());
        }
        for child in &family.children {
            famc.entry(*child).or_insert_with(|| id.clone());
        }
    }

    let key_of = |id: &i64| by_id.get(id).map(|person| person.key());
    let indis = people
        .iter()
        .map(|person| Individual {
            famc: famc.remove(&person.id),
            fams: fams.remove(&person.id).unwrap_or_default(),
            ..individual(person, config)
        })
        .collect();
    let fams = order
        .into_iter()
        .filter_map(|id| {
            let draft = drafts.remove(&id)?;
            Some(Family {
                wife: draft.wife.as_ref().and_then(key_of),
                husb: draft.husb.as_ref().and_then(key_of),
                children: draft.children.iter().filter_map(key_of).collect(),
                marriage: draft.marriage,
                id,
            })
        })
        .collect();

    FamilyGraph { indis, fams }
}

fn individual(person: &ExternalPerson, config: &BuilderConfig) -> Individual {
    let images = person
        .photo_path()
        .map(|path| Image {
            url: format!("{}{}", config.image_url_base, path),
            title: non_empty(&person.photo),
        })
        .into_iter()
        .collect();
    Individual {
        id: person.key(),
        first_name: person.given_name().map(str::to_string),
        last_name: person
            .birth_surname()
            .or_else(|| person.current_surname())
            .map(str::to_string),
        sex: person.sex(),
        birth: Event::new(person.birth(), non_empty(&person.birth_location)),
        death: Event::new(person.death(), non_empty(&person.death_location)),
        famc: None,
        fams: Vec::new(),
        images,
        hide_id: person.is_private(),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;

use fw_object::ident::ObjectId;
use log::{debug, trace};
use thiserror::Error;

use crate::UnitSymbols;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum LinkError {
    #[error("undefined reference to obj_{target} in {needed_by}")]
    Unresolved { needed_by: String, target: String },
    #[error("obj_{marker} is defined by both {first} and {second}")]
    Duplicate {
        marker: String,
        first: String,
        second: String,
    },
}

impl LinkError {
    fn duplicate(marker: &str, a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self::Duplicate {
            marker: marker.into(),
            first: first.into(),
            second: second.into(),
        }
    }
}

/// Units that go into one link: root objects, always linked, and archive
/// members, linked only when something needs them.
///
/// Unlike a real linker, which takes the first archive member defining a
/// symbol, two archive members defining the same needed marker are an
/// error. This makes the result independent of member order.
#[derive(Debug, Clone, Default)]
pub struct LinkSet {
    roots: Vec<UnitSymbols>,
    archive: Vec<UnitSymbols>,
}

impl LinkSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&mut self, unit: UnitSymbols) -> &mut Self {
        self.roots.push(unit);
        self
    }

    pub fn archive_member(&mut self, unit: UnitSymbols) -> &mut Self {
        self.archive.push(unit);
        self
    }

    /// Links `roots` against `archive` in one step.
    ///
    /// # Errors
    /// See [`LinkSet::resolve`].
    pub fn link(
        roots: impl IntoIterator<Item = UnitSymbols>,
        archive: impl IntoIterator<Item = UnitSymbols>,
    ) -> Result<LinkedImage, LinkError> {
        let set = Self {
            roots: roots.into_iter().collect(),
            archive: archive.into_iter().collect(),
        };
        set.resolve()
    }

    /// Pulls archive members until every need is satisfied.
    ///
    /// # Errors
    /// [`LinkError::Unresolved`] if a need has no provider, and
    /// [`LinkError::Duplicate`] if a marker is defined twice among the linked
    /// units or by two archive members that could satisfy the same need.
    pub fn resolve(&self) -> Result<LinkedImage, LinkError> {
        let mut providers: BTreeMap<&str, Vec<&UnitSymbols>> = BTreeMap::new();
        for member in &self.archive {
            for id in &member.defines {
                providers.entry(id.as_str()).or_default().push(member);
            }
        }

        let mut image = LinkedImage::default();
        // (target, needed_by), processed in sorted order
        let mut pending: BTreeSet<(&str, &str)> = BTreeSet::new();

        for root in &self.roots {
            image.add(root, true)?;
            pending.extend(root.needs.iter().map(|id| (id.as_str(), root.name.as_str())));
        }

        while let Some((target, needed_by)) = pending.pop_first() {
            if image.contains(target) {
                continue;
            }

            let member = match providers.get(target).map(Vec::as_slice) {
                None | Some([]) => {
                    return Err(LinkError::Unresolved {
                        needed_by: needed_by.into(),
                        target: target.into(),
                    });
                }
                Some([member]) => *member,
                Some([a, b, ..]) => return Err(LinkError::duplicate(target, &a.name, &b.name)),
            };

            debug!(
                "{} pulled in by {} for obj_{}",
                member.name, needed_by, target
            );
            image.add(member, false)?;
            pending.extend(
                member
                    .needs
                    .iter()
                    .map(|id| (id.as_str(), member.name.as_str())),
            );
        }

        Ok(image)
    }
}

/// Outcome of a successful [`LinkSet`] resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedImage {
    roots: BTreeSet<String>,
    pulled: BTreeSet<String>,
    /// Object identifier to the member defining it
    objects: BTreeMap<String, String>,
    debug_levels: BTreeMap<String, u64>,
}

impl LinkedImage {
    fn add(&mut self, unit: &UnitSymbols, root: bool) -> Result<(), LinkError> {
        for id in &unit.defines {
            if let Some(first) = self.objects.get(id) {
                return Err(LinkError::duplicate(id, first, &unit.name));
            }
        }
        for id in &unit.defines {
            trace!("obj_{} provided by {}", id, unit.name);
            self.objects.insert(id.clone(), unit.name.clone());
        }
        if let Some(level) = unit.debug_level {
            self.debug_levels.insert(unit.name.clone(), level);
        }
        if root {
            self.roots.insert(unit.name.clone());
        } else {
            self.pulled.insert(unit.name.clone());
        }
        Ok(())
    }

    /// All linked units, roots and pulled members, by name.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.roots.union(&self.pulled).map(String::as_str)
    }

    /// Archive members that were pulled in, by name.
    pub fn pulled(&self) -> impl Iterator<Item = &str> {
        self.pulled.iter().map(String::as_str)
    }

    /// Whether the object with identifier `id` is part of the image.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    #[must_use]
    pub fn contains_object(&self, id: ObjectId) -> bool {
        self.contains(id.as_str())
    }

    /// The unit that defines `obj_<id>`.
    #[must_use]
    pub fn provider(&self, id: &str) -> Option<&str> {
        self.objects.get(id).map(String::as_str)
    }

    pub fn objects(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Debug level recorded by a linked unit, if it has a nonzero one.
    #[must_use]
    pub fn debug_level(&self, member: &str) -> Option<u64> {
        self.debug_levels.get(member).copied()
    }
}

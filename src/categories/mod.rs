//! Interaction categories.
//!
//! The pair statistics computed by this crate are broken into categories of
//! interaction topology: pairwise interactions discovered with a distance
//! cutoff, bonded interactions read from the topology, and global fields
//! acting on every particle. Each category owns (or shares) a neighbor
//! structure and exposes a lazy stream of neighbor vectors that analyses
//! consume.

use std::sync::Arc;

use log::warn;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, MappedRwLockReadGuard};

use crate::{Error, Vector3D};
use crate::systems::{System, NeighborList, UnitCell};

mod pairwise;
pub use self::pairwise::Pairwise;

mod bond;
pub use self::bond::Bond;

mod global;
pub use self::global::Global;

/// The different kinds of interaction categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub enum CategoryKind {
    /// Cutoff-based pairwise interactions
    Pairwise,
    /// Interactions following the bonding topology
    Bond,
    /// Three-body angle interactions (not implemented yet)
    Angle,
    /// Four-body dihedral interactions (not implemented yet)
    Dihedral,
    /// Four-body improper interactions (not implemented yet)
    Improper,
    /// A global field acting on all particles
    Global,
}

/// A single entry in the neighbor vector stream of a [`Category`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborVector {
    /// unit vector from the center to the neighbor. Left as a zero vector
    /// when the distance is exactly zero, overlapping particles are a legal
    /// degenerate case. For `Global` this is the cross product of the field
    /// vector and the particle position, not normalized.
    pub direction: Vector3D,
    /// distance between the center and the neighbor. For `Global` this is
    /// the inner product of the field vector and the particle position.
    pub distance: f64,
    /// index of the neighbor, or `None` for the synthetic neighbor of a
    /// `Global` category, which never refers to a real particle.
    pub neighbor: Option<usize>,
}

/// A category of interaction topology.
///
/// Implementations decide which particle pairs are neighbors of each other,
/// cache the resulting adjacency structure, and generate per-particle
/// neighbor vectors from it.
pub trait Category: Send + Sync {
    /// Get a descriptive name for this category
    fn name(&self) -> String;

    /// Get the kind of this category
    fn kind(&self) -> CategoryKind;

    /// Get the cutoff of this category, if it is distance based
    fn cutoff(&self) -> Option<f64> {
        None
    }

    /// Check whether the neighbor structure is built and up to date
    fn is_ready(&self) -> bool;

    /// Build the neighbor structure from the given system if it is not ready
    /// yet. This is idempotent: calling it again without an intervening
    /// [`Category::teardown`] does nothing.
    fn setup(&self, system: &dyn System) -> Result<(), Error>;

    /// Discard the neighbor structure, forcing a rebuild on the next call to
    /// [`Category::setup`]. To be used when the topology may have changed,
    /// e.g. with a variable particle count between trajectory segments.
    fn teardown(&self);

    /// Get the indices of all neighbors of the atom at index `atom`
    fn neighbors_of(&self, atom: usize) -> Result<Vec<usize>, Error>;

    /// Get a lazy iterator over the neighbor vectors of the atom at index
    /// `atom`. Neighbors `j` for which `mask[j]` is false are skipped. Each
    /// call produces a fresh, restartable, finite iterator.
    fn neighbor_vectors<'a>(
        &'a self,
        atom: usize,
        system: &'a dyn System,
        mask: Option<&'a [bool]>,
    ) -> Result<NeighborVectors<'a>, Error>;

    /// Check whether this category can produce a pair of particles matching
    /// the two type selection patterns.
    fn pair_exists(&self, system: &dyn System, type1: &str, type2: &str) -> Result<bool, Error>;
}

/// Neighbor structure of a list-backed category, with the build-once /
/// read-many locking discipline shared by `Pairwise` and `Bond`.
pub(crate) struct ListState {
    list: RwLock<Option<NeighborList>>,
}

impl ListState {
    pub(crate) fn empty() -> ListState {
        ListState { list: RwLock::new(None) }
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.list.read().is_some()
    }

    /// Build the neighbor list under the write lock if it does not exist yet
    pub(crate) fn setup_with(
        &self,
        build: impl FnOnce() -> Result<NeighborList, Error>,
    ) -> Result<(), Error> {
        let mut guard = self.list.write();
        if guard.is_none() {
            *guard = Some(build()?);
        }
        return Ok(());
    }

    pub(crate) fn clear(&self) {
        *self.list.write() = None;
    }

    /// Get read access to the neighbor list, or `Error::NotReady` if it has
    /// not been built
    pub(crate) fn read(&self, category: &str) -> Result<MappedRwLockReadGuard<'_, NeighborList>, Error> {
        let guard = self.list.read();
        return RwLockReadGuard::try_map(guard, |list| list.as_ref()).map_err(|_| {
            Error::NotReady(format!("setup was not called on this {} category", category))
        });
    }
}

/// Lazy iterator over the neighbor vectors of one atom, created by
/// [`Category::neighbor_vectors`].
pub struct NeighborVectors<'a> {
    inner: Inner<'a>,
}

enum Inner<'a> {
    /// neighbors read from a flattened adjacency list; the read guard keeps
    /// the list alive (and prevents teardown) for the whole iteration
    List {
        list: MappedRwLockReadGuard<'a, NeighborList>,
        center: usize,
        cursor: usize,
        positions: &'a [Vector3D],
        cell: UnitCell,
        mask: Option<&'a [bool]>,
    },
    /// a single synthetic neighbor, for `Global` categories
    Single(Option<NeighborVector>),
}

impl<'a> NeighborVectors<'a> {
    fn from_list(
        list: MappedRwLockReadGuard<'a, NeighborList>,
        center: usize,
        system: &'a dyn System,
        mask: Option<&'a [bool]>,
    ) -> Result<NeighborVectors<'a>, Error> {
        Ok(NeighborVectors {
            inner: Inner::List {
                list: list,
                center: center,
                cursor: 0,
                positions: system.positions()?,
                cell: system.cell()?,
                mask: mask,
            },
        })
    }

    fn single(vector: NeighborVector) -> NeighborVectors<'a> {
        NeighborVectors { inner: Inner::Single(Some(vector)) }
    }
}

impl<'a> Iterator for NeighborVectors<'a> {
    type Item = NeighborVector;

    fn next(&mut self) -> Option<NeighborVector> {
        match &mut self.inner {
            Inner::List { list, center, cursor, positions, cell, mask } => {
                let neighbors = list.neighbors_of(*center);
                while *cursor < neighbors.len() {
                    let j = neighbors[*cursor];
                    *cursor += 1;

                    if let Some(mask) = mask {
                        if !mask[j] {
                            continue;
                        }
                    }

                    let r = cell.minimum_image(positions[j], positions[*center]);
                    let d = r.norm();
                    let direction = if d == 0.0 { r } else { r / d };

                    return Some(NeighborVector {
                        direction: direction,
                        distance: d,
                        neighbor: Some(j),
                    });
                }

                return None;
            }
            Inner::Single(vector) => vector.take(),
        }
    }
}

macro_rules! placeholder_category {
    ($(#[$docs: meta])* $Name: ident, $kind: expr, $name: literal) => {
        $(#[$docs])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $Name;

        impl Category for $Name {
            fn name(&self) -> String {
                $name.into()
            }

            fn kind(&self) -> CategoryKind {
                $kind
            }

            fn is_ready(&self) -> bool {
                false
            }

            fn setup(&self, _: &dyn System) -> Result<(), Error> {
                Ok(())
            }

            fn teardown(&self) {}

            fn neighbors_of(&self, _: usize) -> Result<Vec<usize>, Error> {
                Err(Error::NotReady(format!("{} categories have no adjacency yet", $name)))
            }

            fn neighbor_vectors<'a>(
                &'a self,
                _: usize,
                _: &'a dyn System,
                _: Option<&'a [bool]>,
            ) -> Result<NeighborVectors<'a>, Error> {
                Err(Error::NotReady(format!("{} categories have no adjacency yet", $name)))
            }

            fn pair_exists(&self, _: &dyn System, _: &str, _: &str) -> Result<bool, Error> {
                Ok(false)
            }
        }
    };
}

placeholder_category!(
    /// Three-body angle category. Placeholder, the angular adjacency is not
    /// implemented yet.
    Angle, CategoryKind::Angle, "angle"
);
placeholder_category!(
    /// Four-body dihedral category. Placeholder, the dihedral adjacency is
    /// not implemented yet.
    Dihedral, CategoryKind::Dihedral, "dihedral"
);
placeholder_category!(
    /// Four-body improper category. Placeholder, the improper adjacency is
    /// not implemented yet.
    Improper, CategoryKind::Improper, "improper"
);

/// Shared ownership registry for the singleton categories.
///
/// `Pairwise` (at a given cutoff) and `Bond` categories are shared between
/// all analyses using them, so that a neighbor structure is built exactly
/// once per topology validity window no matter how many analyses read it.
/// The registry hands out `Arc` handles; pass it explicitly to whatever
/// constructs analyses instead of relying on global state.
#[derive(Default)]
pub struct CategoryRegistry {
    pairwise: Mutex<Option<Arc<Pairwise>>>,
    bond: Mutex<Option<Arc<Bond>>>,
}

impl CategoryRegistry {
    pub fn new() -> CategoryRegistry {
        CategoryRegistry::default()
    }

    /// Get the shared pairwise category, creating it with the given `cutoff`
    /// on the first request.
    ///
    /// Once created, the category only supports monotonic cutoff growth:
    /// requesting it again with a cutoff larger than or equal to the current
    /// one returns the same handle, while a strictly smaller cutoff is
    /// rejected with [`Error::IncompatibleCutoff`], since the neighbor
    /// structure is bound to the cutoff it was built with.
    pub fn pairwise(&self, cutoff: f64) -> Result<Arc<Pairwise>, Error> {
        if !(cutoff > 0.0 && cutoff.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "pairwise cutoff must be positive and finite, got {}", cutoff
            )));
        }

        let mut slot = self.pairwise.lock();
        match &*slot {
            Some(existing) => {
                if cutoff < existing.cutoff() {
                    return Err(Error::IncompatibleCutoff {
                        current: existing.cutoff(),
                        requested: cutoff,
                    });
                }
                return Ok(Arc::clone(existing));
            }
            None => {
                let category = Arc::new(Pairwise::new(cutoff));
                *slot = Some(Arc::clone(&category));
                return Ok(category);
            }
        }
    }

    /// Get the shared pairwise category without constraining its cutoff, if
    /// it was created already
    pub fn shared_pairwise(&self) -> Option<Arc<Pairwise>> {
        self.pairwise.lock().clone()
    }

    /// Get the shared bond category, creating it on the first request
    pub fn bond(&self) -> Arc<Bond> {
        let mut slot = self.bond.lock();
        match &*slot {
            Some(existing) => Arc::clone(existing),
            None => {
                let category = Arc::new(Bond::new());
                *slot = Some(Arc::clone(&category));
                category
            }
        }
    }

    /// Tear down all shared categories, e.g. when the particle count or the
    /// bonding changed between trajectory segments.
    ///
    /// All analyses holding one of the shared handles will transparently
    /// trigger a rebuild on their next update; a warning is emitted if any
    /// handle is still held, since those analyses lose the build they may
    /// have been relying on.
    pub fn teardown_shared(&self) {
        // the registry's own slot accounts for one strong count
        if let Some(pairwise) = &*self.pairwise.lock() {
            if Arc::strong_count(pairwise) > 1 {
                warn!(
                    "tearing down the pairwise category while {} analyses still reference it",
                    Arc::strong_count(pairwise) - 1
                );
            }
            pairwise.teardown();
        }

        if let Some(bond) = &*self.bond.lock() {
            if Arc::strong_count(bond) > 1 {
                warn!(
                    "tearing down the bond category while {} analyses still reference it",
                    Arc::strong_count(bond) - 1
                );
            }
            bond.teardown();
        }
    }
}

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;

use crate::{Error, Vector3D};

mod cell;
pub use self::cell::{UnitCell, CellShape};

mod neighbors;
pub use self::neighbors::NeighborList;

mod simple_system;
pub use self::simple_system::SimpleSystem;

#[cfg(test)]
pub(crate) mod test_utils;

/// A `System` deals with the storage of atoms, their bonding topology and
/// the corresponding trajectory frame data (positions and unit cell).
///
/// This is the surface exposed by the external trajectory/topology
/// collaborator; this crate only ever reads from it.
pub trait System: Send + Sync {
    /// Get the unit cell for this system
    fn cell(&self) -> Result<UnitCell, Error>;

    /// Get the number of atoms in this system
    fn size(&self) -> Result<usize, Error>;

    /// Get the positions for all atoms in this system. The returned value
    /// must be a slice of length `self.size()` containing the Cartesian
    /// coordinates of all atoms, in a stable order across a run.
    fn positions(&self) -> Result<&[Vector3D], Error>;

    /// Get the type names for all atoms in this system. The returned value
    /// must be a slice of length `self.size()`.
    fn atom_types(&self) -> Result<&[String], Error>;

    /// Get the bonds in this system, as pairs of atom indices. Each bond
    /// should appear exactly once.
    fn bonds(&self) -> Result<&[(usize, usize)], Error>;

    /// Get the indices of all atoms whose type matches the given pattern.
    ///
    /// The default implementation treats `pattern` as a regular expression
    /// and matches it against the start of each type name. Implementations
    /// backed by a richer selection language can override this.
    fn select(&self, pattern: &str) -> Result<Vec<usize>, Error> {
        let regex = anchored(pattern)?;
        let mut selected = Vec::new();
        for (i, name) in self.atom_types()?.iter().enumerate() {
            if regex.is_match(name) {
                selected.push(i);
            }
        }
        return Ok(selected);
    }
}

/// Compile a selection pattern, anchored to match from the start of a type
/// name. Compiled patterns are cached, analyses check the same handful of
/// selectors on every frame.
pub(crate) fn anchored(pattern: &str) -> Result<Regex, Error> {
    static CACHE: Lazy<Mutex<Vec<(String, Regex)>>> = Lazy::new(|| Mutex::new(Vec::new()));

    let mut cache = CACHE.lock();
    for (cached, regex) in cache.iter() {
        if cached == pattern {
            return Ok(regex.clone());
        }
    }

    let regex = Regex::new(&format!("^(?:{})", pattern))?;
    cache.push((pattern.into(), regex.clone()));
    return Ok(regex);
}

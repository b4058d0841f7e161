use log::warn;

use crate::Vector3D;
use super::UnitCell;

/// Warn about atoms closer to one another than this distance, they are
/// usually a sign of a bad input structure. Overlapping atoms stay legal,
/// variable particle count schemes represent removed particles this way.
const CLOSE_CONTACT_DISTANCE: f64 = 1e-3;

/// A flattened adjacency list: neighbors of all atoms stored in a single
/// vector of indices, together with one neighbor count per atom.
///
/// The neighbors of atom `i` occupy the contiguous slice starting at
/// `offsets[i]` and containing `lengths[i]` entries. Neighbor relations are
/// stored in both directions, so `j` appearing in the slice of `i` implies
/// `i` appears in the slice of `j`. Self pairs are never stored.
#[derive(Debug, Clone)]
#[derive(serde::Serialize, serde::Deserialize)]
#[allow(clippy::module_name_repetitions)]
pub struct NeighborList {
    /// the cutoff used to create this neighbor list, if it was built from a
    /// distance criterion
    pub cutoff: Option<f64>,
    /// flattened neighbor indices for all atoms
    indices: Vec<usize>,
    /// number of neighbors of each atom
    lengths: Vec<usize>,
    /// start of each atom's slice in `indices`, with one extra entry holding
    /// the total length
    offsets: Vec<usize>,
}

impl NeighborList {
    /// Build a neighbor list containing, for every atom, the indices of all
    /// other atoms within `cutoff`, using the minimum image convention in
    /// periodic cells.
    ///
    /// This is a direct O(n²) scan over all atom pairs, which is enough at
    /// the system sizes these analyses target.
    #[time_graph::instrument(name = "NeighborList::from_cutoff")]
    pub fn from_cutoff(positions: &[Vector3D], cell: UnitCell, cutoff: f64) -> NeighborList {
        let n_atoms = positions.len();
        let cutoff2 = cutoff * cutoff;

        let mut per_atom = vec![Vec::new(); n_atoms];
        for i in 0..n_atoms {
            for j in (i + 1)..n_atoms {
                let vector = cell.minimum_image(positions[j], positions[i]);
                let distance2 = vector.norm2();
                if distance2 < cutoff2 {
                    if distance2 < CLOSE_CONTACT_DISTANCE * CLOSE_CONTACT_DISTANCE {
                        warn!(
                            "atoms {} and {} are very close to one another ({} A)",
                            i, j, distance2.sqrt()
                        );
                    }

                    per_atom[i].push(j);
                    per_atom[j].push(i);
                }
            }
        }

        return NeighborList::from_per_atom(Some(cutoff), &per_atom);
    }

    /// Build a neighbor list from a bond list, each bond contributing an
    /// entry in both participants' neighbor slices.
    pub fn from_bonds(n_atoms: usize, bonds: &[(usize, usize)]) -> NeighborList {
        let mut per_atom = vec![Vec::new(); n_atoms];
        for &(first, second) in bonds {
            per_atom[first].push(second);
            per_atom[second].push(first);
        }

        return NeighborList::from_per_atom(None, &per_atom);
    }

    /// Flatten per-atom neighbor vectors into the packed representation
    fn from_per_atom(cutoff: Option<f64>, per_atom: &[Vec<usize>]) -> NeighborList {
        let n_atoms = per_atom.len();

        // at most everything neighboring everything
        let mut indices = Vec::with_capacity(n_atoms * n_atoms.saturating_sub(1) / 2);
        let mut lengths = Vec::with_capacity(n_atoms);
        let mut offsets = Vec::with_capacity(n_atoms + 1);

        let mut accumulated = 0;
        for neighbors in per_atom {
            offsets.push(accumulated);
            lengths.push(neighbors.len());
            indices.extend_from_slice(neighbors);
            accumulated += neighbors.len();
        }
        offsets.push(accumulated);

        // resize now that we know how many entries there are
        indices.shrink_to_fit();

        return NeighborList {
            cutoff: cutoff,
            indices: indices,
            lengths: lengths,
            offsets: offsets,
        };
    }

    /// Get the number of atoms this neighbor list was built for
    pub fn size(&self) -> usize {
        self.lengths.len()
    }

    /// Get the neighbor counts for all atoms
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Get the indices of all neighbors of the atom at index `atom`
    pub fn neighbors_of(&self, atom: usize) -> &[usize] {
        &self.indices[self.offsets[atom]..self.offsets[atom + 1]]
    }

    /// Get the total number of stored neighbor entries (each pair counts
    /// twice)
    pub fn entries(&self) -> usize {
        self.indices.len()
    }
}

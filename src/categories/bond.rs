use crate::Error;
use crate::systems::{System, NeighborList};

use super::{Category, CategoryKind, ListState, NeighborVectors};

/// Bond interaction category. Particles are neighbors of each other when a
/// bond between them exists in the system topology.
///
/// The adjacency is built once from the bond list and cached until
/// [`Category::teardown`]; bonding does not change with particle positions.
/// Instances meant to be shared between analyses should be obtained through
/// [`CategoryRegistry::bond`](super::CategoryRegistry::bond).
pub struct Bond {
    state: ListState,
}

impl Bond {
    /// Create a new bond category
    pub fn new() -> Bond {
        Bond { state: ListState::empty() }
    }
}

impl Default for Bond {
    fn default() -> Bond {
        Bond::new()
    }
}

impl Category for Bond {
    fn name(&self) -> String {
        "bond".into()
    }

    fn kind(&self) -> CategoryKind {
        CategoryKind::Bond
    }

    fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    fn setup(&self, system: &dyn System) -> Result<(), Error> {
        self.state.setup_with(|| {
            Ok(NeighborList::from_bonds(system.size()?, system.bonds()?))
        })
    }

    fn teardown(&self) {
        self.state.clear();
    }

    fn neighbors_of(&self, atom: usize) -> Result<Vec<usize>, Error> {
        Ok(self.state.read("bond")?.neighbors_of(atom).to_vec())
    }

    fn neighbor_vectors<'a>(
        &'a self,
        atom: usize,
        system: &'a dyn System,
        mask: Option<&'a [bool]>,
    ) -> Result<NeighborVectors<'a>, Error> {
        let list = self.state.read("bond")?;
        return NeighborVectors::from_list(list, atom, system, mask);
    }

    /// Check whether any bonded pair matches the two type selection
    /// patterns, building the adjacency first if needed.
    fn pair_exists(&self, system: &dyn System, type1: &str, type2: &str) -> Result<bool, Error> {
        self.setup(system)?;
        let list = self.state.read("bond")?;

        let mut in_second = vec![false; system.size()?];
        for atom in system.select(type2)? {
            in_second[atom] = true;
        }

        for atom in system.select(type1)? {
            for &neighbor in list.neighbors_of(atom) {
                if in_second[neighbor] {
                    return Ok(true);
                }
            }
        }

        return Ok(false);
    }
}

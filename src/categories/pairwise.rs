use crate::Error;
use crate::systems::{System, NeighborList};

use super::{Category, CategoryKind, ListState, NeighborVectors};

/// Pairwise interaction category. Particles are neighbors of each other when
/// their minimum image distance is below the cutoff.
///
/// The neighbor structure is rebuilt lazily: once per call to
/// [`Category::setup`] following a [`Category::teardown`], not once per
/// frame. Instances meant to be shared between analyses should be obtained
/// through [`CategoryRegistry::pairwise`](super::CategoryRegistry::pairwise),
/// which enforces the cutoff compatibility contract.
pub struct Pairwise {
    cutoff: f64,
    state: ListState,
}

impl Pairwise {
    /// Create a new pairwise category with the given `cutoff`
    pub fn new(cutoff: f64) -> Pairwise {
        Pairwise {
            cutoff: cutoff,
            state: ListState::empty(),
        }
    }

    /// Get the cutoff of this category. The cutoff is immutable for the
    /// whole lifetime of the category, the neighbor structure is bound to it.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

impl Category for Pairwise {
    fn name(&self) -> String {
        format!("pairwise cutoff={}", self.cutoff)
    }

    fn kind(&self) -> CategoryKind {
        CategoryKind::Pairwise
    }

    fn cutoff(&self) -> Option<f64> {
        Some(self.cutoff)
    }

    fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    fn setup(&self, system: &dyn System) -> Result<(), Error> {
        self.state.setup_with(|| {
            Ok(NeighborList::from_cutoff(system.positions()?, system.cell()?, self.cutoff))
        })
    }

    fn teardown(&self) {
        self.state.clear();
    }

    fn neighbors_of(&self, atom: usize) -> Result<Vec<usize>, Error> {
        Ok(self.state.read("pairwise")?.neighbors_of(atom).to_vec())
    }

    fn neighbor_vectors<'a>(
        &'a self,
        atom: usize,
        system: &'a dyn System,
        mask: Option<&'a [bool]>,
    ) -> Result<NeighborVectors<'a>, Error> {
        let list = self.state.read("pairwise")?;
        return NeighborVectors::from_list(list, atom, system, mask);
    }

    fn pair_exists(&self, _: &dyn System, _: &str, _: &str) -> Result<bool, Error> {
        // a cutoff-based topology can always produce a pair in principle
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::test_utils::test_system;

    #[test]
    fn atoms_on_a_line() {
        let system = test_system("line");
        let category = Pairwise::new(1.5);

        assert!(!category.is_ready());
        category.setup(&system).unwrap();
        assert!(category.is_ready());

        assert_eq!(category.neighbors_of(0).unwrap(), [1]);
        assert_eq!(category.neighbors_of(1).unwrap(), [0, 2]);
        assert_eq!(category.neighbors_of(2).unwrap(), [1, 3]);
        assert_eq!(category.neighbors_of(3).unwrap(), [2]);
    }

    #[test]
    fn not_ready() {
        let system = test_system("line");
        let category = Pairwise::new(1.5);

        assert!(matches!(category.neighbors_of(0), Err(Error::NotReady(_))));
        assert!(matches!(
            category.neighbor_vectors(0, &system, None).map(|_| ()),
            Err(Error::NotReady(_))
        ));
    }

    #[test]
    fn setup_is_idempotent_until_teardown() {
        let mut system = test_system("line");
        let category = Pairwise::new(1.5);

        category.setup(&system).unwrap();
        assert_eq!(category.neighbors_of(0).unwrap(), [1]);

        // moving atoms does not change the cached structure until teardown
        system.positions_mut()[0].x = -10.0;
        category.setup(&system).unwrap();
        assert_eq!(category.neighbors_of(0).unwrap(), [1]);

        category.teardown();
        assert!(!category.is_ready());
        category.setup(&system).unwrap();
        assert!(category.neighbors_of(0).unwrap().is_empty());
    }

    #[test]
    fn neighbor_vectors() {
        let system = test_system("line");
        let category = Pairwise::new(1.5);
        category.setup(&system).unwrap();

        let vectors = category.neighbor_vectors(1, &system, None).unwrap().collect::<Vec<_>>();
        assert_eq!(vectors.len(), 2);

        assert_eq!(vectors[0].neighbor, Some(0));
        assert_eq!(vectors[0].distance, 1.0);
        assert_eq!(vectors[0].direction, crate::Vector3D::new(-1.0, 0.0, 0.0));

        assert_eq!(vectors[1].neighbor, Some(2));
        assert_eq!(vectors[1].distance, 1.0);
        assert_eq!(vectors[1].direction, crate::Vector3D::new(1.0, 0.0, 0.0));

        // each call produces a fresh iterator
        assert_eq!(category.neighbor_vectors(1, &system, None).unwrap().count(), 2);
    }

    #[test]
    fn neighbor_vectors_masked() {
        let system = test_system("line");
        let category = Pairwise::new(1.5);
        category.setup(&system).unwrap();

        let mask = [true, true, false, true];
        let vectors = category.neighbor_vectors(1, &system, Some(&mask)).unwrap().collect::<Vec<_>>();
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].neighbor, Some(0));
    }

    #[test]
    fn overlapping_atoms() {
        let mut system = test_system("line");
        system.positions_mut()[1] = crate::Vector3D::zero();

        let category = Pairwise::new(1.5);
        category.setup(&system).unwrap();

        let vectors = category.neighbor_vectors(0, &system, None).unwrap().collect::<Vec<_>>();
        assert_eq!(vectors.len(), 1);
        // overlap is legal, the direction degenerates to a zero vector
        assert_eq!(vectors[0].distance, 0.0);
        assert_eq!(vectors[0].direction, crate::Vector3D::zero());
    }

    #[test]
    fn pair_exists() {
        let system = test_system("line");
        let category = Pairwise::new(1.5);
        assert!(category.pair_exists(&system, "CH2", "CH3").unwrap());
    }
}

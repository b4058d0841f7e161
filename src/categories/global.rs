use crate::{Error, Vector3D};
use crate::systems::System;

use super::{Category, CategoryKind, NeighborVector, NeighborVectors};

/// Global field category: a fixed vector acting on all particles.
///
/// There is no neighbor structure; instead every particle gets a single
/// synthetic neighbor built by projecting the particle position against the
/// field vector. The direction of the synthetic neighbor vector is the cross
/// product of the field and the position, its distance is their inner
/// product, and its neighbor index is `None` since it never refers to a real
/// particle.
///
/// Unlike `Pairwise` and `Bond`, global categories are not shared: each
/// instantiation is independent, parameterized by its field vector.
pub struct Global {
    vector: Vector3D,
}

impl Global {
    /// Create a new global category with the given field `vector`
    pub fn new(vector: Vector3D) -> Global {
        Global { vector: vector }
    }

    /// Get the field vector of this category
    pub fn vector(&self) -> Vector3D {
        self.vector
    }
}

impl Category for Global {
    fn name(&self) -> String {
        format!("global {} {} {}", self.vector.x, self.vector.y, self.vector.z)
    }

    fn kind(&self) -> CategoryKind {
        CategoryKind::Global
    }

    /// A global category is permanently ready, there is nothing to build
    fn is_ready(&self) -> bool {
        true
    }

    fn setup(&self, _: &dyn System) -> Result<(), Error> {
        Ok(())
    }

    fn teardown(&self) {}

    /// A global category has no real neighbors
    fn neighbors_of(&self, _: usize) -> Result<Vec<usize>, Error> {
        Ok(Vec::new())
    }

    fn neighbor_vectors<'a>(
        &'a self,
        atom: usize,
        system: &'a dyn System,
        _: Option<&'a [bool]>,
    ) -> Result<NeighborVectors<'a>, Error> {
        let position = system.positions()?[atom];

        return Ok(NeighborVectors::single(NeighborVector {
            direction: self.vector ^ position,
            distance: self.vector * position,
            neighbor: None,
        }));
    }

    fn pair_exists(&self, _: &dyn System, _: &str, _: &str) -> Result<bool, Error> {
        // there is no pairwise topology in a global field
        Ok(false)
    }
}

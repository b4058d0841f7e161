use crate::{Error, Vector3D};

use super::{UnitCell, System};

/// A simple implementation of `System` to use when no other is available
#[derive(Clone, Debug)]
pub struct SimpleSystem {
    cell: UnitCell,
    types: Vec<String>,
    positions: Vec<Vector3D>,
    bonds: Vec<(usize, usize)>,
}

impl SimpleSystem {
    /// Create a new empty system with the given unit cell
    pub fn new(cell: UnitCell) -> SimpleSystem {
        SimpleSystem {
            cell: cell,
            types: Vec::new(),
            positions: Vec::new(),
            bonds: Vec::new(),
        }
    }

    /// Add an atom with the given type name and position to this system
    pub fn add_atom(&mut self, atom_type: impl Into<String>, position: Vector3D) {
        self.types.push(atom_type.into());
        self.positions.push(position);
    }

    /// Add a bond between the atoms at indices `first` and `second`
    pub fn add_bond(&mut self, first: usize, second: usize) {
        assert!(first < self.types.len() && second < self.types.len(), "bond atom out of bounds");
        assert_ne!(first, second, "can not bond an atom to itself");
        self.bonds.push((first, second));
    }

    #[cfg(test)]
    pub(crate) fn positions_mut(&mut self) -> &mut [Vector3D] {
        return &mut self.positions;
    }
}

impl System for SimpleSystem {
    fn cell(&self) -> Result<UnitCell, Error> {
        Ok(self.cell)
    }

    fn size(&self) -> Result<usize, Error> {
        Ok(self.types.len())
    }

    fn positions(&self) -> Result<&[Vector3D], Error> {
        Ok(&self.positions)
    }

    fn atom_types(&self) -> Result<&[String], Error> {
        Ok(&self.types)
    }

    fn bonds(&self) -> Result<&[(usize, usize)], Error> {
        Ok(&self.bonds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_atoms() {
        let mut system = SimpleSystem::new(UnitCell::cubic(10.0));
        system.add_atom("O", Vector3D::new(2.0, 3.0, 4.0));
        system.add_atom("H", Vector3D::new(1.0, 3.0, 4.0));
        system.add_atom("H", Vector3D::new(5.0, 3.0, 4.0));
        system.add_bond(0, 1);
        system.add_bond(0, 2);

        assert_eq!(system.size().unwrap(), 3);
        assert_eq!(system.atom_types().unwrap(), &["O", "H", "H"]);
        assert_eq!(system.positions().unwrap(), &[
            Vector3D::new(2.0, 3.0, 4.0),
            Vector3D::new(1.0, 3.0, 4.0),
            Vector3D::new(5.0, 3.0, 4.0),
        ]);
        assert_eq!(system.bonds().unwrap(), &[(0, 1), (0, 2)]);
    }

    #[test]
    fn select() {
        let mut system = SimpleSystem::new(UnitCell::infinite());
        system.add_atom("CH3", Vector3D::zero());
        system.add_atom("CH2", Vector3D::zero());
        system.add_atom("OW", Vector3D::zero());
        system.add_atom("CH2", Vector3D::zero());

        assert_eq!(system.select("CH2").unwrap(), [1, 3]);
        assert_eq!(system.select("CH.").unwrap(), [0, 1, 3]);
        assert_eq!(system.select("N.*").unwrap(), Vec::<usize>::new());
    }
}

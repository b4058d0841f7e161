//! The `UnitCell` type represents the enclosing box of a simulated system,
//! with some type of periodic condition.
use std::f64;
use crate::Vector3D;

/// The shape of a cell determine how we will be able to compute the periodic
/// boundaries condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[allow(clippy::module_name_repetitions)]
pub enum CellShape {
    /// Infinite unit cell, with no boundaries
    Infinite,
    /// Orthorhombic unit cell, with cuboid shape
    Orthorhombic,
}

/// An `UnitCell` defines the system physical boundaries.
///
/// The shape of the cell can be any of the [`CellShape`][CellShape], and will
/// influence how periodic boundary conditions are applied.
///
/// [CellShape]: enum.CellShape.html
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[allow(clippy::module_name_repetitions)]
pub struct UnitCell {
    /// Lengths of the three cell sides
    lengths: Vector3D,
    /// Unit cell shape
    shape: CellShape,
}

impl UnitCell {
    /// Create an infinite unit cell
    pub fn infinite() -> UnitCell {
        UnitCell {
            lengths: Vector3D::zero(),
            shape: CellShape::Infinite,
        }
    }

    /// Create an orthorhombic unit cell, with side lengths `a, b, c`.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> UnitCell {
        assert!(a > 0.0 && b > 0.0 && c > 0.0, "Cell lengths must be positive");
        UnitCell {
            lengths: Vector3D::new(a, b, c),
            shape: CellShape::Orthorhombic,
        }
    }

    /// Create a cubic unit cell, with side lengths `length, length, length`.
    pub fn cubic(length: f64) -> UnitCell {
        UnitCell::orthorhombic(length, length, length)
    }

    /// Get the cell shape
    pub fn shape(&self) -> CellShape {
        self.shape
    }

    /// Check if this unit cell is infinite, *i.e.* if it does not have
    /// periodic boundary conditions.
    pub fn is_infinite(&self) -> bool {
        self.shape() == CellShape::Infinite
    }

    /// Get the first length of the cell
    pub fn a(&self) -> f64 {
        self.lengths[0]
    }

    /// Get the second length of the cell
    pub fn b(&self) -> f64 {
        self.lengths[1]
    }

    /// Get the third length of the cell
    pub fn c(&self) -> f64 {
        self.lengths[2]
    }

    /// Get the volume of the cell
    pub fn volume(&self) -> f64 {
        match self.shape {
            CellShape::Infinite => 0.0,
            CellShape::Orthorhombic => self.a() * self.b() * self.c(),
        }
    }
}

/// Geometric operations using periodic boundary conditions
impl UnitCell {
    /// Wrap a vector in the unit cell, obeying the periodic boundary
    /// conditions. For a cubic cell of side length `L`, this produce a vector
    /// with all components in `[0, L)`.
    pub fn wrap_vector(&self, vector: &mut Vector3D) {
        match self.shape {
            CellShape::Infinite => (),
            CellShape::Orthorhombic => {
                for i in 0..3 {
                    vector[i] -= f64::floor(vector[i] / self.lengths[i]) * self.lengths[i];
                }
            }
        }
    }

    /// Find the image of a vector in the unit cell, obeying the periodic
    /// boundary conditions. For a cubic cell of side length `L`, this produce
    /// a vector with all components in `[-L/2, L/2)`.
    pub fn vector_image(&self, vector: &mut Vector3D) {
        match self.shape {
            CellShape::Infinite => (),
            CellShape::Orthorhombic => {
                for i in 0..3 {
                    vector[i] -= f64::round(vector[i] / self.lengths[i]) * self.lengths[i];
                }
            }
        }
    }

    /// Get the vector from the point `v` to the nearest periodic image of the
    /// point `u`
    pub fn minimum_image(&self, u: Vector3D, v: Vector3D) -> Vector3D {
        let mut d = u - v;
        self.vector_image(&mut d);
        return d;
    }

    /// Periodic boundary conditions squared distance between the point `u`
    /// and the point `v`
    pub fn distance2(&self, u: Vector3D, v: Vector3D) -> f64 {
        let mut d = v - u;
        self.vector_image(&mut d);
        return d.norm2();
    }

    /// Periodic boundary conditions distance between the point `u` and the
    /// point `v`
    pub fn distance(&self, u: Vector3D, v: Vector3D) -> f64 {
        return f64::sqrt(self.distance2(u, v));
    }
}

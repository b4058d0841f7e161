//! This module provides the 3D vector type used everywhere else in this crate.

mod vectors;
pub use self::vectors::Vector3D;

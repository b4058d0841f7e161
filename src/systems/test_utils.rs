use crate::Vector3D;
use super::{UnitCell, SimpleSystem};

pub fn test_system(name: &str) -> SimpleSystem {
    match name {
        "line" => get_line(),
        "chain" => get_chain(),
        "water" => get_water(),
        "salt" => get_salt(),
        _ => panic!("unknown test system {}", name)
    }
}

/// 4 atoms on a line at x = 0, 1, 2, 3, no periodicity
fn get_line() -> SimpleSystem {
    let mut system = SimpleSystem::new(UnitCell::infinite());
    for i in 0..4 {
        system.add_atom("CH2", Vector3D::new(i as f64, 0.0, 0.0));
    }
    return system;
}

/// 3 bonded atoms: 0 - 1 - 2
fn get_chain() -> SimpleSystem {
    let mut system = SimpleSystem::new(UnitCell::infinite());
    system.add_atom("CH3", Vector3D::new(0.0, 0.0, 0.0));
    system.add_atom("CH2", Vector3D::new(1.5, 0.0, 0.0));
    system.add_atom("CH3", Vector3D::new(3.0, 0.0, 0.0));
    system.add_bond(0, 1);
    system.add_bond(1, 2);
    return system;
}

fn get_water() -> SimpleSystem {
    let mut system = SimpleSystem::new(UnitCell::cubic(10.0));
    system.add_atom("OW", Vector3D::new(0.0, 0.0, 0.0));
    system.add_atom("HW", Vector3D::new(0.0, 0.75545, -0.58895));
    system.add_atom("HW", Vector3D::new(0.0, -0.75545, -0.58895));
    system.add_bond(0, 1);
    system.add_bond(0, 2);
    return system;
}

/// CsCl-like structure: two interpenetrating cubic sublattices, the Na atom
/// at the center of a cube of side 1 has 8 Cl neighbors at sqrt(3)/2
fn get_salt() -> SimpleSystem {
    let mut system = SimpleSystem::new(UnitCell::cubic(1.0));
    system.add_atom("Cl", Vector3D::new(0.0, 0.0, 0.0));
    system.add_atom("Na", Vector3D::new(0.5, 0.5, 0.5));
    return system;
}

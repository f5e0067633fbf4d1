//! Geometry module for the membrane surface and its periodic container.
//!
//! Contains the static mesh topology (bonds, triangles, opposite vertices),
//! the triclinic periodic box, and generators for closed test surfaces.

mod generator;
mod mesh;
mod periodic_box;

pub use generator::GeneratedMesh;
pub use mesh::{MeshBond, MeshDefinition, MeshTriangle, DEFAULT_BOND_TYPE};
pub use periodic_box::BoxDim;

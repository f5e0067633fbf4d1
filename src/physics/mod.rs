//! Physics module for membrane bending.
//!
//! This module implements:
//! - Per-edge discrete curvature kernels (cotangent weights and their gradients)
//! - The two-pass Helfrich bending force computation
//! - Virial bookkeeping for pressure consumers
//!
//! References:
//! - Helfrich, Z Naturforsch 1973
//! - Meyer et al., Visualization and Mathematics III, 2003

pub mod curvature;
pub mod helfrich;
pub mod virial;

pub use curvature::{cotangent, edge_weight, EdgeStencil, VertexCurvature};
pub use helfrich::{ForceSummary, HelfrichMeshForceCompute};
pub use virial::Virial;

use glam::DVec3;

use crate::error::HelfrichError;
use crate::state::SystemState;

/// Force and potential energy of one particle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceEnergy {
    pub force: DVec3,
    pub energy: f64,
}

/// A force term an integrator can evaluate once per timestep
///
/// Outputs are indexed by particle storage index and only hold owned
/// particles' contributions.
pub trait ForceCompute {
    /// Evaluate forces for `timestep`, skipping the work if this timestep
    /// has already been computed with unchanged parameters
    fn compute(&mut self, timestep: u64, system: &SystemState) -> Result<(), HelfrichError>;

    /// Per-particle force and energy
    fn force_energy(&self) -> &[ForceEnergy];

    /// Per-particle virial
    fn virials(&self) -> &[Virial];

    /// Sum of per-particle energies
    fn total_energy(&self) -> f64 {
        self.force_energy().iter().map(|fe| fe.energy).sum()
    }

    /// Sum of per-particle forces
    fn net_force(&self) -> DVec3 {
        self.force_energy().iter().map(|fe| fe.force).sum()
    }

    /// Sum of per-particle virials
    fn total_virial(&self) -> Virial {
        let mut total = [0.0; 6];
        for v in self.virials() {
            virial::add_scaled(&mut total, v, 1.0);
        }
        total
    }
}


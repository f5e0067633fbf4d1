//! State consumed by the force computation.
//!
//! Particle positions with their tag/index table, the periodic box, and the
//! per-timestep flags, plus the scoped buffers the passes write into.

mod buffers;
mod id_table;
mod particles;

pub use buffers::{AccessMode, ArrayHandle, ArrayHandleMut, GlobalArray};
pub use id_table::IdTable;
pub use particles::ParticleData;

use crate::geometry::BoxDim;

/// What the caller wants computed this timestep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputeFlags {
    /// Accumulate the per-particle virial
    pub pressure_tensor: bool,
}

/// Read-only view of the system for one force evaluation
#[derive(Debug, Clone)]
pub struct SystemState {
    pub particles: ParticleData,
    pub box_dim: BoxDim,
    pub flags: ComputeFlags,
}

impl SystemState {
    pub fn new(particles: ParticleData, box_dim: BoxDim) -> Self {
        Self {
            particles,
            box_dim,
            flags: ComputeFlags::default(),
        }
    }

    /// Request virial accumulation
    pub fn with_virial(mut self) -> Self {
        self.flags.pressure_tensor = true;
        self
    }
}

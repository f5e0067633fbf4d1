//! Helfrich mesh - bending forces for closed triangulated membranes
//!
//! Evaluates the discrete Helfrich bending energy of a closed triangle mesh
//! embedded in a periodic simulation box, together with its forces and
//! virial. Each evaluation runs a summary pass (mixed areas and curvature
//! normals per vertex) followed by a force pass that reads those summaries.

pub mod config;
pub mod error;
pub mod geometry;
pub mod physics;
pub mod state;

pub use config::{BendingModuli, ExecutionMode, HelfrichConfig, DEFAULT_SINE_FLOOR};
pub use error::{HelfrichError, TopologyError};
pub use geometry::{BoxDim, GeneratedMesh, MeshDefinition};
pub use physics::{ForceCompute, ForceEnergy, ForceSummary, HelfrichMeshForceCompute, Virial};
pub use state::{ComputeFlags, ParticleData, SystemState};

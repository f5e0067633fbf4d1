//! Engine configuration and the per-type bending modulus store.

use serde::{Deserialize, Serialize};

use crate::error::HelfrichError;
use crate::geometry::MeshDefinition;

/// Smallest sine used when inverting to a cotangent
pub const DEFAULT_SINE_FLOOR: f64 = 0.001;

/// How the per-edge kernels are evaluated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// One edge after another
    #[default]
    Serial,
    /// Edge kernels on the rayon pool, scattered in edge order
    Parallel,
}

/// Numerical policy of the force computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelfrichConfig {
    /// Floor applied to corner sines before computing cotangents.
    /// Bounds every cotangent weight by 1 / sine_floor.
    pub sine_floor: f64,
    /// Serial or parallel edge evaluation
    pub execution: ExecutionMode,
}

impl HelfrichConfig {
    /// Check the numerical policy before a pass
    ///
    /// The floor must be finite and positive for cotangents to stay bounded.
    pub fn validate(&self) -> Result<(), HelfrichError> {
        if self.sine_floor.is_finite() && self.sine_floor > 0.0 {
            Ok(())
        } else {
            log::error!("helfrich: invalid sine floor {}", self.sine_floor);
            Err(HelfrichError::InvalidSineFloor(self.sine_floor))
        }
    }
}

impl Default for HelfrichConfig {
    fn default() -> Self {
        Self {
            sine_floor: DEFAULT_SINE_FLOOR,
            execution: ExecutionMode::Serial,
        }
    }
}

/// Bending modulus K per mesh bond type
///
/// Sized by the mesh's declared type count; every access is checked against
/// it.
#[derive(Debug, Clone, PartialEq)]
pub struct BendingModuli {
    values: Vec<Option<f64>>,
    names: Vec<String>,
}

impl BendingModuli {
    /// Empty store for the bond types of `mesh`
    pub fn for_mesh(mesh: &MeshDefinition) -> Self {
        let names = (0..mesh.n_types() as u32)
            .map(|t| mesh.type_name(t).unwrap_or_default().to_string())
            .collect::<Vec<_>>();
        Self {
            values: vec![None; names.len()],
            names,
        }
    }

    pub fn n_types(&self) -> usize {
        self.values.len()
    }

    /// Set K for `type_id`
    ///
    /// Non-positive values are stored as given, with a warning.
    pub fn set(&mut self, type_id: u32, k: f64) -> Result<(), HelfrichError> {
        self.check(type_id)?;
        if k <= 0.0 {
            log::warn!(
                "helfrich: specified K <= 0 for mesh bond type '{}' (K = {})",
                self.names[type_id as usize],
                k
            );
        }
        self.values[type_id as usize] = Some(k);
        Ok(())
    }

    /// K for `type_id`
    pub fn get(&self, type_id: u32) -> Result<f64, HelfrichError> {
        self.check(type_id)?;
        self.values[type_id as usize]
            .ok_or_else(|| HelfrichError::UnsetParameter(self.names[type_id as usize].clone()))
    }

    fn check(&self, type_id: u32) -> Result<(), HelfrichError> {
        if (type_id as usize) < self.values.len() {
            Ok(())
        } else {
            log::error!("helfrich: invalid mesh bond type {} specified", type_id);
            Err(HelfrichError::InvalidBondType {
                type_id,
                n_types: self.values.len(),
            })
        }
    }
}

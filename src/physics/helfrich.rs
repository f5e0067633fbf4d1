//! Helfrich bending forces on a closed triangulated mesh.
//!
//! Discrete Helfrich energy:
//!
//! E = Σ_v (K_v/2) |σ'_v|² / σ_v
//!
//! Where:
//! - σ_v = mixed Voronoi area of vertex v
//! - σ'_v = integrated mean-curvature normal of vertex v
//! - K_v = bending modulus, the mean over the bond types incident to v
//!
//! Each evaluation runs two passes over the mesh bonds. The summary pass
//! accumulates σ and σ' for every vertex; the force pass differentiates the
//! energy through each bond's contribution to those sums and scatters the
//! forces onto the bond's four-vertex stencil. The force pass reads the
//! summaries left by the last summary pass, so the passes must run in order
//! on the same positions.
//!
//! Reference: Helfrich, Z Naturforsch 1973

use std::sync::Arc;

use glam::DVec3;
use rayon::prelude::*;
use serde::Serialize;

use super::curvature::{edge_forces, summarize_edge, EdgeStencil, VertexCurvature};
use super::virial::{self, Virial};
use super::{ForceCompute, ForceEnergy};
use crate::config::{BendingModuli, ExecutionMode, HelfrichConfig};
use crate::error::HelfrichError;
use crate::geometry::MeshDefinition;
use crate::state::{GlobalArray, ParticleData, SystemState};

/// Snapshot of the last evaluation, for logging
#[derive(Debug, Clone, Serialize)]
pub struct ForceSummary {
    pub timestep: Option<u64>,
    pub n_bonds: usize,
    pub total_energy: f64,
    pub max_force: f64,
    pub net_force: [f64; 3],
    pub total_virial: Virial,
    pub degenerate_vertices: usize,
}

/// Two-pass Helfrich bending force computation
pub struct HelfrichMeshForceCompute {
    mesh: Arc<MeshDefinition>,
    config: HelfrichConfig,
    moduli: BendingModuli,
    /// Mixed area σ per particle index
    sigma: GlobalArray<f64>,
    /// Curvature normal σ' per particle index
    sigma_dash: GlobalArray<DVec3>,
    /// K_v per particle index
    vertex_modulus: GlobalArray<f64>,
    /// Number of bonds incident to each particle index
    incident: GlobalArray<u32>,
    force: GlobalArray<ForceEnergy>,
    virial: GlobalArray<Virial>,
    degenerate_vertices: usize,
    last_computed: Option<u64>,
}

impl HelfrichMeshForceCompute {
    /// Create the force compute for `mesh`; moduli start unset
    pub fn new(mesh: Arc<MeshDefinition>, config: HelfrichConfig) -> Self {
        log::debug!(
            "constructing Helfrich mesh force: {} bonds, {} triangles, {} bond types",
            mesh.n_bonds(),
            mesh.n_triangles(),
            mesh.n_types()
        );
        let moduli = BendingModuli::for_mesh(&mesh);

        Self {
            mesh,
            config,
            moduli,
            sigma: GlobalArray::default(),
            sigma_dash: GlobalArray::default(),
            vertex_modulus: GlobalArray::default(),
            incident: GlobalArray::default(),
            force: GlobalArray::default(),
            virial: GlobalArray::default(),
            degenerate_vertices: 0,
            last_computed: None,
        }
    }

    /// Set the bending modulus of a mesh bond type
    pub fn set_params(&mut self, type_id: u32, k: f64) -> Result<(), HelfrichError> {
        self.moduli.set(type_id, k)?;
        self.last_computed = None;
        Ok(())
    }

    /// Bending modulus of a mesh bond type
    pub fn get_params(&self, type_id: u32) -> Result<f64, HelfrichError> {
        self.moduli.get(type_id)
    }

    pub fn set_params_by_name(&mut self, name: &str, k: f64) -> Result<(), HelfrichError> {
        let type_id = self.type_id(name)?;
        self.set_params(type_id, k)
    }

    pub fn get_params_by_name(&self, name: &str) -> Result<f64, HelfrichError> {
        self.get_params(self.type_id(name)?)
    }

    fn type_id(&self, name: &str) -> Result<u32, HelfrichError> {
        self.mesh
            .type_id(name)
            .ok_or_else(|| HelfrichError::UnknownBondTypeName(name.to_string()))
    }

    pub fn mesh(&self) -> &Arc<MeshDefinition> {
        &self.mesh
    }

    pub fn config(&self) -> &HelfrichConfig {
        &self.config
    }

    pub fn set_execution(&mut self, execution: ExecutionMode) {
        self.config.execution = execution;
    }

    /// Mixed area σ per particle index, from the last summary pass
    pub fn sigma(&self) -> &[f64] {
        self.sigma.as_slice()
    }

    /// Curvature normal σ' per particle index, from the last summary pass
    pub fn sigma_dash(&self) -> &[DVec3] {
        self.sigma_dash.as_slice()
    }

    /// K_v per particle index, from the last summary pass
    pub fn vertex_moduli(&self) -> &[f64] {
        self.vertex_modulus.as_slice()
    }

    /// Per-particle forces from the last force pass
    pub fn forces(&self) -> Vec<DVec3> {
        self.force.as_slice().iter().map(|fe| fe.force).collect()
    }

    /// Per-particle bending energies from the last force pass
    pub fn energies(&self) -> Vec<f64> {
        self.force.as_slice().iter().map(|fe| fe.energy).collect()
    }

    /// Timestep of the last successful evaluation
    pub fn last_computed(&self) -> Option<u64> {
        self.last_computed
    }

    /// Recompute σ and σ' for the current positions
    pub fn compute_sigma(&mut self, system: &SystemState) -> Result<(), HelfrichError> {
        self.config.validate()?;
        let stencils = self.resolve_stencils(&system.particles)?;
        let type_moduli = self.type_moduli(&stencils)?;
        let n = system.particles.n_total();
        self.resize(n);

        let positions = system.particles.positions();
        let box_dim = system.box_dim;
        let floor = self.config.sine_floor;
        let summaries = map_edges(self.config.execution, &stencils, |st| {
            summarize_edge(st, positions, &box_dim, floor)
        });

        let mut sigma = self.sigma.overwrite();
        let mut sigma_dash = self.sigma_dash.overwrite();
        let mut modulus = self.vertex_modulus.overwrite();
        let mut incident = self.incident.overwrite();

        for (st, s) in stencils.iter().zip(&summaries) {
            sigma[st.a] += s.sigma;
            sigma[st.b] += s.sigma;
            sigma_dash[st.a] += s.sigma_dash;
            sigma_dash[st.b] -= s.sigma_dash;

            let k = type_moduli[st.type_id as usize];
            for v in [st.a, st.b] {
                modulus[v] += k;
                incident[v] += 1;
            }
        }

        let mut degenerate = 0;
        for ((k, &count), &s) in modulus.iter_mut().zip(incident.iter()).zip(sigma.iter()) {
            if count == 0 {
                continue;
            }
            *k /= count as f64;
            if s == 0.0 || !s.is_finite() {
                degenerate += 1;
            }
        }
        self.degenerate_vertices = degenerate;

        if degenerate > 0 {
            log::warn!(
                "helfrich: {} vertices have zero or non-finite mixed area; bending energies and forces will not be finite",
                degenerate
            );
        }

        Ok(())
    }

    /// Evaluate forces, energies and virials from the current σ and σ'
    ///
    /// Uses whatever the last [`compute_sigma`](Self::compute_sigma) left
    /// behind; if positions moved since then the result is stale.
    pub fn compute_bending_forces(&mut self, system: &SystemState) -> Result<(), HelfrichError> {
        self.config.validate()?;
        let particles = &system.particles;
        let stencils = self.resolve_stencils(particles)?;
        self.resize(particles.n_total());

        let positions = particles.positions();
        let box_dim = system.box_dim;
        let floor = self.config.sine_floor;
        let compute_virial = system.flags.pressure_tensor;

        let sigma = self.sigma.read();
        let sigma_dash = self.sigma_dash.read();
        let modulus = self.vertex_modulus.read();
        let vertex = |i: usize| VertexCurvature {
            sigma: sigma[i],
            sigma_dash: sigma_dash[i],
            modulus: modulus[i],
        };

        let contributions = map_edges(self.config.execution, &stencils, |st| {
            edge_forces(st, positions, &box_dim, floor, &vertex(st.a), &vertex(st.b))
        });

        let mut force = self.force.overwrite();
        let mut virials = self.virial.overwrite();

        for (st, edge) in stencils.iter().zip(&contributions) {
            // do not update ghost particles
            for (&idx, f) in st.indices().iter().zip(edge.forces) {
                if particles.is_local(idx) {
                    force[idx].force += f;
                }
            }

            for idx in [st.a, st.b] {
                if !particles.is_local(idx) {
                    continue;
                }
                force[idx].energy = vertex(idx).energy();
                if compute_virial {
                    virial::add_scaled(&mut virials[idx], &edge.virial, 0.5);
                }
            }
        }

        Ok(())
    }

    /// Run the summary pass and then the force pass for `timestep`
    ///
    /// On error the outputs are zeroed and the timestep is not recorded.
    pub fn compute_forces(&mut self, timestep: u64, system: &SystemState) -> Result<(), HelfrichError> {
        let result = self
            .compute_sigma(system)
            .and_then(|()| self.compute_bending_forces(system));

        match result {
            Ok(()) => {
                self.last_computed = Some(timestep);
                log::debug!(
                    "helfrich: timestep {} energy {:.6e} over {} bonds",
                    timestep,
                    self.total_energy(),
                    self.mesh.n_bonds()
                );
                Ok(())
            }
            Err(e) => {
                log::error!("helfrich: force computation aborted at timestep {}: {}", timestep, e);
                self.force.overwrite();
                self.virial.overwrite();
                self.last_computed = None;
                Err(e)
            }
        }
    }

    /// Summary of the last evaluation
    pub fn summary(&self) -> ForceSummary {
        let max_force = self
            .force
            .as_slice()
            .iter()
            .map(|fe| fe.force.length())
            .fold(0.0, f64::max);

        ForceSummary {
            timestep: self.last_computed,
            n_bonds: self.mesh.n_bonds(),
            total_energy: self.total_energy(),
            max_force,
            net_force: self.net_force().to_array(),
            total_virial: self.total_virial(),
            degenerate_vertices: self.degenerate_vertices,
        }
    }

    /// Map every bond to particle indices through the id table
    fn resolve_stencils(&self, particles: &ParticleData) -> Result<Vec<EdgeStencil>, HelfrichError> {
        let index = |tag: u32| {
            particles.index_of(tag).ok_or_else(|| {
                log::error!("helfrich: mesh tag {} has no particle (max tag {:?})", tag, particles.max_tag());
                HelfrichError::UnknownTag(tag)
            })
        };

        self.mesh
            .bonds()
            .iter()
            .enumerate()
            .map(|(i, bond)| {
                let [c, d] = self.mesh.opposite_tags(i);
                Ok(EdgeStencil {
                    a: index(bond.tags[0])?,
                    b: index(bond.tags[1])?,
                    c: index(c)?,
                    d: index(d)?,
                    type_id: bond.type_id,
                })
            })
            .collect()
    }

    /// K for every bond type, failing only on types the mesh actually uses
    fn type_moduli(&self, stencils: &[EdgeStencil]) -> Result<Vec<f64>, HelfrichError> {
        let mut used = vec![false; self.moduli.n_types()];
        for st in stencils {
            used[st.type_id as usize] = true;
        }

        used.iter()
            .enumerate()
            .map(|(t, &used)| if used { self.moduli.get(t as u32) } else { Ok(0.0) })
            .collect()
    }

    fn resize(&mut self, n: usize) {
        self.sigma.resize(n);
        self.sigma_dash.resize(n);
        self.vertex_modulus.resize(n);
        self.incident.resize(n);
        self.force.resize(n);
        self.virial.resize(n);
    }
}

impl ForceCompute for HelfrichMeshForceCompute {
    fn compute(&mut self, timestep: u64, system: &SystemState) -> Result<(), HelfrichError> {
        if self.last_computed == Some(timestep) {
            log::trace!("helfrich: timestep {} already computed", timestep);
            return Ok(());
        }
        self.compute_forces(timestep, system)
    }

    fn force_energy(&self) -> &[ForceEnergy] {
        self.force.as_slice()
    }

    fn virials(&self) -> &[Virial] {
        self.virial.as_slice()
    }
}

/// Evaluate `kernel` for every edge, in edge order
///
/// The parallel mode only distributes the kernel evaluations; callers
/// scatter the results serially, so both modes give identical sums.
fn map_edges<T, F>(mode: ExecutionMode, stencils: &[EdgeStencil], kernel: F) -> Vec<T>
where
    T: Send,
    F: Fn(&EdgeStencil) -> T + Sync + Send,
{
    match mode {
        ExecutionMode::Serial => stencils.iter().map(kernel).collect(),
        ExecutionMode::Parallel => stencils.par_iter().map(kernel).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoxDim, GeneratedMesh};

    fn tetrahedron_system() -> (HelfrichMeshForceCompute, SystemState) {
        let g = GeneratedMesh::tetrahedron(1.0).unwrap();
        let mut compute = HelfrichMeshForceCompute::new(Arc::new(g.mesh), HelfrichConfig::default());
        compute.set_params(0, 2.0).unwrap();
        let system = SystemState::new(ParticleData::new(g.positions), BoxDim::cube(20.0));
        (compute, system)
    }

    #[test]
    fn test_params_by_name() {
        let (mut compute, _) = tetrahedron_system();
        assert_eq!(compute.mesh().n_bonds(), 6);
        assert_eq!(compute.config().sine_floor, 0.001);
        compute.set_params_by_name("mesh", 3.5).unwrap();
        assert_eq!(compute.get_params_by_name("mesh").unwrap(), 3.5);
        assert_eq!(compute.get_params(0).unwrap(), 3.5);
        assert_eq!(
            compute.set_params_by_name("membrane", 1.0).unwrap_err(),
            HelfrichError::UnknownBondTypeName("membrane".to_string())
        );
    }

    #[test]
    fn test_unset_modulus_is_an_error() {
        let g = GeneratedMesh::tetrahedron(1.0).unwrap();
        let mut compute = HelfrichMeshForceCompute::new(Arc::new(g.mesh), HelfrichConfig::default());
        let system = SystemState::new(ParticleData::new(g.positions), BoxDim::cube(20.0));
        let err = compute.compute_forces(0, &system).unwrap_err();
        assert_eq!(err, HelfrichError::UnsetParameter("mesh".to_string()));
        assert_eq!(compute.last_computed(), None);
    }

    #[test]
    fn test_missing_particle_aborts() {
        let (mut compute, _) = tetrahedron_system();
        let three = vec![DVec3::ZERO, DVec3::X, DVec3::Y];
        let system = SystemState::new(ParticleData::new(three), BoxDim::cube(20.0));
        let err = compute.compute_forces(0, &system).unwrap_err();
        assert_eq!(err, HelfrichError::UnknownTag(3));
        assert!(compute.force_energy().iter().all(|fe| *fe == ForceEnergy::default()));
    }

    #[test]
    fn test_tetrahedron_sigma() {
        let (mut compute, system) = tetrahedron_system();
        compute.compute_sigma(&system).unwrap();

        // Three edges per vertex, each with weight cot 60° = 1/√3
        let expected = 3.0 * (1.0 / 3.0_f64.sqrt()) / 4.0;
        for &s in compute.sigma() {
            assert!((s - expected).abs() < 1e-12, "sigma {} vs {}", s, expected);
        }
        assert!(compute.vertex_moduli().iter().all(|&k| k == 2.0));
    }

    #[test]
    fn test_invalid_sine_floor_refused() {
        for floor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let g = GeneratedMesh::tetrahedron(1.0).unwrap();
            let config = HelfrichConfig {
                sine_floor: floor,
                ..Default::default()
            };
            let mut compute = HelfrichMeshForceCompute::new(Arc::new(g.mesh), config);
            compute.set_params(0, 1.0).unwrap();
            let system = SystemState::new(ParticleData::new(g.positions), BoxDim::cube(20.0));

            let err = compute.compute_forces(0, &system).unwrap_err();
            assert!(matches!(err, HelfrichError::InvalidSineFloor(_)), "floor {}", floor);
            assert!(compute.compute_bending_forces(&system).is_err());
            assert_eq!(compute.last_computed(), None);
        }
    }

    #[test]
    fn test_compute_is_cached_per_timestep() {
        let (mut compute, mut system) = tetrahedron_system();
        compute.compute(5, &system).unwrap();
        let before = compute.total_energy();

        system.particles.set_position(0, DVec3::new(0.5, 0.4, 0.3)).unwrap();
        compute.compute(5, &system).unwrap();
        assert_eq!(compute.total_energy(), before);

        compute.compute(6, &system).unwrap();
        assert_ne!(compute.total_energy(), before);
        assert_eq!(compute.last_computed(), Some(6));
    }

    #[test]
    fn test_set_params_invalidates_cache() {
        let (mut compute, system) = tetrahedron_system();
        compute.compute(1, &system).unwrap();
        let e2 = compute.total_energy();

        compute.set_params(0, 4.0).unwrap();
        compute.compute(1, &system).unwrap();
        assert!((compute.total_energy() - 2.0 * e2).abs() < 1e-12 * e2.abs().max(1.0));
    }

    #[test]
    fn test_summary_serializes() {
        let (mut compute, system) = tetrahedron_system();
        compute.compute_forces(3, &system).unwrap();
        let summary = compute.summary();
        assert_eq!(summary.timestep, Some(3));
        assert_eq!(summary.n_bonds, 6);
        assert_eq!(summary.degenerate_vertices, 0);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"total_energy\""));
    }
}

//! Mesh topology store.
//!
//! A closed triangulated surface described by particle tags. Every bond
//! (edge) carries the indices of its two incident triangles, and the vertex
//! of each triangle opposite the bond is resolved once here, at construction,
//! since the topology never changes during a run.

use std::collections::BTreeMap;

use crate::error::{HelfrichError, TopologyError};

/// Name given to the single bond type of meshes built with [`MeshDefinition::from_triangles`]
pub const DEFAULT_BOND_TYPE: &str = "mesh";

/// A triangle of the mesh, as three particle tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshTriangle {
    pub tags: [u32; 3],
}

/// An edge of the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshBond {
    /// Endpoint tags
    pub tags: [u32; 2],
    /// Indices of the two incident triangles
    pub faces: [u32; 2],
    /// Bond type id
    pub type_id: u32,
}

/// Static mesh topology with validated opposite vertices
#[derive(Debug, Clone)]
pub struct MeshDefinition {
    bonds: Vec<MeshBond>,
    triangles: Vec<MeshTriangle>,
    type_names: Vec<String>,
    /// Tags of the vertices opposite each bond in its two faces
    opposite: Vec<[u32; 2]>,
    max_tag: Option<u32>,
}

impl MeshDefinition {
    /// Build a mesh from explicit bonds and triangles
    ///
    /// Fails if any bond violates the closed-manifold invariant: both of its
    /// faces must exist, be distinct, contain both endpoints, and have exactly
    /// one further vertex.
    pub fn new(
        bonds: Vec<MeshBond>,
        triangles: Vec<MeshTriangle>,
        type_names: Vec<String>,
    ) -> Result<Self, TopologyError> {
        let mut opposite = Vec::with_capacity(bonds.len());

        for (i, bond) in bonds.iter().enumerate() {
            let [t0, t1] = bond.tags;
            if t0 == t1 {
                return Err(TopologyError::SelfBond { bond: i, tag: t0 });
            }
            if bond.type_id as usize >= type_names.len() {
                return Err(TopologyError::BondTypeOutOfRange {
                    bond: i,
                    type_id: bond.type_id,
                    n_types: type_names.len(),
                });
            }
            if bond.faces[0] == bond.faces[1] {
                return Err(TopologyError::DuplicateFace {
                    bond: i,
                    face: bond.faces[0],
                });
            }

            let c = opposite_vertex(i, bond, bond.faces[0], &triangles)?;
            let d = opposite_vertex(i, bond, bond.faces[1], &triangles)?;
            opposite.push([c, d]);
        }

        let max_tag = triangles
            .iter()
            .flat_map(|t| t.tags)
            .chain(bonds.iter().flat_map(|b| b.tags))
            .max();

        Ok(Self {
            bonds,
            triangles,
            type_names,
            opposite,
            max_tag,
        })
    }

    /// Build a single-type mesh from its triangles, deriving the bonds
    ///
    /// Bonds are ordered by their sorted endpoint tags. Every edge must be
    /// shared by exactly two triangles.
    pub fn from_triangles(triangles: &[[u32; 3]]) -> Result<Self, TopologyError> {
        let mut edge_faces: BTreeMap<(u32, u32), Vec<u32>> = BTreeMap::new();

        for (face, tri) in triangles.iter().enumerate() {
            for k in 0..3 {
                let (u, v) = (tri[k], tri[(k + 1) % 3]);
                let key = (u.min(v), u.max(v));
                edge_faces.entry(key).or_default().push(face as u32);
            }
        }

        let mut bonds = Vec::with_capacity(edge_faces.len());
        for ((u, v), faces) in edge_faces {
            if faces.len() != 2 {
                return Err(TopologyError::NonManifoldEdge(u, v, faces.len()));
            }
            bonds.push(MeshBond {
                tags: [u, v],
                faces: [faces[0], faces[1]],
                type_id: 0,
            });
        }

        let triangles = triangles.iter().map(|&tags| MeshTriangle { tags }).collect();
        Self::new(bonds, triangles, vec![DEFAULT_BOND_TYPE.to_string()])
    }

    /// Declare an additional bond type, returning its id
    pub fn add_bond_type(&mut self, name: &str) -> u32 {
        if let Some(existing) = self.type_id(name) {
            return existing;
        }
        self.type_names.push(name.to_string());
        (self.type_names.len() - 1) as u32
    }

    /// Change the type of one bond
    pub fn set_bond_type(&mut self, bond: usize, type_id: u32) -> Result<(), HelfrichError> {
        if type_id as usize >= self.type_names.len() {
            return Err(HelfrichError::InvalidBondType {
                type_id,
                n_types: self.type_names.len(),
            });
        }
        let n_bonds = self.bonds.len();
        let entry = self
            .bonds
            .get_mut(bond)
            .ok_or(TopologyError::BondOutOfRange { bond, n_bonds })?;
        entry.type_id = type_id;
        Ok(())
    }

    pub fn bonds(&self) -> &[MeshBond] {
        &self.bonds
    }

    pub fn triangles(&self) -> &[MeshTriangle] {
        &self.triangles
    }

    pub fn n_bonds(&self) -> usize {
        self.bonds.len()
    }

    pub fn n_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of declared bond types
    pub fn n_types(&self) -> usize {
        self.type_names.len()
    }

    /// Look up a bond type id by name
    pub fn type_id(&self, name: &str) -> Option<u32> {
        self.type_names
            .iter()
            .position(|n| n == name)
            .map(|i| i as u32)
    }

    pub fn type_name(&self, type_id: u32) -> Option<&str> {
        self.type_names.get(type_id as usize).map(String::as_str)
    }

    /// Tags of the vertices opposite bond `bond` in its first and second face
    pub fn opposite_tags(&self, bond: usize) -> [u32; 2] {
        self.opposite[bond]
    }

    /// Largest tag referenced by the mesh
    pub fn max_tag(&self) -> Option<u32> {
        self.max_tag
    }

    /// Euler characteristic V - E + F (2 for a closed sphere-like surface)
    pub fn euler_characteristic(&self) -> i64 {
        let mut vertices: Vec<u32> = self.triangles.iter().flat_map(|t| t.tags).collect();
        vertices.sort_unstable();
        vertices.dedup();
        vertices.len() as i64 - self.bonds.len() as i64 + self.triangles.len() as i64
    }
}

/// Find the single vertex of `face` that is not an endpoint of `bond`
fn opposite_vertex(
    bond_idx: usize,
    bond: &MeshBond,
    face: u32,
    triangles: &[MeshTriangle],
) -> Result<u32, TopologyError> {
    let tri = triangles
        .get(face as usize)
        .ok_or(TopologyError::FaceOutOfRange {
            bond: bond_idx,
            face,
            n_triangles: triangles.len(),
        })?;

    let [t0, t1] = bond.tags;
    if !tri.tags.contains(&t0) || !tri.tags.contains(&t1) {
        return Err(TopologyError::BondNotInFace { bond: bond_idx, face });
    }

    let mut others = tri.tags.iter().filter(|&&t| t != t0 && t != t1);
    match (others.next(), others.next()) {
        (Some(&c), None) => Ok(c),
        _ => Err(TopologyError::NoOppositeVertex { bond: bond_idx, face }),
    }
}

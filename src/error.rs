//! Error types for mesh construction and force evaluation.

use thiserror::Error;

/// Malformed mesh topology detected while building a [`crate::geometry::MeshDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("bond {bond} connects tag {tag} to itself")]
    SelfBond { bond: usize, tag: u32 },

    #[error("bond {bond} references triangle {face}, but the mesh only has {n_triangles} triangles")]
    FaceOutOfRange {
        bond: usize,
        face: u32,
        n_triangles: usize,
    },

    #[error("bond {bond} lists triangle {face} for both of its faces")]
    DuplicateFace { bond: usize, face: u32 },

    #[error("triangle {face} does not contain both endpoints of bond {bond}")]
    BondNotInFace { bond: usize, face: u32 },

    #[error("triangle {face} has no unique vertex opposite bond {bond}")]
    NoOppositeVertex { bond: usize, face: u32 },

    #[error("edge ({0}, {1}) is shared by {2} triangles, a closed manifold mesh needs exactly 2")]
    NonManifoldEdge(u32, u32, usize),

    #[error("bond {bond} does not exist, the mesh has {n_bonds} bonds")]
    BondOutOfRange { bond: usize, n_bonds: usize },

    #[error("bond {bond} has type {type_id}, but only {n_types} bond types are declared")]
    BondTypeOutOfRange {
        bond: usize,
        type_id: u32,
        n_types: usize,
    },
}

/// Errors raised while configuring or evaluating the bending force.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HelfrichError {
    #[error("invalid mesh bond type {type_id} (mesh declares {n_types} types)")]
    InvalidBondType { type_id: u32, n_types: usize },

    #[error("unknown mesh bond type name '{0}'")]
    UnknownBondTypeName(String),

    #[error("bending modulus for mesh bond type '{0}' has not been set")]
    UnsetParameter(String),

    #[error("mesh references tag {0}, which is not present in the particle data")]
    UnknownTag(u32),

    #[error("invalid permutation of {0} particles")]
    InvalidPermutation(usize),

    #[error("tag {tag} is too large for the id table (tags must stay below {limit})")]
    TagOutOfRange { tag: u32, limit: usize },

    #[error("sine floor must be finite and positive, got {0}")]
    InvalidSineFloor(f64),

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

//! Closed test surfaces.
//!
//! Generates small closed triangulations (tetrahedron, octahedron and
//! subdivided icosahedra) together with vertex positions. Vertex `i` gets
//! particle tag `i`.

use std::collections::HashMap;

use glam::DVec3;

use super::MeshDefinition;
use crate::error::TopologyError;

/// A mesh topology together with the positions of its vertices
#[derive(Debug, Clone)]
pub struct GeneratedMesh {
    pub mesh: MeshDefinition,
    /// Positions indexed by tag
    pub positions: Vec<DVec3>,
}

impl GeneratedMesh {
    /// Regular tetrahedron with edge length `edge`, centered on the origin
    pub fn tetrahedron(edge: f64) -> Result<Self, TopologyError> {
        // Alternate cube corners have edge length 2√2
        let s = edge / (2.0 * std::f64::consts::SQRT_2);
        let positions = vec![
            DVec3::new(1.0, 1.0, 1.0) * s,
            DVec3::new(1.0, -1.0, -1.0) * s,
            DVec3::new(-1.0, 1.0, -1.0) * s,
            DVec3::new(-1.0, -1.0, 1.0) * s,
        ];
        let faces = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];

        Ok(Self {
            mesh: MeshDefinition::from_triangles(&faces)?,
            positions,
        })
    }

    /// Regular octahedron with vertices at distance `radius` from the origin
    pub fn octahedron(radius: f64) -> Result<Self, TopologyError> {
        let positions = vec![
            DVec3::X * radius,
            -DVec3::X * radius,
            DVec3::Y * radius,
            -DVec3::Y * radius,
            DVec3::Z * radius,
            -DVec3::Z * radius,
        ];
        let faces = [
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];

        Ok(Self {
            mesh: MeshDefinition::from_triangles(&faces)?,
            positions,
        })
    }

    /// Icosahedron subdivided `subdivisions` times and projected onto a sphere
    ///
    /// Each subdivision splits every triangle into four, so the mesh has
    /// 10·4ⁿ + 2 vertices.
    pub fn icosphere(radius: f64, subdivisions: u32) -> Result<Self, TopologyError> {
        let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
        let mut positions: Vec<DVec3> = [
            (-1.0, phi, 0.0),
            (1.0, phi, 0.0),
            (-1.0, -phi, 0.0),
            (1.0, -phi, 0.0),
            (0.0, -1.0, phi),
            (0.0, 1.0, phi),
            (0.0, -1.0, -phi),
            (0.0, 1.0, -phi),
            (phi, 0.0, -1.0),
            (phi, 0.0, 1.0),
            (-phi, 0.0, -1.0),
            (-phi, 0.0, 1.0),
        ]
        .iter()
        .map(|&(x, y, z)| DVec3::new(x, y, z).normalize())
        .collect();

        let mut faces: Vec<[u32; 3]> = vec![
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];

        for _ in 0..subdivisions {
            let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
            let mut next_faces = Vec::with_capacity(faces.len() * 4);

            let mut midpoint = |u: u32, v: u32, positions: &mut Vec<DVec3>| -> u32 {
                let key = (u.min(v), u.max(v));
                *midpoints.entry(key).or_insert_with(|| {
                    let p = (positions[u as usize] + positions[v as usize]).normalize();
                    positions.push(p);
                    (positions.len() - 1) as u32
                })
            };

            for &[a, b, c] in &faces {
                let ab = midpoint(a, b, &mut positions);
                let bc = midpoint(b, c, &mut positions);
                let ca = midpoint(c, a, &mut positions);
                next_faces.push([a, ab, ca]);
                next_faces.push([b, bc, ab]);
                next_faces.push([c, ca, bc]);
                next_faces.push([ab, bc, ca]);
            }
            faces = next_faces;
        }

        for p in &mut positions {
            *p *= radius;
        }

        Ok(Self {
            mesh: MeshDefinition::from_triangles(&faces)?,
            positions,
        })
    }

    /// Total surface area of the triangulation
    pub fn surface_area(&self) -> f64 {
        self.mesh
            .triangles()
            .iter()
            .map(|t| {
                let [a, b, c] = t.tags.map(|tag| self.positions[tag as usize]);
                0.5 * (b - a).cross(c - a).length()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tetrahedron_edges() {
        let g = GeneratedMesh::tetrahedron(1.5).unwrap();
        for bond in g.mesh.bonds() {
            let [a, b] = bond.tags.map(|t| g.positions[t as usize]);
            assert!(((b - a).length() - 1.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_octahedron_counts() {
        let g = GeneratedMesh::octahedron(1.0).unwrap();
        assert_eq!(g.positions.len(), 6);
        assert_eq!(g.mesh.n_bonds(), 12);
        assert_eq!(g.mesh.euler_characteristic(), 2);
    }

    #[test]
    fn test_icosphere_counts() {
        for n in 0..3 {
            let g = GeneratedMesh::icosphere(2.0, n).unwrap();
            let faces = 20 * 4usize.pow(n);
            assert_eq!(g.mesh.n_triangles(), faces);
            assert_eq!(g.positions.len(), 10 * 4usize.pow(n) + 2);
            assert_eq!(g.mesh.n_bonds(), 3 * faces / 2);
            assert_eq!(g.mesh.euler_characteristic(), 2);
        }
    }

    #[test]
    fn test_icosphere_area_approaches_sphere() {
        let g = GeneratedMesh::icosphere(1.0, 3).unwrap();
        let sphere = 4.0 * std::f64::consts::PI;
        let area = g.surface_area();
        assert!(area < sphere);
        assert!((area - sphere).abs() / sphere < 0.02, "area {}", area);
    }
}

//! Per-edge discrete curvature kernels.
//!
//! Every mesh edge (a, b) sits between two triangles (a, b, c) and (a, b, d).
//! Its cotangent-Laplacian weight is
//!
//! σ̂_ab = (cot∠acb + cot∠adb) / 2
//!
//! and it contributes to the mixed area σ and curvature normal σ' of both
//! endpoints:
//!
//! σ_a += σ̂_ab |ab|² / 4      σ_b += σ̂_ab |ab|² / 4
//! σ'_a += σ̂_ab ab            σ'_b -= σ̂_ab ab
//!
//! The bending energy of a vertex is E_v = (K_v/2) |σ'_v|² / σ_v.
//!
//! Corner sines are floored before dividing so that nearly flat or folded
//! corners give a bounded weight. NaN inputs are deliberately left unclamped.
//!
//! References:
//! - Meyer et al., Discrete Differential-Geometry Operators for Triangulated
//!   2-Manifolds, 2003
//! - Gompper & Kroll, J Phys I France 1996

use glam::DVec3;

use super::virial::{self, Virial};
use crate::geometry::BoxDim;

/// The four particle indices an edge's energy terms depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeStencil {
    /// First endpoint
    pub a: usize,
    /// Second endpoint
    pub b: usize,
    /// Vertex opposite the edge in the first face
    pub c: usize,
    /// Vertex opposite the edge in the second face
    pub d: usize,
    /// Mesh bond type
    pub type_id: u32,
}

impl EdgeStencil {
    pub fn indices(&self) -> [usize; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

/// Minimum-image displacements of an edge stencil
#[derive(Debug, Clone, Copy)]
struct EdgeDisplacements {
    dab: DVec3,
    dac: DVec3,
    dad: DVec3,
    dbc: DVec3,
    dbd: DVec3,
}

impl EdgeDisplacements {
    fn new(stencil: &EdgeStencil, positions: &[DVec3], box_dim: &BoxDim) -> Self {
        let pa = positions[stencil.a];
        let pb = positions[stencil.b];
        let pc = positions[stencil.c];
        let pd = positions[stencil.d];

        Self {
            dab: box_dim.min_image(pb - pa),
            dac: box_dim.min_image(pc - pa),
            dad: box_dim.min_image(pd - pa),
            dbc: box_dim.min_image(pc - pb),
            dbd: box_dim.min_image(pd - pb),
        }
    }
}

/// Clamp a cosine to [-1, 1], passing NaN through
#[inline]
fn clamp_cos(cos: f64) -> f64 {
    cos.clamp(-1.0, 1.0)
}

/// Sine of a clamped cosine, floored at `floor`
///
/// Returns the sine and whether the floor was applied.
#[inline]
fn floored_sin(cos: f64, floor: f64) -> (f64, bool) {
    let sin = (1.0 - cos * cos).sqrt();
    if sin < floor {
        (floor, true)
    } else {
        (sin, false)
    }
}

/// Cotangent of an angle given its cosine, with the sine floored at `floor`
///
/// |cot| never exceeds 1 / floor.
#[inline]
pub fn cotangent(cos: f64, floor: f64) -> f64 {
    let cos = clamp_cos(cos);
    let (sin, _) = floored_sin(cos, floor);
    cos / sin
}

/// Cosine of the angle at the apex between the directions to a and b
///
/// `dac` and `dbc` point from a and b to the apex.
#[inline]
fn corner_cos(dac: DVec3, dbc: DVec3) -> f64 {
    let nac = dac / dac.length();
    let nbc = dbc / dbc.length();
    nac.dot(nbc)
}

/// Cotangent of a triangle corner and its gradient with respect to the
/// three triangle vertices
#[derive(Debug, Clone, Copy)]
struct CornerCotangent {
    cot: f64,
    grad_a: DVec3,
    grad_b: DVec3,
    grad_apex: DVec3,
}

impl CornerCotangent {
    /// Corner at the apex of the triangle (a, b, apex)
    ///
    /// With u = a - apex, v = b - apex and θ the angle between them,
    ///
    /// ∂cosθ/∂a = (v̂ - cosθ û) / |u|
    /// ∂cosθ/∂b = (û - cosθ v̂) / |v|
    ///
    /// and d(cotθ)/d(cosθ) = 1/sin³θ, or 1/floor once the floor is active.
    fn new(dac: DVec3, dbc: DVec3, floor: f64) -> Self {
        let rac = dac.length();
        let rbc = dbc.length();
        let nac = dac / rac;
        let nbc = dbc / rbc;

        let cos = clamp_cos(nac.dot(nbc));
        let (sin, floored) = floored_sin(cos, floor);
        let cot = cos / sin;
        let dcot_dcos = if floored { 1.0 / floor } else { 1.0 / (sin * sin * sin) };

        let grad_a = dcot_dcos * (cos * nac - nbc) / rac;
        let grad_b = dcot_dcos * (cos * nbc - nac) / rbc;

        Self {
            cot,
            grad_a,
            grad_b,
            grad_apex: -(grad_a + grad_b),
        }
    }
}

/// Contribution of one edge to the per-vertex summaries
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EdgeSummary {
    /// Added to σ of both endpoints
    pub sigma: f64,
    /// Added to σ' of `a`, subtracted from σ' of `b`
    pub sigma_dash: DVec3,
}

/// Cotangent weight σ̂_ab of an edge
pub fn edge_weight(stencil: &EdgeStencil, positions: &[DVec3], box_dim: &BoxDim, floor: f64) -> f64 {
    let g = EdgeDisplacements::new(stencil, positions, box_dim);
    weight_from(&g, floor)
}

#[inline]
fn weight_from(g: &EdgeDisplacements, floor: f64) -> f64 {
    let cot_accb = cotangent(corner_cos(g.dac, g.dbc), floor);
    let cot_addb = cotangent(corner_cos(g.dad, g.dbd), floor);
    (cot_accb + cot_addb) / 2.0
}

pub(crate) fn summarize_edge(
    stencil: &EdgeStencil,
    positions: &[DVec3],
    box_dim: &BoxDim,
    floor: f64,
) -> EdgeSummary {
    let g = EdgeDisplacements::new(stencil, positions, box_dim);
    let sigma_hat_ab = weight_from(&g, floor);

    EdgeSummary {
        sigma: sigma_hat_ab * g.dab.length_squared() * 0.25,
        sigma_dash: sigma_hat_ab * g.dab,
    }
}

/// Summary and modulus of one vertex, as seen by the force pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexCurvature {
    /// Mixed area σ
    pub sigma: f64,
    /// Curvature normal σ'
    pub sigma_dash: DVec3,
    /// Bending modulus K_v
    pub modulus: f64,
}

impl VertexCurvature {
    /// E_v = (K_v/2) |σ'|² / σ
    #[inline]
    pub fn energy(&self) -> f64 {
        0.5 * self.modulus * self.sigma_dash.length_squared() / self.sigma
    }

    /// (∂E_v/∂σ', ∂E_v/∂σ)
    #[inline]
    fn energy_derivatives(&self) -> (DVec3, f64) {
        let d_dash = self.modulus * self.sigma_dash / self.sigma;
        let d_area =
            -0.5 * self.modulus * self.sigma_dash.length_squared() / (self.sigma * self.sigma);
        (d_dash, d_area)
    }
}

/// Forces of one edge on its stencil, in stencil order (a, b, c, d)
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EdgeForce {
    pub forces: [DVec3; 4],
    /// Σ_p (x_p - x_a) ⊗ F_p, symmetrized
    pub virial: Virial,
}

/// Negative gradient of the endpoint energies with respect to this edge's
/// contribution to σ and σ'
///
/// The edge enters E_a and E_b through σ̂_ab (which depends on all four
/// stencil vertices) and through ab. With G = ∂E_a/∂σ'_a - ∂E_b/∂σ'_b and
/// H = ∂E_a/∂σ_a + ∂E_b/∂σ_b:
///
/// ∂E/∂x_p = (G·ab + H|ab|²/4) ∂σ̂_ab/∂x_p ± σ̂_ab (G + H ab/2)
///
/// where the last term enters with + for b, - for a, and not at all for c, d.
/// Summing over all edges gives the exact gradient of Σ_v E_v.
pub(crate) fn edge_forces(
    stencil: &EdgeStencil,
    positions: &[DVec3],
    box_dim: &BoxDim,
    floor: f64,
    end_a: &VertexCurvature,
    end_b: &VertexCurvature,
) -> EdgeForce {
    let g = EdgeDisplacements::new(stencil, positions, box_dim);

    let accb = CornerCotangent::new(g.dac, g.dbc, floor);
    let addb = CornerCotangent::new(g.dad, g.dbd, floor);
    let sigma_hat_ab = (accb.cot + addb.cot) / 2.0;

    let dsigma_hat_a = (accb.grad_a + addb.grad_a) / 2.0;
    let dsigma_hat_b = (accb.grad_b + addb.grad_b) / 2.0;
    let dsigma_hat_c = accb.grad_apex / 2.0;
    let dsigma_hat_d = addb.grad_apex / 2.0;

    let (dash_a, area_a) = end_a.energy_derivatives();
    let (dash_b, area_b) = end_b.energy_derivatives();
    let dash = dash_a - dash_b;
    let area = area_a + area_b;

    let rsqab = g.dab.length_squared();
    let weight = dash.dot(g.dab) + area * rsqab * 0.25;
    let direct = sigma_hat_ab * (dash + 0.5 * area * g.dab);

    let fa = -(weight * dsigma_hat_a - direct);
    let fb = -(weight * dsigma_hat_b + direct);
    let fc = -weight * dsigma_hat_c;
    let fd = -weight * dsigma_hat_d;

    let mut w = virial::symmetric_outer(g.dab, fb);
    virial::add_scaled(&mut w, &virial::symmetric_outer(g.dac, fc), 1.0);
    virial::add_scaled(&mut w, &virial::symmetric_outer(g.dad, fd), 1.0);

    EdgeForce {
        forces: [fa, fb, fc, fd],
        virial: w,
    }
}

//! Symmetric virial tensor bookkeeping.
//!
//! Six independent components stored as `[xx, xy, xz, yy, yz, zz]`.

use glam::DVec3;

pub const XX: usize = 0;
pub const XY: usize = 1;
pub const XZ: usize = 2;
pub const YY: usize = 3;
pub const YZ: usize = 4;
pub const ZZ: usize = 5;

/// Upper triangle of a symmetric 3×3 tensor
pub type Virial = [f64; 6];

/// Symmetrized outer product ½(r ⊗ f + f ⊗ r)
#[inline]
pub fn symmetric_outer(r: DVec3, f: DVec3) -> Virial {
    [
        r.x * f.x,
        0.5 * (r.x * f.y + r.y * f.x),
        0.5 * (r.x * f.z + r.z * f.x),
        r.y * f.y,
        0.5 * (r.y * f.z + r.z * f.y),
        r.z * f.z,
    ]
}

/// `acc += scale * v`
#[inline]
pub fn add_scaled(acc: &mut Virial, v: &Virial, scale: f64) {
    for (a, b) in acc.iter_mut().zip(v) {
        *a += scale * b;
    }
}

/// Trace xx + yy + zz
#[inline]
pub fn trace(v: &Virial) -> f64 {
    v[XX] + v[YY] + v[ZZ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_outer() {
        let v = symmetric_outer(DVec3::new(1.0, 2.0, 3.0), DVec3::new(4.0, 5.0, 6.0));
        assert_eq!(v[XX], 4.0);
        assert_eq!(v[XY], 0.5 * (5.0 + 8.0));
        assert_eq!(v[YZ], 0.5 * (12.0 + 15.0));
        assert_eq!(trace(&v), 4.0 + 10.0 + 18.0);
    }

    #[test]
    fn test_add_scaled() {
        let mut acc = [1.0; 6];
        add_scaled(&mut acc, &[2.0; 6], 0.5);
        assert_eq!(acc, [2.0; 6]);
    }
}

//! Triclinic periodic simulation box.
//!
//! The box is spanned by the lattice vectors
//!
//! a₁ = (Lx, 0, 0)
//! a₂ = (xy·Ly, Ly, 0)
//! a₃ = (xz·Lz, yz·Lz, Lz)
//!
//! and centered on `lo + (a₁ + a₂ + a₃) / 2`. Each axis can be made
//! non-periodic independently.

use glam::DVec3;

/// Periodic box supplying the minimum-image convention
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxDim {
    /// Box edge lengths (Lx, Ly, Lz)
    lengths: DVec3,
    /// Tilt factors xy, xz, yz
    tilt: DVec3,
    /// Lower corner
    lo: DVec3,
    /// Periodicity per axis
    periodic: [bool; 3],
}

impl BoxDim {
    /// Orthorhombic box centered on the origin, periodic in all directions
    pub fn new(lx: f64, ly: f64, lz: f64) -> Self {
        let lengths = DVec3::new(lx, ly, lz);
        Self {
            lengths,
            tilt: DVec3::ZERO,
            lo: -0.5 * lengths,
            periodic: [true; 3],
        }
    }

    /// Cubic box of edge `l`
    pub fn cube(l: f64) -> Self {
        Self::new(l, l, l)
    }

    /// Set the tilt factors, keeping the box centered where it was
    pub fn with_tilt(mut self, xy: f64, xz: f64, yz: f64) -> Self {
        let center = self.center();
        self.tilt = DVec3::new(xy, xz, yz);
        self.lo = center - 0.5 * (self.a1() + self.a2() + self.a3());
        self
    }

    /// Choose which axes wrap
    pub fn with_periodic(mut self, periodic: [bool; 3]) -> Self {
        self.periodic = periodic;
        self
    }

    pub fn a1(&self) -> DVec3 {
        DVec3::new(self.lengths.x, 0.0, 0.0)
    }

    pub fn a2(&self) -> DVec3 {
        DVec3::new(self.tilt.x * self.lengths.y, self.lengths.y, 0.0)
    }

    pub fn a3(&self) -> DVec3 {
        DVec3::new(
            self.tilt.y * self.lengths.z,
            self.tilt.z * self.lengths.z,
            self.lengths.z,
        )
    }

    /// Geometric center of the box
    pub fn center(&self) -> DVec3 {
        self.lo + 0.5 * (self.a1() + self.a2() + self.a3())
    }

    /// Shortest periodic image of a displacement vector
    ///
    /// Reduces z first, then y, then x, so that the tilt couplings of the
    /// higher axes are folded into the lower ones.
    pub fn min_image(&self, mut v: DVec3) -> DVec3 {
        let l = self.lengths;

        if self.periodic[2] {
            let img = (v.z / l.z).round();
            v.z -= l.z * img;
            v.y -= l.z * self.tilt.z * img;
            v.x -= l.z * self.tilt.y * img;
        }

        if self.periodic[1] {
            let img = (v.y / l.y).round();
            v.y -= l.y * img;
            v.x -= l.y * self.tilt.x * img;
        }

        if self.periodic[0] {
            let img = (v.x / l.x).round();
            v.x -= l.x * img;
        }

        v
    }

    /// Map a position back into the primary box image
    pub fn wrap(&self, position: DVec3) -> DVec3 {
        let center = self.center();
        center + self.min_image(position - center)
    }
}

//! Angular/radial wedge and the lab ↔ sector-local rotation.

use nalgebra::{Rotation2, Vector2};

/// Wedge region of the station with its own local frame.
///
/// In the local frame the wedge bisector is the +x axis, so `xl` is the
/// radial coordinate along the bisector and `yl` the transverse offset.
#[derive(Debug, Clone)]
pub struct SectorFrame {
    phi0: f64,
    half_width: f64,
    r_min: f64,
    r_max: f64,
    tan_half_width: f64,
    /// Lab → local rotation (by −φ₀).
    to_local: Rotation2<f64>,
}

impl SectorFrame {
    /// Create a wedge centered on azimuth `phi0` with half-width `half_width`
    /// spanning `[r_min, r_max]` along the bisector.
    pub fn new(phi0: f64, half_width: f64, r_min: f64, r_max: f64) -> Self {
        Self {
            phi0,
            half_width,
            r_min,
            r_max,
            tan_half_width: half_width.tan(),
            to_local: Rotation2::new(-phi0),
        }
    }

    /// Center azimuth φ₀ in radians.
    pub fn phi0(&self) -> f64 {
        self.phi0
    }

    /// Half-width δ of the wedge in radians.
    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    pub fn r_min(&self) -> f64 {
        self.r_min
    }

    pub fn r_max(&self) -> f64 {
        self.r_max
    }

    /// Rotate a lab point into the sector frame.
    #[inline]
    pub fn rotate_to_sector(&self, lab_xy: [f64; 2]) -> [f64; 2] {
        let v = self.to_local * Vector2::new(lab_xy[0], lab_xy[1]);
        [v.x, v.y]
    }

    /// Rotate a sector-local point back into the lab frame.
    #[inline]
    pub fn sector_to_lab(&self, local_xy: [f64; 2]) -> [f64; 2] {
        let v = self.to_local.inverse() * Vector2::new(local_xy[0], local_xy[1]);
        [v.x, v.y]
    }

    /// Membership test for a sector-local point.
    ///
    /// Uses the straight wedge sides `|yl| ≤ xl·tan δ`, the same sides used to
    /// calibrate the plane offsets.
    #[inline]
    pub fn is_inside(&self, local_xy: [f64; 2]) -> bool {
        let [xl, yl] = local_xy;
        xl >= self.r_min && xl <= self.r_max && yl.abs() <= xl * self.tan_half_width
    }

    /// The four corners of the wedge in local coordinates:
    /// `(rMin, ±rMin·tan δ)` and `(rMax, ±rMax·tan δ)`.
    pub fn corners(&self) -> [[f64; 2]; 4] {
        let t = self.tan_half_width;
        [
            [self.r_min, self.r_min * t],
            [self.r_min, -self.r_min * t],
            [self.r_max, self.r_max * t],
            [self.r_max, -self.r_max * t],
        ]
    }
}

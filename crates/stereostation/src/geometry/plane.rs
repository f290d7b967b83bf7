//! One-dimensional projective sensor (a set of parallel strips or wires).

use super::frame::SectorFrame;

/// A plane of parallel strips/wires measuring the projection of a
/// sector-local point onto the axis at angle θ.
///
/// Channels are continuous (unrounded) and expressed in pitch units. The
/// offset is calibrated so that the smallest channel over the four wedge
/// corners is exactly zero.
#[derive(Debug, Clone)]
pub struct MeasurementPlane {
    angle: f64,
    pitch: f64,
    offset: f64,
    cos: f64,
    sin: f64,
}

impl MeasurementPlane {
    /// Create a plane with measurement angle `angle` and channel width
    /// `pitch`, calibrated against the corners of `frame`.
    pub fn new(angle: f64, pitch: f64, frame: &SectorFrame) -> Self {
        let mut plane = Self {
            angle,
            pitch,
            offset: 0.0,
            cos: angle.cos(),
            sin: angle.sin(),
        };
        plane.offset = frame
            .corners()
            .iter()
            .map(|&c| plane.channel(c))
            .fold(f64::INFINITY, f64::min);
        plane
    }

    /// Measurement angle θ in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Channel calibration constant.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Channel value of a sector-local point: `(x cos θ + y sin θ)/pitch − offset`.
    #[inline]
    pub fn channel(&self, local_xy: [f64; 2]) -> f64 {
        (local_xy[0] * self.cos + local_xy[1] * self.sin) / self.pitch - self.offset
    }

    /// Signed distance of the line of constant `channel` from the frame
    /// origin, measured along the plane's measurement axis.
    #[inline]
    pub fn projection_of_channel(&self, channel: f64) -> f64 {
        (channel + self.offset) * self.pitch
    }

    /// Point on the line of constant `channel`, parametrized by `t` along the
    /// direction `(−sin θ, cos θ)`.
    #[inline]
    pub fn point_on_line(&self, channel: f64, t: f64) -> [f64; 2] {
        let h = self.projection_of_channel(channel);
        [h * self.cos - t * self.sin, h * self.sin + t * self.cos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn frame() -> SectorFrame {
        SectorFrame::new(0.0, PI / 12.0, 10.0, 40.0)
    }

    #[test]
    fn offset_zeroes_minimum_corner_channel() {
        let f = frame();
        for angle in [-1.3, -0.25, 0.0, 0.25, PI / 2.0, 2.8] {
            let plane = MeasurementPlane::new(angle, 0.15, &f);
            let min = f
                .corners()
                .iter()
                .map(|&c| plane.channel(c))
                .fold(f64::INFINITY, f64::min);
            assert_abs_diff_eq!(min, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn point_on_line_reproduces_channel() {
        let plane = MeasurementPlane::new(0.3, 0.2, &frame());
        let ch = 42.5;
        for t in [-10.0, -1.0, 0.0, 3.5, 20.0] {
            let p = plane.point_on_line(ch, t);
            assert_abs_diff_eq!(plane.channel(p), ch, epsilon = 1e-9);
        }
    }

    #[test]
    fn channel_scales_with_pitch() {
        let f = frame();
        let coarse = MeasurementPlane::new(0.0, 1.0, &f);
        let fine = MeasurementPlane::new(0.0, 0.5, &f);
        let p = [25.0, 1.0];
        assert_abs_diff_eq!(coarse.channel(p), 15.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fine.channel(p), 30.0, epsilon = 1e-12);
    }
}

//! Three stereo planes (U, V, W) sharing one wedge.

use serde::{Deserialize, Serialize};

use crate::config::SegmentConfig;
use crate::geometry::{MeasurementPlane, SectorFrame};

/// Which of the three planes of a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaneKind {
    U,
    V,
    W,
}

/// Ordered pair of planes `(a, b)` whose lines are intersected; the crossing
/// is parametrized along plane `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanePair {
    UV,
    UW,
    VW,
}

impl PlanePair {
    pub const ALL: [PlanePair; 3] = [PlanePair::UV, PlanePair::UW, PlanePair::VW];

    /// The two planes of the pair, parametrized plane first.
    pub fn planes(self) -> (PlaneKind, PlaneKind) {
        match self {
            Self::UV => (PlaneKind::U, PlaneKind::V),
            Self::UW => (PlaneKind::U, PlaneKind::W),
            Self::VW => (PlaneKind::V, PlaneKind::W),
        }
    }

    /// Measurement angles `(θa, θb)` of the pair for a segment with stereo
    /// angle `phi_uv` and wire angle `phi_w`.
    pub fn angles(self, phi_uv: f64, phi_w: f64) -> (f64, f64) {
        let angle = |k: PlaneKind| match k {
            PlaneKind::U => phi_uv,
            PlaneKind::V => -phi_uv,
            PlaneKind::W => phi_w,
        };
        let (a, b) = self.planes();
        (angle(a), angle(b))
    }

    fn index(self) -> usize {
        match self {
            Self::UV => 0,
            Self::UW => 1,
            Self::VW => 2,
        }
    }
}

/// Precomputed trigonometry of a plane pair: `cos(θa − θb)` and
/// `sin(θb − θa)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairTrig {
    pub cos: f64,
    pub sin: f64,
}

impl PairTrig {
    fn new(theta_a: f64, theta_b: f64) -> Self {
        Self {
            cos: (theta_a - theta_b).cos(),
            sin: (theta_b - theta_a).sin(),
        }
    }
}

/// Channel triplet measured by the three planes of a sector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Uvw {
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

/// One wedge read out by U/V strip planes and a W wire plane.
#[derive(Debug, Clone)]
pub struct StereoSector {
    frame: SectorFrame,
    plane_u: MeasurementPlane,
    plane_v: MeasurementPlane,
    plane_w: MeasurementPlane,
    pairs: [PairTrig; 3],
    sigma_r: f64,
    sigma_rphi: f64,
}

impl StereoSector {
    /// Build the wedge `(phi0 ± half_width, [r_min, r_max])` with the plane
    /// layout of `segment`.
    pub fn new(
        phi0: f64,
        half_width: f64,
        r_min: f64,
        r_max: f64,
        segment: &SegmentConfig,
    ) -> Self {
        let frame = SectorFrame::new(phi0, half_width, r_min, r_max);
        let plane_u = MeasurementPlane::new(segment.phi_uv, segment.pitch_uv, &frame);
        let plane_v = MeasurementPlane::new(-segment.phi_uv, segment.pitch_uv, &frame);
        let plane_w = MeasurementPlane::new(segment.phi_w, segment.pitch_w, &frame);
        let pairs = PlanePair::ALL.map(|pair| {
            let (a, b) = pair.angles(segment.phi_uv, segment.phi_w);
            PairTrig::new(a, b)
        });
        Self {
            frame,
            plane_u,
            plane_v,
            plane_w,
            pairs,
            sigma_r: segment.sigma_r,
            sigma_rphi: segment.sigma_rphi,
        }
    }

    pub fn frame(&self) -> &SectorFrame {
        &self.frame
    }

    pub fn plane(&self, kind: PlaneKind) -> &MeasurementPlane {
        match kind {
            PlaneKind::U => &self.plane_u,
            PlaneKind::V => &self.plane_v,
            PlaneKind::W => &self.plane_w,
        }
    }

    pub fn pair_trig(&self, pair: PlanePair) -> PairTrig {
        self.pairs[pair.index()]
    }

    /// Radial resolution σ_R.
    pub fn sigma_r(&self) -> f64 {
        self.sigma_r
    }

    /// Azimuthal resolution σ_Rφ.
    pub fn sigma_rphi(&self) -> f64 {
        self.sigma_rphi
    }

    /// Channels of a lab point on U, V and W, or `None` if the point is not
    /// inside this sector's wedge.
    pub fn project_uvw(&self, lab_xy: [f64; 2]) -> Option<Uvw> {
        let local = self.frame.rotate_to_sector(lab_xy);
        if !self.frame.is_inside(local) {
            return None;
        }
        Some(Uvw {
            u: self.plane_u.channel(local),
            v: self.plane_v.channel(local),
            w: self.plane_w.channel(local),
        })
    }

    /// Position `t` along the line of `channel_a` (plane `a` of `pair`) where
    /// it crosses the line of `channel_b` on plane `b`.
    ///
    /// Solves `t = (h_b − h_a·cos(θa−θb)) / sin(θb−θa)` with
    /// `h = (channel + offset)·pitch`. Configuration validation keeps
    /// `|sin|` away from zero.
    #[inline]
    pub fn intersect(&self, pair: PlanePair, channel_a: f64, channel_b: f64) -> f64 {
        let (a, b) = pair.planes();
        let trig = self.pair_trig(pair);
        let h_a = self.plane(a).projection_of_channel(channel_a);
        let h_b = self.plane(b).projection_of_channel(channel_b);
        (h_b - h_a * trig.cos) / trig.sin
    }

    /// Sector-local crossing point of two channel lines.
    #[inline]
    pub fn crossing(&self, pair: PlanePair, channel_a: f64, channel_b: f64) -> [f64; 2] {
        let (a, _) = pair.planes();
        let t = self.intersect(pair, channel_a, channel_b);
        self.plane(a).point_on_line(channel_a, t)
    }

    /// Resolution-weighted distance between two local estimates:
    /// `(Δx²/σR² + Δy²/σRφ²) / 2`.
    #[inline]
    pub fn match_chi2(&self, p: [f64; 2], q: [f64; 2]) -> f64 {
        let dx = p[0] - q[0];
        let dy = p[1] - q[1];
        (dx * dx / (self.sigma_r * self.sigma_r) + dy * dy / (self.sigma_rphi * self.sigma_rphi))
            / 2.0
    }
}

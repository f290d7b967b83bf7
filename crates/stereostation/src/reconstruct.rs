//! Coincidence finding: matching U, V and W channel lists into 2D points.
//!
//! For every U×W channel pair the U∩W crossing is computed; for every V hit
//! the V∩W crossing of the same W channel gives a second, independent
//! estimate. Two estimates inside the wedge whose resolution-weighted
//! distance passes [`CHI2_GATE`] form a coincidence at their midpoint.
//! Combinations of hits from different truth particles produce ghosts.

use serde::{Deserialize, Serialize};

use crate::event::{Hit, SectorHits};
use crate::sector::{PlanePair, StereoSector};

/// Upper bound on `(Δx²/σR² + Δy²/σRφ²)/2` for accepting a coincidence.
pub const CHI2_GATE: f64 = 9.0;

/// Added to the U-hit label to tag a combinatorial ghost.
pub const GHOST_LABEL_OFFSET: i32 = 100_000;

/// Whether a coincidence stems from a single truth particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoincidenceKind {
    Genuine,
    Ghost,
}

/// An accepted U/V/W coincidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coincidence {
    pub sector_id: usize,
    /// Reconstructed lab position (midpoint of the two crossings).
    pub position: [f64; 2],
    /// U∩W crossing in sector-local coordinates.
    pub local_uw: [f64; 2],
    /// V∩W crossing in sector-local coordinates.
    pub local_vw: [f64; 2],
    pub chi2: f64,
    pub label: i32,
    pub kind: CoincidenceKind,
}

/// Label of a coincidence formed by hits labelled `u`, `v` and `w`.
///
/// Agreeing labels are inherited; anything else is a ghost labelled
/// `GHOST_LABEL_OFFSET + u`.
pub fn resolve_label(u: i32, v: i32, w: i32) -> (i32, CoincidenceKind) {
    if u == v && u == w {
        (u, CoincidenceKind::Genuine)
    } else {
        (GHOST_LABEL_OFFSET + u, CoincidenceKind::Ghost)
    }
}

/// All coincidences of one sector, in U-major, then W, then V order.
pub fn find_coincidences(
    sector_id: usize,
    sector: &StereoSector,
    hits: &SectorHits,
) -> Vec<Coincidence> {
    let frame = sector.frame();
    let u_hits = hits.u.as_slice();
    let w_hits = hits.w.as_slice();

    // V∩W crossings do not depend on the U hit; compute them once per W hit.
    let vw_crossings: Vec<Vec<(&Hit, [f64; 2])>> = w_hits
        .iter()
        .map(|w| {
            hits.v
                .as_slice()
                .iter()
                .map(|v| (v, sector.crossing(PlanePair::VW, v.channel, w.channel)))
                .filter(|(_, p)| frame.is_inside(*p))
                .collect()
        })
        .collect();

    let mut out = Vec::new();
    for u in u_hits {
        for (w, vws) in w_hits.iter().zip(&vw_crossings) {
            let uw = sector.crossing(PlanePair::UW, u.channel, w.channel);
            if !frame.is_inside(uw) {
                continue;
            }
            for &(v, vw) in vws {
                let chi2 = sector.match_chi2(uw, vw);
                if chi2 > CHI2_GATE {
                    continue;
                }
                let mid = [0.5 * (uw[0] + vw[0]), 0.5 * (uw[1] + vw[1])];
                let (label, kind) = resolve_label(u.label, v.label, w.label);
                out.push(Coincidence {
                    sector_id,
                    position: frame.sector_to_lab(mid),
                    local_uw: uw,
                    local_vw: vw,
                    chi2,
                    label,
                    kind,
                });
            }
        }
    }
    out
}

/// Per-sector coincidences for every sector, merged in sector order.
pub(crate) fn find_all(sectors: &[StereoSector], hits: &[SectorHits]) -> Vec<Vec<Coincidence>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        sectors
            .par_iter()
            .zip(hits.par_iter())
            .enumerate()
            .map(|(id, (sector, sector_hits))| scan_sector(id, sector, sector_hits))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        sectors
            .iter()
            .zip(hits.iter())
            .enumerate()
            .map(|(id, (sector, sector_hits))| scan_sector(id, sector, sector_hits))
            .collect()
    }
}

fn scan_sector(id: usize, sector: &StereoSector, hits: &SectorHits) -> Vec<Coincidence> {
    if hits.u.is_empty() || hits.v.is_empty() || hits.w.is_empty() {
        return Vec::new();
    }
    find_coincidences(id, sector, hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmentConfig;
    use crate::sector::Uvw;
    use approx::assert_abs_diff_eq;

    fn sector() -> StereoSector {
        let seg = SegmentConfig {
            phi_uv: 0.2618,
            pitch_uv: 0.1,
            phi_w: std::f64::consts::FRAC_PI_2,
            pitch_w: 0.2,
            sigma_r: 0.05,
            sigma_rphi: 0.01,
        };
        StereoSector::new(0.0, 0.26, 10.0, 30.0, &seg)
    }

    fn hits_of(sector: &StereoSector, points: &[([f64; 2], i32)]) -> SectorHits {
        let mut hits = SectorHits::default();
        for &(p, label) in points {
            let uvw: Uvw = sector.project_uvw(p).expect("inside");
            hits.push(uvw, label);
        }
        hits
    }

    #[test]
    fn resolve_label_genuine_and_ghost() {
        assert_eq!(resolve_label(4, 4, 4), (4, CoincidenceKind::Genuine));
        assert_eq!(resolve_label(-1, -1, -1), (-1, CoincidenceKind::Genuine));
        assert_eq!(resolve_label(4, 5, 4), (100_004, CoincidenceKind::Ghost));
        assert_eq!(resolve_label(4, 4, 5), (100_004, CoincidenceKind::Ghost));
        assert_eq!(resolve_label(-1, 3, 3), (99_999, CoincidenceKind::Ghost));
    }

    #[test]
    fn single_point_gives_one_genuine_coincidence() {
        let s = sector();
        let p = [20.0, 1.5];
        let found = find_coincidences(3, &s, &hits_of(&s, &[(p, 7)]));
        assert_eq!(found.len(), 1);
        let c = found[0];
        assert_eq!(c.label, 7);
        assert_eq!(c.kind, CoincidenceKind::Genuine);
        assert_eq!(c.sector_id, 3);
        assert_abs_diff_eq!(c.position[0], p[0], epsilon = 1e-9);
        assert_abs_diff_eq!(c.position[1], p[1], epsilon = 1e-9);
        assert!(c.chi2 < 1e-12);
    }

    #[test]
    fn well_separated_points_produce_no_ghosts() {
        let s = sector();
        let hits = hits_of(&s, &[([15.0, -2.0], 1), ([25.0, 3.0], 2)]);
        let found = find_coincidences(0, &s, &hits);
        let mut labels: Vec<i32> = found.iter().map(|c| c.label).collect();
        labels.sort();
        assert_eq!(labels, vec![1, 2]);
    }

    #[test]
    fn mixed_labels_on_one_point_make_a_ghost() {
        let s = sector();
        let uvw = s.project_uvw([18.0, 0.5]).expect("inside");
        let mut hits = SectorHits::default();
        hits.u.push(uvw.u, 11);
        hits.v.push(uvw.v, 12);
        hits.w.push(uvw.w, 12);
        let found = find_coincidences(0, &s, &hits);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].label, GHOST_LABEL_OFFSET + 11);
        assert_eq!(found[0].kind, CoincidenceKind::Ghost);
    }

    #[test]
    fn estimates_outside_the_gate_are_rejected() {
        let s = sector();
        let uvw = s.project_uvw([20.0, 0.0]).expect("inside");
        let mut hits = SectorHits::default();
        hits.u.push(uvw.u, 1);
        hits.w.push(uvw.w, 1);
        // Shift V by 10 channels (1 length unit): V∩W moves far beyond 3σ.
        hits.v.push(uvw.v + 10.0, 1);
        assert!(find_coincidences(0, &s, &hits).is_empty());
    }

    #[test]
    fn all_sector_pass_matches_per_sector_calls() {
        let sectors: Vec<StereoSector> = (0..6)
            .map(|i| {
                let mut seg = SegmentConfig {
                    phi_uv: 0.2618,
                    pitch_uv: 0.1,
                    phi_w: std::f64::consts::FRAC_PI_2,
                    pitch_w: 0.2,
                    sigma_r: 0.05,
                    sigma_rphi: 0.01,
                };
                seg.pitch_uv += 0.01 * i as f64;
                StereoSector::new(0.0, 0.26, 10.0, 30.0, &seg)
            })
            .collect();
        let hits: Vec<SectorHits> = sectors
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if i == 2 {
                    return SectorHits::default();
                }
                let y = i as f64 - 2.5;
                hits_of(s, &[([12.0 + i as f64, y], i as i32), ([26.0, 0.3 * y], 10 + i as i32)])
            })
            .collect();

        let all = find_all(&sectors, &hits);
        assert_eq!(all.len(), sectors.len());
        assert!(all[2].is_empty());
        for (id, found) in all.iter().enumerate() {
            assert_eq!(found, &find_coincidences(id, &sectors[id], &hits[id]));
        }
    }

    #[test]
    fn empty_plane_short_circuits() {
        let s = sector();
        let mut hits = hits_of(&s, &[([20.0, 0.0], 1)]);
        hits.v.clear();
        assert!(scan_sector(0, &s, &hits).is_empty());
    }
}

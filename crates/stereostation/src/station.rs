//! The detection station: sector grid, digitization and reconstruction.
//!
//! [`DetectionStation`] is the primary entry point. Build it once from a
//! [`StationConfig`], then per event call [`digitize`](DetectionStation::digitize)
//! for every truth hit and finish with
//! [`reconstruct`](DetectionStation::reconstruct), which reports coincidences
//! to the injected [`TruthSink`] and empties the event buffer.

use std::f64::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, StationConfig};
use crate::event::{EventBuffer, SectorHits, SignalRecord, SIGNAL_LABEL};
use crate::random::GaussianSource;
use crate::reconstruct::{self, CoincidenceKind, GHOST_LABEL_OFFSET};
use crate::sector::{PlaneKind, StereoSector};
use crate::truth::{ClusterCollector, TruthSink};

/// Counters of one reconstruction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructionStats {
    /// Channel triplets scanned, including the injected signal.
    pub n_hits: usize,
    /// Accepted coincidences (genuine + ghost).
    pub n_coincidences: usize,
    pub n_genuine: usize,
    pub n_ghosts: usize,
    /// Coincidences carrying the signal label.
    pub n_signal: usize,
}

/// Station of `n_sectors × n_rad_segments` stereo sectors.
///
/// Sector ids are `angular_index * n_rad_segments + radial_index`.
pub struct DetectionStation<S = ClusterCollector> {
    config: StationConfig,
    d_phi: f64,
    n_rad_segments: usize,
    sectors: Vec<StereoSector>,
    event: EventBuffer,
    sink: S,
}

impl DetectionStation {
    /// Build a station reporting to an in-memory [`ClusterCollector`].
    pub fn new(config: StationConfig) -> Result<Self, ConfigError> {
        Self::with_sink(config, ClusterCollector::new())
    }
}

impl<S: TruthSink> DetectionStation<S> {
    /// Build the sector grid from a validated configuration.
    pub fn with_sink(config: StationConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let n_rad_segments = config.n_rad_segments();
        let d_phi = TAU / config.n_sectors as f64;
        let mut sectors = Vec::with_capacity(config.n_sectors * n_rad_segments);
        for ip in 0..config.n_sectors {
            let phi0 = (ip as f64 + 0.5) * d_phi;
            for ir in 0..n_rad_segments {
                sectors.push(StereoSector::new(
                    phi0,
                    0.5 * d_phi,
                    config.radii[ir],
                    config.radii[ir + 1],
                    &config.segment(ir),
                ));
            }
        }
        tracing::debug!(
            n_sectors = config.n_sectors,
            n_rad_segments,
            z = config.z,
            "stereo station built"
        );
        Ok(Self {
            event: EventBuffer::new(sectors.len()),
            config,
            d_phi,
            n_rad_segments,
            sectors,
            sink,
        })
    }

    /// Build from per-segment arrays (one entry per radial segment).
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        n_sectors: usize,
        radii: &[f64],
        phi_uv: &[f64],
        pitch_uv: &[f64],
        phi_w: &[f64],
        pitch_w: &[f64],
        sigma_r: &[f64],
        sigma_rphi: &[f64],
        sink: S,
    ) -> Result<Self, ConfigError> {
        let config = StationConfig {
            n_sectors,
            radii: radii.to_vec(),
            phi_uv: phi_uv.to_vec(),
            pitch_uv: pitch_uv.to_vec(),
            phi_w: phi_w.to_vec(),
            pitch_w: pitch_w.to_vec(),
            sigma_r: sigma_r.to_vec(),
            sigma_rphi: sigma_rphi.to_vec(),
            ..StationConfig::default()
        };
        Self::with_sink(config, sink)
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn n_sectors(&self) -> usize {
        self.config.n_sectors
    }

    pub fn n_rad_segments(&self) -> usize {
        self.n_rad_segments
    }

    /// Angular width of one wedge.
    pub fn d_phi(&self) -> f64 {
        self.d_phi
    }

    pub fn radii(&self) -> &[f64] {
        &self.config.radii
    }

    pub fn z(&self) -> f64 {
        self.config.z
    }

    pub fn sector(&self, id: usize) -> Option<&StereoSector> {
        self.sectors.get(id)
    }

    pub fn sectors(&self) -> &[StereoSector] {
        &self.sectors
    }

    /// Hits accumulated in sector `id` during the current event.
    pub fn hits(&self, id: usize) -> Option<&SectorHits> {
        self.event.sectors.get(id)
    }

    /// Signal record of the current event, if any.
    pub fn signal(&self) -> Option<&SignalRecord> {
        self.event.signal.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Empty every sector's hit lists and drop the signal record.
    pub fn clear_all(&mut self) {
        self.event.clear();
    }

    /// Id of the sector containing a lab point, or `None` below the inner or
    /// beyond the outer radius.
    pub fn locate_sector(&self, lab_xy: [f64; 2]) -> Option<usize> {
        let mut phi = lab_xy[1].atan2(lab_xy[0]);
        if phi < 0.0 {
            phi += TAU;
        }
        let angular = ((phi / self.d_phi) as usize).min(self.config.n_sectors - 1);
        let first = angular * self.n_rad_segments;
        let frame = self.sectors[first].frame();
        // Local x runs along the bisector of the wedge.
        let xl = frame.rotate_to_sector(lab_xy)[0];
        if xl < frame.r_min() {
            return None;
        }
        (first..first + self.n_rad_segments).find(|&id| xl < self.sectors[id].frame().r_max())
    }

    /// Record a truth hit as smeared U/V/W channels.
    ///
    /// Background hits go into the sector's hit lists and are reported to
    /// the sink as background truth; a signal hit replaces the event's
    /// signal record and updates the sink's signal. Returns `false` if the
    /// hit was not recorded (outside acceptance before or after smearing, or
    /// a label outside `[0, GHOST_LABEL_OFFSET)`).
    ///
    /// A point lying exactly on a wedge boundary azimuth `k·dPhi` is located
    /// in wedge `k`; rounding in the rotation can leave it a hair outside
    /// that wedge's straight side, in which case the projection fails and the
    /// hit is dropped even without smearing.
    pub fn digitize<G: GaussianSource + ?Sized>(
        &mut self,
        position: [f64; 3],
        label: i32,
        is_background: bool,
        rng: &mut G,
    ) -> bool {
        if !is_background {
            self.sink.mark_signal(true);
            self.event.signal = None;
        }
        if !(0..GHOST_LABEL_OFFSET).contains(&label) {
            tracing::warn!(label, "truth label outside [0, {}), hit dropped", GHOST_LABEL_OFFSET);
            return false;
        }

        let [x, y, z] = position;
        let Some(mut sector_id) = self.locate_sector([x, y]) else {
            tracing::trace!(x, y, label, "hit outside acceptance");
            return false;
        };

        let sector = &self.sectors[sector_id];
        let (rx, ry) = rng.standard_normal_pair();
        let rphi_err = rx * sector.sigma_rphi();
        let r = x.hypot(y) + ry * sector.sigma_r();
        let (sn, cs) = y.atan2(x).sin_cos();
        let smeared = [r * cs - rphi_err * sn, r * sn + rphi_err * cs];

        // Smearing may push the hit into a neighbouring sector.
        if let Some(id) = self.locate_sector(smeared) {
            sector_id = id;
        }
        let Some(uvw) = self.sectors[sector_id].project_uvw(smeared) else {
            tracing::trace!(x, y, label, sector_id, "smeared hit left the sector");
            return false;
        };

        let smeared_xyz = [smeared[0], smeared[1], z];
        if is_background {
            self.event.sectors[sector_id].push(uvw, label);
            self.sink.add_background(smeared_xyz, label);
        } else {
            self.event.signal = Some(SignalRecord { uvw, sector_id });
            self.sink.mark_signal(false);
            self.sink.set_signal(smeared_xyz, label);
        }
        true
    }

    /// Find coincidences in every sector and report them to the sink.
    ///
    /// Resets the sink's background, injects the signal hit (label
    /// [`SIGNAL_LABEL`]) into its sector, scans all sectors, then sorts the
    /// sink's background and ends the event: all hit lists and the signal
    /// record are cleared.
    pub fn reconstruct(&mut self) -> ReconstructionStats {
        self.sink.reset_background();
        self.event.inject_signal();

        let mut stats = ReconstructionStats {
            n_hits: self.event.n_hits(),
            ..Default::default()
        };
        let per_sector = reconstruct::find_all(&self.sectors, &self.event.sectors);
        for c in per_sector.iter().flatten() {
            tracing::debug!(
                sector = c.sector_id,
                x = c.position[0],
                y = c.position[1],
                chi2 = c.chi2,
                label = c.label,
                "coincidence"
            );
            stats.n_coincidences += 1;
            match c.kind {
                CoincidenceKind::Genuine => stats.n_genuine += 1,
                CoincidenceKind::Ghost => stats.n_ghosts += 1,
            }
            if c.label == SIGNAL_LABEL {
                stats.n_signal += 1;
                self.sink.move_signal(c.position);
            } else {
                self.sink
                    .add_background([c.position[0], c.position[1], self.config.z], c.label);
            }
        }

        self.event.clear();
        self.sink.sort_background();
        tracing::debug!(
            n_hits = stats.n_hits,
            n_genuine = stats.n_genuine,
            n_ghosts = stats.n_ghosts,
            n_signal = stats.n_signal,
            "reconstruction complete"
        );
        stats
    }
}

impl<S> fmt::Display for DetectionStation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "3x1D stereo station at z={:.2}: {} sectors x {} radial segments, dPhi={:.4}",
            self.config.z, self.config.n_sectors, self.n_rad_segments, self.d_phi
        )?;
        for (ir, sector) in self.sectors.iter().take(self.n_rad_segments).enumerate() {
            let u = sector.plane(PlaneKind::U);
            let w = sector.plane(PlaneKind::W);
            writeln!(
                f,
                "  {:.1} < R < {:.1}: UV strips angle {:.4} pitch {:.3}, W wires angle {:.4} pitch {:.3}, sigmaR {:.3}, sigmaRPhi {:.3}",
                self.config.radii[ir],
                self.config.radii[ir + 1],
                u.angle(),
                u.pitch(),
                w.angle(),
                w.pitch(),
                sector.sigma_r(),
                sector.sigma_rphi(),
            )?;
        }
        Ok(())
    }
}

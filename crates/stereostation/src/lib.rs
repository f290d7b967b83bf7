//! stereostation: digitization and reconstruction for 3×1D stereo stations.
//!
//! A station is an annulus of `n_sectors` wedges, each split into radial
//! segments. Every segment carries three strip/wire planes (U, V at ±φUV,
//! W at φW) measuring one coordinate each. The processing stages are:
//!
//! 1. **Geometry** – sector frames and measurement planes with calibrated
//!    channel offsets.
//! 2. **Digitize** – Gaussian smearing of truth hits in polar coordinates
//!    and projection onto U/V/W channels.
//! 3. **Reconstruct** – U∩W and V∩W crossings matched under a χ² gate,
//!    producing genuine and ghost coincidences.
//!
//! # Public API
//! - [`DetectionStation`] as the primary entry point
//! - [`StationConfig`] for layout and resolution
//! - [`TruthSink`] and [`GaussianSource`] capabilities injected by the caller
//!
//! The per-sector reconstruction pass runs on rayon when the `parallel`
//! feature is enabled; results are identical either way.

mod config;
mod event;
mod geometry;
mod random;
mod reconstruct;
mod sector;
mod station;
#[cfg(test)]
pub(crate) mod test_utils;
mod truth;

pub use config::{ConfigError, SegmentConfig, StationConfig, CONFIG_SCHEMA_V1, MIN_SECTORS};
pub use event::{Hit, PlaneHits, SectorHits, SignalRecord, SIGNAL_LABEL};
pub use geometry::{MeasurementPlane, SectorFrame};
pub use random::{NormalSampler, FixedSequence, GaussianSource};
pub use reconstruct::{
    find_coincidences, resolve_label, Coincidence, CoincidenceKind, CHI2_GATE, GHOST_LABEL_OFFSET,
};
pub use sector::{PairTrig, PlaneKind, PlanePair, StereoSector, Uvw};
pub use station::{DetectionStation, ReconstructionStats};
pub use truth::{ClusterCollector, TruthCluster, TruthSink};

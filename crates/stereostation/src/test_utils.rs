//! Shared helpers for station-level unit tests.

use crate::config::StationConfig;
use crate::station::DetectionStation;
use crate::truth::TruthSink;

/// Station built from the default configuration (12 × 2 sectors).
pub(crate) fn default_station() -> DetectionStation {
    DetectionStation::new(StationConfig::default()).expect("default config is valid")
}

/// Lab point inside sector `id`.
///
/// `frac_r` in `[0, 1]` runs from the inner to the outer radius along the
/// bisector; `frac_phi` in `[-1, 1]` scales the transverse offset up to the
/// wedge edge at that radius.
pub(crate) fn point_in_sector<S: TruthSink>(
    station: &DetectionStation<S>,
    id: usize,
    frac_r: f64,
    frac_phi: f64,
) -> [f64; 2] {
    let frame = station.sectors()[id].frame();
    let xl = frame.r_min() + frac_r * (frame.r_max() - frame.r_min());
    let yl = frac_phi * xl * frame.half_width().tan();
    frame.sector_to_lab([xl, yl])
}

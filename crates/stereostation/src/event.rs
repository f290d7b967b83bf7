//! Event-scoped hit storage.
//!
//! Hits accumulate between the start of an event and the end of
//! [`DetectionStation::reconstruct`](crate::DetectionStation::reconstruct),
//! which drains the buffer. The sector geometry never holds hits.

use serde::{Deserialize, Serialize};

use crate::sector::{PlaneKind, Uvw};

/// Label of the signal hit while it is injected into the common hit pool.
pub const SIGNAL_LABEL: i32 = -1;

/// One channel measurement on one plane, tagged with its truth label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub channel: f64,
    pub label: i32,
}

/// Ordered hit list of a single plane.
#[derive(Debug, Clone, Default)]
pub struct PlaneHits {
    hits: Vec<Hit>,
}

impl PlaneHits {
    pub fn push(&mut self, channel: f64, label: i32) {
        self.hits.push(Hit { channel, label });
    }

    pub fn as_slice(&self) -> &[Hit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn clear(&mut self) {
        self.hits.clear();
    }
}

/// Hit lists of the three planes of one sector.
#[derive(Debug, Clone, Default)]
pub struct SectorHits {
    pub u: PlaneHits,
    pub v: PlaneHits,
    pub w: PlaneHits,
}

impl SectorHits {
    /// Append one channel triplet with a common label.
    pub fn push(&mut self, uvw: Uvw, label: i32) {
        self.u.push(uvw.u, label);
        self.v.push(uvw.v, label);
        self.w.push(uvw.w, label);
    }

    pub fn plane(&self, kind: PlaneKind) -> &PlaneHits {
        match kind {
            PlaneKind::U => &self.u,
            PlaneKind::V => &self.v,
            PlaneKind::W => &self.w,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.u.is_empty() && self.v.is_empty() && self.w.is_empty()
    }

    pub fn clear(&mut self) {
        self.u.clear();
        self.v.clear();
        self.w.clear();
    }
}

/// Digitized signal hit, kept apart from the background lists until
/// reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub uvw: Uvw,
    pub sector_id: usize,
}

/// All hits of the current event, one [`SectorHits`] per sector.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventBuffer {
    pub(crate) sectors: Vec<SectorHits>,
    pub(crate) signal: Option<SignalRecord>,
}

impl EventBuffer {
    pub(crate) fn new(n_sectors: usize) -> Self {
        Self {
            sectors: vec![SectorHits::default(); n_sectors],
            signal: None,
        }
    }

    /// Copy the signal record into its sector's lists under [`SIGNAL_LABEL`].
    pub(crate) fn inject_signal(&mut self) {
        if let Some(signal) = self.signal {
            self.sectors[signal.sector_id].push(signal.uvw, SIGNAL_LABEL);
        }
    }

    /// Empty every hit list and drop the signal record.
    pub(crate) fn clear(&mut self) {
        for s in &mut self.sectors {
            s.clear();
        }
        self.signal = None;
    }

    pub(crate) fn n_hits(&self) -> usize {
        self.sectors.iter().map(|s| s.u.len()).sum()
    }
}

//! Monte-Carlo truth sink.
//!
//! The station reports truth-level and reconstructed clusters through the
//! [`TruthSink`] capability. [`ClusterCollector`] is a plain in-memory
//! implementation used by the CLI and the tests.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Receiver of truth bookkeeping from a [`DetectionStation`](crate::DetectionStation).
pub trait TruthSink {
    /// Mark the current signal truth hit as killed (`true`) or real (`false`).
    fn mark_signal(&mut self, killed: bool);
    /// Set position and label of the signal truth hit.
    fn set_signal(&mut self, position: [f64; 3], label: i32);
    /// Move the signal truth hit to a reconstructed transverse position.
    fn move_signal(&mut self, xy: [f64; 2]);
    /// Register a background cluster.
    fn add_background(&mut self, position: [f64; 3], label: i32);
    /// Sort the accumulated background clusters.
    fn sort_background(&mut self);
    /// Drop all background clusters.
    fn reset_background(&mut self);
}

/// A labelled cluster position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruthCluster {
    pub position: [f64; 3],
    pub label: i32,
}

impl TruthCluster {
    /// Total order by label, then x, y, z.
    fn cmp_key(&self, other: &Self) -> Ordering {
        self.label
            .cmp(&other.label)
            .then_with(|| self.position[0].total_cmp(&other.position[0]))
            .then_with(|| self.position[1].total_cmp(&other.position[1]))
            .then_with(|| self.position[2].total_cmp(&other.position[2]))
    }
}

/// In-memory truth sink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterCollector {
    /// Signal truth hit, if one was set.
    pub signal: Option<TruthCluster>,
    /// Whether the signal truth hit is currently killed.
    pub signal_killed: bool,
    /// Background clusters in registration (or, after sorting, label) order.
    pub background: Vec<TruthCluster>,
}

impl ClusterCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything, including the signal.
    pub fn clear(&mut self) {
        self.signal = None;
        self.signal_killed = false;
        self.background.clear();
    }
}

impl TruthSink for ClusterCollector {
    fn mark_signal(&mut self, killed: bool) {
        self.signal_killed = killed;
    }

    fn set_signal(&mut self, position: [f64; 3], label: i32) {
        self.signal = Some(TruthCluster { position, label });
    }

    fn move_signal(&mut self, xy: [f64; 2]) {
        if let Some(signal) = self.signal.as_mut() {
            signal.position[0] = xy[0];
            signal.position[1] = xy[1];
        }
    }

    fn add_background(&mut self, position: [f64; 3], label: i32) {
        self.background.push(TruthCluster { position, label });
    }

    fn sort_background(&mut self) {
        self.background.sort_by(TruthCluster::cmp_key);
    }

    fn reset_background(&mut self) {
        self.background.clear();
    }
}

impl<T: TruthSink + ?Sized> TruthSink for &mut T {
    fn mark_signal(&mut self, killed: bool) {
        (**self).mark_signal(killed)
    }

    fn set_signal(&mut self, position: [f64; 3], label: i32) {
        (**self).set_signal(position, label)
    }

    fn move_signal(&mut self, xy: [f64; 2]) {
        (**self).move_signal(xy)
    }

    fn add_background(&mut self, position: [f64; 3], label: i32) {
        (**self).add_background(position, label)
    }

    fn sort_background(&mut self) {
        (**self).sort_background()
    }

    fn reset_background(&mut self) {
        (**self).reset_background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_orders_by_label_then_position() {
        let mut c = ClusterCollector::new();
        c.add_background([2.0, 0.0, 0.0], 5);
        c.add_background([1.0, 0.0, 0.0], 100_003);
        c.add_background([1.0, 0.0, 0.0], 5);
        c.add_background([0.0, 9.0, 0.0], 2);
        c.sort_background();
        let order: Vec<(i32, f64)> = c
            .background
            .iter()
            .map(|b| (b.label, b.position[0]))
            .collect();
        assert_eq!(order, vec![(2, 0.0), (5, 1.0), (5, 2.0), (100_003, 1.0)]);
    }

    #[test]
    fn move_signal_keeps_label_and_z() {
        let mut c = ClusterCollector::new();
        c.move_signal([1.0, 1.0]);
        assert!(c.signal.is_none());
        c.set_signal([3.0, 4.0, 50.0], 7);
        c.move_signal([3.1, 3.9]);
        assert_eq!(
            c.signal,
            Some(TruthCluster {
                position: [3.1, 3.9, 50.0],
                label: 7
            })
        );
    }

    #[test]
    fn reset_keeps_signal() {
        let mut c = ClusterCollector::new();
        c.set_signal([0.0, 1.0, 2.0], 1);
        c.add_background([0.0, 0.0, 0.0], 3);
        c.reset_background();
        assert!(c.background.is_empty());
        assert!(c.signal.is_some());
    }
}

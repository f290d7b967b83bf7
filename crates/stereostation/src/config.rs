//! Station configuration: sector grid, plane angles/pitches and resolutions.
//!
//! Configuration JSON follows a versioned schema (`stereostation.config.v1`).
//! Per-segment quantities are given as arrays with one entry per radial
//! segment, i.e. `radii.len() - 1` entries each.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sector::PlanePair;

pub const CONFIG_SCHEMA_V1: &str = "stereostation.config.v1";

/// Smallest number of angular sectors for which the straight wedge sides
/// (`|yl| ≤ xl·tan δ`) describe a bounded wedge.
pub const MIN_SECTORS: usize = 3;

// ── Error type ─────────────────────────────────────────────────────────────

/// Reasons a [`StationConfig`] is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Fewer angular sectors than [`MIN_SECTORS`].
    TooFewSectors { got: usize },
    /// Fewer than two radial boundaries.
    TooFewRadii { got: usize },
    /// The innermost radius is negative.
    NegativeInnerRadius { r_min: f64 },
    /// `radii[index] <= radii[index - 1]`.
    RadiiNotAscending { index: usize },
    /// A per-segment array does not have one entry per radial segment.
    SegmentArrayLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    /// A value is NaN or infinite.
    NonFinite { field: &'static str, index: usize },
    /// A pitch or resolution is zero or negative.
    NonPositive {
        field: &'static str,
        index: usize,
        value: f64,
    },
    /// Two planes of a segment are (nearly) parallel, making their line
    /// intersection ill-conditioned.
    DegenerateStereo {
        segment: usize,
        pair: PlanePair,
        sin: f64,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewSectors { got } => {
                write!(f, "need at least {} sectors, got {}", MIN_SECTORS, got)
            }
            Self::TooFewRadii { got } => {
                write!(f, "need at least 2 radial boundaries, got {}", got)
            }
            Self::NegativeInnerRadius { r_min } => {
                write!(f, "inner radius must be >= 0, got {}", r_min)
            }
            Self::RadiiNotAscending { index } => {
                write!(f, "radii must be strictly ascending (violated at index {})", index)
            }
            Self::SegmentArrayLength {
                field,
                expected,
                got,
            } => write!(
                f,
                "'{}' must have one entry per radial segment: expected {}, got {}",
                field, expected, got
            ),
            Self::NonFinite { field, index } => {
                write!(f, "'{}'[{}] is not finite", field, index)
            }
            Self::NonPositive {
                field,
                index,
                value,
            } => write!(f, "'{}'[{}] must be > 0, got {}", field, index, value),
            Self::DegenerateStereo { segment, pair, sin } => write!(
                f,
                "segment {}: {:?} planes are nearly parallel (|sin| = {:.3e})",
                segment,
                pair,
                sin.abs()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ── Types ──────────────────────────────────────────────────────────────────

/// Plane layout and resolutions of one radial segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Stereo angle of the U strips (V uses `-phi_uv`), radians.
    pub phi_uv: f64,
    /// U/V strip pitch.
    pub pitch_uv: f64,
    /// Measurement angle of the W wires, radians.
    pub phi_w: f64,
    /// W wire pitch.
    pub pitch_w: f64,
    /// Radial resolution σ_R.
    pub sigma_r: f64,
    /// Azimuthal resolution σ_Rφ.
    pub sigma_rphi: f64,
}

/// Full station configuration, consumed once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Longitudinal position of the station; reconstructed clusters are
    /// registered at this z.
    pub z: f64,
    /// Number of angular wedges.
    pub n_sectors: usize,
    /// Ascending radial boundaries (`n_rad_segments + 1` entries).
    pub radii: Vec<f64>,
    pub phi_uv: Vec<f64>,
    pub pitch_uv: Vec<f64>,
    pub phi_w: Vec<f64>,
    pub pitch_w: Vec<f64>,
    pub sigma_r: Vec<f64>,
    pub sigma_rphi: Vec<f64>,
    /// Minimum accepted `|sin|` of the angle between any two planes of a
    /// segment.
    pub min_stereo_sin: f64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            z: 0.0,
            n_sectors: 12,
            radii: vec![5.0, 20.0, 40.0],
            phi_uv: vec![0.2618, 0.2618],
            pitch_uv: vec![0.1, 0.15],
            phi_w: vec![std::f64::consts::FRAC_PI_2; 2],
            pitch_w: vec![0.2, 0.25],
            sigma_r: vec![0.05, 0.08],
            sigma_rphi: vec![0.01, 0.015],
            min_stereo_sin: 1e-3,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StationConfigFileV1 {
    schema: String,
    #[serde(flatten)]
    station: StationConfig,
}

impl StationConfig {
    /// Number of radial segments per angular wedge.
    pub fn n_rad_segments(&self) -> usize {
        self.radii.len().saturating_sub(1)
    }

    /// Plane layout of radial segment `ir`.
    ///
    /// Panics if `ir` is out of range; call [`validate`](Self::validate) first.
    pub fn segment(&self, ir: usize) -> SegmentConfig {
        SegmentConfig {
            phi_uv: self.phi_uv[ir],
            pitch_uv: self.pitch_uv[ir],
            phi_w: self.phi_w[ir],
            pitch_w: self.pitch_w[ir],
            sigma_r: self.sigma_r[ir],
            sigma_rphi: self.sigma_rphi[ir],
        }
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Parse and validate a configuration JSON document.
    pub fn from_json_str(data: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let file: StationConfigFileV1 = serde_json::from_str(data)?;
        if file.schema != CONFIG_SCHEMA_V1 {
            return Err(format!(
                "unsupported config schema '{}' (expected '{}')",
                file.schema, CONFIG_SCHEMA_V1
            )
            .into());
        }
        file.station.validate()?;
        Ok(file.station)
    }

    /// Serialize to the versioned JSON document accepted by
    /// [`from_json_str`](Self::from_json_str).
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let serde_json::Value::Object(map) = &mut value {
            map.insert(
                "schema".to_string(),
                serde_json::Value::String(CONFIG_SCHEMA_V1.to_string()),
            );
        }
        serde_json::to_string_pretty(&value)
    }

    /// Check every precondition of station construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_sectors < MIN_SECTORS {
            return Err(ConfigError::TooFewSectors {
                got: self.n_sectors,
            });
        }
        if self.radii.len() < 2 {
            return Err(ConfigError::TooFewRadii {
                got: self.radii.len(),
            });
        }
        for (i, r) in self.radii.iter().enumerate() {
            if !r.is_finite() {
                return Err(ConfigError::NonFinite {
                    field: "radii",
                    index: i,
                });
            }
        }
        if self.radii[0] < 0.0 {
            return Err(ConfigError::NegativeInnerRadius {
                r_min: self.radii[0],
            });
        }
        if let Some(i) = (1..self.radii.len()).find(|&i| self.radii[i] <= self.radii[i - 1]) {
            return Err(ConfigError::RadiiNotAscending { index: i });
        }

        let n_seg = self.n_rad_segments();
        let arrays: [(&'static str, &[f64], bool); 6] = [
            ("phi_uv", &self.phi_uv, false),
            ("pitch_uv", &self.pitch_uv, true),
            ("phi_w", &self.phi_w, false),
            ("pitch_w", &self.pitch_w, true),
            ("sigma_r", &self.sigma_r, true),
            ("sigma_rphi", &self.sigma_rphi, true),
        ];
        for (field, values, positive) in arrays {
            if values.len() != n_seg {
                return Err(ConfigError::SegmentArrayLength {
                    field,
                    expected: n_seg,
                    got: values.len(),
                });
            }
            for (index, &value) in values.iter().enumerate() {
                if !value.is_finite() {
                    return Err(ConfigError::NonFinite { field, index });
                }
                if positive && value <= 0.0 {
                    return Err(ConfigError::NonPositive {
                        field,
                        index,
                        value,
                    });
                }
            }
        }

        for ir in 0..n_seg {
            let seg = self.segment(ir);
            for pair in PlanePair::ALL {
                let (a, b) = pair.angles(seg.phi_uv, seg.phi_w);
                let sin = (b - a).sin();
                if !(sin.abs() >= self.min_stereo_sin) {
                    return Err(ConfigError::DegenerateStereo {
                        segment: ir,
                        pair,
                        sin,
                    });
                }
            }
        }
        Ok(())
    }
}

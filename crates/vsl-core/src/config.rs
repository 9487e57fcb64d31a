//! Sweep configuration.
//!
//! Typically loaded from a JSON file by the application crate (enable the
//! `serde` feature) and handed to the optimizer.  Every field has a default
//! matching the deployed system: a 15–60 km/h grid in 5 km/h steps, 3 m/s²
//! comfortable deceleration, a one-hour simulated horizon.

use crate::{CoreError, CoreResult};

// ── SpeedGrid ─────────────────────────────────────────────────────────────────

/// Inclusive arithmetic progression of candidate speed caps, in km/h.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct SpeedGrid {
    pub lower_kmh: u32,
    pub upper_kmh: u32,
    pub step_kmh:  u32,
}

impl SpeedGrid {
    /// Build a grid, rejecting empty or degenerate progressions.
    pub fn new(lower_kmh: u32, upper_kmh: u32, step_kmh: u32) -> CoreResult<Self> {
        let grid = Self { lower_kmh, upper_kmh, step_kmh };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.lower_kmh == 0 || self.step_kmh == 0 || self.upper_kmh < self.lower_kmh {
            return Err(CoreError::InvalidGrid {
                lower: self.lower_kmh,
                upper: self.upper_kmh,
                step:  self.step_kmh,
            });
        }
        Ok(())
    }

    /// Candidate caps in ascending order.  `upper_kmh` is included only when
    /// the step lands on it exactly.
    pub fn candidates(&self) -> Vec<u32> {
        if self.step_kmh == 0 {
            return Vec::new();
        }
        (self.lower_kmh..=self.upper_kmh)
            .step_by(self.step_kmh as usize)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.candidates().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SpeedGrid {
    fn default() -> Self {
        Self { lower_kmh: 15, upper_kmh: 60, step_kmh: 5 }
    }
}

// ── DepartureConfig ───────────────────────────────────────────────────────────

/// Parameters of the departure-state derivation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct DepartureConfig {
    /// Comfortable deceleration used for the braking-distance bound, m/s².
    pub decel_mps2: f64,
    /// Gap kept between a departure position and the end of its edge, metres.
    pub edge_epsilon_m: f64,
}

impl Default for DepartureConfig {
    fn default() -> Self {
        Self { decel_mps2: 3.0, edge_epsilon_m: 0.1 }
    }
}

// ── MatchConfig ───────────────────────────────────────────────────────────────

/// Map-matching search parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct MatchConfig {
    /// Radius of the spatial-index neighbourhood query, metres.
    pub neighbor_radius_m: f64,
    /// Scan every edge when the neighbourhood query comes back empty.
    pub fallback_scan: bool,
    /// Fixes further than this from every edge are unmatchable.  `None`
    /// accepts any distance.
    pub max_match_distance_m: Option<f64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            neighbor_radius_m:    100.0,
            fallback_scan:        true,
            max_match_distance_m: Some(1_000.0),
        }
    }
}

// ── Policies ──────────────────────────────────────────────────────────────────

/// How a route's exit edge is picked among the entry edge's successors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "snake_case"))]
pub enum ExitPolicy {
    /// Uniformly at random from the vehicle's RNG.
    #[default]
    Random,
    /// The first successor in network order.
    FirstAvailable,
}

/// How a candidate whose simulation run failed takes part in selection.
///
/// A failed run observes zero vehicles and therefore zero waiting time, which
/// makes it look like the best candidate.  `TreatAsZero` keeps that behaviour
/// of the deployed system; the other two keep failed candidates from winning.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "snake_case"))]
pub enum FailurePolicy {
    #[default]
    TreatAsZero,
    /// Failed candidates are never selected.
    Exclude,
    /// Failed candidates are scored with a fixed total waiting time.
    Penalize { cost_secs: f64 },
}

// ── SweepConfig ───────────────────────────────────────────────────────────────

/// Top-level optimizer configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct SweepConfig {
    pub grid: SpeedGrid,

    pub departure: DepartureConfig,

    pub matching: MatchConfig,

    /// Simulated seconds per oracle run.
    pub horizon_secs: f64,

    pub exit_policy: ExitPolicy,

    pub failure_policy: FailurePolicy,

    /// Upper bound on concurrent oracle runs.  `None` runs every candidate at
    /// once.
    pub max_workers: Option<usize>,

    /// Seed for route randomness.  `None` draws one from system entropy.
    pub seed: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            grid:           SpeedGrid::default(),
            departure:      DepartureConfig::default(),
            matching:       MatchConfig::default(),
            horizon_secs:   3_600.0,
            exit_policy:    ExitPolicy::default(),
            failure_policy: FailurePolicy::default(),
            max_workers:    None,
            seed:           None,
        }
    }
}

impl SweepConfig {
    /// Check every field.  Called by the optimizer before anything runs.
    pub fn validate(&self) -> CoreResult<()> {
        self.grid.validate()?;

        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.departure.decel_mps2) {
            return Err(CoreError::Config(format!(
                "deceleration must be positive, got {}",
                self.departure.decel_mps2
            )));
        }
        if !(self.departure.edge_epsilon_m.is_finite() && self.departure.edge_epsilon_m >= 0.0) {
            return Err(CoreError::Config(format!(
                "edge epsilon must be non-negative, got {}",
                self.departure.edge_epsilon_m
            )));
        }
        if !positive(self.matching.neighbor_radius_m) {
            return Err(CoreError::Config(format!(
                "neighbor radius must be positive, got {}",
                self.matching.neighbor_radius_m
            )));
        }
        if let Some(d) = self.matching.max_match_distance_m {
            if !positive(d) {
                return Err(CoreError::Config(format!(
                    "max match distance must be positive, got {d}"
                )));
            }
        }
        if !positive(self.horizon_secs) {
            return Err(CoreError::Config(format!(
                "horizon must be positive, got {} s",
                self.horizon_secs
            )));
        }
        if self.max_workers == Some(0) {
            return Err(CoreError::Config("max_workers must be at least 1".into()));
        }
        if let FailurePolicy::Penalize { cost_secs } = self.failure_policy {
            if !(cost_secs.is_finite() && cost_secs >= 0.0) {
                return Err(CoreError::Config(format!(
                    "failure penalty must be a finite non-negative cost, got {cost_secs}"
                )));
            }
        }
        Ok(())
    }
}

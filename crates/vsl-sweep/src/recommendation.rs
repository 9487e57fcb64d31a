//! Aggregated sweep results and candidate selection.

use serde::Serialize;

use vsl_core::FailurePolicy;
use vsl_oracle::SimulationOutcome;

/// One candidate's aggregated result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateStats {
    pub speed_kmh:    u32,
    /// Sum of all recorded waiting times, seconds.
    pub total_wait_s: f64,
    /// Vehicles that completed their trip within the horizon.
    pub arrived:      usize,
    /// Vehicles in the candidate's batch.
    pub dispatched:   usize,
    /// The oracle run failed and `total_wait_s`/`arrived` come from an empty
    /// outcome.
    pub failed:       bool,
}

impl CandidateStats {
    pub fn from_outcome(outcome: &SimulationOutcome, dispatched: usize, failed: bool) -> Self {
        Self {
            speed_kmh: outcome.cap_kmh,
            total_wait_s: outcome.total_wait(),
            arrived: outcome.arrived,
            dispatched,
            failed,
        }
    }

    /// Selection score under `policy`; `None` means "not eligible".
    pub fn score(&self, policy: FailurePolicy) -> Option<f64> {
        if !self.failed {
            return Some(self.total_wait_s);
        }
        match policy {
            FailurePolicy::TreatAsZero => Some(self.total_wait_s),
            FailurePolicy::Exclude => None,
            FailurePolicy::Penalize { cost_secs } => Some(cost_secs),
        }
    }
}

/// Pick the candidate with the lowest score.  Ties go to the lowest speed,
/// whatever order `candidates` is in.
pub fn select_best(candidates: &[CandidateStats], policy: FailurePolicy) -> Option<u32> {
    candidates
        .iter()
        .filter_map(|c| c.score(policy).map(|s| (s, c.speed_kmh)))
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, speed)| speed)
}

/// The outcome of a sweep.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    /// Recommended speed limit, km/h.
    pub speed_kmh:  u32,
    /// One entry per candidate, ascending by speed.
    pub candidates: Vec<CandidateStats>,
    /// Fixes that were matched onto the network.
    pub matched:    usize,
    /// Fixes dropped as unmatchable.
    pub dropped:    usize,
    /// Seed the routes were drawn with; re-run with it to reproduce.
    pub seed:       u64,
}

impl Recommendation {
    pub fn candidate(&self, speed_kmh: u32) -> Option<&CandidateStats> {
        self.candidates.iter().find(|c| c.speed_kmh == speed_kmh)
    }

    pub fn failed_runs(&self) -> usize {
        self.candidates.iter().filter(|c| c.failed).count()
    }

    /// The `{"recommendedSpeed": "35 km/h"}` document consumers read.
    pub fn payload(&self) -> RecommendationPayload {
        RecommendationPayload { recommended_speed: format!("{} km/h", self.speed_kmh) }
    }
}

/// Wire form of a recommendation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecommendationPayload {
    #[serde(rename = "recommendedSpeed")]
    pub recommended_speed: String,
}

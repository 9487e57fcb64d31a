//! What one oracle run observed.

/// Per-vehicle results of simulating one candidate's batch.
///
/// Only vehicles that completed their trip inside the horizon appear here;
/// a vehicle still on the network at the horizon contributes nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationOutcome {
    pub cap_kmh:         u32,
    /// Non-negative waiting time per recorded trip, seconds.
    pub waiting_times_s: Vec<f64>,
    pub arrived:         usize,
}

impl SimulationOutcome {
    /// Nothing observed: the stand-in for a failed run.
    pub fn empty(cap_kmh: u32) -> Self {
        Self { cap_kmh, ..Self::default() }
    }

    pub fn total_wait(&self) -> f64 {
        self.waiting_times_s.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.arrived == 0 && self.waiting_times_s.is_empty()
    }
}

//! The `SimulationOracle` trait: the seam between the sweep and whatever
//! actually simulates traffic.

use vsl_route::RouteBatch;

use crate::{OracleResult, RunLease, SimulationOutcome};

/// Simulates one candidate's route batch in isolation.
///
/// # Contract
///
/// - `run` is called once per candidate, possibly from several rayon workers
///   at the same time, so implementations must be `Send + Sync` and must keep
///   every per-run resource inside `lease` (its port, its route file, its
///   result file).  Two concurrent runs never share a lease.
/// - An empty batch is still a valid run.
/// - Errors are not retried.  The caller logs them and records an empty
///   outcome for the candidate.
pub trait SimulationOracle: Send + Sync {
    fn run(
        &self,
        batch:        &RouteBatch,
        lease:        &RunLease,
        horizon_secs: f64,
    ) -> OracleResult<SimulationOutcome>;
}

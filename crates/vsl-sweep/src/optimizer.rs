//! The sweep itself.
//!
//! # Phases
//!
//! ```text
//! validate config  ─ fatal on error
//! match fixes      ─ once; unmatchable fixes dropped with a warning
//! synthesize       ─ one RouteBatch per candidate, sequential
//! lease            ─ port + files for every candidate, before dispatch
//! dispatch         ─ rayon pool of min(candidates, max_workers) threads
//! barrier          ─ collect() waits for every run
//! aggregate        ─ total wait + arrivals per candidate
//! select           ─ lowest score, ties to the lowest speed
//! ```
//!
//! A failed oracle run is not retried.  It is logged, recorded as an empty
//! outcome flagged `failed`, and scored according to the [`FailurePolicy`].

use rayon::prelude::*;
use tracing::{debug, info, warn};

use vsl_core::{FailurePolicy, GeoFix, SweepConfig, VehicleRng};
use vsl_network::{MapMatcher, RoadNetwork};
use vsl_oracle::{LeaseAllocator, RunLease, SimulationOracle, SimulationOutcome};
use vsl_route::{MatchedVehicle, RouteBatch, RouteSynthesizer};

use crate::recommendation::select_best;
use crate::{CandidateStats, Recommendation, SweepError, SweepResult};

/// Fixes that survived map matching, plus how many did not.
#[derive(Clone, Debug, Default)]
pub struct MatchReport {
    pub vehicles: Vec<MatchedVehicle>,
    pub dropped:  usize,
}

/// Runs speed-limit sweeps against one network and one oracle.
///
/// # Example
///
/// ```rust,ignore
/// let network = load_net_xml(Path::new("net.net.xml"))?;
/// let oracle = SumoOracle::new(&network, SumoConfig::default());
/// let leases = LeaseAllocator::new("results", true)?;
/// let optimizer = SweepOptimizer::new(&network, oracle, leases, SweepConfig::default())?;
/// let rec = optimizer.optimize(&fixes)?;
/// println!("{} km/h", rec.speed_kmh);
/// ```
pub struct SweepOptimizer<'n, O: SimulationOracle> {
    network: &'n RoadNetwork,
    oracle:  O,
    leases:  LeaseAllocator,
    config:  SweepConfig,
}

impl<'n, O: SimulationOracle> SweepOptimizer<'n, O> {
    /// Validate `config` against `network`.  Every error here is fatal and
    /// surfaces before any run is dispatched.
    pub fn new(
        network: &'n RoadNetwork,
        oracle:  O,
        leases:  LeaseAllocator,
        config:  SweepConfig,
    ) -> SweepResult<Self> {
        config.validate()?;
        if network.is_empty() {
            return Err(SweepError::EmptyNetwork);
        }
        Ok(Self { network, oracle, leases, config })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn leases(&self) -> &LeaseAllocator {
        &self.leases
    }

    /// Snap every fix onto the network.
    pub fn match_fixes(&self, fixes: &[GeoFix]) -> MatchReport {
        let matcher = MapMatcher::new(
            self.network,
            self.config.matching,
            self.config.departure.edge_epsilon_m,
        );
        let mut report = MatchReport::default();
        for fix in fixes {
            match matcher.match_fix(fix) {
                Ok(position) => report.vehicles.push(MatchedVehicle { position, speed_kmh: fix.speed_kmh }),
                Err(miss) => {
                    warn!(vehicle = %fix.vehicle_id, lon = fix.lon, lat = fix.lat, reason = %miss, "dropping unmatchable fix");
                    report.dropped += 1;
                }
            }
        }
        report
    }

    /// One batch per candidate, ascending by cap.
    pub fn build_batches(&self, vehicles: &[MatchedVehicle], seed: u64) -> Vec<RouteBatch> {
        let synth = RouteSynthesizer::new(self.network, self.config.departure, self.config.exit_policy);
        self.config
            .grid
            .candidates()
            .into_iter()
            .map(|cap| synth.batch(vehicles, cap, seed))
            .collect()
    }

    /// Run the full sweep for `fixes`.
    pub fn optimize(&self, fixes: &[GeoFix]) -> SweepResult<Recommendation> {
        let seed = self.config.seed.unwrap_or_else(VehicleRng::entropy_seed);

        let matched = self.match_fixes(fixes);
        info!(
            fixes = fixes.len(),
            matched = matched.vehicles.len(),
            dropped = matched.dropped,
            seed,
            "fixes matched"
        );

        let batches = self.build_batches(&matched.vehicles, seed);

        // ── Reserve resources ─────────────────────────────────────────────
        let leases = batches
            .iter()
            .map(|b| self.leases.lease(b.cap_kmh))
            .collect::<Result<Vec<_>, _>>()?;

        // ── Dispatch and wait ─────────────────────────────────────────────
        let workers = self
            .config
            .max_workers
            .map_or(batches.len(), |cap| cap.min(batches.len()))
            .max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("vsl-sweep-{i}"))
            .build()
            .map_err(|e| SweepError::ThreadPool(e.to_string()))?;
        info!(candidates = batches.len(), workers, "dispatching simulation runs");

        let runs: Vec<(SimulationOutcome, bool)> = pool.install(|| {
            batches
                .par_iter()
                .zip(leases.par_iter())
                .map(|(batch, lease)| self.run_one(batch, lease))
                .collect()
        });
        drop(leases);

        // ── Aggregate and select ──────────────────────────────────────────
        let candidates: Vec<CandidateStats> = batches
            .iter()
            .zip(&runs)
            .map(|(batch, (outcome, failed))| CandidateStats::from_outcome(outcome, batch.len(), *failed))
            .collect();

        let speed_kmh = select_best(&candidates, self.config.failure_policy)
            .ok_or(SweepError::NoViableCandidate)?;

        let failed = candidates.iter().filter(|c| c.failed).count();
        if failed > 0 && self.config.failure_policy == FailurePolicy::TreatAsZero {
            warn!(failed, "failed runs score zero waiting time and may win the sweep");
        }

        Ok(Recommendation {
            speed_kmh,
            candidates,
            matched: matched.vehicles.len(),
            dropped: matched.dropped,
            seed,
        })
    }

    /// One oracle run.  Errors become an empty outcome flagged as failed.
    fn run_one(&self, batch: &RouteBatch, lease: &RunLease) -> (SimulationOutcome, bool) {
        debug!(cap_kmh = batch.cap_kmh, port = lease.port, vehicles = batch.len(), "run started");
        match self.oracle.run(batch, lease, self.config.horizon_secs) {
            Ok(mut outcome) => {
                outcome.cap_kmh = batch.cap_kmh;
                debug!(
                    cap_kmh = batch.cap_kmh,
                    arrived = outcome.arrived,
                    total_wait_s = outcome.total_wait(),
                    "run finished"
                );
                (outcome, false)
            }
            Err(e) => {
                warn!(cap_kmh = batch.cap_kmh, error = %e, "simulation run failed, treating as empty");
                (SimulationOutcome::empty(batch.cap_kmh), true)
            }
        }
    }
}

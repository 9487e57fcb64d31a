//! The SUMO-backed [`SimulationOracle`].
//!
//! One run:
//!
//! 1. write the batch to the lease's route file;
//! 2. start `sumo -c <config> --route-files <routes> --tripinfo-output <trips>
//!    --remote-port <port>` with the configured extra flags;
//! 3. connect over TraCI, advance to the horizon, close;
//! 4. wait for the process and parse its tripinfo output.
//!
//! The child process is killed if the run bails out early, so no simulator
//! outlives its lease.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tracing::{debug, warn};

use vsl_network::RoadNetwork;
use vsl_route::{write_route_file, RouteBatch, VehicleType};

use crate::traci::{is_disconnect, TraciClient};
use crate::tripinfo::read_tripinfo;
use crate::{OracleError, OracleResult, RunLease, SimulationOracle, SimulationOutcome};

// ── Configuration ─────────────────────────────────────────────────────────────

/// How to start and talk to SUMO.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "snake_case"))]
pub struct SumoConfig {
    /// Executable name or path.  Default: `"sumo"`.
    pub binary: String,

    /// Scenario configuration passed with `-c`.  Default: `"base.sumocfg"`.
    pub config_file: PathBuf,

    /// Directory for route and tripinfo files.  Default: `"results"`.
    pub work_dir: PathBuf,

    /// Keep route and tripinfo files after the sweep.  Default: `true`.
    pub keep_artifacts: bool,

    /// TraCI connection attempts while SUMO starts up.  Default: 100.
    pub connect_retries: u32,

    /// Pause between connection attempts, milliseconds.  Default: 100.
    pub connect_delay_ms: u64,

    /// Flags appended to every command line.
    /// Default: `--no-warnings --no-step-log --quit-on-end`.
    pub extra_args: Vec<String>,

    pub vtype: VehicleType,
}

impl Default for SumoConfig {
    fn default() -> Self {
        Self {
            binary:           "sumo".to_owned(),
            config_file:      PathBuf::from("base.sumocfg"),
            work_dir:         PathBuf::from("results"),
            keep_artifacts:   true,
            connect_retries:  100,
            connect_delay_ms: 100,
            extra_args:       ["--no-warnings", "--no-step-log", "--quit-on-end"]
                .map(str::to_owned)
                .to_vec(),
            vtype:            VehicleType::default(),
        }
    }
}

// ── Child process guard ───────────────────────────────────────────────────────

/// Kills the simulator on drop unless it was waited for.
struct ChildGuard(Option<Child>);

impl ChildGuard {
    fn wait(mut self) -> OracleResult<std::process::ExitStatus> {
        match self.0.take() {
            Some(mut child) => Ok(child.wait()?),
            None => Err(OracleError::Protocol("simulator already reaped".to_owned())),
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(child) = self.0.as_mut() {
            if let Err(e) = child.kill() {
                debug!(error = %e, "simulator already gone");
            }
            let _ = child.wait();
        }
    }
}

// ── SumoOracle ────────────────────────────────────────────────────────────────

/// Runs each candidate in its own SUMO process.
pub struct SumoOracle<'n> {
    network: &'n RoadNetwork,
    config:  SumoConfig,
}

impl<'n> SumoOracle<'n> {
    pub fn new(network: &'n RoadNetwork, config: SumoConfig) -> Self {
        Self { network, config }
    }

    pub fn config(&self) -> &SumoConfig {
        &self.config
    }

    fn command(&self, lease: &RunLease) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.arg("-c")
            .arg(&self.config.config_file)
            .arg("--route-files")
            .arg(&lease.route_file)
            .arg("--tripinfo-output")
            .arg(&lease.tripinfo_file)
            .arg("--remote-port")
            .arg(lease.port.to_string())
            .args(&self.config.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null());
        cmd
    }
}

impl SimulationOracle for SumoOracle<'_> {
    fn run(&self, batch: &RouteBatch, lease: &RunLease, horizon_secs: f64) -> OracleResult<SimulationOutcome> {
        write_route_file(&lease.route_file, self.network, batch, &self.config.vtype)?;

        let child = self
            .command(lease)
            .spawn()
            .map_err(|source| OracleError::Spawn { binary: self.config.binary.clone(), source })?;
        let guard = ChildGuard(Some(child));
        debug!(cap_kmh = batch.cap_kmh, port = lease.port, vehicles = batch.len(), "simulator started");

        let mut client = TraciClient::connect(
            lease.port,
            self.config.connect_retries,
            Duration::from_millis(self.config.connect_delay_ms),
        )?;

        match client.simulation_step(horizon_secs) {
            Ok(()) => match client.close() {
                Ok(()) => {}
                Err(e) if is_disconnect(&e) => {}
                Err(e) => return Err(e),
            },
            // The scenario's own end time came first; SUMO has already
            // written its output and exited.
            Err(e) if is_disconnect(&e) => {
                debug!(cap_kmh = batch.cap_kmh, "simulator closed the connection before the horizon");
            }
            Err(e) => return Err(e),
        }

        let status = guard.wait()?;
        if !status.success() {
            warn!(cap_kmh = batch.cap_kmh, %status, "simulator exited with failure");
        }

        read_tripinfo(&lease.tripinfo_file, batch.cap_kmh)
    }
}

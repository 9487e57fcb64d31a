//! Per-run resource leases.
//!
//! Every oracle run needs its own TCP port, route file, and result file.  The
//! sweep takes one [`RunLease`] per candidate from a [`LeaseAllocator`]
//! before anything is dispatched, so a resource problem surfaces before the
//! first simulator starts.  Dropping a lease gives the port back and, unless
//! artifacts are kept, deletes both files; this happens on every exit path
//! of a run, including panics unwinding through the worker.
//!
//! # Ports
//!
//! [`PortAllocator`] asks the OS for an ephemeral port by binding
//! `127.0.0.1:0`, then closes the listener so the simulator can bind it.  It
//! remembers every port it has handed out and never repeats one, which keeps
//! two concurrent runs from racing for the same port even when the OS would
//! recycle it.

use std::fs;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, TcpListener};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::{OracleError, OracleResult};

/// How many times to re-ask the OS when it offers a port already issued.
const PORT_ATTEMPTS: u32 = 64;

// ── PortAllocator ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct PortState {
    issued: FxHashSet<u16>,
    live:   FxHashSet<u16>,
}

/// Hands out distinct free TCP ports.
#[derive(Default)]
pub struct PortAllocator {
    state: Mutex<PortState>,
}

impl PortAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A free port never returned by this allocator before.
    pub fn acquire(&self) -> OracleResult<u16> {
        for _ in 0..PORT_ATTEMPTS {
            let port = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?.local_addr()?.port();
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.issued.insert(port) {
                state.live.insert(port);
                return Ok(port);
            }
        }
        Err(OracleError::PortsExhausted)
    }

    /// Mark `port` as no longer in use.  It stays retired.
    pub fn release(&self, port: u16) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.live.remove(&port);
    }

    /// Ports currently leased out.
    pub fn live(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).live.len()
    }

    /// Ports ever handed out.
    pub fn issued(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).issued.len()
    }
}

// ── RunLease ──────────────────────────────────────────────────────────────────

/// Resources owned by one oracle run.
pub struct RunLease {
    pub cap_kmh:       u32,
    pub port:          u16,
    pub route_file:    PathBuf,
    pub tripinfo_file: PathBuf,
    ports:             Arc<PortAllocator>,
    keep_artifacts:    bool,
}

impl RunLease {
    pub fn keeps_artifacts(&self) -> bool {
        self.keep_artifacts
    }
}

impl std::fmt::Debug for RunLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLease")
            .field("cap_kmh", &self.cap_kmh)
            .field("port", &self.port)
            .field("route_file", &self.route_file)
            .field("tripinfo_file", &self.tripinfo_file)
            .finish()
    }
}

impl Drop for RunLease {
    fn drop(&mut self) {
        self.ports.release(self.port);
        if !self.keep_artifacts {
            remove_if_present(&self.route_file);
            remove_if_present(&self.tripinfo_file);
        }
    }
}

fn remove_if_present(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove run artifact"),
    }
}

// ── LeaseAllocator ────────────────────────────────────────────────────────────

/// Issues [`RunLease`]s rooted in one working directory.
///
/// File names depend only on the candidate cap
/// (`routes_sim_{cap}.rou.xml`, `tripinfo_sim_{cap}.xml`), so the caps
/// leased during one sweep must be distinct.
pub struct LeaseAllocator {
    work_dir:       PathBuf,
    keep_artifacts: bool,
    ports:          Arc<PortAllocator>,
}

impl LeaseAllocator {
    /// Creates `work_dir` if it does not exist.
    pub fn new(work_dir: impl Into<PathBuf>, keep_artifacts: bool) -> OracleResult<Self> {
        let work_dir = work_dir.into();
        fs::create_dir_all(&work_dir)?;
        Ok(Self { work_dir, keep_artifacts, ports: Arc::new(PortAllocator::new()) })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn ports(&self) -> &PortAllocator {
        &self.ports
    }

    /// Lease a port and a pair of files for candidate `cap_kmh`.
    ///
    /// A result file left over from an earlier sweep is removed here, so a
    /// run that produces no output is never credited with stale trips.
    pub fn lease(&self, cap_kmh: u32) -> OracleResult<RunLease> {
        let port = self.ports.acquire()?;
        let lease = RunLease {
            cap_kmh,
            port,
            route_file: self.work_dir.join(format!("routes_sim_{cap_kmh}.rou.xml")),
            tripinfo_file: self.work_dir.join(format!("tripinfo_sim_{cap_kmh}.xml")),
            ports: Arc::clone(&self.ports),
            keep_artifacts: self.keep_artifacts,
        };
        match fs::remove_file(&lease.tripinfo_file) {
            Ok(()) => debug!(path = %lease.tripinfo_file.display(), "removed stale tripinfo"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        debug!(cap_kmh, port, "lease issued");
        Ok(lease)
    }
}

//! Per-candidate sweep report.
//!
//! CSV columns: `speed_kmh,total_wait_s,arrived,dispatched,failed`, one row
//! per candidate in ascending speed order.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;
use tracing::info;

use crate::{Recommendation, SweepResult};

const HEADER: [&str; 5] = ["speed_kmh", "total_wait_s", "arrived", "dispatched", "failed"];

/// Write the report to any sink.
pub fn write_report<W: Write>(sink: W, rec: &Recommendation) -> SweepResult<()> {
    let mut w = Writer::from_writer(sink);
    w.write_record(HEADER)?;
    for c in &rec.candidates {
        w.write_record(&[
            c.speed_kmh.to_string(),
            format!("{:.2}", c.total_wait_s),
            c.arrived.to_string(),
            c.dispatched.to_string(),
            (c.failed as u8).to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write the report into it.
pub fn write_report_csv(path: &Path, rec: &Recommendation) -> SweepResult<()> {
    write_report(File::create(path)?, rec)
}

/// Log throughput and total waiting time per candidate, then the pick.
pub fn log_summary(rec: &Recommendation) {
    info!(matched = rec.matched, dropped = rec.dropped, "vehicles simulated");
    for c in &rec.candidates {
        info!(
            speed_kmh = c.speed_kmh,
            arrived = c.arrived,
            dispatched = c.dispatched,
            total_wait_s = c.total_wait_s,
            failed = c.failed,
            "candidate result"
        );
    }
    info!(speed_kmh = rec.speed_kmh, "recommended speed");
}

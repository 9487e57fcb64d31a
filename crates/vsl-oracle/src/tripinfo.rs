//! SUMO `--tripinfo-output` parsing.
//!
//! SUMO writes one `<tripinfo>` per vehicle that finished its route.  Each
//! element counts as one arrival; its `waitingTime` attribute, when present,
//! is the vehicle's accumulated standing time in seconds.
//!
//! A run that crashed leaves a missing, empty, or truncated file.  All of
//! those are errors here, so a candidate is never credited with a partial
//! trip list.

use std::io::ErrorKind;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::{OracleError, OracleResult, SimulationOutcome};

/// Parse a complete tripinfo document.
pub fn parse_tripinfo(xml: &str, cap_kmh: u32) -> OracleResult<SimulationOutcome> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut outcome = SimulationOutcome::empty(cap_kmh);
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event().map_err(|e| OracleError::Tripinfo(e.to_string()))? {
            Event::Start(e) => {
                if e.name().as_ref() == b"tripinfo" {
                    record_trip(&e, &mut outcome)?;
                }
                saw_root = true;
                depth += 1;
            }
            Event::Empty(e) => {
                if e.name().as_ref() == b"tripinfo" {
                    record_trip(&e, &mut outcome)?;
                }
                saw_root = true;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(OracleError::Tripinfo("document has no root element".to_owned()));
    }
    if depth != 0 {
        return Err(OracleError::Tripinfo("document is truncated".to_owned()));
    }
    Ok(outcome)
}

/// Read the result file of one run.
///
/// # Errors
///
/// [`OracleError::MissingOutput`] when the simulator wrote nothing and
/// [`OracleError::Tripinfo`] when the file is empty or truncated.  The
/// sweep turns both into an empty outcome.
pub fn read_tripinfo(path: &Path, cap_kmh: u32) -> OracleResult<SimulationOutcome> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(OracleError::MissingOutput(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    let outcome = parse_tripinfo(&text, cap_kmh)?;
    debug!(cap_kmh, arrived = outcome.arrived, total_wait_s = outcome.total_wait(), "tripinfo parsed");
    Ok(outcome)
}

fn record_trip(e: &BytesStart<'_>, outcome: &mut SimulationOutcome) -> OracleResult<()> {
    outcome.arrived += 1;
    let Some(attr) = e
        .try_get_attribute("waitingTime")
        .map_err(|err| OracleError::Tripinfo(err.to_string()))?
    else {
        return Ok(());
    };
    let raw = attr
        .unescape_value()
        .map_err(|err| OracleError::Tripinfo(err.to_string()))?;
    if raw.trim().is_empty() {
        return Ok(());
    }
    let wait = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| OracleError::Tripinfo(format!("invalid waitingTime {raw:?}")))?;
    if wait.is_nan() || wait < 0.0 {
        return Err(OracleError::Tripinfo(format!("invalid waitingTime {wait}")));
    }
    outcome.waiting_times_s.push(wait);
    Ok(())
}

//! Minimal blocking TraCI client.
//!
//! Only the two commands a batch run needs are implemented: advance the
//! simulation to a target time, and close the connection (which makes SUMO
//! flush its output files and exit).
//!
//! # Wire format
//!
//! ```text
//! message  = u32 total_length (including itself) , command*
//! command  = u8 length , u8 id , payload              when length ≤ 255
//!          | u8 0 , u32 length , u8 id , payload      otherwise
//! status   = command with payload  u8 result , u32 n , n bytes description
//! ```
//!
//! All integers and doubles are big-endian.  Every response starts with a
//! status command echoing the request id; `result == 0` means success.

use std::io::{ErrorKind, Read, Write};
use std::net::{Ipv4Addr, TcpStream};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::{OracleError, OracleResult};

pub const CMD_SIMSTEP: u8 = 0x02;
pub const CMD_CLOSE: u8 = 0x7F;

const RTYPE_OK: u8 = 0x00;

/// A connection to one simulator instance.
pub struct TraciClient {
    stream: TcpStream,
}

impl TraciClient {
    /// Connect to `127.0.0.1:port`, retrying while the simulator starts up.
    pub fn connect(port: u16, attempts: u32, delay: Duration) -> OracleResult<Self> {
        for attempt in 1..=attempts.max(1) {
            match TcpStream::connect((Ipv4Addr::LOCALHOST, port)) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    debug!(port, attempt, "TraCI connected");
                    return Ok(Self { stream });
                }
                Err(e) => {
                    trace!(port, attempt, error = %e, "TraCI connect failed, retrying");
                    thread::sleep(delay);
                }
            }
        }
        Err(OracleError::Connect { port, attempts })
    }

    /// Advance the simulation until `target_secs` of simulated time.
    ///
    /// Subscription results that follow the status are read and discarded.
    pub fn simulation_step(&mut self, target_secs: f64) -> OracleResult<()> {
        self.exchange(CMD_SIMSTEP, &target_secs.to_be_bytes())?;
        Ok(())
    }

    /// Ask the simulator to shut down and wait for its acknowledgement.
    pub fn close(mut self) -> OracleResult<()> {
        self.exchange(CMD_CLOSE, &[])?;
        Ok(())
    }

    /// Send one command and check the status that comes back.  Returns the
    /// response bytes following the status command.
    fn exchange(&mut self, command: u8, payload: &[u8]) -> OracleResult<Vec<u8>> {
        let request = encode_message(command, payload);
        self.stream.write_all(&request)?;
        self.stream.flush()?;

        let mut len_buf = [0u8; 4];
        self.stream.read_exact(&mut len_buf)?;
        let total = u32::from_be_bytes(len_buf) as usize;
        if total < 4 {
            return Err(OracleError::Protocol(format!("response length {total} is too short")));
        }
        let mut body = vec![0u8; total - 4];
        self.stream.read_exact(&mut body)?;

        let rest = check_status(command, &body)?;
        trace!(command, bytes = rest.len(), "TraCI response");
        Ok(rest.to_vec())
    }
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Frame one command as a complete message.
pub fn encode_message(command: u8, payload: &[u8]) -> Vec<u8> {
    let mut cmd = Vec::with_capacity(payload.len() + 6);
    let short_len = payload.len() + 2;
    if short_len <= u8::MAX as usize {
        cmd.push(short_len as u8);
    } else {
        cmd.push(0);
        cmd.extend_from_slice(&((payload.len() + 6) as u32).to_be_bytes());
    }
    cmd.push(command);
    cmd.extend_from_slice(payload);

    let mut msg = Vec::with_capacity(cmd.len() + 4);
    msg.extend_from_slice(&((cmd.len() + 4) as u32).to_be_bytes());
    msg.extend_from_slice(&cmd);
    msg
}

/// Validate the leading status command of a response body and return the
/// bytes after it.
fn check_status(command: u8, body: &[u8]) -> OracleResult<&[u8]> {
    let truncated = || OracleError::Protocol("truncated status response".to_owned());

    let (&first, after_len) = body.split_first().ok_or_else(truncated)?;
    let (len, header) = if first == 0 {
        let bytes: [u8; 4] = after_len.get(..4).ok_or_else(truncated)?.try_into().map_err(|_| truncated())?;
        (u32::from_be_bytes(bytes) as usize, 5)
    } else {
        (first as usize, 1)
    };
    if len < header + 1 || body.len() < len {
        return Err(truncated());
    }
    let status = &body[header..len];

    let id = status[0];
    if id != command {
        return Err(OracleError::Protocol(format!(
            "status for command 0x{id:02x}, expected 0x{command:02x}"
        )));
    }
    let result = *status.get(1).ok_or_else(truncated)?;
    let description = status
        .get(6..)
        .map(|d| String::from_utf8_lossy(d).into_owned())
        .unwrap_or_default();
    if result != RTYPE_OK {
        return Err(OracleError::Command { command, message: description });
    }
    Ok(&body[len..])
}

/// True for I/O errors that mean the simulator hung up on us.
pub fn is_disconnect(err: &OracleError) -> bool {
    matches!(
        err,
        OracleError::Io(e) if matches!(
            e.kind(),
            ErrorKind::UnexpectedEof | ErrorKind::ConnectionReset | ErrorKind::BrokenPipe
        )
    )
}

//! `vsl-oracle`: running one candidate's batch through a traffic simulator.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`oracle`]   | `SimulationOracle` trait                                   |
//! | [`outcome`]  | `SimulationOutcome`                                        |
//! | [`lease`]    | `PortAllocator`, `LeaseAllocator`, `RunLease`              |
//! | [`sumo`]     | `SumoOracle`, `SumoConfig`                                 |
//! | [`traci`]    | blocking TraCI client (step, close)                        |
//! | [`tripinfo`] | `parse_tripinfo`, `read_tripinfo`                          |
//! | [`error`]    | `OracleError`, `OracleResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `SumoConfig`.           |

pub mod error;
pub mod lease;
pub mod oracle;
pub mod outcome;
pub mod sumo;
pub mod traci;
pub mod tripinfo;

#[cfg(test)]
mod tests;

pub use error::{OracleError, OracleResult};
pub use lease::{LeaseAllocator, PortAllocator, RunLease};
pub use oracle::SimulationOracle;
pub use outcome::SimulationOutcome;
pub use sumo::{SumoConfig, SumoOracle};
pub use traci::TraciClient;
pub use tripinfo::{parse_tripinfo, read_tripinfo};

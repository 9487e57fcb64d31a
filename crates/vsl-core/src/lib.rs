//! `vsl-core`: foundational types for the `vsl` speed-limit optimizer.
//!
//! This crate is a dependency of every other `vsl-*` crate.  It has no
//! `vsl-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `EdgeIdx`, `NodeIdx`, `VehicleId`                       |
//! | [`geo`]       | `GeoPoint`, `PlanarPoint`, `GeoFix`                     |
//! | [`units`]     | km/h ↔ m/s conversion                                   |
//! | [`rng`]       | `VehicleRng` (per-vehicle, seeded from the sweep seed)  |
//! | [`config`]    | `SweepConfig`, `SpeedGrid`, policies                    |
//! | [`error`]     | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to geo and config types.    |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod units;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    DepartureConfig, ExitPolicy, FailurePolicy, MatchConfig, SpeedGrid, SweepConfig,
};
pub use error::{CoreError, CoreResult};
pub use geo::{GeoFix, GeoPoint, PlanarPoint};
pub use ids::{EdgeIdx, NodeIdx, VehicleId};
pub use rng::VehicleRng;
pub use units::{kmh_to_mps, mps_to_kmh};

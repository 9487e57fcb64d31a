//! `vsl-route`: turn matched vehicles into simulator routes.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`descriptor`]  | `RouteDescriptor`, `RouteBatch`, `MatchedVehicle`        |
//! | [`synth`]       | `RouteSynthesizer`, `departure_speed_mps`                |
//! | [`routefile`]   | `VehicleType`, `write_route_file`, `render_route_file`   |
//! | [`error`]       | `RouteError`, `RouteResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `VehicleType`.          |

pub mod descriptor;
pub mod error;
pub mod routefile;
pub mod synth;


pub use descriptor::{MatchedVehicle, RouteBatch, RouteDescriptor};
pub use error::{RouteError, RouteResult};
pub use routefile::{render_route_file, write_route_file, VehicleType};
pub use synth::{departure_speed_mps, RouteSynthesizer};

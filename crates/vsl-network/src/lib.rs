//! `vsl-network`: road network, segment index, and map matching.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`network`]    | `RoadNetwork` (CSR + segment R-tree), `RoadNetworkBuilder`|
//! | [`geometry`]   | point-to-segment projection                               |
//! | [`projection`] | `Projection`: WGS-84 → network planar frame              |
//! | [`matcher`]    | `MapMatcher`, `MatchedPosition`, `MatchMiss`              |
//! | [`sumo`]       | `load_net_xml`, `parse_net_xml`                           |
//! | [`error`]      | `NetworkError`, `NetworkResult<T>`                        |
//!
//! A `RoadNetwork` is immutable once built.  Share it by reference (or in an
//! `Arc`) between the matcher, the route synthesizer, and any worker thread.

pub mod error;
pub mod geometry;
pub mod matcher;
pub mod network;
pub mod projection;
pub mod sumo;


pub use error::{NetworkError, NetworkResult};
pub use matcher::{MapMatcher, MatchMiss, MatchedPosition};
pub use network::{RoadNetwork, RoadNetworkBuilder};
pub use projection::Projection;
pub use sumo::{load_net_xml, parse_net_xml};

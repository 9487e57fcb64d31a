//! Route data handed to the simulation oracle.

use vsl_core::{kmh_to_mps, EdgeIdx, VehicleId};
use vsl_network::MatchedPosition;

/// A matched vehicle together with the speed it reported.
///
/// Matching is independent of the candidate speed, so the optimizer builds
/// these once and re-uses them for every candidate's batch.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchedVehicle {
    pub position:  MatchedPosition,
    pub speed_kmh: f64,
}

/// One vehicle's route: where it enters, where it leaves, and how it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteDescriptor {
    pub vehicle_id:       VehicleId,
    pub entry:            EdgeIdx,
    /// Equal to `entry` when the entry edge has no successor.
    pub exit:             EdgeIdx,
    /// Departure position along `entry`, metres.
    pub depart_pos_m:     f64,
    pub depart_speed_mps: f64,
}

impl RouteDescriptor {
    /// A single-edge route (no successor was available).
    #[inline]
    pub fn is_single_edge(&self) -> bool {
        self.entry == self.exit
    }
}

/// All routes for one candidate speed cap.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteBatch {
    pub cap_kmh: u32,
    pub routes:  Vec<RouteDescriptor>,
}

impl RouteBatch {
    pub fn new(cap_kmh: u32) -> Self {
        Self { cap_kmh, routes: Vec::new() }
    }

    #[inline]
    pub fn cap_mps(&self) -> f64 {
        kmh_to_mps(self.cap_kmh as f64)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

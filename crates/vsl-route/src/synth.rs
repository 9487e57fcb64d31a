//! Route synthesis.
//!
//! # Departure speed
//!
//! A vehicle departs at the slower of what it wants to do and what it can
//! safely do:
//!
//! ```text
//! desired   = min(reported, cap)
//! remaining = max(edge_length − depart_pos, 0)
//! safe      = sqrt(2 · decel · remaining)
//! depart    = min(desired, safe)
//! ```
//!
//! `safe` is the highest speed from which the vehicle can still stop before
//! the end of its entry edge at the configured deceleration, so a vehicle
//! placed a few metres before a junction starts almost at rest instead of
//! forcing the simulator into an emergency brake.

use vsl_core::{kmh_to_mps, DepartureConfig, EdgeIdx, ExitPolicy, VehicleRng};
use vsl_network::{MatchedPosition, RoadNetwork};

use crate::{MatchedVehicle, RouteBatch, RouteDescriptor};

/// Departure speed in m/s.  Inputs are m/s, metres, and m/s².
///
/// Negative reported speeds are treated as standstill.
#[inline]
pub fn departure_speed_mps(reported_mps: f64, cap_mps: f64, remaining_m: f64, decel_mps2: f64) -> f64 {
    let desired = reported_mps.min(cap_mps).max(0.0);
    let safe = (2.0 * decel_mps2 * remaining_m.max(0.0)).sqrt();
    desired.min(safe)
}

/// Builds [`RouteDescriptor`]s against a borrowed network.
pub struct RouteSynthesizer<'n> {
    network:     &'n RoadNetwork,
    departure:   DepartureConfig,
    exit_policy: ExitPolicy,
}

impl<'n> RouteSynthesizer<'n> {
    pub fn new(network: &'n RoadNetwork, departure: DepartureConfig, exit_policy: ExitPolicy) -> Self {
        Self { network, departure, exit_policy }
    }

    /// Route for one matched vehicle under one candidate cap.
    pub fn synthesize(
        &self,
        matched:   &MatchedPosition,
        speed_kmh: f64,
        cap_kmh:   f64,
        rng:       &mut VehicleRng,
    ) -> RouteDescriptor {
        let entry = matched.edge;
        let remaining_m = self.network.length(entry) - matched.offset_m;
        let depart_speed_mps = departure_speed_mps(
            kmh_to_mps(speed_kmh),
            kmh_to_mps(cap_kmh),
            remaining_m,
            self.departure.decel_mps2,
        );

        RouteDescriptor {
            vehicle_id: matched.vehicle_id.clone(),
            entry,
            exit: self.exit_edge(entry, rng),
            depart_pos_m: matched.offset_m,
            depart_speed_mps,
        }
    }

    /// Pick where a vehicle entering on `entry` leaves the network.
    ///
    /// Falls back to `entry` itself when it has no successor.
    pub fn exit_edge(&self, entry: EdgeIdx, rng: &mut VehicleRng) -> EdgeIdx {
        let successors = self.network.successors(entry);
        let chosen = match self.exit_policy {
            ExitPolicy::Random => rng.choose(successors),
            ExitPolicy::FirstAvailable => successors.first(),
        };
        chosen.copied().unwrap_or(entry)
    }

    /// One candidate's batch.
    ///
    /// Each vehicle's RNG is re-seeded from `seed` and its id, so every
    /// candidate built from the same `seed` picks the same exits and the
    /// batches differ only in their departure speeds.
    pub fn batch(&self, vehicles: &[MatchedVehicle], cap_kmh: u32, seed: u64) -> RouteBatch {
        let routes = vehicles
            .iter()
            .map(|v| {
                let mut rng = VehicleRng::new(seed, &v.position.vehicle_id);
                self.synthesize(&v.position, v.speed_kmh, cap_kmh as f64, &mut rng)
            })
            .collect();
        RouteBatch { cap_kmh, routes }
    }
}

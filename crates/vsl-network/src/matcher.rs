//! Map matching: snap a position fix onto the nearest edge.
//!
//! # Search
//!
//! 1. Project the fix into the network frame.
//! 2. Ask the segment R-tree for segments within `neighbor_radius_m`.
//! 3. If that comes back empty and `fallback_scan` is on, scan every segment
//!    of every edge.
//! 4. Keep the closest projection.  Ties go to the lowest `EdgeIdx`, then the
//!    lowest segment index, so both paths agree on equidistant fixes.
//!
//! The departure offset is the arc length along the edge polyline up to the
//! projected point, clamped to `[0, length − ε]`.

use thiserror::Error;
use tracing::trace;

use vsl_core::{EdgeIdx, GeoFix, MatchConfig, PlanarPoint, VehicleId};

use crate::geometry::project_onto_segment;
use crate::RoadNetwork;

/// A fix snapped onto the network.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchedPosition {
    pub vehicle_id: VehicleId,
    pub edge:       EdgeIdx,
    /// Longitudinal offset from the start of `edge`, metres.
    pub offset_m:   f64,
    /// The fix's orthogonal projection onto the edge polyline.
    pub projected:  PlanarPoint,
    /// Distance between the fix and `projected`, metres.
    pub distance_m: f64,
}

/// Why a fix could not be matched.  Callers drop the vehicle and move on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchMiss {
    #[error("network has no edges")]
    EmptyNetwork,

    #[error("no edge segment near the fix")]
    NoCandidate,

    #[error("nearest edge is {distance_m:.1} m away (limit {limit_m:.1} m)")]
    TooFar { distance_m: f64, limit_m: f64 },
}

/// Closest segment found so far.
#[derive(Clone, Copy, Debug)]
struct SegmentHit {
    edge:       EdgeIdx,
    segment:    u32,
    point:      PlanarPoint,
    distance_2: f64,
}

impl SegmentHit {
    /// Strictly better: closer, or equally close with a lower
    /// `(edge, segment)` key.
    #[inline]
    fn beats(&self, other: &SegmentHit) -> bool {
        self.distance_2 < other.distance_2
            || (self.distance_2 == other.distance_2
                && (self.edge, self.segment) < (other.edge, other.segment))
    }
}

/// Snaps fixes onto a borrowed [`RoadNetwork`].
pub struct MapMatcher<'n> {
    network:        &'n RoadNetwork,
    config:         MatchConfig,
    edge_epsilon_m: f64,
}

impl<'n> MapMatcher<'n> {
    pub fn new(network: &'n RoadNetwork, config: MatchConfig, edge_epsilon_m: f64) -> Self {
        Self { network, config, edge_epsilon_m }
    }

    /// Match one fix.
    pub fn match_fix(&self, fix: &GeoFix) -> Result<MatchedPosition, MatchMiss> {
        let pt = self.network.to_planar(fix.position());
        let hit = self.nearest(pt)?;
        let distance_m = hit.distance_2.sqrt();

        if let Some(limit_m) = self.config.max_match_distance_m {
            if distance_m > limit_m {
                return Err(MatchMiss::TooFar { distance_m, limit_m });
            }
        }

        let offset_m = self.offset_along(hit);
        trace!(vehicle = %fix.vehicle_id, edge = self.network.edge_name(hit.edge), offset_m, distance_m, "matched");

        Ok(MatchedPosition {
            vehicle_id: fix.vehicle_id.clone(),
            edge: hit.edge,
            offset_m,
            projected: hit.point,
            distance_m,
        })
    }

    /// Nearest segment to `pt`: index lookup first, exhaustive scan second.
    fn nearest(&self, pt: PlanarPoint) -> Result<SegmentHit, MatchMiss> {
        if self.network.is_empty() {
            return Err(MatchMiss::EmptyNetwork);
        }

        let shortlist = self.network.segments_near(pt, self.config.neighbor_radius_m);
        let indexed = shortlist
            .into_iter()
            .filter_map(|(edge, segment)| self.hit(pt, edge, segment))
            .fold(None, keep_best);

        match indexed {
            Some(hit) => Ok(hit),
            None if self.config.fallback_scan => self.nearest_exhaustive(pt).ok_or(MatchMiss::NoCandidate),
            None => Err(MatchMiss::NoCandidate),
        }
    }

    /// Scan every segment of every edge in index order.
    fn nearest_exhaustive(&self, pt: PlanarPoint) -> Option<SegmentHit> {
        self.network
            .edges()
            .flat_map(|edge| {
                let segments = self.network.shape(edge).len().saturating_sub(1) as u32;
                (0..segments).filter_map(move |s| self.hit(pt, edge, s))
            })
            .fold(None, keep_best)
    }

    fn hit(&self, pt: PlanarPoint, edge: EdgeIdx, segment: u32) -> Option<SegmentHit> {
        let shape = self.network.shape(edge);
        let s = segment as usize;
        let proj = project_onto_segment(pt, *shape.get(s)?, *shape.get(s + 1)?)?;
        Some(SegmentHit { edge, segment, point: proj.point, distance_2: proj.distance_2 })
    }

    /// Arc length to the projected point, clamped inside the edge.
    fn offset_along(&self, hit: SegmentHit) -> f64 {
        let shape = self.network.shape(hit.edge);
        let s = hit.segment as usize;
        let before: f64 = shape[..=s].windows(2).map(|w| w[0].distance(w[1])).sum();
        let raw = before + shape[s].distance(hit.point);

        let upper = self.network.length(hit.edge) - self.edge_epsilon_m;
        raw.min(upper).max(0.0)
    }
}

fn keep_best(best: Option<SegmentHit>, hit: SegmentHit) -> Option<SegmentHit> {
    match best {
        Some(b) if !hit.beats(&b) => Some(b),
        _ => Some(hit),
    }
}

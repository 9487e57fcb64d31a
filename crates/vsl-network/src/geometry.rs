//! Point-to-segment projection shared by the segment index and the matcher.

use vsl_core::PlanarPoint;

/// Segments shorter than this (squared, m²) have no usable direction and are
/// skipped by both the index and the matcher.
pub const DEGENERATE_LEN_2: f64 = 1e-12;

/// Orthogonal projection of a point onto a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentProjection {
    /// Position along the segment, clamped to `[0, 1]`.
    pub t: f64,
    /// The projected point.
    pub point: PlanarPoint,
    /// Squared distance from the query point to `point`.
    pub distance_2: f64,
}

/// Project `pt` onto the segment `p1 → p2`.
///
/// `t = clamp(((pt − p1)·(p2 − p1)) / |p2 − p1|², 0, 1)`.  Returns `None` for
/// a degenerate (zero-length) segment.
#[inline]
pub fn project_onto_segment(pt: PlanarPoint, p1: PlanarPoint, p2: PlanarPoint) -> Option<SegmentProjection> {
    let d = p2 - p1;
    let len_2 = d.norm_2();
    if len_2 < DEGENERATE_LEN_2 {
        return None;
    }
    let t = ((pt - p1).dot(d) / len_2).clamp(0.0, 1.0);
    let point = p1 + d * t;
    Some(SegmentProjection { t, point, distance_2: (pt - point).norm_2() })
}

/// Total length of a polyline.
pub fn polyline_length(shape: &[PlanarPoint]) -> f64 {
    shape.windows(2).map(|w| w[0].distance(w[1])).sum()
}

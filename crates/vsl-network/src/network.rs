//! Road network representation and builder.
//!
//! # Data layout
//!
//! Edges are indexed by `EdgeIdx` in insertion order.  Variable-length
//! per-edge data is stored in **Compressed Sparse Row (CSR)** form:
//!
//! ```text
//! shape of e      = shape_points   [ edge_shape_start[e] .. edge_shape_start[e+1] ]
//! successors of e = edge_successors[ edge_succ_start[e]  .. edge_succ_start[e+1]  ]
//! ```
//!
//! Successors are the outgoing edges of `e`'s destination junction, with `e`
//! itself removed, in ascending `EdgeIdx` order.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) holds every non-degenerate polyline segment tagged
//! with its `(EdgeIdx, segment)` pair.  The map matcher uses it to shortlist
//! segments near a fix before computing exact projections.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use vsl_core::{EdgeIdx, GeoPoint, NodeIdx, PlanarPoint};

use crate::geometry::{polyline_length, project_onto_segment, DEGENERATE_LEN_2};
use crate::Projection;

// ── R-tree segment entry ──────────────────────────────────────────────────────

/// Entry stored in the R-tree: one polyline segment of one edge.
#[derive(Clone, Debug)]
pub(crate) struct SegmentEntry {
    from:    [f64; 2],
    to:      [f64; 2],
    pub(crate) edge:    EdgeIdx,
    pub(crate) segment: u32,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.from, self.to)
    }
}

impl PointDistance for SegmentEntry {
    /// Exact squared point-to-segment distance in the planar frame.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        project_onto_segment(
            PlanarPoint::from(*point),
            PlanarPoint::from(self.from),
            PlanarPoint::from(self.to),
        )
        .map_or(f64::INFINITY, |p| p.distance_2)
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph with edge geometry and a segment index.
///
/// Read-only after construction; use [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// External junction id of each node.  Indexed by `NodeIdx`.
    pub node_names: Vec<String>,

    // ── Edge data (indexed by EdgeIdx) ────────────────────────────────────
    /// External edge id, e.g. the SUMO edge id written into route files.
    pub edge_names: Vec<String>,

    pub edge_from: Vec<NodeIdx>,

    pub edge_to: Vec<NodeIdx>,

    /// Length of each edge in metres.  Taken from the network description
    /// when it provides one, otherwise the polyline length.
    pub edge_length_m: Vec<f64>,

    /// CSR row pointer into `shape_points`.  Length = `edge_count + 1`.
    pub edge_shape_start: Vec<u32>,

    pub shape_points: Vec<PlanarPoint>,

    /// CSR row pointer into `edge_successors`.  Length = `edge_count + 1`.
    pub edge_succ_start: Vec<u32>,

    pub edge_successors: Vec<EdgeIdx>,

    // ── Lookup ────────────────────────────────────────────────────────────
    projection:  Projection,
    edge_lookup: FxHashMap<String, EdgeIdx>,
    segment_idx: RTree<SegmentEntry>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.  Every fix is
    /// unmatchable against it.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edge_names.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.segment_idx.size()
    }

    // ── Edge accessors ────────────────────────────────────────────────────

    #[inline]
    pub fn edge_name(&self, edge: EdgeIdx) -> &str {
        &self.edge_names[edge.index()]
    }

    /// Look up an edge by its external id.
    pub fn edge_by_name(&self, name: &str) -> Option<EdgeIdx> {
        self.edge_lookup.get(name).copied()
    }

    #[inline]
    pub fn length(&self, edge: EdgeIdx) -> f64 {
        self.edge_length_m[edge.index()]
    }

    /// Polyline of `edge` in the planar frame.
    #[inline]
    pub fn shape(&self, edge: EdgeIdx) -> &[PlanarPoint] {
        let start = self.edge_shape_start[edge.index()] as usize;
        let end   = self.edge_shape_start[edge.index() + 1] as usize;
        &self.shape_points[start..end]
    }

    /// Edges leaving `edge`'s destination junction, excluding `edge` itself,
    /// in ascending index order.
    #[inline]
    pub fn successors(&self, edge: EdgeIdx) -> &[EdgeIdx] {
        let start = self.edge_succ_start[edge.index()] as usize;
        let end   = self.edge_succ_start[edge.index() + 1] as usize;
        &self.edge_successors[start..end]
    }

    /// Iterator over every `EdgeIdx`.
    pub fn edges(&self) -> impl Iterator<Item = EdgeIdx> + '_ {
        (0..self.edge_count()).map(|i| EdgeIdx(i as u32))
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    #[inline]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Convert a geographic position into this network's planar frame.
    #[inline]
    pub fn to_planar(&self, pos: GeoPoint) -> PlanarPoint {
        self.projection.to_planar(pos)
    }

    /// `(edge, segment)` pairs whose segment passes within `radius_m` of `pt`.
    /// Order is unspecified.
    pub fn segments_near(&self, pt: PlanarPoint, radius_m: f64) -> Vec<(EdgeIdx, u32)> {
        self.segment_idx
            .locate_within_distance(pt.to_array(), radius_m * radius_m)
            .map(|s| (s.edge, s.segment))
            .collect()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use vsl_core::PlanarPoint;
/// use vsl_network::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node("a");
/// let c = b.add_node("c");
/// b.add_edge("a_c", a, c, vec![PlanarPoint::new(0.0, 0.0), PlanarPoint::new(100.0, 0.0)], None);
/// let net = b.build();
/// assert_eq!(net.edge_count(), 1);
/// assert_eq!(net.length(net.edge_by_name("a_c").unwrap()), 100.0);
/// ```
pub struct RoadNetworkBuilder {
    nodes:      Vec<String>,
    node_index: FxHashMap<String, NodeIdx>,
    raw_edges:  Vec<RawEdge>,
    projection: Projection,
}

struct RawEdge {
    name:     String,
    from:     NodeIdx,
    to:       NodeIdx,
    shape:    Vec<PlanarPoint>,
    length_m: f64,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes:      Vec::new(),
            node_index: FxHashMap::default(),
            raw_edges:  Vec::new(),
            projection: Projection::default(),
        }
    }

    /// Set the geographic → planar conversion used by [`RoadNetwork::to_planar`].
    pub fn projection(&mut self, projection: Projection) -> &mut Self {
        self.projection = projection;
        self
    }

    /// Add a junction, or return the existing index if `name` was added
    /// before.
    pub fn add_node(&mut self, name: &str) -> NodeIdx {
        if let Some(&idx) = self.node_index.get(name) {
            return idx;
        }
        let idx = NodeIdx(self.nodes.len() as u32);
        self.nodes.push(name.to_owned());
        self.node_index.insert(name.to_owned(), idx);
        idx
    }

    /// Add a directed edge and return its index (sequential from 0).
    ///
    /// `length_m` overrides the polyline length when given.
    pub fn add_edge(
        &mut self,
        name:     &str,
        from:     NodeIdx,
        to:       NodeIdx,
        shape:    Vec<PlanarPoint>,
        length_m: Option<f64>,
    ) -> EdgeIdx {
        let idx = EdgeIdx(self.raw_edges.len() as u32);
        let length_m = length_m.unwrap_or_else(|| polyline_length(&shape));
        self.raw_edges.push(RawEdge { name: name.to_owned(), from, to, shape, length_m });
        idx
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Time complexity: O(E log E) for the junction adjacency sort plus
    /// O(S log S) for the R-tree bulk load, where S = segments.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // ── Junction → outgoing edges (CSR, ascending EdgeIdx) ────────────
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &self.raw_edges {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        let mut fill = node_out_start.clone();
        let mut node_out = vec![EdgeIdx::INVALID; edge_count];
        for (i, e) in self.raw_edges.iter().enumerate() {
            let slot = &mut fill[e.from.index()];
            node_out[*slot as usize] = EdgeIdx(i as u32);
            *slot += 1;
        }

        // ── Per-edge successors ───────────────────────────────────────────
        let mut edge_succ_start = Vec::with_capacity(edge_count + 1);
        let mut edge_successors = Vec::new();
        edge_succ_start.push(0u32);
        for (i, e) in self.raw_edges.iter().enumerate() {
            let this = EdgeIdx(i as u32);
            let start = node_out_start[e.to.index()] as usize;
            let end   = node_out_start[e.to.index() + 1] as usize;
            edge_successors.extend(node_out[start..end].iter().copied().filter(|&s| s != this));
            edge_succ_start.push(edge_successors.len() as u32);
        }

        // ── Shapes, lengths, names ────────────────────────────────────────
        let mut edge_shape_start = Vec::with_capacity(edge_count + 1);
        let mut shape_points = Vec::new();
        let mut segments = Vec::new();
        let mut edge_names = Vec::with_capacity(edge_count);
        let mut edge_from = Vec::with_capacity(edge_count);
        let mut edge_to = Vec::with_capacity(edge_count);
        let mut edge_length_m = Vec::with_capacity(edge_count);
        let mut edge_lookup = FxHashMap::default();

        edge_shape_start.push(0u32);
        for (i, e) in self.raw_edges.into_iter().enumerate() {
            let idx = EdgeIdx(i as u32);
            for (s, w) in e.shape.windows(2).enumerate() {
                if (w[1] - w[0]).norm_2() >= DEGENERATE_LEN_2 {
                    segments.push(SegmentEntry {
                        from:    w[0].to_array(),
                        to:      w[1].to_array(),
                        edge:    idx,
                        segment: s as u32,
                    });
                }
            }
            shape_points.extend_from_slice(&e.shape);
            edge_shape_start.push(shape_points.len() as u32);
            edge_lookup.insert(e.name.clone(), idx);
            edge_names.push(e.name);
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_length_m.push(e.length_m);
        }

        RoadNetwork {
            node_names: self.nodes,
            edge_names,
            edge_from,
            edge_to,
            edge_length_m,
            edge_shape_start,
            shape_points,
            edge_succ_start,
            edge_successors,
            projection: self.projection,
            edge_lookup,
            segment_idx: RTree::bulk_load(segments),
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

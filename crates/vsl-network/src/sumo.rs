//! SUMO `.net.xml` loader.
//!
//! # What is loaded
//!
//! - `<location netOffset=".." projParameter="..">` → [`Projection`].
//! - Every `normal` `<edge id from to>` becomes one directed edge.  Its
//!   geometry and length come from the **first** `<lane>` child (`shape`,
//!   `length`), which is where vehicles depart with `departLane="best"` on
//!   single-lane approaches.
//! - Junctions are created from the edges' `from`/`to` attributes; their own
//!   `<junction>` elements are not needed for matching.
//!
//! Edges with any other `function` (`internal`, `crossing`, `walkingarea`,
//! `connector`) and everything else (connections, traffic lights,
//! roundabouts) are skipped.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use vsl_core::PlanarPoint;

use crate::{NetworkError, NetworkResult, Projection, RoadNetwork, RoadNetworkBuilder};

// ── Public entry points ───────────────────────────────────────────────────────

/// Load a road network from a SUMO `.net.xml` file.
///
/// # Errors
///
/// [`NetworkError::Io`] when the file cannot be read, [`NetworkError::NoEdges`]
/// when it holds no drivable edge, and the parse variants for malformed
/// content.  All of them are fatal configuration failures for the optimizer.
pub fn load_net_xml(path: &Path) -> NetworkResult<RoadNetwork> {
    let text = std::fs::read_to_string(path)?;
    let net = parse_net_xml(&text)?;
    debug!(path = %path.display(), edges = net.edge_count(), nodes = net.node_count(), "loaded SUMO network");
    Ok(net)
}

/// Like [`load_net_xml`] but parses an in-memory document.
pub fn parse_net_xml(xml: &str) -> NetworkResult<RoadNetwork> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut builder = RoadNetworkBuilder::new();
    let mut current: Option<PendingEdge> = None;

    loop {
        match reader.read_event().map_err(|e| NetworkError::Xml(e.to_string()))? {
            Event::Start(e) => match e.name().as_ref() {
                b"edge" => current = Some(PendingEdge::from_element(&e)?),
                b"lane" => on_lane(&e, current.as_mut())?,
                b"location" => {
                    builder.projection(parse_location(&e)?);
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"lane" => on_lane(&e, current.as_mut())?,
                b"location" => {
                    builder.projection(parse_location(&e)?);
                }
                // An edge without lanes carries no geometry.
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"edge" => {
                if let Some(edge) = current.take() {
                    edge.finish(&mut builder);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if builder.edge_count() == 0 {
        return Err(NetworkError::NoEdges);
    }
    Ok(builder.build())
}

// ── Element handlers ──────────────────────────────────────────────────────────

struct PendingEdge {
    id:      String,
    from:    String,
    to:      String,
    /// Non-`normal` function: kept out of the graph.
    skipped: bool,
    lane:    Option<(Vec<PlanarPoint>, Option<f64>)>,
}

impl PendingEdge {
    fn from_element(e: &BytesStart<'_>) -> NetworkResult<Self> {
        let id = required(e, "edge", "id")?;
        // Only `normal` edges (or ones without `function`) carry traffic and
        // have `from`/`to` junctions.
        let function = attr(e, "function")?;
        if !matches!(function.as_deref(), None | Some("") | Some("normal")) {
            return Ok(Self { id, from: String::new(), to: String::new(), skipped: true, lane: None });
        }
        Ok(Self {
            id,
            from:    required(e, "edge", "from")?,
            to:      required(e, "edge", "to")?,
            skipped: false,
            lane:    None,
        })
    }

    fn finish(self, builder: &mut RoadNetworkBuilder) {
        if self.skipped {
            return;
        }
        let Some((shape, length_m)) = self.lane else {
            return;
        };
        let from = builder.add_node(&self.from);
        let to = builder.add_node(&self.to);
        builder.add_edge(&self.id, from, to, shape, length_m);
    }
}

fn on_lane(e: &BytesStart<'_>, edge: Option<&mut PendingEdge>) -> NetworkResult<()> {
    let Some(edge) = edge else {
        return Ok(());
    };
    if edge.skipped || edge.lane.is_some() {
        return Ok(());
    }
    let shape = parse_shape(&required(e, "lane", "shape")?)?;
    let length_m = attr(e, "length")?
        .map(|v| parse_f64("length", &v))
        .transpose()?;
    edge.lane = Some((shape, length_m));
    Ok(())
}

fn parse_location(e: &BytesStart<'_>) -> NetworkResult<Projection> {
    let offset = match attr(e, "netOffset")? {
        Some(v) => parse_point("netOffset", &v)?,
        None => PlanarPoint::default(),
    };
    let param = attr(e, "projParameter")?.unwrap_or_default();
    Projection::from_proj_parameter(&param, offset)
}

// ── Attribute helpers ─────────────────────────────────────────────────────────

fn attr(e: &BytesStart<'_>, name: &'static str) -> NetworkResult<Option<String>> {
    let Some(a) = e
        .try_get_attribute(name)
        .map_err(|err| NetworkError::Xml(err.to_string()))?
    else {
        return Ok(None);
    };
    let value = a
        .unescape_value()
        .map_err(|err| NetworkError::Xml(err.to_string()))?;
    Ok(Some(value.into_owned()))
}

fn required(e: &BytesStart<'_>, element: &'static str, name: &'static str) -> NetworkResult<String> {
    attr(e, name)?.ok_or(NetworkError::MissingAttribute { element, attr: name })
}

fn parse_f64(attr: &'static str, s: &str) -> NetworkResult<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| NetworkError::InvalidValue { attr, value: s.to_owned() })
}

/// `"x,y"` or `"x,y,z"`; elevation is ignored.
fn parse_point(attr: &'static str, s: &str) -> NetworkResult<PlanarPoint> {
    let mut parts = s.split(',');
    match (parts.next(), parts.next()) {
        (Some(x), Some(y)) => Ok(PlanarPoint::new(parse_f64(attr, x)?, parse_f64(attr, y)?)),
        _ => Err(NetworkError::InvalidValue { attr, value: s.to_owned() }),
    }
}

/// Space-separated list of points.
fn parse_shape(s: &str) -> NetworkResult<Vec<PlanarPoint>> {
    s.split_whitespace().map(|p| parse_point("shape", p)).collect()
}

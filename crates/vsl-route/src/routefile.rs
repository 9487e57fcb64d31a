//! SUMO route file (`.rou.xml`) output.
//!
//! One shared `<vType>` carries the candidate cap as `maxSpeed`; every
//! vehicle gets its own two-edge `<route>` followed by a `<vehicle>` that
//! departs at t = 0 on the best lane:
//!
//! ```xml
//! <routes>
//!     <vType id="vehicle" vClass="delivery" carFollowModel="IDM" ... maxSpeed="10"/>
//!     <route id="route_v1" edges="entry exit"/>
//!     <vehicle id="veh_v1" type="vehicle" route="route_v1" depart="0"
//!              departPos="12.50" departLane="best" departSpeed="8.33"/>
//! </routes>
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use tracing::debug;

use vsl_network::RoadNetwork;

use crate::{RouteBatch, RouteError, RouteResult};

/// The vehicle type every synthesized vehicle uses.  `maxSpeed` is not part
/// of it; it is always the batch's candidate cap.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "snake_case"))]
pub struct VehicleType {
    pub id:               String,
    pub v_class:          String,
    pub car_follow_model: String,
    pub accel_mps2:       f64,
    pub decel_mps2:       f64,
    pub tau_s:            f64,
    pub min_gap_m:        f64,
}

impl Default for VehicleType {
    fn default() -> Self {
        Self {
            id:               "vehicle".to_owned(),
            v_class:          "delivery".to_owned(),
            car_follow_model: "IDM".to_owned(),
            accel_mps2:       2.0,
            decel_mps2:       3.0,
            tau_s:            1.0,
            min_gap_m:        2.5,
        }
    }
}

/// Truncate to two decimals so the written speed never exceeds the computed
/// one.
fn floor_centi(v: f64) -> f64 {
    (v * 100.0).floor() / 100.0
}

fn xml_err(e: impl std::fmt::Display) -> RouteError {
    RouteError::Xml(e.to_string())
}

/// Render `batch` as a complete route document.
pub fn render_route_file(network: &RoadNetwork, batch: &RouteBatch, vtype: &VehicleType) -> RouteResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    emit(&mut writer, network, batch, vtype)?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Write `batch` to `path`, creating or truncating it.
pub fn write_route_file(
    path:    &Path,
    network: &RoadNetwork,
    batch:   &RouteBatch,
    vtype:   &VehicleType,
) -> RouteResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut writer = Writer::new_with_indent(&mut out, b' ', 4);
    emit(&mut writer, network, batch, vtype)?;
    out.write_all(b"\n")?;
    out.flush()?;
    debug!(
        path = %path.display(),
        cap_kmh = batch.cap_kmh,
        vehicles = batch.len(),
        "route file written"
    );
    Ok(())
}

fn emit<W: Write>(
    writer:  &mut Writer<W>,
    network: &RoadNetwork,
    batch:   &RouteBatch,
    vtype:   &VehicleType,
) -> RouteResult<()> {
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("routes")))
        .map_err(xml_err)?;

    // ── Vehicle type ─────────────────────────────────────────────────────────
    let accel = vtype.accel_mps2.to_string();
    let decel = vtype.decel_mps2.to_string();
    let tau = vtype.tau_s.to_string();
    let min_gap = vtype.min_gap_m.to_string();
    let max_speed = batch.cap_mps().to_string();
    let vtype_elem = BytesStart::new("vType").with_attributes([
        ("id", vtype.id.as_str()),
        ("vClass", vtype.v_class.as_str()),
        ("carFollowModel", vtype.car_follow_model.as_str()),
        ("accel", accel.as_str()),
        ("decel", decel.as_str()),
        ("tau", tau.as_str()),
        ("minGap", min_gap.as_str()),
        ("maxSpeed", max_speed.as_str()),
    ]);
    writer.write_event(Event::Empty(vtype_elem)).map_err(xml_err)?;

    // ── Routes and vehicles ──────────────────────────────────────────────────
    for route in &batch.routes {
        let vid = route.vehicle_id.as_str();
        let route_id = format!("route_{vid}");
        let vehicle_id = format!("veh_{vid}");

        let entry = network.edge_name(route.entry);
        let edges = if route.is_single_edge() {
            entry.to_owned()
        } else {
            format!("{entry} {}", network.edge_name(route.exit))
        };
        let route_elem = BytesStart::new("route")
            .with_attributes([("id", route_id.as_str()), ("edges", edges.as_str())]);
        writer.write_event(Event::Empty(route_elem)).map_err(xml_err)?;

        let depart_pos = format!("{:.2}", route.depart_pos_m);
        let depart_speed = format!("{:.2}", floor_centi(route.depart_speed_mps));
        let vehicle_elem = BytesStart::new("vehicle").with_attributes([
            ("id", vehicle_id.as_str()),
            ("type", vtype.id.as_str()),
            ("route", route_id.as_str()),
            ("depart", "0"),
            ("departPos", depart_pos.as_str()),
            ("departLane", "best"),
            ("departSpeed", depart_speed.as_str()),
        ]);
        writer.write_event(Event::Empty(vehicle_elem)).map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("routes")))
        .map_err(xml_err)?;
    Ok(())
}

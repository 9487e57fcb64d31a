//! Geographic → network planar conversion.
//!
//! SUMO networks store geometry in a projected frame: the geographic
//! coordinates run through the projection named by the `projParameter`
//! attribute of `<location>`, then get shifted by `netOffset`.  Only the
//! UTM case (and "no projection", `!`) is supported, which covers every
//! network produced by `netconvert` from OSM with default options.

use vsl_core::{GeoPoint, PlanarPoint};

use crate::{NetworkError, NetworkResult};

// WGS-84 ellipsoid.
const A:  f64 = 6_378_137.0;
const F:  f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING:  f64 = 500_000.0;
const FALSE_NORTHING: f64 = 10_000_000.0;

/// How telemetry coordinates map into the network's frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// Geographic values are already planar metres (synthetic networks, or
    /// SUMO's `projParameter="!"`).  Only the offset is applied.
    Planar { offset: PlanarPoint },
    /// Transverse Mercator in the given UTM zone, then offset.
    Utm { zone: u8, south: bool, offset: PlanarPoint },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Planar { offset: PlanarPoint::default() }
    }
}

impl Projection {
    /// Parse a PROJ.4 parameter string as written by `netconvert`, e.g.
    /// `+proj=utm +zone=35 +ellps=WGS84 +datum=WGS84 +units=m +no_defs`.
    pub fn from_proj_parameter(param: &str, offset: PlanarPoint) -> NetworkResult<Self> {
        let param = param.trim();
        if param.is_empty() || param == "!" {
            return Ok(Projection::Planar { offset });
        }

        let mut is_utm = false;
        let mut zone = None;
        let mut south = false;
        for token in param.split_whitespace() {
            let token = token.trim_start_matches('+');
            match token.split_once('=') {
                Some(("proj", "utm")) => is_utm = true,
                Some(("proj", other)) => {
                    return Err(NetworkError::UnsupportedProjection(format!("proj={other}")));
                }
                Some(("zone", z)) => {
                    zone = Some(z.parse::<u8>().map_err(|_| {
                        NetworkError::UnsupportedProjection(format!("zone={z}"))
                    })?);
                }
                None if token == "south" => south = true,
                _ => {}
            }
        }

        match (is_utm, zone) {
            (true, Some(zone)) if (1..=60).contains(&zone) => Ok(Projection::Utm { zone, south, offset }),
            _ => Err(NetworkError::UnsupportedProjection(param.to_owned())),
        }
    }

    pub fn to_planar(&self, pos: GeoPoint) -> PlanarPoint {
        match *self {
            Projection::Planar { offset } => PlanarPoint::new(pos.lon, pos.lat) + offset,
            Projection::Utm { zone, south, offset } => utm_forward(pos, zone, south) + offset,
        }
    }
}

/// WGS-84 → UTM easting/northing (Snyder's series, sub-metre within a zone).
fn utm_forward(pos: GeoPoint, zone: u8, south: bool) -> PlanarPoint {
    let e2 = F * (2.0 - F);
    let ep2 = e2 / (1.0 - e2);
    let lon0 = ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians();

    let phi = pos.lat.to_radians();
    let lam = pos.lon.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let n = A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = (sin_phi / cos_phi).powi(2);
    let c = ep2 * cos_phi * cos_phi;
    let a = cos_phi * (lam - lon0);

    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let m = A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin());

    let x = K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + FALSE_EASTING;

    let mut y = K0
        * (m + n
            * phi.tan()
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
    if south {
        y += FALSE_NORTHING;
    }

    PlanarPoint::new(x, y)
}

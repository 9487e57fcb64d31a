//! Geographic and planar coordinate types.
//!
//! Telemetry arrives as WGS-84 longitude/latitude.  The road network lives in
//! a projected planar frame measured in metres; [`PlanarPoint`] carries the
//! small amount of vector arithmetic the map matcher needs.
//!
//! Both use `f64`: projected SUMO coordinates reach 10⁶ m and `f32` would
//! lose sub-metre precision there.

use std::ops::{Add, Mul, Sub};

use crate::VehicleId;

// ── GeoPoint ──────────────────────────────────────────────────────────────────

/// A WGS-84 geographic coordinate, longitude first (the order SUMO uses).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

// ── PlanarPoint ───────────────────────────────────────────────────────────────

/// A point (or vector) in the network's planar frame, in metres.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, other: PlanarPoint) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn norm_2(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_2().sqrt()
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: PlanarPoint) -> f64 {
        (self - other).norm()
    }

    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl Add for PlanarPoint {
    type Output = PlanarPoint;
    #[inline]
    fn add(self, rhs: PlanarPoint) -> PlanarPoint {
        PlanarPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PlanarPoint {
    type Output = PlanarPoint;
    #[inline]
    fn sub(self, rhs: PlanarPoint) -> PlanarPoint {
        PlanarPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for PlanarPoint {
    type Output = PlanarPoint;
    #[inline]
    fn mul(self, rhs: f64) -> PlanarPoint {
        PlanarPoint::new(self.x * rhs, self.y * rhs)
    }
}

impl From<[f64; 2]> for PlanarPoint {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

// ── GeoFix ────────────────────────────────────────────────────────────────────

/// One position report from a vehicle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoFix {
    pub vehicle_id: VehicleId,
    pub lon: f64,
    pub lat: f64,
    /// Speed reported by the vehicle's GPS, km/h.
    pub speed_kmh: f64,
}

impl GeoFix {
    pub fn new(vehicle_id: impl Into<String>, lon: f64, lat: f64, speed_kmh: f64) -> Self {
        Self { vehicle_id: VehicleId(vehicle_id.into()), lon, lat, speed_kmh }
    }

    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lon, self.lat)
    }
}

//! Speed unit conversion.
//!
//! Telemetry, candidate caps, and recommendations are km/h; everything the
//! simulator consumes (vType `maxSpeed`, `departSpeed`) is m/s.

const KMH_PER_MPS: f64 = 3.6;

#[inline]
pub fn kmh_to_mps(kmh: f64) -> f64 {
    kmh / KMH_PER_MPS
}

#[inline]
pub fn mps_to_kmh(mps: f64) -> f64 {
    mps * KMH_PER_MPS
}

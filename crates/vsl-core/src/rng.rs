//! Deterministic per-vehicle RNG.
//!
//! # Determinism strategy
//!
//! Each vehicle gets its own `SmallRng` seeded by:
//!
//!   seed = sweep_seed XOR (fnv1a(vehicle_id) * MIXING_CONSTANT)
//!
//! Keying on the vehicle's id rather than its position in the input means:
//!
//! - Every candidate speed in a sweep re-creates the same stream for the same
//!   vehicle, so random route choices agree across candidates.
//! - Adding or removing other vehicles does not disturb a vehicle's choices.
//! - No RNG state is shared, so batches can be built in any order.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::VehicleId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME:  u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the id bytes.  Stable across platforms and releases, unlike
/// `std`'s `DefaultHasher`.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(FNV_OFFSET, |h, &b| (h ^ b as u64).wrapping_mul(FNV_PRIME))
}

/// Per-vehicle deterministic RNG.
pub struct VehicleRng(SmallRng);

impl VehicleRng {
    /// Seed deterministically from the sweep seed and a vehicle id.
    pub fn new(sweep_seed: u64, vehicle: &VehicleId) -> Self {
        let seed = sweep_seed ^ fnv1a(vehicle.as_str().as_bytes()).wrapping_mul(MIXING_CONSTANT);
        VehicleRng(SmallRng::seed_from_u64(seed))
    }

    /// A seed drawn from system entropy, for production sweeps that were not
    /// given an explicit one.
    pub fn entropy_seed() -> u64 {
        rand::random()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}

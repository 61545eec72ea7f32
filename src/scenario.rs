//! Ready-made initial conditions and the seeded RNG used to build them.

use crate::error::Result;
use crate::physics::math::{Scalar, Vector};
use crate::physics::state::{Body, SimulationState};
use rand::Rng;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};
use std::ops::{Deref, DerefMut};

/// Seeded RNG for reproducible scenario generation.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedRng(pub ChaCha8Rng);

impl SharedRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::default(),
        }
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self(ChaCha8Rng::from_rng(&mut rand::rng()))
    }
}

impl Deref for SharedRng {
    type Target = ChaCha8Rng;

    fn deref(&self) -> &ChaCha8Rng {
        &self.0
    }
}

impl DerefMut for SharedRng {
    fn deref_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.0
    }
}

/// Planar two-body system: a heavy primary at the origin and a light
/// satellite launched sideways from unit distance, with G = 2.
///
/// Also the crate's default configuration and the fixture the fixed-step
/// cross-validation tests run on.
pub fn two_body() -> Result<SimulationState> {
    SimulationState::new(
        2.0,
        vec![
            Body::new(0.9999, Vector::from([0.0, 0.0]), Vector::from([0.0, 0.0])),
            Body::new(
                0.00009,
                Vector::from([1.0, 0.0]),
                Vector::from([0.0, 1.4]),
            ),
        ],
    )
}

/// `count` equal bodies evenly spaced on a circle of radius `count / 2`,
/// each carrying mass `1 / count` and a unit tangential velocity, G = 1.
/// The configuration rotates collectively and keeps zero net momentum.
pub fn ring(count: usize) -> Result<SimulationState> {
    let radius = count as Scalar / 2.0;
    let mass = 1.0 / count as Scalar;

    let bodies = (0..count)
        .map(|index| {
            let angle = 2.0 * std::f64::consts::PI * index as Scalar / count as Scalar;
            let (sin, cos) = (libm::sin(angle), libm::cos(angle));
            Body::new(
                mass,
                Vector::from([radius * cos, radius * sin]),
                Vector::from([-sin, cos]),
            )
        })
        .collect();

    SimulationState::new(1.0, bodies)
}

/// `count` bodies scattered uniformly through a ball, with random masses and
/// mild random velocities, G = 1. Equal seeds produce identical systems.
pub fn random_cluster(count: usize, seed: Option<u64>) -> Result<SimulationState> {
    let mut rng = SharedRng::from_optional_seed(seed);
    let radius = 10.0 * libm::cbrt(count as Scalar);

    let bodies = (0..count)
        .map(|_| {
            let mass = rng.random_range(0.5..2.0);
            // Cube-root weighting keeps the distribution uniform in volume.
            let distance = radius * libm::cbrt(rng.random_range(0.0..1.0));
            let position = random_unit_vector(&mut rng).scale(distance);
            let speed = rng.random_range(0.0..1.0);
            let velocity = random_unit_vector(&mut rng).scale(speed);
            Body::new(mass, position, velocity)
        })
        .collect();

    SimulationState::new(1.0, bodies)
}

fn random_unit_vector(rng: &mut SharedRng) -> Vector {
    let theta = rng.random_range(0.0..=2.0 * std::f64::consts::PI);
    let phi = libm::acos(rng.random_range(-1.0..=1.0));

    Vector::from([
        libm::sin(phi) * libm::cos(theta),
        libm::sin(phi) * libm::sin(theta),
        libm::cos(phi),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::gravity::total_momentum;
    use approx::assert_relative_eq;

    #[test]
    fn shared_rng_is_deterministic_with_a_seed() {
        let mut rng1 = SharedRng::from_seed(12345);
        let mut rng2 = SharedRng::from_seed(12345);

        let values1: Vec<f64> = (0..10).map(|_| rng1.random_range(0.0..1.0)).collect();
        let values2: Vec<f64> = (0..10).map(|_| rng2.random_range(0.0..1.0)).collect();

        assert_eq!(values1, values2);
    }

    #[test]
    fn two_body_matches_the_default_configuration() {
        let state = two_body().unwrap();
        assert_eq!(state.body_count(), 2);
        assert_eq!(state.dimension(), 2);
        assert_eq!(state.gravitational_constant(), 2.0);
        assert_eq!(state.bodies()[1].latest().velocity, Vector::from([0.0, 1.4]));
    }

    #[test]
    fn ring_is_balanced() {
        let state = ring(8).unwrap();
        assert_eq!(state.body_count(), 8);

        // Unit tangential speeds, zero net momentum.
        for body in state.bodies() {
            assert_relative_eq!(body.latest().velocity.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(body.latest().position.norm(), 4.0, epsilon = 1e-12);
        }
        let momentum =
            total_momentum(&state.latest_velocities(), &state.masses()).unwrap();
        assert_relative_eq!(momentum.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn random_cluster_is_reproducible_per_seed() {
        let a = random_cluster(12, Some(42)).unwrap();
        let b = random_cluster(12, Some(42)).unwrap();
        let c = random_cluster(12, Some(43)).unwrap();

        for (left, right) in a.bodies().iter().zip(b.bodies()) {
            assert_eq!(left.latest(), right.latest());
            assert_eq!(left.mass(), right.mass());
        }

        let same = a
            .bodies()
            .iter()
            .zip(c.bodies())
            .all(|(left, right)| left.latest() == right.latest());
        assert!(!same, "different seeds should give different clusters");
    }

    #[test]
    fn random_unit_vectors_have_unit_length() {
        let mut rng = SharedRng::from_seed(7);
        for _ in 0..1000 {
            let v = random_unit_vector(&mut rng);
            assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
        }
    }
}

//! Pairwise Newtonian gravity: the force model every integrator consumes.

use crate::error::{Error, Result};
use crate::physics::integrators::AccelerationField;
use crate::physics::math::{Scalar, Vector};

/// Acceleration field one body sees from the rest of the system.
///
/// Holds a frozen snapshot of all positions and masses taken at the start of
/// a step. Multi-stage integrators probe it at displaced positions for the
/// tracked body; every other body stays where the snapshot put it, so all
/// evaluations within a step read the same state.
pub struct GravityField<'a> {
    positions: &'a [Vector],
    masses: &'a [Scalar],
    gravitational_constant: Scalar,
    body: usize,
}

impl<'a> GravityField<'a> {
    pub fn new(
        positions: &'a [Vector],
        masses: &'a [Scalar],
        gravitational_constant: Scalar,
        body: usize,
    ) -> Self {
        Self {
            positions,
            masses,
            gravitational_constant,
            body,
        }
    }
}

impl AccelerationField for GravityField<'_> {
    /// Net gravitational acceleration at `position`, summed over every other
    /// body in ascending index order: `G * m_j * r_ij / |r_ij|^3`.
    ///
    /// The tracked body itself is skipped (its self-interaction would divide
    /// by zero); a vanishing separation to any other body is a collision the
    /// model cannot resolve and fails with [`Error::SingularSeparation`].
    fn at(&self, position: &Vector) -> Result<Vector> {
        let mut acceleration = Vector::zeros(position.dim());
        for (j, (other, mass)) in self.positions.iter().zip(self.masses).enumerate() {
            if j == self.body {
                continue;
            }
            let separation = other.sub(position)?;
            let distance = separation.norm();
            if distance == 0.0 {
                return Err(Error::SingularSeparation {
                    first: self.body.min(j),
                    second: self.body.max(j),
                });
            }
            let factor = self.gravitational_constant * mass / (distance * distance * distance);
            acceleration = acceleration.add(&separation.scale(factor))?;
        }
        Ok(acceleration)
    }
}

/// Acceleration on body `index` with every body at its snapshot position.
pub fn acceleration_on(
    index: usize,
    positions: &[Vector],
    masses: &[Scalar],
    gravitational_constant: Scalar,
) -> Result<Vector> {
    GravityField::new(positions, masses, gravitational_constant, index).at(&positions[index])
}

/// Coupled evaluation: one acceleration per body, all from the same position
/// set. This is what the adaptive integrator's stages call, with every body
/// displaced simultaneously.
pub fn accelerations(
    positions: &[Vector],
    masses: &[Scalar],
    gravitational_constant: Scalar,
) -> Result<Vec<Vector>> {
    (0..positions.len())
        .map(|index| acceleration_on(index, positions, masses, gravitational_constant))
        .collect()
}

/// Gravitational force on body `first` exerted by body `second`.
pub fn pairwise_force(
    first: usize,
    second: usize,
    positions: &[Vector],
    masses: &[Scalar],
    gravitational_constant: Scalar,
) -> Result<Vector> {
    let separation = positions[second].sub(&positions[first])?;
    let distance = separation.norm();
    if distance == 0.0 {
        return Err(Error::SingularSeparation {
            first: first.min(second),
            second: first.max(second),
        });
    }
    let factor =
        gravitational_constant * masses[first] * masses[second] / (distance * distance * distance);
    Ok(separation.scale(factor))
}

/// Kinetic plus pairwise potential energy of the whole system.
pub fn total_energy(
    positions: &[Vector],
    velocities: &[Vector],
    masses: &[Scalar],
    gravitational_constant: Scalar,
) -> Result<Scalar> {
    let kinetic: Scalar = velocities
        .iter()
        .zip(masses)
        .map(|(velocity, mass)| 0.5 * mass * velocity.norm_squared())
        .sum();

    let mut potential = 0.0;
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let distance = positions[j].sub(&positions[i])?.norm();
            if distance == 0.0 {
                return Err(Error::SingularSeparation { first: i, second: j });
            }
            potential -= gravitational_constant * masses[i] * masses[j] / distance;
        }
    }

    Ok(kinetic + potential)
}

/// Total linear momentum of the system.
pub fn total_momentum(velocities: &[Vector], masses: &[Scalar]) -> Result<Vector> {
    let dimension = velocities.first().map(Vector::dim).unwrap_or(0);
    velocities
        .iter()
        .zip(masses)
        .try_fold(Vector::zeros(dimension), |sum, (velocity, mass)| {
            sum.add(&velocity.scale(*mass))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_body_setup() -> (Vec<Vector>, Vec<Scalar>, Scalar) {
        let positions = vec![Vector::from([0.0, 0.0]), Vector::from([1.0, 0.0])];
        let masses = vec![0.9999, 0.00009];
        (positions, masses, 2.0)
    }

    #[test]
    fn acceleration_matches_inverse_cube_law() {
        let (positions, masses, g) = two_body_setup();

        // Separation is the unit x vector, so the satellite feels G * m_0
        // toward the origin.
        let on_satellite = acceleration_on(1, &positions, &masses, g).unwrap();
        assert_relative_eq!(on_satellite[0], -2.0 * 0.9999);
        assert_relative_eq!(on_satellite[1], 0.0);

        let on_primary = acceleration_on(0, &positions, &masses, g).unwrap();
        assert_relative_eq!(on_primary[0], 2.0 * 0.00009);
    }

    #[test]
    fn pairwise_forces_are_antisymmetric() {
        let positions = vec![
            Vector::from([0.0, 0.0, 0.0]),
            Vector::from([1.0, 2.0, -1.0]),
            Vector::from([-3.0, 0.5, 2.0]),
        ];
        let masses = vec![1.0, 2.5, 0.75];

        for i in 0..positions.len() {
            for j in 0..positions.len() {
                if i == j {
                    continue;
                }
                let forward = pairwise_force(i, j, &positions, &masses, 1.0).unwrap();
                let backward = pairwise_force(j, i, &positions, &masses, 1.0).unwrap();
                for k in 0..3 {
                    assert_relative_eq!(forward[k], -backward[k], epsilon = 1e-15);
                }
            }
        }
    }

    #[test]
    fn coincident_bodies_are_singular() {
        let positions = vec![Vector::from([1.0, 1.0]), Vector::from([1.0, 1.0])];
        let masses = vec![1.0, 1.0];

        assert_eq!(
            acceleration_on(0, &positions, &masses, 1.0),
            Err(Error::SingularSeparation { first: 0, second: 1 })
        );
    }

    #[test]
    fn field_probes_displaced_positions() {
        let (positions, masses, g) = two_body_setup();
        let field = GravityField::new(&positions, &masses, g, 1);

        // Twice the distance, a quarter of the pull.
        let far = field.at(&Vector::from([2.0, 0.0])).unwrap();
        assert_relative_eq!(far[0], -2.0 * 0.9999 / 4.0);
    }

    #[test]
    fn momentum_sums_mass_weighted_velocities() {
        let velocities = vec![Vector::from([1.0, 0.0]), Vector::from([-0.5, 2.0])];
        let masses = vec![2.0, 4.0];

        let momentum = total_momentum(&velocities, &masses).unwrap();
        assert_relative_eq!(momentum[0], 0.0);
        assert_relative_eq!(momentum[1], 8.0);
    }

    #[test]
    fn energy_is_kinetic_plus_potential() {
        let positions = vec![Vector::from([0.0, 0.0]), Vector::from([2.0, 0.0])];
        let velocities = vec![Vector::zeros(2), Vector::from([0.0, 3.0])];
        let masses = vec![1.0, 2.0];

        let energy = total_energy(&positions, &velocities, &masses, 1.0).unwrap();
        // kinetic: 0.5 * 2 * 9 = 9; potential: -1 * 1 * 2 / 2 = -1
        assert_relative_eq!(energy, 8.0);
    }
}

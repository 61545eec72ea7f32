//! Embedded Dormand-Prince 5(4) pair with step-size control
//!
//! Unlike the fixed-step schemes, this integrator advances the whole system
//! at once: every stage displaces every body simultaneously and the error
//! estimate spans the full coupled state. One global step size serves all
//! bodies, so acceptance and rejection stay consistent across the system.

use crate::error::Result;
use crate::physics::gravity;
use crate::physics::math::{Scalar, Vector};

const STAGES: usize = 7;
const ORDER: usize = 5;

/// Butcher tableau stage weights a[s][j] (row s consumes stages 0..s).
const A: [[Scalar; 6]; STAGES] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];

/// Fifth-order combination weights (the accepted solution).
const B5: [Scalar; STAGES] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];

/// Fourth-order combination weights (the error reference).
const B4: [Scalar; STAGES] = [
    5179.0 / 57600.0,
    0.0,
    7571.0 / 16695.0,
    393.0 / 640.0,
    -92097.0 / 339200.0,
    187.0 / 2100.0,
    1.0 / 40.0,
];

/// Tolerance and step bounds for an adaptive run.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveSettings {
    /// Target for the local error estimate; steps above it are rejected.
    pub eps_target: Scalar,
    /// Step size of the first attempt.
    pub initial_step: Scalar,
    /// Floor below which the controller reports underflow.
    pub min_step: Scalar,
    /// Ceiling for step growth.
    pub max_step: Scalar,
    /// Backstop on total attempts per run.
    pub max_steps: u64,
}

impl Default for AdaptiveSettings {
    fn default() -> Self {
        Self {
            eps_target: 1e-7,
            initial_step: 0.05,
            min_step: 1e-12,
            max_step: Scalar::INFINITY,
            max_steps: 10_000_000,
        }
    }
}

/// Proportional step-size controller.
///
/// `dt_next = dt * safety * (eps_target / error)^(1/5)`, with the adjustment
/// factor clamped so a single step neither collapses nor explodes the step
/// size. The same formula serves accepted and rejected steps.
#[derive(Debug, Clone, Copy)]
pub struct StepController {
    pub safety: Scalar,
    pub min_factor: Scalar,
    pub max_factor: Scalar,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 5.0,
        }
    }
}

impl StepController {
    pub fn factor(&self, error: Scalar, eps_target: Scalar) -> Scalar {
        if error == 0.0 {
            return self.max_factor;
        }
        let factor = self.safety * libm::pow(eps_target / error, 1.0 / ORDER as Scalar);
        factor.clamp(self.min_factor, self.max_factor)
    }
}

/// Outcome of one attempted step over the whole system.
///
/// The candidate state is the fifth-order solution; it is only meaningful
/// when `accepted` is true. `next_step` is the controller's suggestion for
/// the following attempt either way.
#[derive(Debug, Clone)]
pub struct AdaptiveStep {
    pub positions: Vec<Vector>,
    pub velocities: Vec<Vector>,
    pub error: Scalar,
    pub accepted: bool,
    pub next_step: Scalar,
}

/// Dormand-Prince 5(4) embedded Runge-Kutta pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct DormandPrince54 {
    pub controller: StepController,
}

impl DormandPrince54 {
    pub fn name(&self) -> &'static str {
        "dormand_prince_54"
    }

    pub fn aliases(&self) -> Vec<&'static str> {
        vec!["dopri45", "adaptive"]
    }

    pub fn convergence_order(&self) -> usize {
        ORDER
    }

    /// Attempt one step of size `dt` from the given system state.
    ///
    /// Computes the seven stage evaluations, forms both embedded solutions,
    /// and estimates the local error as the Euclidean norm of their
    /// difference over every body's position and velocity. Acceptance is
    /// `error <= eps_target`; the caller decides whether to commit.
    pub fn try_step(
        &self,
        positions: &[Vector],
        velocities: &[Vector],
        masses: &[Scalar],
        gravitational_constant: Scalar,
        dt: Scalar,
        settings: &AdaptiveSettings,
    ) -> Result<AdaptiveStep> {
        let count = positions.len();

        // Stage derivatives: k_r[s] holds dr/dt (stage velocities), k_v[s]
        // holds dv/dt (stage accelerations).
        let mut k_r: Vec<Vec<Vector>> = Vec::with_capacity(STAGES);
        let mut k_v: Vec<Vec<Vector>> = Vec::with_capacity(STAGES);

        for stage in 0..STAGES {
            let mut stage_positions = positions.to_vec();
            let mut stage_velocities = velocities.to_vec();
            for prior in 0..stage {
                let weight = A[stage][prior];
                if weight == 0.0 {
                    continue;
                }
                for body in 0..count {
                    stage_positions[body] =
                        stage_positions[body].add(&k_r[prior][body].scale(dt * weight))?;
                    stage_velocities[body] =
                        stage_velocities[body].add(&k_v[prior][body].scale(dt * weight))?;
                }
            }

            let stage_accelerations =
                gravity::accelerations(&stage_positions, masses, gravitational_constant)?;
            k_r.push(stage_velocities);
            k_v.push(stage_accelerations);
        }

        let mut new_positions = Vec::with_capacity(count);
        let mut new_velocities = Vec::with_capacity(count);
        let mut error_squared = 0.0;

        for body in 0..count {
            let mut r5 = positions[body].clone();
            let mut v5 = velocities[body].clone();
            let mut r4 = positions[body].clone();
            let mut v4 = velocities[body].clone();

            for stage in 0..STAGES {
                if B5[stage] != 0.0 {
                    r5 = r5.add(&k_r[stage][body].scale(dt * B5[stage]))?;
                    v5 = v5.add(&k_v[stage][body].scale(dt * B5[stage]))?;
                }
                if B4[stage] != 0.0 {
                    r4 = r4.add(&k_r[stage][body].scale(dt * B4[stage]))?;
                    v4 = v4.add(&k_v[stage][body].scale(dt * B4[stage]))?;
                }
            }

            error_squared += r5.sub(&r4)?.norm_squared() + v5.sub(&v4)?.norm_squared();
            new_positions.push(r5);
            new_velocities.push(v5);
        }

        let error = libm::sqrt(error_squared);
        let accepted = error <= settings.eps_target;
        let factor = self.controller.factor(error, settings.eps_target);
        let next_step = (dt * factor).clamp(settings.min_step, settings.max_step);

        Ok(AdaptiveStep {
            positions: new_positions,
            velocities: new_velocities,
            error,
            accepted,
            next_step,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tableau_weights_are_consistent() {
        // Both embedded solutions must be affine combinations of the stages.
        assert_relative_eq!(B5.iter().sum::<Scalar>(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(B4.iter().sum::<Scalar>(), 1.0, epsilon = 1e-15);

        // Row sums reproduce the standard Dormand-Prince abscissae.
        let c: Vec<Scalar> = A.iter().map(|row| row.iter().sum()).collect();
        let expected = [0.0, 0.2, 0.3, 0.8, 8.0 / 9.0, 1.0, 1.0];
        for (sum, want) in c.iter().zip(expected) {
            assert_relative_eq!(*sum, want, epsilon = 1e-12);
        }
    }

    fn two_body_state() -> (Vec<Vector>, Vec<Vector>, Vec<Scalar>) {
        let positions = vec![Vector::from([0.0, 0.0]), Vector::from([1.0, 0.0])];
        let velocities = vec![Vector::from([0.0, 0.0]), Vector::from([0.0, 1.4])];
        let masses = vec![0.9999, 0.00009];
        (positions, velocities, masses)
    }

    #[test]
    fn error_estimate_scales_with_fifth_power_of_step() {
        let (positions, velocities, masses) = two_body_state();
        let method = DormandPrince54::default();
        let settings = AdaptiveSettings {
            eps_target: 1.0,
            ..AdaptiveSettings::default()
        };

        let coarse = method
            .try_step(&positions, &velocities, &masses, 2.0, 0.1, &settings)
            .unwrap();
        let fine = method
            .try_step(&positions, &velocities, &masses, 2.0, 0.05, &settings)
            .unwrap();

        assert!(coarse.error > fine.error);
        // Local error of the embedded pair is O(dt^5); halving the step
        // should shrink it by roughly 2^5.
        let ratio = coarse.error / fine.error;
        assert!(
            ratio > 16.0 && ratio < 64.0,
            "unexpected error ratio {ratio}"
        );
    }

    #[test]
    fn tight_tolerance_rejects_and_shrinks() {
        let (positions, velocities, masses) = two_body_state();
        let method = DormandPrince54::default();
        let settings = AdaptiveSettings {
            eps_target: 1e-14,
            ..AdaptiveSettings::default()
        };

        let attempt = method
            .try_step(&positions, &velocities, &masses, 2.0, 0.1, &settings)
            .unwrap();

        assert!(!attempt.accepted);
        assert!(attempt.next_step < 0.1);
    }

    #[test]
    fn loose_tolerance_accepts_and_grows() {
        let (positions, velocities, masses) = two_body_state();
        let method = DormandPrince54::default();
        let settings = AdaptiveSettings {
            eps_target: 1e-2,
            ..AdaptiveSettings::default()
        };

        let attempt = method
            .try_step(&positions, &velocities, &masses, 2.0, 0.001, &settings)
            .unwrap();

        assert!(attempt.accepted);
        assert!(attempt.next_step > 0.001);
    }

    #[test]
    fn controller_factor_behavior() {
        let controller = StepController::default();

        // Vanishing error grows by the maximum factor.
        assert_eq!(controller.factor(0.0, 1e-7), controller.max_factor);

        // Errors far above target clamp at the minimum factor.
        assert_eq!(controller.factor(1.0, 1e-7), controller.min_factor);

        // At the target the factor is the safety margin.
        assert_relative_eq!(controller.factor(1e-7, 1e-7), 0.9);
    }
}

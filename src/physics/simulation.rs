//! Simulation driver: owns the state and drives the time loop.

use crate::error::{Error, Result};
use crate::physics::gravity::GravityField;
use crate::physics::integrators::{
    AdaptiveSettings, DormandPrince54, Integrator, StepContext, Stepper,
};
use crate::physics::math::Scalar;
use crate::physics::state::{BodyFrame, SimulationState, Trajectory};
use serde::{Deserialize, Serialize};

/// How body updates within one fixed step see each other.
///
/// `Synchronous` freezes a snapshot of all positions at the start of the
/// step; every body's force evaluation reads that same snapshot, so the
/// result is independent of body order. `GaussSeidel` commits each body's
/// new position into the working snapshot immediately, so later bodies feel
/// earlier bodies' updated positions within the same step. Synchronous is
/// the physically standard choice and the default; Gauss-Seidel makes the
/// step order-dependent and is kept selectable for comparison runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOrdering {
    #[default]
    Synchronous,
    GaussSeidel,
}

enum Scheme {
    Fixed {
        integrator: Box<dyn Integrator>,
        step_size: Scalar,
    },
    Adaptive {
        method: DormandPrince54,
        settings: AdaptiveSettings,
    },
}

/// Owns the [`SimulationState`] and advances it to a requested end time.
///
/// All mutation of the state goes through the driver; a committed step is
/// one new frame per body plus its time, appended atomically. On failure the
/// already accepted prefix stays intact and remains available through
/// [`trajectory`](SimulationDriver::trajectory).
pub struct SimulationDriver {
    state: SimulationState,
    scheme: Scheme,
    ordering: UpdateOrdering,
}

impl SimulationDriver {
    /// Driver for a fixed-step scheme with a uniform global step size.
    pub fn fixed(
        state: SimulationState,
        integrator: Box<dyn Integrator>,
        step_size: Scalar,
    ) -> Result<Self> {
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "step size must be positive and finite, got {step_size}"
            )));
        }
        Ok(Self {
            state,
            scheme: Scheme::Fixed {
                integrator,
                step_size,
            },
            ordering: UpdateOrdering::default(),
        })
    }

    /// Driver for the adaptive scheme with one shared step-size controller.
    pub fn adaptive(
        state: SimulationState,
        method: DormandPrince54,
        settings: AdaptiveSettings,
    ) -> Result<Self> {
        validate_adaptive_settings(&settings)?;
        Ok(Self {
            state,
            scheme: Scheme::Adaptive { method, settings },
            ordering: UpdateOrdering::default(),
        })
    }

    /// Driver from a registry-resolved [`Stepper`].
    pub fn from_stepper(
        state: SimulationState,
        stepper: Stepper,
        step_size: Scalar,
        settings: AdaptiveSettings,
    ) -> Result<Self> {
        match stepper {
            Stepper::Fixed(integrator) => Self::fixed(state, integrator, step_size),
            Stepper::Adaptive(method) => Self::adaptive(state, method, settings),
        }
    }

    pub fn with_ordering(mut self, ordering: UpdateOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn ordering(&self) -> UpdateOrdering {
        self.ordering
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Snapshot of everything accepted so far. After a failed run this is
    /// the preserved prefix.
    pub fn trajectory(&self) -> Trajectory {
        self.state.trajectory()
    }

    /// Advance the simulation until accumulated time reaches `end_time`.
    ///
    /// Fixed-step schemes take whole steps of their configured size; the
    /// adaptive scheme controls its own step and shortens the final one to
    /// land on `end_time` exactly. Any error stops the run; the failure time
    /// and step index are logged and the error propagates to the caller.
    pub fn run(&mut self, end_time: Scalar) -> Result<Trajectory> {
        if !(end_time.is_finite() && end_time >= self.state.time()) {
            return Err(Error::InvalidConfiguration(format!(
                "end time {end_time} is not ahead of current time {}",
                self.state.time()
            )));
        }

        let outcome = match &self.scheme {
            Scheme::Fixed {
                integrator,
                step_size,
            } => run_fixed(
                &mut self.state,
                integrator.as_ref(),
                *step_size,
                self.ordering,
                end_time,
            ),
            Scheme::Adaptive { method, settings } => {
                run_adaptive(&mut self.state, method, settings, end_time)
            }
        };

        match outcome {
            Ok(()) => {
                log::info!(
                    "run complete: {} bodies, {} steps, t = {}",
                    self.state.body_count(),
                    self.state.step_count(),
                    self.state.time()
                );
                Ok(self.state.trajectory())
            }
            Err(error) => {
                log::error!(
                    "run aborted at t = {} after {} accepted steps: {error}",
                    self.state.time(),
                    self.state.step_count()
                );
                Err(error)
            }
        }
    }
}

fn validate_adaptive_settings(settings: &AdaptiveSettings) -> Result<()> {
    if !(settings.eps_target.is_finite() && settings.eps_target > 0.0) {
        return Err(Error::InvalidConfiguration(format!(
            "error target must be positive and finite, got {}",
            settings.eps_target
        )));
    }
    if !(settings.min_step.is_finite() && settings.min_step > 0.0) {
        return Err(Error::InvalidConfiguration(format!(
            "minimum step must be positive and finite, got {}",
            settings.min_step
        )));
    }
    if settings.max_step < settings.min_step {
        return Err(Error::InvalidConfiguration(format!(
            "maximum step {} is below minimum step {}",
            settings.max_step, settings.min_step
        )));
    }
    if !(settings.initial_step.is_finite() && settings.initial_step > 0.0) {
        return Err(Error::InvalidConfiguration(format!(
            "initial step must be positive and finite, got {}",
            settings.initial_step
        )));
    }
    if settings.max_steps == 0 {
        return Err(Error::InvalidConfiguration(
            "maximum step count must be at least 1".into(),
        ));
    }
    Ok(())
}

fn run_fixed(
    state: &mut SimulationState,
    integrator: &dyn Integrator,
    step_size: Scalar,
    ordering: UpdateOrdering,
    end_time: Scalar,
) -> Result<()> {
    let masses = state.masses();
    let g = state.gravitational_constant();

    // Whole steps only; the slack keeps an exact multiple of the step from
    // losing its last iteration to rounding.
    while state.time() + step_size <= end_time + step_size * 1e-9 {
        let mut snapshot = state.latest_positions();
        let mut frames = Vec::with_capacity(state.body_count());

        for index in 0..state.body_count() {
            let field = GravityField::new(&snapshot, &masses, g, index);
            let ctx = StepContext::new(state.bodies()[index].frames())?;
            let result = integrator.step(&ctx, &field, step_size)?;

            if ordering == UpdateOrdering::GaussSeidel {
                snapshot[index] = result.position.clone();
            }
            frames.push(BodyFrame::new(result.position, result.velocity));
        }

        let time = state.time() + step_size;
        state.push_step(time, frames);
        log::trace!("committed fixed step, t = {time}");
    }

    Ok(())
}

fn run_adaptive(
    state: &mut SimulationState,
    method: &DormandPrince54,
    settings: &AdaptiveSettings,
    end_time: Scalar,
) -> Result<()> {
    let masses = state.masses();
    let g = state.gravitational_constant();
    let mut dt = settings
        .initial_step
        .clamp(settings.min_step, settings.max_step);
    let mut attempts: u64 = 0;

    while end_time - state.time() > settings.min_step {
        // Shorten the last step to land on the endpoint.
        if state.time() + dt > end_time {
            dt = end_time - state.time();
        }

        let positions = state.latest_positions();
        let velocities = state.latest_velocities();
        let attempt = method.try_step(&positions, &velocities, &masses, g, dt, settings)?;

        attempts += 1;
        if attempts > settings.max_steps {
            return Err(Error::MaxStepsExceeded(settings.max_steps));
        }

        if attempt.accepted {
            let time = state.time() + dt;
            let frames = attempt
                .positions
                .into_iter()
                .zip(attempt.velocities)
                .map(|(position, velocity)| BodyFrame::new(position, velocity))
                .collect();
            state.push_step(time, frames);
            log::debug!(
                "accepted dt = {dt:.3e} (error {:.3e}), t = {time:.6}",
                attempt.error
            );
        } else {
            log::debug!(
                "rejected dt = {dt:.3e}, error {:.3e} above target {:.3e}",
                attempt.error,
                settings.eps_target
            );
            if attempt.next_step <= settings.min_step
                && end_time - state.time() > settings.min_step
            {
                return Err(Error::StepSizeUnderflow {
                    time: state.time(),
                    step: attempt.next_step,
                });
            }
        }

        dt = attempt.next_step;
    }

    Ok(())
}

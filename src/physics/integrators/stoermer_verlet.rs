//! Stoermer-Verlet integration method (position form)

use super::{AccelerationField, Integrator, StepContext, StepResult};
use crate::error::Result;
use crate::physics::math::{Scalar, Vector};

/// Stoermer-Verlet integrator, position form
///
/// A second-order two-step method with the bounded energy oscillation of a
/// symplectic scheme, which makes it the workhorse for long gravitational
/// runs. The recurrence needs two consecutive positions:
///
/// ```text
/// r(t+dt) = 2*r(t) - r(t-dt) + a(t) * dt^2
/// v(t+dt) = (r(t+dt) - r(t-dt)) / (2*dt)
/// ```
///
/// # Bootstrap
///
/// The very first step has no `r(t-dt)`. A fictitious previous position is
/// synthesized from the second-order Taylor expansion run backwards,
///
/// ```text
/// r_help = r(t) - v(t)*dt + 0.5*a(t)*dt^2
/// ```
///
/// and stands in for `r(t-dt)` during that one step only. From rest this
/// collapses the first step to `r(t) + 0.5*a(t)*dt^2`, which tests pin
/// against the Taylor expansion directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoermerVerlet;

impl Integrator for StoermerVerlet {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }

    fn step(
        &self,
        ctx: &StepContext,
        field: &dyn AccelerationField,
        dt: Scalar,
    ) -> Result<StepResult> {
        let current = ctx.current();
        let acceleration = field.at(&current.position)?;

        let previous_position: Vector = match ctx.previous() {
            Some(previous) => previous.position.clone(),
            None => current
                .position
                .sub(&current.velocity.scale(dt))?
                .add(&acceleration.scale(0.5 * dt * dt))?,
        };

        let position = current
            .position
            .scale(2.0)
            .sub(&previous_position)?
            .add(&acceleration.scale(dt * dt))?;

        let velocity = position.sub(&previous_position)?.scale(1.0 / (2.0 * dt));

        Ok(StepResult { position, velocity })
    }

    fn convergence_order(&self) -> usize {
        2
    }

    fn name(&self) -> &'static str {
        "stoermer_verlet"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["verlet"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::state::BodyFrame;
    use approx::assert_relative_eq;

    struct ConstantField(Vector);

    impl AccelerationField for ConstantField {
        fn at(&self, _position: &Vector) -> Result<Vector> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn bootstrap_from_rest_matches_taylor_expansion() {
        let frames = [BodyFrame::new(Vector::from([2.0, 1.0]), Vector::zeros(2))];
        let ctx = StepContext::new(&frames).unwrap();
        let field = ConstantField(Vector::from([0.0, -9.81]));
        let dt = 0.05;

        let result = StoermerVerlet.step(&ctx, &field, dt).unwrap();

        // From rest the synthesized step collapses to r + 0.5*a*dt^2.
        assert_relative_eq!(result.position[0], 2.0);
        assert_relative_eq!(
            result.position[1],
            1.0 + 0.5 * -9.81 * dt * dt,
            epsilon = 1e-14
        );
    }

    #[test]
    fn bootstrap_with_velocity_uses_backward_taylor_point() {
        let frames = [BodyFrame::new(Vector::from([0.0]), Vector::from([2.0]))];
        let ctx = StepContext::new(&frames).unwrap();
        let field = ConstantField(Vector::from([-4.0]));
        let dt = 0.1;

        let result = StoermerVerlet.step(&ctx, &field, dt).unwrap();

        let r_help = 0.0 - 2.0 * dt + 0.5 * -4.0 * dt * dt;
        let expected = 2.0 * 0.0 - r_help + -4.0 * dt * dt;
        assert_relative_eq!(result.position[0], expected, epsilon = 1e-14);
        assert_relative_eq!(
            result.velocity[0],
            (expected - r_help) / (2.0 * dt),
            epsilon = 1e-14
        );
    }

    #[test]
    fn two_step_recurrence_uses_the_stored_previous_position() {
        let frames = [
            BodyFrame::new(Vector::from([0.0]), Vector::from([1.0])),
            BodyFrame::new(Vector::from([0.1]), Vector::from([1.0])),
        ];
        let ctx = StepContext::new(&frames).unwrap();
        let field = ConstantField(Vector::from([0.0]));
        let dt = 0.1;

        let result = StoermerVerlet.step(&ctx, &field, dt).unwrap();

        // Force-free: r' = 2*0.1 - 0.0 = 0.2, v' = (0.2 - 0.0) / 0.2 = 1.0
        assert_relative_eq!(result.position[0], 0.2);
        assert_relative_eq!(result.velocity[0], 1.0);
    }
}

//! Explicit Euler integration method (forward Euler)
//!
//! Kept for comparison purposes: it exhibits monotonic energy drift in
//! conservative systems and every other scheme in this crate beats it.

use super::{AccelerationField, Integrator, StepContext, StepResult};
use crate::error::Result;
use crate::physics::math::Scalar;

/// Explicit Euler integrator (forward Euler method)
///
/// First-order, non-symplectic. The position update uses the OLD velocity:
///
/// ```text
/// v(t+dt) = v(t) + a(t) * dt
/// r(t+dt) = r(t) + v(t) * dt
/// ```
///
/// Using the old velocity is what distinguishes this from Euler-Cromer and
/// what makes orbits spiral outward as energy grows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitEuler;

impl Integrator for ExplicitEuler {
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

        let velocity = current.velocity.add(&acceleration.scale(dt))?;
        let position = current.position.add(&current.velocity.scale(dt))?;

        Ok(StepResult { position, velocity })
    }

    fn convergence_order(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "explicit_euler"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["euler"]
    }
}

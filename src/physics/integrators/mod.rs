//! Numerical integration methods for the n-body equations of motion.

use crate::error::{Error, Result};
use crate::physics::math::{Scalar, Vector};
use crate::physics::state::BodyFrame;

pub mod dormand_prince;
pub mod euler_cromer;
pub mod explicit_euler;
pub mod registry;
pub mod runge_kutta;
pub mod stoermer_verlet;

pub use dormand_prince::{AdaptiveSettings, DormandPrince54, StepController};
pub use euler_cromer::EulerCromer;
pub use explicit_euler::ExplicitEuler;
pub use registry::{IntegratorRegistry, Stepper};
pub use runge_kutta::RungeKuttaFourthOrder;
pub use stoermer_verlet::StoermerVerlet;

/// Acceleration as a function of position, for one body against the rest of
/// the system.
///
/// Multi-stage integrators evaluate the field at hypothetically displaced
/// positions of the tracked body; implementations must answer from a state
/// frozen at the start of the step.
pub trait AccelerationField {
    fn at(&self, position: &Vector) -> Result<Vector>;
}

/// View of one body's history handed to a fixed-step integrator: the current
/// frame plus, for two-step methods, the frame before it.
pub struct StepContext<'a> {
    frames: &'a [BodyFrame],
}

impl<'a> StepContext<'a> {
    pub fn new(frames: &'a [BodyFrame]) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::InvalidConfiguration(
                "cannot step a body with an empty history".into(),
            ));
        }
        Ok(Self { frames })
    }

    /// Most recent frame.
    #[inline]
    pub fn current(&self) -> &BodyFrame {
        &self.frames[self.frames.len() - 1]
    }

    /// Frame before the current one, if the body has stepped at least once.
    #[inline]
    pub fn previous(&self) -> Option<&BodyFrame> {
        self.frames.len().checked_sub(2).map(|i| &self.frames[i])
    }
}

/// One body's state at the new time.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub position: Vector,
    pub velocity: Vector,
}

/// Strategy interface for fixed-step integration schemes.
///
/// Implementations are stateless; all inputs arrive through the context and
/// the field, and the result is returned rather than written in place so the
/// driver can commit a whole step atomically.
pub trait Integrator: Send + Sync {
    fn clone_box(&self) -> Box<dyn Integrator>;

    /// Advance one body by `dt` from its most recent state.
    fn step(
        &self,
        ctx: &StepContext,
        field: &dyn AccelerationField,
        dt: Scalar,
    ) -> Result<StepResult>;

    /// Global order of accuracy.
    fn convergence_order(&self) -> usize;

    /// Canonical registry name.
    fn name(&self) -> &'static str;

    /// Alternative registry names.
    fn aliases(&self) -> Vec<&'static str> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_rejects_empty_history() {
        assert!(StepContext::new(&[]).is_err());
    }

    #[test]
    fn context_exposes_current_and_previous() {
        let frames = vec![
            BodyFrame::new(Vector::from([0.0]), Vector::from([1.0])),
            BodyFrame::new(Vector::from([0.5]), Vector::from([1.5])),
        ];

        let ctx = StepContext::new(&frames[..1]).unwrap();
        assert_eq!(ctx.current().position, Vector::from([0.0]));
        assert!(ctx.previous().is_none());

        let ctx = StepContext::new(&frames).unwrap();
        assert_eq!(ctx.current().position, Vector::from([0.5]));
        assert_eq!(
            ctx.previous().unwrap().position,
            Vector::from([0.0])
        );
    }
}

//! Convenience re-exports for downstream code and tests.

pub use crate::config::SimulationConfig;
pub use crate::error::{Error, Result};
pub use crate::physics::gravity::{total_energy, total_momentum};
pub use crate::physics::integrators::{
    AccelerationField, AdaptiveSettings, DormandPrince54, EulerCromer, ExplicitEuler, Integrator,
    IntegratorRegistry, RungeKuttaFourthOrder, StepContext, StepResult, Stepper, StoermerVerlet,
};
pub use crate::physics::math::{Scalar, Vector};
pub use crate::physics::simulation::{SimulationDriver, UpdateOrdering};
pub use crate::physics::state::{Body, BodyFrame, SimulationState, Trajectory};

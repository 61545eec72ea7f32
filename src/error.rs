//! Error types for the simulation engine.

use crate::physics::math::Scalar;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// A binary vector operation received operands of unequal dimension.
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// Two distinct bodies occupy the same point; the inverse-cube force law
    /// has no finite value there.
    #[error("bodies {first} and {second} are at zero separation")]
    SingularSeparation { first: usize, second: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The adaptive controller shrank the step to the configured minimum
    /// without meeting the error target.
    #[error("step size underflow at t = {time}: step {step} is at the configured minimum")]
    StepSizeUnderflow { time: Scalar, step: Scalar },

    #[error("unknown integrator '{name}'. Available integrators: {available}. Aliases: {aliases}")]
    UnknownIntegrator {
        name: String,
        available: String,
        aliases: String,
    },

    /// Backstop for runaway adaptive runs.
    #[error("exceeded the maximum of {0} integration steps")]
    MaxStepsExceeded(u64),
}

pub type Result<T> = std::result::Result<T, Error>;

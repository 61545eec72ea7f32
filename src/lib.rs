//! Orrery
//!
//! A gravitational n-body integration engine: exact pairwise Newtonian
//! forces, five time-stepping schemes behind one strategy interface
//! (explicit Euler, Euler-Cromer, Stoermer-Verlet, classical RK4, and an
//! adaptive Dormand-Prince 5(4) pair), and a driver that records the full
//! trajectory for downstream consumers.

pub mod config;
pub mod error;
pub mod physics;
pub mod prelude;
pub mod scenario;

// Re-export commonly used items
pub use config::SimulationConfig;
pub use error::{Error, Result};
pub use physics::{
    integrators,
    math::{Scalar, Vector},
    simulation::{SimulationDriver, UpdateOrdering},
    state::{Body, BodyFrame, SimulationState, Trajectory},
};

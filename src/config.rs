//! Simulation configuration: the TOML document consumed at start-up.

use crate::error::{Error, Result};
use crate::physics::integrators::{AdaptiveSettings, IntegratorRegistry, Stepper};
use crate::physics::math::{Scalar, Vector};
use crate::physics::simulation::{SimulationDriver, UpdateOrdering};
use crate::physics::state::{Body, SimulationState, Trajectory};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub integration: IntegrationConfig,
    pub bodies: Vec<BodyConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        // Heavy primary, light satellite on a near-circular orbit.
        Self {
            physics: PhysicsConfig::default(),
            integration: IntegrationConfig::default(),
            bodies: vec![
                BodyConfig {
                    mass: 0.9999,
                    position: vec![0.0, 0.0],
                    velocity: vec![0.0, 0.0],
                },
                BodyConfig {
                    mass: 0.00009,
                    position: vec![1.0, 0.0],
                    velocity: vec![0.0, 1.4],
                },
            ],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub gravitational_constant: Scalar,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: 2.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct IntegrationConfig {
    /// Registry name or alias of the time-stepping scheme.
    pub method: String,
    /// Step size for the fixed-step schemes.
    pub step_size: Scalar,
    /// Total simulated time.
    pub duration: Scalar,
    pub ordering: UpdateOrdering,
    pub adaptive: AdaptiveConfig,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            method: "stoermer_verlet".to_string(),
            step_size: 0.1,
            duration: 100.0,
            ordering: UpdateOrdering::default(),
            adaptive: AdaptiveConfig::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct AdaptiveConfig {
    pub eps_target: Scalar,
    pub initial_step: Scalar,
    pub min_step: Scalar,
    pub max_step: Scalar,
    pub safety_factor: Scalar,
    pub max_steps: u64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            eps_target: 1e-7,
            initial_step: 0.05,
            min_step: 1e-12,
            max_step: 1.0,
            safety_factor: 0.9,
            max_steps: 10_000_000,
        }
    }
}

impl AdaptiveConfig {
    pub fn settings(&self) -> AdaptiveSettings {
        AdaptiveSettings {
            eps_target: self.eps_target,
            initial_step: self.initial_step,
            min_step: self.min_step,
            max_step: self.max_step,
            max_steps: self.max_steps,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BodyConfig {
    pub mass: Scalar,
    pub position: Vec<Scalar>,
    pub velocity: Vec<Scalar>,
}

impl SimulationConfig {
    /// Load configuration from a file, falling back to defaults if the file
    /// doesn't exist or fails to parse.
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("failed to parse config file {path}: {e}. Using defaults.");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("config file {path} not found. Using defaults.");
                Self::default()
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &str) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check everything that can be checked before stepping begins.
    pub fn validate(&self) -> Result<()> {
        self.build_driver().map(drop)
    }

    /// Wire the configuration into a ready-to-run driver.
    ///
    /// All setup validation happens here: body count, masses, dimensions
    /// (state construction), method name (registry), step size and adaptive
    /// bounds (driver construction), and the run duration.
    pub fn build_driver(&self) -> Result<SimulationDriver> {
        if !(self.integration.duration.is_finite() && self.integration.duration > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "duration must be positive and finite, got {}",
                self.integration.duration
            )));
        }
        if !(self.adaptive_safety_factor_is_sane()) {
            return Err(Error::InvalidConfiguration(format!(
                "safety factor must be in (0, 1], got {}",
                self.integration.adaptive.safety_factor
            )));
        }

        let bodies = self
            .bodies
            .iter()
            .map(|body| {
                Body::new(
                    body.mass,
                    Vector::new(body.position.clone()),
                    Vector::new(body.velocity.clone()),
                )
            })
            .collect();
        let state = SimulationState::new(self.physics.gravitational_constant, bodies)?;

        let registry = IntegratorRegistry::new();
        let driver = match registry.create(&self.integration.method)? {
            Stepper::Fixed(integrator) => {
                SimulationDriver::fixed(state, integrator, self.integration.step_size)?
            }
            Stepper::Adaptive(mut method) => {
                method.controller.safety = self.integration.adaptive.safety_factor;
                SimulationDriver::adaptive(state, method, self.integration.adaptive.settings())?
            }
        };

        Ok(driver.with_ordering(self.integration.ordering))
    }

    /// Build a driver and run it for the configured duration.
    pub fn run(&self) -> Result<Trajectory> {
        self.build_driver()?.run(self.integration.duration)
    }

    fn adaptive_safety_factor_is_sane(&self) -> bool {
        let safety = self.integration.adaptive.safety_factor;
        safety.is_finite() && safety > 0.0 && safety <= 1.0
    }
}

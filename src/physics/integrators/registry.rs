//! Registry for resolving integrator names to stepping strategies

use super::{
    DormandPrince54, EulerCromer, ExplicitEuler, Integrator, RungeKuttaFourthOrder, StoermerVerlet,
};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// A resolved stepping strategy.
///
/// Fixed-step schemes share the [`Integrator`] trait; the adaptive scheme
/// controls its own step size and advances the whole system at once, so the
/// driver dispatches on this variant rather than forcing both behind one
/// interface.
pub enum Stepper {
    Fixed(Box<dyn Integrator>),
    Adaptive(DormandPrince54),
}

impl Stepper {
    pub fn name(&self) -> &'static str {
        match self {
            Stepper::Fixed(integrator) => integrator.name(),
            Stepper::Adaptive(method) => method.name(),
        }
    }
}

/// Maps canonical names and aliases to integrator instances.
pub struct IntegratorRegistry {
    aliases: HashMap<String, String>,
}

impl IntegratorRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            aliases: HashMap::new(),
        };

        // Short aliases for convenience
        registry.add_alias("euler", "explicit_euler");
        registry.add_alias("cromer", "euler_cromer");
        registry.add_alias("semi_implicit", "euler_cromer");
        registry.add_alias("verlet", "stoermer_verlet");
        registry.add_alias("rk4", "runge_kutta_fourth_order");
        registry.add_alias("dopri45", "dormand_prince_54");
        registry.add_alias("adaptive", "dormand_prince_54");

        registry
    }

    pub fn add_alias(&mut self, alias: &str, target: &str) {
        self.aliases.insert(alias.to_string(), target.to_string());
    }

    pub fn create(&self, name: &str) -> Result<Stepper> {
        let resolved = self.aliases.get(name).map(String::as_str).unwrap_or(name);

        match resolved {
            "explicit_euler" => Ok(Stepper::Fixed(Box::new(ExplicitEuler))),
            "euler_cromer" => Ok(Stepper::Fixed(Box::new(EulerCromer))),
            "stoermer_verlet" => Ok(Stepper::Fixed(Box::new(StoermerVerlet))),
            "runge_kutta_fourth_order" => Ok(Stepper::Fixed(Box::new(RungeKuttaFourthOrder))),
            "dormand_prince_54" => Ok(Stepper::Adaptive(DormandPrince54::default())),
            _ => Err(Error::UnknownIntegrator {
                name: name.to_string(),
                available: self.list_available().join(", "),
                aliases: {
                    let mut aliases: Vec<String> = self.aliases.keys().cloned().collect();
                    aliases.sort();
                    aliases.join(", ")
                },
            }),
        }
    }

    pub fn list_available(&self) -> Vec<String> {
        vec![
            "dormand_prince_54".to_string(),
            "euler_cromer".to_string(),
            "explicit_euler".to_string(),
            "runge_kutta_fourth_order".to_string(),
            "stoermer_verlet".to_string(),
        ]
    }

    pub fn list_aliases(&self) -> Vec<(String, String)> {
        let mut aliases: Vec<(String, String)> = self
            .aliases
            .iter()
            .map(|(alias, target)| (alias.clone(), target.clone()))
            .collect();
        aliases.sort_by(|a, b| a.0.cmp(&b.0));
        aliases
    }
}

impl Default for IntegratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! Classical fourth-order Runge-Kutta integration

use super::{AccelerationField, Integrator, StepContext, StepResult};
use crate::error::Result;
use crate::physics::math::Scalar;

/// Fourth-order Runge-Kutta integrator (RK4)
///
/// Four force evaluations per body per step, the later ones at positions
/// displaced by the preceding stage increments:
///
/// ```text
/// a1 = f(r)               k_v1 = a1*dt    k_r1 = v*dt
/// a2 = f(r + k_r1/2)      k_v2 = a2*dt    k_r2 = (v + k_v1/2)*dt
/// a3 = f(r + k_r2/2)      k_v3 = a3*dt    k_r3 = (v + k_v2/2)*dt
/// a4 = f(r + k_r3)        k_v4 = a4*dt    k_r4 = (v + k_v3)*dt
/// r' = r + (k_r1 + 2*k_r2 + 2*k_r3 + k_r4)/6
/// v' = v + (k_v1 + 2*k_v2 + 2*k_v3 + k_v4)/6
/// ```
///
/// Stage evaluations displace only the body being advanced; every other body
/// stays at its snapshot position. This single-body-at-a-time treatment is a
/// deliberate simplification of a fully coupled vector RK4 over the whole
/// system (the adaptive scheme is the fully coupled alternative).
#[derive(Debug, Clone, Copy, Default)]
pub struct RungeKuttaFourthOrder;

impl Integrator for RungeKuttaFourthOrder {
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
        let r = &current.position;
        let v = &current.velocity;

        // Stage 1 at the current position
        let a1 = field.at(r)?;
        let k_v1 = a1.scale(dt);
        let k_r1 = v.scale(dt);

        // Stage 2 at the midpoint along k_r1
        let a2 = field.at(&r.add(&k_r1.scale(0.5))?)?;
        let k_v2 = a2.scale(dt);
        let k_r2 = v.add(&k_v1.scale(0.5))?.scale(dt);

        // Stage 3 at the midpoint along k_r2
        let a3 = field.at(&r.add(&k_r2.scale(0.5))?)?;
        let k_v3 = a3.scale(dt);
        let k_r3 = v.add(&k_v2.scale(0.5))?.scale(dt);

        // Stage 4 at the full displacement along k_r3
        let a4 = field.at(&r.add(&k_r3)?)?;
        let k_v4 = a4.scale(dt);
        let k_r4 = v.add(&k_v3)?.scale(dt);

        let position = r.add(
            &k_r1
                .add(&k_r2.scale(2.0))?
                .add(&k_r3.scale(2.0))?
                .add(&k_r4)?
                .scale(1.0 / 6.0),
        )?;
        let velocity = v.add(
            &k_v1
                .add(&k_v2.scale(2.0))?
                .add(&k_v3.scale(2.0))?
                .add(&k_v4)?
                .scale(1.0 / 6.0),
        )?;

        Ok(StepResult { position, velocity })
    }

    fn convergence_order(&self) -> usize {
        4
    }

    fn name(&self) -> &'static str {
        "runge_kutta_fourth_order"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["rk4"]
    }
}

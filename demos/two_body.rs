//! Run the default two-body configuration and report what happened.
//!
//! RUST_LOG=debug cargo run --example two_body

use orrery::physics::gravity;
use orrery::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let config = SimulationConfig::load_or_default("orrery.toml");
    let masses: Vec<Scalar> = config.bodies.iter().map(|body| body.mass).collect();
    let g = config.physics.gravitational_constant;

    let trajectory = config.run()?;

    let (start_time, start) = trajectory.snapshot(0).expect("trajectory has a start");
    let (end_time, end) = trajectory
        .snapshot(trajectory.len() - 1)
        .expect("trajectory has an end");

    let energy_at = |frames: &[BodyFrame]| {
        let positions: Vec<Vector> = frames.iter().map(|f| f.position.clone()).collect();
        let velocities: Vec<Vector> = frames.iter().map(|f| f.velocity.clone()).collect();
        gravity::total_energy(&positions, &velocities, &masses, g)
    };

    let initial_energy = energy_at(start)?;
    let final_energy = energy_at(end)?;

    println!(
        "integrated {} bodies from t = {start_time} to t = {end_time} in {} steps",
        end.len(),
        trajectory.len() - 1,
    );
    for (index, frame) in end.iter().enumerate() {
        println!(
            "  body {index}: position {:?}, velocity {:?}",
            frame.position.components(),
            frame.velocity.components(),
        );
    }
    println!(
        "energy drift: {:.3e} (from {initial_energy:.6} to {final_energy:.6})",
        ((final_energy - initial_energy) / initial_energy).abs(),
    );

    Ok(())
}

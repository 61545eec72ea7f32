//! Owned simulation state: per-body histories and the recorded trajectory.

use crate::error::{Error, Result};
use crate::physics::math::{Scalar, Vector};

/// One history entry: where a body was and how fast it moved at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyFrame {
    pub position: Vector,
    pub velocity: Vector,
}

impl BodyFrame {
    pub fn new(position: Vector, velocity: Vector) -> Self {
        Self { position, velocity }
    }
}

/// A point mass and its chronological history of frames.
///
/// Histories are owned exclusively by the [`SimulationState`]; everything
/// else reads them through shared references.
#[derive(Debug, Clone)]
pub struct Body {
    mass: Scalar,
    frames: Vec<BodyFrame>,
}

impl Body {
    /// A body at its initial conditions, with a single frame at t = 0.
    pub fn new(mass: Scalar, position: Vector, velocity: Vector) -> Self {
        Self {
            mass,
            frames: vec![BodyFrame::new(position, velocity)],
        }
    }

    #[inline]
    pub fn mass(&self) -> Scalar {
        self.mass
    }

    #[inline]
    pub fn frames(&self) -> &[BodyFrame] {
        &self.frames
    }

    /// Most recent frame. Construction guarantees at least one exists.
    #[inline]
    pub fn latest(&self) -> &BodyFrame {
        self.frames
            .last()
            .unwrap_or_else(|| unreachable!("a body always has its initial frame"))
    }
}

/// The complete mutable state of one simulation run.
///
/// Invariants, checked at construction and preserved by [`push_step`]:
/// every vector across all bodies and frames shares one dimension, and all
/// histories have the same length as the recorded time axis between steps.
///
/// [`push_step`]: SimulationState::push_step
#[derive(Debug, Clone)]
pub struct SimulationState {
    bodies: Vec<Body>,
    times: Vec<Scalar>,
    gravitational_constant: Scalar,
    dimension: usize,
}

impl SimulationState {
    /// Build the initial state from per-body initial conditions.
    ///
    /// Rejects fewer than two bodies, non-positive or non-finite masses, and
    /// vectors of inconsistent dimension.
    pub fn new(gravitational_constant: Scalar, bodies: Vec<Body>) -> Result<Self> {
        if bodies.len() < 2 {
            return Err(Error::InvalidConfiguration(format!(
                "need at least 2 bodies, got {}",
                bodies.len()
            )));
        }

        let dimension = bodies[0].latest().position.dim();
        for (index, body) in bodies.iter().enumerate() {
            if !(body.mass.is_finite() && body.mass > 0.0) {
                return Err(Error::InvalidConfiguration(format!(
                    "body {index} has non-positive mass {}",
                    body.mass
                )));
            }
            let frame = body.latest();
            if frame.position.dim() != dimension || frame.velocity.dim() != dimension {
                return Err(Error::InvalidConfiguration(format!(
                    "body {index} has vectors of dimension {}/{}, expected {dimension}",
                    frame.position.dim(),
                    frame.velocity.dim(),
                )));
            }
        }

        Ok(Self {
            bodies,
            times: vec![0.0],
            gravitational_constant,
            dimension,
        })
    }

    #[inline]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn gravitational_constant(&self) -> Scalar {
        self.gravitational_constant
    }

    #[inline]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Time of the most recent committed step.
    pub fn time(&self) -> Scalar {
        *self
            .times
            .last()
            .unwrap_or_else(|| unreachable!("the time axis always holds t = 0"))
    }

    /// Number of committed steps (the initial conditions count as zero).
    pub fn step_count(&self) -> usize {
        self.times.len() - 1
    }

    pub fn masses(&self) -> Vec<Scalar> {
        self.bodies.iter().map(Body::mass).collect()
    }

    /// Clone of every body's latest position, in body order. This is the
    /// frozen snapshot force evaluations read from during a step.
    pub fn latest_positions(&self) -> Vec<Vector> {
        self.bodies
            .iter()
            .map(|body| body.latest().position.clone())
            .collect()
    }

    pub fn latest_velocities(&self) -> Vec<Vector> {
        self.bodies
            .iter()
            .map(|body| body.latest().velocity.clone())
            .collect()
    }

    /// Commit one accepted step: a new frame for every body plus its time.
    ///
    /// The driver is the only caller; committing all bodies at once is what
    /// keeps the histories synchronized between steps.
    pub(crate) fn push_step(&mut self, time: Scalar, frames: Vec<BodyFrame>) {
        debug_assert_eq!(frames.len(), self.bodies.len());
        for (body, frame) in self.bodies.iter_mut().zip(frames) {
            body.frames.push(frame);
        }
        self.times.push(time);
    }

    /// Snapshot the full history into an immutable [`Trajectory`].
    pub fn trajectory(&self) -> Trajectory {
        let snapshots = (0..self.times.len())
            .map(|step| {
                self.bodies
                    .iter()
                    .map(|body| body.frames[step].clone())
                    .collect()
            })
            .collect();
        Trajectory {
            times: self.times.clone(),
            snapshots,
        }
    }
}

/// Time-ordered record of a run: one (time, per-body frames) snapshot per
/// committed step, including the initial conditions at index 0.
///
/// Consumers iterate it read-only; nothing here mutates the simulation.
#[derive(Debug, Clone)]
pub struct Trajectory {
    times: Vec<Scalar>,
    snapshots: Vec<Vec<BodyFrame>>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[Scalar] {
        &self.times
    }

    pub fn snapshot(&self, step: usize) -> Option<(Scalar, &[BodyFrame])> {
        Some((*self.times.get(step)?, self.snapshots.get(step)?.as_slice()))
    }

    pub fn final_time(&self) -> Option<Scalar> {
        self.times.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Scalar, &[BodyFrame])> {
        self.times
            .iter()
            .copied()
            .zip(self.snapshots.iter().map(Vec::as_slice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bodies() -> Vec<Body> {
        vec![
            Body::new(1.0, Vector::from([0.0, 0.0]), Vector::from([0.0, 0.0])),
            Body::new(2.0, Vector::from([1.0, 0.0]), Vector::from([0.0, 1.0])),
        ]
    }

    #[test]
    fn initial_state_has_one_frame_per_body() {
        let state = SimulationState::new(1.0, two_bodies()).unwrap();
        assert_eq!(state.body_count(), 2);
        assert_eq!(state.dimension(), 2);
        assert_eq!(state.time(), 0.0);
        assert_eq!(state.step_count(), 0);
        for body in state.bodies() {
            assert_eq!(body.frames().len(), 1);
        }
    }

    #[test]
    fn rejects_single_body() {
        let bodies = vec![Body::new(1.0, Vector::zeros(2), Vector::zeros(2))];
        assert!(matches!(
            SimulationState::new(1.0, bodies),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_non_positive_mass() {
        let bodies = vec![
            Body::new(0.0, Vector::zeros(2), Vector::zeros(2)),
            Body::new(1.0, Vector::from([1.0, 0.0]), Vector::zeros(2)),
        ];
        assert!(matches!(
            SimulationState::new(1.0, bodies),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_mixed_dimensions() {
        let bodies = vec![
            Body::new(1.0, Vector::zeros(2), Vector::zeros(2)),
            Body::new(1.0, Vector::zeros(3), Vector::zeros(3)),
        ];
        assert!(matches!(
            SimulationState::new(1.0, bodies),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn push_step_keeps_histories_synchronized() {
        let mut state = SimulationState::new(1.0, two_bodies()).unwrap();
        let frames = state
            .bodies()
            .iter()
            .map(|body| body.latest().clone())
            .collect();
        state.push_step(0.1, frames);

        assert_eq!(state.time(), 0.1);
        assert_eq!(state.step_count(), 1);
        for body in state.bodies() {
            assert_eq!(body.frames().len(), 2);
        }
    }

    #[test]
    fn trajectory_is_time_ordered_and_complete() {
        let mut state = SimulationState::new(1.0, two_bodies()).unwrap();
        for step in 1..=3 {
            let frames = state
                .bodies()
                .iter()
                .map(|body| body.latest().clone())
                .collect();
            state.push_step(step as Scalar * 0.5, frames);
        }

        let trajectory = state.trajectory();
        assert_eq!(trajectory.len(), 4);
        assert_eq!(trajectory.times(), &[0.0, 0.5, 1.0, 1.5]);
        assert_eq!(trajectory.final_time(), Some(1.5));
        for (_, frames) in trajectory.iter() {
            assert_eq!(frames.len(), 2);
        }
    }
}

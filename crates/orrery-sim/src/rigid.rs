//! Free-flying rigid bodies
//!
//! Spacecraft and debris orbiting inside a gravity well. The tree stepper
//! accumulates forces into these each tick and hands them to a
//! [`RigidBodyIntegrator`]; the full 6-DOF dynamics live outside the core,
//! behind that trait.

use crate::handles::RenderRef;
use nalgebra::{UnitQuaternion, Vector3};
use orrery_core::coordinates::LargeWorldCoord;

pub struct RigidBody {
    pub name: String,
    /// Mass, kg
    pub mass: f64,
    pub position: LargeWorldCoord,
    pub velocity: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    /// Force accumulated since the last clear, N
    pub force: Vector3<f64>,
    /// Torque accumulated since the last clear, N·m
    pub torque: Vector3<f64>,
    pub render: Option<RenderRef>,
}

impl RigidBody {
    pub fn new(name: &str, mass: f64, position: LargeWorldCoord) -> Self {
        Self {
            name: name.to_owned(),
            mass,
            position,
            velocity: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            force: Vector3::zeros(),
            torque: Vector3::zeros(),
            render: None,
        }
    }

    pub fn apply_force(&mut self, force: Vector3<f64>) {
        self.force += force;
    }

    pub fn clear_forces(&mut self) {
        self.force = Vector3::zeros();
        self.torque = Vector3::zeros();
    }
}

/// External integrator collaborator: advances one rigid body by one step
/// from its accumulated forces.
pub trait RigidBodyIntegrator {
    fn step(&self, body: &mut RigidBody, dt: f64);
}

/// Semi-implicit Euler: velocity from the accumulated force, then position
/// from the updated velocity. The default when nothing richer is injected.
pub struct SemiImplicitEuler;

impl RigidBodyIntegrator for SemiImplicitEuler {
    fn step(&self, body: &mut RigidBody, dt: f64) {
        let accel = body.force / body.mass;
        body.velocity += accel * dt;
        let delta = body.velocity * dt;
        body.position.translate(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_accumulates_and_clears() {
        let mut body = RigidBody::new("probe", 1000.0, LargeWorldCoord::origin());
        body.apply_force(Vector3::new(1.0, 2.0, 3.0));
        body.apply_force(Vector3::new(1.0, 0.0, -3.0));
        assert_eq!(body.force, Vector3::new(2.0, 2.0, 0.0));

        body.clear_forces();
        assert_eq!(body.force, Vector3::zeros());
        assert_eq!(body.torque, Vector3::zeros());
    }

    #[test]
    fn test_euler_step_integrates_force() {
        let mut body = RigidBody::new("probe", 2.0, LargeWorldCoord::origin());
        body.apply_force(Vector3::new(4.0, 0.0, 0.0));

        let integrator = SemiImplicitEuler;
        integrator.step(&mut body, 0.5);

        // a = 2 m/s², v = 1 m/s, x = 0.5 m after half a second
        assert!((body.velocity.x - 1.0).abs() < 1e-12);
        assert!((body.position.global().x - 0.5).abs() < 1e-12);
    }
}

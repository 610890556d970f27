//! Trait seams toward the rendering and effects layers
//!
//! The core pushes state through these interfaces each tick but never owns
//! the scene-side objects behind them; handles are shared into the world by
//! whoever does.

use nalgebra::UnitQuaternion;
use orrery_core::coordinates::LargeWorldCoord;
use std::cell::RefCell;
use std::rc::Rc;

/// A drawable the core keeps positioned and oriented.
pub trait RenderHandle {
    fn set_position(&mut self, position: &LargeWorldCoord);
    fn set_orientation(&mut self, orientation: &UnitQuaternion<f64>);
}

/// A light source pinned to a body (a star's photosphere, typically).
pub trait LightHandle {
    fn set_position(&mut self, position: &LargeWorldCoord);
}

/// A particle effect advanced once per tick after the tree step.
pub trait ParticleSystem {
    fn step(&mut self, dt: f64);
}

pub type RenderRef = Rc<RefCell<dyn RenderHandle>>;
pub type LightRef = Rc<RefCell<dyn LightHandle>>;

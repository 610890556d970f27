//! Astronomical bodies
//!
//! An [`AstroBody`] is one gravitationally dominant object: a star, planet
//! or moon. It carries physical parameters, the current kinematic state,
//! optional orbital elements (absent only at the system root), and the
//! fixation countdown used by the tree stepper.

use crate::elements::OrbitalElements;
use crate::handles::{LightRef, RenderRef};
use nalgebra::{UnitQuaternion, Vector3};
use orrery_core::constants::GRAVITATIONAL_CONST;
use orrery_core::coordinates::LargeWorldCoord;
use std::f64::consts::TAU;

/// Default number of ticks between exact analytic re-fixes.
pub const DEFAULT_FIXATION_PERIOD: u32 = 100;

pub struct AstroBody {
    pub name: String,
    /// Mass, kg
    pub mass: f64,
    /// Standard gravitational parameter, m³/s²
    pub gm: f64,
    /// Equatorial radius, meters
    pub eq_radius: f64,
    /// Angular eccentricity of the spheroid, acos(1 - flattening)
    pub ang_ecc: f64,
    /// Axial tilt, radians
    pub obliquity: f64,
    /// Sidereal rotation period, seconds
    pub sidereal_period: f64,
    /// Osculating orbit around the parent; None only for the root body
    pub elements: Option<OrbitalElements>,
    pub position: LargeWorldCoord,
    pub orientation: UnitQuaternion<f64>,
    /// Current velocity, m/s (coast chord between analytic fixes)
    pub velocity: Vector3<f64>,
    /// Ticks left until the next exact analytic re-fix, in
    /// [0, fixation_period]
    pub fixation: u32,
    pub fixation_period: u32,
    pub render: Option<RenderRef>,
    pub light: Option<LightRef>,
}

impl AstroBody {
    /// Create a body. A non-normal `gm` (the NaN sentinel in source data)
    /// is derived from the mass instead; supplying GM directly avoids the
    /// float error of the multiplication for well-measured bodies.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        mass: f64,
        gm: f64,
        position: LargeWorldCoord,
        orientation: UnitQuaternion<f64>,
        sidereal_period: f64,
        obliquity_deg: f64,
        eq_radius: f64,
        flattening: f64,
    ) -> Self {
        let gm = if gm.is_normal() {
            gm
        } else {
            mass * GRAVITATIONAL_CONST
        };

        Self {
            name: name.to_owned(),
            mass,
            gm,
            eq_radius,
            // flattening = 1 - cos(angEcc)
            ang_ecc: (1.0 - flattening).acos(),
            obliquity: obliquity_deg.to_radians(),
            sidereal_period,
            elements: None,
            position,
            orientation,
            velocity: Vector3::zeros(),
            fixation: 0,
            fixation_period: DEFAULT_FIXATION_PERIOD,
            render: None,
            light: None,
        }
    }

    /// Orientation at time `t` seconds: the orbital plane (identity at the
    /// root), tilted by the obliquity, spun by the fraction of the sidereal
    /// period elapsed.
    pub fn sidereal_orientation_at(&self, t: f64) -> UnitQuaternion<f64> {
        let base = self
            .elements
            .as_ref()
            .map(|el| el.orientation())
            .unwrap_or_else(UnitQuaternion::identity);

        let tilt = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.obliquity);
        let spin_frac = (t / self.sidereal_period).fract();
        let spin = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), spin_frac * TAU);

        base * tilt * spin
    }

    /// Absolute position in meters.
    pub fn global_position(&self) -> Vector3<f64> {
        self.position.global()
    }
}

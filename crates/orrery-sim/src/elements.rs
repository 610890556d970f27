//! Keplerian orbital elements
//!
//! An osculating two-body ellipse plus a fixed orientation quaternion,
//! computed once at construction. Elements never change after construction;
//! secular perturbation is out of scope.

use crate::error::SimError;
use crate::kepler;
use nalgebra::{UnitQuaternion, Vector3};
use std::f64::consts::PI;

/// Semi-minor axis b = a·sqrt(1 - e²).
pub fn semi_minor_axis(a: f64, ecc: f64) -> f64 {
    a * (1.0 - ecc * ecc).sqrt()
}

/// Eccentricity recovered from both axes, e = sqrt((a² - b²) / a²).
pub fn eccentricity_from_axes(a: f64, b: f64) -> f64 {
    ((a * a - b * b) / (a * a)).sqrt()
}

/// Classical Keplerian orbital elements, angles stored in radians.
#[derive(Clone, Debug)]
pub struct OrbitalElements {
    /// Eccentricity, in [0, 1)
    pub ecc: f64,
    /// Semi-major axis, meters
    pub semi_major: f64,
    /// Derived semi-minor axis, meters
    pub semi_minor: f64,
    /// Inclination
    pub inclination: f64,
    /// Longitude of the ascending node
    pub long_asc: f64,
    /// Argument of periapsis
    pub arg_periapsis: f64,
    /// Mean anomaly at epoch
    pub mean_anomaly_epoch: f64,
    // Cached Rz(longAsc)·Ry(inc)·Rz(argPeri); never recomputed
    orientation: UnitQuaternion<f64>,
}

impl OrbitalElements {
    /// Build elements from eccentricity and semi-major axis; the angular
    /// arguments are taken in degrees, as source data supplies them.
    ///
    /// Rejects `ecc` outside [0, 1) and non-positive `semi_major` here so
    /// the solver never sees an invalid ellipse.
    pub fn new(
        ecc: f64,
        semi_major: f64,
        inc_deg: f64,
        long_asc_deg: f64,
        arg_periapsis_deg: f64,
        mean_anomaly_deg: f64,
    ) -> Result<Self, SimError> {
        if !(0.0..1.0).contains(&ecc) || !ecc.is_finite() {
            return Err(SimError::Domain(format!(
                "eccentricity {} outside [0, 1)",
                ecc
            )));
        }
        if semi_major <= 0.0 || !semi_major.is_finite() {
            return Err(SimError::Domain(format!(
                "semi-major axis {} not positive",
                semi_major
            )));
        }

        let inclination = inc_deg.to_radians();
        let long_asc = long_asc_deg.to_radians();
        let arg_periapsis = arg_periapsis_deg.to_radians();

        Ok(Self {
            ecc,
            semi_major,
            semi_minor: semi_minor_axis(semi_major, ecc),
            inclination,
            long_asc,
            arg_periapsis,
            mean_anomaly_epoch: mean_anomaly_deg.to_radians(),
            orientation: orbital_orientation(long_asc, inclination, arg_periapsis),
        })
    }

    /// Build elements from semi-major and semi-minor axes, the alternate
    /// form world descriptions may use.
    pub fn from_axes(
        semi_major: f64,
        semi_minor: f64,
        inc_deg: f64,
        long_asc_deg: f64,
        arg_periapsis_deg: f64,
        mean_anomaly_deg: f64,
    ) -> Result<Self, SimError> {
        Self::new(
            eccentricity_from_axes(semi_major, semi_minor),
            semi_major,
            inc_deg,
            long_asc_deg,
            arg_periapsis_deg,
            mean_anomaly_deg,
        )
    }

    /// Fixed orientation of the orbital plane.
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.orientation
    }

    /// Position relative to the orbited body at time `t` seconds.
    ///
    /// Pure analytic two-body solution: eccentric anomaly via the solver,
    /// planar coordinates with +y toward periapsis, then the cached plane
    /// orientation.
    pub fn position_at(&self, gm: f64, t: f64) -> Vector3<f64> {
        let n = kepler::mean_motion(gm, self.semi_major);
        let e = kepler::eccentric_anomaly(self.ecc, n, t);

        // y points toward the periapsis, so x runs along -b·sin(E)
        let y = self.semi_major * e.cos() - self.semi_major * self.ecc;
        let x = -self.semi_minor * e.sin();

        self.orientation * Vector3::new(x, y, 0.0)
    }

    /// Velocity estimate at time `t` seconds.
    ///
    /// Direction is the orbit normal crossed with the current position,
    /// scaled to the mean orbital speed 2πa/T. Not a vis-viva vector: good
    /// enough for display and coast extrapolation, which is all it feeds.
    pub fn velocity_estimate(&self, gm: f64, t: f64) -> Vector3<f64> {
        let up = self.orientation * Vector3::z();
        let position = self.position_at(gm, t);

        let speed = (2.0 * PI * self.semi_major) / kepler::orbital_period(self.semi_major, gm);
        up.cross(&position).normalize() * speed
    }
}

/// Orientation of the orbital plane: Rz(longAsc)·Ry(inc)·Rz(argPeri).
fn orbital_orientation(long_asc: f64, inc: f64, arg_periapsis: f64) -> UnitQuaternion<f64> {
    let q_asc = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), long_asc);
    let q_inc = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), inc);
    let q_aps = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), arg_periapsis);
    q_asc * q_inc * q_aps
}

#[cfg(test)]
mod tests {
    use super::*;

    const MU_EARTH: f64 = 3.986004418e14;

    #[test]
    fn test_rejects_bad_domain() {
        assert!(OrbitalElements::new(1.0, 1.0e9, 0.0, 0.0, 0.0, 0.0).is_err());
        assert!(OrbitalElements::new(-0.1, 1.0e9, 0.0, 0.0, 0.0, 0.0).is_err());
        assert!(OrbitalElements::new(0.5, 0.0, 0.0, 0.0, 0.0, 0.0).is_err());
        assert!(OrbitalElements::new(0.5, -1.0e9, 0.0, 0.0, 0.0, 0.0).is_err());
        assert!(OrbitalElements::new(f64::NAN, 1.0e9, 0.0, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_angles_converted_to_radians() {
        let el = OrbitalElements::new(0.1, 1.0e9, 90.0, 180.0, 45.0, 30.0)
            .expect("valid elements");
        assert!((el.inclination - PI / 2.0).abs() < 1e-12);
        assert!((el.long_asc - PI).abs() < 1e-12);
        assert!((el.arg_periapsis - PI / 4.0).abs() < 1e-12);
        assert!((el.mean_anomaly_epoch - PI / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_periapsis_at_epoch() {
        // At t = 0 with zero mean anomaly the body sits at periapsis,
        // a·(1 - e) from the focus
        let a = 1.0e10;
        let ecc = 0.3;
        let el = OrbitalElements::new(ecc, a, 12.0, 34.0, 56.0, 0.0).expect("valid elements");

        let r = el.position_at(MU_EARTH, 0.0).norm();
        assert!(
            (r - a * (1.0 - ecc)).abs() < 1e-3,
            "distance from focus {} != {}",
            r,
            a * (1.0 - ecc)
        );
    }

    #[test]
    fn test_from_axes_matches_eccentricity_form() {
        let a = 2.0e9;
        let ecc = 0.25;
        let b = semi_minor_axis(a, ecc);

        let from_ecc = OrbitalElements::new(ecc, a, 5.0, 10.0, 15.0, 0.0).expect("valid");
        let from_axes = OrbitalElements::from_axes(a, b, 5.0, 10.0, 15.0, 0.0).expect("valid");

        assert!((from_ecc.ecc - from_axes.ecc).abs() < 1e-12);
        let t = 1.0e5;
        let d = from_ecc.position_at(MU_EARTH, t) - from_axes.position_at(MU_EARTH, t);
        assert!(d.norm() < 1e-3);
    }

    #[test]
    fn test_planar_orbit_stays_in_plane() {
        // Zero inclination keeps z identically zero
        let el = OrbitalElements::new(0.1, 1.0e9, 0.0, 0.0, 0.0, 0.0).expect("valid");
        for t in [0.0, 1.0e4, 5.0e4, 2.0e5] {
            let p = el.position_at(MU_EARTH, t);
            assert!(p.z.abs() < 1e-6, "z = {} at t = {}", p.z, t);
        }
    }

    #[test]
    fn test_velocity_estimate_is_tangential_mean_speed() {
        let a = 3.844e8;
        let el = OrbitalElements::new(0.0549, a, 5.145, 125.08, 318.15, 0.0).expect("valid");

        let t = 86400.0;
        let v = el.velocity_estimate(MU_EARTH, t);
        let p = el.position_at(MU_EARTH, t);

        // Perpendicular to the radius vector and the orbit normal by
        // construction, with mean orbital speed
        assert!(v.dot(&p).abs() / (v.norm() * p.norm()) < 1e-9);
        let mean_speed = 2.0 * PI * a / kepler::orbital_period(a, MU_EARTH);
        assert!((v.norm() - mean_speed).abs() < 1e-9);
    }
}

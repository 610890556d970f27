//! World-description configuration
//!
//! A thin, serde-deserializable representation of a star system: one star,
//! its planets, their moons. The builder turns a description into a live
//! [`World`]. Distance units in source data are inconsistent — planets give
//! their semi-major axis in AU, moons in meters — and are normalized here,
//! explicitly.
//!
//! A description looks like:
//!
//! ```json
//! {
//!   "star": {
//!     "name": "Sol",
//!     "physical": {
//!       "mass": 1.989e30,
//!       "gm": 1.32712440018e20,
//!       "radius": 6.96e8,
//!       "sidereal-rotational-period": 2192832.0
//!     },
//!     "satellites": [
//!       {
//!         "name": "Earth",
//!         "physical": { "mass": 5.9722e24, "radius": 6.371e6,
//!                       "axial-tilt": 23.44, "flattening": 0.00335,
//!                       "sidereal-rotational-period": 86164.1 },
//!         "orbit": { "semimajor-axis": 1.00000011, "eccentricity": 0.0167,
//!                    "inclination": 0.00005,
//!                    "longitude-ascending-node": -11.26064,
//!                    "longitude-periapsis": 102.94719,
//!                    "mean-longitude": 100.46435 },
//!         "satellites": []
//!       }
//!     ]
//!   }
//! }
//! ```

use crate::body::AstroBody;
use crate::elements::OrbitalElements;
use crate::error::SimError;
use crate::kepler;
use crate::system::{NodeId, World};
use anyhow::Context;
use nalgebra::{UnitQuaternion, Vector3};
use orrery_core::constants::AU;
use orrery_core::coordinates::LargeWorldCoord;
use serde::Deserialize;
use std::path::Path;

/// Top-level world description.
#[derive(Deserialize, Debug)]
pub struct WorldConfig {
    pub star: StarConfig,
}

/// The system root. Never carries an orbit.
#[derive(Deserialize, Debug)]
pub struct StarConfig {
    pub name: String,
    pub physical: PhysicalConfig,
    #[serde(default)]
    pub rendering: Option<RenderingConfig>,
    #[serde(default)]
    pub satellites: Vec<SatelliteConfig>,
}

/// A planet or moon: physical parameters, an orbit, optionally more
/// satellites below it.
#[derive(Deserialize, Debug)]
pub struct SatelliteConfig {
    pub name: String,
    pub physical: PhysicalConfig,
    pub orbit: OrbitConfig,
    #[serde(default)]
    pub rendering: Option<RenderingConfig>,
    #[serde(default)]
    pub satellites: Vec<SatelliteConfig>,
}

#[derive(Deserialize, Debug)]
pub struct PhysicalConfig {
    /// Mass, kg
    pub mass: f64,
    /// Standard gravitational parameter, m³/s². Absent means "derive from
    /// the mass"; supplying it directly keeps well-measured values exact.
    pub gm: Option<f64>,
    /// Equatorial radius, meters
    pub radius: f64,
    #[serde(default)]
    pub flattening: f64,
    /// Degrees
    #[serde(rename = "axial-tilt", default)]
    pub axial_tilt: f64,
    /// Seconds
    #[serde(rename = "sidereal-rotational-period")]
    pub sidereal_period: f64,
}

/// Orbit parameters, angles in degrees. Either the eccentricity or the
/// semi-minor axis describes the ellipse shape.
#[derive(Deserialize, Debug)]
pub struct OrbitConfig {
    /// AU for planets, meters for moons
    #[serde(rename = "semimajor-axis")]
    pub semi_major: f64,
    pub eccentricity: Option<f64>,
    /// Same unit as the semi-major axis
    #[serde(rename = "semiminor-axis")]
    pub semi_minor: Option<f64>,
    pub inclination: f64,
    #[serde(rename = "longitude-ascending-node")]
    pub long_asc: f64,
    #[serde(rename = "longitude-periapsis")]
    pub long_periapsis: f64,
    #[serde(rename = "mean-longitude")]
    pub mean_longitude: f64,
}

/// Scene-side hints the core carries through untouched.
#[derive(Deserialize, Debug)]
pub struct RenderingConfig {
    pub texture: Option<String>,
    pub model: Option<String>,
}

#[derive(Clone, Copy)]
enum DistanceUnit {
    /// Planet orbits are described in astronomical units
    Au,
    /// Moon orbits are described in meters already
    Metres,
}

impl DistanceUnit {
    fn to_metres(self, value: f64) -> f64 {
        match self {
            DistanceUnit::Au => value * AU,
            DistanceUnit::Metres => value,
        }
    }
}

/// Build a live world from a description. A malformed planet or moon aborts
/// its own subtree only: it is logged and skipped, the rest of the world
/// loads. A malformed star fails the whole build — there is no world
/// without a root.
pub fn build_world(config: &WorldConfig) -> Result<World, SimError> {
    let star = &config.star;
    validate_physical(&star.name, &star.physical)?;

    let tilt = UnitQuaternion::from_axis_angle(
        &Vector3::x_axis(),
        star.physical.axial_tilt.to_radians(),
    );
    let body = AstroBody::new(
        &star.name,
        star.physical.mass,
        star.physical.gm.unwrap_or(f64::NAN),
        LargeWorldCoord::origin(),
        tilt,
        star.physical.sidereal_period,
        star.physical.axial_tilt,
        star.physical.radius,
        star.physical.flattening,
    );
    let mut world = World::new(&star.name, body);

    let root = world.root();
    for planet in &star.satellites {
        if let Err(err) = build_satellite(&mut world, root, planet, DistanceUnit::Au) {
            tracing::warn!(name = %planet.name, %err, "skipping malformed subtree");
        }
    }

    world.init();
    tracing::info!(name = %world.name, bodies = world.node_count(), "world loaded");
    Ok(world)
}

fn build_satellite(
    world: &mut World,
    parent: NodeId,
    cfg: &SatelliteConfig,
    unit: DistanceUnit,
) -> Result<NodeId, SimError> {
    validate_physical(&cfg.name, &cfg.physical)?;
    let elements = orbit_elements(&cfg.name, &cfg.orbit, unit)?;

    let parent_gm = world
        .node(parent)
        .map(|node| node.body.gm)
        .ok_or_else(|| SimError::Configuration(format!("{}: parent node missing", cfg.name)))?;

    // Initial orientation: the orbital plane tilted by the axial tilt; the
    // first position sync replaces it with the full sidereal orientation
    let orientation = elements.orientation()
        * UnitQuaternion::from_axis_angle(
            &Vector3::x_axis(),
            cfg.physical.axial_tilt.to_radians(),
        );

    let mut body = AstroBody::new(
        &cfg.name,
        cfg.physical.mass,
        cfg.physical.gm.unwrap_or(f64::NAN),
        LargeWorldCoord::origin(),
        orientation,
        cfg.physical.sidereal_period,
        cfg.physical.axial_tilt,
        cfg.physical.radius,
        cfg.physical.flattening,
    );
    let period = kepler::orbital_period(elements.semi_major, parent_gm + body.gm);
    body.elements = Some(elements);

    let id = world.add_child_system(parent, body, period)?;

    for moon in &cfg.satellites {
        if let Err(err) = build_satellite(world, id, moon, DistanceUnit::Metres) {
            tracing::warn!(name = %moon.name, %err, "skipping malformed subtree");
        }
    }
    Ok(id)
}

fn orbit_elements(
    name: &str,
    orbit: &OrbitConfig,
    unit: DistanceUnit,
) -> Result<OrbitalElements, SimError> {
    let fields = [
        ("semimajor-axis", orbit.semi_major),
        ("inclination", orbit.inclination),
        ("longitude-ascending-node", orbit.long_asc),
        ("longitude-periapsis", orbit.long_periapsis),
        ("mean-longitude", orbit.mean_longitude),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(SimError::Configuration(format!(
                "{}: {} is not finite",
                name, field
            )));
        }
    }

    let semi_major = unit.to_metres(orbit.semi_major);
    match (orbit.eccentricity, orbit.semi_minor) {
        (Some(ecc), _) => OrbitalElements::new(
            ecc,
            semi_major,
            orbit.inclination,
            orbit.long_asc,
            orbit.long_periapsis,
            orbit.mean_longitude,
        ),
        (None, Some(semi_minor)) => OrbitalElements::from_axes(
            semi_major,
            unit.to_metres(semi_minor),
            orbit.inclination,
            orbit.long_asc,
            orbit.long_periapsis,
            orbit.mean_longitude,
        ),
        (None, None) => Err(SimError::Configuration(format!(
            "{}: orbit needs an eccentricity or a semiminor-axis",
            name
        ))),
    }
}

fn validate_physical(name: &str, physical: &PhysicalConfig) -> Result<(), SimError> {
    let fields = [
        ("mass", physical.mass),
        ("radius", physical.radius),
        ("sidereal-rotational-period", physical.sidereal_period),
        ("flattening", physical.flattening),
        ("axial-tilt", physical.axial_tilt),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(SimError::Configuration(format!(
                "{}: {} is not finite",
                name, field
            )));
        }
    }
    if physical.mass <= 0.0 {
        return Err(SimError::Configuration(format!(
            "{}: mass {} is not positive",
            name, physical.mass
        )));
    }
    if physical.sidereal_period == 0.0 {
        return Err(SimError::Configuration(format!(
            "{}: sidereal-rotational-period is zero",
            name
        )));
    }
    Ok(())
}

/// Parse a JSON world description and build it.
pub fn load_world(json: &str) -> anyhow::Result<World> {
    let config: WorldConfig =
        serde_json::from_str(json).context("parsing world description")?;
    Ok(build_world(&config)?)
}

pub fn load_world_file(path: &Path) -> anyhow::Result<World> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    load_world(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::constants::GRAVITATIONAL_CONST;

    const SOL: &str = r#"{
      "star": {
        "name": "Sol",
        "physical": {
          "mass": 1.989e30,
          "gm": 1.32712440018e20,
          "radius": 6.96e8,
          "sidereal-rotational-period": 2192832.0
        },
        "satellites": [
          {
            "name": "Earth",
            "physical": {
              "mass": 5.9722e24,
              "gm": 3.986004418e14,
              "radius": 6.371e6,
              "flattening": 0.00335,
              "axial-tilt": 23.44,
              "sidereal-rotational-period": 86164.1
            },
            "orbit": {
              "semimajor-axis": 1.00000011,
              "eccentricity": 0.01671022,
              "inclination": 0.00005,
              "longitude-ascending-node": -11.26064,
              "longitude-periapsis": 102.94719,
              "mean-longitude": 100.46435
            },
            "satellites": [
              {
                "name": "Luna",
                "physical": {
                  "mass": 7.342e22,
                  "radius": 1.7374e6,
                  "axial-tilt": 6.68,
                  "sidereal-rotational-period": 2360591.0
                },
                "orbit": {
                  "semimajor-axis": 3.844e8,
                  "eccentricity": 0.0549,
                  "inclination": 5.145,
                  "longitude-ascending-node": 125.08,
                  "longitude-periapsis": 318.15,
                  "mean-longitude": 135.27
                }
              }
            ]
          }
        ]
      }
    }"#;

    #[test]
    fn test_builds_full_tree() {
        let world = load_world(SOL).expect("world loads");

        assert_eq!(world.node_count(), 3);
        assert!(world.lookup("Sol/Earth/Luna").is_some());
    }

    #[test]
    fn test_planet_distances_normalized_from_au() {
        let world = load_world(SOL).expect("world loads");

        let earth = world.node(world.lookup("Sol/Earth").expect("earth")).expect("node");
        let elements = earth.body.elements.as_ref().expect("elements");
        // 1.00000011 AU, in meters
        assert!((elements.semi_major - 1.00000011 * AU).abs() < 1.0);

        // One Earth year, within a day
        assert!(
            (earth.orbital_period - 365.25 * 86400.0).abs() < 86400.0,
            "period {}",
            earth.orbital_period
        );
    }

    #[test]
    fn test_moon_distances_already_in_metres() {
        let world = load_world(SOL).expect("world loads");

        let luna = world.node(world.lookup("Sol/Earth/Luna").expect("luna")).expect("node");
        let elements = luna.body.elements.as_ref().expect("elements");
        assert!((elements.semi_major - 3.844e8).abs() < 1.0);
    }

    #[test]
    fn test_gm_derived_when_absent() {
        let world = load_world(SOL).expect("world loads");

        // Luna's description has no gm
        let luna = world.node(world.lookup("Sol/Earth/Luna").expect("luna")).expect("node");
        let expected = 7.342e22 * GRAVITATIONAL_CONST;
        assert!((luna.body.gm - expected).abs() / expected < 1e-12);

        // Earth's does
        let earth = world.node(world.lookup("Sol/Earth").expect("earth")).expect("node");
        assert_eq!(earth.body.gm, 3.986004418e14);
    }

    #[test]
    fn test_semiminor_axis_form() {
        let json = SOL.replace(
            r#""eccentricity": 0.0549,"#,
            r#""semiminor-axis": 3.8382e8,"#,
        );
        let world = load_world(&json).expect("world loads");

        let luna = world.node(world.lookup("Sol/Earth/Luna").expect("luna")).expect("node");
        let elements = luna.body.elements.as_ref().expect("elements");
        assert!(
            (elements.ecc - 0.0549).abs() < 1e-3,
            "recovered eccentricity {}",
            elements.ecc
        );
    }

    #[test]
    fn test_malformed_subtree_skipped_not_fatal() {
        // Earth's eccentricity pushed out of domain: Earth and Luna are
        // skipped, Sol still loads
        let json = SOL.replace(r#""eccentricity": 0.01671022,"#, r#""eccentricity": 1.5,"#);
        let world = load_world(&json).expect("world still loads");

        assert_eq!(world.node_count(), 1);
        assert_eq!(world.lookup("Sol/Earth"), None);
    }

    #[test]
    fn test_negative_mass_rejected_per_subtree() {
        let json = SOL.replace(r#""mass": 7.342e22,"#, r#""mass": -7.342e22,"#);
        let world = load_world(&json).expect("world still loads");

        // Only Luna is dropped
        assert_eq!(world.node_count(), 2);
        assert!(world.lookup("Sol/Earth").is_some());
        assert_eq!(world.lookup("Sol/Earth/Luna"), None);
    }

    #[test]
    fn test_missing_shape_rejected() {
        let json = SOL.replace(r#""eccentricity": 0.0549,"#, "");
        let world = load_world(&json).expect("world still loads");
        assert_eq!(world.lookup("Sol/Earth/Luna"), None);
    }

    #[test]
    fn test_bad_star_fails_build() {
        let json = SOL.replace(r#""mass": 1.989e30,"#, r#""mass": -1.0,"#);
        assert!(load_world(&json).is_err());
    }
}

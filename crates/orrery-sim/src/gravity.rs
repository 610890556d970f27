//! Gravitational force contributions
//!
//! Restricted two-dominant-body model: a free body feels only its own
//! node's body and that node's parent, never the whole tree.

use crate::body::AstroBody;
use nalgebra::Vector3;
use orrery_core::coordinates::LargeWorldCoord;

/// Force on a target of mass `target_mass` at `target_pos`, exerted by
/// `source`, in newtons.
///
/// The separation is formed with the large-world difference so precision
/// holds at planetary distances.
pub fn compute_gravity(
    source: &AstroBody,
    target_pos: &LargeWorldCoord,
    target_mass: f64,
) -> Vector3<f64> {
    let delta = source.position.vector_to(target_pos);
    let r2 = delta.norm_squared();
    delta.normalize() * (-source.gm * target_mass / r2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::UnitQuaternion;

    fn earth_at_origin() -> AstroBody {
        AstroBody::new(
            "Earth",
            5.9722e24,
            3.986004418e14,
            LargeWorldCoord::origin(),
            UnitQuaternion::identity(),
            86164.1,
            0.0,
            6.371e6,
            0.0,
        )
    }

    #[test]
    fn test_magnitude_matches_inverse_square_law() {
        let earth = earth_at_origin();
        let target = LargeWorldCoord::new(1.0e7, 0.0, 0.0);

        let f = compute_gravity(&earth, &target, 1000.0);
        let expected = 3.986004418e14 * 1000.0 / (1.0e7f64 * 1.0e7);

        assert!(
            (f.norm() - expected).abs() / expected < 1e-3,
            "force {} vs expected {}",
            f.norm(),
            expected
        );
    }

    #[test]
    fn test_force_points_toward_source() {
        let earth = earth_at_origin();
        let target = LargeWorldCoord::new(1.0e7, 0.0, 0.0);

        let f = compute_gravity(&earth, &target, 1.0);
        assert!(f.x < 0.0, "pull must be toward the source");
        assert!(f.y.abs() < 1e-9 && f.z.abs() < 1e-9);
    }

    #[test]
    fn test_doubling_distance_quarters_force() {
        let earth = earth_at_origin();
        let near = LargeWorldCoord::new(1.0e7, 0.0, 0.0);
        let far = LargeWorldCoord::new(2.0e7, 0.0, 0.0);

        let ratio = compute_gravity(&earth, &near, 1.0).norm()
            / compute_gravity(&earth, &far, 1.0).norm();
        assert!((ratio - 4.0).abs() < 1e-9, "expected ~4x, got {}", ratio);
    }
}

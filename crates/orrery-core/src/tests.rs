use crate::constants::AU;
use crate::coordinates::*;
use nalgebra::Vector3;

#[test]
fn test_normalize_bounds_offset() {
    let coord = LargeWorldCoord::new(3.5 * SEGMENT_LEN, -1.25 * SEGMENT_LEN, 10.0);

    for i in 0..3 {
        assert!(
            coord.offs[i].abs() <= SEGMENT_LEN / 2.0 + 1e-9,
            "axis {} offset {} exceeds half segment",
            i,
            coord.offs[i]
        );
    }
    assert_eq!(coord.seg.x, 4);
    assert_eq!(coord.seg.y, -1);
    assert_eq!(coord.seg.z, 0);
}

#[test]
fn test_global_roundtrip() {
    let positions = [
        (0.0, 0.0, 0.0),
        (1.0, -2.0, 3.0),
        (SEGMENT_LEN, SEGMENT_LEN * 2.0, -SEGMENT_LEN),
        (AU, 0.3 * AU, -5.2 * AU),
    ];

    for (x, y, z) in positions {
        let coord = LargeWorldCoord::new(x, y, z);
        let back = coord.global();
        let tolerance = (x.abs() + y.abs() + z.abs()).max(1.0) * 1e-12;
        assert!((back.x - x).abs() < tolerance, "x mismatch at {}", x);
        assert!((back.y - y).abs() < tolerance, "y mismatch at {}", y);
        assert!((back.z - z).abs() < tolerance, "z mismatch at {}", z);
    }
}

#[test]
fn test_translate_accumulates() {
    let mut coord = LargeWorldCoord::origin();
    // Many sub-segment steps must land exactly on their sum
    for _ in 0..1000 {
        coord.translate(Vector3::new(1000.0, -250.0, 0.5));
    }

    let global = coord.global();
    assert!((global.x - 1.0e6).abs() < 1e-6);
    assert!((global.y + 2.5e5).abs() < 1e-6);
    assert!((global.z - 500.0).abs() < 1e-9);
}

#[test]
fn test_vector_to_nearby_at_au_scale() {
    // Two points 1 km apart at Jupiter distance: the difference must be
    // exact even though the absolute coordinates are ~7.8e11 m
    let a = LargeWorldCoord::new(5.2 * AU, 0.0, 0.0);
    let b = LargeWorldCoord::new(5.2 * AU + 1000.0, 0.0, 0.0);

    // Bounded by the f64 quantization of the inputs themselves (~1e-4 m at
    // this magnitude), not by the coordinate representation
    let d = a.vector_to(&b);
    assert!((d.x - 1000.0).abs() < 1e-3, "got {}", d.x);
    assert_eq!(d.y, 0.0);
    assert_eq!(d.z, 0.0);
}

#[test]
fn test_vector_to_is_antisymmetric() {
    let a = LargeWorldCoord::new(1.0 * AU, 2.0 * AU, -0.5 * AU);
    let b = LargeWorldCoord::new(-3.0 * AU, 0.25 * AU, 4.0 * AU);

    let ab = a.vector_to(&b);
    let ba = b.vector_to(&a);
    assert!((ab + ba).norm() < 1e-6);
}

#[test]
fn test_vector_to_crosses_segment_boundary() {
    let a = LargeWorldCoord::new(SEGMENT_LEN - 1.0, 0.0, 0.0);
    let b = LargeWorldCoord::new(SEGMENT_LEN + 1.0, 0.0, 0.0);

    let d = a.vector_to(&b);
    assert!((d.x - 2.0).abs() < 1e-9, "got {}", d.x);
}

//! End-to-end tests for the patch extraction pipeline

use ppfpatch_algorithms::normals::estimate_normals;
use ppfpatch_algorithms::patch::PatchBuilder;
use ppfpatch_algorithms::spatial::SpatialIndex;
use ppfpatch_core::{PatchConfig, Point3f, PointCloud, Vector3f};

/// 100 points on the z=0 plane around the origin, spaced well inside the
/// default vicinity radius.
fn plane_cloud_100() -> PointCloud {
    let spacing = 0.05;
    let mut points = Vec::new();
    for i in 0..10 {
        for j in 0..10 {
            let idx = (i * 10 + j) as f32;
            points.push(Point3f::new(
                i as f32 * spacing,
                j as f32 * spacing,
                idx * 1e-7,
            ));
        }
    }
    PointCloud::from_points(points)
}

#[test]
fn test_plane_with_uniform_normals_has_zero_normal_angle() {
    let mut cloud = plane_cloud_100();
    cloud
        .set_normals(vec![Vector3f::new(0.0, 0.0, 1.0); cloud.len()])
        .unwrap();
    let index = SpatialIndex::built(&cloud);

    let config = PatchConfig::default()
        .with_num_points_per_patch(32)
        .with_seed(123);
    let builder = PatchBuilder::new(config).unwrap();

    // Reference index 0 sits at the origin corner of the grid
    let batch = builder.build(&cloud, &index, &[0]).unwrap();
    assert_eq!(batch.shape(), &[1, 32, 4]);

    for row in 0..32 {
        let normal_angle = batch[[0, row, 2]];
        assert!(
            normal_angle.abs() < 1e-3,
            "row {}: normal-normal angle {} should vanish for parallel normals",
            row,
            normal_angle
        );
        let dist = batch[[0, row, 3]];
        assert!(dist > 0.0 && dist <= 0.3 + 1e-5, "row {}: distance {}", row, dist);
    }
}

#[test]
fn test_full_pipeline_shape_and_finiteness() {
    let mut cloud = plane_cloud_100();
    estimate_normals(&mut cloud, 10).unwrap();
    let index = SpatialIndex::built(&cloud);

    let config = PatchConfig::default()
        .with_num_points_per_patch(64)
        .with_normal_estimation_neighbors(10)
        .with_seed(7);
    let builder = PatchBuilder::new(config).unwrap();

    let refs = [0, 9, 45, 45, 90, 99];
    let batch = builder.build(&cloud, &index, &refs).unwrap();
    assert_eq!(batch.shape(), &[6, 64, 4]);
    for value in batch.iter() {
        assert!(value.is_finite());
    }
}

#[test]
fn test_duplicate_references_produce_independent_rows() {
    let mut cloud = plane_cloud_100();
    estimate_normals(&mut cloud, 10).unwrap();
    let index = SpatialIndex::built(&cloud);

    let config = PatchConfig::default()
        .with_num_points_per_patch(16)
        .with_seed(11);
    let builder = PatchBuilder::new(config).unwrap();

    // The same reference twice is legal and yields one row per occurrence
    let batch = builder.build(&cloud, &index, &[50, 50]).unwrap();
    assert_eq!(batch.shape(), &[2, 16, 4]);
}

#[test]
fn test_row_order_follows_reference_order() {
    let mut cloud = plane_cloud_100();
    cloud
        .set_normals(vec![Vector3f::new(0.0, 0.0, 1.0); cloud.len()])
        .unwrap();
    let index = SpatialIndex::built(&cloud);

    // One point per patch and a tight radius make each row's distance
    // feature identify its reference deterministically: the grid corner has
    // its lone nearest neighbor at spacing distance.
    let config = PatchConfig::default()
        .with_vicinity_radius(0.06)
        .with_num_points_per_patch(4)
        .with_seed(5);
    let builder = PatchBuilder::new(config).unwrap();

    let batch = builder.build(&cloud, &index, &[0, 55]).unwrap();

    // Corner point 0 has exactly 2 neighbors within 0.06 (at 0.05 each);
    // interior point 55 has 4 (also at 0.05). Distances confirm each row
    // belongs to its reference.
    for row in 0..4 {
        let d0 = batch[[0, row, 3]];
        let d1 = batch[[1, row, 3]];
        assert!((d0 - 0.05).abs() < 1e-4, "corner row {}: {}", row, d0);
        assert!((d1 - 0.05).abs() < 1e-4, "interior row {}: {}", row, d1);
    }
}

#[test]
fn test_determinism_across_builders() {
    let mut cloud = plane_cloud_100();
    estimate_normals(&mut cloud, 10).unwrap();
    let index = SpatialIndex::built(&cloud);

    let config = PatchConfig::default()
        .with_num_points_per_patch(32)
        .with_seed(2024);

    let first = PatchBuilder::new(config.clone())
        .unwrap()
        .build(&cloud, &index, &[1, 2, 3])
        .unwrap();
    let second = PatchBuilder::new(config)
        .unwrap()
        .build(&cloud, &index, &[1, 2, 3])
        .unwrap();
    assert_eq!(first, second);
}

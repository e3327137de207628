//! Basic usage demo for ppfpatch
//!
//! This demo walks through the extraction pipeline on a synthetic cloud:
//! - Creating a point cloud
//! - Estimating surface normals
//! - Building the spatial index
//! - Extracting a batch of PPF patches

use ppfpatch_algorithms::{estimate_normals, PatchBuilder, SpatialIndex};
use ppfpatch_core::{PatchConfig, Point3f, PointCloud};

fn main() -> anyhow::Result<()> {
    println!("ppfpatch Basic Usage");
    println!("====================");

    // A synthetic sphere of points
    let mut points = Vec::new();
    for i in 1..40 {
        let theta = std::f32::consts::PI * i as f32 / 40.0;
        for j in 0..80 {
            let phi = 2.0 * std::f32::consts::PI * j as f32 / 80.0;
            points.push(Point3f::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            ));
        }
    }
    let mut cloud = PointCloud::from_points(points);
    println!("Created point cloud with {} points", cloud.len());

    // Normals via local plane fits
    estimate_normals(&mut cloud, 20)?;
    let failed = cloud
        .normals()
        .unwrap()
        .iter()
        .filter(|n| n.norm() < 0.5)
        .count();
    println!("Estimated normals ({} degenerate)", failed);

    // Spatial index and patch extraction
    let index = SpatialIndex::built(&cloud);
    let config = PatchConfig::default()
        .with_num_points_per_patch(256)
        .with_seed(42);
    let builder = PatchBuilder::new(config)?;

    let references = [0, 100, 500, 1500, 3000];
    let batch = builder.build(&cloud, &index, &references)?;
    println!(
        "Built patch batch of shape [{}, {}, {}]",
        batch.shape()[0],
        batch.shape()[1],
        batch.shape()[2]
    );

    // Each row is [angle(n_ref, d), angle(n_nbr, d), angle(n_ref, n_nbr), |d|]
    println!("First feature row: {:?}", [
        batch[[0, 0, 0]],
        batch[[0, 0, 1]],
        batch[[0, 0, 2]],
        batch[[0, 0, 3]],
    ]);

    Ok(())
}

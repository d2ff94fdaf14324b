use bevy_sdf_volume::{
    VolumeSampler,
    block::BlockGrid,
    field::{SphereConfig, SphereField},
    generate,
    quantize::DISTANCE_STEP,
    region::SamplingRegion,
    types::{Point, ScalarField},
};

const RESOLUTION: usize = 16;

fn sphere_at(center: Point) -> SphereField {
    SphereField::new(SphereConfig {
        center,
        radius: 0.2,
    })
}

fn unit_region() -> SamplingRegion {
    SamplingRegion::new(Point::new(-0.5, -0.5, -0.5), 1.0).unwrap()
}

#[test]
fn every_voxel_decodes_to_its_center_distance() {
    let sphere = sphere_at(Point::origin());
    let volume = generate(&sphere, &unit_region(), RESOLUTION);

    for z in 0..RESOLUTION {
        for y in 0..RESOLUTION {
            for x in 0..RESOLUTION {
                let expected = sphere.distance(volume.voxel_center(x, y, z));
                let decoded = volume.distance_at(x, y, z);
                assert!(
                    (decoded - expected).abs() <= DISTANCE_STEP,
                    "({x}, {y}, {z}): {decoded} vs {expected}"
                );
            }
        }
    }
}

#[test]
fn surface_voxel_is_within_a_texel() {
    let volume = generate(&sphere_at(Point::origin()), &unit_region(), RESOLUTION);
    let texel_size = volume.texel_size();
    assert_eq!(texel_size, 1.0 / 16.0);

    let nearest = (0..RESOLUTION.pow(3))
        .map(|i| {
            let (x, y, z) = (i % RESOLUTION, i / RESOLUTION % RESOLUTION, i / RESOLUTION.pow(2));
            volume.distance_at(x, y, z).abs()
        })
        .fold(f32::INFINITY, f32::min);
    assert!(nearest <= texel_size, "closest decoded distance {nearest}");
}

#[test]
fn corners_are_farthest() {
    let volume = generate(&sphere_at(Point::origin()), &unit_region(), RESOLUTION);
    let last = RESOLUTION - 1;
    let corner = volume.distance_at(0, 0, 0);
    // 0.46875·√3 − 0.2
    assert!((corner - 0.6119).abs() <= DISTANCE_STEP);
    assert_eq!(volume.distance_at(last, last, last), corner);
    assert_eq!(
        volume.distance_bytes().iter().max(),
        Some(&volume.distance_bytes()[0])
    );
}

#[test]
fn distant_sphere_saturates_every_voxel() {
    // Same region, sphere pushed 5 units away: every sample is beyond +4.
    let volume = generate(
        &sphere_at(Point::new(0.0, 0.0, -5.0)),
        &unit_region(),
        RESOLUTION,
    );
    assert!(volume.distance_bytes().iter().all(|&b| b == 255));
    assert!((volume.distance_at(0, 0, 0) - 3.96875).abs() < 1e-6);
}

#[test]
fn surface_normals_point_outward() {
    let sphere = sphere_at(Point::origin());
    let volume = generate(&sphere, &unit_region(), RESOLUTION);

    let mut checked = 0;
    for z in 0..RESOLUTION {
        for y in 0..RESOLUTION {
            for x in 0..RESOLUTION {
                let center = volume.voxel_center(x, y, z);
                if sphere.distance(center).abs() > 0.1 {
                    continue;
                }
                let radial = center.coords.normalize();
                let normal = volume.normal_at(x, y, z);
                assert!(normal.dot(&radial) > 0.97, "({x}, {y}, {z}): {normal}");
                checked += 1;
            }
        }
    }
    assert!(checked > 0);
}

#[test]
fn single_voxel_volume() {
    let volume = generate(&sphere_at(Point::origin()), &unit_region(), 1);
    assert_eq!(volume.distance_bytes().len(), 1);
    assert_eq!(volume.normal_bytes().len(), 3);
    assert_eq!(volume.voxel_center(0, 0, 0), Point::origin());
}

#[test]
fn blocks_match_a_single_volume_within_one_step() {
    const BLOCKS: usize = 5;
    const BLOCK_VOXELS: usize = 8;

    let center = Point::new(0.0, 0.0, -5.0);
    let sphere = sphere_at(center);
    let region = SamplingRegion::centered(center, 1.0).unwrap();

    let grid = BlockGrid::new(region, BLOCKS, BLOCK_VOXELS).unwrap();
    let blocks = grid.generate(&sphere, &VolumeSampler::default());
    let whole = generate(&sphere, &region, BLOCKS * BLOCK_VOXELS);

    for k in 0..BLOCKS {
        for j in 0..BLOCKS {
            for i in 0..BLOCKS {
                let block = &blocks[k * BLOCKS * BLOCKS + j * BLOCKS + i];
                for z in 0..BLOCK_VOXELS {
                    for y in 0..BLOCK_VOXELS {
                        for x in 0..BLOCK_VOXELS {
                            let a = block.distance_bytes()[block.index(x, y, z)];
                            let b = whole.distance_bytes()[whole.index(
                                i * BLOCK_VOXELS + x,
                                j * BLOCK_VOXELS + y,
                                k * BLOCK_VOXELS + z,
                            )];
                            assert!(a.abs_diff(b) <= 1, "block ({i}, {j}, {k}) voxel ({x}, {y}, {z})");
                        }
                    }
                }
            }
        }
    }
}

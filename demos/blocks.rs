use std::sync::Arc;

use bevy::prelude::*;
use bevy_infinite_grid::{InfiniteGridBundle, InfiniteGridPlugin, InfiniteGridSettings};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};
use bevy_sdf_volume::{
    SdfVolumePlugin,
    block::{Block, BlockGrid},
    field::{SphereConfig, SphereField},
    plugin::{SdfVolumeConfig, VolumeTextures},
    region::SamplingRegion,
    types::{Point, ScalarField},
};

const BLOCKS: usize = 5;
const BLOCK_VOXELS: usize = 8;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            SdfVolumePlugin {
                config: SdfVolumeConfig {
                    max_tasks_per_frame: 16,
                    ..default()
                },
            },
            PanOrbitCameraPlugin,
            InfiniteGridPlugin,
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, (debug, report_progress))
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(InfiniteGridBundle {
        settings: InfiniteGridSettings {
            fadeout_distance: 100.0,
            ..Default::default()
        },
        ..Default::default()
    });

    let sphere_center = Point::new(0.0, 0.0, -5.0);

    commands.spawn((
        Camera3d::default(),
        PanOrbitCamera {
            button_orbit: MouseButton::Right,
            button_pan: MouseButton::Middle,
            focus: Vec3::new(sphere_center.x, sphere_center.y, sphere_center.z),
            target_focus: Vec3::new(sphere_center.x, sphere_center.y, sphere_center.z),
            ..default()
        },
        Transform::from_xyz(1.5, 1.5, -3.0).looking_at(Vec3::new(0.0, 0.0, -5.0), Vec3::Y),
    ));

    let field: Arc<dyn ScalarField> = Arc::new(SphereField::new(SphereConfig {
        center: sphere_center,
        radius: 0.2,
    }));

    let region = SamplingRegion::centered(sphere_center, 1.0).expect("volume size is positive");
    let grid = BlockGrid::new(region, BLOCKS, BLOCK_VOXELS).expect("at least one block");

    for block in grid.blocks(field) {
        let origin = block.origin();
        commands.spawn((block, Transform::from_xyz(origin.x, origin.y, origin.z)));
    }
}

fn report_progress(
    uploaded: Query<(), Added<VolumeTextures>>,
    all: Query<(), With<Block>>,
    ready: Query<(), With<VolumeTextures>>,
) {
    if !uploaded.is_empty() {
        bevy::log::info!("{}/{} blocks uploaded", ready.iter().count(), all.iter().count());
    }
}

fn debug(mut gizmos: Gizmos, query: Query<(&Block, Option<&VolumeTextures>)>) {
    for (block, textures) in query.iter() {
        let half_extents = Vec3::splat(block.region.edge_length() / 2.0);
        let origin = block.origin();
        let center = Vec3::new(origin.x, origin.y, origin.z) + half_extents;
        let color = match textures {
            Some(_) => Color::Srgba(Srgba::new(0., 1., 0., 0.4)),
            None => Color::WHITE,
        };
        gizmos.cube(
            Transform::from_translation(center).with_scale(half_extents * 2.0),
            color,
        );
    }
}

use bevy::prelude::*;
use bevy_sdf_volume::{
    SdfVolumePlugin,
    block::Block,
    field::{SphereConfig, SphereField},
    plugin::{GeneratedVolume, VolumeTextures},
    region::SamplingRegion,
    types::Point,
};

const RESOLUTION: usize = 16;

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, SdfVolumePlugin::default()))
        .add_systems(Startup, setup)
        .add_systems(Update, (print_middle_slice, debug))
        .run();
}

fn setup(mut commands: Commands) {
    bevy::log::info!("Sphere Example");

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(1.2, 1.4, 1.2).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let region = SamplingRegion::new(Point::new(-0.5, -0.5, -0.5), 1.0)
        .expect("unit region is valid");
    let sphere = SphereField::new(SphereConfig {
        center: Point::origin(),
        radius: 0.2,
    });

    commands.spawn((
        Block::new(sphere, region, RESOLUTION),
        Transform::from_xyz(-0.5, -0.5, -0.5),
    ));
}

fn print_middle_slice(query: Query<&GeneratedVolume, Added<GeneratedVolume>>) {
    for volume in query.iter() {
        bevy::log::info!("distance slice z = {}:", RESOLUTION / 2);
        if let Err(err) = volume.print_slice(RESOLUTION / 2) {
            bevy::log::error!("{err}");
        }
    }
}

fn debug(mut gizmos: Gizmos, query: Query<(&Block, Option<&VolumeTextures>)>) {
    for (block, textures) in query.iter() {
        let size = block.region.edge_length();
        let center = block.region.center();
        let color = if textures.is_some() {
            Color::srgb(0., 1., 0.)
        } else {
            Color::WHITE
        };
        gizmos.cube(
            Transform::from_xyz(center.x, center.y, center.z).with_scale(Vec3::splat(size)),
            color,
        );
    }
}

//! Samples a noise-displaced sphere with several probe offsets and logs how far the
//! estimated normals drift from the undisplaced sphere's normals.

use bevy::prelude::*;
use bevy_sdf_volume::{
    VolumeSampler,
    region::SamplingRegion,
    types::{Point, Value},
};
use noiz::prelude::*;

const RESOLUTION: usize = 32;

fn main() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, bevy::log::LogPlugin::default()))
        .add_systems(Startup, compare_probe_offsets);
    app.finish();
    app.cleanup();
    app.update();
}

fn compare_probe_offsets() {
    let mut noise = Noise::<
        LayeredNoise<
            Normed<f32>,
            Persistence,
            Octave<MixCellGradients<OrthoGrid, Smoothstep, QuickGradients>>,
        >,
    >::default();
    noise.set_frequency(8.0);

    let amplitude = 0.01;
    let field = move |p: Point| {
        let displacement: f32 = noise.sample_for(Vec3::new(p.x, p.y, p.z));
        p.coords.norm() - 0.3 + amplitude * displacement
    };

    let region = SamplingRegion::new(Point::new(-0.5, -0.5, -0.5), 1.0)
        .expect("unit region is valid");

    for probe_offset in [0.0001, 0.001, 0.01, 0.05] {
        let sampler = VolumeSampler::default().with_probe_offset(probe_offset);
        let volume = sampler.generate(&field, &region, RESOLUTION);

        let mut total: Value = 0.0;
        let mut count = 0;
        for z in 0..RESOLUTION {
            for y in 0..RESOLUTION {
                for x in 0..RESOLUTION {
                    let center = volume.voxel_center(x, y, z);
                    if (center.coords.norm() - 0.3).abs() > 0.05 {
                        continue;
                    }
                    let radial = center.coords.normalize();
                    let normal = volume.normal_at(x, y, z);
                    total += normal.angle(&radial).to_degrees();
                    count += 1;
                }
            }
        }

        info!(
            "h = {probe_offset}: mean normal deviation {:.2}° over {count} near-surface voxels",
            total / count.max(1) as bevy_sdf_volume::types::Value
        );
    }
}

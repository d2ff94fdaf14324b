use bevy::{
    prelude::*,
    tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future},
};

use crate::{block::Block, sampler::VolumeSampler, volume::SampledVolume};

/// System sets for the sampling pipeline.
///
/// Use these to order your own systems relative to texture generation:
///
/// ```rust,ignore
/// // Inspect the CPU buffers before they are turned into images:
/// app.add_systems(Update, inspect_volume.after(SdfVolumeSet::Generate)
///                                       .before(SdfVolumeSet::Upload));
/// ```
///
/// ```text
/// SdfVolumeSet::Spawn  →  [async compute]  →  SdfVolumeSet::Generate  →  [your systems]  →  SdfVolumeSet::Upload
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SdfVolumeSet {
    /// Spawns an async compute task for each queued block.
    Spawn,
    /// Polls async tasks and inserts [`GeneratedVolume`] on completion.
    Generate,
    /// Turns [`GeneratedVolume`] into [`VolumeTextures`].
    Upload,
}

/// Marker component added to [`Block`] entities that are waiting to be sampled.
///
/// Removed automatically once the block's textures have been created.
#[derive(Component)]
pub struct QueuedBlock;

/// Holds the in-flight async sampling task for a [`Block`].
#[derive(Component)]
pub struct SampleTask(Task<SampledVolume>);

/// CPU-side result of sampling a [`Block`].
///
/// Kept on the entity after upload so the buffers stay available for inspection
/// (for example [`SampledVolume::print_slice`]).
#[derive(Component, Debug, Clone, Deref)]
pub struct GeneratedVolume(pub SampledVolume);

/// 3D textures produced from a [`GeneratedVolume`].
///
/// Bind `distance` and `normals` to the raymarching material; see
/// [`texture`](crate::texture) for formats and sampling.
#[derive(Component, Debug, Clone)]
pub struct VolumeTextures {
    pub distance: Handle<Image>,
    pub normals: Handle<Image>,
}

/// Runtime configuration for the sampling pipeline.
///
/// Inserted as a resource by [`SdfVolumePlugin`]. Modify it at any time to change behaviour:
///
/// ```rust,ignore
/// fn my_system(mut config: ResMut<SdfVolumeConfig>) {
///     config.sampler.normal_encoding = NormalEncoding::Wrap;
/// }
/// ```
#[derive(Resource, Debug, Clone)]
pub struct SdfVolumeConfig {
    /// Maximum number of sampling tasks spawned per frame. Default: `4`.
    pub max_tasks_per_frame: usize,
    /// Sampler settings used for every block.
    pub sampler: VolumeSampler,
}

impl Default for SdfVolumeConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_frame: 4,
            sampler: VolumeSampler::default(),
        }
    }
}

/// Bevy plugin that samples [`Block`]s into 3D textures.
///
/// When the `auto_queue` feature is enabled, any [`Block`] added to the world is
/// processed automatically. Sampling runs on Bevy's `AsyncComputeTaskPool`:
///
/// ```text
/// Block added
///   → QueuedBlock inserted          (on_block_add)
///   → SampleTask spawned            (SdfVolumeSet::Spawn)
///   → [async compute runs]
///   → GeneratedVolume inserted      (SdfVolumeSet::Generate, once task completes)
///   → [your systems here]
///   → VolumeTextures inserted       (SdfVolumeSet::Upload)
///   → QueuedBlock removed
/// ```
#[derive(Default)]
pub struct SdfVolumePlugin {
    /// Initial value for [`SdfVolumeConfig`].
    pub config: SdfVolumeConfig,
}

impl Plugin for SdfVolumePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone());

        #[cfg(feature = "auto_queue")]
        app.configure_sets(
            Update,
            (
                SdfVolumeSet::Spawn,
                SdfVolumeSet::Generate,
                SdfVolumeSet::Upload,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                on_block_add,
                spawn_sample_tasks.in_set(SdfVolumeSet::Spawn),
                poll_sample_tasks.in_set(SdfVolumeSet::Generate),
                upload_textures.in_set(SdfVolumeSet::Upload),
            ),
        );
    }
}

/// Inserts [`QueuedBlock`] on every newly added [`Block`] that doesn't already have it.
fn on_block_add(
    mut commands: Commands,
    query: Query<Entity, (Added<Block>, Without<QueuedBlock>)>,
) {
    for entity in query.iter() {
        commands.entity(entity).insert(QueuedBlock);
    }
}

/// Spawns sampling tasks for [`QueuedBlock`]s, up to [`SdfVolumeConfig::max_tasks_per_frame`] per frame.
fn spawn_sample_tasks(
    mut commands: Commands,
    config: Res<SdfVolumeConfig>,
    query: Query<
        (Entity, &Block),
        (
            With<QueuedBlock>,
            Without<SampleTask>,
            Without<GeneratedVolume>,
        ),
    >,
) {
    let task_pool = AsyncComputeTaskPool::get();

    for (entity, block) in query.iter().take(config.max_tasks_per_frame) {
        // Cloning a Block only bumps the field's Arc.
        let block = block.clone();
        let sampler = config.sampler;

        let task = task_pool.spawn(async move { block.sample(&sampler) });

        commands.entity(entity).insert(SampleTask(task));
    }
}

/// Polls in-flight [`SampleTask`]s each frame and inserts [`GeneratedVolume`] on completion.
fn poll_sample_tasks(mut commands: Commands, mut query: Query<(Entity, &mut SampleTask)>) {
    for (entity, mut task) in query.iter_mut() {
        if let Some(volume) = block_on(future::poll_once(&mut task.0)) {
            debug!(
                "sampled block {entity}: {}³ voxels",
                volume.resolution()
            );
            commands
                .entity(entity)
                .insert(GeneratedVolume(volume))
                .remove::<SampleTask>();
        }
    }
}

/// Creates [`VolumeTextures`] from each [`GeneratedVolume`], then removes [`QueuedBlock`].
///
/// Empty volumes (resolution `0`) get no textures.
fn upload_textures(
    mut commands: Commands,
    query: Query<(Entity, &GeneratedVolume), With<QueuedBlock>>,
    mut images: ResMut<Assets<Image>>,
) {
    for (entity, generated) in query.iter() {
        let mut entity_commands = commands.entity(entity);
        entity_commands.remove::<QueuedBlock>();

        if generated.resolution() == 0 {
            warn!("block {entity} has resolution 0, skipping texture upload");
            continue;
        }

        entity_commands.insert(VolumeTextures {
            distance: images.add(generated.distance_image()),
            normals: images.add(generated.normal_image()),
        });
    }
}

#[cfg(all(test, feature = "auto_queue"))]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        quantize::NormalEncoding,
        region::SamplingRegion,
        sampler::generate,
        types::Point,
    };

    fn app(config: SdfVolumeConfig) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Image>()
            .add_plugins(SdfVolumePlugin { config });
        app
    }

    fn run_until_uploaded(app: &mut App, entity: Entity) {
        for _ in 0..500 {
            app.update();
            if app.world().entity(entity).contains::<VolumeTextures>() {
                return;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("block was never uploaded");
    }

    #[test]
    fn block_is_sampled_and_uploaded() {
        let mut app = app(SdfVolumeConfig::default());
        let region = SamplingRegion::new(Point::new(-0.5, -0.5, -0.5), 1.0).unwrap();
        let field = |p: Point| p.coords.norm() - 0.2;
        let entity = app.world_mut().spawn(Block::new(field, region, 6)).id();

        run_until_uploaded(&mut app, entity);

        let world = app.world();
        let entity_ref = world.entity(entity);
        assert!(!entity_ref.contains::<QueuedBlock>());
        assert!(!entity_ref.contains::<SampleTask>());

        let generated = entity_ref.get::<GeneratedVolume>().unwrap();
        assert_eq!(generated.0, generate(&field, &region, 6));

        let textures = entity_ref.get::<VolumeTextures>().unwrap();
        let images = world.resource::<Assets<Image>>();
        let distance = images.get(&textures.distance).unwrap();
        assert_eq!(distance.data.as_deref(), Some(generated.distance_bytes()));
        assert!(images.get(&textures.normals).is_some());
    }

    #[test]
    fn config_sampler_is_used() {
        let sampler = VolumeSampler::default()
            .with_normal_encoding(NormalEncoding::Wrap)
            .with_probe_offset(1.0 / 1024.0);
        let mut app = app(SdfVolumeConfig {
            max_tasks_per_frame: 1,
            sampler,
        });
        let region = SamplingRegion::new(Point::new(-0.5, -0.5, -0.5), 1.0).unwrap();
        let entity = app
            .world_mut()
            .spawn(Block::new(|p: Point| p.y, region, 2))
            .id();

        run_until_uploaded(&mut app, entity);

        let generated = app.world().get::<GeneratedVolume>(entity).unwrap();
        assert!(generated.normal_bytes().chunks(3).all(|n| n == [128, 0, 128]));
    }
}

use std::sync::Arc;

use bevy::prelude::*;
use rayon::prelude::*;

use crate::{
    error::{Result, VolumeError},
    region::SamplingRegion,
    sampler::VolumeSampler,
    types::{Point, ScalarField, Value, Vector},
    volume::SampledVolume,
};

/// A cubic region split into `blocks_per_axis³` equal blocks, each sampled on its own.
///
/// Blocks are ordered like voxels, `k·M² + j·M + i` for block `(i, j, k)`:
///
/// ```text
///   +----+----+
///   | 2  | 3  |   (k = 0 layer, M = 2)
///   +----+----+
///   | 0  | 1  |   j
///   +----+----+   |
///   origin        *-- i
/// ```
///
/// Blocks share no samples, so normals along a block face are not reconciled with
/// the neighbouring block. Renderers that need seamless shading across blocks must
/// handle that themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockGrid {
    region: SamplingRegion,
    blocks_per_axis: usize,
    resolution: usize,
}

impl BlockGrid {
    /// Splits `region` into `blocks_per_axis³` blocks of `resolution³` voxels each.
    ///
    /// Returns [`VolumeError::InvalidBlockCount`] if `blocks_per_axis` is `0`.
    pub fn new(region: SamplingRegion, blocks_per_axis: usize, resolution: usize) -> Result<Self> {
        if blocks_per_axis == 0 {
            return Err(VolumeError::InvalidBlockCount);
        }
        Ok(Self {
            region,
            blocks_per_axis,
            resolution,
        })
    }

    pub fn region(&self) -> &SamplingRegion {
        &self.region
    }

    pub fn blocks_per_axis(&self) -> usize {
        self.blocks_per_axis
    }

    /// Voxels per axis in every block.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.blocks_per_axis.pow(3)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Edge length of one block.
    pub fn block_size(&self) -> Value {
        self.region.edge_length() / self.blocks_per_axis as Value
    }

    /// Region covered by block `(i, j, k)`.
    pub fn block_region(&self, i: usize, j: usize, k: usize) -> SamplingRegion {
        let block_size = self.block_size();
        let offset = Vector::new(i as Value, j as Value, k as Value) * block_size;
        SamplingRegion::from_parts(self.region.origin() + offset, block_size)
    }

    /// All block regions in flat block order.
    pub fn regions(&self) -> Vec<SamplingRegion> {
        let m = self.blocks_per_axis;
        let mut regions = Vec::with_capacity(self.len());
        for k in 0..m {
            for j in 0..m {
                for i in 0..m {
                    regions.push(self.block_region(i, j, k));
                }
            }
        }
        regions
    }

    /// Samples every block, in flat block order.
    ///
    /// With [`VolumeSampler::parallel`] set, blocks are sampled concurrently as well.
    pub fn generate<F>(&self, field: &F, sampler: &VolumeSampler) -> Vec<SampledVolume>
    where
        F: ScalarField + ?Sized,
    {
        let _span =
            tracing::debug_span!("sdf_volume::generate_blocks", blocks = self.len()).entered();
        let regions = self.regions();
        if sampler.parallel {
            regions
                .par_iter()
                .map(|region| sampler.generate(field, region, self.resolution))
                .collect()
        } else {
            regions
                .iter()
                .map(|region| sampler.generate(field, region, self.resolution))
                .collect()
        }
    }

    /// One [`Block`] component per block, all sharing `field`.
    pub fn blocks(&self, field: Arc<dyn ScalarField>) -> Vec<Block> {
        self.regions()
            .into_iter()
            .map(|region| Block::from_arc(Arc::clone(&field), region, self.resolution))
            .collect()
    }
}

/// A region of a scalar field to be sampled into distance and normal textures.
///
/// Spawning a `Block` queues it for sampling (with the `auto_queue` feature):
///
/// ```rust,ignore
/// let region = SamplingRegion::centered(Point::new(0.0, 0.0, -5.0), 1.0)?;
/// let sphere = SphereField::new(SphereConfig { center: region.center(), radius: 0.2 });
/// commands.spawn(Block::new(sphere, region, 16));
/// ```
///
/// The field is held behind an [`Arc`] so the async sampling task can share it
/// without copying.
#[derive(Component, Clone)]
#[require(Transform)]
pub struct Block {
    /// Region covered by this block.
    pub region: SamplingRegion,
    /// Voxels per axis.
    pub resolution: usize,
    /// Field sampled over [`region`](Block::region).
    pub field: Arc<dyn ScalarField>,
}

impl Block {
    pub fn new(field: impl ScalarField + 'static, region: SamplingRegion, resolution: usize) -> Self {
        Self::from_arc(Arc::new(field), region, resolution)
    }

    pub fn from_arc(field: Arc<dyn ScalarField>, region: SamplingRegion, resolution: usize) -> Self {
        Self {
            region,
            resolution,
            field,
        }
    }

    /// Sets the number of voxels per axis.
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    /// Minimum corner of the block in world space.
    pub fn origin(&self) -> Point {
        self.region.origin()
    }

    /// Samples the block on the calling thread.
    pub fn sample(&self, sampler: &VolumeSampler) -> SampledVolume {
        sampler.generate(self.field.as_ref(), &self.region, self.resolution)
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("region", &self.region)
            .field("resolution", &self.resolution)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{SphereConfig, SphereField};

    fn grid(m: usize, n: usize) -> BlockGrid {
        let region = SamplingRegion::new(Point::new(-0.5, -0.5, -5.5), 1.0).unwrap();
        BlockGrid::new(region, m, n).unwrap()
    }

    #[test]
    fn zero_blocks_rejected() {
        let region = SamplingRegion::new(Point::origin(), 1.0).unwrap();
        assert!(matches!(
            BlockGrid::new(region, 0, 8),
            Err(VolumeError::InvalidBlockCount)
        ));
    }

    #[test]
    fn regions_tile_the_grid() {
        let grid = grid(4, 2);
        let regions = grid.regions();
        assert_eq!(regions.len(), 64);
        assert_eq!(grid.block_size(), 0.25);

        assert_eq!(regions[0].origin(), grid.region().origin());
        assert_eq!(regions[63].max(), grid.region().max());

        // i varies fastest, then j, then k
        assert_eq!(regions[1], grid.block_region(1, 0, 0));
        assert_eq!(regions[4], grid.block_region(0, 1, 0));
        assert_eq!(regions[16], grid.block_region(0, 0, 1));
        for r in &regions {
            assert_eq!(r.edge_length(), 0.25);
            assert!(grid.region().contains(&r.center()));
        }
    }

    #[test]
    fn blocks_sample_independently() {
        let sphere = SphereField::new(SphereConfig {
            center: Point::new(0.0, 0.0, -5.0),
            radius: 0.2,
        });
        let grid = grid(2, 4);
        let sampler = VolumeSampler::default();
        let volumes = grid.generate(&sphere, &sampler);
        assert_eq!(volumes.len(), 8);

        for (volume, region) in volumes.iter().zip(grid.regions()) {
            assert_eq!(volume.region(), &region);
            assert_eq!(volume, &sampler.generate(&sphere, &region, 4));
        }

        let sequential = grid.generate(&sphere, &sampler.with_parallel(false));
        assert_eq!(volumes, sequential);
    }

    #[test]
    fn block_components_share_field() {
        let field: Arc<dyn ScalarField> = Arc::new(SphereField::new(SphereConfig::default()));
        let blocks = grid(3, 8).blocks(Arc::clone(&field));
        assert_eq!(blocks.len(), 27);
        assert_eq!(Arc::strong_count(&field), 28);
        assert_eq!(blocks[0].resolution, 8);
    }

    #[test]
    fn block_sample_matches_sampler() {
        let region = SamplingRegion::new(Point::new(-0.5, -0.5, -0.5), 1.0).unwrap();
        let block = Block::new(|p: Point| p.coords.norm() - 0.2, region, 4).with_resolution(6);
        let volume = block.sample(&VolumeSampler::default());
        assert_eq!(volume.resolution(), 6);
        assert_eq!(volume.distance_bytes().len(), 216);
    }
}

use std::fmt;

use ndarray::{ArrayView3, ArrayView4};

use crate::{
    error::{Result, VolumeError},
    quantize::{decode_distance, decode_normal},
    region::SamplingRegion,
    types::{Point, Value, Vector},
};

/// Quantized distance and normal textures for one [`SamplingRegion`].
///
/// Both buffers share the traversal order `z·N² + y·N + x`:
///
/// ```text
/// distance: [d(0,0,0), d(1,0,0), ..., d(N-1,N-1,N-1)]                  N³ bytes
/// normals:  [r,g,b(0,0,0), r,g,b(1,0,0), ..., r,g,b(N-1,N-1,N-1)]    3·N³ bytes
/// ```
///
/// Produced whole by [`VolumeSampler::generate`](crate::sampler::VolumeSampler::generate);
/// there is no way to update part of a volume.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledVolume {
    region: SamplingRegion,
    resolution: usize,
    distance: Vec<u8>,
    normals: Vec<u8>,
}

impl SampledVolume {
    pub(crate) fn from_buffers(
        region: SamplingRegion,
        resolution: usize,
        distance: Vec<u8>,
        normals: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(distance.len(), resolution.pow(3));
        debug_assert_eq!(normals.len(), 3 * resolution.pow(3));
        Self {
            region,
            resolution,
            distance,
            normals,
        }
    }

    pub fn region(&self) -> &SamplingRegion {
        &self.region
    }

    /// Voxels per axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn texel_size(&self) -> Value {
        self.region.texel_size(self.resolution)
    }

    /// One byte per voxel, decode with [`decode_distance`].
    pub fn distance_bytes(&self) -> &[u8] {
        &self.distance
    }

    /// Three bytes per voxel, decode with [`decode_normal`].
    pub fn normal_bytes(&self) -> &[u8] {
        &self.normals
    }

    /// Consumes the volume, returning `(distance, normals)`.
    pub fn into_buffers(self) -> (Vec<u8>, Vec<u8>) {
        (self.distance, self.normals)
    }

    /// Flat index of voxel `(x, y, z)` in the distance buffer.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        let n = self.resolution;
        z * n * n + y * n + x
    }

    pub fn voxel_center(&self, x: usize, y: usize, z: usize) -> Point {
        self.region.voxel_center(self.resolution, x, y, z)
    }

    /// Decoded distance at voxel `(x, y, z)`.
    pub fn distance_at(&self, x: usize, y: usize, z: usize) -> Value {
        decode_distance(self.distance[self.index(x, y, z)])
    }

    /// Decoded normal at voxel `(x, y, z)`.
    pub fn normal_at(&self, x: usize, y: usize, z: usize) -> Vector {
        let i = 3 * self.index(x, y, z);
        decode_normal([self.normals[i], self.normals[i + 1], self.normals[i + 2]])
    }

    /// Distance bytes viewed as `[z][y][x]`.
    pub fn distance_view(&self) -> Result<ArrayView3<'_, u8>> {
        let n = self.resolution;
        Ok(ArrayView3::from_shape((n, n, n), &self.distance)?)
    }

    /// Normal bytes viewed as `[z][y][x][channel]`.
    pub fn normal_view(&self) -> Result<ArrayView4<'_, u8>> {
        let n = self.resolution;
        Ok(ArrayView4::from_shape((n, n, n, 3), &self.normals)?)
    }

    /// Decoded distance layer at depth `z`, for eyeballing a volume.
    ///
    /// Formats as one row per `y`, tab-separated columns per `x`.
    pub fn slice(&self, z: usize) -> Result<Slice<'_>> {
        if z >= self.resolution {
            return Err(VolumeError::SliceOutOfRange {
                depth: z,
                resolution: self.resolution,
            });
        }
        Ok(Slice { volume: self, z })
    }

    /// Prints [`slice`](SampledVolume::slice) to stdout.
    pub fn print_slice(&self, z: usize) -> Result<()> {
        print!("{}", self.slice(z)?);
        Ok(())
    }
}

/// A single decoded depth layer of a [`SampledVolume`]. See [`SampledVolume::slice`].
pub struct Slice<'a> {
    volume: &'a SampledVolume,
    z: usize,
}

impl fmt::Display for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.volume.resolution;
        for y in 0..n {
            for x in 0..n {
                write!(f, "{}\t", self.volume.distance_at(x, y, self.z))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

use rayon::prelude::*;

use crate::{
    quantize::{NormalEncoding, encode_distance, encode_normal},
    region::SamplingRegion,
    types::{Point, ScalarField, Value, Vector},
    volume::SampledVolume,
};

/// Default distance between a voxel center and each gradient probe.
pub const PROBE_OFFSET: Value = 0.0001;

/// Probe directions of the gradient estimator: four vertices of a regular tetrahedron
/// inscribed in the unit cube.
///
/// ```text
/// d1 = ( 1, -1, -1)    d2 = (-1, -1,  1)
/// d3 = (-1,  1, -1)    d4 = ( 1,  1,  1)
/// ```
///
/// The directions sum to zero and `Σ dᵢ dᵢᵀ = 4·I`, so `Σ dᵢ f(p + dᵢ h)` is proportional
/// to the gradient of `f` at `p` up to second-order terms.
pub const PROBE_DIRECTIONS: [[Value; 3]; 4] = [
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
];

/// Unnormalized gradient of `field` at `point` from four tetrahedral probes `h` away.
#[inline]
pub fn estimate_gradient<F>(field: &F, point: &Point, h: Value) -> Vector
where
    F: ScalarField + ?Sized,
{
    PROBE_DIRECTIONS
        .iter()
        .map(|&d| {
            let d = Vector::from(d);
            d * field.distance(*point + d * h)
        })
        .fold(Vector::zeros(), |acc, v| acc + v)
}

/// Unit surface normal of `field` at `point`.
///
/// Returns the zero vector when the gradient vanishes or is not finite (flat or
/// broken fields), which encodes as `(128, 128, 128)`.
#[inline]
pub fn estimate_normal<F>(field: &F, point: &Point, h: Value) -> Vector
where
    F: ScalarField + ?Sized,
{
    estimate_gradient(field, point, h)
        .try_normalize(0.0)
        .filter(|n| n.iter().all(|c| c.is_finite()))
        .unwrap_or_else(Vector::zeros)
}

/// Settings for sampling a [`ScalarField`] into a [`SampledVolume`].
///
/// ```rust
/// use bevy_sdf_volume::{
///     quantize::NormalEncoding, region::SamplingRegion, sampler::VolumeSampler, types::Point,
/// };
///
/// let sampler = VolumeSampler::default().with_normal_encoding(NormalEncoding::Wrap);
/// let region = SamplingRegion::new(Point::new(-0.5, -0.5, -0.5), 1.0).unwrap();
/// let volume = sampler.generate(&|p: Point| p.coords.norm() - 0.2, &region, 8);
/// assert_eq!(volume.distance_bytes().len(), 8 * 8 * 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSampler {
    /// Gradient probe distance `h`. Default: [`PROBE_OFFSET`].
    pub probe_offset: Value,
    /// Storage of normal components equal to `+1.0`. Default: [`NormalEncoding::Saturate`].
    pub normal_encoding: NormalEncoding,
    /// Split work across Rayon's pool, one z layer per task. Output is identical either way.
    pub parallel: bool,
}

impl Default for VolumeSampler {
    fn default() -> Self {
        Self {
            probe_offset: PROBE_OFFSET,
            normal_encoding: NormalEncoding::default(),
            parallel: true,
        }
    }
}

impl VolumeSampler {
    pub fn with_probe_offset(mut self, probe_offset: Value) -> Self {
        self.probe_offset = probe_offset;
        self
    }

    pub fn with_normal_encoding(mut self, normal_encoding: NormalEncoding) -> Self {
        self.normal_encoding = normal_encoding;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Encodes one voxel: one field call for the distance, four for the normal.
    #[inline]
    pub fn sample_voxel<F>(&self, field: &F, center: &Point) -> (u8, [u8; 3])
    where
        F: ScalarField + ?Sized,
    {
        let distance = encode_distance(field.distance(*center));
        let normal = estimate_normal(field, center, self.probe_offset);
        (distance, encode_normal(&normal, self.normal_encoding))
    }

    /// Samples `field` over `region` at `resolution³` voxel centers.
    ///
    /// Both buffers are laid out z-major, x-minor (`z·N² + y·N + x`); the normal buffer
    /// packs three bytes per voxel.
    ///
    /// A `resolution` of `0` produces empty buffers. That is never useful and is the
    /// caller's responsibility to avoid.
    ///
    /// ```text
    /// Per z layer (one Rayon task when `parallel`):
    ///   for y, x:
    ///     1. region.voxel_center      →  sample point p
    ///     2. field(p)                 →  distance byte
    ///     3. Σ dᵢ·field(p + dᵢ·h)     →  gradient → unit normal → 3 bytes
    /// ```
    pub fn generate<F>(&self, field: &F, region: &SamplingRegion, resolution: usize) -> SampledVolume
    where
        F: ScalarField + ?Sized,
    {
        let _span = tracing::debug_span!(
            "sdf_volume::generate",
            resolution,
            edge_length = region.edge_length()
        )
        .entered();

        let voxel_count = resolution.pow(3);
        let mut distance = vec![0u8; voxel_count];
        let mut normals = vec![0u8; 3 * voxel_count];

        if resolution == 0 {
            log::warn!("sampling a volume with resolution 0; buffers will be empty");
            return SampledVolume::from_buffers(*region, resolution, distance, normals);
        }

        let layer_len = resolution * resolution;
        let fill_layer = |z: usize, distance_layer: &mut [u8], normal_layer: &mut [u8]| {
            for y in 0..resolution {
                for x in 0..resolution {
                    let i = y * resolution + x;
                    let center = region.voxel_center(resolution, x, y, z);
                    let (d, n) = self.sample_voxel(field, &center);
                    distance_layer[i] = d;
                    normal_layer[3 * i..3 * i + 3].copy_from_slice(&n);
                }
            }
        };

        if self.parallel {
            distance
                .par_chunks_mut(layer_len)
                .zip(normals.par_chunks_mut(3 * layer_len))
                .enumerate()
                .for_each(|(z, (d, n))| fill_layer(z, d, n));
        } else {
            distance
                .chunks_mut(layer_len)
                .zip(normals.chunks_mut(3 * layer_len))
                .enumerate()
                .for_each(|(z, (d, n))| fill_layer(z, d, n));
        }

        tracing::debug!(voxels = voxel_count, "sampled volume");
        SampledVolume::from_buffers(*region, resolution, distance, normals)
    }
}

/// Samples `field` over `region` with the default [`VolumeSampler`].
pub fn generate<F>(field: &F, region: &SamplingRegion, resolution: usize) -> SampledVolume
where
    F: ScalarField + ?Sized,
{
    VolumeSampler::default().generate(field, region, resolution)
}

use crate::{
    error::{Result, VolumeError},
    types::{Point, Value, Vector},
};

/// An axis-aligned cube: a minimum corner plus an edge length.
///
/// ```text
///          +--------+ origin + edge
///         /        /|
///        +--------+ |
///        |        | +
///        |        |/
/// origin +--------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingRegion {
    origin: Point,
    edge_length: Value,
}

impl SamplingRegion {
    /// Creates a region with its minimum corner at `origin`.
    ///
    /// Returns [`VolumeError::InvalidEdgeLength`] unless `edge_length` is finite and positive.
    pub fn new(origin: Point, edge_length: Value) -> Result<Self> {
        if !(edge_length.is_finite() && edge_length > 0.0) {
            return Err(VolumeError::InvalidEdgeLength(edge_length));
        }
        Ok(Self {
            origin,
            edge_length,
        })
    }

    /// Creates a region of the given edge length centered on `center`.
    pub fn centered(center: Point, edge_length: Value) -> Result<Self> {
        let half = Vector::repeat(edge_length / 2.0);
        Self::new(center - half, edge_length)
    }

    /// Minimum corner.
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn edge_length(&self) -> Value {
        self.edge_length
    }

    /// Maximum corner.
    pub fn max(&self) -> Point {
        self.origin + Vector::repeat(self.edge_length)
    }

    pub fn center(&self) -> Point {
        self.origin + Vector::repeat(self.edge_length / 2.0)
    }

    /// Returns `true` if `point` lies inside the cube, boundary included.
    pub fn contains(&self, point: &Point) -> bool {
        let max = self.max();
        (0..3).all(|i| point[i] >= self.origin[i] && point[i] <= max[i])
    }

    /// World-space edge of one voxel when the region is split into `resolution` voxels per axis.
    #[inline]
    pub fn texel_size(&self, resolution: usize) -> Value {
        self.edge_length / resolution as Value
    }

    /// Returns the center of voxel `(x, y, z)`:
    ///
    /// ```text
    /// origin + (x, y, z) · texel_size + texel_size / 2
    /// ```
    #[inline]
    pub fn voxel_center(&self, resolution: usize, x: usize, y: usize, z: usize) -> Point {
        let texel_size = self.texel_size(resolution);
        let sample_offset = Vector::repeat(texel_size / 2.0);
        let index = Vector::new(x as Value, y as Value, z as Value);
        Point::from(index * texel_size + self.origin.coords + sample_offset)
    }

    /// Builds a sub-region whose invariants the caller already upholds.
    pub(crate) fn from_parts(origin: Point, edge_length: Value) -> Self {
        debug_assert!(edge_length > 0.0);
        Self {
            origin,
            edge_length,
        }
    }
}

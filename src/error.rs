use derive_more::{Display, From};
use ndarray::ShapeError;

pub type Result<T> = core::result::Result<T, VolumeError>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum VolumeError {
    /// Region edge length was zero, negative or not finite.
    InvalidEdgeLength(f32),
    /// A block grid needs at least one block per axis.
    InvalidBlockCount,
    /// Requested a depth slice past the end of the volume.
    SliceOutOfRange { depth: usize, resolution: usize },
    #[from]
    Shape(ShapeError),
}

impl std::error::Error for VolumeError {}

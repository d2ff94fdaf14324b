pub mod block;
pub mod error;
pub mod field;
pub mod plugin;
pub mod quantize;
pub mod region;
pub mod sampler;
pub mod texture;
pub mod types;
pub mod volume;

pub use plugin::SdfVolumePlugin;
pub use sampler::{VolumeSampler, generate};

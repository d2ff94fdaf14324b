use bevy::{
    asset::RenderAssetUsages,
    image::{Image, ImageAddressMode, ImageSampler, ImageSamplerDescriptor},
    render::render_resource::{Extent3d, TextureDimension, TextureFormat},
};

use crate::volume::SampledVolume;

/// Format of the distance texture: one normalized byte per texel.
pub const DISTANCE_FORMAT: TextureFormat = TextureFormat::R8Unorm;

/// Format of the normal texture.
///
/// wgpu has no three-channel 8-bit format, so normals are uploaded as RGBA with an
/// opaque alpha. The CPU-side buffer stays RGB.
pub const NORMAL_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Nearest filtering with clamp-to-edge on every axis.
///
/// The encodings are not meaningfully interpolable, and sampling past the block edge
/// must never wrap into the opposite face.
pub fn volume_image_sampler() -> ImageSampler {
    ImageSampler::Descriptor(ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::ClampToEdge,
        address_mode_v: ImageAddressMode::ClampToEdge,
        address_mode_w: ImageAddressMode::ClampToEdge,
        ..ImageSamplerDescriptor::nearest()
    })
}

/// Expands packed `[r, g, b]` texels to `[r, g, b, 255]`.
pub fn pad_rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for texel in rgb.chunks_exact(3) {
        rgba.extend_from_slice(texel);
        rgba.push(u8::MAX);
    }
    rgba
}

fn volume_image(resolution: usize, data: Vec<u8>, format: TextureFormat) -> Image {
    let side = resolution as u32;
    let mut image = Image::new(
        Extent3d {
            width: side,
            height: side,
            depth_or_array_layers: side,
        },
        TextureDimension::D3,
        data,
        format,
        RenderAssetUsages::RENDER_WORLD,
    );
    image.sampler = volume_image_sampler();
    image
}

impl SampledVolume {
    /// Copies the distance buffer into a 3D [`DISTANCE_FORMAT`] image.
    ///
    /// Texel `(x, y, z)` of the image is voxel `(x, y, z)` of the volume.
    pub fn distance_image(&self) -> Image {
        volume_image(
            self.resolution(),
            self.distance_bytes().to_vec(),
            DISTANCE_FORMAT,
        )
    }

    /// Copies the normal buffer into a 3D [`NORMAL_FORMAT`] image.
    pub fn normal_image(&self) -> Image {
        volume_image(
            self.resolution(),
            pad_rgb_to_rgba(self.normal_bytes()),
            NORMAL_FORMAT,
        )
    }
}

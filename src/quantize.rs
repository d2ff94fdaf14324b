//! 8-bit encodings for the distance and normal channels.
//!
//! ```text
//! distance:  d ∈ [-4, 4]  →  ⌊(d + 4) · 32⌋    decode: v / 32 − 4
//! normal:    c ∈ [-1, 1]  →  ⌊(c + 1) · 128⌋   decode: b / 128 − 1
//! ```
//!
//! Both encodings truncate. Neither is symmetric: `d = 4` and `c = 1` land exactly on
//! 256, one past the last representable byte.

use crate::types::{Value, Vector};

/// Continuous distance range stored in the distance channel. Values outside are clamped.
pub const DISTANCE_RANGE: [Value; 2] = [-4.0, 4.0];

/// Distance units per byte step.
pub const DISTANCE_STEP: Value = 1.0 / 32.0;

/// Byte steps per unit of normal component.
const NORMAL_SCALE: Value = 128.0;

/// How a normal component of exactly `+1.0` (which maps to 256) is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalEncoding {
    /// Clamp to 255.
    #[default]
    Saturate,
    /// Keep the low 8 bits, so 256 becomes 0. Bit-exact with raymarchers built
    /// around a plain unsigned-byte cast.
    Wrap,
}

// linearly map a number from one range to another
pub fn remap(s: Value, range_in: [Value; 2], range_out: [Value; 2]) -> Value {
    range_out[0] + (s - range_in[0]) * (range_out[1] - range_out[0]) / (range_in[1] - range_in[0])
}

/// Clamps `distance` to [`DISTANCE_RANGE`] and truncates it to one byte.
///
/// `4.0` and above saturate to `255`. A NaN distance encodes as `0`.
#[inline]
pub fn encode_distance(distance: Value) -> u8 {
    let d = distance.clamp(DISTANCE_RANGE[0], DISTANCE_RANGE[1]);
    remap(d, DISTANCE_RANGE, [0.0, 256.0]) as u8
}

/// Inverse of [`encode_distance`], accurate to [`DISTANCE_STEP`].
#[inline]
pub fn decode_distance(byte: u8) -> Value {
    byte as Value * DISTANCE_STEP + DISTANCE_RANGE[0]
}

#[inline]
pub fn encode_normal_component(component: Value, encoding: NormalEncoding) -> u8 {
    let scaled = (component + 1.0) * NORMAL_SCALE;
    match encoding {
        NormalEncoding::Saturate => scaled as u8,
        NormalEncoding::Wrap => scaled as u32 as u8,
    }
}

#[inline]
pub fn decode_normal_component(byte: u8) -> Value {
    byte as Value / NORMAL_SCALE - 1.0
}

/// Encodes a unit normal as an `[r, g, b]` triple.
#[inline]
pub fn encode_normal(normal: &Vector, encoding: NormalEncoding) -> [u8; 3] {
    [
        encode_normal_component(normal.x, encoding),
        encode_normal_component(normal.y, encoding),
        encode_normal_component(normal.z, encoding),
    ]
}

/// Decodes an `[r, g, b]` triple. The result is only approximately unit length.
#[inline]
pub fn decode_normal(rgb: [u8; 3]) -> Vector {
    Vector::new(
        decode_normal_component(rgb[0]),
        decode_normal_component(rgb[1]),
        decode_normal_component(rgb[2]),
    )
}

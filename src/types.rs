use nalgebra::{Point3, Vector3};

/// Scalar field value at a point in space.
pub type Value = f32;

/// A 3D point with [`Value`] components.
pub type Point = Point3<Value>;

/// A 3D vector with [`Value`] components.
pub type Vector = Vector3<Value>;

/// A signed distance function over 3D space.
///
/// Values are negative inside the modeled surface, zero on it and positive outside.
/// The sampler treats a field as a black box and probes it slightly outside the
/// sampled region when estimating normals, so implementations must be defined everywhere.
///
/// Any `Fn(Point) -> Value + Send + Sync` closure is a field:
///
/// ```rust
/// use bevy_sdf_volume::types::{Point, ScalarField};
///
/// let radius = 0.5;
/// let sphere = move |p: Point| p.coords.norm() - radius;
/// assert_eq!(sphere.distance(Point::new(1.0, 0.0, 0.0)), 0.5);
/// ```
pub trait ScalarField: Send + Sync {
    /// Signed distance from `point` to the surface.
    fn distance(&self, point: Point) -> Value;
}

impl<F> ScalarField for F
where
    F: Fn(Point) -> Value + Send + Sync,
{
    #[inline]
    fn distance(&self, point: Point) -> Value {
        self(point)
    }
}

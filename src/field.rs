//! Analytic signed distance fields and combinators.
//!
//! All fields carry their parameters by value, so they can be moved into async tasks
//! or shared behind an [`Arc`](std::sync::Arc).

use crate::types::{Point, ScalarField, Value, Vector};

/// Parameters of a [`SphereField`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereConfig {
    pub center: Point,
    pub radius: Value,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            center: Point::origin(),
            radius: 0.2,
        }
    }
}

/// Exact distance to a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereField {
    config: SphereConfig,
}

impl SphereField {
    pub fn new(config: SphereConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SphereConfig {
        &self.config
    }
}

impl ScalarField for SphereField {
    #[inline]
    fn distance(&self, point: Point) -> Value {
        nalgebra::distance(&point, &self.config.center) - self.config.radius
    }
}

/// Exact distance to an axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxField {
    pub center: Point,
    pub half_extents: Vector,
}

impl BoxField {
    pub fn new(center: Point, half_extents: Vector) -> Self {
        Self {
            center,
            half_extents,
        }
    }
}

impl ScalarField for BoxField {
    #[inline]
    fn distance(&self, point: Point) -> Value {
        let q = (point - self.center).abs() - self.half_extents;
        let outside = q.sup(&Vector::zeros()).norm();
        let inside = q.max().min(0.0);
        outside + inside
    }
}

/// Union of two fields: the minimum of both distances.
///
/// Exact outside both shapes; inside an overlap it underestimates, which the sampler
/// tolerates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Union<A, B>(pub A, pub B);

impl<A: ScalarField, B: ScalarField> ScalarField for Union<A, B> {
    #[inline]
    fn distance(&self, point: Point) -> Value {
        self.0.distance(point).min(self.1.distance(point))
    }
}

/// A field moved by `offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Translated<F> {
    pub field: F,
    pub offset: Vector,
}

impl<F: ScalarField> ScalarField for Translated<F> {
    #[inline]
    fn distance(&self, point: Point) -> Value {
        self.field.distance(point - self.offset)
    }
}

/// Builder helpers available on every sized field.
pub trait FieldExt: ScalarField + Sized {
    fn union<B: ScalarField>(self, other: B) -> Union<Self, B> {
        Union(self, other)
    }

    fn translated(self, offset: Vector) -> Translated<Self> {
        Translated {
            field: self,
            offset,
        }
    }
}

impl<F: ScalarField> FieldExt for F {}

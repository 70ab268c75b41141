//! A ray and its accumulating closest-hit record.
//!
//! Mirrors `Geometry::Ray`/`Geometry::CastedRay`: a `CastedRay` merges
//! candidate triangle intersections, keeping only the strictly-closest
//! one above a small epsilon (self-intersection guard).

use crate::core::triangle::Triangle;
use crate::core::vector::{Float, Vector3};

/// Self-intersection / parallel-ray epsilon shared by the whole kernel.
pub const EPSILON: Float = 1e-6;

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Ray { origin, direction }
    }

    pub fn point_at(&self, t: Float) -> Vector3 {
        self.origin + self.direction * t
    }
}

/// Best-so-far hit against a single triangle: its barycentric (u, v) and `t`.
#[derive(Clone, Copy, Debug)]
pub struct Hit<'a> {
    pub t: Float,
    pub triangle: &'a Triangle,
    pub u: Float,
    pub v: Float,
}

/// A ray together with its best-so-far hit record.
///
/// `intersect` replaces the record only when the candidate `t` is
/// strictly smaller than the current best, strictly positive, and
/// above [`EPSILON`] — this is what prevents self-intersection and
/// keeps the closest-hit tie-break deterministic (first triangle
/// tested at a given `t` wins, matching insertion order when traversal
/// visits triangles in insertion order).
pub struct CastedRay<'a> {
    pub ray: Ray,
    best: Option<Hit<'a>>,
}

impl<'a> CastedRay<'a> {
    pub fn new(ray: Ray) -> Self {
        CastedRay { ray, best: None }
    }

    pub fn from_origin_direction(origin: Vector3, direction: Vector3) -> Self {
        CastedRay::new(Ray::new(origin, direction))
    }

    pub fn origin(&self) -> Vector3 {
        self.ray.origin
    }

    pub fn direction(&self) -> Vector3 {
        self.ray.direction
    }

    pub fn valid_intersection_found(&self) -> bool {
        self.best.is_some()
    }

    pub fn intersection(&self) -> Option<&Hit<'a>> {
        self.best.as_ref()
    }

    pub fn best_t(&self) -> Float {
        self.best.map(|h| h.t).unwrap_or(Float::INFINITY)
    }

    /// Tests `triangle` against the ray, keeping the hit only if it
    /// improves on the current best (closest, positive, above epsilon).
    pub fn intersect(&mut self, triangle: &'a Triangle) {
        if let Some((t, u, v)) = triangle.intersect(&self.ray) {
            if t > EPSILON && t < self.best_t() {
                self.best = Some(Hit { t, triangle, u, v });
            }
        }
    }
}

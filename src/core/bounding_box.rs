//! Axis-aligned bounding box with slab-method ray test (§4.3).

use crate::core::ray::Ray;
use crate::core::vector::{Float, Vector3};

#[derive(Clone, Copy, Debug)]
pub struct BoundingBox {
    pub min: Vector3,
    pub max: Vector3,
    is_empty: bool,
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::empty()
    }
}

impl BoundingBox {
    pub fn empty() -> Self {
        BoundingBox {
            min: Vector3::zero(),
            max: Vector3::zero(),
            is_empty: true,
        }
    }

    pub fn from_point(p: Vector3) -> Self {
        BoundingBox {
            min: p,
            max: p,
            is_empty: false,
        }
    }

    pub fn from_points(points: &[Vector3]) -> Self {
        let mut b = BoundingBox::empty();
        for p in points {
            b.add_point(*p);
        }
        b
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn add_point(&mut self, p: Vector3) {
        if self.is_empty {
            self.min = p;
            self.max = p;
            self.is_empty = false;
        } else {
            self.min = self.min.min(&p);
            self.max = self.max.max(&p);
        }
    }

    /// Expands this box to the union with `other` (§3 invariant:
    /// monotonic under repeated `update`).
    pub fn update(&mut self, other: &BoundingBox) {
        if other.is_empty {
            return;
        }
        if self.is_empty {
            *self = *other;
        } else {
            self.min = self.min.min(&other.min);
            self.max = self.max.max(&other.max);
        }
    }

    pub fn centroid(&self) -> Vector3 {
        (self.min + self.max) / 2.0
    }

    pub fn extent(&self) -> Vector3 {
        self.max - self.min
    }

    /// Index (0=x, 1=y, 2=z) of the box's longest axis — used by the
    /// BVH build to choose a split axis (§4.4).
    pub fn longest_axis(&self) -> usize {
        self.extent().max_axis()
    }

    /// Slab-method ray/box test (§4.3). Returns `(entry, exit)` on hit.
    pub fn intersect(&self, ray: &Ray, t0: Float, t1: Float) -> Option<(Float, Float)> {
        if self.is_empty {
            return None;
        }
        let mut entry = t0;
        let mut exit = t1;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            if dir.abs() < 1e-12 {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv_dir = 1.0 / dir;
            let mut t_near = (self.min[axis] - origin) * inv_dir;
            let mut t_far = (self.max[axis] - origin) * inv_dir;
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }
            entry = entry.max(t_near);
            exit = exit.min(t_far);
            if entry > exit {
                return None;
            }
        }
        if entry <= exit && exit >= 0.0 && entry <= t1 {
            Some((entry, exit))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_is_monotonic_union() {
        let mut a = BoundingBox::from_point(Vector3::new(0.0, 0.0, 0.0));
        a.add_point(Vector3::new(1.0, 1.0, 1.0));
        let b = BoundingBox::from_point(Vector3::new(-1.0, 2.0, 0.5));
        a.update(&b);
        assert_eq!(a.min, Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(a.max, Vector3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn ray_through_box_hits() {
        let b = BoundingBox::from_points(&[Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0)]);
        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = b.intersect(&ray, 0.0, 1000.0);
        assert!(hit.is_some());
        let (entry, exit) = hit.unwrap();
        assert!((entry - 4.0).abs() < 1e-9);
        assert!((exit - 6.0).abs() < 1e-9);
    }

    #[test]
    fn ray_missing_box_returns_none() {
        let b = BoundingBox::from_points(&[Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0)]);
        let ray = Ray::new(Vector3::new(10.0, 10.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(b.intersect(&ray, 0.0, 1000.0).is_none());
    }

    #[test]
    fn empty_box_never_hits() {
        let b = BoundingBox::empty();
        let ray = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));
        assert!(b.intersect(&ray, 0.0, 1000.0).is_none());
    }
}

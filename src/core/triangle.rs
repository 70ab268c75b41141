//! A triangle referencing three vertex positions in its owning
//! [`Geometry`](crate::core::geometry::Geometry), plus an intersection
//! primitive, barycentric interpolation of normals/texcoords and
//! reflection-direction helper (§3, §4.1).
//!
//! Triangles store both the *indices* of their vertices/texcoords in
//! the owning geometry (so authoring-time merges and transforms stay
//! index-stable — see Design Notes §9) and a cache of the data needed
//! for fast intersection (positions, face normal, edge vectors). The
//! cache is only as fresh as the last [`Triangle::update`] call —
//! exactly the contract `Geometry::updateTriangles()` exists to
//! satisfy in the original renderer.

use crate::core::bounding_box::BoundingBox;
use crate::core::ray::Ray;
use crate::core::vector::{Float, Vector2, Vector3};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::core::material::Material;

static NEXT_TRIANGLE_ID: AtomicU64 = AtomicU64::new(1);

/// A monotonically increasing identity tag. Used instead of the
/// original C++ code's triangle-center float comparison to decide
/// "is this the same triangle" during shadow testing — see Open
/// Question #5 in spec.md §9.
fn next_triangle_id() -> u64 {
    NEXT_TRIANGLE_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Clone)]
pub struct Triangle {
    pub id: u64,
    pub vertex_indices: [u32; 3],
    pub texcoord_indices: Option<[u32; 3]>,
    /// Per-vertex normals, deep-copied at construction time (Open
    /// Question #6: we always own our normals rather than retaining a
    /// pointer to a source triangle's normals, so there is no
    /// lifetime hazard when a triangle is copied via
    /// `Geometry::addTriangle(&Triangle)`).
    pub vertex_normals: Option<[Vector3; 3]>,
    pub material: Arc<Material>,

    // Cached fields, valid until the next vertex mutation; refreshed by `update`.
    p: [Vector3; 3],
    uv: [Vector2; 3],
    face_normal: Vector3,
    edge1: Vector3,
    edge2: Vector3,
}

impl Triangle {
    pub fn new(
        vertex_indices: [u32; 3],
        texcoord_indices: Option<[u32; 3]>,
        vertex_normals: Option<[Vector3; 3]>,
        material: Arc<Material>,
        vertices: &[Vector3],
        texture_coords: &[Vector2],
    ) -> Self {
        let mut triangle = Triangle {
            id: next_triangle_id(),
            vertex_indices,
            texcoord_indices,
            vertex_normals,
            material,
            p: [Vector3::zero(); 3],
            uv: [Vector2::default(); 3],
            face_normal: Vector3::zero(),
            edge1: Vector3::zero(),
            edge2: Vector3::zero(),
        };
        triangle.update(vertices, texture_coords);
        triangle
    }

    /// Recomputes cached positions, uv, face normal and edge vectors
    /// from the (possibly just-transformed) owning geometry's vertex
    /// store. Must be called after any affine transform of the
    /// underlying vertices, and after normal smoothing has assigned
    /// `vertex_normals`.
    pub fn update(&mut self, vertices: &[Vector3], texture_coords: &[Vector2]) {
        self.p = [
            vertices[self.vertex_indices[0] as usize],
            vertices[self.vertex_indices[1] as usize],
            vertices[self.vertex_indices[2] as usize],
        ];
        self.uv = match self.texcoord_indices {
            Some(idx) => [
                texture_coords[idx[0] as usize],
                texture_coords[idx[1] as usize],
                texture_coords[idx[2] as usize],
            ],
            None => [Vector2::default(); 3],
        };
        self.edge1 = self.p[1] - self.p[0];
        self.edge2 = self.p[2] - self.p[0];
        let cross = self.edge1.cross(&self.edge2);
        self.face_normal = if cross.norm_squared() > 0.0 {
            cross.normalized()
        } else {
            Vector3::zero()
        };
    }

    pub fn vertex(&self, i: usize) -> Vector3 {
        self.p[i]
    }

    pub fn uv_corner(&self, i: usize) -> Vector2 {
        self.uv[i]
    }

    pub fn center(&self) -> Vector3 {
        (self.p[0] + self.p[1] + self.p[2]) / 3.0
    }

    pub fn face_normal(&self) -> Vector3 {
        self.face_normal
    }

    /// Tight bounding box of the three vertex positions, used by the BVH build (§4.4).
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.p)
    }

    pub fn has_texture_coordinates(&self) -> bool {
        self.texcoord_indices.is_some()
    }

    /// Möller–Trumbore intersection (§4.1). Returns `(t, u, v)` on hit.
    pub fn intersect(&self, ray: &Ray) -> Option<(Float, Float, Float)> {
        const EPS: Float = 1e-9;
        let p_vec = ray.direction.cross(&self.edge2);
        let det = self.edge1.dot(&p_vec);
        if det.abs() < EPS {
            return None; // ray parallel to the triangle
        }
        let inv_det = 1.0 / det;
        let t_vec = ray.origin - self.p[0];
        let u = t_vec.dot(&p_vec) * inv_det;
        if u < 0.0 || u > 1.0 {
            return None;
        }
        let q_vec = t_vec.cross(&self.edge1);
        let v = ray.direction.dot(&q_vec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = self.edge2.dot(&q_vec) * inv_det;
        if t <= EPS {
            return None;
        }
        Some((t, u, v))
    }

    /// Barycentric-interpolated normal at `(u, v)`, front-facing
    /// w.r.t. `incoming` (§4.1). Falls back to the face normal when no
    /// per-vertex normals are present.
    pub fn sample_normal(&self, u: Float, v: Float, incoming: Vector3) -> Vector3 {
        let mut n = match &self.vertex_normals {
            Some(normals) => {
                let interpolated = normals[0] * (1.0 - u - v) + normals[1] * u + normals[2] * v;
                if interpolated.norm_squared() > 0.0 {
                    interpolated.normalized()
                } else {
                    self.face_normal
                }
            }
            None => self.face_normal,
        };
        if n.dot(&incoming) > 0.0 {
            n = -n;
        }
        n
    }

    /// Barycentric-interpolated texture coordinate at `(u, v)`.
    pub fn sample_uv(&self, u: Float, v: Float) -> Vector2 {
        self.uv[0] * (1.0 - u - v) + self.uv[1] * u + self.uv[2] * v
    }

    /// Samples the material's bound texture at `(u, v)`, or white if
    /// no texcoords/texture are present (§4.1).
    pub fn sample_texture(&self, u: Float, v: Float) -> Vector3 {
        if !self.has_texture_coordinates() {
            return Vector3::new(1.0, 1.0, 1.0);
        }
        self.material.sample_texture(self.sample_uv(u, v))
    }

    /// Reflection of unit incident `incoming` about unit `normal` (§4.1).
    pub fn reflection_direction(incoming: Vector3, normal: Vector3) -> Vector3 {
        incoming - normal * (2.0 * incoming.dot(&normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_triangle(p0: Vector3, p1: Vector3, p2: Vector3) -> Triangle {
        let vertices = vec![p0, p1, p2];
        Triangle::new([0, 1, 2], None, None, Arc::new(Material::default()), &vertices, &[])
    }

    #[test]
    fn intersection_inside_triangle_has_valid_barycentrics() {
        let t = make_triangle(
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        let ray = Ray::new(Vector3::new(0.0, -0.1, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = t.intersect(&ray).expect("ray should hit triangle interior");
        let (tt, u, v) = hit;
        assert!(u >= 0.0 && v >= 0.0 && u + v <= 1.0);
        let p = ray.point_at(tt);
        // Triangle lies in the z=0 plane.
        assert!(p.z.abs() < 1e-6);
    }

    #[test]
    fn ray_outside_triangle_misses() {
        let t = make_triangle(
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        let ray = Ray::new(Vector3::new(5.0, 5.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(t.intersect(&ray).is_none());
    }

    #[test]
    fn parallel_ray_misses() {
        let t = make_triangle(
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        let ray = Ray::new(Vector3::new(0.0, 0.0, -1.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(t.intersect(&ray).is_none());
    }

    #[test]
    fn reflection_is_coplanar_and_mirrors_normal_component() {
        let n = Vector3::new(0.0, 1.0, 0.0);
        let i = Vector3::new(1.0, -1.0, 0.0).normalized();
        let r = Triangle::reflection_direction(i, n);
        assert!((r.dot(&n) - (-i.dot(&n))).abs() < 1e-9);
        // Coplanarity: r should be expressible in the i/n plane, i.e. (i x n) . r == 0.
        let binormal = i.cross(&n);
        assert!(binormal.dot(&r).abs() < 1e-9);
    }
}

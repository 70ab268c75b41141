//! Owning container of vertices/texcoords/triangles, growth-only
//! during authoring (§3). References into these sequences are plain
//! `u32` indices, which stay valid under further `add_vertex`/
//! `add_triangle` calls regardless of any internal reallocation —
//! the safe-Rust equivalent of the append-only chunked container
//! Design Notes §9 calls for.

use crate::core::error::AuthoringError;
use crate::core::material::Material;
use crate::core::triangle::Triangle;
use crate::core::vector::{Float, Quaternion, Vector2, Vector3};
use crate::core::vertex_normals::compute_vertex_normals;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Geometry {
    vertices: Vec<Vector3>,
    texture_coords: Vec<Vector2>,
    triangles: Vec<Triangle>,
}

impl Geometry {
    pub fn new() -> Self {
        Geometry::default()
    }

    pub fn vertices(&self) -> &[Vector3] {
        &self.vertices
    }

    pub fn texture_coords(&self) -> &[Vector2] {
        &self.texture_coords
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn add_vertex(&mut self, vertex: Vector3) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    pub fn add_texture_coordinate(&mut self, coord: Vector2) -> u32 {
        self.texture_coords.push(coord);
        (self.texture_coords.len() - 1) as u32
    }

    fn check_vertex_index(&self, index: u32) -> Result<(), AuthoringError> {
        if (index as usize) < self.vertices.len() {
            Ok(())
        } else {
            Err(AuthoringError::VertexIndexOutOfRange {
                index,
                len: self.vertices.len(),
            })
        }
    }

    fn check_texcoord_index(&self, index: u32) -> Result<(), AuthoringError> {
        if (index as usize) < self.texture_coords.len() {
            Ok(())
        } else {
            Err(AuthoringError::TexCoordIndexOutOfRange {
                index,
                len: self.texture_coords.len(),
            })
        }
    }

    /// Adds a triangle by vertex index. If the geometry has any
    /// texture coordinates at all, every vertex of the triangle must
    /// also carry one (§3 invariant).
    pub fn add_triangle_indexed(
        &mut self,
        indices: [u32; 3],
        texcoord_indices: Option<[u32; 3]>,
        material: Arc<Material>,
        vertex_normals: Option<[Vector3; 3]>,
    ) -> Result<(), AuthoringError> {
        for i in &indices {
            self.check_vertex_index(*i)?;
        }
        if !self.texture_coords.is_empty() && texcoord_indices.is_none() {
            return Err(AuthoringError::PartialTextureCoordinates);
        }
        if let Some(tc) = texcoord_indices {
            for i in &tc {
                self.check_texcoord_index(*i)?;
            }
        }
        let triangle = Triangle::new(
            indices,
            texcoord_indices,
            vertex_normals,
            material,
            &self.vertices,
            &self.texture_coords,
        );
        self.triangles.push(triangle);
        Ok(())
    }

    /// Adds a triangle from raw positions, appending new vertices.
    pub fn add_triangle(
        &mut self,
        p0: Vector3,
        p1: Vector3,
        p2: Vector3,
        material: Arc<Material>,
        vertex_normals: Option<[Vector3; 3]>,
    ) {
        let i0 = self.add_vertex(p0);
        let i1 = self.add_vertex(p1);
        let i2 = self.add_vertex(p2);
        self.add_triangle_indexed([i0, i1, i2], None, material, vertex_normals)
            .expect("freshly appended vertex indices are always in range");
    }

    /// Deep-copies another triangle's vertices/texcoords/normals into
    /// this geometry (used by [`Geometry::merge`]).
    pub fn add_triangle_copy(&mut self, other: &Triangle) {
        let p = [other.vertex(0), other.vertex(1), other.vertex(2)];
        let texcoords = if other.has_texture_coordinates() {
            Some([other.uv_corner(0), other.uv_corner(1), other.uv_corner(2)])
        } else {
            None
        };
        let i0 = self.add_vertex(p[0]);
        let i1 = self.add_vertex(p[1]);
        let i2 = self.add_vertex(p[2]);
        let texcoord_indices = texcoords.map(|uv| {
            [
                self.add_texture_coordinate(uv[0]),
                self.add_texture_coordinate(uv[1]),
                self.add_texture_coordinate(uv[2]),
            ]
        });
        self.add_triangle_indexed([i0, i1, i2], texcoord_indices, other.material.clone(), other.vertex_normals)
            .expect("freshly appended vertex indices are always in range");
    }

    /// Merges `other` into this geometry (§6 scene authoring API,
    /// `Scene::add(Geometry)` semantics), deep-copying its vertices,
    /// texcoords and triangles.
    pub fn merge(&mut self, other: &Geometry) {
        for triangle in &other.triangles {
            self.add_triangle_copy(triangle);
        }
    }

    /// Re-syncs every triangle's cached positions/uv/normal/edges from
    /// the current vertex/texcoord store. Must be called after any
    /// affine transform of the vertices (§3 invariant).
    pub fn update_triangles(&mut self) {
        for triangle in &mut self.triangles {
            triangle.update(&self.vertices, &self.texture_coords);
        }
    }

    pub fn translate(&mut self, t: Vector3) {
        for v in &mut self.vertices {
            *v = *v + t;
        }
        self.update_triangles();
    }

    pub fn scale(&mut self, factor: Float) {
        for v in &mut self.vertices {
            *v = *v * factor;
        }
        self.update_triangles();
    }

    pub fn scale_x(&mut self, factor: Float) {
        for v in &mut self.vertices {
            v.x *= factor;
        }
        self.update_triangles();
    }

    pub fn scale_y(&mut self, factor: Float) {
        for v in &mut self.vertices {
            v.y *= factor;
        }
        self.update_triangles();
    }

    pub fn scale_z(&mut self, factor: Float) {
        for v in &mut self.vertices {
            v.z *= factor;
        }
        self.update_triangles();
    }

    pub fn rotate(&mut self, q: &Quaternion) {
        for v in &mut self.vertices {
            *v = q.rotate(*v);
        }
        self.update_triangles();
    }

    /// Computes per-vertex normals averaging adjacent face normals
    /// whose pairwise angle is within `angle` (§4.2); default caller
    /// (`Scene::add`) uses `π/8`.
    pub fn compute_vertex_normals(&mut self, angle: Float) {
        if self.triangles.is_empty() {
            return;
        }
        let cos_angle_limit = angle.cos();
        let corners: Vec<(u32, Vector3)> = self
            .triangles
            .iter()
            .flat_map(|t| t.vertex_indices.iter().map(move |&i| (i, t.face_normal())))
            .collect();
        let smoothed = compute_vertex_normals(&corners, cos_angle_limit);
        let mut idx = 0;
        for triangle in &mut self.triangles {
            let normals = [smoothed[idx], smoothed[idx + 1], smoothed[idx + 2]];
            idx += 3;
            triangle.vertex_normals = Some(normals);
        }
        self.update_triangles();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_material() -> Arc<Material> {
        Arc::new(Material::default())
    }

    #[test]
    fn add_triangle_indexed_rejects_out_of_range_vertex() {
        let mut g = Geometry::new();
        g.add_vertex(Vector3::zero());
        let err = g.add_triangle_indexed([0, 1, 2], None, default_material(), None).unwrap_err();
        assert_eq!(
            err,
            AuthoringError::VertexIndexOutOfRange { index: 1, len: 1 }
        );
    }

    #[test]
    fn merge_copies_triangles_and_preserves_material() {
        let mut a = Geometry::new();
        a.add_triangle(
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            default_material(),
            None,
        );
        let mut b = Geometry::new();
        b.merge(&a);
        assert_eq!(b.triangles().len(), 1);
        assert_eq!(b.vertices().len(), 3);
    }

    #[test]
    fn scale_updates_cached_triangle_positions() {
        let mut g = Geometry::new();
        g.add_triangle(
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            default_material(),
            None,
        );
        g.scale(2.0);
        assert_eq!(g.triangles()[0].vertex(0), Vector3::new(-2.0, -2.0, 0.0));
    }
}

//! Per-vertex normal smoothing (§4.2).
//!
//! For every (triangle, corner) pair, the assigned normal is the
//! normalized sum of incident face normals whose pairwise angle with
//! that triangle's own face normal is within the cosine threshold —
//! triangles that would produce a sharp crease keep their flat (face)
//! normal at that corner instead of blending with the neighbor.

use crate::core::vector::{Float, Vector3};
use std::collections::HashMap;

/// Groups incident face normals by vertex index, then assigns each
/// (triangle, corner) a normal averaging only the "close" neighbors
/// (face-normal cosine angle >= `cos_angle_limit`).
///
/// `triangles` is `(vertex_index, face_normal)` triples grouped by
/// triangle (three consecutive entries per triangle, i.e. length must
/// be a multiple of three).
pub fn compute_vertex_normals(corners: &[(u32, Vector3)], cos_angle_limit: Float) -> Vec<Vector3> {
    debug_assert_eq!(corners.len() % 3, 0);

    let mut incident: HashMap<u32, Vec<Vector3>> = HashMap::new();
    for &(vertex_index, face_normal) in corners {
        incident.entry(vertex_index).or_insert_with(Vec::new).push(face_normal);
    }

    corners
        .iter()
        .map(|&(vertex_index, face_normal)| {
            let neighbors = &incident[&vertex_index];
            let mut sum = Vector3::zero();
            for &candidate in neighbors {
                if face_normal.dot(&candidate) >= cos_angle_limit {
                    sum += candidate;
                }
            }
            if sum.norm_squared() > 0.0 {
                sum.normalized()
            } else {
                face_normal
            }
        })
        .collect()
}

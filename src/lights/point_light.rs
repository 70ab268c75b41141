//! A point light: a position and a color, nothing else (§3 Data Model).

use crate::core::vector::Vector3;

#[derive(Clone, Copy, Debug)]
pub struct PointLight {
    pub position: Vector3,
    pub color: Vector3,
}

impl PointLight {
    pub fn new(position: Vector3, color: Vector3) -> Self {
        PointLight { position, color }
    }
}

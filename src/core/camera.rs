//! Pinhole camera: generates a primary ray for a normalized screen
//! coordinate in `[0,1]²` (§4 component 9).

use crate::core::ray::Ray;
use crate::core::vector::{Float, Vector3};

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    position: Vector3,
    /// Orthonormal basis: `right`, `up`, `forward` (unit, forward points into the scene).
    right: Vector3,
    up: Vector3,
    forward: Vector3,
    /// Half the vertical field of view's tangent; controls how much of the
    /// image plane a unit step in normalized screen space covers.
    tan_half_fov: Float,
    aspect: Float,
}

impl Camera {
    /// Builds a camera at `position` looking toward `target`, with `up`
    /// as the approximate up direction and `fov_y` in radians.
    pub fn look_at(position: Vector3, target: Vector3, up: Vector3, fov_y: Float, aspect: Float) -> Self {
        let forward = (target - position).normalized();
        let right = forward.cross(&up).normalized();
        let true_up = right.cross(&forward).normalized();
        Camera {
            position,
            right,
            up: true_up,
            forward,
            tan_half_fov: (fov_y * 0.5).tan(),
            aspect,
        }
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Generates the primary ray through normalized screen coordinate
    /// `(sx, sy) ∈ [0,1]²`, with `(0,0)` at the top-left of the image.
    pub fn generate_ray(&self, sx: Float, sy: Float) -> Ray {
        let ndc_x = (2.0 * sx - 1.0) * self.aspect * self.tan_half_fov;
        let ndc_y = (1.0 - 2.0 * sy) * self.tan_half_fov;
        let direction = (self.forward + self.right * ndc_x + self.up * ndc_y).normalized();
        Ray::new(self.position, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn center_ray_points_along_forward_axis() {
        let camera = Camera::look_at(
            Vector3::new(0.0, 0.0, 2.0),
            Vector3::zero(),
            Vector3::new(0.0, 1.0, 0.0),
            FRAC_PI_2,
            1.0,
        );
        let ray = camera.generate_ray(0.5, 0.5);
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-9);
    }

    #[test]
    fn corner_rays_diverge_symmetrically() {
        let camera = Camera::look_at(
            Vector3::new(0.0, 0.0, 2.0),
            Vector3::zero(),
            Vector3::new(0.0, 1.0, 0.0),
            FRAC_PI_2,
            1.0,
        );
        let left = camera.generate_ray(0.0, 0.5);
        let right = camera.generate_ray(1.0, 0.5);
        assert!((left.direction.x + right.direction.x).abs() < 1e-9);
    }
}

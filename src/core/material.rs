//! Surface material: Phong coefficients, emissive term, and an
//! optional texture bitmap sampled with clamp-to-edge (§3, §4.1).

use crate::core::vector::{Float, Vector2, Vector3};
use image::RgbImage;

/// An immutable bundle of Phong coefficients plus an optional texture.
///
/// A material is emissive — and therefore acts as a light — iff
/// [`Material::emissive`] is non-zero.
#[derive(Clone)]
pub struct Material {
    pub ambient: Vector3,
    pub diffuse: Vector3,
    pub specular: Vector3,
    pub shininess: Float,
    pub emissive: Vector3,
    texture: Option<RgbImage>,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            ambient: Vector3::zero(),
            diffuse: Vector3::zero(),
            specular: Vector3::zero(),
            shininess: 1.0,
            emissive: Vector3::zero(),
            texture: None,
        }
    }
}

impl Material {
    pub fn new(ambient: Vector3, diffuse: Vector3, specular: Vector3, shininess: Float, emissive: Vector3) -> Self {
        Material {
            ambient,
            diffuse,
            specular,
            shininess,
            emissive,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: RgbImage) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn is_light(&self) -> bool {
        self.emissive.x > 0.0 || self.emissive.y > 0.0 || self.emissive.z > 0.0
    }

    /// Samples the bound bitmap at `(s, t)` with clamp-to-edge; white
    /// (1, 1, 1) if no texture is bound (§4.1).
    pub fn sample_texture(&self, uv: Vector2) -> Vector3 {
        match &self.texture {
            None => Vector3::new(1.0, 1.0, 1.0),
            Some(image) => {
                let (w, h) = image.dimensions();
                if w == 0 || h == 0 {
                    return Vector3::new(1.0, 1.0, 1.0);
                }
                let clamp = |v: Float, max: u32| -> u32 {
                    let scaled = (v * max as Float) as i64;
                    scaled.max(0).min(max as i64 - 1) as u32
                };
                let x = clamp(uv.x, w);
                // Image row 0 is the top of the bitmap; texture (0,0) is bottom-left.
                let y = clamp(1.0 - uv.y, h);
                let pixel = image.get_pixel(x, y);
                Vector3::new(
                    pixel[0] as Float / 255.0,
                    pixel[1] as Float / 255.0,
                    pixel[2] as Float / 255.0,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untextured_material_samples_white() {
        let m = Material::default();
        let c = m.sample_texture(Vector2::new(0.3, 0.7));
        assert_eq!(c, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn emissive_material_is_a_light() {
        let mut m = Material::default();
        assert!(!m.is_light());
        m.emissive = Vector3::new(1.0, 1.0, 1.0);
        assert!(m.is_light());
    }
}

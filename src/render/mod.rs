//! The rendering kernel (§4.6, §4.7, §4.8): direct Phong shading with
//! mirror reflection, Monte Carlo path tracing with Russian roulette,
//! and the multi-pass subpixel-jittered pixel accumulator.

pub mod accumulate;

use crate::core::bvh::{intersect_linear, Accelerator, Bvh};
use crate::core::ray::{CastedRay, Hit, Ray};
use crate::core::triangle::Triangle;
use crate::core::vector::{Float, Vector3};
use crate::lights::{LightSource, PointLight};
use rand::Rng;
use std::f64::consts::PI;

/// Fixed mirror-reflection attenuation (§4.6): `I = emissive + phongDirect
/// + specular·sendRay(reflected) · k_refl`.
const K_REFL: Float = 0.1;

/// Configuration switches from §6: "Configuration switches".
#[derive(Clone, Copy, Debug)]
pub struct RenderSettings {
    pub max_depth: u32,
    pub sub_pixel_division: u32,
    pub pass_per_pixel: u32,
    pub gi_surface: bool,
    pub gi_indirect: bool,
    pub gi_graine_unique: bool,
    pub accelerator: Accelerator,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            max_depth: 4,
            sub_pixel_division: 1,
            pass_per_pixel: 1,
            gi_surface: false,
            gi_indirect: false,
            gi_graine_unique: false,
            accelerator: Accelerator::Bvh,
        }
    }
}

/// Bundles the frozen, read-only scene state a render task needs (§5:
/// "Read-only during rendering"). Built once per `compute()` call.
pub struct RenderContext<'a> {
    pub triangles: &'a [&'a Triangle],
    pub bvh: &'a Bvh,
    pub point_lights: &'a [PointLight],
    pub area_lights: &'a [LightSource],
    pub settings: RenderSettings,
}

impl<'a> RenderContext<'a> {
    /// Resolves the closest hit for `ray` using the configured
    /// acceleration strategy.
    pub fn trace(&self, ray: Ray) -> CastedRay<'a> {
        let mut cray = CastedRay::new(ray);
        match self.settings.accelerator {
            Accelerator::Bvh => self.bvh.intersect(self.triangles, &mut cray),
            Accelerator::LinearScan => intersect_linear(self.triangles, &mut cray),
        }
        cray
    }

    /// `phongShadow` (§4.6): casts a ray from `light_pos` toward
    /// `hit_point`; occluded if it hits any triangle other than the one
    /// carrying the original hit. Triangle identity (not center
    /// equality, see spec Open Question #5) decides "other".
    fn shadowed(&self, light_pos: Vector3, hit_point: Vector3, occluder_id: u64) -> bool {
        let to_point = hit_point - light_pos;
        let distance = to_point.norm();
        if distance <= 0.0 {
            return false;
        }
        let shadow_ray = Ray::new(light_pos, to_point);
        let cray = self.trace(shadow_ray);
        match cray.intersection() {
            Some(Hit { triangle, t, .. }) => triangle.id != occluder_id && *t < 1.0 - 1e-4,
            None => false,
        }
    }
}

/// `phongDiffuse` (§4.6): inverse-linear falloff — preserved as-is per
/// spec Open Question #1, though physically an inverse-square falloff
/// would be expected. `l` points from the hit point toward the light.
fn phong_diffuse(diffuse: Vector3, n: Vector3, l: Vector3) -> Vector3 {
    let distance = l.norm();
    if distance <= 0.0 {
        return Vector3::zero();
    }
    let l_hat = l / distance;
    let cos_theta = n.dot(&l_hat).max(0.0);
    diffuse * (cos_theta / distance)
}

/// `phongSpecular` (§4.6). `reflection_direction` takes the *incident*
/// direction, i.e. from the light toward the hit point — the negation
/// of `l` (which points from the hit point to the light) — matching
/// spec §4.6's `R = reflect(L̂, N̂)` with `L = hitPoint − lightPos`.
/// Reflecting `l_hat` instead of `-l_hat` would flip `r`'s sign and
/// zero out every highlight where the light and the eye are on the
/// same side of the surface, which is the common case.
fn phong_specular(specular: Vector3, shininess: Float, n: Vector3, l: Vector3, view: Vector3) -> Vector3 {
    let distance = l.norm();
    if distance <= 0.0 {
        return Vector3::zero();
    }
    let l_hat = l / distance;
    let r = Triangle::reflection_direction(-l_hat, n);
    let cos_alpha = view.dot(&r).max(0.0);
    specular * (cos_alpha.powf(shininess) / distance)
}

/// `phongDirect` (§4.6): accumulates diffuse+specular contribution from
/// either the area-light samplers (if any exist and `gi_surface` is
/// set) or the point lights, each tested for occlusion.
fn phong_direct(ctx: &RenderContext, hit_point: Vector3, normal: Vector3, view: Vector3, hit: &Hit, rng: &mut impl Rng) -> Vector3 {
    let material = &hit.triangle.material;
    let mut sum = Vector3::zero();

    let mut accumulate = |light: &PointLight| {
        let l = light.position - hit_point;
        if ctx.shadowed(light.position, hit_point, hit.triangle.id) {
            return;
        }
        let contribution = phong_diffuse(material.diffuse, normal, l) + phong_specular(material.specular, material.shininess, normal, l, view);
        sum += contribution.mul_componentwise(&light.color);
    };

    if ctx.settings.gi_surface && !ctx.area_lights.is_empty() {
        for area_light in ctx.area_lights {
            let sample = area_light.generate(rng);
            accumulate(&sample);
        }
    } else {
        for point_light in ctx.point_lights {
            accumulate(point_light);
        }
    }
    sum
}

/// `sendRay` (§4.6): direct Phong illumination plus recursive mirror
/// reflection, hard-capped at `max_depth`.
pub fn send_ray(ctx: &RenderContext, ray: Ray, depth: u32, rng: &mut impl Rng) -> Vector3 {
    if depth > ctx.settings.max_depth {
        return Vector3::zero();
    }
    let cray = ctx.trace(ray);
    let hit = match cray.intersection() {
        Some(hit) => *hit,
        None => return Vector3::zero(),
    };

    let hit_point = ray.point_at(hit.t);
    let normal = hit.triangle.sample_normal(hit.u, hit.v, ray.direction.normalized());
    let view = -ray.direction.normalized();
    let material = &hit.triangle.material;
    let texture = hit.triangle.sample_texture(hit.u, hit.v);

    let direct = phong_direct(ctx, hit_point, normal, view, &hit, rng);

    let mirror = if material.specular.norm_squared() > 0.0 {
        let reflected = Triangle::reflection_direction(ray.direction.normalized(), normal);
        let reflected_ray = Ray::new(hit_point + normal * 1e-4, reflected);
        send_ray(ctx, reflected_ray, depth + 1, rng) * K_REFL
    } else {
        Vector3::zero()
    };

    let total = material.emissive + direct + mirror.mul_componentwise(&material.specular);
    total.mul_componentwise(&texture)
}

/// Samples a direction on the hemisphere around `normal`, uniform in
/// solid angle (§4.7 step 3).
fn sample_hemisphere(normal: Vector3, rng: &mut impl Rng) -> Vector3 {
    let u: Float = rng.gen_range(0.0, 1.0);
    let v: Float = rng.gen_range(0.0, 1.0);
    // u is used directly as cos(theta): uniform in [0,1) over solid angle
    // when paired with the sin(theta) radius below.
    let r = (1.0 - u * u).max(0.0).sqrt();
    let phi = 2.0 * PI * v;
    let tangent = if normal.x.abs() < 0.9 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    }
    .cross(&normal)
    .normalized();
    let bitangent = normal.cross(&tangent);
    (tangent * (r * phi.cos()) + bitangent * (r * phi.sin()) + normal * u).normalized()
}

/// `pathTracing` (§4.7): Monte Carlo indirect bounce with biased
/// Russian-roulette termination, preserved as-is per spec Open Question
/// #2 (`absorption = 1 - p`, continue while `p < absorption`, i.e. a
/// fixed ~50% continuation probability). A hard `max_depth` cap is
/// added per spec Open Question #3's recommendation — the original has
/// none and relies purely on probabilistic termination.
pub fn path_tracing(ctx: &RenderContext, ray: Ray, depth: u32, rng: &mut impl Rng) -> Vector3 {
    if depth > ctx.settings.max_depth {
        return Vector3::zero();
    }
    let cray = ctx.trace(ray);
    let hit = match cray.intersection() {
        Some(hit) => *hit,
        None => return Vector3::zero(),
    };

    let hit_point = ray.point_at(hit.t);
    let normal = hit.triangle.sample_normal(hit.u, hit.v, ray.direction.normalized());
    let view = -ray.direction.normalized();
    let texture = hit.triangle.sample_texture(hit.u, hit.v);
    let material = &hit.triangle.material;
    let direct = phong_direct(ctx, hit_point, normal, view, &hit, rng).mul_componentwise(&texture);

    let p: Float = rng.gen_range(0.0, 1.0);
    let absorption = 1.0 - p;
    if p < absorption {
        let direction = sample_hemisphere(normal, rng);
        let bounce_ray = Ray::new(hit_point + normal * 1e-4, direction);
        let indirect = path_tracing(ctx, bounce_ray, depth + 1, rng);
        material.emissive + direct + indirect * absorption
    } else {
        material.emissive + direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bvh::Bvh;
    use crate::core::material::Material;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    #[test]
    fn phong_diffuse_is_positive_when_l_faces_the_normal() {
        let n = Vector3::new(0.0, 0.0, 1.0);
        let l = Vector3::new(0.0, 0.0, 2.0); // points toward the light, same side as n
        let d = phong_diffuse(Vector3::new(1.0, 1.0, 1.0), n, l);
        assert!(d.x > 0.0 && (d.x - 0.5).abs() < 1e-9); // cos_theta=1, distance=2
    }

    #[test]
    fn phong_diffuse_is_zero_when_l_faces_away_from_the_normal() {
        let n = Vector3::new(0.0, 0.0, 1.0);
        let l = Vector3::new(0.0, 0.0, -2.0);
        let d = phong_diffuse(Vector3::new(1.0, 1.0, 1.0), n, l);
        assert_eq!(d, Vector3::zero());
    }

    #[test]
    fn send_ray_returns_zero_past_max_depth() {
        let material = Arc::new(Material::default());
        let vertices = vec![Vector3::new(-1.0, -1.0, 0.0), Vector3::new(1.0, -1.0, 0.0), Vector3::new(0.0, 1.0, 0.0)];
        let t = Triangle::new([0, 1, 2], None, None, material, &vertices, &[]);
        let refs = vec![&t];
        let bvh = Bvh::build(&refs);
        let point_lights = Vec::new();
        let area_lights = Vec::new();
        let ctx = RenderContext {
            triangles: &refs,
            bvh: &bvh,
            point_lights: &point_lights,
            area_lights: &area_lights,
            settings: RenderSettings { max_depth: 2, ..RenderSettings::default() },
        };
        let ray = Ray::new(Vector3::new(0.0, -0.1, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(send_ray(&ctx, ray, 3, &mut rng), Vector3::zero());
    }

    #[test]
    fn facing_wall_directly_under_point_light_is_fully_lit() {
        let material = Arc::new(Material::new(
            Vector3::zero(),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::zero(),
            1.0,
            Vector3::zero(),
        ));
        let vertices = vec![Vector3::new(-1.0, -1.0, 0.0), Vector3::new(1.0, -1.0, 0.0), Vector3::new(0.0, 1.0, 0.0)];
        let t = Triangle::new([0, 1, 2], None, None, material, &vertices, &[]);
        let refs = vec![&t];
        let bvh = Bvh::build(&refs);
        let point_lights = vec![PointLight::new(Vector3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 1.0, 1.0))];
        let area_lights = Vec::new();
        let ctx = RenderContext {
            triangles: &refs,
            bvh: &bvh,
            point_lights: &point_lights,
            area_lights: &area_lights,
            settings: RenderSettings::default(),
        };
        // Camera-like ray straight down -z from behind the triangle, hitting it head-on
        // directly below the light, so the diffuse term reaches its peak of 1.
        let ray = Ray::new(Vector3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, -1.0));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let color = send_ray(&ctx, ray, 0, &mut rng);
        assert!((color.x - 1.0).abs() < 1e-9);
    }
}

//! Surface-area light sources with stratified sampling (§4.5).
//!
//! A `LightSource` is, in the original renderer, itself a `Geometry`
//! subclass: the light is a visible emissive mesh, *and* a sampler
//! that hands out [`PointLight`] samples for direct-illumination
//! shading. We keep the same duality: [`LightSource::geometry`]
//! returns the mesh to merge into the scene's visible triangles, while
//! [`LightSource::generate`] draws the next stratified sample.

use crate::core::geometry::Geometry;
use crate::core::material::Material;
use crate::core::vector::{Float, Quaternion, Vector3};
use crate::lights::point_light::PointLight;
use rand::Rng;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The parametric shape a [`LightSource`] samples over. `Surface` is
/// the generic case (§4.5 "pick a triangle proportional to area, then
/// barycentric sample within it"); the others are closed-form.
pub enum LightShape {
    Rectangle { width: Float, height: Float },
    Disk { radius: Float },
    Sphere { radius: Float },
    Surface { geometry: Geometry, cumulative_area: Vec<Float> },
}

impl LightShape {
    pub fn surface(geometry: Geometry) -> Self {
        let mut cumulative_area = Vec::with_capacity(geometry.triangles().len());
        let mut total = 0.0;
        for triangle in geometry.triangles() {
            let e1 = triangle.vertex(1) - triangle.vertex(0);
            let e2 = triangle.vertex(2) - triangle.vertex(0);
            total += e1.cross(&e2).norm() * 0.5;
            cumulative_area.push(total);
        }
        LightShape::Surface { geometry, cumulative_area }
    }

    /// Samples a point in the shape's local frame from stratified
    /// parameters `(u, v) ∈ [0,1)²` (§4.5).
    fn sample_local(&self, u: Float, v: Float, rng: &mut impl Rng) -> Vector3 {
        match self {
            LightShape::Rectangle { width, height } => {
                Vector3::new((u - 0.5) * width, (v - 0.5) * height, 0.0)
            }
            LightShape::Disk { radius } => {
                let r = radius * v.sqrt();
                let phi = 2.0 * PI * u;
                Vector3::new(r * phi.cos(), r * phi.sin(), 0.0)
            }
            LightShape::Sphere { radius } => {
                let z = 1.0 - 2.0 * v;
                let phi = 2.0 * PI * u;
                let r = (1.0 - z * z).max(0.0).sqrt();
                Vector3::new(radius * r * phi.cos(), radius * r * phi.sin(), radius * z)
            }
            LightShape::Surface { geometry, cumulative_area } => {
                let total = *cumulative_area.last().unwrap_or(&0.0);
                if total <= 0.0 || geometry.triangles().is_empty() {
                    return Vector3::zero();
                }
                let target = rng.gen_range(0.0, total);
                let index = cumulative_area.partition_point(|&area| area < target).min(cumulative_area.len() - 1);
                let triangle = &geometry.triangles()[index];
                let (mut su, mut sv) = (u, v);
                if su + sv > 1.0 {
                    su = 1.0 - su;
                    sv = 1.0 - sv;
                }
                triangle.vertex(0) * (1.0 - su - sv) + triangle.vertex(1) * su + triangle.vertex(2) * sv
            }
        }
    }
}

/// Builds the stratified grid of 2D sub-cells covering `[0,1]²` for
/// `sample_count` samples: a `ceil(sqrt(n)) × ceil(sqrt(n))` grid,
/// tiled rectangularly and truncated to exactly `sample_count` cells.
fn stratified_intervals(sample_count: usize) -> Vec<(Float, Float, Float, Float)> {
    if sample_count == 0 {
        return Vec::new();
    }
    let side = (sample_count as Float).sqrt().ceil() as usize;
    let step = 1.0 / side as Float;
    let mut intervals = Vec::with_capacity(sample_count);
    'rows: for row in 0..side {
        for col in 0..side {
            if intervals.len() == sample_count {
                break 'rows;
            }
            let inf1 = col as Float * step;
            let inf2 = row as Float * step;
            intervals.push((inf1, inf1 + step, inf2, inf2 + step));
        }
    }
    intervals
}

pub struct LightSource {
    shape: LightShape,
    position: Vector3,
    orientation: Quaternion,
    color: Vector3,
    intervals: Vec<(Float, Float, Float, Float)>,
    next_stratum: AtomicUsize,
    material: Arc<Material>,
}

impl LightSource {
    pub fn new(
        shape: LightShape,
        position: Vector3,
        orientation: Quaternion,
        color: Vector3,
        sample_count: usize,
        material: Arc<Material>,
    ) -> Self {
        LightSource {
            shape,
            position,
            orientation,
            color,
            intervals: stratified_intervals(sample_count.max(1)),
            next_stratum: AtomicUsize::new(0),
            material,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.intervals.len()
    }

    /// Draws the next stratified sample (§4.5): selects the next
    /// round-robin sub-cell, draws uniform randoms within it, maps to
    /// a surface point, and returns it as an emitting [`PointLight`].
    pub fn generate(&self, rng: &mut impl Rng) -> PointLight {
        let index = self.next_stratum.fetch_add(1, Ordering::Relaxed) % self.intervals.len();
        let (inf1, sup1, inf2, sup2) = self.intervals[index];
        let u = rng.gen_range(inf1, sup1);
        let v = rng.gen_range(inf2, sup2);
        let local = self.shape.sample_local(u, v, rng);
        let position = self.orientation.rotate(local) + self.position;
        PointLight::new(position, self.color)
    }

    /// The visible mesh backing this light, to be merged into the
    /// scene's rendered triangles (§6: `add(LightSource*)` also adds
    /// to the geometry list).
    pub fn geometry(&self) -> Geometry {
        match &self.shape {
            LightShape::Surface { geometry, .. } => {
                let mut copy = Geometry::new();
                copy.merge(geometry);
                copy.translate(self.position);
                copy
            }
            LightShape::Rectangle { width, height } => {
                let hw = width * 0.5;
                let hh = height * 0.5;
                let mut g = Geometry::new();
                g.add_triangle(
                    Vector3::new(-hw, -hh, 0.0),
                    Vector3::new(hw, -hh, 0.0),
                    Vector3::new(hw, hh, 0.0),
                    self.material.clone(),
                    None,
                );
                g.add_triangle(
                    Vector3::new(-hw, -hh, 0.0),
                    Vector3::new(hw, hh, 0.0),
                    Vector3::new(-hw, hh, 0.0),
                    self.material.clone(),
                    None,
                );
                g.rotate(&self.orientation);
                g.translate(self.position);
                g
            }
            LightShape::Disk { radius } | LightShape::Sphere { radius } => {
                const DIVISIONS: usize = 16;
                let mut g = Geometry::new();
                for i in 0..DIVISIONS {
                    let a0 = 2.0 * PI * i as Float / DIVISIONS as Float;
                    let a1 = 2.0 * PI * (i + 1) as Float / DIVISIONS as Float;
                    g.add_triangle(
                        Vector3::zero(),
                        Vector3::new(radius * a0.cos(), radius * a0.sin(), 0.0),
                        Vector3::new(radius * a1.cos(), radius * a1.sin(), 0.0),
                        self.material.clone(),
                        None,
                    );
                }
                g.rotate(&self.orientation);
                g.translate(self.position);
                g
            }
        }
    }
}

//! The scene façade (§4 component 11, §6 External Interfaces): owns
//! geometries, lights, camera and the BVH, and exposes the single
//! `compute` entry point that drives rendering.

use crate::core::bounding_box::BoundingBox;
use crate::core::bvh::Bvh;
use crate::core::camera::Camera;
use crate::core::geometry::Geometry;
use crate::core::triangle::Triangle;
use crate::lights::{LightSource, PointLight};
use crate::render::{RenderContext, RenderSettings};
use crate::visualizer::Visualizer;
use std::f64::consts::PI;
use thiserror::Error;

/// Default angle threshold `Scene::add(Geometry)` smooths normals at
/// (§4.2, §6).
const DEFAULT_SMOOTHING_ANGLE: f64 = PI / 8.0;

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Scene::compute called with no camera set")]
    NoCameraSet,
}

pub struct Scene {
    geometries: Vec<(BoundingBox, Geometry)>,
    point_lights: Vec<PointLight>,
    area_lights: Vec<LightSource>,
    camera: Option<Camera>,
    scene_bbox: BoundingBox,
    // Advisory per §6: "currently advisory; the renderer uses 1 sample
    // per light per hit". Retained so authoring code can call the
    // setters without the call being a silent no-op-and-forget.
    diffuse_samples: u32,
    specular_samples: u32,
    light_samples: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            geometries: Vec::new(),
            point_lights: Vec::new(),
            area_lights: Vec::new(),
            camera: None,
            scene_bbox: BoundingBox::empty(),
            diffuse_samples: 1,
            specular_samples: 1,
            light_samples: 1,
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.scene_bbox
    }

    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    pub fn area_lights(&self) -> &[LightSource] {
        &self.area_lights
    }

    /// `add(Geometry)` (§6): deep-copies `geometry` into a new scene
    /// entry, folds its bounding box into the scene bounding box, and
    /// smooths its normals at the default angle. An empty geometry is
    /// silently ignored (§7).
    pub fn add_geometry(&mut self, geometry: &Geometry) {
        if geometry.is_empty() {
            return;
        }
        let mut owned = Geometry::new();
        owned.merge(geometry);
        owned.compute_vertex_normals(DEFAULT_SMOOTHING_ANGLE);

        let bbox = BoundingBox::from_points(owned.vertices());
        self.scene_bbox.update(&bbox);
        self.geometries.push((bbox, owned));
    }

    pub fn add_point_light(&mut self, light: PointLight) {
        self.point_lights.push(light);
    }

    /// `add(LightSource*)` (§6): the light is both a sampler consulted
    /// during direct lighting AND a visible emissive surface, so its
    /// backing mesh is folded into the geometry list exactly as
    /// `add(Geometry)` would.
    pub fn add_light_source(&mut self, light: LightSource) {
        let mesh = light.geometry();
        self.add_geometry(&mesh);
        self.area_lights.push(light);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    pub fn set_diffuse_samples(&mut self, n: u32) {
        self.diffuse_samples = n;
    }

    pub fn set_specular_samples(&mut self, n: u32) {
        self.specular_samples = n;
    }

    pub fn set_light_samples(&mut self, n: u32) {
        self.light_samples = n;
    }

    pub fn diffuse_samples(&self) -> u32 {
        self.diffuse_samples
    }

    pub fn specular_samples(&self) -> u32 {
        self.specular_samples
    }

    pub fn light_samples(&self) -> u32 {
        self.light_samples
    }

    fn collect_triangle_refs(&self) -> Vec<&Triangle> {
        self.geometries.iter().flat_map(|(_, g)| g.triangles()).collect()
    }

    /// `compute(maxDepth, subPixelDivision, passPerPixel)` (§4.8, §6):
    /// builds the BVH once, then renders every pass into `visualizer`.
    pub fn compute(&self, settings: RenderSettings, visualizer: &mut dyn Visualizer) -> Result<(), ComputeError> {
        self.compute_with_progress(settings, visualizer, |_done, _total| {})
    }

    /// Same contract as [`Scene::compute`], reporting progress after
    /// every `(pass, subpixel)` iteration — see
    /// [`crate::render::accumulate::render_with_progress`].
    pub fn compute_with_progress(
        &self,
        settings: RenderSettings,
        visualizer: &mut dyn Visualizer,
        on_pass: impl FnMut(u32, u32),
    ) -> Result<(), ComputeError> {
        let camera = self.camera.as_ref().ok_or(ComputeError::NoCameraSet)?;

        let triangles = self.collect_triangle_refs();
        let bvh = Bvh::build(&triangles);

        let ctx = RenderContext {
            triangles: &triangles,
            bvh: &bvh,
            point_lights: &self.point_lights,
            area_lights: &self.area_lights,
            settings,
        };

        crate::render::accumulate::render_with_progress(&ctx, camera, visualizer, on_pass);
        Ok(())
    }
}

//! Demo driver: authors a small built-in scene, renders it with the
//! kernel in `ray_casting_tracer`, and writes the result to a PNG.
//!
//! Model loading and scene-authoring UI are out of scope for the
//! library (§1); this binary plays the role of that external driver,
//! exercising the authoring API (`Scene::add_geometry`, `add_point_light`,
//! `add_light_source`, `set_camera`) directly instead of parsing an
//! asset file.

use pbr::ProgressBar;
use ray_casting_tracer::core::bvh::Accelerator;
use ray_casting_tracer::core::camera::Camera;
use ray_casting_tracer::core::geometry::Geometry;
use ray_casting_tracer::core::material::Material;
use ray_casting_tracer::core::vector::{Quaternion, Vector3};
use ray_casting_tracer::lights::{LightShape, LightSource, PointLight};
use ray_casting_tracer::render::RenderSettings;
use ray_casting_tracer::scene::Scene;
use ray_casting_tracer::visualizer::ImageVisualizer;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use structopt::StructOpt;

/// Which built-in demo scene to render (stands in for the model
/// loader's output — §1 "Model loading... deliberately out of scope").
#[derive(Debug, Clone, Copy)]
enum DemoScene {
    /// A single wall lit by a point light (§8 scenario 3).
    Wall,
    /// Two facing walls with an emissive rectangle light, rendered
    /// with area-light sampling and path-traced indirect bounce.
    Box,
}

impl FromStr for DemoScene {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wall" => Ok(DemoScene::Wall),
            "box" => Ok(DemoScene::Box),
            other => Err(format!("unknown scene '{}' (expected 'wall' or 'box')", other)),
        }
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "ray_casting_tracer", about = "Offline physically-based ray/path tracer")]
struct Opt {
    /// Image width in pixels.
    #[structopt(long, default_value = "256")]
    width: u32,

    /// Image height in pixels.
    #[structopt(long, default_value = "256")]
    height: u32,

    /// Maximum recursion depth for mirror reflection / path-traced bounces.
    #[structopt(long, default_value = "4")]
    max_depth: u32,

    /// Subpixel grid side (subPixelDivision² samples per pixel per pass).
    #[structopt(long, default_value = "1")]
    sub_pixel_division: u32,

    /// Number of accumulation passes per pixel.
    #[structopt(long, default_value = "1")]
    pass_per_pixel: u32,

    /// Worker thread count; defaults to the number of logical cores.
    #[structopt(long)]
    threads: Option<usize>,

    /// Use area-light stratified sampling for direct illumination instead of point lights.
    #[structopt(long)]
    gi_surface: bool,

    /// Use Monte Carlo path tracing instead of Phong + mirror reflection only.
    #[structopt(long)]
    gi_indirect: bool,

    /// Reseed each pixel's RNG from a shared per-subpixel seed (variance-reduction experiments).
    #[structopt(long)]
    gi_graine_unique: bool,

    /// Use a full linear scan instead of the BVH (correctness/perf comparison).
    #[structopt(long)]
    linear_scan: bool,

    /// Built-in demo scene: "wall" or "box".
    #[structopt(long, default_value = "wall")]
    scene: DemoScene,

    /// Output image path.
    #[structopt(long, parse(from_os_str), default_value = "render.png")]
    output: PathBuf,
}

fn wall_scene() -> Scene {
    let mut scene = Scene::new();
    let material = Arc::new(Material::new(
        Vector3::zero(),
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::zero(),
        1.0,
        Vector3::zero(),
    ));
    let mut wall = Geometry::new();
    wall.add_triangle(
        Vector3::new(-1.0, -1.0, 0.0),
        Vector3::new(1.0, -1.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
        material.clone(),
        None,
    );
    wall.add_triangle(
        Vector3::new(-1.0, -1.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(-1.0, 1.0, 0.0),
        material,
        None,
    );
    scene.add_geometry(&wall);
    scene.add_point_light(PointLight::new(Vector3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 1.0, 1.0)));
    scene.set_camera(Camera::look_at(
        Vector3::new(0.0, 0.0, 2.0),
        Vector3::zero(),
        Vector3::new(0.0, 1.0, 0.0),
        std::f64::consts::FRAC_PI_2,
        1.0,
    ));
    scene
}

fn box_scene() -> Scene {
    let mut scene = Scene::new();
    let white = Arc::new(Material::new(
        Vector3::zero(),
        Vector3::new(0.8, 0.8, 0.8),
        Vector3::zero(),
        1.0,
        Vector3::zero(),
    ));

    let mut floor = Geometry::new();
    floor.add_triangle(
        Vector3::new(-2.0, -1.0, -2.0),
        Vector3::new(2.0, -1.0, -2.0),
        Vector3::new(2.0, -1.0, 2.0),
        white.clone(),
        None,
    );
    floor.add_triangle(
        Vector3::new(-2.0, -1.0, -2.0),
        Vector3::new(2.0, -1.0, 2.0),
        Vector3::new(-2.0, -1.0, 2.0),
        white.clone(),
        None,
    );
    scene.add_geometry(&floor);

    let mut back_wall = Geometry::new();
    back_wall.add_triangle(
        Vector3::new(-2.0, -1.0, -2.0),
        Vector3::new(2.0, -1.0, -2.0),
        Vector3::new(2.0, 3.0, -2.0),
        white.clone(),
        None,
    );
    back_wall.add_triangle(
        Vector3::new(-2.0, -1.0, -2.0),
        Vector3::new(2.0, 3.0, -2.0),
        Vector3::new(-2.0, 3.0, -2.0),
        white,
        None,
    );
    scene.add_geometry(&back_wall);

    let light_material = Arc::new(Material::new(
        Vector3::zero(),
        Vector3::zero(),
        Vector3::zero(),
        1.0,
        Vector3::new(8.0, 8.0, 8.0),
    ));
    let light = LightSource::new(
        LightShape::Rectangle { width: 1.0, height: 1.0 },
        Vector3::new(0.0, 2.9, 0.0),
        Quaternion::from_axis_angle(Vector3::new(1.0, 0.0, 0.0), std::f64::consts::FRAC_PI_2),
        Vector3::new(1.0, 1.0, 1.0),
        16,
        light_material,
    );
    scene.add_light_source(light);

    scene.set_camera(Camera::look_at(
        Vector3::new(0.0, 0.5, 4.0),
        Vector3::new(0.0, 0.5, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        std::f64::consts::FRAC_PI_4,
        1.0,
    ));
    scene
}

fn main() {
    let opt = Opt::from_args();

    let threads = opt.threads.unwrap_or_else(num_cpus::get);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .expect("failed to build the rayon thread pool");

    let scene = match opt.scene {
        DemoScene::Wall => wall_scene(),
        DemoScene::Box => box_scene(),
    };

    let settings = RenderSettings {
        max_depth: opt.max_depth,
        sub_pixel_division: opt.sub_pixel_division,
        pass_per_pixel: opt.pass_per_pixel,
        gi_surface: opt.gi_surface,
        gi_indirect: opt.gi_indirect,
        gi_graine_unique: opt.gi_graine_unique,
        accelerator: if opt.linear_scan { Accelerator::LinearScan } else { Accelerator::Bvh },
    };

    let mut visualizer = ImageVisualizer::new(opt.width, opt.height);
    let total_iterations = opt.pass_per_pixel * opt.sub_pixel_division.max(1) * opt.sub_pixel_division.max(1);
    let mut progress = ProgressBar::new(total_iterations as u64);
    progress.message("rendering: ");

    let started = Instant::now();
    pool.install(|| {
        scene
            .compute_with_progress(settings, &mut visualizer, |_done, _total| {
                progress.inc();
            })
            .expect("scene has no camera set")
    });
    progress.finish_print(&format!("done in {:.2?}", started.elapsed()));

    visualizer.into_image().save(&opt.output).expect("failed to write output image");
    println!("wrote {}", opt.output.display());
}

//! Multi-pass, subpixel-jittered pixel accumulation and parallel
//! dispatch (§4.8, §5 Concurrency & Resource Model).

use crate::core::camera::Camera;
use crate::core::rng;
use crate::core::vector::{Float, Vector3};
use crate::render::{path_tracing, send_ray, RenderContext};
use crate::visualizer::Visualizer;
use rayon::prelude::*;

/// Per-pixel running sum and sample count. Pixels never alias across
/// worker tasks (§5: "each pixel is written only from the task
/// computing it"), so accumulation never needs synchronization once a
/// pass's per-pixel colors have been computed.
pub struct PixelAccumulator {
    width: u32,
    height: u32,
    sum: Vec<Vector3>,
    count: Vec<u32>,
}

impl PixelAccumulator {
    pub fn new(width: u32, height: u32) -> Self {
        let n = (width as usize) * (height as usize);
        PixelAccumulator {
            width,
            height,
            sum: vec![Vector3::zero(); n],
            count: vec![0; n],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    pub fn accumulate(&mut self, x: u32, y: u32, color: Vector3) {
        let i = self.index(x, y);
        self.sum[i] += color;
        self.count[i] += 1;
    }

    /// `pixel.sum / pixel.count · 10` — the fixed linear exposure scale
    /// of §4.8.
    pub fn resolve(&self, x: u32, y: u32) -> Vector3 {
        let i = self.index(x, y);
        if self.count[i] == 0 {
            Vector3::zero()
        } else {
            self.sum[i] / (self.count[i] as Float) * 10.0
        }
    }
}

/// Runs `compute(maxDepth, subPixelDivision, passPerPixel)` (§4.8):
/// builds no state of its own beyond the accumulator — `ctx.bvh` is
/// assumed already built by the caller (`Scene::compute`). Pixels of a
/// single pass render in parallel; passes are sequential; the
/// visualizer is only ever touched after all passes finish, from a
/// single thread, satisfying the "plot/update must be serialized"
/// requirement without extra locking.
pub fn render(ctx: &RenderContext, camera: &Camera, visualizer: &mut dyn Visualizer) {
    render_with_progress(ctx, camera, visualizer, |_done, _total| {})
}

/// Same contract as [`render`], but invokes `on_pass(done, total)`
/// after every `(pass, subpixel)` iteration finishes — the hook the
/// demo binary uses to drive a `pbr` progress bar (SPEC_FULL §2).
pub fn render_with_progress(
    ctx: &RenderContext,
    camera: &Camera,
    visualizer: &mut dyn Visualizer,
    mut on_pass: impl FnMut(u32, u32),
) {
    let width = visualizer.width();
    let height = visualizer.height();
    let mut accumulator = PixelAccumulator::new(width, height);
    let settings = ctx.settings;
    let sub = settings.sub_pixel_division.max(1);
    let step = 1.0 / sub as Float;
    let total_iterations = settings.pass_per_pixel * sub * sub;
    let mut completed = 0u32;

    for pass in 0..settings.pass_per_pixel {
        for syi in 0..sub {
            for sxi in 0..sub {
                let xp = -0.5 + (sxi as Float + 0.5) * step;
                let yp = -0.5 + (syi as Float + 0.5) * step;
                let subpixel_index = (pass * sub + syi) * sub + sxi;

                let rows: Vec<Vec<Vector3>> = (0..height)
                    .into_par_iter()
                    .map(|y| {
                        let mut row = Vec::with_capacity(width as usize);
                        for x in 0..width {
                            let mut pixel_rng = if settings.gi_graine_unique {
                                rng::rng_for_subpixel(subpixel_index)
                            } else {
                                rng::rng_for_pixel(pass, x, y)
                            };
                            let sx = (x as Float + xp) / width as Float;
                            let sy = (y as Float + yp) / height as Float;
                            let ray = camera.generate_ray(sx, sy);
                            let color = if settings.gi_indirect {
                                path_tracing(ctx, ray, 0, &mut pixel_rng)
                            } else {
                                send_ray(ctx, ray, 0, &mut pixel_rng)
                            };
                            row.push(color);
                        }
                        row
                    })
                    .collect();

                for (y, row) in rows.into_iter().enumerate() {
                    for (x, color) in row.into_iter().enumerate() {
                        accumulator.accumulate(x as u32, y as u32, color);
                    }
                }

                completed += 1;
                on_pass(completed, total_iterations);
            }
        }
    }

    for y in 0..height {
        for x in 0..width {
            visualizer.plot(x, y, accumulator.resolve(x, y));
        }
    }
    visualizer.update();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_averages_and_applies_exposure() {
        let mut acc = PixelAccumulator::new(2, 2);
        acc.accumulate(0, 0, Vector3::new(0.1, 0.1, 0.1));
        acc.accumulate(0, 0, Vector3::new(0.3, 0.3, 0.3));
        let resolved = acc.resolve(0, 0);
        assert!((resolved.x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn untouched_pixel_resolves_to_black() {
        let acc = PixelAccumulator::new(2, 2);
        assert_eq!(acc.resolve(1, 1), Vector3::zero());
    }
}

use crate::core::framebuffer::DepthBuffer;
use crate::core::math::interpolation::{barycentric_coordinates, is_inside_triangle, signed_area_x2};
use crate::core::math::transform::{apply_perspective_division, ndc_to_texel};
use nalgebra::{Matrix4, Point2, Point3};

#[derive(PartialEq, Copy, Clone, Debug)]
pub enum CullMode {
    Back,
    Front,
    None,
}

/// Depth-only triangle rasterizer.
///
/// Follows GL rules closely enough to reproduce the shadow map on the CPU:
/// counter-clockwise front faces, window depth `z * 0.5 + 0.5`, fragments
/// outside `[0, 1]` depth are dropped and the depth test is LESS.
pub struct DepthRasterizer {
    pub cull_mode: CullMode,
}

impl Default for DepthRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthRasterizer {
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::Back,
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    /// Transforms a triangle by `mvp` and writes its depth into `target`.
    pub fn rasterize_triangle(
        &self,
        target: &mut DepthBuffer,
        mvp: &Matrix4<f32>,
        triangle: &[Point3<f32>; 3],
    ) {
        let width = target.width as f32;
        let height = target.height as f32;

        // 1. Clip space -> NDC -> texel space
        let mut screen = [Point2::origin(); 3];
        let mut depth = [0.0f32; 3];
        for (i, p) in triangle.iter().enumerate() {
            let clip = mvp * p.to_homogeneous();
            // Only the orthographic light projection is rasterized here; anything
            // behind the eye is rejected rather than clipped.
            if clip.w <= 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(&clip);
            screen[i] = ndc_to_texel(ndc.x, ndc.y, width, height);
            depth[i] = ndc.z * 0.5 + 0.5;
        }

        // 2. Face culling
        let signed_area = signed_area_x2(screen[0], screen[1], screen[2]);
        match self.cull_mode {
            CullMode::Back if signed_area <= 0.0 => return,
            CullMode::Front if signed_area >= 0.0 => return,
            _ => {}
        }

        // 3. Bounding box
        let (min_x, min_y, max_x, max_y) = compute_bounding_box(&screen);
        if max_x < 0 || max_y < 0 || min_x >= target.width as i32 || min_y >= target.height as i32
        {
            return;
        }

        let start_x = min_x.max(0) as usize;
        let end_x = max_x.min(target.width as i32 - 1) as usize;
        let start_y = min_y.max(0) as usize;
        let end_y = max_y.min(target.height as i32 - 1) as usize;

        // 4. Texel loop
        for y in start_y..=end_y {
            for x in start_x..=end_x {
                let center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(bary) = barycentric_coordinates(center, screen[0], screen[1], screen[2])
                else {
                    return;
                };
                if !is_inside_triangle(bary) {
                    continue;
                }

                // Window depth is affine in screen space.
                let z = bary.x * depth[0] + bary.y * depth[1] + bary.z * depth[2];
                if !(0.0..=1.0).contains(&z) {
                    continue;
                }
                target.depth_test_and_update(x, y, z);
            }
        }
    }
}

fn compute_bounding_box(points: &[Point2<f32>; 3]) -> (i32, i32, i32, i32) {
    let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i32;
    let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i32;
    let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i32;
    let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i32;
    (min_x, min_y, max_x, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ccw_triangle(z: f32) -> [Point3<f32>; 3] {
        [
            Point3::new(-0.5, -0.5, z),
            Point3::new(0.5, -0.5, z),
            Point3::new(0.0, 0.5, z),
        ]
    }

    #[test]
    fn back_face_culling_keeps_ccw() {
        let mut target = DepthBuffer::new(16, 16);
        let raster = DepthRasterizer::new();
        raster.rasterize_triangle(&mut target, &Matrix4::identity(), &ccw_triangle(0.0));
        assert!(target.covered() > 0);
        assert_eq!(target.get(8, 8), Some(0.5));
    }

    #[test]
    fn front_face_culling_drops_ccw() {
        let mut target = DepthBuffer::new(16, 16);
        let mut raster = DepthRasterizer::new();
        raster.set_cull_mode(CullMode::Front);
        raster.rasterize_triangle(&mut target, &Matrix4::identity(), &ccw_triangle(0.0));
        assert_eq!(target.covered(), 0);

        let [a, b, c] = ccw_triangle(0.0);
        raster.rasterize_triangle(&mut target, &Matrix4::identity(), &[a, c, b]);
        assert!(target.covered() > 0);
    }

    #[test]
    fn fragments_beyond_far_plane_are_dropped() {
        let mut target = DepthBuffer::new(16, 16);
        let mut raster = DepthRasterizer::new();
        raster.set_cull_mode(CullMode::None);
        raster.rasterize_triangle(&mut target, &Matrix4::identity(), &ccw_triangle(1.5));
        assert_eq!(target.covered(), 0);
    }

    #[test]
    fn nearer_triangle_wins() {
        let mut target = DepthBuffer::new(16, 16);
        let raster = DepthRasterizer::new();
        raster.rasterize_triangle(&mut target, &Matrix4::identity(), &ccw_triangle(0.5));
        raster.rasterize_triangle(&mut target, &Matrix4::identity(), &ccw_triangle(-0.5));
        raster.rasterize_triangle(&mut target, &Matrix4::identity(), &ccw_triangle(0.0));
        assert_eq!(target.get(8, 8), Some(0.25));
    }
}

//! CPU rendition of the shadow pipeline.
//!
//! Mirrors `shaders/depth.*` and `shaders/scene.frag` closely enough to answer
//! "is this point in shadow" without a GL context. Used by the headless export
//! and by the tests.

use crate::core::framebuffer::DepthBuffer;
use crate::core::geometry::MeshData;
use crate::core::rasterizer::{CullMode, DepthRasterizer};
use crate::pipeline::passes::{DepthPass, ShadingPass};
use crate::pipeline::shadow::ShadowSettings;
use log::warn;
use nalgebra::{Matrix4, Point3, Vector3};

pub const OBJECT_COLOR: [f32; 3] = [0.8, 0.8, 0.8];
pub const LIGHT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
pub const AMBIENT_STRENGTH: f32 = 0.3;
pub const SHININESS: f32 = 64.0;

/// Runs the depth pass into a fresh `map_size`² buffer.
///
/// Front faces are culled, as on the GPU, so closed meshes store their far side.
pub fn render_depth_pass(pass: &DepthPass, meshes: &[MeshData]) -> DepthBuffer {
    let size = pass.map_size as usize;
    let mut target = DepthBuffer::new(size, size);
    let mut raster = DepthRasterizer::new();
    raster.set_cull_mode(CullMode::Front);

    for item in &pass.items {
        let Some(mesh) = meshes.get(item.mesh.0) else {
            warn!("Depth pass skipped unknown mesh {:?}", item.mesh);
            continue;
        };
        let mvp = pass.light_space * item.model;
        for triangle in mesh.triangles() {
            raster.rasterize_triangle(&mut target, &mvp, &triangle);
        }
    }
    target
}

/// Fraction of a 3x3 PCF kernel that is occluded, 0.0 lit to 1.0 fully shadowed.
pub fn shadow_amount(
    depth_map: &DepthBuffer,
    light_space: &Matrix4<f32>,
    settings: &ShadowSettings,
    position: &Point3<f32>,
    normal: &Vector3<f32>,
    light_position: &Point3<f32>,
) -> f32 {
    let clip = light_space * position.to_homogeneous();
    let proj = clip.xyz() / clip.w;
    let u = proj.x * 0.5 + 0.5;
    let v = proj.y * 0.5 + 0.5;
    let current = proj.z * 0.5 + 0.5;
    if current > 1.0 {
        return 0.0;
    }

    let to_light = (light_position - position).normalize();
    let bias = settings.bias(normal.normalize().dot(&to_light));

    let texel_u = 1.0 / depth_map.width as f32;
    let texel_v = 1.0 / depth_map.height as f32;
    let mut occluded = 0.0;
    for x in -1..=1 {
        for y in -1..=1 {
            let closest = depth_map.sample(u + x as f32 * texel_u, v + y as f32 * texel_v);
            if current - bias > closest {
                occluded += 1.0;
            }
        }
    }
    occluded / 9.0
}

/// Blinn-Phong colour of a surface point with shadowing, the same formula the
/// shading pass evaluates per fragment.
pub fn shade_point(
    depth_map: &DepthBuffer,
    pass: &ShadingPass,
    settings: &ShadowSettings,
    position: &Point3<f32>,
    normal: &Vector3<f32>,
) -> Vector3<f32> {
    let color = Vector3::from(OBJECT_COLOR);
    let light_color = Vector3::from(LIGHT_COLOR);
    let n = normal.normalize();

    let ambient = light_color * AMBIENT_STRENGTH;

    let l = (pass.light_position - position).normalize();
    let diffuse = light_color * n.dot(&l).max(0.0);

    let view_dir = (pass.eye_position - position).normalize();
    let halfway = (l + view_dir).normalize();
    let specular = light_color * n.dot(&halfway).max(0.0).powf(SHININESS);

    let shadow = shadow_amount(
        depth_map,
        &pass.light_space,
        settings,
        position,
        &n,
        &pass.light_position,
    );
    (ambient + (diffuse + specular) * (1.0 - shadow)).component_mul(&color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::MeshId;
    use crate::pipeline::passes::DrawItem;

    /// A single CCW quad at `z`, facing +Z, spanning ±1.
    fn quad(z: f32) -> MeshData {
        let p = |x: f32, y: f32| [x, y, z];
        MeshData::new(
            vec![
                p(-1.0, -1.0),
                p(1.0, -1.0),
                p(1.0, 1.0),
                p(-1.0, -1.0),
                p(1.0, 1.0),
                p(-1.0, 1.0),
            ],
            Vec::new(),
            Vec::new(),
        )
    }

    fn pass(items: Vec<DrawItem>) -> DepthPass {
        // Light on +Z looking down -Z: quads facing +Z are front faces.
        let settings = ShadowSettings {
            map_size: 64,
            target: Point3::origin(),
            ..ShadowSettings::default()
        };
        DepthPass {
            light_space: settings.light_space(&Point3::new(0.0, 0.0, 10.0)).matrix,
            map_size: 64,
            items,
        }
    }

    #[test]
    fn front_faces_are_culled_in_depth_pass() {
        let item = DrawItem {
            mesh: MeshId(0),
            model: Matrix4::identity(),
        };
        let map = render_depth_pass(&pass(vec![item]), &[quad(0.0)]);
        assert_eq!(map.covered(), 0);

        let flipped = MeshData::new(
            quad(0.0)
                .positions
                .chunks_exact(3)
                .flat_map(|t| [t[0], t[2], t[1]])
                .collect(),
            Vec::new(),
            Vec::new(),
        );
        let map = render_depth_pass(&pass(vec![item]), &[flipped]);
        assert!(map.covered() > 0);
    }

    #[test]
    fn unknown_mesh_is_skipped() {
        let item = DrawItem {
            mesh: MeshId(7),
            model: Matrix4::identity(),
        };
        let map = render_depth_pass(&pass(vec![item]), &[]);
        assert_eq!(map.covered(), 0);
    }

    #[test]
    fn points_beyond_far_plane_are_lit() {
        let settings = ShadowSettings::default();
        let mut map = DepthBuffer::new(4, 4);
        map.clear(0.0);
        let light = Point3::new(0.0, 0.0, 0.0);
        let ls = settings.light_space(&light);
        let far_point = Point3::new(0.0, 0.0, -2.0 - 200.0);
        let amount = shadow_amount(&map, &ls.matrix, &settings, &far_point, &Vector3::z(), &light);
        assert_eq!(amount, 0.0);
    }
}

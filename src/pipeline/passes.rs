use crate::core::geometry::MeshId;
use crate::pipeline::shadow::ShadowSettings;
use crate::scene::context::SceneState;
use nalgebra::{Matrix4, Point3};

/// One mesh draw with its model matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub model: Matrix4<f32>,
}

/// Renders shadow casters into the depth map from the light's point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthPass {
    pub light_space: Matrix4<f32>,
    pub map_size: u32,
    pub items: Vec<DrawItem>,
}

/// Renders every instance from the camera, testing against the depth map.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingPass {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub light_space: Matrix4<f32>,
    pub light_position: Point3<f32>,
    pub eye_position: Point3<f32>,
    pub clear_color: [f32; 3],
    pub items: Vec<DrawItem>,
}

/// Everything needed to draw one frame, executed in field order:
/// depth pass, optional depth-map preview, shading pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub depth: DepthPass,
    /// Draw the depth map into the lower-left quadrant before the scene.
    pub debug_quad: bool,
    pub shading: ShadingPass,
}

/// Builds the plan for the current state.
///
/// The light-space matrix is computed once here and copied into both passes,
/// so the depth map and the shadow lookup always agree bit for bit.
pub fn plan_frame(state: &SceneState, settings: &ShadowSettings) -> FramePlan {
    let light_space = settings.light_space(&state.light.position).matrix;

    let depth_items = state
        .instances
        .iter()
        .filter(|i| i.casts_shadow)
        .map(|i| DrawItem {
            mesh: i.mesh,
            model: i.model,
        })
        .collect();

    let shading_items = state
        .instances
        .iter()
        .map(|i| DrawItem {
            mesh: i.mesh,
            model: i.model,
        })
        .collect();

    FramePlan {
        depth: DepthPass {
            light_space,
            map_size: settings.map_size,
            items: depth_items,
        },
        debug_quad: state.show_depth_map,
        shading: ShadingPass {
            view: state.camera.view_matrix(),
            projection: state.camera.projection_matrix(state.aspect_ratio()),
            light_space,
            light_position: state.light.position,
            eye_position: state.camera.position,
            clear_color: state.clear_color,
            items: shading_items,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::Config;
    use crate::scene::loader::LIGHT_MARKER;
    use crate::ui::input::FrameInput;
    use nalgebra::Vector3;

    fn bits(m: &Matrix4<f32>) -> Vec<u32> {
        m.iter().map(|v| v.to_bits()).collect()
    }

    #[test]
    fn both_passes_share_identical_light_space() {
        let mut state = SceneState::new(&Config::default(), MeshId(0));
        let settings = ShadowSettings::default();

        let input = FrameInput {
            light_direction: Vector3::new(1.0, -1.0, 1.0),
            ..Default::default()
        };
        state.apply_input(&input, 0.0123);

        let plan = plan_frame(&state, &settings);
        assert_eq!(bits(&plan.depth.light_space), bits(&plan.shading.light_space));
        assert_eq!(
            bits(&plan.depth.light_space),
            bits(&settings.light_space(&state.light.position).matrix)
        );
    }

    #[test]
    fn light_marker_casts_no_shadow() {
        let state = SceneState::new(&Config::default(), MeshId(0));
        let plan = plan_frame(&state, &ShadowSettings::default());

        assert_eq!(plan.depth.items.len(), 3);
        assert_eq!(plan.shading.items.len(), 4);
        let marker = state.instances[LIGHT_MARKER].model;
        assert!(plan.depth.items.iter().all(|i| i.model != marker));
        assert_eq!(plan.shading.items[LIGHT_MARKER].model, marker);
    }

    #[test]
    fn projection_follows_viewport_aspect() {
        let mut state = SceneState::new(&Config::default(), MeshId(0));
        let settings = ShadowSettings::default();
        let wide = plan_frame(&state, &settings).shading.projection;

        state.viewport = (800, 800);
        let square = plan_frame(&state, &settings).shading.projection;
        assert!((square[(0, 0)] - square[(1, 1)]).abs() < 1e-6);
        assert!(wide[(0, 0)] < square[(0, 0)]);
    }

    #[test]
    fn debug_quad_follows_toggle() {
        let mut state = SceneState::new(&Config::default(), MeshId(0));
        assert!(!plan_frame(&state, &ShadowSettings::default()).debug_quad);
        state.show_depth_map = true;
        assert!(plan_frame(&state, &ShadowSettings::default()).debug_quad);
    }
}

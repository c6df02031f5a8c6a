use crate::core::geometry::MeshId;
use crate::io::config::Config;
use crate::scene::camera::FlyCamera;
use crate::scene::clock::FrameClock;
use crate::scene::light::Light;
use crate::scene::loader::{build_demo_scene, update_scene_instances};
use crate::scene::scene_object::SceneInstance;
use crate::ui::input::FrameInput;
use log::info;

/// All mutable state of the running demo, threaded through each frame.
pub struct SceneState {
    pub camera: FlyCamera,
    pub light: Light,
    pub instances: Vec<SceneInstance>,
    pub clock: FrameClock,
    /// Viewport size in physical pixels.
    pub viewport: (u32, u32),
    pub show_depth_map: bool,
    pub clear_color: [f32; 3],
}

impl SceneState {
    pub fn new(config: &Config, cube: MeshId) -> Self {
        let light = Light::from_config(&config.light);
        Self {
            camera: FlyCamera::from_config(&config.camera),
            instances: build_demo_scene(cube, &light),
            light,
            clock: FrameClock::new(),
            viewport: (config.window.width, config.window.height),
            show_depth_map: config.shadow.show_depth_map,
            clear_color: config.scene.clear_color,
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.viewport;
        w.max(1) as f32 / h.max(1) as f32
    }

    /// Applies one frame of input. All continuous motion is scaled by `dt`.
    pub fn apply_input(&mut self, input: &FrameInput, dt: f32) {
        for &movement in &input.movement {
            self.camera.process_keyboard(movement, dt);
        }

        let (dx, dy) = input.look_delta;
        if dx != 0.0 || dy != 0.0 {
            self.camera.process_mouse(dx, dy);
        }
        if input.zoom_delta != 0.0 {
            self.camera.process_scroll(input.zoom_delta);
        }

        if input.light_direction != nalgebra::Vector3::zeros() {
            self.light.nudge(&input.light_direction, dt);
            update_scene_instances(&mut self.instances, &self.light);
        }

        if input.toggle_depth_view {
            self.show_depth_map = !self.show_depth_map;
            info!(
                "Depth map view {}",
                if self.show_depth_map { "on" } else { "off" }
            );
        }

        if input.dump_positions {
            let l = self.light.position;
            let c = self.camera.position;
            info!("Light position: ({:.3}, {:.3}, {:.3})", l.x, l.y, l.z);
            info!(
                "Camera position: ({:.3}, {:.3}, {:.3}), yaw {:.1}, pitch {:.1}",
                c.x, c.y, c.z, self.camera.yaw, self.camera.pitch
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::camera::Movement;
    use crate::scene::loader::LIGHT_MARKER;
    use nalgebra::{Point3, Vector3};

    fn state() -> SceneState {
        SceneState::new(&Config::default(), MeshId(0))
    }

    #[test]
    fn light_keys_move_light_and_marker() {
        let mut state = state();
        let input = FrameInput {
            light_direction: Vector3::new(0.0, 1.0, 0.0),
            ..Default::default()
        };
        state.apply_input(&input, 0.5);

        assert!((state.light.position - Point3::new(-2.0, 5.5, 0.0)).norm() < 1e-5);
        let marker = state.instances[LIGHT_MARKER]
            .model
            .transform_point(&Point3::origin());
        assert!((marker - state.light.position).norm() < 1e-5);
    }

    #[test]
    fn camera_moves_and_turns() {
        let mut state = state();
        let start = state.camera.position;
        let front = state.camera.front();
        let input = FrameInput {
            movement: vec![Movement::Forward],
            ..Default::default()
        };
        state.apply_input(&input, 0.2);
        assert!((state.camera.position - (start + front * 0.5)).norm() < 1e-5);

        let input = FrameInput {
            look_delta: (0.0, 100_000.0),
            zoom_delta: 10.0,
            ..Default::default()
        };
        state.apply_input(&input, 0.016);
        assert_eq!(state.camera.pitch, 89.0);
        assert_eq!(state.camera.zoom, 35.0);
    }

    #[test]
    fn depth_view_toggles() {
        let mut state = state();
        assert!(!state.show_depth_map);
        let input = FrameInput {
            toggle_depth_view: true,
            dump_positions: true,
            ..Default::default()
        };
        state.apply_input(&input, 0.016);
        assert!(state.show_depth_map);
        state.apply_input(&input, 0.016);
        assert!(!state.show_depth_map);
    }

    #[test]
    fn aspect_ratio_survives_zero_height() {
        let mut state = state();
        assert_eq!(state.aspect_ratio(), 1.5);
        state.viewport = (800, 0);
        assert_eq!(state.aspect_ratio(), 800.0);
    }
}

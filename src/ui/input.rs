use crate::scene::camera::Movement;
use egui::{Event, InputState, Key};
use nalgebra::Vector3;

/// egui scroll points per zoom degree. One wheel notch is roughly 50 points.
const SCROLL_POINTS_PER_DEGREE: f32 = 50.0;

const MOVEMENT_KEYS: [(Key, Movement); 6] = [
    (Key::W, Movement::Forward),
    (Key::S, Movement::Backward),
    (Key::A, Movement::Left),
    (Key::D, Movement::Right),
    (Key::E, Movement::Up),
    (Key::Q, Movement::Down),
];

const LIGHT_KEYS: [(Key, [f32; 3]); 6] = [
    (Key::I, [0.0, 1.0, 0.0]),
    (Key::K, [0.0, -1.0, 0.0]),
    (Key::J, [-1.0, 0.0, 0.0]),
    (Key::L, [1.0, 0.0, 0.0]),
    (Key::O, [0.0, 0.0, 1.0]),
    (Key::P, [0.0, 0.0, -1.0]),
];

/// Everything the frame driver needs from one frame of input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Camera movement keys currently held.
    pub movement: Vec<Movement>,
    /// Sum of the held light keys, one unit per axis.
    pub light_direction: Vector3<f32>,
    /// Pointer motion in pixels, `y` positive upwards.
    pub look_delta: (f32, f32),
    /// Zoom change in degrees, positive zooms in.
    pub zoom_delta: f32,
    pub dump_positions: bool,
    pub toggle_depth_view: bool,
    pub toggle_capture: bool,
    pub quit: bool,
}

impl FrameInput {
    pub fn collect(ctx: &egui::Context, pointer_captured: bool) -> Self {
        ctx.input(|i| Self::from_input_state(i, pointer_captured))
    }

    /// While the pointer is captured every raw motion event turns the camera.
    /// Otherwise the camera turns only while the primary button drags.
    pub fn from_input_state(input: &InputState, pointer_captured: bool) -> Self {
        let movement = MOVEMENT_KEYS
            .iter()
            .filter(|(key, _)| input.key_down(*key))
            .map(|(_, m)| *m)
            .collect();

        let light_direction = LIGHT_KEYS
            .iter()
            .filter(|(key, _)| input.key_down(*key))
            .fold(Vector3::zeros(), |acc, (_, d)| acc + Vector3::from(*d));

        let delta = if pointer_captured {
            input
                .events
                .iter()
                .filter_map(|e| match e {
                    Event::MouseMoved(d) => Some(*d),
                    _ => None,
                })
                .fold(egui::Vec2::ZERO, |acc, d| acc + d)
        } else if input.pointer.primary_down() {
            input.pointer.delta()
        } else {
            egui::Vec2::ZERO
        };

        Self {
            movement,
            light_direction,
            look_delta: (delta.x, -delta.y),
            zoom_delta: input.smooth_scroll_delta.y / SCROLL_POINTS_PER_DEGREE,
            dump_positions: input.key_pressed(Key::Space),
            toggle_depth_view: input.key_pressed(Key::M),
            toggle_capture: input.key_pressed(Key::Tab),
            quit: input.key_pressed(Key::Escape),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Modifiers, RawInput};

    fn key(key: Key) -> Event {
        Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: Modifiers::NONE,
        }
    }

    fn collect(events: Vec<Event>, captured: bool) -> FrameInput {
        let ctx = egui::Context::default();
        let raw = RawInput {
            events,
            ..Default::default()
        };
        let mut input = FrameInput::default();
        let _ = ctx.run(raw, |ctx| input = FrameInput::collect(ctx, captured));
        input
    }

    #[test]
    fn held_keys_map_to_movement_and_light() {
        let input = collect(vec![key(Key::W), key(Key::D), key(Key::I), key(Key::J)], false);
        assert_eq!(input.movement, vec![Movement::Forward, Movement::Right]);
        assert_eq!(input.light_direction, Vector3::new(-1.0, 1.0, 0.0));
        assert!(!input.quit);
    }

    #[test]
    fn opposite_light_keys_cancel() {
        let input = collect(vec![key(Key::O), key(Key::P)], false);
        assert_eq!(input.light_direction, Vector3::zeros());
    }

    #[test]
    fn one_shot_keys_are_reported() {
        let input = collect(
            vec![key(Key::Space), key(Key::M), key(Key::Tab), key(Key::Escape)],
            false,
        );
        assert!(input.dump_positions && input.toggle_depth_view);
        assert!(input.toggle_capture && input.quit);
    }

    #[test]
    fn raw_motion_turns_camera_only_when_captured() {
        let motion = || vec![Event::MouseMoved(egui::vec2(4.0, 3.0)), Event::MouseMoved(egui::vec2(1.0, 1.0))];
        assert_eq!(collect(motion(), true).look_delta, (5.0, -4.0));
        assert_eq!(collect(motion(), false).look_delta, (0.0, 0.0));
    }
}

use crate::core::math::transform::TransformFactory;
use crate::io::config::CameraConfig;
use nalgebra::{Matrix4, Point3, Vector3};

const PITCH_LIMIT: f32 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Free-fly camera driven by yaw/pitch angles in degrees.
///
/// Yaw -90 looks down -Z. The basis vectors are kept in sync with the angles
/// after every change, so `view_matrix` never sees stale state.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub position: Point3<f32>,
    pub world_up: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub near: f32,
    pub far: f32,

    front: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
}

impl FlyCamera {
    pub fn new(position: Point3<f32>, world_up: Vector3<f32>, yaw: f32, pitch: f32) -> Self {
        let mut cam = Self {
            position,
            world_up,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            zoom: 45.0,
            min_zoom: 1.0,
            max_zoom: 45.0,
            speed: 2.5,
            sensitivity: 0.1,
            near: 0.1,
            far: 100.0,
            front: -Vector3::z(),
            right: Vector3::x(),
            up: Vector3::y(),
        };
        cam.update_vectors();
        cam
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let [x, y, z] = config.position;
        let [ux, uy, uz] = config.up;
        let mut cam = Self::new(
            Point3::new(x, y, z),
            Vector3::new(ux, uy, uz),
            config.yaw,
            config.pitch,
        );
        cam.min_zoom = config.min_zoom;
        cam.max_zoom = config.max_zoom;
        cam.zoom = config.zoom.max(config.min_zoom).min(config.max_zoom);
        cam.speed = config.speed;
        cam.sensitivity = config.sensitivity;
        cam.near = config.near;
        cam.far = config.far;
        cam
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn process_keyboard(&mut self, direction: Movement, dt: f32) {
        let velocity = self.speed * dt;
        let offset = match direction {
            Movement::Forward => self.front,
            Movement::Backward => -self.front,
            Movement::Left => -self.right,
            Movement::Right => self.right,
            Movement::Up => self.world_up,
            Movement::Down => -self.world_up,
        };
        self.position += offset * velocity;
    }

    /// Applies a pointer delta in pixels. `dy` is positive when the pointer moves up.
    pub fn process_mouse(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    pub fn process_scroll(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy).max(self.min_zoom).min(self.max_zoom);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        TransformFactory::view(&self.position, &(self.position + self.front), &self.up)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Matrix4<f32> {
        TransformFactory::perspective(aspect_ratio, self.zoom.to_radians(), self.near, self.far)
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vector3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

use crate::io::config::LightConfig;
use nalgebra::{Point3, Vector3};

/// The single point light. Its position also serves as the shadow projection eye.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub position: Point3<f32>,
    /// World units per second.
    pub speed: f32,
}

impl Light {
    pub fn new(position: Point3<f32>, speed: f32) -> Self {
        Self { position, speed }
    }

    pub fn from_config(config: &LightConfig) -> Self {
        let [x, y, z] = config.position;
        Self::new(Point3::new(x, y, z), config.speed)
    }

    /// Moves the light along `direction` (unit components per axis) for `dt` seconds.
    pub fn nudge(&mut self, direction: &Vector3<f32>, dt: f32) {
        self.position += direction * self.speed * dt;
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::from_config(&LightConfig::default())
    }
}

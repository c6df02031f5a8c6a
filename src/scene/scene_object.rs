use crate::core::geometry::MeshId;
use nalgebra::Matrix4;

/// A placed mesh. The same mesh may appear any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneInstance {
    pub mesh: MeshId,
    pub model: Matrix4<f32>,
    /// Whether the instance is drawn into the shadow map.
    pub casts_shadow: bool,
}

impl SceneInstance {
    pub fn new(mesh: MeshId, model: Matrix4<f32>) -> Self {
        Self {
            mesh,
            model,
            casts_shadow: true,
        }
    }

    pub fn without_shadow(mut self) -> Self {
        self.casts_shadow = false;
        self
    }
}

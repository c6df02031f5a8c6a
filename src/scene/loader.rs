use crate::core::geometry::{MeshData, MeshId};
use crate::core::math::transform::TransformFactory;
use crate::io::config::Config;
use crate::io::obj_loader::{ObjError, load_obj};
use crate::scene::light::Light;
use crate::scene::scene_object::SceneInstance;
use log::info;
use nalgebra::{Matrix4, Vector3};

/// Placement of the two floating cubes.
const CUBE_POSITIONS: [[f32; 3]; 2] = [[1.0, 1.0, -5.0], [-2.0, 2.0, -3.0]];
const FLOOR_POSITION: [f32; 3] = [0.0, -0.5, -2.0];
const FLOOR_SCALE: [f32; 3] = [10.0, 0.5, 10.0];
const LIGHT_MARKER_SCALE: f32 = 0.3;

/// Index of the light marker in the list returned by [`build_demo_scene`].
pub const LIGHT_MARKER: usize = 3;

/// Loads the scene mesh named in the config.
///
/// Meshes without normals get flat per-face normals so the shading pass can
/// light them.
pub fn load_scene_mesh(config: &Config) -> Result<MeshData, ObjError> {
    let mesh = load_obj(&config.scene.mesh, config.scene.layout.vertex_layout())?;
    Ok(mesh.with_flat_normals())
}

/// Builds the reference scene from a single cube mesh: two floating cubes, a
/// flattened floor and a small marker at the light that does not cast shadows.
pub fn build_demo_scene(cube: MeshId, light: &Light) -> Vec<SceneInstance> {
    let mut instances: Vec<SceneInstance> = CUBE_POSITIONS
        .iter()
        .map(|p| SceneInstance::new(cube, TransformFactory::translation(&Vector3::from(*p))))
        .collect();

    instances.push(SceneInstance::new(
        cube,
        TransformFactory::translation(&Vector3::from(FLOOR_POSITION))
            * TransformFactory::scaling_nonuniform(&Vector3::from(FLOOR_SCALE)),
    ));
    instances.push(SceneInstance::new(cube, light_marker_transform(light)).without_shadow());

    info!("Scene initialized with {} instances.", instances.len());
    instances
}

pub fn light_marker_transform(light: &Light) -> Matrix4<f32> {
    TransformFactory::translation(&light.position.coords) * TransformFactory::scaling(LIGHT_MARKER_SCALE)
}

/// Moves the light marker to follow the light.
pub fn update_scene_instances(instances: &mut [SceneInstance], light: &Light) {
    if let Some(marker) = instances.get_mut(LIGHT_MARKER) {
        marker.model = light_marker_transform(light);
    }
}

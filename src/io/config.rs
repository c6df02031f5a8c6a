use crate::core::geometry::VertexLayout;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level demo configuration. Every field has a default, so an empty file
/// (or no file at all) reproduces the reference scene.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default)]
    pub shadow: ShadowConfig,
    #[serde(default)]
    pub scene: SceneConfig,
}

#[derive(Debug, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_title")]
    pub title: String,
    /// Bits of the default framebuffer's depth attachment.
    #[serde(default = "default_depth_bits")]
    pub depth_bits: u8,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            depth_bits: default_depth_bits(),
        }
    }
}

fn default_width() -> u32 {
    1200
}
fn default_height() -> u32 {
    800
}
fn default_title() -> String {
    "shadowcast".to_string()
}
fn default_depth_bits() -> u8 {
    24
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default = "default_world_up")]
    pub up: [f32; 3],
    /// Degrees.
    #[serde(default = "default_yaw")]
    pub yaw: f32,
    /// Degrees.
    #[serde(default = "default_pitch")]
    pub pitch: f32,
    /// World units per second.
    #[serde(default = "default_camera_speed")]
    pub speed: f32,
    /// Degrees per pointer pixel.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// Vertical field of view in degrees.
    #[serde(default = "default_zoom")]
    pub zoom: f32,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,
    #[serde(default = "default_zoom")]
    pub max_zoom: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            up: default_world_up(),
            yaw: default_yaw(),
            pitch: default_pitch(),
            speed: default_camera_speed(),
            sensitivity: default_sensitivity(),
            zoom: default_zoom(),
            min_zoom: default_min_zoom(),
            max_zoom: default_zoom(),
            near: default_near(),
            far: default_far(),
        }
    }
}

fn default_camera_position() -> [f32; 3] {
    [4.0, 2.0, 4.0]
}
fn default_world_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}
fn default_yaw() -> f32 {
    -77.0
}
fn default_pitch() -> f32 {
    -16.0
}
fn default_camera_speed() -> f32 {
    2.5
}
fn default_sensitivity() -> f32 {
    0.1
}
fn default_zoom() -> f32 {
    45.0
}
fn default_min_zoom() -> f32 {
    1.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    100.0
}

#[derive(Debug, Deserialize)]
pub struct LightConfig {
    #[serde(default = "default_light_position")]
    pub position: [f32; 3],
    /// World units per second while a light key is held.
    #[serde(default = "default_light_speed")]
    pub speed: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: default_light_position(),
            speed: default_light_speed(),
        }
    }
}

fn default_light_position() -> [f32; 3] {
    [-2.0, 4.0, 0.0]
}
fn default_light_speed() -> f32 {
    3.0
}

#[derive(Debug, Deserialize)]
pub struct ShadowConfig {
    /// Square resolution of the depth texture, independent of the window.
    #[serde(default = "default_shadow_map_size")]
    pub map_size: u32,
    /// Half extent of the symmetric orthographic light volume.
    #[serde(default = "default_ortho_extent")]
    pub ortho_extent: f32,
    #[serde(default = "default_shadow_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Fixed world point the light looks at.
    #[serde(default = "default_light_target")]
    pub target: [f32; 3],
    #[serde(default = "default_world_up")]
    pub up: [f32; 3],
    #[serde(default = "default_bias_min")]
    pub bias_min: f32,
    #[serde(default = "default_bias_max")]
    pub bias_max: f32,
    /// Draw the raw depth map into the lower-left quadrant.
    #[serde(default)]
    pub show_depth_map: bool,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: default_shadow_map_size(),
            ortho_extent: default_ortho_extent(),
            near: default_shadow_near(),
            far: default_far(),
            target: default_light_target(),
            up: default_world_up(),
            bias_min: default_bias_min(),
            bias_max: default_bias_max(),
            show_depth_map: false,
        }
    }
}

fn default_shadow_map_size() -> u32 {
    1024
}
fn default_ortho_extent() -> f32 {
    10.0
}
fn default_shadow_near() -> f32 {
    1.0
}
fn default_light_target() -> [f32; 3] {
    [0.0, 0.0, -2.0]
}
fn default_bias_min() -> f32 {
    0.0005
}
fn default_bias_max() -> f32 {
    0.005
}

#[derive(Debug, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_mesh")]
    pub mesh: String,
    /// Which face corner syntax the mesh file uses.
    #[serde(default)]
    pub layout: MeshLayout,
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mesh: default_mesh(),
            layout: MeshLayout::default(),
            clear_color: default_clear_color(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshLayout {
    Positions,
    PositionsNormals,
    PositionsTexcoords,
    #[default]
    Full,
}

impl MeshLayout {
    pub fn vertex_layout(self) -> VertexLayout {
        match self {
            MeshLayout::Positions => VertexLayout::POSITIONS,
            MeshLayout::PositionsNormals => VertexLayout::POSITIONS_NORMALS,
            MeshLayout::PositionsTexcoords => VertexLayout::POSITIONS_TEXCOORDS,
            MeshLayout::Full => VertexLayout::FULL,
        }
    }
}

fn default_mesh() -> String {
    "assets/cube.obj".to_string()
}
fn default_clear_color() -> [f32; 3] {
    [0.82, 0.93, 0.99]
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(content).map_err(|e| format!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make the camera or light matrices degenerate.
    pub fn validate(&self) -> Result<(), String> {
        let camera = &self.camera;
        if !(camera.min_zoom.is_finite() && camera.max_zoom.is_finite() && camera.zoom.is_finite()) {
            return Err("Invalid camera: zoom values must be finite".to_string());
        }
        if camera.min_zoom <= 0.0 || camera.max_zoom >= 180.0 {
            return Err(format!(
                "Invalid camera: zoom range must lie inside (0, 180), got [{}, {}]",
                camera.min_zoom, camera.max_zoom
            ));
        }
        if camera.min_zoom > camera.max_zoom {
            return Err(format!(
                "Invalid camera: min_zoom {} exceeds max_zoom {}",
                camera.min_zoom, camera.max_zoom
            ));
        }
        check_depth_range("camera", camera.near, camera.far)?;
        check_direction("camera up", camera.up)?;

        let shadow = &self.shadow;
        if shadow.map_size == 0 {
            return Err("Invalid shadow: map_size must be positive".to_string());
        }
        if !(shadow.ortho_extent.is_finite() && shadow.ortho_extent > 0.0) {
            return Err(format!(
                "Invalid shadow: ortho_extent must be positive, got {}",
                shadow.ortho_extent
            ));
        }
        check_depth_range("shadow", shadow.near, shadow.far)?;
        check_direction("shadow up", shadow.up)?;
        if self.light.position == shadow.target {
            return Err("Invalid light: position coincides with the shadow target".to_string());
        }
        Ok(())
    }
}

fn check_depth_range(section: &str, near: f32, far: f32) -> Result<(), String> {
    if near.is_finite() && far.is_finite() && near > 0.0 && near < far {
        Ok(())
    } else {
        Err(format!(
            "Invalid {}: need 0 < near < far, got near = {}, far = {}",
            section, near, far
        ))
    }
}

fn check_direction(name: &str, v: [f32; 3]) -> Result<(), String> {
    let len_sq: f32 = v.iter().map(|c| c * c).sum();
    if len_sq.is_finite() && len_sq > 1e-12 {
        Ok(())
    } else {
        Err(format!("Invalid {}: {:?} is not a usable direction", name, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_reference_scene() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.window.width, 1200);
        assert_eq!(config.camera.position, [4.0, 2.0, 4.0]);
        assert_eq!(config.camera.yaw, -77.0);
        assert_eq!(config.light.position, [-2.0, 4.0, 0.0]);
        assert_eq!(config.shadow.map_size, 1024);
        assert_eq!(config.shadow.target, [0.0, 0.0, -2.0]);
        assert_eq!(config.scene.mesh, "assets/cube.obj");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [shadow]
            map_size = 2048
            show_depth_map = true

            [light]
            position = [1.0, 5.0, 1.0]

            [scene]
            layout = "positions_normals"
            "#,
        )
        .unwrap();
        assert_eq!(config.shadow.map_size, 2048);
        assert!(config.shadow.show_depth_map);
        assert_eq!(config.shadow.ortho_extent, 10.0);
        assert_eq!(config.light.position, [1.0, 5.0, 1.0]);
        assert_eq!(config.light.speed, 3.0);
        assert_eq!(
            config.scene.layout.vertex_layout(),
            VertexLayout::POSITIONS_NORMALS
        );
    }

    #[test]
    fn invalid_toml_is_reported() {
        let err = Config::from_toml("[shadow]\nmap_size = \"big\"").unwrap_err();
        assert!(err.starts_with("Failed to parse TOML"));
    }

    #[test]
    fn inverted_zoom_range_is_rejected() {
        let err = Config::from_toml("[camera]\nmin_zoom = 60.0\n").unwrap_err();
        assert!(err.contains("min_zoom"), "{}", err);

        let err = Config::from_toml("[camera]\nmin_zoom = 0.0\n").unwrap_err();
        assert!(err.starts_with("Invalid camera"), "{}", err);

        let err = Config::from_toml("[camera]\nmax_zoom = nan\n").unwrap_err();
        assert!(err.starts_with("Invalid camera"), "{}", err);
    }

    #[test]
    fn degenerate_directions_are_rejected() {
        let err = Config::from_toml("[camera]\nup = [0.0, 0.0, 0.0]\n").unwrap_err();
        assert!(err.starts_with("Invalid camera up"), "{}", err);

        let err = Config::from_toml("[shadow]\nup = [0.0, 0.0, 0.0]\n").unwrap_err();
        assert!(err.starts_with("Invalid shadow up"), "{}", err);

        let err = Config::from_toml("[light]\nposition = [0.0, 0.0, -2.0]\n").unwrap_err();
        assert!(err.starts_with("Invalid light"), "{}", err);
    }

    #[test]
    fn bad_depth_ranges_are_rejected() {
        for doc in [
            "[camera]\nnear = 0.0\n",
            "[camera]\nnear = 200.0\n",
            "[shadow]\nnear = 100.0\n",
            "[shadow]\nfar = 0.5\n",
        ] {
            let err = Config::from_toml(doc).unwrap_err();
            assert!(err.contains("near < far"), "{}: {}", doc, err);
        }
    }

    #[test]
    fn shadow_volume_must_have_extent() {
        for doc in [
            "[shadow]\northo_extent = 0.0\n",
            "[shadow]\northo_extent = -3.0\n",
            "[shadow]\nmap_size = 0\n",
        ] {
            let err = Config::from_toml(doc).unwrap_err();
            assert!(err.starts_with("Invalid shadow"), "{}: {}", doc, err);
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn bundled_example_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/scene.toml");
        assert!(Config::load(path).is_ok());
    }
}

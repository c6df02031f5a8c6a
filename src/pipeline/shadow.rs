use crate::core::math::transform::TransformFactory;
use crate::io::config::ShadowConfig;
use nalgebra::{Matrix4, Point3, Vector3};

/// Parameters of the light's orthographic shadow projection.
///
/// The light always looks at a fixed `target`. The volume is not fitted to the
/// scene, so geometry outside `±ortho_extent` around the target casts no shadow.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowSettings {
    pub map_size: u32,
    pub ortho_extent: f32,
    pub near: f32,
    pub far: f32,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub bias_min: f32,
    pub bias_max: f32,
}

/// The light's view and projection for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpace {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    /// `projection * view`
    pub matrix: Matrix4<f32>,
}

impl ShadowSettings {
    pub fn from_config(config: &ShadowConfig) -> Self {
        Self {
            map_size: config.map_size.max(1),
            ortho_extent: config.ortho_extent,
            near: config.near,
            far: config.far,
            target: Point3::from(config.target),
            up: Vector3::from(config.up),
            bias_min: config.bias_min,
            bias_max: config.bias_max,
        }
    }

    pub fn light_space(&self, light_position: &Point3<f32>) -> LightSpace {
        let e = self.ortho_extent;
        let view = TransformFactory::view(light_position, &self.target, &self.up);
        let projection = TransformFactory::orthographic(-e, e, -e, e, self.near, self.far);
        LightSpace {
            view,
            projection,
            matrix: projection * view,
        }
    }

    /// Slope-scaled depth bias for a surface with `n_dot_l` between its normal and the light.
    pub fn bias(&self, n_dot_l: f32) -> f32 {
        (self.bias_max * (1.0 - n_dot_l)).max(self.bias_min)
    }
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self::from_config(&ShadowConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_map_center() {
        let settings = ShadowSettings::default();
        let ls = settings.light_space(&Point3::new(-2.0, 4.0, 0.0));
        let p = ls.matrix.transform_point(&settings.target);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
        assert!(p.z > -1.0 && p.z < 1.0);
    }

    #[test]
    fn matrix_is_projection_times_view() {
        let settings = ShadowSettings::default();
        let ls = settings.light_space(&Point3::new(3.0, 6.0, 1.0));
        assert_eq!(ls.matrix, ls.projection * ls.view);
    }

    #[test]
    fn light_straight_above_target_is_finite() {
        let settings = ShadowSettings::default();
        let ls = settings.light_space(&Point3::new(0.0, 8.0, -2.0));
        assert!(ls.matrix.iter().all(|v| v.is_finite()));
        let p = ls.matrix.transform_point(&settings.target);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
    }

    #[test]
    fn bias_grows_at_grazing_angles() {
        let settings = ShadowSettings::default();
        assert_eq!(settings.bias(1.0), 0.0005);
        assert!((settings.bias(0.0) - 0.005).abs() < 1e-7);
        assert!(settings.bias(0.5) > settings.bias(0.95));
    }
}

pub mod camera;
pub mod clock;
pub mod context;
pub mod light;
pub mod loader;
pub mod scene_object;

pub mod depth_target;
pub mod error;
pub mod geometry;
pub mod program;
pub mod resource;

pub mod passes;
pub mod reference;
pub mod renderer;
pub mod shadow;

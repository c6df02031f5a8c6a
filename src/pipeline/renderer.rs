use crate::core::geometry::MeshData;
use crate::gpu::depth_target::DepthTarget;
use crate::gpu::error::{GpuError, check_gl_error};
use crate::gpu::geometry::{GeometryStore, GpuMesh};
use crate::gpu::program::ShaderProgram;
use crate::gpu::resource::{GlGuard, GlResource};
use crate::pipeline::passes::{DepthPass, FramePlan, ShadingPass};
use crate::pipeline::shadow::ShadowSettings;
use eframe::glow::{self, HasContext as _};
use log::info;

const DEPTH_MAP_UNIT: u32 = 0;

/// Window region to draw into, in physical pixels from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Owns every GL object of the scene and executes [`FramePlan`]s.
pub struct SceneRenderer {
    geometry: GeometryStore,
    depth_target: DepthTarget,
    depth_program: ShaderProgram,
    scene_program: ShaderProgram,
    debug_program: ShaderProgram,
    debug_quad: GpuMesh,
    bias: (f32, f32),
}

impl SceneRenderer {
    pub fn new(
        gl: &glow::Context,
        meshes: Vec<MeshData>,
        settings: &ShadowSettings,
    ) -> Result<Self, GpuError> {
        let geometry = GlGuard::new(gl, GeometryStore::upload(gl, meshes)?);
        let depth_target = GlGuard::new(gl, DepthTarget::new(gl, settings.map_size)?);
        let depth_program = GlGuard::new(
            gl,
            ShaderProgram::from_sources(
                gl,
                "depth",
                include_str!("../../shaders/depth.vert"),
                include_str!("../../shaders/depth.frag"),
            )?,
        );
        let scene_program = GlGuard::new(
            gl,
            ShaderProgram::from_sources(
                gl,
                "scene",
                include_str!("../../shaders/scene.vert"),
                include_str!("../../shaders/scene.frag"),
            )?,
        );
        let debug_program = GlGuard::new(
            gl,
            ShaderProgram::from_sources(
                gl,
                "depth_debug",
                include_str!("../../shaders/depth_debug.vert"),
                include_str!("../../shaders/depth_debug.frag"),
            )?,
        );
        let debug_quad = GpuMesh::upload(gl, &MeshData::debug_quad())?;
        check_gl_error(gl, "renderer setup");
        info!("GPU resources ready");

        Ok(Self {
            geometry: geometry.into_inner(),
            depth_target: depth_target.into_inner(),
            depth_program: depth_program.into_inner(),
            scene_program: scene_program.into_inner(),
            debug_program: debug_program.into_inner(),
            debug_quad,
            bias: (settings.bias_min, settings.bias_max),
        })
    }

    /// Runs the depth pass, the optional depth preview and the shading pass,
    /// then leaves GL in the state egui's painter expects.
    pub fn render(
        &self,
        gl: &glow::Context,
        plan: &FramePlan,
        viewport: Viewport,
        screen_fbo: Option<glow::Framebuffer>,
    ) {
        self.depth_pass(gl, &plan.depth);
        check_gl_error(gl, "depth pass");

        self.begin_shading(gl, &plan.shading, viewport, screen_fbo);
        if plan.debug_quad {
            self.debug_program.bind(gl);
            self.debug_program.set_i32(gl, "depthMap", DEPTH_MAP_UNIT as i32);
            self.depth_target.bind_texture(gl, DEPTH_MAP_UNIT);
            self.debug_quad.draw(gl);
            check_gl_error(gl, "depth preview");
        }
        self.shading_pass(gl, &plan.shading);
        check_gl_error(gl, "shading pass");

        restore_ui_state(gl);
    }

    fn depth_pass(&self, gl: &glow::Context, pass: &DepthPass) {
        self.depth_target.bind(gl);
        unsafe {
            gl.disable(glow::SCISSOR_TEST);
            gl.disable(glow::BLEND);
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
            gl.depth_mask(true);
            gl.color_mask(false, false, false, false);
            gl.enable(glow::CULL_FACE);
            gl.front_face(glow::CCW);
            gl.cull_face(glow::FRONT);
            gl.clear(glow::DEPTH_BUFFER_BIT);
        }

        self.depth_program.bind(gl);
        self.depth_program
            .set_mat4(gl, "lightSpaceMatrix", &pass.light_space);
        for item in &pass.items {
            self.depth_program.set_mat4(gl, "model", &item.model);
            self.geometry.draw(gl, item.mesh);
        }
    }

    fn begin_shading(
        &self,
        gl: &glow::Context,
        pass: &ShadingPass,
        viewport: Viewport,
        screen_fbo: Option<glow::Framebuffer>,
    ) {
        let Viewport {
            x,
            y,
            width,
            height,
        } = viewport;
        let [r, g, b] = pass.clear_color;
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, screen_fbo);
            gl.viewport(x, y, width, height);
            gl.enable(glow::SCISSOR_TEST);
            gl.scissor(x, y, width, height);
            gl.color_mask(true, true, true, true);
            gl.clear_color(r, g, b, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            gl.cull_face(glow::BACK);
        }
    }

    fn shading_pass(&self, gl: &glow::Context, pass: &ShadingPass) {
        let program = &self.scene_program;
        program.bind(gl);
        program.set_vec3(gl, "lightPos", &pass.light_position.coords);
        program.set_vec3(gl, "eyePos", &pass.eye_position.coords);
        program.set_mat4(gl, "view", &pass.view);
        program.set_mat4(gl, "projection", &pass.projection);
        program.set_mat4(gl, "lightSpaceMatrix", &pass.light_space);
        program.set_f32(gl, "biasMin", self.bias.0);
        program.set_f32(gl, "biasMax", self.bias.1);
        program.set_i32(gl, "depthMap", DEPTH_MAP_UNIT as i32);
        self.depth_target.bind_texture(gl, DEPTH_MAP_UNIT);

        for item in &pass.items {
            program.set_mat4(gl, "model", &item.model);
            self.geometry.draw(gl, item.mesh);
        }
    }

    /// Releases every GL object. Must run on the context that created them.
    pub fn destroy(self, gl: &glow::Context) {
        self.release(gl);
        info!("GPU resources released");
    }
}

impl GlResource for SceneRenderer {
    fn release(self, gl: &glow::Context) {
        self.geometry.release(gl);
        self.depth_target.release(gl);
        self.depth_program.release(gl);
        self.scene_program.release(gl);
        self.debug_program.release(gl);
        self.debug_quad.release(gl);
    }
}

fn restore_ui_state(gl: &glow::Context) {
    unsafe {
        gl.disable(glow::DEPTH_TEST);
        gl.disable(glow::CULL_FACE);
        gl.color_mask(true, true, true, true);
        gl.bind_texture(glow::TEXTURE_2D, None);
        gl.use_program(None);
    }
}

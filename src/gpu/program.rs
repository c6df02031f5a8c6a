use crate::gpu::error::GpuError;
use crate::gpu::resource::{GlGuard, GlResource};
use eframe::glow::{self, HasContext as _};
use log::debug;
use nalgebra::{Matrix4, Vector3};

/// A linked vertex + fragment program.
pub struct ShaderProgram {
    name: &'static str,
    program: glow::Program,
}

impl ShaderProgram {
    pub fn from_sources(
        gl: &glow::Context,
        name: &'static str,
        vertex: &str,
        fragment: &str,
    ) -> Result<Self, GpuError> {
        let vs = compile(gl, name, "vertex", glow::VERTEX_SHADER, vertex)?;
        let fs = compile(gl, name, "fragment", glow::FRAGMENT_SHADER, fragment)?;

        let program = GlGuard::new(
            gl,
            unsafe { gl.create_program() }.map_err(GpuError::create("program"))?,
        );
        unsafe {
            gl.attach_shader(*program, *vs);
            gl.attach_shader(*program, *fs);
            gl.link_program(*program);
            if !gl.get_program_link_status(*program) {
                return Err(GpuError::Link {
                    program: name,
                    log: gl.get_program_info_log(*program),
                });
            }
            gl.detach_shader(*program, *vs);
            gl.detach_shader(*program, *fs);
        }
        debug!("Linked program '{}'", name);

        Ok(Self {
            name,
            program: program.into_inner(),
        })
    }

    pub fn bind(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) }
    }

    // Uniforms the driver optimised away have no location; setting them is a no-op.

    pub fn set_mat4(&self, gl: &glow::Context, name: &str, value: &Matrix4<f32>) {
        unsafe {
            let loc = gl.get_uniform_location(self.program, name);
            gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, value.as_slice());
        }
    }

    pub fn set_vec3(&self, gl: &glow::Context, name: &str, value: &Vector3<f32>) {
        unsafe {
            let loc = gl.get_uniform_location(self.program, name);
            gl.uniform_3_f32(loc.as_ref(), value.x, value.y, value.z);
        }
    }

    pub fn set_f32(&self, gl: &glow::Context, name: &str, value: f32) {
        unsafe {
            let loc = gl.get_uniform_location(self.program, name);
            gl.uniform_1_f32(loc.as_ref(), value);
        }
    }

    pub fn set_i32(&self, gl: &glow::Context, name: &str, value: i32) {
        unsafe {
            let loc = gl.get_uniform_location(self.program, name);
            gl.uniform_1_i32(loc.as_ref(), value);
        }
    }
}

impl GlResource for ShaderProgram {
    fn release(self, gl: &glow::Context) {
        self.program.release(gl);
        debug!("Deleted program '{}'", self.name);
    }
}

fn compile<'gl>(
    gl: &'gl glow::Context,
    program: &'static str,
    stage: &'static str,
    kind: u32,
    source: &str,
) -> Result<GlGuard<'gl, glow::Shader>, GpuError> {
    let shader = GlGuard::new(
        gl,
        unsafe { gl.create_shader(kind) }.map_err(GpuError::create("shader"))?,
    );
    unsafe {
        gl.shader_source(*shader, source);
        gl.compile_shader(*shader);
        if !gl.get_shader_compile_status(*shader) {
            return Err(GpuError::Compile {
                program,
                stage,
                log: gl.get_shader_info_log(*shader),
            });
        }
    }
    Ok(shader)
}

use crate::gpu::error::{GpuError, check_gl_error, gl_size};
use crate::gpu::resource::{GlGuard, GlResource};
use eframe::glow::{self, HasContext as _};
use log::info;

/// Offscreen framebuffer with a square depth texture and no colour attachment.
///
/// Sampling outside the texture returns depth 1.0, so anything beyond the
/// light's volume reads as unshadowed.
pub struct DepthTarget {
    framebuffer: glow::Framebuffer,
    texture: glow::Texture,
    size: i32,
}

impl DepthTarget {
    pub fn new(gl: &glow::Context, size: u32) -> Result<Self, GpuError> {
        let size = gl_size("shadow map size", size as usize)?;

        let texture = GlGuard::new(
            gl,
            unsafe { gl.create_texture() }.map_err(GpuError::create("depth texture"))?,
        );
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(*texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::DEPTH_COMPONENT as i32,
                size,
                size,
                0,
                glow::DEPTH_COMPONENT,
                glow::FLOAT,
                glow::PixelUnpackData::Slice(None),
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_BORDER as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_BORDER as i32,
            );
            gl.tex_parameter_f32_slice(
                glow::TEXTURE_2D,
                glow::TEXTURE_BORDER_COLOR,
                &[1.0, 1.0, 1.0, 1.0],
            );
            gl.bind_texture(glow::TEXTURE_2D, None);
        }

        let framebuffer = GlGuard::new(
            gl,
            unsafe { gl.create_framebuffer() }.map_err(GpuError::create("depth framebuffer"))?,
        );
        let status = unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(*framebuffer));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::TEXTURE_2D,
                Some(*texture),
                0,
            );
            gl.draw_buffer(glow::NONE);
            gl.read_buffer(glow::NONE);
            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            status
        };
        check_gl_error(gl, "depth target setup");
        if status != glow::FRAMEBUFFER_COMPLETE {
            return Err(GpuError::IncompleteFramebuffer { status });
        }

        info!("Created {}x{} shadow map", size, size);
        Ok(Self {
            framebuffer: framebuffer.into_inner(),
            texture: texture.into_inner(),
            size,
        })
    }

    /// Makes this the draw target with a viewport covering the whole map.
    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.framebuffer));
            gl.viewport(0, 0, self.size, self.size);
        }
    }

    pub fn bind_texture(&self, gl: &glow::Context, unit: u32) {
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
        }
    }
}

impl GlResource for DepthTarget {
    fn release(self, gl: &glow::Context) {
        self.framebuffer.release(gl);
        self.texture.release(gl);
    }
}

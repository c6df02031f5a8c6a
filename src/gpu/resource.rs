use eframe::glow::{self, HasContext as _};
use std::mem::ManuallyDrop;
use std::ops::Deref;

/// A GL object that must be released explicitly on the context that made it.
///
/// Handles do not keep a reference to the context, so they can live inside
/// state shared with egui's paint callbacks. Releasing consumes the value.
pub trait GlResource {
    fn release(self, gl: &glow::Context);
}

/// Releases its resource on drop unless [`GlGuard::into_inner`] is called.
///
/// Used while building multi-object resources so that an early `?` return
/// frees whatever was already created.
pub struct GlGuard<'gl, T: GlResource> {
    gl: &'gl glow::Context,
    inner: ManuallyDrop<T>,
}

impl<'gl, T: GlResource> GlGuard<'gl, T> {
    pub fn new(gl: &'gl glow::Context, resource: T) -> Self {
        Self {
            gl,
            inner: ManuallyDrop::new(resource),
        }
    }

    /// Disarms the guard and hands the resource back.
    pub fn into_inner(self) -> T {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `inner` is taken exactly once.
        unsafe { ManuallyDrop::take(&mut this.inner) }
    }
}

impl<T: GlResource> Deref for GlGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: GlResource> Drop for GlGuard<'_, T> {
    fn drop(&mut self) {
        // SAFETY: `inner` is only taken here or in `into_inner`, which skips this drop.
        let resource = unsafe { ManuallyDrop::take(&mut self.inner) };
        resource.release(self.gl);
    }
}

impl GlResource for glow::NativeBuffer {
    fn release(self, gl: &glow::Context) {
        unsafe { gl.delete_buffer(self) }
    }
}

impl GlResource for glow::NativeVertexArray {
    fn release(self, gl: &glow::Context) {
        unsafe { gl.delete_vertex_array(self) }
    }
}

impl GlResource for glow::NativeTexture {
    fn release(self, gl: &glow::Context) {
        unsafe { gl.delete_texture(self) }
    }
}

impl GlResource for glow::NativeFramebuffer {
    fn release(self, gl: &glow::Context) {
        unsafe { gl.delete_framebuffer(self) }
    }
}

impl GlResource for glow::NativeShader {
    fn release(self, gl: &glow::Context) {
        unsafe { gl.delete_shader(self) }
    }
}

impl GlResource for glow::NativeProgram {
    fn release(self, gl: &glow::Context) {
        unsafe { gl.delete_program(self) }
    }
}

impl<T: GlResource> GlResource for Vec<T> {
    fn release(self, gl: &glow::Context) {
        for item in self {
            item.release(gl);
        }
    }
}

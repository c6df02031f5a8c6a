use crate::core::geometry::{MeshData, MeshId};
use crate::gpu::error::{GpuError, check_gl_error, gl_size};
use crate::gpu::resource::{GlGuard, GlResource};
use eframe::glow::{self, HasContext as _};
use log::{info, warn};

pub const POSITION_LOCATION: u32 = 0;
pub const NORMAL_LOCATION: u32 = 1;
pub const TEXCOORD_LOCATION: u32 = 2;

/// One uploaded mesh: a vertex array with one tightly packed buffer per channel.
pub struct GpuMesh {
    vao: glow::VertexArray,
    buffers: Vec<glow::Buffer>,
    vertex_count: i32,
}

impl GpuMesh {
    pub fn upload(gl: &glow::Context, mesh: &MeshData) -> Result<Self, GpuError> {
        let vertex_count = gl_size("vertex count", mesh.vertex_count())?;
        let vao = GlGuard::new(
            gl,
            unsafe { gl.create_vertex_array() }.map_err(GpuError::create("vertex array"))?,
        );
        unsafe { gl.bind_vertex_array(Some(*vao)) };

        let mut buffers = Vec::with_capacity(3);
        buffers.push(upload_channel(
            gl,
            POSITION_LOCATION,
            3,
            bytemuck::cast_slice(&mesh.positions),
        )?);
        if mesh.layout.normals {
            buffers.push(upload_channel(
                gl,
                NORMAL_LOCATION,
                3,
                bytemuck::cast_slice(&mesh.normals),
            )?);
        }
        if mesh.layout.texcoords {
            buffers.push(upload_channel(
                gl,
                TEXCOORD_LOCATION,
                2,
                bytemuck::cast_slice(&mesh.texcoords),
            )?);
        }

        unsafe {
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        check_gl_error(gl, "mesh upload");

        Ok(Self {
            buffers: buffers.into_iter().map(GlGuard::into_inner).collect(),
            vao: vao.into_inner(),
            vertex_count,
        })
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    /// Issues one non-indexed triangle draw over every corner.
    pub fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_arrays(glow::TRIANGLES, 0, self.vertex_count);
            gl.bind_vertex_array(None);
        }
    }
}

impl GlResource for GpuMesh {
    fn release(self, gl: &glow::Context) {
        self.buffers.release(gl);
        self.vao.release(gl);
    }
}

fn upload_channel<'gl>(
    gl: &'gl glow::Context,
    location: u32,
    components: i32,
    bytes: &[u8],
) -> Result<GlGuard<'gl, glow::Buffer>, GpuError> {
    let buffer = GlGuard::new(
        gl,
        unsafe { gl.create_buffer() }.map_err(GpuError::create("vertex buffer"))?,
    );
    unsafe {
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(*buffer));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytes, glow::STATIC_DRAW);
        gl.vertex_attrib_pointer_f32(location, components, glow::FLOAT, false, 0, 0);
        gl.enable_vertex_attrib_array(location);
    }
    Ok(buffer)
}

/// CPU meshes and their GPU copies, addressed by [`MeshId`].
///
/// Everything is uploaded once; there is no partial update.
pub struct GeometryStore {
    meshes: Vec<MeshData>,
    gpu: Vec<GpuMesh>,
}

impl GeometryStore {
    pub fn upload(gl: &glow::Context, meshes: Vec<MeshData>) -> Result<Self, GpuError> {
        let mut uploaded = Vec::with_capacity(meshes.len());
        for mesh in &meshes {
            uploaded.push(GlGuard::new(gl, GpuMesh::upload(gl, mesh)?));
        }
        info!(
            "Uploaded {} mesh(es), {} triangles in total",
            meshes.len(),
            meshes.iter().map(MeshData::triangle_count).sum::<usize>()
        );
        Ok(Self {
            meshes,
            gpu: uploaded.into_iter().map(GlGuard::into_inner).collect(),
        })
    }

    /// Draws a mesh. Unknown ids are logged and skipped.
    pub fn draw(&self, gl: &glow::Context, id: MeshId) {
        match self.gpu.get(id.0) {
            Some(mesh) => mesh.draw(gl),
            None => warn!("Draw skipped: no mesh with id {:?}", id),
        }
    }
}

impl GlResource for GeometryStore {
    fn release(self, gl: &glow::Context) {
        self.gpu.release(gl);
        info!(
            "Released {} mesh(es), {} vertices in total",
            self.meshes.len(),
            self.meshes.iter().map(MeshData::vertex_count).sum::<usize>()
        );
    }
}

use nalgebra::{Point3, Vector3};

/// Which per-corner attribute channels a mesh carries besides positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub normals: bool,
    pub texcoords: bool,
}

impl VertexLayout {
    /// Positions only (`f v v v`).
    pub const POSITIONS: Self = Self {
        normals: false,
        texcoords: false,
    };
    /// Positions and normals (`f v/n ...` or `f v//n ...`).
    pub const POSITIONS_NORMALS: Self = Self {
        normals: true,
        texcoords: false,
    };
    /// Positions and texture coordinates (`f v/t ...`).
    pub const POSITIONS_TEXCOORDS: Self = Self {
        normals: false,
        texcoords: true,
    };
    /// Positions, texture coordinates and normals (`f v/t/n ...`).
    pub const FULL: Self = Self {
        normals: true,
        texcoords: true,
    };
}

/// Index of a mesh in the geometry store, stable for the store's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// Face-expanded, non-indexed triangle data.
///
/// Every triangle corner owns its own record, so `positions.len()` is always
/// `3 * triangle_count`. Optional channels are either empty or exactly as long
/// as `positions`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub layout: VertexLayout,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
}

impl MeshData {
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        texcoords: Vec<[f32; 2]>,
    ) -> Self {
        let layout = VertexLayout {
            normals: !normals.is_empty(),
            texcoords: !texcoords.is_empty(),
        };
        debug_assert_eq!(positions.len() % 3, 0);
        debug_assert!(!layout.normals || normals.len() == positions.len());
        debug_assert!(!layout.texcoords || texcoords.len() == positions.len());

        Self {
            layout,
            positions,
            normals,
            texcoords,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Iterates triangles as three world-agnostic corner positions.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        self.positions
            .chunks_exact(3)
            .map(|tri| [tri[0].into(), tri[1].into(), tri[2].into()])
    }

    /// Fills the normal channel with per-face normals when the mesh has none.
    ///
    /// Degenerate triangles get a +Y normal.
    pub fn with_flat_normals(mut self) -> Self {
        if self.layout.normals {
            return self;
        }

        self.normals = self
            .triangles()
            .flat_map(|[a, b, c]| {
                let n = (b - a).cross(&(c - a));
                let n = n.try_normalize(1e-12).unwrap_or_else(Vector3::y);
                [[n.x, n.y, n.z]; 3]
            })
            .collect();
        self.layout.normals = true;
        self
    }

    /// The full-screen-quarter quad used to preview the shadow map.
    ///
    /// Covers the lower-left quadrant of NDC, textured 0..1.
    pub fn debug_quad() -> Self {
        let z = -0.999;
        let positions = vec![
            [-1.0, -1.0, z],
            [0.0, -1.0, z],
            [-1.0, 0.0, z],
            [-1.0, 0.0, z],
            [0.0, -1.0, z],
            [0.0, 0.0, z],
        ];
        let texcoords = vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [0.0, 1.0],
            [1.0, 0.0],
            [1.0, 1.0],
        ];
        Self::new(positions, Vec::new(), texcoords)
    }
}

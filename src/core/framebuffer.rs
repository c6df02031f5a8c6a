/// A square single-channel depth target, the CPU twin of the shadow map texture.
///
/// Depth values are window-space `[0, 1]`, cleared to 1.0 (far). Row 0 is the
/// bottom row, the same way GL addresses texture rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBuffer {
    pub width: usize,
    pub height: usize,
    texels: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            texels: vec![1.0; width * height],
        }
    }

    pub fn clear(&mut self, depth: f32) {
        self.texels.fill(depth);
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// LESS depth test. Writes and returns true if `depth` is nearer than the stored value.
    #[inline]
    pub fn depth_test_and_update(&mut self, x: usize, y: usize, depth: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        if depth < self.texels[idx] {
            self.texels[idx] = depth;
            true
        } else {
            false
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.in_bounds(x, y).then(|| self.texels[self.index(x, y)])
    }

    /// Samples with GL_CLAMP_TO_BORDER semantics and a border depth of 1.0.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return 1.0;
        }
        let x = (u * self.width as f32) as usize;
        let y = (v * self.height as f32) as usize;
        self.get(x, y).unwrap_or(1.0)
    }

    pub fn texels(&self) -> &[f32] {
        &self.texels
    }

    /// Number of texels that received a fragment.
    pub fn covered(&self) -> usize {
        self.texels.iter().filter(|&&d| d < 1.0).count()
    }
}

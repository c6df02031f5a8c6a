use crate::core::framebuffer::DepthBuffer;
use image::GrayImage;
use log::{error, info};
use rayon::prelude::*;
use std::path::Path;

/// Converts depth to 8-bit luminance, top image row first.
///
/// Depth buffer row 0 is the bottom row, so rows are flipped on the way out.
pub fn depth_to_luma(depth: &DepthBuffer) -> Vec<u8> {
    let (width, height) = (depth.width, depth.height);
    let texels = depth.texels();
    let mut out = vec![0u8; width * height];

    out.par_chunks_mut(width.max(1))
        .enumerate()
        .for_each(|(y, row)| {
            let src = &texels[(height - 1 - y) * width..][..width];
            for (dst, &d) in row.iter_mut().zip(src) {
                *dst = (d.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        });
    out
}

/// Saves the depth map as a grayscale PNG.
pub fn save_depth_map(depth: &DepthBuffer, path: &Path) -> Result<(), String> {
    let img = GrayImage::from_raw(depth.width as u32, depth.height as u32, depth_to_luma(depth))
        .ok_or_else(|| "Depth buffer size does not match its dimensions".to_string())?;

    img.save(path).map_err(|e| {
        error!("Failed to save image to '{}': {}", path.display(), e);
        format!("Failed to save image: {}", e)
    })?;
    info!("Depth map saved to '{}'", path.display());
    Ok(())
}

/// Default output name for headless exports, e.g. `shadowmap_20240131_154502.png`.
pub fn timestamped_output_name() -> String {
    format!("shadowmap_{}.png", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

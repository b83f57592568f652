use anyhow::{Context, Result, anyhow};
use glob::glob;
use image::RgbaImage;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Loads any supported image file as tightly packed RGBA8.
pub fn load_rgba8(path: &Path) -> Result<RgbaImage> {
    log::debug!("Loading {}", path.display());
    let img = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?
        .to_rgba8();
    Ok(img)
}

/// Writes tightly packed RGBA8 pixels as a PNG file.
pub fn save_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| anyhow!("Failed to write PNG header: {}", e))?;
    writer
        .write_image_data(rgba)
        .map_err(|e| anyhow!("Failed to write PNG data: {}", e))?;
    writer
        .finish()
        .map_err(|e| anyhow!("Failed to finish PNG {}: {}", path.display(), e))?;

    Ok(())
}

/// Expands a glob pattern into a sorted list of files.
pub fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    log::info!("Looking for images in pattern: {}", pattern);

    let mut image_paths: Vec<PathBuf> = glob(pattern)?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect();

    image_paths.sort();

    if image_paths.is_empty() {
        return Err(anyhow!("No files match {}", pattern));
    }

    log::info!("Found {} images", image_paths.len());
    Ok(image_paths)
}

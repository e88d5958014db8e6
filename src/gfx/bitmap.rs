use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use std::path::Path;

/// Decoded image, RGBA8 with premultiplied alpha as the compositor expects.
#[derive(Debug, Clone)]
pub struct Pixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Pixels {
    fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let mut rgba = image.into_raw();
        premultiply(&mut rgba);
        Self {
            width,
            height,
            rgba,
        }
    }
}

pub fn load_png(path: &Path) -> Result<Pixels> {
    let bytes = std::fs::read(path).with_context(|| format!("Reading sprite {}", path.display()))?;
    decode_png(&bytes).with_context(|| format!("Decoding sprite {}", path.display()))
}

pub fn decode_png(bytes: &[u8]) -> Result<Pixels> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .context("Decoding PNG data")?
        .into_rgba8();
    Ok(Pixels::from_image(image))
}

fn premultiply(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let alpha = px[3] as u16;
        for channel in &mut px[..3] {
            *channel = ((*channel as u16 * alpha + 127) / 255) as u8;
        }
    }
}

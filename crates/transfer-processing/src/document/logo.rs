//! Header logo, decoded once at startup and embedded as a Flate-compressed image XObject.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::DynamicImage;
use std::io::Write;
use std::path::Path;

use super::renderer::RenderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    width: u32,
    height: u32,
    /// Zlib-compressed 8-bit RGB samples
    rgb: Vec<u8>,
    /// Zlib-compressed 8-bit alpha samples, only for images with transparency
    alpha: Option<Vec<u8>>,
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

impl LogoImage {
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let img = image::open(path).map_err(|source| RenderError::Logo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_image(img).map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, RenderError> {
        let img = image::load_from_memory(data).map_err(|source| RenderError::Logo {
            path: "<memory>".into(),
            source,
        })?;
        Self::from_image(img).map_err(|source| RenderError::Write {
            path: "<memory>".into(),
            source,
        })
    }

    fn from_image(img: DynamicImage) -> std::io::Result<Self> {
        let (width, height) = (img.width(), img.height());
        let alpha = if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            let samples: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
            Some(deflate(&samples)?)
        } else {
            None
        };
        let rgb = deflate(img.to_rgb8().as_raw())?;

        tracing::debug!(width, height, has_alpha = alpha.is_some(), "Logo decoded");

        Ok(Self {
            width,
            height,
            rgb,
            alpha,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgb_data(&self) -> &[u8] {
        &self.rgb
    }

    pub fn alpha_data(&self) -> Option<&[u8]> {
        self.alpha.as_deref()
    }

    /// Drawn height for a given drawn width, keeping the aspect ratio.
    pub fn height_for_width(&self, width: f32) -> f32 {
        if self.width == 0 {
            return 0.0;
        }
        width * self.height as f32 / self.width as f32
    }
}

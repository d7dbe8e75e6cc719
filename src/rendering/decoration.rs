//! Decorative header image.
//!
//! The image is fetched and preprocessed once at startup: converted to
//! grayscale, resized (aspect preserved) to [`DECORATION_HEIGHT`] with a
//! Lanczos filter and Floyd–Steinberg dithered to 1 bit. Any failure leaves
//! the renderer without an image; it is never retried.

use image::imageops::{self, BiLevel, FilterType};
use image::GrayImage;

use super::canvas::{Canvas, INK};
use crate::Result;

/// Height of the preprocessed image in pixels
pub const DECORATION_HEIGHT: u32 = 120;

/// Default header image
pub const DEFAULT_IMAGE_URL: &str = "https://i.seadn.io/gae/MD2INKicV62FvEbGiNKyMdoRkDguSxL9JkCkGjgyJT0IzFe4VpNb-5nqWCvzpObAQHOkpjp8mmGL00cGLEkQx4ZC-8JrmlRBDth5Sg?auto=format&dpr=1&w=1000";

/// A preprocessed 1-bit raster. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorativeImage {
    bitmap: Canvas,
}

impl DecorativeImage {
    /// Decode an encoded image (PNG, JPEG, WebP, ...) and preprocess it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self::from_luma(&decoded.to_luma8()))
    }

    /// Resize and dither a grayscale image.
    pub fn from_luma(gray: &GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let aspect = w.max(1) as f64 / h.max(1) as f64;
        let target_w = ((DECORATION_HEIGHT as f64 * aspect) as u32).max(1);

        let mut resized = imageops::resize(gray, target_w, DECORATION_HEIGHT, FilterType::Lanczos3);
        imageops::dither(&mut resized, &BiLevel);

        let mut bitmap = Canvas::new(target_w, DECORATION_HEIGHT);
        for (x, y, px) in resized.enumerate_pixels() {
            if px.0[0] < 128 {
                bitmap.set(x as i32, y as i32, INK);
            }
        }
        Self { bitmap }
    }

    pub fn bitmap(&self) -> &Canvas {
        &self.bitmap
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    #[cfg(test)]
    pub(crate) fn solid(width: u32, height: u32) -> Self {
        let mut bitmap = Canvas::new(width, height);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                bitmap.set(x, y, INK);
            }
        }
        Self { bitmap }
    }
}

/// Download and preprocess the decorative image, logging and returning
/// `None` on any failure.
#[cfg(feature = "net")]
pub fn fetch_decoration(url: &str, timeout: std::time::Duration) -> Option<DecorativeImage> {
    let attempt = || -> Result<DecorativeImage> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        let bytes = client.get(url).send()?.error_for_status()?.bytes()?;
        DecorativeImage::from_bytes(&bytes)
    };

    match attempt() {
        Ok(image) => {
            log::info!(
                "Loaded decorative image ({}x{})",
                image.width(),
                image.height()
            );
            Some(image)
        }
        Err(e) => {
            log::error!("Failed to load decorative image: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn resizes_to_fixed_height_keeping_aspect() {
        let gray = GrayImage::from_pixel(400, 200, Luma([255]));
        let img = DecorativeImage::from_luma(&gray);
        assert_eq!(img.height(), 120);
        assert_eq!(img.width(), 240);
        assert_eq!(img.bitmap().ink_count(), 0);
    }

    #[test]
    fn dark_pixels_become_ink() {
        let gray = GrayImage::from_pixel(60, 60, Luma([0]));
        let img = DecorativeImage::from_luma(&gray);
        assert_eq!(img.width(), 120);
        assert_eq!(img.bitmap().ink_count(), 120 * 120);
    }

    #[test]
    fn mid_gray_is_dithered() {
        let gray = GrayImage::from_pixel(120, 120, Luma([128]));
        let img = DecorativeImage::from_luma(&gray);
        let inked = img.bitmap().ink_count();
        let total = 120 * 120;
        assert!(inked > total / 4 && inked < total * 3 / 4, "inked {}", inked);
    }

    #[test]
    fn undecodable_bytes_are_an_error() {
        assert!(DecorativeImage::from_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn encoded_png_round_trips_through_decoder() {
        let gray = GrayImage::from_pixel(30, 60, Luma([0]));
        let mut png = Vec::new();
        gray.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let img = DecorativeImage::from_bytes(&png).unwrap();
        assert_eq!((img.width(), img.height()), (60, 120));
    }
}

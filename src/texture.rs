//! RGBA pixel grids: color palettes, texture atlases and their PNG encoding.

use glam::UVec2;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::color::Color;
use crate::error::{Result, VoxelError};

/// A dense RGBA pixel grid.
///
/// Two construction styles exist: fixed-size grids written with
/// [`Texture::set_pixel`] / [`Texture::blit`], and palette strips grown one
/// pixel at a time with [`Texture::add_pixel`] (a 1-pixel-tall image).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Texture {
    size: UVec2,
    pixels: Vec<Color>,
}

impl Texture {
    /// Create a grid of the given size filled with transparent pixels.
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            pixels: vec![Color::TRANSPARENT; (size.x * size.y) as usize],
        }
    }

    /// Create a grid from raw packed RGBA words, row-major.
    pub fn from_rgba(size: UVec2, data: &[u32]) -> Self {
        debug_assert_eq!(data.len(), (size.x * size.y) as usize);
        Self {
            size,
            pixels: data.iter().map(|&p| Color::from_rgba(p)).collect(),
        }
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.size.x
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Append a pixel to a palette strip, growing the width by one.
    ///
    /// Only meaningful on empty or 1-pixel-tall textures.
    pub fn add_pixel(&mut self, color: Color) {
        debug_assert!(self.size.y <= 1, "palette append on a 2-D texture");
        self.pixels.push(color);
        self.size = UVec2::new(self.pixels.len() as u32, 1);
    }

    /// Write a pixel at the given position.
    pub fn set_pixel(&mut self, position: UVec2, color: Color) -> Result<()> {
        let idx = self.index_of(position)?;
        self.pixels[idx] = color;
        Ok(())
    }

    /// Read a pixel at the given position.
    pub fn pixel(&self, position: UVec2) -> Result<Color> {
        Ok(self.pixels[self.index_of(position)?])
    }

    /// Copy a `size`-sized block of `pixels` (row-major) to `position`.
    pub fn blit(&mut self, pixels: &[Color], position: UVec2, size: UVec2) -> Result<()> {
        debug_assert_eq!(pixels.len(), (size.x * size.y) as usize);
        for y in 0..size.y {
            for x in 0..size.x {
                let src = pixels[(y * size.x + x) as usize];
                self.set_pixel(position + UVec2::new(x, y), src)?;
            }
        }
        Ok(())
    }

    /// Encode the grid as a PNG byte stream.
    pub fn as_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let encoder = PngEncoder::new(&mut out);
        encoder
            .write_image(
                bytemuck::cast_slice(&self.pixels),
                self.size.x,
                self.size.y,
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| VoxelError::InvalidArgument(format!("png encode failed: {e}")))?;
        log::trace!("encoded {}x{} texture to {} png bytes", self.size.x, self.size.y, out.len());
        Ok(out)
    }

    fn index_of(&self, position: UVec2) -> Result<usize> {
        if position.x >= self.size.x || position.y >= self.size.y {
            return Err(VoxelError::OutOfBounds {
                index: (position.y as i64) * self.size.x as i64 + position.x as i64,
                limit: self.pixels.len() as i64,
            });
        }
        Ok((position.y * self.size.x + position.x) as usize)
    }
}

/// Which slot of a model or mesh a texture fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureKind {
    Diffuse,
    Emission,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_append_grows_width() {
        let mut tex = Texture::default();
        tex.add_pixel(Color::new(1, 0, 0, 255));
        tex.add_pixel(Color::new(0, 1, 0, 255));
        assert_eq!(tex.size(), UVec2::new(2, 1));
        assert_eq!(tex.pixel(UVec2::new(1, 0)).unwrap(), Color::new(0, 1, 0, 255));
    }

    #[test]
    fn set_get_pixel() {
        let mut tex = Texture::new(UVec2::new(4, 4));
        tex.set_pixel(UVec2::new(2, 3), Color::new(9, 9, 9, 9)).unwrap();
        assert_eq!(tex.pixel(UVec2::new(2, 3)).unwrap(), Color::new(9, 9, 9, 9));
        assert_eq!(tex.pixel(UVec2::new(0, 0)).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn out_of_bounds_access() {
        let tex = Texture::new(UVec2::new(2, 2));
        assert!(matches!(
            tex.pixel(UVec2::new(2, 0)),
            Err(VoxelError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn blit_copies_block() {
        let mut tex = Texture::new(UVec2::new(4, 4));
        let block = [
            Color::new(1, 0, 0, 255),
            Color::new(2, 0, 0, 255),
            Color::new(3, 0, 0, 255),
            Color::new(4, 0, 0, 255),
        ];
        tex.blit(&block, UVec2::new(1, 1), UVec2::new(2, 2)).unwrap();
        assert_eq!(tex.pixel(UVec2::new(1, 1)).unwrap(), block[0]);
        assert_eq!(tex.pixel(UVec2::new(2, 2)).unwrap(), block[3]);
    }

    #[test]
    fn blit_outside_fails() {
        let mut tex = Texture::new(UVec2::new(2, 2));
        let block = [Color::TRANSPARENT; 4];
        assert!(tex.blit(&block, UVec2::new(1, 1), UVec2::new(2, 2)).is_err());
    }

    #[test]
    fn png_has_signature() {
        let mut tex = Texture::new(UVec2::new(2, 2));
        tex.set_pixel(UVec2::new(0, 0), Color::new(255, 0, 0, 255)).unwrap();
        let png = tex.as_png().unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}

/**************************************************************************
  Copyright 2026 Francesco Versaci (https://github.com/fversaci/)

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
**************************************************************************/
use crate::error::{Result, TilerError};
use image::{imageops, DynamicImage, ImageFormat, RgbaImage};
use std::path::Path;

/// Transparent square canvas the anchor and the tile edits are pasted on.
pub struct Canvas {
    image: RgbaImage,
    writes: usize,
}

impl Canvas {
    pub fn new(size: u32) -> Self {
        Canvas {
            image: RgbaImage::new(size, size),
            writes: 0,
        }
    }

    pub fn size(&self) -> u32 {
        self.image.width()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Number of regions pasted so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn check_bounds(&self, x: u32, y: u32, width: u32, height: u32) -> Result<()> {
        let size = self.size();
        let fits = |pos: u32, len: u32| pos.checked_add(len).is_some_and(|end| end <= size);
        if fits(x, width) && fits(y, height) {
            Ok(())
        } else {
            Err(TilerError::OutOfBounds {
                x,
                y,
                width,
                height,
                canvas: size,
            })
        }
    }

    /// Top-left corner that centers a `width` x `height` image.
    pub fn center_offset(&self, width: u32, height: u32) -> Result<(u32, u32)> {
        let size = self.size();
        if width > size || height > size {
            return Err(TilerError::OutOfBounds {
                x: 0,
                y: 0,
                width,
                height,
                canvas: size,
            });
        }
        Ok(((size - width) / 2, (size - height) / 2))
    }

    /// Pastes `anchor` in the middle of the canvas, without scaling.
    pub fn center(&mut self, anchor: &DynamicImage) -> Result<(u32, u32)> {
        let (x, y) = self.center_offset(anchor.width(), anchor.height())?;
        self.paste(x, y, anchor)?;
        Ok((x, y))
    }

    pub fn crop(&self, x: u32, y: u32, size: u32) -> Result<RgbaImage> {
        self.check_bounds(x, y, size, size)?;
        Ok(imageops::crop_imm(&self.image, x, y, size, size).to_image())
    }

    /// Overwrites the region at (x, y), alpha included.
    pub fn paste(&mut self, x: u32, y: u32, tile: &DynamicImage) -> Result<()> {
        self.check_bounds(x, y, tile.width(), tile.height())?;
        let tile = tile.to_rgba8();
        imageops::replace(&mut self.image, &tile, i64::from(x), i64::from(y));
        self.writes += 1;
        Ok(())
    }

    pub fn save(&self, fname: &Path) -> Result<()> {
        self.image.save_with_format(fname, ImageFormat::Png)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(size: u32, px: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(size, size, Rgba(px)))
    }

    #[test]
    fn starts_transparent() {
        let canvas = Canvas::new(64);
        assert_eq!(canvas.size(), 64);
        assert!(canvas.image().pixels().all(|p| p[3] == 0));
        assert_eq!(canvas.writes(), 0);
    }

    #[test]
    fn anchor_is_centered() {
        let mut canvas = Canvas::new(100);
        let offset = canvas.center(&solid(30, [255, 0, 0, 255])).unwrap();
        assert_eq!(offset, (35, 35));
        assert_eq!(canvas.image().get_pixel(35, 35), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.image().get_pixel(64, 64), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.image().get_pixel(65, 65)[3], 0);
        assert_eq!(canvas.image().get_pixel(34, 34)[3], 0);
    }

    #[test]
    fn centering_is_deterministic() {
        let a = Canvas::new(2048).center_offset(512, 512).unwrap();
        let b = Canvas::new(2048).center_offset(512, 512).unwrap();
        assert_eq!(a, (768, 768));
        assert_eq!(a, b);
        // odd differences round down
        assert_eq!(Canvas::new(11).center_offset(4, 3).unwrap(), (3, 4));
    }

    #[test]
    fn oversized_anchor_is_rejected() {
        let mut canvas = Canvas::new(16);
        assert!(matches!(
            canvas.center(&solid(17, [0, 0, 0, 255])),
            Err(TilerError::OutOfBounds { .. })
        ));
        assert_eq!(canvas.writes(), 0);
    }

    #[test]
    fn crop_sees_pasted_pixels() {
        let mut canvas = Canvas::new(32);
        canvas.paste(8, 8, &solid(8, [0, 255, 0, 255])).unwrap();
        let tile = canvas.crop(4, 4, 8).unwrap();
        assert_eq!(tile.dimensions(), (8, 8));
        assert_eq!(tile.get_pixel(0, 0)[3], 0);
        assert_eq!(tile.get_pixel(4, 4), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn paste_replaces_alpha_and_keeps_size() {
        let mut canvas = Canvas::new(32);
        canvas.paste(0, 0, &solid(16, [9, 9, 9, 255])).unwrap();
        canvas.paste(0, 0, &solid(8, [0, 0, 0, 0])).unwrap();
        assert_eq!(canvas.image().get_pixel(0, 0)[3], 0);
        assert_eq!(canvas.image().get_pixel(12, 12)[3], 255);
        assert_eq!(canvas.image().dimensions(), (32, 32));
        assert_eq!(canvas.writes(), 2);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut canvas = Canvas::new(32);
        assert!(canvas.crop(30, 0, 8).is_err());
        assert!(canvas.paste(0, 25, &solid(8, [1, 1, 1, 255])).is_err());
        assert!(canvas.crop(u32::MAX, 0, 8).is_err());
        assert!(canvas.crop(24, 24, 8).is_ok());
    }

    #[test]
    fn saves_png() {
        let dir = tempfile::tempdir().unwrap();
        let fname = dir.path().join("base.png");
        let mut canvas = Canvas::new(16);
        canvas.center(&solid(4, [1, 2, 3, 255])).unwrap();
        canvas.save(&fname).unwrap();
        let back = image::open(&fname).unwrap().to_rgba8();
        assert_eq!(back.dimensions(), (16, 16));
        assert_eq!(back.get_pixel(6, 6), &Rgba([1, 2, 3, 255]));
    }
}

//! Image tiles produced by height-map rendering.
//!
//! A tile stores one height byte per pixel (0 = empty) over a rectangle of
//! design space, plus the color of the shape that produced it. Tiles are
//! composited into an RGB image only when merged or written.

use std::io::{Seek, Write};

use fabkit_core::{GeometryError, GeometryResult};
use image::{ImageError, ImageFormat, Rgb, RgbImage};

/// RGB color of a shape
pub type Rgb8 = [u8; 3];

/// Color used for shapes with no color of their own
pub const DEFAULT_TILE_COLOR: Rgb8 = [255, 255, 255];

/// Height-map raster over part of the design plane
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTile {
    /// Lower-left corner in design units
    pub origin: [f64; 2],
    /// Pixel size in design units
    pub pitch: f64,
    pub width: u32,
    pub height: u32,
    /// Row-major, top row first; 0 means no coverage
    pub heights: Vec<u8>,
    /// Per-pixel colors when this tile is a composite
    pub colors: Option<Vec<Rgb8>>,
    /// Tint applied to `heights` when `colors` is absent
    pub color: Option<Rgb8>,
}

impl ImageTile {
    /// Blank tile
    pub fn new(origin: [f64; 2], pitch: f64, width: u32, height: u32, color: Option<Rgb8>) -> Self {
        Self {
            origin,
            pitch,
            width,
            height,
            heights: vec![0; width as usize * height as usize],
            colors: None,
            color,
        }
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.heights[(y * self.width + x) as usize]
    }

    /// Keep the larger of the stored and given height
    pub fn raise(&mut self, x: u32, y: u32, value: u8) {
        let slot = &mut self.heights[(y * self.width + x) as usize];
        *slot = (*slot).max(value);
    }

    pub fn covered_pixels(&self) -> usize {
        self.heights.iter().filter(|h| **h > 0).count()
    }

    /// RGB value of one pixel
    pub fn pixel_rgb(&self, x: u32, y: u32) -> Rgb8 {
        let index = (y * self.width + x) as usize;
        let h = self.heights[index];
        if h == 0 {
            return [0, 0, 0];
        }
        if let Some(colors) = &self.colors {
            return colors[index];
        }
        tint(self.color.unwrap_or(DEFAULT_TILE_COLOR), h)
    }

    /// Composite tiles in order; later tiles cover earlier ones
    ///
    /// All tiles must share a pitch. The result spans the union of their
    /// extents and carries per-pixel colors.
    pub fn merge(tiles: &[ImageTile]) -> GeometryResult<ImageTile> {
        let first = tiles.first().ok_or_else(|| GeometryError::Encoding {
            reason: "no image tiles to merge".to_string(),
        })?;
        let pitch = first.pitch;
        if let Some(odd) = tiles
            .iter()
            .find(|t| ((t.pitch - pitch) / pitch).abs() > 1e-9)
        {
            return Err(GeometryError::Encoding {
                reason: format!("tile pitch {} does not match {}", odd.pitch, pitch),
            });
        }

        let x0 = tiles.iter().map(|t| t.origin[0]).fold(f64::INFINITY, f64::min);
        let y0 = tiles.iter().map(|t| t.origin[1]).fold(f64::INFINITY, f64::min);
        let x1 = tiles
            .iter()
            .map(|t| t.origin[0] + f64::from(t.width) * pitch)
            .fold(f64::NEG_INFINITY, f64::max);
        let y1 = tiles
            .iter()
            .map(|t| t.origin[1] + f64::from(t.height) * pitch)
            .fold(f64::NEG_INFINITY, f64::max);

        let width = ((x1 - x0) / pitch).round().max(1.0) as u32;
        let height = ((y1 - y0) / pitch).round().max(1.0) as u32;
        let mut out = ImageTile::new([x0, y0], pitch, width, height, None);
        let mut colors = vec![[0u8; 3]; out.heights.len()];

        for tile in tiles {
            let col = ((tile.origin[0] - x0) / pitch).round() as i64;
            let top = y1 - (tile.origin[1] + f64::from(tile.height) * pitch);
            let row = (top / pitch).round() as i64;
            for y in 0..tile.height {
                for x in 0..tile.width {
                    let h = tile.get(x, y);
                    if h == 0 {
                        continue;
                    }
                    let (ox, oy) = (col + i64::from(x), row + i64::from(y));
                    if ox < 0 || oy < 0 || ox >= i64::from(width) || oy >= i64::from(height) {
                        continue;
                    }
                    let index = (oy as u32 * width + ox as u32) as usize;
                    out.heights[index] = h;
                    colors[index] = tile.pixel_rgb(x, y);
                }
            }
        }
        out.colors = Some(colors);
        Ok(out)
    }

    /// Convert to an `image` buffer; uncovered pixels are black
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| Rgb(self.pixel_rgb(x, y)))
    }

    /// Encode as PNG
    pub fn write_png<W: Write + Seek>(&self, writer: &mut W) -> GeometryResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GeometryError::Encoding {
                reason: "cannot encode an empty image".to_string(),
            });
        }
        self.to_rgb_image()
            .write_to(writer, ImageFormat::Png)
            .map_err(|e| match e {
                ImageError::IoError(io) => GeometryError::stream(io),
                other => GeometryError::Encoding {
                    reason: other.to_string(),
                },
            })
    }
}

fn tint(color: Rgb8, height: u8) -> Rgb8 {
    let scale = |c: u8| ((u16::from(c) * u16::from(height) + 127) / 255) as u8;
    [scale(color[0]), scale(color[1]), scale(color[2])]
}

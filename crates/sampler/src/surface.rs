//! Render surfaces and raster targets.

use pixelpick_platform_core::{Bitmap, Rgba, SurfaceExtent};

/// An offscreen drawing target: zero-filled RGBA pixels plus an origin
/// translation applied to everything rendered into it.
pub struct RasterTarget {
    width: u32,
    height: u32,
    origin_x: f64,
    origin_y: f64,
    pixels: Vec<u8>,
}

impl RasterTarget {
    /// Create a zero-filled target. Untouched pixels read back as
    /// transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            origin_x: 0.0,
            origin_y: 0.0,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Shift the drawing origin. After `translate(-x, -y)` the surface
    /// position `(x, y)` lands on the target pixel `(0, 0)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.origin_x += dx;
        self.origin_y += dy;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Surface-space coordinate sampled for a target pixel: the surface
    /// pixel containing the translated position.
    pub fn source_coord(&self, tx: u32, ty: u32) -> (i64, i64) {
        (
            (tx as f64 - self.origin_x).floor() as i64,
            (ty as f64 - self.origin_y).floor() as i64,
        )
    }

    /// Write one pixel at target coordinates. Out-of-target writes are
    /// ignored.
    pub fn put_pixel(&mut self, tx: u32, ty: u32, color: Rgba) {
        if tx >= self.width || ty >= self.height {
            return;
        }
        let i = (ty as usize * self.width as usize + tx as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&color.to_bytes());
    }

    /// Read one pixel at target coordinates.
    pub fn read_pixel(&self, tx: u32, ty: u32) -> Option<Rgba> {
        if tx >= self.width || ty >= self.height {
            return None;
        }
        let i = (ty as usize * self.width as usize + tx as usize) * 4;
        Some(Rgba::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ))
    }
}

/// Anything the sampler can read a displayed color from.
///
/// `render` must honor the target's translation via
/// [`RasterTarget::source_coord`] and leave target pixels outside the
/// surface untouched.
pub trait RenderSurface {
    /// Rendered extent of the surface in pixels.
    fn extent(&self) -> SurfaceExtent;

    /// Rasterize the region of this surface selected by the target's
    /// translation into the target.
    fn render(&self, target: &mut RasterTarget);
}

/// A surface filled with one uniform color.
pub struct SolidSurface {
    extent: SurfaceExtent,
    color: Rgba,
}

impl SolidSurface {
    pub fn new(extent: SurfaceExtent, color: Rgba) -> Self {
        Self { extent, color }
    }
}

impl RenderSurface for SolidSurface {
    fn extent(&self) -> SurfaceExtent {
        self.extent
    }

    fn render(&self, target: &mut RasterTarget) {
        for ty in 0..target.height() {
            for tx in 0..target.width() {
                let (sx, sy) = target.source_coord(tx, ty);
                if sx >= 0
                    && sy >= 0
                    && (sx as u64) < u64::from(self.extent.width)
                    && (sy as u64) < u64::from(self.extent.height)
                {
                    target.put_pixel(tx, ty, self.color);
                }
            }
        }
    }
}

/// The display surface: whatever bitmap is currently shown, usually the
/// latest decoded camera frame.
pub struct BitmapSurface {
    bitmap: Bitmap,
}

impl BitmapSurface {
    pub fn new(bitmap: Bitmap) -> Self {
        Self { bitmap }
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Replace the displayed bitmap (a new frame arrived).
    pub fn update(&mut self, bitmap: Bitmap) {
        self.bitmap = bitmap;
    }
}

impl RenderSurface for BitmapSurface {
    fn extent(&self) -> SurfaceExtent {
        self.bitmap.extent()
    }

    fn render(&self, target: &mut RasterTarget) {
        for ty in 0..target.height() {
            for tx in 0..target.width() {
                let (sx, sy) = target.source_coord(tx, ty);
                if sx < 0 || sy < 0 {
                    continue;
                }
                if let Some(color) = self.bitmap.pixel_at(sx as u32, sy as u32) {
                    target.put_pixel(tx, ty, color);
                }
            }
        }
    }
}

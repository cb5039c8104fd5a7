//! Pixelpick Sampler
//!
//! Determines the displayed color at one coordinate of a rendered surface:
//! - **Render surfaces:** narrow drawing interface over whatever is on
//!   screen (a solid fill, the latest decoded frame)
//! - **Raster targets:** zero-filled offscreen RGBA buffers with an origin
//!   translation
//! - **Sampling:** rasterize the surface into a 1x1 target anchored at the
//!   requested point and read the pixel back
//!
//! This crate is pure computation — no I/O, no platform dependencies.

pub mod sample;
pub mod surface;

pub use sample::sample_color;
pub use surface::{BitmapSurface, RasterTarget, RenderSurface, SolidSurface};

//! Single-pixel sampling.

use pixelpick_common::error::{PixelpickError, PixelpickResult};
use pixelpick_platform_core::{Point, Rgba};

use crate::surface::{RasterTarget, RenderSurface};

/// Read the displayed color at one point of a surface.
///
/// Rasterizes the surface into a 1x1 offscreen target whose origin is
/// translated by the negative of the point, so the pixel of interest lands
/// on the target's single pixel. The target buffer lives only for the
/// duration of the call.
///
/// Points outside the surface's rendered extent are reported as
/// [`PixelpickError::OutOfBounds`] instead of yielding a degenerate color.
pub fn sample_color(point: Point, surface: &dyn RenderSurface) -> PixelpickResult<Rgba> {
    let extent = surface.extent();
    if !extent.contains(point) {
        return Err(PixelpickError::OutOfBounds {
            x: point.x,
            y: point.y,
            width: extent.width,
            height: extent.height,
        });
    }

    let mut target = RasterTarget::new(1, 1);
    target.translate(-point.x, -point.y);
    surface.render(&mut target);

    let color = target.read_pixel(0, 0).unwrap_or(Rgba::TRANSPARENT);
    tracing::trace!(x = point.x, y = point.y, ?color, "Sampled pixel");
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{BitmapSurface, SolidSurface};
    use pixelpick_platform_core::{Bitmap, SurfaceExtent};
    use proptest::prelude::*;

    #[test]
    fn solid_surface_returns_its_color() {
        let color = Rgba::new(200, 100, 50, 255);
        let surface = SolidSurface::new(SurfaceExtent::new(64, 48), color);
        assert_eq!(sample_color(Point::new(10.0, 10.0), &surface).unwrap(), color);
        assert_eq!(sample_color(Point::new(0.0, 0.0), &surface).unwrap(), color);
        assert_eq!(sample_color(Point::new(63.9, 47.9), &surface).unwrap(), color);
    }

    #[test]
    fn sampling_is_idempotent_on_a_static_surface() {
        let mut bitmap = Bitmap::new(8, 8);
        bitmap.fill(Rgba::new(1, 2, 3, 255));
        bitmap.set_pixel(5, 5, Rgba::new(250, 251, 252, 255));
        let surface = BitmapSurface::new(bitmap);

        let point = Point::new(5.3, 5.8);
        let first = sample_color(point, &surface).unwrap();
        for _ in 0..10 {
            assert_eq!(sample_color(point, &surface).unwrap(), first);
        }
        assert_eq!(first, Rgba::new(250, 251, 252, 255));
    }

    #[test]
    fn out_of_bounds_points_are_reported() {
        let surface = SolidSurface::new(SurfaceExtent::new(10, 10), Rgba::WHITE);

        for point in [
            Point::new(-1.0, 5.0),
            Point::new(5.0, -0.5),
            Point::new(10.0, 5.0),
            Point::new(5.0, 10.0),
        ] {
            let err = sample_color(point, &surface).unwrap_err();
            assert!(matches!(err, PixelpickError::OutOfBounds { .. }));
        }
    }

    #[test]
    fn bitmap_surface_samples_the_pixel_under_the_point() {
        let mut bitmap = Bitmap::new(4, 4);
        bitmap.set_pixel(1, 2, Rgba::new(11, 22, 33, 255));
        let surface = BitmapSurface::new(bitmap);

        let color = sample_color(Point::new(1.9, 2.1), &surface).unwrap();
        assert_eq!(color, Rgba::new(11, 22, 33, 255));
    }

    #[test]
    fn normalized_channels_match_the_eight_bit_sample() {
        let color = Rgba::new(128, 0, 255, 255);
        let surface = SolidSurface::new(SurfaceExtent::new(2, 2), color);
        let sampled = sample_color(Point::new(1.0, 1.0), &surface).unwrap();
        let [r, g, b, a] = sampled.to_normalized();
        assert!((r - 128.0 / 255.0).abs() <= 1.0 / 255.0);
        assert_eq!(g, 0.0);
        assert_eq!(b, 1.0);
        assert_eq!(a, 1.0);
    }

    proptest! {
        #[test]
        fn any_in_bounds_point_of_a_solid_surface_samples_its_color(
            x in 0.0f64..64.0,
            y in 0.0f64..48.0,
            r in 0u8..=255,
            g in 0u8..=255,
            b in 0u8..=255,
        ) {
            // Stay strictly inside the half-open extent.
            prop_assume!(x < 64.0 && y < 48.0);
            let color = Rgba::new(r, g, b, 255);
            let surface = SolidSurface::new(SurfaceExtent::new(64, 48), color);
            prop_assert_eq!(sample_color(Point::new(x, y), &surface).unwrap(), color);
        }

        #[test]
        fn repeated_samples_agree(x in 0.0f64..16.0, y in 0.0f64..16.0) {
            prop_assume!(x < 16.0 && y < 16.0);
            let mut bitmap = Bitmap::new(16, 16);
            for py in 0..16u32 {
                for px in 0..16u32 {
                    bitmap.set_pixel(px, py, Rgba::new(px as u8 * 16, py as u8 * 16, 7, 255));
                }
            }
            let surface = BitmapSurface::new(bitmap);
            let a = sample_color(Point::new(x, y), &surface).unwrap();
            let b = sample_color(Point::new(x, y), &surface).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}

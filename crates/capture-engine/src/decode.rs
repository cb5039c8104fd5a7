//! Raw frame decoding.
//!
//! Converts backend pixel buffers into tightly-packed RGBA bitmaps.
//! Failures identify the stage that rejected the frame; the pipeline drops
//! the frame and keeps the stream alive.

use pixelpick_common::error::{PixelpickError, PixelpickResult};
use pixelpick_platform_core::{Bitmap, RawPixelFormat};

use crate::backend::RawFrame;

/// Decode one raw frame to an RGBA bitmap.
pub fn decode_frame(frame: &RawFrame) -> PixelpickResult<Bitmap> {
    if frame.width == 0 || frame.height == 0 {
        return Err(PixelpickError::decode("zero-sized frame"));
    }

    match frame.format {
        RawPixelFormat::Bgra8 => decode_bgra8(frame),
        RawPixelFormat::Nv12 => decode_nv12(frame),
    }
}

fn decode_bgra8(frame: &RawFrame) -> PixelpickResult<Bitmap> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let packed_row = width * 4;

    if frame.bytes_per_row < packed_row {
        return Err(PixelpickError::decode(format!(
            "BGRA stride {} shorter than packed row {}",
            frame.bytes_per_row, packed_row
        )));
    }
    if frame.data.len() < frame.bytes_per_row * height {
        return Err(PixelpickError::decode(format!(
            "BGRA payload {} bytes, layout requires {}",
            frame.data.len(),
            frame.bytes_per_row * height
        )));
    }

    let mut pixels = vec![0u8; width * height * 4];
    for y in 0..height {
        let src_row = &frame.data[y * frame.bytes_per_row..y * frame.bytes_per_row + packed_row];
        let dst_row = &mut pixels[y * packed_row..(y + 1) * packed_row];
        for x in 0..width {
            let s = x * 4;
            dst_row[s] = src_row[s + 2];
            dst_row[s + 1] = src_row[s + 1];
            dst_row[s + 2] = src_row[s];
            dst_row[s + 3] = src_row[s + 3];
        }
    }

    Bitmap::from_rgba8(frame.width, frame.height, pixels)
        .ok_or_else(|| PixelpickError::decode("BGRA output size mismatch"))
}

fn decode_nv12(frame: &RawFrame) -> PixelpickResult<Bitmap> {
    let width = frame.width as usize;
    let height = frame.height as usize;

    if height % 2 != 0 || width % 2 != 0 {
        return Err(PixelpickError::decode("NV12 dimensions must be even"));
    }
    if frame.bytes_per_row < width {
        return Err(PixelpickError::decode(format!(
            "NV12 stride {} shorter than row width {}",
            frame.bytes_per_row, width
        )));
    }

    let y_plane_len = frame.bytes_per_row * height;
    let uv_plane_len = frame.bytes_per_row * height / 2;
    if frame.data.len() < y_plane_len + uv_plane_len {
        return Err(PixelpickError::decode(format!(
            "NV12 payload {} bytes, planes require {}",
            frame.data.len(),
            y_plane_len + uv_plane_len
        )));
    }

    let (y_plane, uv_plane) = frame.data.split_at(y_plane_len);
    let mut pixels = vec![0u8; width * height * 4];

    for y in 0..height {
        for x in 0..width {
            let luma = y_plane[y * frame.bytes_per_row + x] as i32;
            let uv_base = (y / 2) * frame.bytes_per_row + (x / 2) * 2;
            let u = uv_plane[uv_base] as i32;
            let v = uv_plane[uv_base + 1] as i32;

            // BT.601 limited range.
            let c = luma - 16;
            let d = u - 128;
            let e = v - 128;
            let r = clamp_u8((298 * c + 409 * e + 128) >> 8);
            let g = clamp_u8((298 * c - 100 * d - 208 * e + 128) >> 8);
            let b = clamp_u8((298 * c + 516 * d + 128) >> 8);

            let i = (y * width + x) * 4;
            pixels[i] = r;
            pixels[i + 1] = g;
            pixels[i + 2] = b;
            pixels[i + 3] = 255;
        }
    }

    Bitmap::from_rgba8(frame.width, frame.height, pixels)
        .ok_or_else(|| PixelpickError::decode("NV12 output size mismatch"))
}

fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelpick_platform_core::Rgba;

    fn bgra_frame(width: u32, height: u32, bytes_per_row: usize, data: Vec<u8>) -> RawFrame {
        RawFrame {
            sequence: 0,
            timestamp_ns: 0,
            format: RawPixelFormat::Bgra8,
            width,
            height,
            bytes_per_row,
            data,
        }
    }

    #[test]
    fn bgra_swizzles_to_rgba() {
        // One pixel: B=10, G=20, R=30, A=40.
        let frame = bgra_frame(1, 1, 4, vec![10, 20, 30, 40]);
        let bitmap = decode_frame(&frame).unwrap();
        assert_eq!(bitmap.pixel_at(0, 0), Some(Rgba::new(30, 20, 10, 40)));
    }

    #[test]
    fn bgra_honors_row_stride_padding() {
        // 2x2 with 4 bytes of padding per row.
        let mut data = Vec::new();
        for row in 0..2u8 {
            for col in 0..2u8 {
                data.extend_from_slice(&[col, row, 100, 255]);
            }
            data.extend_from_slice(&[0xEE; 4]);
        }
        let frame = bgra_frame(2, 2, 12, data);
        let bitmap = decode_frame(&frame).unwrap();
        assert_eq!(bitmap.pixel_at(1, 0), Some(Rgba::new(100, 0, 1, 255)));
        assert_eq!(bitmap.pixel_at(0, 1), Some(Rgba::new(100, 1, 0, 255)));
    }

    #[test]
    fn short_bgra_payload_is_rejected() {
        let frame = bgra_frame(2, 2, 8, vec![0; 8]);
        let err = decode_frame(&frame).unwrap_err();
        assert!(matches!(err, PixelpickError::Decode { .. }));
    }

    #[test]
    fn zero_sized_frame_is_rejected() {
        let frame = bgra_frame(0, 2, 0, vec![]);
        assert!(decode_frame(&frame).is_err());
    }

    fn nv12_frame(width: u32, height: u32, luma: u8, u: u8, v: u8) -> RawFrame {
        let y_len = width as usize * height as usize;
        let uv_len = y_len / 2;
        let mut data = vec![luma; y_len];
        for _ in 0..uv_len / 2 {
            data.push(u);
            data.push(v);
        }
        RawFrame {
            sequence: 0,
            timestamp_ns: 0,
            format: RawPixelFormat::Nv12,
            width,
            height,
            bytes_per_row: width as usize,
            data,
        }
    }

    #[test]
    fn nv12_black_and_white_points() {
        let black = decode_frame(&nv12_frame(2, 2, 16, 128, 128)).unwrap();
        assert_eq!(black.pixel_at(0, 0), Some(Rgba::new(0, 0, 0, 255)));

        let white = decode_frame(&nv12_frame(2, 2, 235, 128, 128)).unwrap();
        assert_eq!(white.pixel_at(1, 1), Some(Rgba::new(255, 255, 255, 255)));
    }

    #[test]
    fn nv12_red_point_lands_near_full_red() {
        // BT.601: pure red is approximately Y=81, U=90, V=240.
        let bitmap = decode_frame(&nv12_frame(2, 2, 81, 90, 240)).unwrap();
        let pixel = bitmap.pixel_at(0, 0).unwrap();
        assert!(pixel.r >= 250);
        assert!(pixel.g <= 5);
        assert!(pixel.b <= 5);
    }

    #[test]
    fn nv12_odd_dimensions_are_rejected() {
        let frame = nv12_frame(2, 2, 16, 128, 128);
        let odd = RawFrame { width: 3, ..frame };
        assert!(decode_frame(&odd).is_err());
    }

    #[test]
    fn short_nv12_payload_is_rejected() {
        let mut frame = nv12_frame(4, 4, 16, 128, 128);
        frame.data.truncate(10);
        assert!(decode_frame(&frame).is_err());
    }
}

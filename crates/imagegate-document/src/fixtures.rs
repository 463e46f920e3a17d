// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory image fixtures and tracing setup shared by the unit tests.

use std::io::Cursor;

use ::image::{DynamicImage, GrayAlphaImage, ImageFormat, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).expect("encode fixture");
    out.into_inner()
}

/// Gradient RGB PNG; pixel `(x, y)` is `(x % 256, y % 256, 128)`.
pub fn rgb_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

/// RGBA PNG filled with one pixel value.
pub fn rgba_png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(pixel));
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

/// Grey + alpha PNG filled with one pixel value.
pub fn gray_alpha_png(width: u32, height: u32, luma: u8, alpha: u8) -> Vec<u8> {
    let img = GrayAlphaImage::from_pixel(width, height, LumaA([luma, alpha]));
    encode(DynamicImage::ImageLumaA8(img), ImageFormat::Png)
}

/// Flat grey baseline JPEG.
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([90, 90, 90]));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

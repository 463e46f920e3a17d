// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image codecs — turn an encoded container into interleaved pixel planes.
//
// The decoder only needs dimensions and raw planes, so the container library
// sits behind `ImageCodec`. `RasterCodec` is the `image`-crate implementation.

use std::io::Cursor;

use ::image::{ImageFormat as ContainerFormat, ImageReader};
use imagegate_core::error::{ImageGateError, Result};
use imagegate_core::format::ImageFormat;
use tracing::debug;

/// Interleaved 8-bit pixel planes, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanarRows {
    pub width: u32,
    pub height: u32,
    /// 3 for RGB, 4 for RGBA.
    pub planes: u8,
    pub data: Vec<u8>,
}

impl PlanarRows {
    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * usize::from(self.planes)
    }
}

/// A decodable image container.
pub trait ImageCodec: Send {
    /// `(width, height)` in pixels, available without a full decode.
    fn dimensions(&self) -> (u32, u32);

    /// Decode every pixel.
    fn planar_rows(&self) -> Result<PlanarRows>;
}

/// PNG/JPEG codec backed by the `image` crate.
///
/// The declared format is checked against the container's magic bytes at
/// construction. Grayscale sources are expanded to RGB (or RGBA when they
/// carry alpha); 16-bit sources are reduced to 8 bits.
#[derive(Debug, Clone)]
pub struct RasterCodec {
    bytes: Vec<u8>,
    container: ContainerFormat,
    width: u32,
    height: u32,
}

impl RasterCodec {
    /// Validate `bytes` as a `declared` container and read its header.
    ///
    /// `locator` is only used to name the image in errors.
    pub fn new(bytes: Vec<u8>, declared: ImageFormat, locator: &str) -> Result<Self> {
        let container = match declared {
            ImageFormat::Png => ContainerFormat::Png,
            ImageFormat::Jpg => ContainerFormat::Jpeg,
            ImageFormat::Unknown => return Err(ImageGateError::unsupported(locator, declared.label())),
        };

        match ::image::guess_format(&bytes) {
            Ok(actual) if actual == container => {}
            _ => return Err(ImageGateError::unsupported(locator, declared.label())),
        }

        let (width, height) = ImageReader::with_format(Cursor::new(bytes.as_slice()), container)
            .into_dimensions()
            .map_err(|err| ImageGateError::Decode(format!("{locator}: {err}")))?;

        debug!(%declared, width, height, "image header read");
        Ok(Self {
            bytes,
            container,
            width,
            height,
        })
    }
}

impl ImageCodec for RasterCodec {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn planar_rows(&self) -> Result<PlanarRows> {
        let image = ::image::load_from_memory_with_format(&self.bytes, self.container)
            .map_err(|err| ImageGateError::Decode(err.to_string()))?;

        let (planes, data) = if image.color().has_alpha() {
            (4, image.to_rgba8().into_raw())
        } else {
            (3, image.to_rgb8().into_raw())
        };

        Ok(PlanarRows {
            width: image.width(),
            height: image.height(),
            planes,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn reads_png_dimensions() {
        let codec = RasterCodec::new(fixtures::rgb_png(250, 183), ImageFormat::Png, "logo.png").unwrap();
        assert_eq!(codec.dimensions(), (250, 183));
    }

    #[test]
    fn reads_jpeg_dimensions() {
        let codec = RasterCodec::new(fixtures::jpeg(399, 470), ImageFormat::Jpg, "photo.jpg").unwrap();
        assert_eq!(codec.dimensions(), (399, 470));

        let rows = codec.planar_rows().unwrap();
        assert_eq!(rows.planes, 3);
        assert_eq!(rows.data.len(), 399 * 470 * 3);
    }

    #[test]
    fn declared_format_must_match_container() {
        let err = RasterCodec::new(fixtures::rgb_png(4, 4), ImageFormat::Jpg, "fake.jpg").unwrap_err();
        assert_eq!(err.to_string(), "fake.jpg is not a JPG file");

        let err = RasterCodec::new(fixtures::jpeg(4, 4), ImageFormat::Png, "fake.png").unwrap_err();
        assert_eq!(err.to_string(), "fake.png is not a PNG file");

        let err = RasterCodec::new(b"<html></html>".to_vec(), ImageFormat::Png, "page.png").unwrap_err();
        assert!(matches!(err, ImageGateError::UnsupportedFormat { .. }));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = RasterCodec::new(fixtures::rgb_png(4, 4), ImageFormat::Unknown, "x").unwrap_err();
        assert_eq!(err.to_string(), "x is not a PNG or JPG file");
    }

    #[test]
    fn alpha_sources_keep_four_planes() {
        let codec = RasterCodec::new(fixtures::rgba_png(3, 2, [1, 2, 3, 4]), ImageFormat::Png, "a.png").unwrap();
        let rows = codec.planar_rows().unwrap();
        assert_eq!(rows.planes, 4);
        assert_eq!(rows.stride(), 12);
        assert_eq!(&rows.data[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn grayscale_is_expanded() {
        let codec =
            RasterCodec::new(fixtures::gray_alpha_png(2, 2, 60, 200), ImageFormat::Png, "g.png").unwrap();
        let rows = codec.planar_rows().unwrap();
        assert_eq!(rows.planes, 4);
        assert_eq!(&rows.data[..4], &[60, 60, 60, 200]);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel decoder — clip rectangle handling and compositing against white.
//
// The decoder owns one codec and lazily produces a flattened RGB buffer over
// the active rect. The buffer is computed once and reused until the clip
// changes.

use std::path::Path;

use imagegate_core::error::{ImageGateError, Result};
use imagegate_core::format::ImageFormat;
use imagegate_core::types::{ClipRect, Opacity};
use tracing::{debug, info, instrument};

use super::codec::{ImageCodec, PlanarRows, RasterCodec};

/// Produces opacity-composited RGB bytes for one image reference.
pub struct PixelDecoder {
    codec: Box<dyn ImageCodec>,
    opacity: Opacity,
    original: (u32, u32),
    clip: Option<ClipRect>,
    pixels: Option<Vec<u8>>,
}

impl PixelDecoder {
    // -- Construction ---------------------------------------------------------

    /// Open a local PNG or JPEG file.
    ///
    /// The format is sniffed from the file name before the file is read, so
    /// an unsupported suffix such as `.tiff` fails without touching disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, opacity: Opacity) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let format = ImageFormat::sniff(&name);
        if !format.is_known() {
            return Err(ImageGateError::unsupported(name, format.label()));
        }

        let bytes = std::fs::read(path)?;
        let decoder = Self::from_bytes(bytes, format, &name, opacity)?;
        info!(width = decoder.original.0, height = decoder.original.1, "image opened");
        Ok(decoder)
    }

    /// Decode `bytes` that the caller declares to be `format`.
    pub fn from_bytes(
        bytes: Vec<u8>,
        format: ImageFormat,
        locator: &str,
        opacity: Opacity,
    ) -> Result<Self> {
        let codec = RasterCodec::new(bytes, format, locator)?;
        Ok(Self::with_codec(codec, opacity))
    }

    /// Wrap an arbitrary codec.
    pub fn with_codec(codec: impl ImageCodec + 'static, opacity: Opacity) -> Self {
        let original = codec.dimensions();
        Self {
            codec: Box::new(codec),
            opacity,
            original,
            clip: None,
            pixels: None,
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Width of the active rect in pixels.
    pub fn width(&self) -> u32 {
        self.active_rect().width() as u32
    }

    /// Height of the active rect in pixels.
    pub fn height(&self) -> u32 {
        self.active_rect().height() as u32
    }

    /// Dimensions before any clip, used to map placement-space clips.
    pub fn original_dimensions(&self) -> (u32, u32) {
        self.original
    }

    pub fn clip_rect(&self) -> Option<ClipRect> {
        self.clip
    }

    pub fn opacity(&self) -> Opacity {
        self.opacity
    }

    fn active_rect(&self) -> ClipRect {
        self.clip.unwrap_or_else(|| full_rect(self.original))
    }

    // -- Clipping -------------------------------------------------------------

    /// Restrict decoding to `rect`, given in image pixels.
    ///
    /// The rect is validated against the original dimensions. On failure the
    /// decoder is left exactly as it was.
    pub fn set_clip_rect(&mut self, rect: ClipRect) -> Result<()> {
        let (width, height) = self.original;
        if !rect.fits_within(width, height) {
            return Err(ImageGateError::InvalidClipRect(rect));
        }
        debug!(%rect, "clip rect set");
        self.clip = Some(rect);
        self.pixels = None;
        Ok(())
    }

    // -- Pixel data -----------------------------------------------------------

    /// Flattened row-major RGB triples over the active rect.
    ///
    /// The first call decodes; later calls return the cached buffer.
    #[instrument(skip_all, fields(width = self.width(), height = self.height()))]
    pub fn rgb_data(&mut self) -> Result<&[u8]> {
        let pixels = match self.pixels.take() {
            Some(pixels) => pixels,
            None => {
                let rows = self.codec.planar_rows()?;
                let pixels = composite(&rows, self.active_rect(), self.opacity)?;
                debug!(bytes = pixels.len(), planes = rows.planes, "pixels composited");
                pixels
            }
        };
        Ok(self.pixels.insert(pixels).as_slice())
    }
}

impl std::fmt::Debug for PixelDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelDecoder")
            .field("original", &self.original)
            .field("clip", &self.clip)
            .field("opacity", &self.opacity)
            .field("cached", &self.pixels.is_some())
            .finish()
    }
}

fn full_rect((width, height): (u32, u32)) -> ClipRect {
    ClipRect::new(0, 0, width as i32, height as i32)
}

// -- Compositing --------------------------------------------------------------

/// Composite the pixels inside `rect` against white.
///
/// RGB sources blend each channel with the opacity directly. RGBA sources use
/// `alpha / (255 * opacity)` as the blend factor. That factor is not clamped,
/// so a dim opacity over an opaque pixel overshoots and the channel saturates
/// at 0 or 255. Zero opacity always yields white.
fn composite(rows: &PlanarRows, rect: ClipRect, opacity: Opacity) -> Result<Vec<u8>> {
    let planes = usize::from(rows.planes);
    if planes != 3 && planes != 4 {
        return Err(ImageGateError::Decode(format!("unsupported plane count {planes}")));
    }
    if rows.data.len() != rows.stride() * rows.height as usize {
        return Err(ImageGateError::Decode(format!(
            "pixel data is {} bytes, expected {}x{}x{planes}",
            rows.data.len(),
            rows.width,
            rows.height
        )));
    }
    if !rect.fits_within(rows.width, rows.height) {
        return Err(ImageGateError::InvalidClipRect(rect));
    }

    let o = opacity.value();
    let (x0, x1) = (rect.x0 as usize, rect.x1 as usize);
    let (y0, y1) = (rect.y0 as usize, rect.y1 as usize);
    let mut out = Vec::with_capacity((x1 - x0) * (y1 - y0) * 3);

    for row in rows.data.chunks_exact(rows.stride()).take(y1).skip(y0) {
        for pixel in row[x0 * planes..x1 * planes].chunks_exact(planes) {
            let factor = if planes == 4 {
                alpha_factor(pixel[3], o)
            } else {
                o
            };
            out.extend(pixel[..3].iter().map(|&c| blend(c, factor)));
        }
    }
    Ok(out)
}

fn alpha_factor(alpha: u8, opacity: f64) -> f64 {
    if opacity == 0.0 {
        0.0
    } else {
        f64::from(alpha) / (255.0 * opacity)
    }
}

/// `round((1 - f) * 255 + f * c)`; float-to-int casts saturate.
fn blend(channel: u8, factor: f64) -> u8 {
    ((1.0 - factor) * 255.0 + factor * f64::from(channel)).round() as u8
}

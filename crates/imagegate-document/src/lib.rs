// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// imagegate-document — Image decoding and placement for generated PDF reports.
//
// Decodes PNG/JPEG pixel planes, composites alpha and opacity against white,
// applies clip rectangles, and hands the resulting RGB frames to a page
// rendering surface (a printpdf-backed canvas is provided).

pub mod image;
pub mod loader;
pub mod pdf;
pub mod placement;

#[cfg(test)]
mod fixtures;

// Re-export the primary structs so callers can use `imagegate_document::PixelDecoder` etc.
pub use crate::image::codec::{ImageCodec, PlanarRows, RasterCodec};
pub use crate::image::decoder::PixelDecoder;
pub use loader::ImageLoader;
pub use pdf::canvas::{PdfCanvas, RenderSurface, RgbFrame};
pub use placement::ImagePlacement;

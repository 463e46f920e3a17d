// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rendering surface — where composited RGB frames end up.
//
// `PdfCanvas` builds pages with printpdf 0.8's data-oriented API: each page
// is a `Vec<Op>`, images are registered once as XObjects, and the document is
// serialised with `PdfDocument::save()`.

use std::path::Path;

use imagegate_core::PaperSize;
use imagegate_core::error::{ImageGateError, Result};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

/// One composited image ready to draw.
///
/// `x`/`y` is the lower-left corner in points; `width`/`height` is the drawn
/// size in points, independent of the pixel dimensions.
#[derive(Debug, Clone, Copy)]
pub struct RgbFrame<'a> {
    /// Row-major RGB triples, `pixel_width * pixel_height * 3` bytes.
    pub pixels: &'a [u8],
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RgbFrame<'_> {
    fn expected_len(&self) -> usize {
        self.pixel_width as usize * self.pixel_height as usize * 3
    }
}

/// A page-drawing primitive that accepts RGB frames.
pub trait RenderSurface {
    fn draw_image(&mut self, frame: &RgbFrame<'_>) -> Result<()>;
}

/// Renders frames into a PDF document.
///
/// Images are embedded at 72 DPI so one pixel is one point before scaling,
/// then scaled independently per axis to the frame's drawn size.
pub struct PdfCanvas {
    doc: PdfDocument,
    paper_size: PaperSize,
    pages: Vec<PdfPage>,
    current: Vec<Op>,
}

impl PdfCanvas {
    /// Create a canvas whose pages use `paper_size`.
    pub fn new(title: &str, paper_size: PaperSize) -> Self {
        Self {
            doc: PdfDocument::new(title),
            paper_size,
            pages: Vec::new(),
            current: Vec::new(),
        }
    }

    /// Create a canvas defaulting to A4.
    pub fn a4(title: &str) -> Self {
        Self::new(title, PaperSize::A4)
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Close the current page and start a new one.
    pub fn add_page(&mut self) {
        let (page_w, page_h) = self.page_dimensions();
        let ops = std::mem::take(&mut self.current);
        self.pages.push(PdfPage::new(page_w, page_h, ops));
    }

    /// Pages produced so far, counting the one in progress.
    pub fn page_count(&self) -> usize {
        self.pages.len() + 1
    }

    /// Serialise the document to PDF bytes.
    #[instrument(skip_all, fields(pages = self.page_count()))]
    pub fn finish(mut self) -> Vec<u8> {
        self.add_page();
        let pages = std::mem::take(&mut self.pages);
        self.doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = self.doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(bytes = output.len(), warnings = warnings.len(), "PDF serialised");
        output
    }

    /// Serialise the document and write it to `path`.
    pub fn save(self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.finish();
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }
}

impl RenderSurface for PdfCanvas {
    fn draw_image(&mut self, frame: &RgbFrame<'_>) -> Result<()> {
        if frame.pixel_width == 0 || frame.pixel_height == 0 {
            return Err(ImageGateError::Render("image has no pixels".into()));
        }
        if frame.pixels.len() != frame.expected_len() {
            return Err(ImageGateError::Render(format!(
                "frame is {} bytes, expected {} for {}x{} RGB",
                frame.pixels.len(),
                frame.expected_len(),
                frame.pixel_width,
                frame.pixel_height
            )));
        }

        let raw = RawImage {
            pixels: RawImageData::U8(frame.pixels.to_vec()),
            width: frame.pixel_width as usize,
            height: frame.pixel_height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = self.doc.add_image(&raw);

        let scale_x = (frame.width / f64::from(frame.pixel_width)) as f32;
        let scale_y = (frame.height / f64::from(frame.pixel_height)) as f32;
        self.current.push(Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(frame.x as f32)),
                translate_y: Some(Pt(frame.y as f32)),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(72.0),
                rotate: None,
            },
        });

        debug!(
            pixel_width = frame.pixel_width,
            pixel_height = frame.pixel_height,
            scale_x,
            scale_y,
            "Image placed on page"
        );
        Ok(())
    }
}

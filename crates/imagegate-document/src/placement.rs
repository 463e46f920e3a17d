// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image placement — page geometry for one image, drawn at render time.

use imagegate_core::error::Result;
use imagegate_core::types::{ClipRect, Opacity, ResourceLocator, SessionKey};
use imagegate_fetch::TrustCheck;
use tracing::{info, instrument};

use crate::loader::ImageLoader;
use crate::pdf::canvas::{RenderSurface, RgbFrame};

/// Where and how an image is drawn on a page.
///
/// Geometry is in page points. A clip is given in the same units, relative
/// to the placement origin; when set, the drawn size becomes the clip size
/// while the full size is kept to scale the clip into image pixels.
///
/// Cloning yields an independent placement. Nothing decoded is cached here,
/// so each render opens the image afresh.
#[derive(Debug, Clone)]
pub struct ImagePlacement {
    locator: ResourceLocator,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    clip: Option<ClipRect>,
    opacity: Opacity,
    session_key: Option<SessionKey>,
    trust: TrustCheck,
}

impl ImagePlacement {
    pub fn new(locator: ResourceLocator, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            locator,
            x,
            y,
            width,
            height,
            clip: None,
            opacity: Opacity::OPAQUE,
            session_key: None,
            trust: TrustCheck::Enforce,
        }
    }

    pub fn with_clip(mut self, clip: ClipRect) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn with_opacity(mut self, opacity: Opacity) -> Self {
        self.opacity = opacity;
        self
    }

    /// Credential used when the trust list must be looked up in the store.
    pub fn with_session_key(mut self, key: SessionKey) -> Self {
        self.session_key = Some(key);
        self
    }

    /// Skip the host trust check. Only for locators the caller generated.
    pub fn override_trust(mut self) -> Self {
        self.trust = TrustCheck::Override;
        self
    }

    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    pub fn clip(&self) -> Option<ClipRect> {
        self.clip
    }

    /// Drawn width: the clip width when clipped.
    pub fn width(&self) -> f64 {
        match self.clip {
            Some(clip) => clip.width() as f64,
            None => self.width,
        }
    }

    /// Drawn height: the clip height when clipped.
    pub fn height(&self) -> f64 {
        match self.clip {
            Some(clip) => clip.height() as f64,
            None => self.height,
        }
    }

    /// `(x0, y0, x1, y1)` of the drawn area.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.x + self.width(), self.y + self.height())
    }

    /// Open the image, apply the clip, and draw it onto `surface`.
    #[instrument(skip_all, fields(locator = %self.locator.redacted()))]
    pub fn render(&self, loader: &ImageLoader, surface: &mut dyn RenderSurface) -> Result<()> {
        let mut decoder =
            loader.open(&self.locator, self.opacity, self.session_key.as_ref(), self.trust)?;

        if let Some(clip) = self.clip {
            let (image_width, image_height) = decoder.original_dimensions();
            let mapped = clip.to_image_space(self.width, self.height, image_width, image_height);
            decoder.set_clip_rect(mapped)?;
        }

        let (pixel_width, pixel_height) = (decoder.width(), decoder.height());
        let frame = RgbFrame {
            pixels: decoder.rgb_data()?,
            pixel_width,
            pixel_height,
            x: self.x,
            y: self.y,
            width: self.width(),
            height: self.height(),
        };
        surface.draw_image(&frame)?;

        info!(pixel_width, pixel_height, "image frame drawn");
        Ok(())
    }
}

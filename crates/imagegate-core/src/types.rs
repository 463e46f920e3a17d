// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for imagegate.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ImageGateError, Result};

/// Where an image lives. Classified once, at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocator {
    /// A file on the local filesystem.
    Local(PathBuf),
    /// An `http` or `https` URL. Subject to host trust evaluation.
    Remote(Url),
}

impl ResourceLocator {
    /// Classify `raw` as a remote URL (`http`/`https`, case-insensitive) or a
    /// local path. A `file://` prefix is stripped.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ImageGateError::InvalidLocator("empty locator".into()));
        }

        if has_scheme(trimmed, "http://") || has_scheme(trimmed, "https://") {
            let url = Url::parse(trimmed)
                .map_err(|e| ImageGateError::InvalidLocator(format!("'{trimmed}': {e}")))?;
            return Ok(Self::Remote(url));
        }

        if has_scheme(trimmed, "file://") {
            return Ok(Self::Local(PathBuf::from(&trimmed["file://".len()..])));
        }

        Ok(Self::Local(PathBuf::from(trimmed)))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Remote URL, if any.
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Remote(url) => Some(url),
            Self::Local(_) => None,
        }
    }

    /// Display form safe for logs: URLs go through [`redact_url`].
    pub fn redacted(&self) -> String {
        match self {
            Self::Local(path) => path.display().to_string(),
            Self::Remote(url) => redact_url(url),
        }
    }
}

/// Render a URL for logs without its query string, fragment or credentials.
pub fn redact_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}{}", url.scheme(), url.path()),
        None => format!("{}://{host}{}", url.scheme(), url.path()),
    }
}

fn has_scheme(raw: &str, scheme: &str) -> bool {
    raw.get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

impl std::fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

impl std::str::FromStr for ResourceLocator {
    type Err = ImageGateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangle `(x0, y0)`–`(x1, y1)`, exclusive on the far edges.
///
/// Used both in placement space (page units, relative to the placement
/// origin) and in image space (pixels). Construction does not validate;
/// [`ClipRect::fits_within`] checks it against concrete image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl ClipRect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> i64 {
        i64::from(self.x1) - i64::from(self.x0)
    }

    pub fn height(&self) -> i64 {
        i64::from(self.y1) - i64::from(self.y0)
    }

    /// Whether the rect is non-empty, has a non-negative origin, and lies
    /// inside `[0, width] x [0, height]`.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x1 > self.x0
            && self.y1 > self.y0
            && self.x0 >= 0
            && self.y0 >= 0
            && i64::from(self.x1) <= i64::from(width)
            && i64::from(self.y1) <= i64::from(height)
    }

    /// Map a placement-space clip into image pixels.
    ///
    /// Each axis scales independently by `image_px / placement_units`. The
    /// near edges round down and the far edges round up so the mapped rect
    /// covers every pixel the placement clip touches.
    pub fn to_image_space(
        &self,
        placement_width: f64,
        placement_height: f64,
        image_width: u32,
        image_height: u32,
    ) -> ClipRect {
        let sx = f64::from(image_width) / placement_width;
        let sy = f64::from(image_height) / placement_height;
        ClipRect {
            x0: (f64::from(self.x0) * sx).floor() as i32,
            y0: (f64::from(self.y0) * sy).floor() as i32,
            x1: (f64::from(self.x1) * sx).ceil() as i32,
            y1: (f64::from(self.y1) * sy).ceil() as i32,
        }
    }
}

impl std::fmt::Display for ClipRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x0, self.y0, self.x1, self.y1)
    }
}

/// Opacity applied on top of any per-pixel alpha, in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Opacity(f64);

impl Opacity {
    pub const OPAQUE: Opacity = Opacity(1.0);

    /// Fails with [`ImageGateError::InvalidOpacity`] for NaN or values
    /// outside `[0.0, 1.0]`.
    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ImageGateError::InvalidOpacity(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self::OPAQUE
    }
}

impl TryFrom<f64> for Opacity {
    type Error = ImageGateError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Opacity> for f64 {
    fn from(opacity: Opacity) -> f64 {
        opacity.0
    }
}

/// Session credential forwarded to the configuration store when the trust
/// list has to be looked up.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for handing to the store.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}

/// Standard paper sizes for generated reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image format sniffing from file suffixes and HTTP content types.

use serde::{Deserialize, Serialize};

use crate::types::ResourceLocator;

/// Encoding family of an embeddable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpg,
    /// Anything that is not PNG or JPEG. Never decoded.
    Unknown,
}

impl ImageFormat {
    /// Infer the format from the final suffix of `name`.
    ///
    /// Only the last path segment is considered. `jpg`/`jpeg` map to
    /// [`ImageFormat::Jpg`], `png` to [`ImageFormat::Png`], case-insensitively.
    pub fn sniff(name: &str) -> Self {
        let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
        match file_name.rsplit_once('.') {
            Some((_, suffix)) => Self::from_extension(suffix),
            None => Self::Unknown,
        }
    }

    /// Infer the format of a locator: the URL path for remote locators, the
    /// file name for local ones.
    pub fn sniff_locator(locator: &ResourceLocator) -> Self {
        match locator {
            ResourceLocator::Local(path) => Self::sniff(&path.to_string_lossy()),
            ResourceLocator::Remote(url) => Self::sniff(url.path()),
        }
    }

    /// Map a bare file extension (without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpg,
            "png" => Self::Png,
            _ => Self::Unknown,
        }
    }

    /// Map an HTTP `Content-Type` header value. Parameters such as
    /// `; charset=...` are ignored.
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Self::Png,
            "image/jpeg" => Self::Jpg,
            _ => Self::Unknown,
        }
    }

    /// MIME type, or `None` for [`ImageFormat::Unknown`].
    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            Self::Png => Some("image/png"),
            Self::Jpg => Some("image/jpeg"),
            Self::Unknown => None,
        }
    }

    /// Upper-case label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpg => "JPG",
            Self::Unknown => "PNG or JPG",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Unknown => "unknown",
        })
    }
}

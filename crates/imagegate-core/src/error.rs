// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for imagegate.

use thiserror::Error;

use crate::types::ClipRect;

/// Top-level error type for all imagegate operations.
///
/// Every variant is terminal for the single image being processed. The
/// document pipeline decides whether to abort the document, skip the image,
/// or draw a placeholder.
#[derive(Debug, Error)]
pub enum ImageGateError {
    // -- Trust / transport --
    #[error("cannot access image at {locator}: host not included in the trusted hosts list")]
    UntrustedSource { locator: String },

    #[error("cannot access {locator}: {reason}")]
    RemoteAccess {
        locator: String,
        /// HTTP status when a response was received; `None` for timeouts and
        /// connection failures.
        status: Option<u16>,
        reason: String,
    },

    #[error("invalid resource locator: {0}")]
    InvalidLocator(String),

    // -- Image errors --
    #[error("{locator} is not a {expected} file")]
    UnsupportedFormat { locator: String, expected: String },

    #[error("invalid opacity value {0}")]
    InvalidOpacity(f64),

    #[error("{0} is an invalid clip rect")]
    InvalidClipRect(ClipRect),

    #[error("image decoding failed: {0}")]
    Decode(String),

    // -- Rendering surface --
    #[error("PDF rendering failed: {0}")]
    Render(String),

    // -- Storage / configuration --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl ImageGateError {
    /// Shorthand for an [`ImageGateError::UnsupportedFormat`].
    pub fn unsupported(locator: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            locator: locator.into(),
            expected: expected.into(),
        }
    }

    /// HTTP status attached to a remote access failure, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::RemoteAccess { status, .. } => *status,
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ImageGateError>;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — the rendering surface images are drawn onto.

pub mod canvas;

pub use canvas::{PdfCanvas, RenderSurface, RgbFrame};

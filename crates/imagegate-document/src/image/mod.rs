// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — container decoding and RGB compositing.

pub mod codec;
pub mod decoder;

pub use codec::{ImageCodec, PlanarRows, RasterCodec};
pub use decoder::PixelDecoder;

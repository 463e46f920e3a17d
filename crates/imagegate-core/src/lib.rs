// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// imagegate — Core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod format;
pub mod types;

pub use config::GateConfig;
pub use error::{ImageGateError, Result};
pub use format::ImageFormat;
pub use types::*;

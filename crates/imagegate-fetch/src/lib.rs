// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// imagegate Fetch — retrieves remote images for PDF generation after the
// host trust check has passed. One bounded request per image, no retries.

pub mod fetcher;
pub mod transport;

pub use fetcher::{FetchedImage, RemoteFetcher};
pub use transport::{FETCH_TIMEOUT, TransportSettings, TrustCheck};

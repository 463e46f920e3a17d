// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gate configuration, as handed over by the hosting application.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings for image fetching in PDF generation.
///
/// imagegate never persists this; the caller loads it from its own
/// configuration store and passes it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Comma-separated trust list (hosts, `*` globs, CIDRs, `!` exclusions).
    /// Empty means no remote image is trusted.
    pub pdfgen_trusted_hosts: String,
    /// User-Agent sent with image requests.
    pub user_agent: String,
    /// Maximum number of redirects followed for one image (default 5).
    pub max_redirects: usize,
    /// Largest image body accepted from a remote host, in bytes (default 50 MiB).
    pub max_image_bytes: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            pdfgen_trusted_hosts: String::new(),
            user_agent: concat!("imagegate/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 5,
            max_image_bytes: 50 * 1024 * 1024,
        }
    }
}

impl GateConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Trust list entries, trimmed, with empty entries dropped.
    pub fn trusted_host_entries(&self) -> Vec<&str> {
        split_host_list(&self.pdfgen_trusted_hosts)
    }
}

/// Split a comma-separated trust list the way `web.conf` stores it.
pub fn split_host_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transport settings for remote image requests.

use std::time::Duration;

use imagegate_core::config::GateConfig;
use imagegate_security::TrustPolicy;

/// Every image request is bounded by this timeout. Not configurable.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Whether a fetch consults the host trust evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrustCheck {
    /// Evaluate the host (and every redirect target) against the trust list.
    #[default]
    Enforce,
    /// Skip the evaluation. Only for locators the caller itself produced.
    Override,
}

/// Settings shared by every fetch made through one `RemoteFetcher`.
///
/// Certificate validation is always disabled on this path: report
/// generation talks to intranet endpoints that commonly use self-signed
/// certificates, and the trust list is the gate instead.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Where the trust list for each request comes from.
    pub trust: TrustPolicy,
    pub user_agent: String,
    /// Maximum redirects followed for one image.
    pub max_redirects: usize,
    /// Responses larger than this many bytes are refused.
    pub max_bytes: u64,
}

impl TransportSettings {
    pub fn new(trust: TrustPolicy) -> Self {
        let defaults = GateConfig::default();
        Self {
            trust,
            user_agent: defaults.user_agent,
            max_redirects: defaults.max_redirects,
            max_bytes: defaults.max_image_bytes,
        }
    }

    /// Settings whose trust list is the config's `pdfgen_trusted_hosts`.
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            trust: TrustPolicy::from_config(config),
            user_agent: config.user_agent.clone(),
            max_redirects: config.max_redirects,
            max_bytes: config.max_image_bytes,
        }
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self::new(TrustPolicy::deny_all())
    }
}

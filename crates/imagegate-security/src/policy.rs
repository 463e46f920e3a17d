// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trust policy — where the trust list for one request comes from.
//
// Resolution order: a request-scoped list supplied by the caller, then the
// configuration store (queried with the caller's session key), then nothing.
// A failing store lookup is logged and yields an empty list, which trusts no
// remote host.

use std::sync::Arc;

use imagegate_core::config::GateConfig;
use imagegate_core::error::Result;
use imagegate_core::types::SessionKey;
use tracing::{debug, warn};

use crate::trust_list::TrustList;

/// A configuration store holding the comma-separated trust list.
pub trait TrustedHostsSource: Send + Sync {
    fn trusted_hosts(&self, session_key: Option<&SessionKey>) -> Result<String>;
}

impl TrustedHostsSource for GateConfig {
    fn trusted_hosts(&self, _session_key: Option<&SessionKey>) -> Result<String> {
        Ok(self.pdfgen_trusted_hosts.clone())
    }
}

/// Supplies the trust list for each fetch.
#[derive(Clone, Default)]
pub struct TrustPolicy {
    request_scoped: Option<TrustList>,
    store: Option<Arc<dyn TrustedHostsSource>>,
}

impl TrustPolicy {
    /// A policy that trusts no remote host.
    pub fn deny_all() -> Self {
        Self::default()
    }

    /// Always use `list`.
    pub fn fixed(list: TrustList) -> Self {
        Self {
            request_scoped: Some(list),
            store: None,
        }
    }

    /// Use the `pdfgen_trusted_hosts` entry of `config`.
    pub fn from_config(config: &GateConfig) -> Self {
        Self::fixed(TrustList::from_config_str(&config.pdfgen_trusted_hosts))
    }

    /// Look the list up in `store` on every resolution.
    pub fn from_store(store: Arc<dyn TrustedHostsSource>) -> Self {
        Self {
            request_scoped: None,
            store: Some(store),
        }
    }

    /// Override the store with a list scoped to the current request.
    pub fn with_request_scoped(mut self, list: TrustList) -> Self {
        self.request_scoped = Some(list);
        self
    }

    /// The trust list in effect for a request made with `session_key`.
    pub fn resolve(&self, session_key: Option<&SessionKey>) -> TrustList {
        if let Some(list) = &self.request_scoped {
            debug!(entries = list.len(), "using request-scoped trust list");
            return list.clone();
        }

        let Some(store) = &self.store else {
            return TrustList::default();
        };

        match store.trusted_hosts(session_key) {
            Ok(raw) => {
                let list = TrustList::from_config_str(&raw);
                debug!(entries = list.len(), "loaded trust list from store");
                list
            }
            Err(err) => {
                warn!(error = %err, "trusted hosts lookup failed; no remote host will be trusted");
                TrustList::default()
            }
        }
    }
}

impl std::fmt::Debug for TrustPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustPolicy")
            .field("request_scoped", &self.request_scoped)
            .field("store", &self.store.is_some())
            .finish()
    }
}

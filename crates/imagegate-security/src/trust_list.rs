// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trust list entries, classified once when the list is built.

use imagegate_core::config::split_host_list;

use crate::cidr::{Ipv4Network, Ipv6Network};

/// What a single trust list entry matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPattern {
    /// The bare `*` entry: trust everything, including loopback hosts.
    Wildcard,
    Ipv4(Ipv4Network),
    Ipv6(Ipv6Network),
    /// Anything else: a literal hostname or a `*` glob over the full host.
    DnsGlob(String),
    /// More than one `*`. Reaching this entry denies the whole evaluation.
    Malformed,
}

/// One entry of an ordered trust list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustListEntry {
    raw: String,
    pattern: HostPattern,
    exclusion: bool,
}

impl TrustListEntry {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if raw.matches('*').count() > 1 {
            return Self {
                raw: raw.to_owned(),
                pattern: HostPattern::Malformed,
                exclusion: raw.starts_with('!'),
            };
        }

        if raw == "*" {
            return Self {
                raw: raw.to_owned(),
                pattern: HostPattern::Wildcard,
                exclusion: false,
            };
        }

        let (exclusion, body) = match raw.strip_prefix('!') {
            Some(body) => (true, body),
            None => (false, raw),
        };

        let pattern = if let Some(net) = Ipv4Network::parse(body) {
            HostPattern::Ipv4(net)
        } else if let Some(net) = Ipv6Network::parse(body) {
            HostPattern::Ipv6(net)
        } else {
            HostPattern::DnsGlob(body.to_owned())
        };

        Self {
            raw: raw.to_owned(),
            pattern,
            exclusion,
        }
    }

    /// The entry as configured, including any `!`.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn pattern(&self) -> &HostPattern {
        &self.pattern
    }

    pub fn is_exclusion(&self) -> bool {
        self.exclusion
    }
}

/// An ordered, immutable trust list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustList {
    entries: Vec<TrustListEntry>,
}

impl TrustList {
    /// Build a list from individual entries; blank entries are dropped.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .filter(|entry| !entry.as_ref().trim().is_empty())
            .map(|entry| TrustListEntry::parse(entry.as_ref()))
            .collect();
        Self { entries }
    }

    /// Parse the comma-separated form stored in configuration.
    pub fn from_config_str(raw: &str) -> Self {
        Self::new(split_host_list(raw))
    }

    pub fn entries(&self) -> &[TrustListEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list contains the bare `*` entry anywhere.
    pub fn has_wildcard(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.pattern == HostPattern::Wildcard)
    }
}

impl<S: AsRef<str>> FromIterator<S> for TrustList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

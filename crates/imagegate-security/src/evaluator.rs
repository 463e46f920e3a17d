// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host trust evaluation — decides whether a remote image may be fetched.
//
// The trust list is scanned in order. Network entries short-circuit as soon
// as they can decide; an exclusion network decides the whole evaluation the
// moment it is reached, matching or not. Whatever survives the scan is
// matched as an anchored glob against the full hostname.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, instrument, warn};
use url::{Host, Url};

use crate::resolver::{HostResolver, SystemResolver};
use crate::trust_list::{HostPattern, TrustList, TrustListEntry};

/// Why a verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// The trust list has no entries.
    EmptyList,
    /// The locator is not a URL or has no host.
    NoHost,
    /// The host resolves to a loopback address and `*` is absent.
    LoopbackGuard,
    /// An entry holds more than one `*`.
    MalformedEntry,
    /// The bare `*` entry was reached.
    Wildcard,
    /// The host address lies inside a trusted network.
    NetworkMatch,
    /// The host address lies inside an excluded network.
    ExcludedNetwork,
    /// The first applicable exclusion network does not contain the host.
    OutsideExclusion,
    /// A DNS glob matched the hostname.
    GlobMatch,
    /// Nothing matched.
    NoMatch,
}

/// Outcome of one trust evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Trusted(Reason),
    Denied(Reason),
}

impl Verdict {
    pub fn is_trusted(&self) -> bool {
        matches!(self, Self::Trusted(_))
    }

    pub fn reason(&self) -> Reason {
        match self {
            Self::Trusted(reason) | Self::Denied(reason) => *reason,
        }
    }
}

/// The host part of a URL, classified for network matching.
#[derive(Debug, Clone, Copy)]
enum HostKind {
    Name,
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

/// Evaluates resource locators against trust lists.
///
/// Cheap to clone; the resolver is shared.
#[derive(Clone)]
pub struct HostTrustEvaluator {
    resolver: Arc<dyn HostResolver>,
}

impl HostTrustEvaluator {
    /// Evaluator resolving hostnames through the operating system.
    pub fn new() -> Self {
        Self::with_resolver(SystemResolver)
    }

    pub fn with_resolver(resolver: impl HostResolver + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// Whether `locator` may be fetched under `trust_list`. Unparseable
    /// locators are never trusted.
    pub fn is_trusted(&self, locator: &str, trust_list: &TrustList) -> bool {
        match Url::parse(locator) {
            Ok(url) => self.evaluate(&url, trust_list).is_trusted(),
            Err(err) => {
                debug!(error = %err, "locator is not a URL; not trusted");
                false
            }
        }
    }

    /// Full evaluation, returning the reason along with the decision.
    #[instrument(skip_all, fields(host = url.host_str().unwrap_or_default()))]
    pub fn evaluate(&self, url: &Url, trust_list: &TrustList) -> Verdict {
        let verdict = self.scan(url, trust_list);
        debug!(?verdict, "trust evaluation complete");
        verdict
    }

    fn scan(&self, url: &Url, trust_list: &TrustList) -> Verdict {
        let (domain, kind) = match url.host() {
            None => return Verdict::Denied(Reason::NoHost),
            Some(Host::Domain(name)) => (name.to_owned(), HostKind::Name),
            Some(Host::Ipv4(addr)) => (addr.to_string(), HostKind::V4(addr)),
            Some(Host::Ipv6(addr)) => (addr.to_string(), HostKind::V6(addr)),
        };

        if trust_list.is_empty() {
            return Verdict::Denied(Reason::EmptyList);
        }

        let resolved = match kind {
            HostKind::V4(addr) => Some(addr),
            HostKind::V6(_) => None,
            HostKind::Name => self.resolver.resolve_ipv4(&domain),
        };
        if resolved.is_some_and(|ip| ip.is_loopback()) && !trust_list.has_wildcard() {
            return Verdict::Denied(Reason::LoopbackGuard);
        }

        let mut globs: Vec<&TrustListEntry> = Vec::new();
        for entry in trust_list.entries() {
            match (entry.pattern(), kind) {
                (HostPattern::Malformed, _) => return Verdict::Denied(Reason::MalformedEntry),
                (HostPattern::Wildcard, _) => return Verdict::Trusted(Reason::Wildcard),
                (HostPattern::Ipv4(net), HostKind::V4(ip)) => {
                    if let Some(verdict) = network_verdict(entry, net.contains(ip)) {
                        return verdict;
                    }
                }
                (HostPattern::Ipv6(net), HostKind::V6(ip)) => {
                    if let Some(verdict) = network_verdict(entry, net.contains(ip)) {
                        return verdict;
                    }
                }
                _ if entry.is_exclusion() => {}
                _ => globs.push(entry),
            }
        }

        if glob_matches(&globs, &domain) {
            Verdict::Trusted(Reason::GlobMatch)
        } else {
            Verdict::Denied(Reason::NoMatch)
        }
    }
}

impl Default for HostTrustEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HostTrustEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostTrustEvaluator").finish_non_exhaustive()
    }
}

/// Decision of a network entry the host address could be compared with.
/// `None` means the entry is consumed without deciding.
fn network_verdict(entry: &TrustListEntry, contained: bool) -> Option<Verdict> {
    match (entry.is_exclusion(), contained) {
        (true, true) => Some(Verdict::Denied(Reason::ExcludedNetwork)),
        (true, false) => Some(Verdict::Trusted(Reason::OutsideExclusion)),
        (false, true) => Some(Verdict::Trusted(Reason::NetworkMatch)),
        (false, false) => None,
    }
}

/// Match `domain` against all glob candidates as one anchored alternation.
fn glob_matches(globs: &[&TrustListEntry], domain: &str) -> bool {
    if globs.is_empty() {
        return false;
    }

    let alternation: Vec<String> = globs.iter().map(|entry| glob_to_regex(entry.raw())).collect();
    let pattern = format!("^(?:{})$", alternation.join("|"));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(domain),
        Err(err) => {
            warn!(error = %err, "trust list globs failed to compile; denying");
            false
        }
    }
}

/// Translate a shell-style glob: `*` is any run, `?` one character, the rest
/// is literal. A leading `*` glued to the start of a label (`*example.com`)
/// matches that name or any subdomain of it, never a longer label such as
/// `otherexample.com`. When the next character cannot start a label
/// (`*-cdn.example.com`) the `*` is an ordinary run.
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    let body = match glob.strip_prefix('*') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_alphanumeric()) => {
            out.push_str(r"(?:.*\.)?");
            rest
        }
        _ => glob,
    };
    for ch in body.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    out
}

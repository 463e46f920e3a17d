// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! imagegate-security — decides whether a remote image host may be contacted.
//!
//! The trust list is an ordered policy of exact hosts, `*` DNS globs, IPv4 /
//! IPv6 CIDR blocks and `!` exclusions. Evaluation is a short-circuiting
//! ordered scan with a loopback-resolution guard in front of it.

pub mod cidr;
pub mod evaluator;
pub mod policy;
pub mod resolver;
pub mod trust_list;

pub use cidr::{Ipv4Network, Ipv6Network};
pub use evaluator::{HostTrustEvaluator, Reason, Verdict};
pub use policy::{TrustPolicy, TrustedHostsSource};
pub use resolver::{HostResolver, StaticResolver, SystemResolver};
pub use trust_list::{HostPattern, TrustList, TrustListEntry};

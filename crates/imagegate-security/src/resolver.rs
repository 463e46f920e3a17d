// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hostname resolution for the loopback guard.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};

use tracing::debug;

/// Best-effort IPv4 resolution. `None` means "could not resolve", which the
/// evaluator treats as "no loopback evidence".
pub trait HostResolver: Send + Sync {
    fn resolve_ipv4(&self, host: &str) -> Option<Ipv4Addr>;
}

/// Resolves through the operating system (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn resolve_ipv4(&self, host: &str) -> Option<Ipv4Addr> {
        let addrs = match (host, 0u16).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(err) => {
                debug!(host, error = %err, "host resolution failed");
                return None;
            }
        };
        addrs.into_iter().find_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
    }
}

/// Fixed host → address table. Hosts not in the table do not resolve.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    table: HashMap<String, Ipv4Addr>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>, addr: Ipv4Addr) -> Self {
        self.table.insert(host.into(), addr);
        self
    }
}

impl HostResolver for StaticResolver {
    fn resolve_ipv4(&self, host: &str) -> Option<Ipv4Addr> {
        self.table.get(host).copied()
    }
}

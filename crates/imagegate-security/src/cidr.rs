// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// IPv4 / IPv6 network literals (`addr` or `addr/prefix`) with strict parsing:
// the address must have no bits set beyond the prefix.

use std::net::{Ipv4Addr, Ipv6Addr};

/// An IPv4 network such as `10.1.0.0/16`. A bare address is a `/32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Network {
    addr: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Network {
    /// Parse `a.b.c.d` or `a.b.c.d/n`. Returns `None` for anything else,
    /// including host bits set past the prefix.
    pub fn parse(text: &str) -> Option<Self> {
        let (addr, prefix) = split_prefix(text, 32)?;
        let addr: Ipv4Addr = addr.parse().ok()?;
        let net = Self { addr, prefix };
        (u32::from(addr) & !net.mask() == 0).then_some(net)
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & self.mask() == u32::from(self.addr)
    }

    fn mask(&self) -> u32 {
        u32::MAX.checked_shl(32 - u32::from(self.prefix)).unwrap_or(0)
    }
}

/// An IPv6 network such as `2001:db00::/24`. A bare address is a `/128`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv6Network {
    addr: Ipv6Addr,
    prefix: u8,
}

impl Ipv6Network {
    /// Parse `addr` or `addr/n` with the same strictness as [`Ipv4Network`].
    pub fn parse(text: &str) -> Option<Self> {
        let (addr, prefix) = split_prefix(text, 128)?;
        let addr: Ipv6Addr = addr.parse().ok()?;
        let net = Self { addr, prefix };
        (u128::from(addr) & !net.mask() == 0).then_some(net)
    }

    pub fn addr(&self) -> Ipv6Addr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn contains(&self, ip: Ipv6Addr) -> bool {
        u128::from(ip) & self.mask() == u128::from(self.addr)
    }

    fn mask(&self) -> u128 {
        u128::MAX.checked_shl(128 - u32::from(self.prefix)).unwrap_or(0)
    }
}

/// Split `addr/prefix`; a missing prefix means a single host (`max`).
fn split_prefix(text: &str, max: u8) -> Option<(&str, u8)> {
    match text.split_once('/') {
        None => Some((text, max)),
        Some((addr, prefix)) => {
            if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let prefix: u8 = prefix.parse().ok()?;
            (prefix <= max).then_some((addr, prefix))
        }
    }
}

//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bgp_nht_utils::ip;
use bgp_nht_utils::ip::{Ipv4AddrExt, Ipv6AddrExt};
use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};

use crate::cache::{NexthopCache, NexthopCaches};
use crate::rib::NexthopAttr;

// Address-family specific code.
pub trait AddressFamily: Sized {
    // Address family identifier.
    const AF: ip::AddressFamily;

    // The type of IP address used by this address family.
    type IpAddr: Copy + Into<IpAddr>;
    // The type of IP network used by this address family.
    type IpNetwork: Copy
        + Ord
        + std::fmt::Debug
        + Into<IpNetwork>
        + prefix_trie::Prefix;

    // Get the nexthop cache for this address family from the provided
    // `NexthopCaches`.
    fn cache(caches: &NexthopCaches) -> &NexthopCache<Self>;
    fn cache_mut(caches: &mut NexthopCaches) -> &mut NexthopCache<Self>;

    // Extract the nexthop address subject to resolution from the received
    // BGP attributes. `None` means the nexthop form is reachable by
    // definition and bypasses the cache.
    fn nexthop_rx_track(attr: &NexthopAttr) -> Option<Self::IpAddr>;

    // Build the host prefix the given address is cached under.
    fn host_prefix(addr: &Self::IpAddr) -> Self::IpNetwork;
}

#[derive(Debug)]
pub struct Ipv4Unicast;

#[derive(Debug)]
pub struct Ipv6Unicast;

// ===== impl Ipv4Unicast =====

impl AddressFamily for Ipv4Unicast {
    const AF: ip::AddressFamily = ip::AddressFamily::Ipv4;

    type IpAddr = Ipv4Addr;
    type IpNetwork = Ipv4Network;

    fn cache(caches: &NexthopCaches) -> &NexthopCache<Self> {
        &caches.ipv4
    }

    fn cache_mut(caches: &mut NexthopCaches) -> &mut NexthopCache<Self> {
        &mut caches.ipv4
    }

    fn nexthop_rx_track(attr: &NexthopAttr) -> Option<Ipv4Addr> {
        match attr {
            NexthopAttr::Ipv4(addr) => Some(*addr),
            _ => None,
        }
    }

    fn host_prefix(addr: &Ipv4Addr) -> Ipv4Network {
        addr.to_host_prefix()
    }
}

// ===== impl Ipv6Unicast =====

impl AddressFamily for Ipv6Unicast {
    const AF: ip::AddressFamily = ip::AddressFamily::Ipv6;

    type IpAddr = Ipv6Addr;
    type IpNetwork = Ipv6Network;

    fn cache(caches: &NexthopCaches) -> &NexthopCache<Self> {
        &caches.ipv6
    }

    fn cache_mut(caches: &mut NexthopCaches) -> &mut NexthopCache<Self> {
        &mut caches.ipv6
    }

    // Only global-form nexthops are resolved: dual (global + link-local)
    // and link-local nexthops are on-link by definition.
    fn nexthop_rx_track(attr: &NexthopAttr) -> Option<Ipv6Addr> {
        match attr {
            NexthopAttr::Ipv6 { local: Some(_), .. } => None,
            NexthopAttr::Ipv6 { global, .. } if global.is_link_local() => {
                None
            }
            NexthopAttr::Ipv6 { global, .. } => Some(*global),
            NexthopAttr::Ipv4(_) => None,
        }
    }

    fn host_prefix(addr: &Ipv6Addr) -> Ipv6Network {
        addr.to_host_prefix()
    }
}

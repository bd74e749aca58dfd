//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};

use bgp_nht_utils::ip::{
    Ipv4AddrExt, Ipv4NetworkExt, Ipv6AddrExt, Ipv6NetworkExt,
};
use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use prefix_trie::PrefixMap;

use crate::rib::NexthopAttr;

// Interface owning a connected address, as reported by the surrounding
// daemon's interface notifications.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Interface {
    pub name: String,
    pub loopback: bool,
}

// Reference-counted connected prefix. Multiple interface addresses may
// yield the same masked prefix.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct ConnectedRef {
    pub refcnt: u32,
}

// Index of locally connected prefixes, the authoritative on-link test.
//
// Stored prefixes are canonical (masked); the any-prefix and IPv6
// unspecified/link-local networks are excluded. Exact interface addresses
// are tracked separately for the own-address test.
#[derive(Debug, Default)]
pub struct ConnectedTable {
    ipv4: PrefixMap<Ipv4Network, ConnectedRef>,
    ipv6: PrefixMap<Ipv6Network, ConnectedRef>,
    ifaddrs: BTreeMap<IpAddr, u32>,
}

// ===== impl ConnectedTable =====

impl ConnectedTable {
    // Registers an interface address notification.
    pub fn add(&mut self, iface: &Interface, addr: &IpNetwork) {
        *self.ifaddrs.entry(addr.ip()).or_insert(0) += 1;

        if iface.loopback {
            return;
        }

        match addr {
            IpNetwork::V4(addr) => {
                let prefix = addr.apply_mask();
                if prefix.prefix() == 0 && prefix.ip().is_unspecified() {
                    return;
                }

                let entry = self.ipv4.entry(prefix).or_default();
                entry.refcnt += 1;
            }
            IpNetwork::V6(addr) => {
                let prefix = addr.apply_mask();
                if prefix.ip().is_unspecified()
                    || prefix.ip().is_link_local()
                {
                    return;
                }

                let entry = self.ipv6.entry(prefix).or_default();
                entry.refcnt += 1;
            }
        }
    }

    // Unregisters an interface address notification.
    pub fn delete(&mut self, iface: &Interface, addr: &IpNetwork) {
        if let Some(refcnt) = self.ifaddrs.get_mut(&addr.ip()) {
            *refcnt -= 1;
            if *refcnt == 0 {
                self.ifaddrs.remove(&addr.ip());
            }
        }

        if iface.loopback {
            return;
        }

        match addr {
            IpNetwork::V4(addr) => {
                let prefix = addr.apply_mask();
                if prefix.prefix() == 0 && prefix.ip().is_unspecified() {
                    return;
                }

                let Some(entry) = self.ipv4.get_mut(&prefix) else {
                    return;
                };
                entry.refcnt -= 1;
                if entry.refcnt == 0 {
                    self.ipv4.remove(&prefix);
                }
            }
            IpNetwork::V6(addr) => {
                let prefix = addr.apply_mask();
                if prefix.ip().is_unspecified()
                    || prefix.ip().is_link_local()
                {
                    return;
                }

                let Some(entry) = self.ipv6.get_mut(&prefix) else {
                    return;
                };
                entry.refcnt -= 1;
                if entry.refcnt == 0 {
                    self.ipv6.remove(&prefix);
                }
            }
        }
    }

    // Returns true if the nexthop address lies on a connected network.
    //
    // A dual (global + link-local) IPv6 nexthop is always on-link, and so is
    // a link-local global address; otherwise the address is matched against
    // the connected prefixes.
    pub fn onlink(&self, attr: &NexthopAttr) -> bool {
        match attr {
            NexthopAttr::Ipv4(addr) => {
                self.ipv4.get_lpm(&addr.to_host_prefix()).is_some()
            }
            NexthopAttr::Ipv6 { local: Some(_), .. } => true,
            NexthopAttr::Ipv6 { global, .. } => {
                global.is_link_local()
                    || self.ipv6.get_lpm(&global.to_host_prefix()).is_some()
            }
        }
    }

    // Returns true if both addresses match the same connected prefix entry.
    pub(crate) fn same_multiaccess(
        &self,
        nexthop: Ipv4Addr,
        peer: Ipv4Addr,
    ) -> bool {
        let Some((_, entry1)) = self.ipv4.get_lpm(&nexthop.to_host_prefix())
        else {
            return false;
        };
        let Some((_, entry2)) = self.ipv4.get_lpm(&peer.to_host_prefix())
        else {
            return false;
        };

        // The matched entry is the identity witness.
        std::ptr::eq(entry1, entry2)
    }

    // Returns true if the nexthop is one of the local interface addresses.
    pub fn nexthop_self(&self, attr: &NexthopAttr) -> bool {
        match attr {
            NexthopAttr::Ipv4(addr) => {
                self.ifaddrs.contains_key(&IpAddr::V4(*addr))
            }
            NexthopAttr::Ipv6 { .. } => false,
        }
    }

    // Iterates over the stored IPv4 connected prefixes.
    pub fn ipv4_prefixes(
        &self,
    ) -> impl Iterator<Item = &Ipv4Network> + '_ {
        self.ipv4.iter().map(|(prefix, _)| prefix)
    }

    // Iterates over the stored IPv6 connected prefixes.
    pub fn ipv6_prefixes(
        &self,
    ) -> impl Iterator<Item = &Ipv6Network> + '_ {
        self.ipv6.iter().map(|(prefix, _)| prefix)
    }
}

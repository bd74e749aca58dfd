//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bgp_nht_utils::ip::{AddressFamilies, AddressFamily};
use bitflags::bitflags;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

// Subsequent address family identifier.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum Safi {
    Unicast,
    Multicast,
    MplsVpn,
}

// BGP peer type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum PeerType {
    Internal,
    External,
}

// The slice of peer state the scan consumes: session status, peer type,
// configured TTL and the set of activated address families.
#[derive(Clone, Debug)]
pub struct Peer {
    pub remote_addr: IpAddr,
    pub peer_type: PeerType,
    pub ttl: u8,
    pub established: bool,
    pub afcs: Vec<(AddressFamily, Safi)>,
}

// Nexthop attribute of a learned route.
//
// A present `local` gateway models the dual global + link-local nexthop
// form (the 32-octet encoding on the wire).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum NexthopAttr {
    Ipv4(Ipv4Addr),
    Ipv6 {
        global: Ipv6Addr,
        local: Option<Ipv6Addr>,
    },
}

// Route entry origin. Only learned BGP routes are revalidated by the scan.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum RouteKind {
    Normal,
    Static,
    Aggregate,
}

bitflags! {
    // Route entry flags mutated by the scan.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct RouteFlags: u8 {
        const VALID = 0x01;
        const IGP_CHANGED = 0x02;
    }
}

// Per-route entry attached to a RIB prefix.
#[derive(Clone, Debug)]
pub struct RouteInfo {
    pub kind: RouteKind,
    pub peer_type: PeerType,
    pub peer_ttl: u8,
    pub attr: NexthopAttr,
    pub flags: RouteFlags,
    pub igpmetric: u32,
    pub damp_info: bool,
}

// Unicast routing table of one address family: a tree of prefixes to the
// list of route entries learned for each prefix.
#[derive(Debug, Default)]
pub struct RoutingTable {
    pub prefixes: BTreeMap<IpNetwork, Vec<RouteInfo>>,
}

// Statically configured prefix revalidated by the import scan.
#[derive(Clone, Debug, Default)]
pub struct StaticRoute {
    pub backdoor: bool,
    pub valid: bool,
    pub igpmetric: u32,
    pub igpnexthop: Option<Ipv4Addr>,
    pub rmap: Option<String>,
}

// The slice of a BGP instance the scan and import drivers consume.
#[derive(Debug, Default)]
pub struct Bgp {
    pub peers: Vec<Peer>,
    pub rib: AddressFamilies<RoutingTable>,
    pub damping: AddressFamilies<bool>,
    pub import_check: bool,
    pub statics: BTreeMap<(AddressFamily, Safi), BTreeMap<IpNetwork, StaticRoute>>,
}

// Callbacks into the route engine.
//
// The scan revalidates route entries and reports the outcome through these
// methods; route selection, aggregation arithmetic, damping arithmetic and
// the actual advertisement work stay on the other side of this boundary.
pub trait RouteEngine {
    // Enforce the per-peer maximum-prefix limit.
    fn max_prefix_overflow(&mut self, peer: &Peer, af: AddressFamily, safi: Safi);

    // Adjust aggregate contributor counters for a route that became valid or
    // invalid.
    fn aggregate_increment(&mut self, prefix: &IpNetwork);
    fn aggregate_decrement(&mut self, prefix: &IpNetwork);

    // Reconsider the damping state of a route during the scan. Returns true
    // if the route was reused and its aggregate contribution must be
    // restored.
    fn damp_scan(&mut self, info: &mut RouteInfo, af: AddressFamily, safi: Safi) -> bool;

    // Re-run route selection for the prefix after its entries have been
    // revalidated.
    fn process(&mut self, prefix: &IpNetwork);

    // Re-announce or withdraw a statically configured prefix.
    fn static_update(&mut self, prefix: &IpNetwork, af: AddressFamily, safi: Safi);
    fn static_withdraw(&mut self, prefix: &IpNetwork, af: AddressFamily, safi: Safi);
}

// ===== impl Peer =====

impl Peer {
    // Returns whether the given address family is activated on this peer.
    pub fn is_af_enabled(&self, af: AddressFamily, safi: Safi) -> bool {
        self.afcs.contains(&(af, safi))
    }
}

// ===== impl Bgp =====

impl Bgp {
    // Returns the static route tree for the given address family pair,
    // creating it on first use.
    pub fn statics_mut(
        &mut self,
        af: AddressFamily,
        safi: Safi,
    ) -> &mut BTreeMap<IpNetwork, StaticRoute> {
        self.statics.entry((af, safi)).or_default()
    }
}

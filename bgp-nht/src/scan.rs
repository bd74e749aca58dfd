//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use bgp_nht_utils::ip;
use ipnetwork::{IpNetwork, Ipv4Network};
use prefix_trie::PrefixMap;

use crate::af::{AddressFamily, Ipv4Unicast, Ipv6Unicast};
use crate::cache::{NexthopCache, NexthopCacheEntry};
use crate::debug::Debug;
use crate::instance::ScanCore;
use crate::rib::{
    Bgp, PeerType, RouteEngine, RouteFlags, RouteInfo, RouteKind, Safi,
};
use crate::southbound::LookupClient;

// ===== global functions =====

// Runs one full scan cycle over both address families.
pub async fn scan(
    core: &mut ScanCore,
    mut bgp: Option<&mut Bgp>,
    engine: &mut dyn RouteEngine,
) {
    Debug::ScanTimerExpiry.log();

    scan_af::<Ipv4Unicast>(core, bgp.as_deref_mut(), engine).await;
    scan_af::<Ipv6Unicast>(core, bgp.as_deref_mut(), engine).await;
}

// ===== helper functions =====

// Revalidates every learned route of the given address family's unicast
// table against the current IGP state.
async fn scan_af<A>(
    core: &mut ScanCore,
    bgp: Option<&mut Bgp>,
    engine: &mut dyn RouteEngine,
) where
    A: AddressFamily,
{
    A::cache_mut(&mut core.caches).swap();

    let Some(bgp) = bgp else {
        return;
    };

    Debug::ScanStart(A::AF).log();

    // Maximum prefix check.
    for peer in bgp.peers.iter().filter(|peer| peer.established) {
        for safi in [Safi::Unicast, Safi::Multicast, Safi::MplsVpn] {
            if peer.is_af_enabled(A::AF, safi) {
                engine.max_prefix_overflow(peer, A::AF, safi);
            }
        }
    }

    // Check the previous generation's reverse gates against the routing
    // service's current view before resolving anything anew.
    let mut desync: PrefixMap<Ipv4Network, ()> = PrefixMap::new();
    if A::AF == ip::AddressFamily::Ipv4 {
        core.client
            .verify_ipv4_rgates(core.caches.ipv4.inactive(), &mut desync)
            .await;
    }

    let damping = *bgp.damping.get(A::AF);
    for (prefix, infos) in bgp.rib.get_mut(A::AF).prefixes.iter_mut() {
        for info in infos.iter_mut() {
            if info.kind != RouteKind::Normal {
                continue;
            }

            // A prefix whose cached reverse gate failed verification is
            // queued for reinstallation with a freshly resolved gateway;
            // further checks are pointless this scan.
            if A::AF == ip::AddressFamily::Ipv4 {
                if let IpNetwork::V4(prefix) = prefix {
                    if desync.get_lpm(prefix).is_some() {
                        Debug::RgateDesync(prefix).log();
                        info.flags.insert(RouteFlags::IGP_CHANGED);
                        continue;
                    }
                }
            }

            let (valid, changed, _metric_changed) =
                if info.peer_type == PeerType::External && info.peer_ttl == 1
                {
                    (core.connected.onlink(&info.attr), false, false)
                } else {
                    nexthop_lookup::<A>(
                        A::cache_mut(&mut core.caches),
                        &mut core.client,
                        info,
                    )
                    .await
                };

            let current = info.flags.contains(RouteFlags::VALID);
            info.flags.set(RouteFlags::IGP_CHANGED, changed);

            if valid != current {
                if current {
                    engine.aggregate_decrement(prefix);
                    info.flags.remove(RouteFlags::VALID);
                } else {
                    info.flags.insert(RouteFlags::VALID);
                    engine.aggregate_increment(prefix);
                }
            }

            if damping
                && info.damp_info
                && engine.damp_scan(info, A::AF, Safi::Unicast)
            {
                engine.aggregate_increment(prefix);
            }
        }

        engine.process(prefix);
    }

    A::cache_mut(&mut core.caches).reset_inactive();
}

// Checks whether the route's nexthop resolves through the IGP, caching the
// answer for the rest of the scan.
//
// Returns the validity plus the changed/metric-changed markers recorded
// when the address was first resolved this scan. As a side effect the
// route's IGP metric is refreshed from the cache entry.
async fn nexthop_lookup<A>(
    cache: &mut NexthopCache<A>,
    client: &mut LookupClient,
    info: &mut RouteInfo,
) -> (bool, bool, bool)
where
    A: AddressFamily,
{
    // Nexthop forms outside this address family's tracking pass as-is.
    let Some(addr) = A::nexthop_rx_track(&info.attr) else {
        return (true, false, false);
    };
    let prefix = A::host_prefix(&addr);

    if cache.active().get(&prefix).is_none() {
        let bnc = match client.query(addr.into()).await {
            Some(mut bnc) => {
                // First sight this scan: compare against the previous
                // generation.
                if let Some(old) = cache.inactive().get(&prefix) {
                    bnc.compare_generation(old);
                }
                bnc
            }
            // No answer: cache an unresolved entry so further routes with
            // the same nexthop short-circuit this scan.
            None => NexthopCacheEntry::default(),
        };
        cache.active_mut().insert(prefix, bnc);
    }

    let Some(bnc) = cache.active().get(&prefix) else {
        return (false, false, false);
    };

    info.igpmetric = if bnc.valid && bnc.metric > 0 {
        bnc.metric
    } else {
        0
    };

    (bnc.valid, bnc.changed, bnc.metric_changed)
}

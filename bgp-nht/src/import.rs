//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use bgp_nht_utils::ip::AddressFamily;
use ipnetwork::IpNetwork;

use crate::debug::Debug;
use crate::instance::ScanCore;
use crate::rib::{Bgp, RouteEngine, Safi};
use crate::southbound::ImportAnswer;

// ===== global functions =====

// Revalidates every statically configured prefix against the IGP.
pub async fn import(
    core: &mut ScanCore,
    instances: &mut [Bgp],
    engine: &mut dyn RouteEngine,
) {
    Debug::ImportTimerExpiry.log();

    for bgp in instances.iter_mut() {
        let import_check = bgp.import_check;

        for af in [AddressFamily::Ipv4, AddressFamily::Ipv6] {
            for safi in [Safi::Unicast, Safi::Multicast] {
                let Some(statics) = bgp.statics.get_mut(&(af, safi)) else {
                    continue;
                };

                for (prefix, route) in statics.iter_mut() {
                    if route.backdoor {
                        continue;
                    }

                    let valid = route.valid;
                    let metric = route.igpmetric;
                    let nexthop = route.igpnexthop;

                    if import_check
                        && af == AddressFamily::Ipv4
                        && safi == Safi::Unicast
                    {
                        let IpNetwork::V4(prefix) = prefix else {
                            continue;
                        };
                        match core.client.import_check(*prefix).await {
                            // Without a resolver connection every import
                            // candidate counts as present in the IGP.
                            ImportAnswer::Unavailable => {
                                route.valid = true;
                                route.igpmetric = 0;
                            }
                            ImportAnswer::SendFailed => {
                                route.valid = true;
                            }
                            ImportAnswer::NoAnswer => {
                                route.valid = false;
                            }
                            ImportAnswer::Resolved { metric, nexthop } => {
                                route.valid = true;
                                route.igpmetric = metric;
                                route.igpnexthop = nexthop;
                            }
                            ImportAnswer::Unresolved { metric } => {
                                route.valid = false;
                                route.igpmetric = metric;
                            }
                        }
                    } else {
                        route.valid = true;
                        route.igpmetric = 0;
                        route.igpnexthop = None;
                    }

                    if route.valid != valid {
                        if route.valid {
                            engine.static_update(prefix, af, safi);
                        } else {
                            engine.static_withdraw(prefix, af, safi);
                        }
                    } else if route.valid
                        && (route.igpmetric != metric
                            || route.igpnexthop != nexthop
                            || route.rmap.is_some())
                    {
                        engine.static_update(prefix, af, safi);
                    }
                }
            }
        }
    }
}

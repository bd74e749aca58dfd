//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//


use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use bgp_nht::instance::{ScanCfg, ScanCore};
use bgp_nht::packet::message::{
    LookupReplyMsg, Nexthop, Reply, Request, RgateReplyMsg,
};
use bgp_nht::rib::{
    Bgp, NexthopAttr, PeerType, RouteEngine, RouteFlags, RouteInfo,
    RouteKind, Safi,
};
use bgp_nht_utils::ip::AddressFamily;
use ipnetwork::{IpNetwork, Ipv4Network};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

//
// Canned routing service.
//
// Speaks the real wire protocol over one end of a socketpair and records
// every request it receives. The canned data can be changed between scans.
//
#[derive(Clone, Default)]
struct Service {
    nexthops: Arc<Mutex<BTreeMap<IpAddr, (u32, Vec<Nexthop>)>>>,
    imports: Arc<Mutex<BTreeMap<Ipv4Network, (u32, Vec<Nexthop>)>>>,
    desync: Arc<Mutex<Vec<Ipv4Network>>>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl Service {
    fn set_nexthop(&self, addr: IpAddr, metric: u32, nexthops: Vec<Nexthop>) {
        self.nexthops.lock().unwrap().insert(addr, (metric, nexthops));
    }

    fn set_import(
        &self,
        prefix: Ipv4Network,
        metric: u32,
        nexthops: Vec<Nexthop>,
    ) {
        self.imports.lock().unwrap().insert(prefix, (metric, nexthops));
    }

    fn set_desync(&self, prefixes: Vec<Ipv4Network>) {
        *self.desync.lock().unwrap() = prefixes;
    }

    fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    // Spawns the service loop, returning the client end of the connection.
    fn spawn(&self) -> UnixStream {
        let (client, mut server) = UnixStream::pair().unwrap();
        let service = self.clone();

        tokio::spawn(async move {
            loop {
                let mut data = vec![0; 2];
                if server.read_exact(&mut data).await.is_err() {
                    return;
                }
                let length = u16::from_be_bytes([data[0], data[1]]) as usize;
                data.resize(length, 0);
                if server.read_exact(&mut data[2..]).await.is_err() {
                    return;
                }

                let request = Request::decode(&data).unwrap();
                service.requests.lock().unwrap().push(request.clone());

                let reply = match request {
                    Request::Ipv4NexthopLookup(msg) => {
                        let addr = IpAddr::V4(msg.addr);
                        let (metric, nexthops) = service
                            .nexthops
                            .lock()
                            .unwrap()
                            .get(&addr)
                            .cloned()
                            .unwrap_or_default();
                        Some(Reply::Ipv4NexthopLookup(LookupReplyMsg {
                            addr,
                            metric,
                            nexthops,
                        }))
                    }
                    Request::Ipv6NexthopLookup(msg) => {
                        let addr = IpAddr::V6(msg.addr);
                        let (metric, nexthops) = service
                            .nexthops
                            .lock()
                            .unwrap()
                            .get(&addr)
                            .cloned()
                            .unwrap_or_default();
                        Some(Reply::Ipv6NexthopLookup(LookupReplyMsg {
                            addr,
                            metric,
                            nexthops,
                        }))
                    }
                    Request::Ipv4ImportLookup(msg) => {
                        let (metric, nexthops) = service
                            .imports
                            .lock()
                            .unwrap()
                            .get(&msg.prefix)
                            .cloned()
                            .unwrap_or_default();
                        Some(Reply::Ipv4ImportLookup(LookupReplyMsg {
                            addr: IpAddr::V4(msg.prefix.ip()),
                            metric,
                            nexthops,
                        }))
                    }
                    Request::Ipv4RgateVerify(msg) => {
                        // Verification results are only sent back once the
                        // last request frame has arrived.
                        if msg.morefollows {
                            None
                        } else {
                            let prefixes =
                                service.desync.lock().unwrap().clone();
                            Some(Reply::Ipv4RgateVerify(RgateReplyMsg {
                                morefollows: false,
                                prefixes,
                            }))
                        }
                    }
                };

                if let Some(reply) = reply {
                    if server.write_all(&reply.encode()).await.is_err() {
                        return;
                    }
                }
            }
        });

        client
    }
}

//
// Recording route engine.
//
#[derive(Debug, Default)]
struct TestEngine {
    max_prefix_checks: Vec<(IpAddr, AddressFamily, Safi)>,
    increments: Vec<IpNetwork>,
    decrements: Vec<IpNetwork>,
    processed: Vec<IpNetwork>,
    damp_scans: usize,
    damp_reuse: bool,
    static_updates: Vec<(IpNetwork, AddressFamily, Safi)>,
    static_withdraws: Vec<(IpNetwork, AddressFamily, Safi)>,
}

impl RouteEngine for TestEngine {
    fn max_prefix_overflow(
        &mut self,
        peer: &bgp_nht::rib::Peer,
        af: AddressFamily,
        safi: Safi,
    ) {
        self.max_prefix_checks.push((peer.remote_addr, af, safi));
    }

    fn aggregate_increment(&mut self, prefix: &IpNetwork) {
        self.increments.push(*prefix);
    }

    fn aggregate_decrement(&mut self, prefix: &IpNetwork) {
        self.decrements.push(*prefix);
    }

    fn damp_scan(
        &mut self,
        _info: &mut RouteInfo,
        _af: AddressFamily,
        _safi: Safi,
    ) -> bool {
        self.damp_scans += 1;
        self.damp_reuse
    }

    fn process(&mut self, prefix: &IpNetwork) {
        self.processed.push(*prefix);
    }

    fn static_update(
        &mut self,
        prefix: &IpNetwork,
        af: AddressFamily,
        safi: Safi,
    ) {
        self.static_updates.push((*prefix, af, safi));
    }

    fn static_withdraw(
        &mut self,
        prefix: &IpNetwork,
        af: AddressFamily,
        safi: Safi,
    ) {
        self.static_withdraws.push((*prefix, af, safi));
    }
}

//
// Helper functions.
//

fn test_core() -> ScanCore {
    ScanCore::new(ScanCfg::default())
}

fn core_with_service(service: &Service) -> ScanCore {
    let mut core = test_core();
    core.attach_resolver(service.spawn());
    core
}

fn ibgp_route(attr: NexthopAttr) -> RouteInfo {
    RouteInfo {
        kind: RouteKind::Normal,
        peer_type: PeerType::Internal,
        peer_ttl: 255,
        attr,
        flags: RouteFlags::empty(),
        igpmetric: 0,
        damp_info: false,
    }
}

fn ebgp_route(attr: NexthopAttr) -> RouteInfo {
    RouteInfo {
        peer_type: PeerType::External,
        peer_ttl: 1,
        ..ibgp_route(attr)
    }
}

fn bgp_with_routes(
    af: AddressFamily,
    routes: Vec<(IpNetwork, RouteInfo)>,
) -> Bgp {
    let mut bgp = Bgp::default();
    for (prefix, info) in routes {
        bgp.rib
            .get_mut(af)
            .prefixes
            .entry(prefix)
            .or_default()
            .push(info);
    }
    bgp
}

// Number of nexthop lookup queries recorded so far.
fn num_lookups(service: &Service) -> usize {
    service
        .requests()
        .iter()
        .filter(|request| {
            matches!(
                request,
                Request::Ipv4NexthopLookup(_) | Request::Ipv6NexthopLookup(_)
            )
        })
        .count()
}

// Reverse-gate verification frames recorded so far.
fn rgate_frames(service: &Service) -> Vec<(bool, usize)> {
    service
        .requests()
        .iter()
        .filter_map(|request| match request {
            Request::Ipv4RgateVerify(msg) => {
                Some((msg.morefollows, msg.pairs.len()))
            }
            _ => None,
        })
        .collect()
}

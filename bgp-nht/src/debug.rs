//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::IpAddr;

use bgp_nht_utils::ip::AddressFamily;
use ipnetwork::Ipv4Network;
use tracing::{debug, debug_span};

use crate::packet::message::{Reply, Request};

// Nexthop tracking debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    ScanTimerExpiry,
    ScanStart(AddressFamily),
    ImportTimerExpiry,
    NexthopQuery(&'a IpAddr),
    RequestTx(&'a Request),
    ReplyRx(&'a Reply),
    RgateVerifySent(usize),
    RgateVerifyRecv(usize, bool),
    RgateDesync(&'a Ipv4Network),
    ResolverConnected,
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::ScanTimerExpiry | Debug::ImportTimerExpiry => {
                // Parent span(s): bgp-nht
                debug!("{}", self);
            }
            Debug::ScanStart(af) => {
                // Parent span(s): bgp-nht
                debug!(%af, "{}", self);
            }
            Debug::NexthopQuery(addr) => {
                // Parent span(s): bgp-nht
                debug!(%addr, "{}", self);
            }
            Debug::RequestTx(msg) => {
                // Parent span(s): bgp-nht
                debug_span!("resolver").in_scope(|| {
                    debug_span!("output").in_scope(|| {
                        let data = serde_json::to_string(&msg).unwrap();
                        debug!(%data, "{}", self);
                    })
                });
            }
            Debug::ReplyRx(msg) => {
                // Parent span(s): bgp-nht
                debug_span!("resolver").in_scope(|| {
                    debug_span!("input").in_scope(|| {
                        let data = serde_json::to_string(&msg).unwrap();
                        debug!(%data, "{}", self);
                    })
                });
            }
            Debug::RgateVerifySent(count) => {
                // Parent span(s): bgp-nht
                debug!(%count, "{}", self);
            }
            Debug::RgateVerifyRecv(count, last) => {
                // Parent span(s): bgp-nht
                debug!(%count, %last, "{}", self);
            }
            Debug::RgateDesync(prefix) => {
                // Parent span(s): bgp-nht
                debug!(%prefix, "{}", self);
            }
            Debug::ResolverConnected => {
                // Parent span(s): bgp-nht
                debug!("{}", self);
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::ScanTimerExpiry => {
                write!(f, "performing general scanning")
            }
            Debug::ScanStart(..) => {
                write!(f, "scanning unicast routing tables")
            }
            Debug::ImportTimerExpiry => {
                write!(f, "import timer expired")
            }
            Debug::NexthopQuery(..) => {
                write!(f, "nexthop lookup")
            }
            Debug::RequestTx(..) | Debug::ReplyRx(..) => {
                write!(f, "message")
            }
            Debug::RgateVerifySent(..) => {
                write!(f, "sent nexthops to verify")
            }
            Debug::RgateVerifyRecv(..) => {
                write!(f, "received desynchronized prefixes")
            }
            Debug::RgateDesync(..) => {
                write!(f, "reverse gate out of sync")
            }
            Debug::ResolverConnected => {
                write!(f, "connected to the routing service")
            }
        }
    }
}

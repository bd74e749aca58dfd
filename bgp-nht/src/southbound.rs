//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use ipnetwork::Ipv4Network;
use prefix_trie::PrefixMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use crate::cache::NexthopCacheEntry;
use crate::debug::Debug;
use crate::error::{Error, IoError};
use crate::packet::consts::RGATE_PAIRS_PER_MSG;
use crate::packet::message::{
    Ipv4ImportLookupMsg, Ipv4NexthopLookupMsg, Ipv6NexthopLookupMsg,
    RgatePair, RgateVerifyMsg, Reply, Request,
};

// Default path to the routing service's Unix socket.
pub const ZSERV_PATH: &str = "/var/run/zserv.api";

// Outcome of an import lookup.
//
// The caller's handling differs between a connection that was already down
// (forced valid with metric zero), a send failure (previous state kept) and
// a reply that failed to parse (inactive, previous state kept).
#[derive(Debug)]
pub(crate) enum ImportAnswer {
    Unavailable,
    SendFailed,
    NoAnswer,
    Resolved {
        metric: u32,
        nexthop: Option<Ipv4Addr>,
    },
    Unresolved {
        metric: u32,
    },
}

// Request/reply client for the routing service's nexthop resolution
// queries.
//
// The connection is strict request/reply: at most one request is
// outstanding, and every reply is read in full (two reads: the length
// prefix, then the rest of the frame) before the next request is sent. Any
// I/O failure drops the stream back to the closed sentinel; queries issued
// while closed observe "no answer".
#[derive(Debug, Default)]
pub struct LookupClient {
    stream: Option<UnixStream>,
}

// ===== impl LookupClient =====

impl LookupClient {
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    // Takes ownership of a freshly connected stream.
    pub(crate) fn attach(&mut self, stream: UnixStream) {
        Debug::ResolverConnected.log();
        self.stream = Some(stream);
    }

    fn close(&mut self) {
        self.stream = None;
    }

    // Writes the whole encoded request, closing the connection on failure.
    async fn send(&mut self, request: &Request) -> bool {
        let Some(stream) = &mut self.stream else {
            return false;
        };

        Debug::RequestTx(request).log();
        let buf = request.encode();
        if let Err(error) = stream.write_all(&buf).await {
            IoError::UnixSendError(error).log();
            self.close();
            return false;
        }
        true
    }

    // Reads one reply frame: the two length octets first, then the
    // remainder. A frame that fails to parse is discarded.
    async fn recv(&mut self) -> Option<Reply> {
        let Some(stream) = &mut self.stream else {
            return None;
        };

        let mut data = vec![0; 2];
        if let Err(error) = stream.read_exact(&mut data).await {
            IoError::UnixRecvError(error).log();
            self.close();
            return None;
        }

        let length = u16::from_be_bytes([data[0], data[1]]) as usize;
        if length > 2 {
            data.resize(length, 0);
            if let Err(error) = stream.read_exact(&mut data[2..]).await {
                IoError::UnixRecvError(error).log();
                self.close();
                return None;
            }
        }

        match Reply::decode(&data) {
            Ok(reply) => {
                Debug::ReplyRx(&reply).log();
                Some(reply)
            }
            Err(error) => {
                Error::ReplyDecodeError(error).log();
                None
            }
        }
    }

    // Resolves a BGP nexthop address. Returns None when the routing service
    // reports no nexthops or gives no answer.
    pub(crate) async fn query(
        &mut self,
        addr: IpAddr,
    ) -> Option<NexthopCacheEntry> {
        if !self.is_connected() {
            return None;
        }

        Debug::NexthopQuery(&addr).log();
        let request = match addr {
            IpAddr::V4(addr) => {
                Request::Ipv4NexthopLookup(Ipv4NexthopLookupMsg { addr })
            }
            IpAddr::V6(addr) => {
                Request::Ipv6NexthopLookup(Ipv6NexthopLookupMsg { addr })
            }
        };
        if !self.send(&request).await {
            return None;
        }

        let reply = self.recv().await?;
        let reply = match (addr, reply) {
            (IpAddr::V4(_), Reply::Ipv4NexthopLookup(msg)) => msg,
            (IpAddr::V6(_), Reply::Ipv6NexthopLookup(msg)) => msg,
            (_, reply) => {
                Error::ReplyUnexpected(reply.command() as u16).log();
                return None;
            }
        };

        if reply.nexthops.is_empty() {
            return None;
        }
        Some(NexthopCacheEntry::from_reply(reply))
    }

    // Checks whether a statically configured prefix is present in the IGP.
    pub(crate) async fn import_check(
        &mut self,
        prefix: Ipv4Network,
    ) -> ImportAnswer {
        if !self.is_connected() {
            return ImportAnswer::Unavailable;
        }

        let request = Request::Ipv4ImportLookup(Ipv4ImportLookupMsg { prefix });
        if !self.send(&request).await {
            return ImportAnswer::SendFailed;
        }

        let Some(reply) = self.recv().await else {
            return ImportAnswer::NoAnswer;
        };
        let msg = match reply {
            Reply::Ipv4ImportLookup(msg) => msg,
            reply => {
                Error::ReplyUnexpected(reply.command() as u16).log();
                return ImportAnswer::NoAnswer;
            }
        };

        if msg.nexthops.is_empty() {
            ImportAnswer::Unresolved { metric: msg.metric }
        } else {
            let nexthop =
                msg.nexthops.first().and_then(|nh| nh.as_ipv4()).copied();
            ImportAnswer::Resolved {
                metric: msg.metric,
                nexthop,
            }
        }
    }

    // Submits the previous generation's resolved IPv4 nexthops for
    // reverse-gate verification and collects the reported desynchronized
    // prefixes into the scratch table.
    pub(crate) async fn verify_ipv4_rgates(
        &mut self,
        table: &PrefixMap<Ipv4Network, NexthopCacheEntry>,
        desync: &mut PrefixMap<Ipv4Network, ()>,
    ) {
        if !self.is_connected() {
            return;
        }

        // Pair each cached BGP nexthop with its first IPv4 IGP nexthop.
        let pairs = table
            .iter()
            .filter(|(_, bnc)| bnc.valid)
            .filter_map(|(prefix, bnc)| {
                bnc.nexthops
                    .iter()
                    .find_map(|nh| nh.as_ipv4())
                    .map(|rgate| RgatePair {
                        nexthop: prefix.ip(),
                        rgate: *rgate,
                    })
            })
            .collect::<Vec<_>>();

        // Transmit the pairs, marking every frame but the last.
        let num_frames = pairs.len().div_ceil(RGATE_PAIRS_PER_MSG).max(1);
        let mut chunks = pairs.chunks(RGATE_PAIRS_PER_MSG);
        for index in 0..num_frames {
            let pairs = chunks.next().unwrap_or_default().to_vec();
            let morefollows = index + 1 < num_frames;
            Debug::RgateVerifySent(pairs.len()).log();
            let msg = RgateVerifyMsg { morefollows, pairs };
            if !self.send(&Request::Ipv4RgateVerify(msg)).await {
                return;
            }
        }

        // Collect the desynchronized prefixes until the last frame.
        loop {
            let Some(reply) = self.recv().await else {
                return;
            };
            let msg = match reply {
                Reply::Ipv4RgateVerify(msg) => msg,
                reply => {
                    Error::ReplyUnexpected(reply.command() as u16).log();
                    return;
                }
            };

            Debug::RgateVerifyRecv(msg.prefixes.len(), !msg.morefollows)
                .log();
            for prefix in msg.prefixes {
                if desync.insert(prefix, ()).is_some() {
                    Error::DuplicateDesyncPrefix(prefix).log();
                }
            }
            if !msg.morefollows {
                return;
            }
        }
    }
}

// ===== global functions =====

// Connects to the routing service's Unix socket.
pub(crate) async fn connect(path: &Path) -> Result<UnixStream, Error> {
    let stream = UnixStream::connect(path)
        .await
        .map_err(IoError::UnixConnectError)?;
    Ok(stream)
}

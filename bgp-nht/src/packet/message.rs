//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bgp_nht_utils::bytes::{BytesExt, BytesMutExt, TLS_BUF};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use enum_as_inner::EnumAsInner;
use ipnetwork::Ipv4Network;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::packet::consts::{
    Command, NexthopType, ZSERV_HEADER_MARKER, ZSERV_VERSION,
};
use crate::packet::error::{DecodeError, DecodeResult};

//
// Routing service frame.
//
// Encoding format (frame header):
//
// 0                   1                   2                   3
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |            Length             |    Marker     |    Version    |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |            Command            |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// `Length` covers the whole frame, the two length octets included.
//
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(EnumAsInner)]
#[derive(Deserialize, Serialize)]
pub enum Request {
    Ipv4NexthopLookup(Ipv4NexthopLookupMsg),
    Ipv6NexthopLookup(Ipv6NexthopLookupMsg),
    Ipv4ImportLookup(Ipv4ImportLookupMsg),
    Ipv4RgateVerify(RgateVerifyMsg),
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(EnumAsInner)]
#[derive(Deserialize, Serialize)]
pub enum Reply {
    Ipv4NexthopLookup(LookupReplyMsg),
    Ipv6NexthopLookup(LookupReplyMsg),
    Ipv4ImportLookup(LookupReplyMsg),
    Ipv4RgateVerify(RgateReplyMsg),
}

//
// Nexthop lookup request.
//
// Encoding format (request body): the queried address, 4 or 16 octets.
//
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv4NexthopLookupMsg {
    pub addr: Ipv4Addr,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv6NexthopLookupMsg {
    pub addr: Ipv6Addr,
}

//
// IPv4 import lookup request.
//
// Encoding format (request body):
//
// 0                   1                   2                   3
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// | Prefix Length |                    Address                    |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |               |
// +-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv4ImportLookupMsg {
    pub prefix: Ipv4Network,
}

//
// Nexthop lookup reply, shared by both lookup commands and the import
// lookup.
//
// Encoding format (reply body):
//
// +-----------------------------+
// | Address (4 or 16 octets)    |
// +-----------------------------+
// | Metric (4 octets)           |
// +-----------------------------+
// | Nexthop count (1 octet)     |
// +-----------------------------+
// | Nexthops (variable)         |
// ~                             ~
// +-----------------------------+
//
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct LookupReplyMsg {
    pub addr: IpAddr,
    pub metric: u32,
    pub nexthops: Vec<Nexthop>,
}

//
// Reverse-gate verification request.
//
// Encoding format (request body):
//
// 0                   1                   2
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |  More Follows |           Pair Count          |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// followed by `Pair Count` (BGP nexthop, cached reverse gate) address pairs
// of 4 octets each.
//
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RgateVerifyMsg {
    pub morefollows: bool,
    pub pairs: Vec<RgatePair>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RgatePair {
    pub nexthop: Ipv4Addr,
    pub rgate: Ipv4Addr,
}

//
// Reverse-gate verification reply.
//
// Encoding format (reply body): a morefollows octet and a prefix count,
// followed by `count` (address:4, prefixlen:1) IPv4 prefixes whose cached
// reverse gate no longer matches the routing service's view.
//
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RgateReplyMsg {
    pub morefollows: bool,
    pub prefixes: Vec<Ipv4Network>,
}

// Resolved nexthop as reported by the routing service.
//
// Unrecognized types carry no body; two of them compare equal whenever their
// type codes match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(EnumAsInner)]
#[derive(Deserialize, Serialize)]
pub enum Nexthop {
    Ipv4 { gate: Ipv4Addr },
    Ifindex { ifindex: u32 },
    IfName { ifindex: u32 },
    Ipv6 { gate: Ipv6Addr },
    Ipv6Ifindex { gate: Ipv6Addr, ifindex: u32 },
    Ipv6IfName { gate: Ipv6Addr, ifindex: u32 },
    Unknown { nh_type: u8 },
}

// ===== impl Request =====

impl Request {
    // Encodes the request into a bytes buffer.
    pub fn encode(&self) -> Bytes {
        TLS_BUF.with(|buf| {
            let mut buf = buf.borrow_mut();
            buf.clear();

            encode_header(&mut buf, self.command());
            match self {
                Request::Ipv4NexthopLookup(msg) => msg.encode(&mut buf),
                Request::Ipv6NexthopLookup(msg) => msg.encode(&mut buf),
                Request::Ipv4ImportLookup(msg) => msg.encode(&mut buf),
                Request::Ipv4RgateVerify(msg) => msg.encode(&mut buf),
            }
            encode_frame_length(&mut buf);

            buf.clone().freeze()
        })
    }

    // Decodes a full frame into a request.
    pub fn decode(data: &[u8]) -> DecodeResult<Self> {
        let mut buf = Bytes::copy_from_slice(data);

        let command = decode_header(&mut buf, data.len())?;
        match command {
            Command::Ipv4NexthopLookup => {
                let msg = Ipv4NexthopLookupMsg::decode(&mut buf)?;
                Ok(Request::Ipv4NexthopLookup(msg))
            }
            Command::Ipv6NexthopLookup => {
                let msg = Ipv6NexthopLookupMsg::decode(&mut buf)?;
                Ok(Request::Ipv6NexthopLookup(msg))
            }
            Command::Ipv4ImportLookup => {
                let msg = Ipv4ImportLookupMsg::decode(&mut buf)?;
                Ok(Request::Ipv4ImportLookup(msg))
            }
            Command::Ipv4RgateVerify => {
                let msg = RgateVerifyMsg::decode(&mut buf)?;
                Ok(Request::Ipv4RgateVerify(msg))
            }
        }
    }

    pub fn command(&self) -> Command {
        match self {
            Request::Ipv4NexthopLookup(_) => Command::Ipv4NexthopLookup,
            Request::Ipv6NexthopLookup(_) => Command::Ipv6NexthopLookup,
            Request::Ipv4ImportLookup(_) => Command::Ipv4ImportLookup,
            Request::Ipv4RgateVerify(_) => Command::Ipv4RgateVerify,
        }
    }
}

// ===== impl Reply =====

impl Reply {
    // Encodes the reply into a bytes buffer.
    pub fn encode(&self) -> Bytes {
        TLS_BUF.with(|buf| {
            let mut buf = buf.borrow_mut();
            buf.clear();

            encode_header(&mut buf, self.command());
            match self {
                Reply::Ipv4NexthopLookup(msg)
                | Reply::Ipv6NexthopLookup(msg)
                | Reply::Ipv4ImportLookup(msg) => msg.encode(&mut buf),
                Reply::Ipv4RgateVerify(msg) => msg.encode(&mut buf),
            }
            encode_frame_length(&mut buf);

            buf.clone().freeze()
        })
    }

    // Decodes a full frame into a reply.
    pub fn decode(data: &[u8]) -> DecodeResult<Self> {
        let mut buf = Bytes::copy_from_slice(data);

        let command = decode_header(&mut buf, data.len())?;
        match command {
            Command::Ipv4NexthopLookup => {
                let msg = LookupReplyMsg::decode_ipv4(&mut buf)?;
                Ok(Reply::Ipv4NexthopLookup(msg))
            }
            Command::Ipv6NexthopLookup => {
                let msg = LookupReplyMsg::decode_ipv6(&mut buf)?;
                Ok(Reply::Ipv6NexthopLookup(msg))
            }
            Command::Ipv4ImportLookup => {
                let msg = LookupReplyMsg::decode_ipv4(&mut buf)?;
                Ok(Reply::Ipv4ImportLookup(msg))
            }
            Command::Ipv4RgateVerify => {
                let msg = RgateReplyMsg::decode(&mut buf)?;
                Ok(Reply::Ipv4RgateVerify(msg))
            }
        }
    }

    pub fn command(&self) -> Command {
        match self {
            Reply::Ipv4NexthopLookup(_) => Command::Ipv4NexthopLookup,
            Reply::Ipv6NexthopLookup(_) => Command::Ipv6NexthopLookup,
            Reply::Ipv4ImportLookup(_) => Command::Ipv4ImportLookup,
            Reply::Ipv4RgateVerify(_) => Command::Ipv4RgateVerify,
        }
    }
}

// ===== impl Ipv4NexthopLookupMsg =====

impl Ipv4NexthopLookupMsg {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_ipv4(&self.addr);
    }

    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let addr = buf.try_get_ipv4()?;
        Ok(Ipv4NexthopLookupMsg { addr })
    }
}

// ===== impl Ipv6NexthopLookupMsg =====

impl Ipv6NexthopLookupMsg {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_ipv6(&self.addr);
    }

    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let addr = buf.try_get_ipv6()?;
        Ok(Ipv6NexthopLookupMsg { addr })
    }
}

// ===== impl Ipv4ImportLookupMsg =====

impl Ipv4ImportLookupMsg {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.prefix.prefix());
        buf.put_ipv4(&self.prefix.ip());
    }

    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let prefixlen = buf.try_get_u8()?;
        let addr = buf.try_get_ipv4()?;
        let prefix = Ipv4Network::new(addr, prefixlen)
            .map_err(|_| DecodeError::InvalidPrefixLength(prefixlen))?;
        Ok(Ipv4ImportLookupMsg { prefix })
    }
}

// ===== impl LookupReplyMsg =====

impl LookupReplyMsg {
    fn encode(&self, buf: &mut BytesMut) {
        match &self.addr {
            IpAddr::V4(addr) => buf.put_ipv4(addr),
            IpAddr::V6(addr) => buf.put_ipv6(addr),
        }
        buf.put_u32(self.metric);
        buf.put_u8(self.nexthops.len() as u8);
        for nexthop in &self.nexthops {
            nexthop.encode(buf);
        }
    }

    fn decode_ipv4(buf: &mut Bytes) -> DecodeResult<Self> {
        let addr = buf.try_get_ipv4()?;
        Self::decode_body(buf, addr.into())
    }

    fn decode_ipv6(buf: &mut Bytes) -> DecodeResult<Self> {
        let addr = buf.try_get_ipv6()?;
        Self::decode_body(buf, addr.into())
    }

    fn decode_body(buf: &mut Bytes, addr: IpAddr) -> DecodeResult<Self> {
        let metric = buf.try_get_u32()?;
        let nexthop_num = buf.try_get_u8()?;

        let mut nexthops = Vec::with_capacity(nexthop_num as usize);
        for _ in 0..nexthop_num {
            nexthops.push(Nexthop::decode(buf)?);
        }

        Ok(LookupReplyMsg {
            addr,
            metric,
            nexthops,
        })
    }
}

// ===== impl RgateVerifyMsg =====

impl RgateVerifyMsg {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.morefollows as u8);
        buf.put_u16(self.pairs.len() as u16);
        for pair in &self.pairs {
            buf.put_ipv4(&pair.nexthop);
            buf.put_ipv4(&pair.rgate);
        }
    }

    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let morefollows = buf.try_get_u8()? != 0;
        let num = buf.try_get_u16()?;

        let mut pairs = Vec::with_capacity(num as usize);
        for _ in 0..num {
            let nexthop = buf.try_get_ipv4()?;
            let rgate = buf.try_get_ipv4()?;
            pairs.push(RgatePair { nexthop, rgate });
        }

        Ok(RgateVerifyMsg { morefollows, pairs })
    }
}

// ===== impl RgateReplyMsg =====

impl RgateReplyMsg {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.morefollows as u8);
        buf.put_u16(self.prefixes.len() as u16);
        for prefix in &self.prefixes {
            buf.put_ipv4(&prefix.ip());
            buf.put_u8(prefix.prefix());
        }
    }

    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let morefollows = buf.try_get_u8()? != 0;
        let num = buf.try_get_u16()?;

        let mut prefixes = Vec::with_capacity(num as usize);
        for _ in 0..num {
            let addr = buf.try_get_ipv4()?;
            let prefixlen = buf.try_get_u8()?;
            let prefix = Ipv4Network::new(addr, prefixlen)
                .map_err(|_| DecodeError::InvalidPrefixLength(prefixlen))?;
            prefixes.push(prefix);
        }

        Ok(RgateReplyMsg {
            morefollows,
            prefixes,
        })
    }
}

// ===== impl Nexthop =====

impl Nexthop {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.nh_type());
        match self {
            Nexthop::Ipv4 { gate } => {
                buf.put_ipv4(gate);
            }
            Nexthop::Ifindex { ifindex } | Nexthop::IfName { ifindex } => {
                buf.put_u32(*ifindex);
            }
            Nexthop::Ipv6 { gate } => {
                buf.put_ipv6(gate);
            }
            Nexthop::Ipv6Ifindex { gate, ifindex }
            | Nexthop::Ipv6IfName { gate, ifindex } => {
                buf.put_ipv6(gate);
                buf.put_u32(*ifindex);
            }
            Nexthop::Unknown { .. } => {
                // No body.
            }
        }
    }

    fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        let nh_type = buf.try_get_u8()?;
        let nexthop = match NexthopType::from_u8(nh_type) {
            Some(NexthopType::Ipv4) => {
                let gate = buf.try_get_ipv4()?;
                Nexthop::Ipv4 { gate }
            }
            Some(NexthopType::Ifindex) => {
                let ifindex = buf.try_get_u32()?;
                Nexthop::Ifindex { ifindex }
            }
            Some(NexthopType::IfName) => {
                let ifindex = buf.try_get_u32()?;
                Nexthop::IfName { ifindex }
            }
            Some(NexthopType::Ipv6) => {
                let gate = buf.try_get_ipv6()?;
                Nexthop::Ipv6 { gate }
            }
            Some(NexthopType::Ipv6Ifindex) => {
                let gate = buf.try_get_ipv6()?;
                let ifindex = buf.try_get_u32()?;
                Nexthop::Ipv6Ifindex { gate, ifindex }
            }
            Some(NexthopType::Ipv6IfName) => {
                let gate = buf.try_get_ipv6()?;
                let ifindex = buf.try_get_u32()?;
                Nexthop::Ipv6IfName { gate, ifindex }
            }
            // Types without a body.
            _ => Nexthop::Unknown { nh_type },
        };
        Ok(nexthop)
    }

    pub(crate) fn nh_type(&self) -> u8 {
        match self {
            Nexthop::Ipv4 { .. } => NexthopType::Ipv4 as u8,
            Nexthop::Ifindex { .. } => NexthopType::Ifindex as u8,
            Nexthop::IfName { .. } => NexthopType::IfName as u8,
            Nexthop::Ipv6 { .. } => NexthopType::Ipv6 as u8,
            Nexthop::Ipv6Ifindex { .. } => NexthopType::Ipv6Ifindex as u8,
            Nexthop::Ipv6IfName { .. } => NexthopType::Ipv6IfName as u8,
            Nexthop::Unknown { nh_type } => *nh_type,
        }
    }
}

// ===== helper functions =====

const FRAME_LEN_POS: std::ops::Range<usize> = 0..2;

fn encode_header(buf: &mut BytesMut, command: Command) {
    // The length field will be initialized later.
    buf.put_u16(0);
    buf.put_u8(ZSERV_HEADER_MARKER);
    buf.put_u8(ZSERV_VERSION);
    buf.put_u16(command as u16);
}

fn encode_frame_length(buf: &mut BytesMut) {
    let frame_len = buf.len() as u16;
    buf[FRAME_LEN_POS].copy_from_slice(&frame_len.to_be_bytes());
}

fn decode_header(buf: &mut Bytes, data_len: usize) -> DecodeResult<Command> {
    let length = buf.try_get_u16()?;
    if (length as usize) != data_len {
        return Err(DecodeError::IncompleteFrame(length));
    }

    let marker = buf.try_get_u8()?;
    let version = buf.try_get_u8()?;
    if marker != ZSERV_HEADER_MARKER || version != ZSERV_VERSION {
        return Err(DecodeError::VersionMismatch { marker, version });
    }

    let command = buf.try_get_u16()?;
    Command::from_u16(command).ok_or(DecodeError::UnknownCommand(command))
}

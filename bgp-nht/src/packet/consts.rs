//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

// Fixed values carried in every frame header.
pub const ZSERV_HEADER_MARKER: u8 = 255;
pub const ZSERV_VERSION: u8 = 2;

// Total size of the frame header (length + marker + version + command).
pub const ZSERV_HEADER_SIZE: u16 = 6;

// Upper bound on the size of a single frame.
pub const ZSERV_MAX_PACKET_SIZE: u16 = 4096;

// Number of (nexthop, rgate) address pairs that fit into one reverse-gate
// verification frame after the header and the morefollows/count fields.
pub const RGATE_PAIRS_PER_MSG: usize =
    (ZSERV_MAX_PACKET_SIZE as usize - ZSERV_HEADER_SIZE as usize - 1 - 2) / 8;

// Routing service commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum Command {
    Ipv4NexthopLookup = 15,
    Ipv6NexthopLookup = 16,
    Ipv4ImportLookup = 17,
    Ipv4RgateVerify = 24,
}

// Nexthop types used in lookup replies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum NexthopType {
    Ifindex = 1,
    IfName = 2,
    Ipv4 = 3,
    Ipv4Ifindex = 4,
    Ipv4IfName = 5,
    Ipv6 = 6,
    Ipv6Ifindex = 7,
    Ipv6IfName = 8,
    Blackhole = 9,
}

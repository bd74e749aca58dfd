//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::LazyLock as Lazy;

use bgp_nht::packet::message::{
    LookupReplyMsg, Nexthop, Reply, RgateReplyMsg,
};
use const_addrs::{ip4, ip6, net4};

use super::{test_decode_reply, test_encode_reply};

static IPV4_NEXTHOP_LOOKUP1: Lazy<(Vec<u8>, Reply)> = Lazy::new(|| {
    (
        vec![
            0x00, 0x14, 0xff, 0x02, 0x00, 0x0f, 0x0a, 0x00, 0x00, 0x01,
            0x00, 0x00, 0x00, 0x05, 0x01, 0x03, 0x0a, 0x00, 0x00, 0xfe,
        ],
        Reply::Ipv4NexthopLookup(LookupReplyMsg {
            addr: ip4!("10.0.0.1").into(),
            metric: 5,
            nexthops: vec![Nexthop::Ipv4 {
                gate: ip4!("10.0.0.254"),
            }],
        }),
    )
});

static IPV4_NEXTHOP_LOOKUP_UNRESOLVED1: Lazy<(Vec<u8>, Reply)> =
    Lazy::new(|| {
        (
            vec![
                0x00, 0x0f, 0xff, 0x02, 0x00, 0x0f, 0x0a, 0x00, 0x00, 0x09,
                0x00, 0x00, 0x00, 0x00, 0x00,
            ],
            Reply::Ipv4NexthopLookup(LookupReplyMsg {
                addr: ip4!("10.0.0.9").into(),
                metric: 0,
                nexthops: vec![],
            }),
        )
    });

static IPV4_NEXTHOP_LOOKUP_IFINDEX1: Lazy<(Vec<u8>, Reply)> =
    Lazy::new(|| {
        (
            vec![
                0x00, 0x14, 0xff, 0x02, 0x00, 0x0f, 0x0a, 0x00, 0x00, 0x01,
                0x00, 0x00, 0x00, 0x07, 0x01, 0x01, 0x00, 0x00, 0x00, 0x03,
            ],
            Reply::Ipv4NexthopLookup(LookupReplyMsg {
                addr: ip4!("10.0.0.1").into(),
                metric: 7,
                nexthops: vec![Nexthop::Ifindex { ifindex: 3 }],
            }),
        )
    });

static IPV4_NEXTHOP_LOOKUP_UNKNOWN1: Lazy<(Vec<u8>, Reply)> =
    Lazy::new(|| {
        (
            vec![
                0x00, 0x10, 0xff, 0x02, 0x00, 0x0f, 0x0a, 0x00, 0x00, 0x01,
                0x00, 0x00, 0x00, 0x00, 0x01, 0x09,
            ],
            Reply::Ipv4NexthopLookup(LookupReplyMsg {
                addr: ip4!("10.0.0.1").into(),
                metric: 0,
                nexthops: vec![Nexthop::Unknown { nh_type: 9 }],
            }),
        )
    });

static IPV6_NEXTHOP_LOOKUP1: Lazy<(Vec<u8>, Reply)> = Lazy::new(|| {
    (
        vec![
            0x00, 0x30, 0xff, 0x02, 0x00, 0x10, 0x20, 0x01, 0x0d, 0xb8,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00, 0x00, 0x0a, 0x01, 0x07, 0xfe, 0x80,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02,
        ],
        Reply::Ipv6NexthopLookup(LookupReplyMsg {
            addr: ip6!("2001:db8::1").into(),
            metric: 10,
            nexthops: vec![Nexthop::Ipv6Ifindex {
                gate: ip6!("fe80::1"),
                ifindex: 2,
            }],
        }),
    )
});

static IPV4_IMPORT_LOOKUP1: Lazy<(Vec<u8>, Reply)> = Lazy::new(|| {
    (
        vec![
            0x00, 0x14, 0xff, 0x02, 0x00, 0x11, 0x0a, 0x01, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x02, 0x01, 0x03, 0x0a, 0x00, 0x00, 0xfe,
        ],
        Reply::Ipv4ImportLookup(LookupReplyMsg {
            addr: ip4!("10.1.0.0").into(),
            metric: 2,
            nexthops: vec![Nexthop::Ipv4 {
                gate: ip4!("10.0.0.254"),
            }],
        }),
    )
});

static RGATE_VERIFY1: Lazy<(Vec<u8>, Reply)> = Lazy::new(|| {
    (
        vec![
            0x00, 0x13, 0xff, 0x02, 0x00, 0x18, 0x00, 0x00, 0x02, 0x0a,
            0x01, 0x00, 0x00, 0x10, 0xac, 0x10, 0x00, 0x00, 0x0c,
        ],
        Reply::Ipv4RgateVerify(RgateReplyMsg {
            morefollows: false,
            prefixes: vec![net4!("10.1.0.0/16"), net4!("172.16.0.0/12")],
        }),
    )
});

#[test]
fn test_encode_ipv4_nexthop_lookup1() {
    let (ref bytes, ref msg) = *IPV4_NEXTHOP_LOOKUP1;
    test_encode_reply(bytes, msg);
}

#[test]
fn test_decode_ipv4_nexthop_lookup1() {
    let (ref bytes, ref msg) = *IPV4_NEXTHOP_LOOKUP1;
    test_decode_reply(bytes, msg);
}

#[test]
fn test_encode_ipv4_nexthop_lookup_unresolved1() {
    let (ref bytes, ref msg) = *IPV4_NEXTHOP_LOOKUP_UNRESOLVED1;
    test_encode_reply(bytes, msg);
}

#[test]
fn test_decode_ipv4_nexthop_lookup_unresolved1() {
    let (ref bytes, ref msg) = *IPV4_NEXTHOP_LOOKUP_UNRESOLVED1;
    test_decode_reply(bytes, msg);
}

#[test]
fn test_encode_ipv4_nexthop_lookup_ifindex1() {
    let (ref bytes, ref msg) = *IPV4_NEXTHOP_LOOKUP_IFINDEX1;
    test_encode_reply(bytes, msg);
}

#[test]
fn test_decode_ipv4_nexthop_lookup_ifindex1() {
    let (ref bytes, ref msg) = *IPV4_NEXTHOP_LOOKUP_IFINDEX1;
    test_decode_reply(bytes, msg);
}

#[test]
fn test_encode_ipv4_nexthop_lookup_unknown1() {
    let (ref bytes, ref msg) = *IPV4_NEXTHOP_LOOKUP_UNKNOWN1;
    test_encode_reply(bytes, msg);
}

#[test]
fn test_decode_ipv4_nexthop_lookup_unknown1() {
    let (ref bytes, ref msg) = *IPV4_NEXTHOP_LOOKUP_UNKNOWN1;
    test_decode_reply(bytes, msg);
}

#[test]
fn test_encode_ipv6_nexthop_lookup1() {
    let (ref bytes, ref msg) = *IPV6_NEXTHOP_LOOKUP1;
    test_encode_reply(bytes, msg);
}

#[test]
fn test_decode_ipv6_nexthop_lookup1() {
    let (ref bytes, ref msg) = *IPV6_NEXTHOP_LOOKUP1;
    test_decode_reply(bytes, msg);
}

#[test]
fn test_encode_ipv4_import_lookup1() {
    let (ref bytes, ref msg) = *IPV4_IMPORT_LOOKUP1;
    test_encode_reply(bytes, msg);
}

#[test]
fn test_decode_ipv4_import_lookup1() {
    let (ref bytes, ref msg) = *IPV4_IMPORT_LOOKUP1;
    test_decode_reply(bytes, msg);
}

#[test]
fn test_encode_rgate_verify1() {
    let (ref bytes, ref msg) = *RGATE_VERIFY1;
    test_encode_reply(bytes, msg);
}

#[test]
fn test_decode_rgate_verify1() {
    let (ref bytes, ref msg) = *RGATE_VERIFY1;
    test_decode_reply(bytes, msg);
}

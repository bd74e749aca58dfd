//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::LazyLock as Lazy;

use bgp_nht::packet::message::{
    Ipv4ImportLookupMsg, Ipv4NexthopLookupMsg, Ipv6NexthopLookupMsg,
    RgatePair, RgateVerifyMsg, Request,
};
use const_addrs::{ip4, ip6, net4};

use super::{test_decode_request, test_encode_request};

static IPV4_NEXTHOP_LOOKUP1: Lazy<(Vec<u8>, Request)> = Lazy::new(|| {
    (
        vec![
            0x00, 0x0a, 0xff, 0x02, 0x00, 0x0f, 0x0a, 0x00, 0x00, 0x01,
        ],
        Request::Ipv4NexthopLookup(Ipv4NexthopLookupMsg {
            addr: ip4!("10.0.0.1"),
        }),
    )
});

static IPV6_NEXTHOP_LOOKUP1: Lazy<(Vec<u8>, Request)> = Lazy::new(|| {
    (
        vec![
            0x00, 0x16, 0xff, 0x02, 0x00, 0x10, 0x20, 0x01, 0x0d, 0xb8,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01,
        ],
        Request::Ipv6NexthopLookup(Ipv6NexthopLookupMsg {
            addr: ip6!("2001:db8::1"),
        }),
    )
});

static IPV4_IMPORT_LOOKUP1: Lazy<(Vec<u8>, Request)> = Lazy::new(|| {
    (
        vec![
            0x00, 0x0b, 0xff, 0x02, 0x00, 0x11, 0x10, 0x0a, 0x01, 0x00,
            0x00,
        ],
        Request::Ipv4ImportLookup(Ipv4ImportLookupMsg {
            prefix: net4!("10.1.0.0/16"),
        }),
    )
});

static RGATE_VERIFY1: Lazy<(Vec<u8>, Request)> = Lazy::new(|| {
    (
        vec![
            0x00, 0x19, 0xff, 0x02, 0x00, 0x18, 0x01, 0x00, 0x02, 0x0a,
            0x00, 0x00, 0x01, 0xc0, 0xa8, 0x01, 0x01, 0x0a, 0x00, 0x00,
            0x02, 0xc0, 0xa8, 0x01, 0x02,
        ],
        Request::Ipv4RgateVerify(RgateVerifyMsg {
            morefollows: true,
            pairs: vec![
                RgatePair {
                    nexthop: ip4!("10.0.0.1"),
                    rgate: ip4!("192.168.1.1"),
                },
                RgatePair {
                    nexthop: ip4!("10.0.0.2"),
                    rgate: ip4!("192.168.1.2"),
                },
            ],
        }),
    )
});

static RGATE_VERIFY_LAST1: Lazy<(Vec<u8>, Request)> = Lazy::new(|| {
    (
        vec![0x00, 0x09, 0xff, 0x02, 0x00, 0x18, 0x00, 0x00, 0x00],
        Request::Ipv4RgateVerify(RgateVerifyMsg {
            morefollows: false,
            pairs: vec![],
        }),
    )
});

#[test]
fn test_encode_ipv4_nexthop_lookup1() {
    let (ref bytes, ref msg) = *IPV4_NEXTHOP_LOOKUP1;
    test_encode_request(bytes, msg);
}

#[test]
fn test_decode_ipv4_nexthop_lookup1() {
    let (ref bytes, ref msg) = *IPV4_NEXTHOP_LOOKUP1;
    test_decode_request(bytes, msg);
}

#[test]
fn test_encode_ipv6_nexthop_lookup1() {
    let (ref bytes, ref msg) = *IPV6_NEXTHOP_LOOKUP1;
    test_encode_request(bytes, msg);
}

#[test]
fn test_decode_ipv6_nexthop_lookup1() {
    let (ref bytes, ref msg) = *IPV6_NEXTHOP_LOOKUP1;
    test_decode_request(bytes, msg);
}

#[test]
fn test_encode_ipv4_import_lookup1() {
    let (ref bytes, ref msg) = *IPV4_IMPORT_LOOKUP1;
    test_encode_request(bytes, msg);
}

#[test]
fn test_decode_ipv4_import_lookup1() {
    let (ref bytes, ref msg) = *IPV4_IMPORT_LOOKUP1;
    test_decode_request(bytes, msg);
}

#[test]
fn test_encode_rgate_verify1() {
    let (ref bytes, ref msg) = *RGATE_VERIFY1;
    test_encode_request(bytes, msg);
}

#[test]
fn test_decode_rgate_verify1() {
    let (ref bytes, ref msg) = *RGATE_VERIFY1;
    test_decode_request(bytes, msg);
}

#[test]
fn test_encode_rgate_verify_last1() {
    let (ref bytes, ref msg) = *RGATE_VERIFY_LAST1;
    test_encode_request(bytes, msg);
}

#[test]
fn test_decode_rgate_verify_last1() {
    let (ref bytes, ref msg) = *RGATE_VERIFY_LAST1;
    test_decode_request(bytes, msg);
}

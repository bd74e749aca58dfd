//
// Copyright (c) The bgp-nht Contributors
//
// SPDX-License-Identifier: MIT
//

mod reply;
mod request;

use bgp_nht::packet::message::{Reply, Request};

//
// Helper functions.
//

fn test_encode_request(bytes_expected: &[u8], msg: &Request) {
    let bytes_actual = msg.encode();
    assert_eq!(bytes_expected, bytes_actual.as_ref());
}

fn test_decode_request(bytes: &[u8], msg_expected: &Request) {
    let msg_actual = Request::decode(bytes).unwrap();
    assert_eq!(*msg_expected, msg_actual);
}

fn test_encode_reply(bytes_expected: &[u8], msg: &Reply) {
    let bytes_actual = msg.encode();
    assert_eq!(bytes_expected, bytes_actual.as_ref());
}

fn test_decode_reply(bytes: &[u8], msg_expected: &Reply) {
    let msg_actual = Reply::decode(bytes).unwrap();
    assert_eq!(*msg_expected, msg_actual);
}

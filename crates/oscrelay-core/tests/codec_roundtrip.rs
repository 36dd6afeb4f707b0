//! Encoder properties and interop with an independent OSC implementation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use oscrelay_core::protocol::osc::{decode, encode, normalize_address, OscArg, OscMessage};
use serde_json::json;

fn sample_args() -> Vec<Vec<OscArg>> {
    vec![
        vec![],
        vec![OscArg::Int(0)],
        vec![OscArg::Int(i32::MIN), OscArg::Int(i32::MAX)],
        vec![OscArg::Float(0.25), OscArg::Float(-3.5e7)],
        vec![OscArg::Str(String::new())],
        vec![OscArg::Str("abc".into()), OscArg::Str("abcd".into()), OscArg::Str("héllo".into())],
        vec![OscArg::Int(7), OscArg::Str("key".into()), OscArg::Float(1.0), OscArg::Int(-1)],
    ]
}

#[test]
fn decode_inverts_encode_and_output_is_aligned() {
    for address in ["/a", "/ab", "/abc", "/hid/move", "/x/y/z/long_name"] {
        for args in sample_args() {
            let bytes = encode(address, &args);
            assert_eq!(bytes.len() % 4, 0, "address={address} args={args:?}");
            let msg = decode(&bytes).unwrap();
            assert_eq!(msg.address, address);
            assert_eq!(msg.args, args);
        }
    }
}

#[test]
fn address_is_normalized_before_encoding() {
    assert_eq!(normalize_address("hid/move"), "/hid/move");
    assert_eq!(normalize_address("/hid/move,iif"), "/hid/move");
    assert_eq!(normalize_address(",ii"), "/");

    let msg = decode(&encode("hid/move,ii", &[OscArg::Int(1)])).unwrap();
    assert_eq!(msg.address, "/hid/move");
    assert_eq!(msg.args, vec![OscArg::Int(1)]);
}

#[test]
fn type_tags_follow_argument_variants() {
    let msg = OscMessage::new("/t", vec![1i32.into(), 2.5f32.into(), "s".into()]);
    assert_eq!(msg.type_tags(), ",ifs");
}

#[test]
fn loose_inputs_clamp_narrow_and_fall_back() {
    assert_eq!(OscArg::from_i64(i64::MAX), OscArg::Int(i32::MAX));
    assert_eq!(OscArg::from_i64(i64::MIN), OscArg::Int(i32::MIN));
    assert_eq!(OscArg::from(0.1f64), OscArg::Float(0.1f32));

    assert_eq!(OscArg::from_json(&json!(5)), OscArg::Int(5));
    assert_eq!(OscArg::from_json(&json!(1u64 << 40)), OscArg::Int(i32::MAX));
    assert_eq!(OscArg::from_json(&json!(u64::MAX)), OscArg::Int(i32::MAX));
    assert_eq!(OscArg::from_json(&json!(0.5)), OscArg::Float(0.5));
    assert_eq!(OscArg::from_json(&json!("x")), OscArg::Str("x".into()));
    assert_eq!(OscArg::from_json(&json!(true)), OscArg::Float(0.0));
    assert_eq!(OscArg::from_json(&json!(null)), OscArg::Float(0.0));
    assert_eq!(OscArg::from_json(&json!([1, 2])), OscArg::Float(0.0));

    assert_eq!(OscArg::parse_loose("42"), OscArg::Int(42));
    assert_eq!(OscArg::parse_loose("99999999999"), OscArg::Int(i32::MAX));
    assert_eq!(OscArg::parse_loose("-0.5"), OscArg::Float(-0.5));
    assert_eq!(OscArg::parse_loose("inf"), OscArg::Str("inf".into()));
    assert_eq!(OscArg::parse_loose("left"), OscArg::Str("left".into()));
}

#[test]
fn interior_nul_is_cut_off() {
    let bytes = encode("/s", &[OscArg::Str("ab\0cd".into())]);
    let msg = decode(&bytes).unwrap();
    assert_eq!(msg.args, vec![OscArg::Str("ab".into())]);
}

#[test]
fn rosc_decodes_our_packets() {
    let args = vec![OscArg::Int(3), OscArg::Float(-0.75), OscArg::Str("space".into())];
    let bytes = encode("/hid/key_down", &args);

    let (rest, packet) = rosc::decoder::decode_udp(&bytes).unwrap();
    assert!(rest.is_empty());
    let rosc::OscPacket::Message(m) = packet else {
        panic!("expected message");
    };
    assert_eq!(m.addr, "/hid/key_down");
    assert_eq!(
        m.args,
        vec![
            rosc::OscType::Int(3),
            rosc::OscType::Float(-0.75),
            rosc::OscType::String("space".into()),
        ]
    );
}

#[test]
fn we_decode_rosc_packets() {
    let packet = rosc::OscPacket::Message(rosc::OscMessage {
        addr: "/hid/scroll".into(),
        args: vec![
            rosc::OscType::Int(1),
            rosc::OscType::Int(10),
            rosc::OscType::Int(20),
            rosc::OscType::Float(0.0),
            rosc::OscType::Float(-2.0),
            rosc::OscType::Float(0.0),
        ],
    });
    let bytes = rosc::encoder::encode(&packet).unwrap();
    let msg = decode(&bytes).unwrap();
    assert_eq!(msg.address, "/hid/scroll");
    assert_eq!(
        msg.args,
        vec![
            OscArg::Int(1),
            OscArg::Int(10),
            OscArg::Int(20),
            OscArg::Float(0.0),
            OscArg::Float(-2.0),
            OscArg::Float(0.0),
        ]
    );
    assert_eq!(encode(&msg.address, &msg.args).as_ref(), bytes.as_slice());
}

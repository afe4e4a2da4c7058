//! Property tests for BITS, TruthValue and address conversions.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddrV4, SocketAddrV6};

use proptest::prelude::*;
use snmp_mib::codec::{decode_bits, decode_truthvalue, encode_bits, encode_truthvalue};
use snmp_mib::error::MibError;
use snmp_mib::oid::{
    ip_port_to_oid, ip_to_oid, ip4_port_to_oid, ip4_to_oid, ip6_port_to_oid, ip6_to_oid,
    oid_to_ip, oid_to_ip_port, oid_to_ip4, oid_to_ip4_port, oid_to_ip6, oid_to_ip6_port,
};

fn ip() -> impl Strategy<Value = Option<IpAddr>> {
    prop_oneof![
        Just(None),
        any::<u32>().prop_map(|v| Some(IpAddr::V4(Ipv4Addr::from(v)))),
        any::<u128>().prop_map(|v| Some(IpAddr::V6(Ipv6Addr::from(v)))),
    ]
}

proptest! {
    #[test]
    fn truthvalue_rejects_other_integers(v in any::<i32>()) {
        prop_assume!(v != 1 && v != 2);
        prop_assert_eq!(decode_truthvalue(v), Err(MibError::WrongValue));
    }

    #[test]
    fn bits_round_trip(flags in any::<u32>(), bit_count in 0u8..=32) {
        let flags = if bit_count >= 32 { flags } else { flags & ((1u32 << bit_count) - 1) };
        let encoded = encode_bits(flags, bit_count);
        prop_assert_eq!(encoded.len(), usize::from(bit_count).div_ceil(8));
        prop_assert_eq!(decode_bits(&encoded, bit_count), Ok(flags));
    }

    #[test]
    fn bits_decode_masks_undeclared_bits(buf in prop::collection::vec(any::<u8>(), 0..4), bit_count in 0u8..32) {
        let flags = decode_bits(&buf, bit_count).unwrap();
        prop_assert_eq!(flags >> bit_count, 0);
    }

    #[test]
    fn ip4_round_trip(v in any::<u32>(), port in any::<u16>()) {
        let addr = Ipv4Addr::from(v);
        prop_assert_eq!(oid_to_ip4(ip4_to_oid(addr).arcs()).unwrap(), addr);
        let sock = SocketAddrV4::new(addr, port);
        prop_assert_eq!(oid_to_ip4_port(ip4_port_to_oid(sock).arcs()).unwrap(), sock);
    }

    #[test]
    fn ip6_round_trip(v in any::<u128>(), port in any::<u16>()) {
        let addr = Ipv6Addr::from(v);
        prop_assert_eq!(oid_to_ip6(ip6_to_oid(addr).arcs()).unwrap(), addr);
        let sock = SocketAddrV6::new(addr, port, 0, 0);
        prop_assert_eq!(oid_to_ip6_port(ip6_port_to_oid(sock).arcs()).unwrap(), sock);
    }

    #[test]
    fn inet_round_trip_with_trailing_arcs(
        addr in ip(),
        port in any::<u16>(),
        tail in prop::collection::vec(any::<u32>(), 0..3),
    ) {
        let oid = ip_to_oid(addr);
        let mut arcs = oid.arcs().to_vec();
        arcs.extend_from_slice(&tail);
        prop_assert_eq!(oid_to_ip(&arcs).unwrap(), (addr, oid.len()));

        let oid = ip_port_to_oid(addr, port);
        let mut arcs = oid.arcs().to_vec();
        arcs.extend_from_slice(&tail);
        prop_assert_eq!(oid_to_ip_port(&arcs).unwrap(), (addr, port, oid.len()));
    }

    #[test]
    fn ip4_rejects_out_of_range_octet(v in any::<u32>(), pos in 0usize..4, bad in 256u32..) {
        let mut arcs = ip4_to_oid(Ipv4Addr::from(v)).arcs().to_vec();
        arcs[pos] = bad;
        prop_assert!(oid_to_ip4(&arcs).is_err());
    }
}

#[test]
fn truthvalue_round_trip() {
    for b in [true, false] {
        assert_eq!(decode_truthvalue(encode_truthvalue(b)), Ok(b));
    }
    assert_eq!(encode_truthvalue(true), 1);
    assert_eq!(encode_truthvalue(false), 2);
}

#[test]
fn bits_msb_first() {
    // bit 0 is the top bit of the first octet
    assert_eq!(encode_bits(0b1, 8).as_ref(), &[0x80]);
    assert_eq!(encode_bits(1 << 9, 10).as_ref(), &[0x00, 0x40]);
    assert_eq!(decode_bits(&[0x00, 0x00, 0x00, 0x00, 0x01], 32), Err(MibError::WrongValue));
    assert_eq!(decode_bits(&[0xFF, 0x00, 0x00, 0x00, 0x00], 3), Ok(0b111));
}

//! Address to identifier conversions.
//!
//! The fixed forms map an address to exactly its octets (4 arcs for IPv4,
//! 16 for IPv6), with the `_port` forms appending one port arc. The
//! InetAddressType-prefixed forms ([`ip_to_oid`], [`oid_to_ip`] and their
//! port variants) follow the INET-ADDRESS-MIB index layout:
//!
//! | address | arcs |
//! |---|---|
//! | unknown / any | `0.0` |
//! | IPv4 | `1.4.a.b.c.d` |
//! | IPv6 | `2.16.<16 octets>` |

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddrV4, SocketAddrV6};

use smallvec::SmallVec;

use super::Oid;
use crate::error::{AddressErrorKind, Error, Result};

const INET_TYPE_UNKNOWN: u32 = 0;
const INET_TYPE_IPV4: u32 = 1;
const INET_TYPE_IPV6: u32 = 2;

/// Encode an IPv4 address as 4 arcs.
pub fn ip4_to_oid(addr: Ipv4Addr) -> Oid {
    let arcs: SmallVec<[u32; 4]> = addr.octets().iter().map(|&o| u32::from(o)).collect();
    Oid::from_literal(&arcs)
}

/// Decode exactly 4 arcs into an IPv4 address.
pub fn oid_to_ip4(arcs: &[u32]) -> Result<Ipv4Addr> {
    expect_count(arcs, 4)?;
    decode_octets::<4>(arcs, 0).map(Ipv4Addr::from)
}

/// Encode an IPv6 address as 16 arcs.
pub fn ip6_to_oid(addr: Ipv6Addr) -> Oid {
    let arcs: SmallVec<[u32; 16]> = addr.octets().iter().map(|&o| u32::from(o)).collect();
    Oid::from_literal(&arcs)
}

/// Decode exactly 16 arcs into an IPv6 address.
pub fn oid_to_ip6(arcs: &[u32]) -> Result<Ipv6Addr> {
    expect_count(arcs, 16)?;
    decode_octets::<16>(arcs, 0).map(Ipv6Addr::from)
}

/// Encode an IPv4 address and port as 5 arcs.
pub fn ip4_port_to_oid(addr: SocketAddrV4) -> Oid {
    let mut oid = ip4_to_oid(*addr.ip());
    oid.arcs.push(u32::from(addr.port()));
    oid
}

/// Decode exactly 5 arcs into an IPv4 address and port.
pub fn oid_to_ip4_port(arcs: &[u32]) -> Result<SocketAddrV4> {
    expect_count(arcs, 5)?;
    let ip = Ipv4Addr::from(decode_octets::<4>(arcs, 0)?);
    Ok(SocketAddrV4::new(ip, decode_port(arcs[4])?))
}

/// Encode an IPv6 address and port as 17 arcs.
pub fn ip6_port_to_oid(addr: SocketAddrV6) -> Oid {
    let mut oid = ip6_to_oid(*addr.ip());
    oid.arcs.push(u32::from(addr.port()));
    oid
}

/// Decode exactly 17 arcs into an IPv6 address and port.
pub fn oid_to_ip6_port(arcs: &[u32]) -> Result<SocketAddrV6> {
    expect_count(arcs, 17)?;
    let ip = Ipv6Addr::from(decode_octets::<16>(arcs, 0)?);
    Ok(SocketAddrV6::new(ip, decode_port(arcs[16])?, 0, 0))
}

/// Encode an address with its InetAddressType and length prefix.
///
/// `None` stands for the unknown/any address and encodes as `0.0`.
pub fn ip_to_oid(addr: Option<IpAddr>) -> Oid {
    let mut oid = Oid::new();
    match addr {
        None => {
            oid.arcs.extend_from_slice(&[INET_TYPE_UNKNOWN, 0]);
        }
        Some(IpAddr::V4(v4)) => {
            oid.arcs.extend_from_slice(&[INET_TYPE_IPV4, 4]);
            oid.arcs.extend(v4.octets().iter().map(|&o| u32::from(o)));
        }
        Some(IpAddr::V6(v6)) => {
            oid.arcs.extend_from_slice(&[INET_TYPE_IPV6, 16]);
            oid.arcs.extend(v6.octets().iter().map(|&o| u32::from(o)));
        }
    }
    oid
}

/// Decode a type-prefixed address from the start of `arcs`.
///
/// Trailing arcs are allowed. Returns the address and the number of arcs
/// consumed (2, 6 or 18).
pub fn oid_to_ip(arcs: &[u32]) -> Result<(Option<IpAddr>, usize)> {
    if arcs.len() < 2 {
        return Err(truncated(2, arcs.len()));
    }
    match arcs[0] {
        INET_TYPE_UNKNOWN => {
            expect_length_arc(arcs[1], 0)?;
            Ok((None, 2))
        }
        INET_TYPE_IPV4 => {
            expect_length_arc(arcs[1], 4)?;
            if arcs.len() < 6 {
                return Err(truncated(6, arcs.len()));
            }
            let ip = Ipv4Addr::from(decode_octets::<4>(arcs, 2)?);
            Ok((Some(IpAddr::V4(ip)), 6))
        }
        INET_TYPE_IPV6 => {
            expect_length_arc(arcs[1], 16)?;
            if arcs.len() < 18 {
                return Err(truncated(18, arcs.len()));
            }
            let ip = Ipv6Addr::from(decode_octets::<16>(arcs, 2)?);
            Ok((Some(IpAddr::V6(ip)), 18))
        }
        other => Err(Error::invalid_address(AddressErrorKind::UnsupportedType(
            other,
        ))),
    }
}

/// Encode a type-prefixed address followed by a port arc.
pub fn ip_port_to_oid(addr: Option<IpAddr>, port: u16) -> Oid {
    let mut oid = ip_to_oid(addr);
    oid.arcs.push(u32::from(port));
    oid
}

/// Decode a type-prefixed address and port from the start of `arcs`.
///
/// Returns the address, the port and the number of arcs consumed.
pub fn oid_to_ip_port(arcs: &[u32]) -> Result<(Option<IpAddr>, u16, usize)> {
    let (addr, used) = oid_to_ip(arcs)?;
    let port_arc = *arcs.get(used).ok_or_else(|| truncated(used + 1, arcs.len()))?;
    Ok((addr, decode_port(port_arc)?, used + 1))
}

fn decode_octets<const N: usize>(arcs: &[u32], offset: usize) -> Result<[u8; N]> {
    let mut octets = [0u8; N];
    for (i, octet) in octets.iter_mut().enumerate() {
        let value = arcs[offset + i];
        *octet = u8::try_from(value).map_err(|_| {
            Error::invalid_address(AddressErrorKind::OctetOutOfRange {
                position: offset + i,
                value,
            })
        })?;
    }
    Ok(octets)
}

fn decode_port(arc: u32) -> Result<u16> {
    u16::try_from(arc).map_err(|_| Error::invalid_address(AddressErrorKind::PortOutOfRange(arc)))
}

fn expect_count(arcs: &[u32], expected: usize) -> Result<()> {
    if arcs.len() != expected {
        return Err(Error::invalid_address(AddressErrorKind::ArcCount {
            expected,
            actual: arcs.len(),
        }));
    }
    Ok(())
}

fn expect_length_arc(actual: u32, expected: u32) -> Result<()> {
    if actual != expected {
        return Err(Error::invalid_address(AddressErrorKind::LengthMismatch {
            expected,
            actual,
        }));
    }
    Ok(())
}

fn truncated(needed: usize, available: usize) -> Error {
    Error::invalid_address(AddressErrorKind::Truncated { needed, available })
}

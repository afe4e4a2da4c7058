//! Typed values read from and written to object instances.

use std::fmt;

use bytes::Bytes;

use crate::asn1::Asn1Type;
use crate::oid::Oid;

/// An SNMP value.
///
/// The three exception variants never come out of a leaf; the registry
/// substitutes them when a varbind has no value to carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Value {
    /// Signed 32-bit integer (also TruthValue and enumerations).
    Integer(i32),
    /// Octet string (also DisplayString and BITS).
    OctetString(Bytes),
    Null,
    ObjectIdentifier(Oid),
    /// IPv4 address, network byte order.
    IpAddress([u8; 4]),
    Counter32(u32),
    /// Gauge32, also used for Unsigned32.
    Gauge32(u32),
    /// Hundredths of a second.
    TimeTicks(u32),
    Opaque(Bytes),
    Counter64(u64),
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl Value {
    /// The SMI type of this value, or `None` for exception values.
    pub fn asn1_type(&self) -> Option<Asn1Type> {
        Some(match self {
            Self::Integer(_) => Asn1Type::Integer,
            Self::OctetString(_) => Asn1Type::OctetString,
            Self::Null => Asn1Type::Null,
            Self::ObjectIdentifier(_) => Asn1Type::ObjectIdentifier,
            Self::IpAddress(_) => Asn1Type::IpAddress,
            Self::Counter32(_) => Asn1Type::Counter32,
            Self::Gauge32(_) => Asn1Type::Gauge32,
            Self::TimeTicks(_) => Asn1Type::TimeTicks,
            Self::Opaque(_) => Asn1Type::Opaque,
            Self::Counter64(_) => Asn1Type::Counter64,
            Self::NoSuchObject | Self::NoSuchInstance | Self::EndOfMibView => return None,
        })
    }

    /// Returns `true` for noSuchObject, noSuchInstance and endOfMibView.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Self::NoSuchObject | Self::NoSuchInstance | Self::EndOfMibView
        )
    }

    /// Encoded length of the value content in octets.
    ///
    /// Integers count their minimal two's complement form; OIDs count arcs
    /// times four.
    pub fn content_len(&self) -> usize {
        match self {
            Self::Integer(v) => {
                let mut len = 4;
                while len > 1 {
                    let top = *v >> ((len - 1) * 8 - 1);
                    if top == 0 || top == -1 {
                        len -= 1;
                    } else {
                        break;
                    }
                }
                len
            }
            Self::OctetString(b) | Self::Opaque(b) => b.len(),
            Self::ObjectIdentifier(oid) => oid.len() * 4,
            Self::IpAddress(_) => 4,
            Self::Counter32(_) | Self::Gauge32(_) | Self::TimeTicks(_) => 4,
            Self::Counter64(_) => 8,
            Self::Null | Self::NoSuchObject | Self::NoSuchInstance | Self::EndOfMibView => 0,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Unsigned 32-bit content of Counter32, Gauge32 or TimeTicks.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Counter32(v) | Self::Gauge32(v) | Self::TimeTicks(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Counter64(v) => Some(*v),
            Self::Counter32(v) | Self::Gauge32(v) | Self::TimeTicks(v) => Some(u64::from(*v)),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::OctetString(b) | Self::Opaque(b) => Some(b),
            Self::IpAddress(b) => Some(b),
            _ => None,
        }
    }

    /// Octet string content as UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::OctetString(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Self::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::OctetString(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) if !s.chars().any(|c| c.is_control() && c != '\n' && c != '\r') => {
                    write!(f, "{}", s)
                }
                _ => write_hex(f, bytes),
            },
            Self::Null => write!(f, "NULL"),
            Self::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Self::IpAddress([a, b, c, d]) => write!(f, "{}.{}.{}.{}", a, b, c, d),
            Self::Counter32(v) | Self::Gauge32(v) => write!(f, "{}", v),
            Self::TimeTicks(v) => {
                let secs = v / 100;
                let days = secs / 86400;
                let hours = (secs % 86400) / 3600;
                let mins = (secs % 3600) / 60;
                let s = secs % 60;
                let hundredths = v % 100;
                write!(
                    f,
                    "{}d {:02}:{:02}:{:02}.{:02}",
                    days, hours, mins, s, hundredths
                )
            }
            Self::Opaque(bytes) => write_hex(f, bytes),
            Self::Counter64(v) => write!(f, "{}", v),
            Self::NoSuchObject => write!(f, "noSuchObject"),
            Self::NoSuchInstance => write!(f, "noSuchInstance"),
            Self::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{:02X}", b)?;
    }
    Ok(())
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::OctetString(Bytes::from(s))
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Self::OctetString(b)
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Self::ObjectIdentifier(oid)
    }
}

impl From<std::net::Ipv4Addr> for Value {
    fn from(addr: std::net::Ipv4Addr) -> Self {
        Self::IpAddress(addr.octets())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Counter64(v)
    }
}

//! ASN.1 type tags carried on a resolved instance.
//!
//! Tag values follow X.690 Section 8.1.2 and RFC 2578:
//! - Bits 7-6: Class (00=Universal, 01=Application, 10=Context-specific)
//! - Bits 4-0: Tag number

/// Tag class bits (bits 7-6)
pub mod class {
    pub const UNIVERSAL: u8 = 0x00;
    pub const APPLICATION: u8 = 0x40;
    pub const CONTEXT_SPECIFIC: u8 = 0x80;
}

/// Universal tags
pub mod universal {
    pub const INTEGER: u8 = 0x02;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
}

/// Application tags - SNMP-specific types
pub mod application {
    pub const IP_ADDRESS: u8 = 0x40;
    pub const COUNTER32: u8 = 0x41;
    pub const GAUGE32: u8 = 0x42; // Also Unsigned32
    pub const TIMETICKS: u8 = 0x43;
    pub const OPAQUE: u8 = 0x44;
    pub const COUNTER64: u8 = 0x46;
}

/// Context-specific tags - Exception values
pub mod context {
    pub const NO_SUCH_OBJECT: u8 = 0x80;
    pub const NO_SUCH_INSTANCE: u8 = 0x81;
    pub const END_OF_MIB_VIEW: u8 = 0x82;
}

/// The SMI type of an object instance.
///
/// BITS and TruthValue are textual conventions over `OctetString` and
/// `Integer`; see [`codec`](crate::codec) for their conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asn1Type {
    Integer,
    OctetString,
    Null,
    ObjectIdentifier,
    IpAddress,
    Counter32,
    Gauge32,
    TimeTicks,
    Opaque,
    Counter64,
}

impl Asn1Type {
    /// The BER tag byte for this type.
    pub const fn tag(self) -> u8 {
        match self {
            Self::Integer => universal::INTEGER,
            Self::OctetString => universal::OCTET_STRING,
            Self::Null => universal::NULL,
            Self::ObjectIdentifier => universal::OBJECT_IDENTIFIER,
            Self::IpAddress => application::IP_ADDRESS,
            Self::Counter32 => application::COUNTER32,
            Self::Gauge32 => application::GAUGE32,
            Self::TimeTicks => application::TIMETICKS,
            Self::Opaque => application::OPAQUE,
            Self::Counter64 => application::COUNTER64,
        }
    }

    /// Look up a type by its BER tag byte.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            universal::INTEGER => Self::Integer,
            universal::OCTET_STRING => Self::OctetString,
            universal::NULL => Self::Null,
            universal::OBJECT_IDENTIFIER => Self::ObjectIdentifier,
            application::IP_ADDRESS => Self::IpAddress,
            application::COUNTER32 => Self::Counter32,
            application::GAUGE32 => Self::Gauge32,
            application::TIMETICKS => Self::TimeTicks,
            application::OPAQUE => Self::Opaque,
            application::COUNTER64 => Self::Counter64,
            _ => return None,
        })
    }
}

impl std::fmt::Display for Asn1Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Integer => "INTEGER",
            Self::OctetString => "OCTET STRING",
            Self::Null => "NULL",
            Self::ObjectIdentifier => "OBJECT IDENTIFIER",
            Self::IpAddress => "IpAddress",
            Self::Counter32 => "Counter32",
            Self::Gauge32 => "Gauge32",
            Self::TimeTicks => "TimeTicks",
            Self::Opaque => "Opaque",
            Self::Counter64 => "Counter64",
        };
        f.write_str(name)
    }
}

/// Get the class of a tag
#[inline]
pub const fn tag_class(tag: u8) -> u8 {
    tag & 0xC0
}

//! BITS and TruthValue conversions.
//!
//! Both are textual conventions without a tag of their own: BITS travels as
//! an OCTET STRING and TruthValue as an INTEGER. Leaves call these from their
//! `get_value`/`test_set`/`set_value` implementations.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{MibError, MibResult};

/// TruthValue `true(1)`.
pub const TRUTH_VALUE_TRUE: i32 = 1;
/// TruthValue `false(2)`.
pub const TRUTH_VALUE_FALSE: i32 = 2;

/// Decode a BITS octet string into a flag word.
///
/// Named bit `n` of the BITS value is the bit `0x80 >> (n % 8)` of octet
/// `n / 8`, and lands in the flag word as `1 << n`. Bits at or beyond
/// `bit_count` are cleared. Octets past the fourth are accepted only if they
/// are zero.
///
/// ```rust
/// use snmp_mib::codec::decode_bits;
///
/// // bits 0 and 9 set
/// assert_eq!(decode_bits(&[0x80, 0x40], 16).unwrap(), 0b10_0000_0001);
/// ```
pub fn decode_bits(buf: &[u8], bit_count: u8) -> MibResult<u32> {
    let mut flags = 0u32;
    for (index, &octet) in buf.iter().enumerate() {
        if octet == 0 {
            continue;
        }
        if index >= 4 {
            tracing::debug!(octet_index = index, "BITS value sets a bit beyond 32");
            return Err(MibError::WrongValue);
        }
        // reverse: MSB of the octet is the lowest-numbered bit
        flags |= u32::from(octet.reverse_bits()) << (index * 8);
    }
    Ok(flags & mask(bit_count))
}

/// Encode a flag word as a BITS octet string of exactly
/// `ceil(bit_count / 8)` octets.
///
/// Bits at or beyond `bit_count` are not encoded. Octets for positions past
/// bit 31 are zero.
pub fn encode_bits(flags: u32, bit_count: u8) -> Bytes {
    let len = usize::from(bit_count).div_ceil(8);
    let flags = flags & mask(bit_count);
    let mut buf = BytesMut::with_capacity(len);
    for index in 0..len {
        let octet = if index < 4 {
            ((flags >> (index * 8)) as u8).reverse_bits()
        } else {
            0
        };
        buf.put_u8(octet);
    }
    buf.freeze()
}

/// Decode a TruthValue. Anything other than 1 or 2 is `wrongValue`.
pub fn decode_truthvalue(value: i32) -> MibResult<bool> {
    match value {
        TRUTH_VALUE_TRUE => Ok(true),
        TRUTH_VALUE_FALSE => Ok(false),
        _ => Err(MibError::WrongValue),
    }
}

pub fn encode_truthvalue(value: bool) -> i32 {
    if value {
        TRUTH_VALUE_TRUE
    } else {
        TRUTH_VALUE_FALSE
    }
}

fn mask(bit_count: u8) -> u32 {
    if bit_count >= 32 {
        u32::MAX
    } else {
        (1u32 << bit_count) - 1
    }
}

//! Object identifier type and its lexicographic order.
//!
//! An [`Oid`] is a bounded sequence of unsigned 32-bit arcs. The bound
//! ([`MAX_OID_LEN`]) is enforced by every constructor and mutator, so an `Oid`
//! in hand is always representable on the wire and in a next-OID buffer.
//!
//! Ordering follows SNMP rules: arcs are compared pairwise as unsigned
//! integers, and when one OID is a strict prefix of the other the shorter one
//! sorts first. `1.3.6.1.2` < `1.3.6.1.2.1` < `1.3.6.1.3`.
//!
//! ```rust
//! use snmp_mib::oid;
//!
//! let a = oid!(1, 3, 6, 1, 2);
//! let b = oid!(1, 3, 6, 1, 2, 1);
//! assert!(a < b);
//! assert!(b < oid!(1, 3, 6, 1, 3));
//! ```

mod inet;
mod range;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::{Error, OidErrorKind, Result};

pub use inet::{
    ip_port_to_oid, ip_to_oid, ip4_port_to_oid, ip4_to_oid, ip6_port_to_oid, ip6_to_oid,
    oid_to_ip, oid_to_ip_port, oid_to_ip4, oid_to_ip4_port, oid_to_ip6, oid_to_ip6_port,
};
pub use range::{OidRange, in_range};

/// Maximum number of arcs an [`Oid`] may hold.
pub const MAX_OID_LEN: usize = 50;

/// What to do when an operation would grow an OID past [`MAX_OID_LEN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Fail with [`OidErrorKind::TooManyArcs`] and leave the OID unchanged.
    #[default]
    Reject,
    /// Keep as many arcs as fit and drop the rest.
    Truncate,
}

/// Compare two arc sequences in SNMP lexicographic order.
///
/// The first differing arc decides; if one sequence is a strict prefix of the
/// other, the shorter sequence orders first.
pub fn compare_arcs(a: &[u32], b: &[u32]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// An object identifier with at most [`MAX_OID_LEN`] arcs.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn new() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Result<Self> {
        check_len(arcs.len())?;
        Ok(Self {
            arcs: SmallVec::from_slice(arcs),
        })
    }

    /// Create an OID from an iterator of arcs.
    pub fn from_arcs<I: IntoIterator<Item = u32>>(arcs: I) -> Result<Self> {
        let arcs: SmallVec<[u32; 16]> = arcs.into_iter().collect();
        check_len(arcs.len())?;
        Ok(Self { arcs })
    }

    /// Used by the [`oid!`](crate::oid!) macro and for arcs already known to fit.
    ///
    /// # Panics
    ///
    /// Panics if the literal has more than [`MAX_OID_LEN`] arcs.
    #[doc(hidden)]
    pub fn from_literal(arcs: &[u32]) -> Self {
        assert!(
            arcs.len() <= MAX_OID_LEN,
            "oid! literal has {} arcs, maximum is {}",
            arcs.len(),
            MAX_OID_LEN
        );
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse dotted notation (`"1.3.6.1"`). A single leading dot is accepted.
    pub fn parse(s: &str) -> Result<Self> {
        let body = s.strip_prefix('.').unwrap_or(s);
        if body.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs = SmallVec::<[u32; 16]>::new();
        for part in body.split('.') {
            let arc = part
                .parse::<u32>()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            if arcs.len() == MAX_OID_LEN {
                return Err(Error::invalid_oid_with_input(
                    OidErrorKind::TooManyArcs {
                        count: body.split('.').count(),
                        max: MAX_OID_LEN,
                    },
                    s,
                ));
            }
            arcs.push(arc);
        }
        Ok(Self { arcs })
    }

    /// The arcs of this OID.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Returns `true` if the OID has no arcs.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Returns `true` if `prefix` is a (non-strict) prefix of this OID.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.arcs.starts_with(&prefix.arcs)
    }

    /// Replace the content of this OID with `arcs`.
    pub fn assign(&mut self, arcs: &[u32]) -> Result<()> {
        check_len(arcs.len())?;
        self.arcs.clear();
        self.arcs.extend_from_slice(arcs);
        Ok(())
    }

    /// Concatenate two arc sequences into a new OID.
    pub fn combine(first: &[u32], second: &[u32]) -> Result<Self> {
        check_len(first.len() + second.len())?;
        let mut arcs = SmallVec::with_capacity(first.len() + second.len());
        arcs.extend_from_slice(first);
        arcs.extend_from_slice(second);
        Ok(Self { arcs })
    }

    /// Insert `arcs` in front of the existing arcs.
    pub fn prefix(&mut self, arcs: &[u32]) -> Result<()> {
        check_len(self.arcs.len() + arcs.len())?;
        self.arcs.insert_from_slice(0, arcs);
        Ok(())
    }

    /// Append `arcs` after the existing arcs.
    pub fn append(&mut self, arcs: &[u32]) -> Result<()> {
        self.append_with(arcs, OverflowPolicy::Reject)
    }

    /// Append `arcs`, applying `policy` if the result would be too long.
    pub fn append_with(&mut self, arcs: &[u32], policy: OverflowPolicy) -> Result<()> {
        let room = MAX_OID_LEN - self.arcs.len();
        if arcs.len() > room {
            match policy {
                OverflowPolicy::Reject => {
                    return Err(too_many(self.arcs.len() + arcs.len()));
                }
                OverflowPolicy::Truncate => {
                    tracing::debug!(
                        snmp.oid = %self,
                        dropped = arcs.len() - room,
                        "truncating OID at maximum length"
                    );
                    self.arcs.extend_from_slice(&arcs[..room]);
                    return Ok(());
                }
            }
        }
        self.arcs.extend_from_slice(arcs);
        Ok(())
    }

    /// Append a single arc.
    pub fn push(&mut self, arc: u32) -> Result<()> {
        check_len(self.arcs.len() + 1)?;
        self.arcs.push(arc);
        Ok(())
    }

    /// A new OID with `arc` appended.
    pub fn child(&self, arc: u32) -> Result<Self> {
        let mut child = self.clone();
        child.push(arc)?;
        Ok(child)
    }

    /// The OID without its last arc, or `None` for an empty OID.
    pub fn parent(&self) -> Option<Self> {
        if self.arcs.is_empty() {
            return None;
        }
        Some(Self {
            arcs: SmallVec::from_slice(&self.arcs[..self.arcs.len() - 1]),
        })
    }

    /// Shorten the OID to `len` arcs. No effect if already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.arcs.truncate(len);
    }

    /// The arcs from position `from` onwards, as a new OID.
    ///
    /// Returns an empty OID when `from >= len()`.
    pub fn suffix(&self, from: usize) -> Self {
        let start = from.min(self.arcs.len());
        Self {
            arcs: SmallVec::from_slice(&self.arcs[start..]),
        }
    }

    /// The relative remainder after `prefix`, if this OID starts with it.
    pub fn strip_prefix(&self, prefix: &Oid) -> Option<Self> {
        if self.starts_with(prefix) {
            Some(self.suffix(prefix.len()))
        } else {
            None
        }
    }
}

/// The administrative `0.0` identifier from SNMPv2-SMI.
pub fn zero_dot_zero() -> Oid {
    Oid::from_literal(&[0, 0])
}

fn too_many(count: usize) -> Error {
    Error::invalid_oid(OidErrorKind::TooManyArcs {
        count,
        max: MAX_OID_LEN,
    })
}

fn check_len(count: usize) -> Result<()> {
    if count > MAX_OID_LEN {
        return Err(too_many(count));
    }
    Ok(())
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_arcs(&self.arcs, &other.arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AsRef<[u32]> for Oid {
    fn as_ref(&self) -> &[u32] {
        &self.arcs
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.arcs.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
            for arc in iter {
                write!(f, ".{}", arc)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

/// Build an [`Oid`] from a list of arcs.
///
/// ```rust
/// use snmp_mib::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.len(), 9);
/// assert!(oid!().is_empty());
/// ```
#[macro_export]
macro_rules! oid {
    () => {
        $crate::oid::Oid::new()
    };
    ($($arc:expr),+ $(,)?) => {
        $crate::oid::Oid::from_literal(&[$($arc),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_compare_pairwise() {
        assert_eq!(compare_arcs(&[1, 3, 6], &[1, 3, 7]), Ordering::Less);
        assert_eq!(compare_arcs(&[1, 4], &[1, 3, 7]), Ordering::Greater);
        assert_eq!(compare_arcs(&[1, 3, 6], &[1, 3, 6]), Ordering::Equal);
    }

    #[test]
    fn test_compare_prefix_orders_first() {
        assert_eq!(compare_arcs(&[1, 3], &[1, 3, 0]), Ordering::Less);
        assert_eq!(compare_arcs(&[1, 3, 0], &[1, 3]), Ordering::Greater);
        assert_eq!(compare_arcs(&[], &[0]), Ordering::Less);
        assert_eq!(compare_arcs(&[], &[]), Ordering::Equal);
    }

    #[test]
    fn test_compare_unsigned() {
        assert!(oid!(1, u32::MAX) > oid!(1, 0x7FFF_FFFF));
    }

    #[test]
    fn test_equal() {
        assert_eq!(oid!(1, 3, 6), Oid::from_slice(&[1, 3, 6]).unwrap());
        assert_ne!(oid!(1, 3, 6), oid!(1, 3, 6, 0));
    }

    #[test]
    fn test_from_slice_too_long() {
        let arcs = [1u32; MAX_OID_LEN + 1];
        let err = Oid::from_slice(&arcs).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOid {
                kind: OidErrorKind::TooManyArcs { count: 51, max: 50 },
                ..
            }
        ));
        assert_eq!(Oid::from_slice(&arcs[..MAX_OID_LEN]).unwrap().len(), 50);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Oid::parse("1.3.6.1").unwrap(), oid!(1, 3, 6, 1));
        assert_eq!(Oid::parse(".1.3").unwrap(), oid!(1, 3));
        assert_eq!(Oid::parse("4294967295").unwrap(), oid!(u32::MAX));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Oid::parse(""),
            Err(Error::InvalidOid {
                kind: OidErrorKind::Empty,
                ..
            })
        ));
        assert!(matches!(
            Oid::parse("1.x.3"),
            Err(Error::InvalidOid {
                kind: OidErrorKind::InvalidArc,
                ..
            })
        ));
        assert!(Oid::parse("1..3").is_err());
        assert!(Oid::parse("4294967296").is_err());

        let long = vec!["1"; MAX_OID_LEN + 1].join(".");
        assert!(matches!(
            Oid::parse(&long),
            Err(Error::InvalidOid {
                kind: OidErrorKind::TooManyArcs { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(oid!(1, 3, 6, 1, 2, 1).to_string(), "1.3.6.1.2.1");
        assert_eq!(oid!().to_string(), "");
        assert_eq!(format!("{:?}", oid!(1, 3)), "Oid(1.3)");
    }

    #[test]
    fn test_assign_combine_prefix_append() {
        let mut o = oid!(9, 9);
        o.assign(&[1, 3]).unwrap();
        assert_eq!(o, oid!(1, 3));

        o.append(&[6, 1]).unwrap();
        assert_eq!(o, oid!(1, 3, 6, 1));

        o.prefix(&[0]).unwrap();
        assert_eq!(o, oid!(0, 1, 3, 6, 1));

        assert_eq!(Oid::combine(&[1, 3], &[6]).unwrap(), oid!(1, 3, 6));
    }

    #[test]
    fn test_append_overflow_policies() {
        let mut o = Oid::from_slice(&[1; 48]).unwrap();
        assert!(o.append(&[2, 3, 4]).is_err());
        assert_eq!(o.len(), 48);

        o.append_with(&[2, 3, 4], OverflowPolicy::Truncate).unwrap();
        assert_eq!(o.len(), MAX_OID_LEN);
        assert_eq!(&o.arcs()[48..], &[2, 3]);

        assert!(o.push(5).is_err());
        assert!(o.prefix(&[0]).is_err());
        assert!(Oid::combine(&[1; 30], &[2; 21]).is_err());
    }

    #[test]
    fn test_parent_suffix_strip() {
        let o = oid!(1, 3, 6, 1);
        assert_eq!(o.parent().unwrap(), oid!(1, 3, 6));
        assert!(oid!().parent().is_none());
        assert_eq!(o.suffix(2), oid!(6, 1));
        assert_eq!(o.suffix(10), oid!());
        assert_eq!(o.strip_prefix(&oid!(1, 3)).unwrap(), oid!(6, 1));
        assert!(o.strip_prefix(&oid!(1, 4)).is_none());
        assert_eq!(o.child(2).unwrap(), oid!(1, 3, 6, 1, 2));
    }

    #[test]
    fn test_zero_dot_zero() {
        assert_eq!(zero_dot_zero(), oid!(0, 0));
    }
}

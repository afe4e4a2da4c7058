//! Next-OID tracker.
//!
//! Finds the smallest OID strictly greater than a start OID among candidates
//! offered one at a time, in any order. Each candidate carries a reference `R`
//! identifying where it came from so the winner can be fetched again.
//!
//! The output has a fixed capacity in arcs. A candidate longer than that can
//! never win; it is rejected on its own, without affecting later candidates.
//! The tracker still remembers the smallest such rejection: if it turns out
//! to be smaller than every candidate that fits, the true successor exists but
//! cannot be returned, and [`status`](NextOidTracker::status) reports
//! [`NextOidStatus::BufferTooSmall`].
//!
//! ```rust
//! use snmp_mib::oid;
//! use snmp_mib::tracker::{NextOidStatus, NextOidTracker};
//!
//! let mut tracker = NextOidTracker::new(&oid!(2), 8);
//! tracker.check(&[5], "five");
//! tracker.check(&[3], "three");
//! tracker.check(&[1], "one");
//! assert_eq!(tracker.status(), NextOidStatus::Match);
//! assert_eq!(tracker.next_oid().unwrap().arcs(), &[3]);
//! assert_eq!(tracker.reference(), Some(&"three"));
//! ```

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::oid::{MAX_OID_LEN, Oid, compare_arcs};

/// Overall state of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextOidStatus {
    /// No candidate greater than the start has been seen.
    NoMatch,
    /// The smallest candidate fits and is available.
    Match,
    /// The smallest candidate does not fit the output capacity.
    BufferTooSmall,
}

/// What happened to one candidate passed to [`NextOidTracker::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The candidate is the new best.
    Accepted,
    /// The candidate is not greater than the start OID.
    NotGreater,
    /// The candidate is not smaller than the current best.
    NotBetter,
    /// The candidate would be best but exceeds the output capacity.
    BufferTooSmall,
}

/// Final result of a tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOidResult<R> {
    Match { oid: Oid, reference: R },
    NoMatch,
    BufferTooSmall { arcs: Vec<u32> },
}

/// Incremental minimum search over candidate OIDs.
#[derive(Debug, Clone)]
pub struct NextOidTracker<R> {
    start: Oid,
    capacity: usize,
    best: Option<(Oid, R)>,
    oversized: Option<SmallVec<[u32; 32]>>,
}

impl<R> NextOidTracker<R> {
    /// Start a search for the successor of `start`, returning at most
    /// `capacity` arcs. Capacity is clamped to [`MAX_OID_LEN`].
    pub fn new(start: &Oid, capacity: usize) -> Self {
        Self::from_arcs(start.arcs(), capacity)
    }

    /// As [`new`](Self::new), with the start given as raw arcs.
    ///
    /// Arcs past [`MAX_OID_LEN`] are ignored; no OID of that length can be
    /// returned, so the shortened start yields the same successor set.
    pub fn from_arcs(start: &[u32], capacity: usize) -> Self {
        let start = &start[..start.len().min(MAX_OID_LEN)];
        Self {
            start: Oid::from_literal(start),
            capacity: capacity.min(MAX_OID_LEN),
            best: None,
            oversized: None,
        }
    }

    pub fn start(&self) -> &Oid {
        &self.start
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cheap filter for a partial OID (a subtree prefix or a full candidate).
    ///
    /// Returns `false` when nothing at or below `partial` can become the
    /// result: either it lies entirely before the start OID or it is not
    /// smaller than the current best. A `true` result promises nothing.
    pub fn precheck(&self, partial: &[u32]) -> bool {
        let start_len = partial.len().min(self.start.len());
        if compare_arcs(partial, &self.start.arcs()[..start_len]) == Ordering::Less {
            return false;
        }
        match &self.best {
            None => true,
            Some((best, _)) => compare_arcs(partial, best.arcs()) == Ordering::Less,
        }
    }

    /// Offer one candidate.
    pub fn check(&mut self, candidate: &[u32], reference: R) -> CheckOutcome {
        if compare_arcs(candidate, self.start.arcs()) != Ordering::Greater {
            return CheckOutcome::NotGreater;
        }
        if let Some((best, _)) = &self.best
            && compare_arcs(candidate, best.arcs()) != Ordering::Less
        {
            return CheckOutcome::NotBetter;
        }

        if candidate.len() > self.capacity {
            let smaller = self
                .oversized
                .as_ref()
                .is_none_or(|o| compare_arcs(candidate, o) == Ordering::Less);
            if smaller {
                self.oversized = Some(SmallVec::from_slice(candidate));
            }
            tracing::debug!(
                len = candidate.len(),
                capacity = self.capacity,
                "next-OID candidate exceeds output capacity"
            );
            return CheckOutcome::BufferTooSmall;
        }

        // capacity <= MAX_OID_LEN, so this cannot fail
        match Oid::from_slice(candidate) {
            Ok(oid) => {
                tracing::trace!(snmp.oid = %oid, "next-OID candidate accepted");
                self.best = Some((oid, reference));
                CheckOutcome::Accepted
            }
            Err(_) => CheckOutcome::BufferTooSmall,
        }
    }

    pub fn status(&self) -> NextOidStatus {
        match (&self.best, &self.oversized) {
            (None, None) => NextOidStatus::NoMatch,
            (None, Some(_)) => NextOidStatus::BufferTooSmall,
            (Some(_), None) => NextOidStatus::Match,
            (Some((best, _)), Some(oversized)) => {
                if compare_arcs(oversized, best.arcs()) == Ordering::Less {
                    NextOidStatus::BufferTooSmall
                } else {
                    NextOidStatus::Match
                }
            }
        }
    }

    /// The best fitting candidate, if the status is [`NextOidStatus::Match`].
    pub fn next_oid(&self) -> Option<&Oid> {
        match self.status() {
            NextOidStatus::Match => self.best.as_ref().map(|(oid, _)| oid),
            _ => None,
        }
    }

    /// Reference of the best fitting candidate, if the status is
    /// [`NextOidStatus::Match`].
    pub fn reference(&self) -> Option<&R> {
        match self.status() {
            NextOidStatus::Match => self.best.as_ref().map(|(_, r)| r),
            _ => None,
        }
    }

    pub fn into_result(self) -> NextOidResult<R> {
        match self.status() {
            NextOidStatus::NoMatch => NextOidResult::NoMatch,
            NextOidStatus::BufferTooSmall => NextOidResult::BufferTooSmall {
                arcs: self.oversized.map(|o| o.to_vec()).unwrap_or_default(),
            },
            NextOidStatus::Match => match self.best {
                Some((oid, reference)) => NextOidResult::Match { oid, reference },
                None => NextOidResult::NoMatch,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_initial_state() {
        let tracker: NextOidTracker<()> = NextOidTracker::new(&oid!(1, 3), 10);
        assert_eq!(tracker.status(), NextOidStatus::NoMatch);
        assert!(tracker.next_oid().is_none());
        assert_eq!(tracker.into_result(), NextOidResult::NoMatch);
    }

    #[test]
    fn test_not_greater_than_start() {
        let mut tracker = NextOidTracker::new(&oid!(1, 3), 10);
        assert_eq!(tracker.check(&[1, 3], ()), CheckOutcome::NotGreater);
        assert_eq!(tracker.check(&[1], ()), CheckOutcome::NotGreater);
        assert_eq!(tracker.check(&[1, 2, 9], ()), CheckOutcome::NotGreater);
        assert_eq!(tracker.check(&[1, 3, 0], ()), CheckOutcome::Accepted);
    }

    #[test]
    fn test_keeps_smallest() {
        let mut tracker = NextOidTracker::new(&oid!(2), 10);
        assert_eq!(tracker.check(&[5], 5), CheckOutcome::Accepted);
        assert_eq!(tracker.check(&[3], 3), CheckOutcome::Accepted);
        assert_eq!(tracker.check(&[4], 4), CheckOutcome::NotBetter);
        assert_eq!(tracker.check(&[3], 33), CheckOutcome::NotBetter);
        assert_eq!(tracker.reference(), Some(&3));
        assert_eq!(
            tracker.into_result(),
            NextOidResult::Match {
                oid: oid!(3),
                reference: 3
            }
        );
    }

    #[test]
    fn test_oversized_rejected_per_call() {
        let mut tracker = NextOidTracker::new(&oid!(1), 10);
        let long = [2u32; 20];
        assert_eq!(tracker.check(&long, "long"), CheckOutcome::BufferTooSmall);
        assert_eq!(tracker.status(), NextOidStatus::BufferTooSmall);

        // a shorter qualifying candidate is still accepted
        assert_eq!(tracker.check(&[1, 5, 5, 5, 5], "short"), CheckOutcome::Accepted);
        assert_eq!(tracker.status(), NextOidStatus::Match);
        assert_eq!(tracker.next_oid(), Some(&oid!(1, 5, 5, 5, 5)));
    }

    #[test]
    fn test_oversized_winner_reported() {
        let mut tracker = NextOidTracker::new(&oid!(1), 3);
        assert_eq!(tracker.check(&[3], "fits"), CheckOutcome::Accepted);
        assert_eq!(tracker.check(&[2, 1, 1, 1], "big"), CheckOutcome::BufferTooSmall);
        assert_eq!(tracker.status(), NextOidStatus::BufferTooSmall);
        assert!(tracker.next_oid().is_none());
        assert_eq!(
            tracker.into_result(),
            NextOidResult::BufferTooSmall {
                arcs: vec![2, 1, 1, 1]
            }
        );
    }

    #[test]
    fn test_precheck() {
        let mut tracker = NextOidTracker::new(&oid!(1, 3, 6), 10);
        // subtree before the start
        assert!(!tracker.precheck(&[1, 2]));
        // subtree holding the start
        assert!(tracker.precheck(&[1, 3]));
        assert!(tracker.precheck(&[1]));
        assert!(tracker.precheck(&[1, 4]));

        tracker.check(&[1, 4, 1], ());
        // at or past the best
        assert!(!tracker.precheck(&[1, 4, 1]));
        assert!(!tracker.precheck(&[1, 5]));
        // prefix of the best may still hold something smaller
        assert!(tracker.precheck(&[1, 4]));
        assert!(tracker.precheck(&[1, 3, 7]));
    }

    #[test]
    fn test_precheck_scenario() {
        // objects at .1 .3 .5, start .2
        let mut tracker = NextOidTracker::new(&oid!(2), 10);
        assert!(!tracker.precheck(&[1]));
        assert_eq!(tracker.check(&[3], ()), CheckOutcome::Accepted);
        assert!(!tracker.precheck(&[6]));
        assert!(!tracker.precheck(&[5]));
        assert_eq!(tracker.next_oid(), Some(&oid!(3)));
    }

    #[test]
    fn test_capacity_clamped() {
        let tracker: NextOidTracker<()> = NextOidTracker::new(&oid!(), 500);
        assert_eq!(tracker.capacity(), MAX_OID_LEN);
    }
}

//! Subtree walk over a registry.

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

use super::MibRegistry;

/// Iterator over the readable objects below an OID, in ascending order.
///
/// Created by [`MibRegistry::walk()`]. The walk ends at the end of the MIB
/// view, when a result leaves the subtree, or after the configured maximum
/// number of steps.
///
/// A failed read is yielded as an error for that object and the walk moves
/// on past it. A failed search, or a non-increasing result, is yielded once
/// and ends the walk.
pub struct Walk<'r> {
    registry: &'r MibRegistry,
    base_oid: Oid,
    current_oid: Oid,
    /// Last OID returned to the caller.
    last_returned_oid: Option<Oid>,
    steps: usize,
    done: bool,
}

impl<'r> Walk<'r> {
    pub(super) fn new(registry: &'r MibRegistry, oid: Oid) -> Self {
        Self {
            registry,
            base_oid: oid.clone(),
            current_oid: oid,
            last_returned_oid: None,
            steps: 0,
            done: false,
        }
    }

    /// Number of get-next steps taken so far.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<VarBind>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(max) = self.registry.config.max_walk_steps
            && self.steps >= max
        {
            tracing::debug!(snmp.oid = %self.base_oid, steps = self.steps, "walk step limit reached");
            self.done = true;
            return None;
        }
        self.steps += 1;

        let vb = match self.registry.get_next(&self.current_oid) {
            Ok(vb) => vb,
            // the failed object is a fresh successor: skip it and carry on
            Err(e) if e.oid > self.current_oid => {
                if !e.oid.starts_with(&self.base_oid) {
                    self.done = true;
                    return None;
                }
                self.current_oid = e.oid.clone();
                self.last_returned_oid = Some(e.oid.clone());
                return Some(Err(Error::from(e)));
            }
            Err(e) => {
                self.done = true;
                return Some(Err(Error::from(e)));
            }
        };

        if matches!(vb.value, Value::EndOfMibView) || !vb.oid.starts_with(&self.base_oid) {
            self.done = true;
            return None;
        }

        // a misbehaving leaf would otherwise loop forever
        if let Some(last_oid) = self.last_returned_oid.take()
            && vb.oid <= last_oid
        {
            self.done = true;
            return Some(Err(Error::NonIncreasingOid {
                previous: last_oid,
                current: vb.oid,
            }));
        }

        self.current_oid = vb.oid.clone();
        self.last_returned_oid = Some(vb.oid.clone());
        Some(Ok(vb))
    }
}

//! MIB registry: the set of MIBs an agent serves and the lookups over them.
//!
//! Each [`Mib`] roots a node tree at a base OID. MIBs may nest: a MIB can be
//! registered below the base of another one, and the more specific MIB then
//! owns every OID under its base. Exact lookup picks the longest matching
//! base; next lookup walks every MIB through a shared [`NextOidTracker`] and
//! ignores candidates that belong to a more specific MIB.
//!
//! # Example
//!
//! ```rust
//! use snmp_mib::asn1::Asn1Type;
//! use snmp_mib::error::MibResult;
//! use snmp_mib::node::{Node, ScalarHandler};
//! use snmp_mib::registry::MibRegistry;
//! use snmp_mib::{Value, oid};
//!
//! struct Uptime;
//!
//! impl ScalarHandler for Uptime {
//!     fn asn1_type(&self) -> Asn1Type {
//!         Asn1Type::TimeTicks
//!     }
//!
//!     fn get(&self) -> MibResult<Value> {
//!         Ok(Value::TimeTicks(4200))
//!     }
//! }
//!
//! # fn main() -> snmp_mib::Result<()> {
//! let system = Node::tree(1, vec![Node::scalar(3, Uptime)])?;
//! let registry = MibRegistry::builder()
//!     .mib(oid!(1, 3, 6, 1, 2, 1, 1), system)
//!     .build()?;
//!
//! let vb = registry.get_next(&oid!(1, 3, 6, 1)).unwrap();
//! assert_eq!(vb.oid, oid!(1, 3, 6, 1, 2, 1, 1, 3, 0));
//! assert_eq!(vb.value, Value::TimeTicks(4200));
//! # Ok(())
//! # }
//! ```

mod set;
mod walk;

use std::cmp::Ordering;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{Error, MibError, MibResult, Result};
use crate::instance::NodeInstance;
use crate::node::{LeafRequest, Node};
use crate::oid::{MAX_OID_LEN, Oid, compare_arcs};
use crate::stats::{Counter, Statistics};
use crate::tracker::{NextOidResult, NextOidTracker};
use crate::value::Value;
use crate::varbind::{VarBind, VarBindError};

pub use set::SetFailure;
pub use walk::Walk;

type Arcs = SmallVec<[u32; 32]>;

/// A node tree served below a base OID.
///
/// The root node sits at `base` itself; its own arc is not used.
#[derive(Debug)]
pub struct Mib {
    base: Oid,
    root: Node,
}

impl Mib {
    pub fn new(base: Oid, root: Node) -> Self {
        Self { base, root }
    }

    pub fn base(&self) -> &Oid {
        &self.base
    }

    pub fn root(&self) -> &Node {
        &self.root
    }
}

/// Registry tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Longest OID (in arcs) a next lookup may return. Defaults to
    /// [`MAX_OID_LEN`]; larger values are clamped to it.
    pub next_oid_capacity: usize,
    /// Upper bound on get-next steps taken by one [`Walk`]. `None` walks
    /// until the subtree ends.
    pub max_walk_steps: Option<usize>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            next_oid_capacity: MAX_OID_LEN,
            max_walk_steps: None,
        }
    }
}

/// Builder for [`MibRegistry`].
#[derive(Debug, Default)]
pub struct MibRegistryBuilder {
    mibs: Vec<Mib>,
    config: RegistryConfig,
    statistics: Option<Arc<Statistics>>,
}

impl MibRegistryBuilder {
    /// Register a node tree rooted at `base`.
    pub fn mib(mut self, base: Oid, root: Node) -> Self {
        self.mibs.push(Mib::new(base, root));
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the output capacity of next lookups, in arcs.
    pub fn next_oid_capacity(mut self, capacity: usize) -> Self {
        self.config.next_oid_capacity = capacity;
        self
    }

    /// Limit the number of steps a single walk may take.
    pub fn max_walk_steps(mut self, steps: usize) -> Self {
        self.config.max_walk_steps = Some(steps);
        self
    }

    /// Count requests into a shared statistics record.
    pub fn statistics(mut self, statistics: Arc<Statistics>) -> Self {
        self.statistics = Some(statistics);
        self
    }

    /// Build the registry. Fails if two MIBs share a base OID.
    pub fn build(mut self) -> Result<MibRegistry> {
        self.mibs.sort_by(|a, b| a.base.cmp(&b.base));
        if let Some(dup) = self.mibs.windows(2).find(|w| w[0].base == w[1].base) {
            return Err(Error::DuplicateMib {
                base: dup[0].base.clone(),
            });
        }
        tracing::debug!(
            mibs = self.mibs.len(),
            nodes = self.mibs.iter().map(|m| m.root.count()).sum::<usize>(),
            "MIB registry built"
        );
        Ok(MibRegistry {
            mibs: self.mibs,
            config: self.config,
            statistics: self.statistics,
        })
    }
}

/// Outcome of a next lookup.
#[derive(Debug)]
pub enum NextInstance<'m> {
    /// The successor instance and its full OID.
    Found {
        oid: Oid,
        instance: NodeInstance<'m>,
    },
    /// Nothing follows the requested OID.
    EndOfMibView,
    /// The successor exists but is longer than the output capacity.
    BufferTooSmall { arcs: Vec<u32> },
}

/// The MIBs served by an agent.
#[derive(Debug)]
pub struct MibRegistry {
    mibs: Vec<Mib>,
    config: RegistryConfig,
    statistics: Option<Arc<Statistics>>,
}

impl MibRegistry {
    pub fn builder() -> MibRegistryBuilder {
        MibRegistryBuilder::default()
    }

    /// Registered MIBs, ordered by base OID.
    pub fn mibs(&self) -> &[Mib] {
        &self.mibs
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Attach a statistics record after construction.
    pub fn with_statistics(mut self, statistics: Arc<Statistics>) -> Self {
        self.statistics = Some(statistics);
        self
    }

    pub fn statistics(&self) -> Option<&Arc<Statistics>> {
        self.statistics.as_ref()
    }

    pub(crate) fn count(&self, counter: Counter, n: u32) {
        if let Some(stats) = &self.statistics {
            stats.add(counter, n);
        }
    }

    /// Count an outgoing error using the SNMPv1 status groups.
    pub(crate) fn count_error(&self, error: MibError) {
        use crate::error::ErrorStatus;

        let counter = match error.to_v1_error_status() {
            ErrorStatus::NoSuchName => Counter::OutNoSuchNames,
            ErrorStatus::BadValue => Counter::OutBadValues,
            _ => Counter::OutGenErrs,
        };
        self.count(counter, 1);
    }

    /// The MIB with the longest base that is a prefix of `arcs`.
    fn mib_for(&self, arcs: &[u32]) -> Option<&Mib> {
        self.mibs
            .iter()
            .filter(|m| arcs.starts_with(m.base.arcs()))
            .max_by_key(|m| m.base.len())
    }

    /// Whether `arcs` lies under a MIB more specific than `self.mibs[index]`.
    fn shadowed(&self, index: usize, arcs: &[u32]) -> bool {
        let own = self.mibs[index].base.len();
        self.mibs
            .iter()
            .enumerate()
            .any(|(i, m)| i != index && m.base.len() > own && arcs.starts_with(m.base.arcs()))
    }

    /// Resolve the instance at exactly `oid`.
    ///
    /// Fails with `noSuchObject` when no leaf node covers `oid`, and with the
    /// leaf's own error (normally `noSuchInstance`) when the leaf has no such
    /// instance.
    pub fn get_instance(&self, oid: &Oid) -> MibResult<NodeInstance<'_>> {
        let arcs = oid.arcs();
        let mib = self.mib_for(arcs).ok_or(MibError::NoSuchObject)?;
        let base_len = mib.base.len();
        let (node, depth) = mib
            .root
            .find_leaf(&arcs[base_len..])
            .ok_or(MibError::NoSuchObject)?;
        let leaf = node.as_leaf().ok_or(MibError::NoSuchObject)?;

        let split = base_len + depth;
        let node_oid = Oid::from_literal(&arcs[..split]);
        tracing::trace!(snmp.oid = %oid, snmp.node = %node_oid, "exact lookup");
        leaf.resolve_exact(&LeafRequest::new(node, &node_oid, &arcs[split..]))
    }

    /// Resolve the first instance strictly after `oid`, in any MIB.
    pub fn get_next_instance(&self, oid: &Oid) -> MibResult<NextInstance<'_>> {
        self.get_next_instance_with(oid, self.config.next_oid_capacity, |_| true)
    }

    /// Resolve the first instance strictly after `oid` that `validate`
    /// accepts, returning at most `capacity` arcs.
    ///
    /// A rejected instance does not end the search in its leaf: the leaf is
    /// asked again for the instance after the rejected one. The winning
    /// instance is resolved a second time with an exact lookup, so the
    /// returned instance is fresh and every candidate seen during the search
    /// has already been released.
    pub fn get_next_instance_with<F>(
        &self,
        oid: &Oid,
        capacity: usize,
        validate: F,
    ) -> MibResult<NextInstance<'_>>
    where
        F: FnMut(&NodeInstance<'_>) -> bool,
    {
        let mut search = NextSearch {
            registry: self,
            mib: 0,
            start: oid,
            tracker: NextOidTracker::new(oid, capacity),
            validate,
            path: Arcs::new(),
        };
        for (index, mib) in self.mibs.iter().enumerate() {
            if !search.tracker.precheck(mib.base.arcs()) {
                continue;
            }
            search.mib = index;
            search.path = Arcs::from_slice(mib.base.arcs());
            search.visit(&mib.root);
        }

        match search.tracker.into_result() {
            NextOidResult::NoMatch => {
                tracing::trace!(snmp.oid = %oid, "next lookup reached end of MIB view");
                Ok(NextInstance::EndOfMibView)
            }
            NextOidResult::BufferTooSmall { arcs } => {
                tracing::debug!(
                    snmp.oid = %oid,
                    len = arcs.len(),
                    capacity,
                    "next OID does not fit the output capacity"
                );
                Ok(NextInstance::BufferTooSmall { arcs })
            }
            NextOidResult::Match {
                oid: found,
                reference: (node, node_oid),
            } => {
                let leaf = node.as_leaf().ok_or(MibError::GenErr)?;
                let instance_arcs = &found.arcs()[node_oid.len()..];
                let instance =
                    leaf.resolve_exact(&LeafRequest::new(node, &node_oid, instance_arcs))?;
                tracing::trace!(snmp.oid = %oid, snmp.next = %found, "next lookup");
                Ok(NextInstance::Found {
                    oid: found,
                    instance,
                })
            }
        }
    }

    /// Read the object at `oid`.
    ///
    /// Missing objects and instances become exception values; other failures
    /// are returned for this varbind alone.
    pub fn get(&self, oid: &Oid) -> std::result::Result<VarBind, VarBindError> {
        self.count(Counter::InGetRequests, 1);
        let read = self
            .get_instance(oid)
            .and_then(|mut instance| instance.get_value());
        self.finish_read(oid.clone(), read)
    }

    /// Read the first readable object after `oid`.
    ///
    /// Instances without read access are skipped. The end of the MIB view is
    /// reported as an `endOfMibView` exception at the requested OID.
    pub fn get_next(&self, oid: &Oid) -> std::result::Result<VarBind, VarBindError> {
        self.count(Counter::InGetNexts, 1);
        let next = self.get_next_instance_with(oid, self.config.next_oid_capacity, |inst| {
            inst.access().is_readable()
        });
        match next {
            Ok(NextInstance::Found {
                oid: found,
                mut instance,
            }) => {
                let read = instance.get_value();
                drop(instance);
                self.finish_read(found, read)
            }
            Ok(NextInstance::EndOfMibView) => Ok(VarBind::new(oid.clone(), Value::EndOfMibView)),
            Ok(NextInstance::BufferTooSmall { .. }) => {
                self.count_error(MibError::GenErr);
                Err(VarBindError::new(oid.clone(), MibError::GenErr))
            }
            Err(error) => {
                self.count_error(error);
                Err(VarBindError::new(oid.clone(), error))
            }
        }
    }

    fn finish_read(
        &self,
        oid: Oid,
        read: MibResult<Value>,
    ) -> std::result::Result<VarBind, VarBindError> {
        match read {
            Ok(value) => {
                self.count(Counter::InTotalReqVars, 1);
                Ok(VarBind::new(oid, value))
            }
            Err(MibError::NoSuchObject) => Ok(VarBind::new(oid, Value::NoSuchObject)),
            Err(MibError::NoSuchInstance) => Ok(VarBind::new(oid, Value::NoSuchInstance)),
            Err(error) => {
                self.count_error(error);
                Err(VarBindError::new(oid, error))
            }
        }
    }

    /// Walk the subtree rooted at `oid` with repeated get-next.
    pub fn walk(&self, oid: Oid) -> Walk<'_> {
        Walk::new(self, oid)
    }
}

/// State of one depth-first next search.
struct NextSearch<'m, 's, F> {
    registry: &'m MibRegistry,
    /// Index of the MIB being walked.
    mib: usize,
    start: &'s Oid,
    tracker: NextOidTracker<(&'m Node, Oid)>,
    validate: F,
    /// Full OID of the node being visited.
    path: Arcs,
}

impl<'m, F> NextSearch<'m, '_, F>
where
    F: FnMut(&NodeInstance<'_>) -> bool,
{
    /// Whether the start OID runs through the current node.
    fn on_start_path(&self) -> bool {
        self.start.arcs().starts_with(&self.path)
    }

    fn visit(&mut self, node: &'m Node) {
        let Some(tree) = node.as_tree() else {
            self.visit_leaf(node);
            return;
        };
        let depth = self.path.len();
        if depth >= MAX_OID_LEN {
            return;
        }
        // on the start path, begin at the start's own arc or the first after it
        let mut next = match self.start.arcs().get(depth) {
            Some(&arc) if self.on_start_path() => {
                tree.child(arc).or_else(|| tree.next_child_after(arc))
            }
            _ => tree.children().first(),
        };
        while let Some(child) = next {
            self.path.push(child.arc());
            // every child here is at or after the start, so a failed
            // precheck means it cannot beat the current best
            let open = self.tracker.precheck(&self.path);
            if open {
                tracing::trace!(arc = child.arc(), depth = depth + 1, "next search descend");
                self.visit(child);
            }
            self.path.pop();
            if !open {
                break;
            }
            next = tree.next_child_after(child.arc());
        }
    }

    fn visit_leaf(&mut self, node: &'m Node) {
        let Some(leaf) = node.as_leaf() else {
            return;
        };
        let Ok(node_oid) = Oid::from_slice(&self.path) else {
            return;
        };
        let mut after = if self.on_start_path() {
            Arcs::from_slice(&self.start.arcs()[self.path.len()..])
        } else {
            Arcs::new()
        };

        loop {
            let Some(instance) = leaf.resolve_next(&LeafRequest::new(node, &node_oid, &after))
            else {
                return;
            };
            let relative = instance.instance_oid().arcs();
            if compare_arcs(relative, &after) != Ordering::Greater {
                tracing::warn!(
                    snmp.oid = %node_oid,
                    snmp.instance = %instance.instance_oid(),
                    "leaf returned a non-increasing next instance"
                );
                return;
            }

            let mut full = self.path.clone();
            full.extend_from_slice(relative);
            let shadowed = self.registry.shadowed(self.mib, &full);
            if !shadowed && (self.validate)(&instance) {
                self.tracker.check(&full, (node, node_oid.clone()));
                return;
            }
            tracing::trace!(
                snmp.oid = %node_oid,
                snmp.instance = %instance.instance_oid(),
                shadowed,
                "next candidate skipped"
            );
            after = Arcs::from_slice(relative);
        }
    }
}

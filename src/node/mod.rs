//! MIB node tree.
//!
//! A MIB is a tree of [`Node`]s. Internal nodes ([`TreeNode`]) own an ordered
//! list of children, each selected by a single arc; every other node kind is
//! a leaf that resolves object instances below itself through the two-method
//! [`Leaf`] contract.
//!
//! Children are sorted when the tree node is built, so descent is a binary
//! search and a depth-first walk visits OIDs in ascending order.
//!
//! # Example
//!
//! ```rust
//! use snmp_mib::asn1::Asn1Type;
//! use snmp_mib::error::MibResult;
//! use snmp_mib::node::{Node, ScalarHandler};
//! use snmp_mib::Value;
//!
//! struct SysDescr;
//!
//! impl ScalarHandler for SysDescr {
//!     fn asn1_type(&self) -> Asn1Type {
//!         Asn1Type::OctetString
//!     }
//!
//!     fn get(&self) -> MibResult<Value> {
//!         Ok(Value::from("router"))
//!     }
//! }
//!
//! let system = Node::tree(1, vec![Node::scalar(1, SysDescr)]).unwrap();
//! assert!(system.as_tree().unwrap().child(1).is_some());
//! ```

mod scalar;
mod scalar_array;
mod table;
mod threadsync;

use crate::asn1::Asn1Type;
use crate::error::{Error, MibResult, Result};
use crate::instance::{Access, InstanceAccess, NodeInstance};
use crate::oid::Oid;

pub use scalar::{ScalarHandler, ScalarNode};
pub use scalar_array::{ScalarArrayHandler, ScalarArrayNode, ScalarObject};
pub use table::{TABLE_ENTRY_ARC, TableColumn, TableHandler, TableNode};
pub use threadsync::{SyncWorker, ThreadSyncNode};

/// One element of a MIB tree.
pub struct Node {
    arc: u32,
    kind: NodeKind,
}

/// What a node is.
pub enum NodeKind {
    Tree(TreeNode),
    Scalar(ScalarNode),
    ScalarArray(ScalarArrayNode),
    Table(TableNode),
    ThreadSync(ThreadSyncNode),
}

impl Node {
    /// Create a node of any kind.
    pub fn new(arc: u32, kind: NodeKind) -> Self {
        Self { arc, kind }
    }

    /// Create an internal node. Children are sorted by arc; two children with
    /// the same arc are rejected.
    pub fn tree(arc: u32, children: Vec<Node>) -> Result<Self> {
        Ok(Self::new(arc, NodeKind::Tree(TreeNode::new(arc, children)?)))
    }

    /// Create a scalar leaf with its single instance at `.0`.
    pub fn scalar(arc: u32, handler: impl ScalarHandler + 'static) -> Self {
        Self::new(arc, NodeKind::Scalar(ScalarNode::new(handler)))
    }

    /// Create a leaf holding several scalars, each at `<object arc>.0`.
    pub fn scalar_array(
        arc: u32,
        objects: Vec<ScalarObject>,
        handler: impl ScalarArrayHandler + 'static,
    ) -> Result<Self> {
        Ok(Self::new(
            arc,
            NodeKind::ScalarArray(ScalarArrayNode::new(arc, objects, handler)?),
        ))
    }

    /// Create a table leaf.
    pub fn table(arc: u32, table: TableNode) -> Self {
        Self::new(arc, NodeKind::Table(table))
    }

    /// Create a thread-sync proxy leaf.
    pub fn thread_sync(arc: u32, proxy: ThreadSyncNode) -> Self {
        Self::new(arc, NodeKind::ThreadSync(proxy))
    }

    /// The arc selecting this node under its parent.
    pub fn arc(&self) -> u32 {
        self.arc
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self.kind, NodeKind::Tree(_))
    }

    pub fn as_tree(&self) -> Option<&TreeNode> {
        match &self.kind {
            NodeKind::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// The leaf contract of this node, or `None` for an internal node.
    pub fn as_leaf(&self) -> Option<&dyn Leaf> {
        match &self.kind {
            NodeKind::Tree(_) => None,
            NodeKind::Scalar(leaf) => Some(leaf),
            NodeKind::ScalarArray(leaf) => Some(leaf),
            NodeKind::Table(leaf) => Some(leaf),
            NodeKind::ThreadSync(leaf) => Some(leaf),
        }
    }

    /// Descend along `arcs` until a leaf is reached.
    ///
    /// Returns the leaf and the number of arcs consumed to reach it (the
    /// remaining arcs are the instance OID). `None` if descent runs into a
    /// missing child, or the arcs end at an internal node.
    pub fn find_leaf(&self, arcs: &[u32]) -> Option<(&Node, usize)> {
        let mut node = self;
        let mut depth = 0;
        loop {
            match &node.kind {
                NodeKind::Tree(tree) => {
                    let arc = *arcs.get(depth)?;
                    node = tree.child(arc)?;
                    depth += 1;
                    tracing::trace!(arc, depth, "descend");
                }
                _ => return Some((node, depth)),
            }
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        match &self.kind {
            NodeKind::Tree(tree) => 1 + tree.children.iter().map(Node::count).sum::<usize>(),
            _ => 1,
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.kind {
            NodeKind::Tree(tree) => {
                return f
                    .debug_struct("Node")
                    .field("arc", &self.arc)
                    .field("children", &tree.children)
                    .finish();
            }
            NodeKind::Scalar(_) => "scalar",
            NodeKind::ScalarArray(_) => "scalar-array",
            NodeKind::Table(_) => "table",
            NodeKind::ThreadSync(_) => "thread-sync",
        };
        f.debug_struct("Node")
            .field("arc", &self.arc)
            .field("kind", &kind)
            .finish()
    }
}

/// Internal node: an ordered set of children.
pub struct TreeNode {
    children: Vec<Node>,
}

impl TreeNode {
    fn new(arc: u32, mut children: Vec<Node>) -> Result<Self> {
        children.sort_by_key(Node::arc);
        if let Some(dup) = children.windows(2).find(|w| w[0].arc == w[1].arc) {
            return Err(Error::DuplicateArc {
                parent: arc,
                arc: dup[0].arc,
            });
        }
        Ok(Self { children })
    }

    /// Children in ascending arc order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The child selected by `arc`.
    pub fn child(&self, arc: u32) -> Option<&Node> {
        self.children
            .binary_search_by_key(&arc, Node::arc)
            .ok()
            .map(|i| &self.children[i])
    }

    /// The child with the smallest arc strictly greater than `arc`.
    pub fn next_child_after(&self, arc: u32) -> Option<&Node> {
        let i = self.children.partition_point(|c| c.arc <= arc);
        self.children.get(i)
    }
}

/// Where a leaf sits and which instance is being asked for.
#[derive(Debug, Clone, Copy)]
pub struct LeafRequest<'a, 'm> {
    /// The leaf node being resolved.
    pub node: &'m Node,
    /// Full OID of `node`.
    pub node_oid: &'a Oid,
    /// Instance OID relative to `node_oid`. For exact resolution this is the
    /// wanted instance; for next resolution the search starts after it (an
    /// empty OID means before the first instance).
    pub instance_oid: &'a [u32],
}

impl<'a, 'm> LeafRequest<'a, 'm> {
    pub fn new(node: &'m Node, node_oid: &'a Oid, instance_oid: &'a [u32]) -> Self {
        Self {
            node,
            node_oid,
            instance_oid,
        }
    }

    /// Build an instance of this request's node.
    pub fn instance(
        &self,
        instance_oid: Oid,
        asn1_type: Asn1Type,
        access: Access,
        accessor: impl InstanceAccess + 'm,
    ) -> NodeInstance<'m> {
        NodeInstance::new(
            self.node,
            self.node_oid.clone(),
            instance_oid,
            asn1_type,
            access,
            accessor,
        )
    }
}

/// Resolution contract of a leaf node.
///
/// Implementations must not assume anything about the order in which a
/// walk calls them.
pub trait Leaf: Send + Sync {
    /// The instance at exactly `req.instance_oid`.
    ///
    /// Fails with `noSuchInstance` when there is none, or with another
    /// protocol error if the lookup itself fails.
    fn resolve_exact<'m>(&'m self, req: &LeafRequest<'_, 'm>) -> MibResult<NodeInstance<'m>>;

    /// The instance with the smallest instance OID strictly greater than
    /// `req.instance_oid`, or `None` when the leaf holds nothing beyond it.
    fn resolve_next<'m>(&'m self, req: &LeafRequest<'_, 'm>) -> Option<NodeInstance<'m>>;
}

//! # snmp-mib
//!
//! The object model of an SNMP agent: the MIB trees it serves, how an object
//! identifier is resolved to a concrete object instance, and how the
//! lexicographic successor of an identifier is found for GETNEXT and walks.
//!
//! Message encoding, transport and security are left to the caller. This
//! crate answers "which instance is at (or after) this OID, and what is its
//! value".
//!
//! ## Building blocks
//!
//! - [`Oid`] is a bounded object identifier with SNMP ordering.
//! - [`node::Node`] trees are made of internal nodes and leaves. Leaves are
//!   scalars, scalar arrays, tables, or a [thread-sync](node::ThreadSyncNode)
//!   proxy forwarding to a leaf owned by another thread.
//! - [`instance::NodeInstance`] is one resolved object, with access checks
//!   and a two-phase write.
//! - [`tracker::NextOidTracker`] finds the smallest candidate after a start
//!   OID.
//! - [`registry::MibRegistry`] ties MIBs together and implements get,
//!   get-next, set and walk.
//!
//! ## Quick start
//!
//! ```rust
//! use snmp_mib::prelude::*;
//! use snmp_mib::asn1::Asn1Type;
//! use snmp_mib::error::MibResult;
//! use snmp_mib::node::{Node, ScalarHandler};
//! use snmp_mib::registry::MibRegistry;
//!
//! struct SysName;
//!
//! impl ScalarHandler for SysName {
//!     fn asn1_type(&self) -> Asn1Type {
//!         Asn1Type::OctetString
//!     }
//!
//!     fn get(&self) -> MibResult<Value> {
//!         Ok(Value::from("edge-1"))
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let registry = MibRegistry::builder()
//!     .mib(oid!(1, 3, 6, 1, 2, 1, 1), Node::tree(1, vec![Node::scalar(5, SysName)])?)
//!     .build()?;
//!
//! for vb in registry.walk(oid!(1, 3, 6, 1, 2, 1)) {
//!     println!("{}", vb?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! - `cli`: the `mib-walk` demonstration binary and serde support for
//!   statistics snapshots.

pub mod asn1;
pub mod codec;
pub mod error;
pub mod instance;
pub mod node;
pub mod oid;
pub mod prelude;
pub mod registry;
pub mod stats;
pub mod tracker;
pub mod value;
pub mod varbind;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, ErrorStatus, MibError, MibResult, Result};
pub use oid::Oid;
pub use registry::{MibRegistry, NextInstance};
pub use value::Value;
pub use varbind::{VarBind, VarBindError};

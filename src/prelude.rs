//! Prelude module for convenient imports.
//!
//! ```rust
//! use snmp_mib::prelude::*;
//! ```
//!
//! This imports:
//! - Core types: [`Oid`], [`Value`], [`VarBind`], [`MibRegistry`]
//! - Error handling: [`Error`], [`MibError`], [`Result`], [`MibResult`]
//! - The leaf contract pieces: [`Node`], [`Access`]
//! - The [`oid!`] macro

pub use crate::error::{Error, MibError, MibResult, Result};
pub use crate::instance::Access;
pub use crate::node::Node;
pub use crate::oid::Oid;
pub use crate::registry::MibRegistry;
pub use crate::value::Value;
pub use crate::varbind::VarBind;

#[doc(no_inline)]
pub use crate::oid;

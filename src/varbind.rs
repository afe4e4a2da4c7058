//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a value.

use crate::error::{ErrorStatus, MibError};
use crate::oid::Oid;
use crate::value::Value;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with a NULL value (for GET requests).
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Returns `true` if the value is an exception (noSuchObject etc.).
    pub fn is_exception(&self) -> bool {
        self.value.is_exception()
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// A read that failed for one varbind.
///
/// The failure is confined to this OID; surrounding varbinds of the same
/// request are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{oid}: {error}")]
pub struct VarBindError {
    pub oid: Oid,
    pub error: MibError,
}

impl VarBindError {
    pub fn new(oid: Oid, error: MibError) -> Self {
        Self { oid, error }
    }

    /// The response status this failure maps to.
    pub fn status(&self) -> ErrorStatus {
        self.error.to_error_status()
    }
}

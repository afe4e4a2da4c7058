//! Node instance session.
//!
//! A [`NodeInstance`] is produced by a leaf for one access request and lives
//! until that access ends. It records where the object sits, how it may be
//! accessed and the payload the leaf wants back when the value is read or
//! written. The leaf's [`InstanceAccess::release`] hook runs exactly once,
//! when the instance is dropped or explicitly released.
//!
//! Access rights are enforced here, before the leaf's accessor is reached:
//!
//! | call | requires | otherwise |
//! |---|---|---|
//! | [`get_value`](NodeInstance::get_value) | readable | `noAccess` |
//! | [`validate_write`](NodeInstance::validate_write) | writable | `notWritable` |
//! | [`commit_write`](NodeInstance::commit_write) | writable, prior validate of the same value | `notWritable` / `inconsistentValue` |

use std::fmt;

use bytes::Bytes;

use crate::asn1::Asn1Type;
use crate::error::{MibError, MibResult, Result};
use crate::node::Node;
use crate::oid::Oid;
use crate::value::Value;

/// Access rights of a resolved instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    /// Neither readable nor writable (also accessible-for-notify).
    NotAccessible,
    #[default]
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    pub fn is_readable(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    pub fn is_writable(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotAccessible => "not-accessible",
            Self::ReadOnly => "read-only",
            Self::WriteOnly => "write-only",
            Self::ReadWrite => "read-write",
        })
    }
}

/// Leaf-defined payload carried from resolution to access.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Reference {
    #[default]
    None,
    Buffer(Bytes),
    U32(u32),
    I32(i32),
    U64(u64),
}

impl Reference {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Buffer(b) => Some(b),
            _ => None,
        }
    }
}

/// Description of a resolved instance, handed to its accessor.
#[derive(Debug, Clone)]
pub struct InstanceInfo {
    /// Full OID of the leaf node that produced the instance.
    pub node_oid: Oid,
    /// Instance OID relative to `node_oid`.
    pub instance_oid: Oid,
    pub asn1_type: Asn1Type,
    pub access: Access,
    pub reference: Reference,
}

/// Per-instance value accessor supplied by a leaf.
///
/// `test_set` and `set_value` default to `notWritable`; only writable
/// instances need to override them.
pub trait InstanceAccess: Send {
    /// Read the current value.
    fn get_value(&mut self, info: &InstanceInfo) -> MibResult<Value>;

    /// Check a proposed value without applying it.
    fn test_set(&mut self, info: &InstanceInfo, value: &Value) -> MibResult<()> {
        let _ = (info, value);
        Err(MibError::NotWritable)
    }

    /// Apply a value previously accepted by `test_set`.
    fn set_value(&mut self, info: &InstanceInfo, value: &Value) -> MibResult<()> {
        let _ = (info, value);
        Err(MibError::NotWritable)
    }

    /// Free whatever resolution allocated.
    fn release(&mut self, info: &mut InstanceInfo) {
        let _ = info;
    }
}

/// A validate step that accepts every value.
///
/// For instances whose `set_value` cannot fail and that have no value
/// constraints beyond the type check [`NodeInstance::validate_write`]
/// already performs.
pub fn test_set_ok(_info: &InstanceInfo, _value: &Value) -> MibResult<()> {
    Ok(())
}

/// One concrete object instance, valid for a single access sequence.
pub struct NodeInstance<'m> {
    node: &'m Node,
    info: InstanceInfo,
    accessor: Option<Box<dyn InstanceAccess + 'm>>,
    validated: Option<Value>,
}

impl<'m> NodeInstance<'m> {
    /// Create an instance of `node`, which lives at `node_oid`.
    pub fn new(
        node: &'m Node,
        node_oid: Oid,
        instance_oid: Oid,
        asn1_type: Asn1Type,
        access: Access,
        accessor: impl InstanceAccess + 'm,
    ) -> Self {
        Self {
            node,
            info: InstanceInfo {
                node_oid,
                instance_oid,
                asn1_type,
                access,
                reference: Reference::None,
            },
            accessor: Some(Box::new(accessor)),
            validated: None,
        }
    }

    /// Attach the payload the accessor will receive.
    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.info.reference = reference;
        self
    }

    /// The leaf node this instance came from.
    pub fn node(&self) -> &'m Node {
        self.node
    }

    pub fn info(&self) -> &InstanceInfo {
        &self.info
    }

    pub fn node_oid(&self) -> &Oid {
        &self.info.node_oid
    }

    pub fn instance_oid(&self) -> &Oid {
        &self.info.instance_oid
    }

    /// Full OID: node OID followed by the instance OID.
    pub fn oid(&self) -> Result<Oid> {
        Oid::combine(self.info.node_oid.arcs(), self.info.instance_oid.arcs())
    }

    pub fn asn1_type(&self) -> Asn1Type {
        self.info.asn1_type
    }

    pub fn access(&self) -> Access {
        self.info.access
    }

    pub fn reference(&self) -> &Reference {
        &self.info.reference
    }

    /// Read the value. Fails with `noAccess` if the instance is not readable.
    pub fn get_value(&mut self) -> MibResult<Value> {
        if !self.info.access.is_readable() {
            tracing::debug!(
                snmp.oid = %self.info.node_oid,
                snmp.instance = %self.info.instance_oid,
                access = %self.info.access,
                "read rejected"
            );
            return Err(MibError::NoAccess);
        }
        let accessor = self
            .accessor
            .as_mut()
            .ok_or(MibError::ResourceUnavailable)?;
        let value = accessor.get_value(&self.info)?;
        if value.asn1_type() != Some(self.info.asn1_type) {
            tracing::debug!(
                snmp.oid = %self.info.node_oid,
                snmp.instance = %self.info.instance_oid,
                declared = %self.info.asn1_type,
                "accessor returned a value of a different type"
            );
        }
        Ok(value)
    }

    /// Check that `value` may be written, without changing anything.
    ///
    /// A value of the wrong SMI type fails with `wrongType` before the
    /// accessor is consulted.
    pub fn validate_write(&mut self, value: &Value) -> MibResult<()> {
        self.ensure_writable()?;
        self.validated = None;
        if value.asn1_type() != Some(self.info.asn1_type) {
            return Err(MibError::WrongType);
        }
        let accessor = self
            .accessor
            .as_mut()
            .ok_or(MibError::ResourceUnavailable)?;
        accessor.test_set(&self.info, value)?;
        self.validated = Some(value.clone());
        Ok(())
    }

    /// Apply `value`. It must equal the value last passed to a successful
    /// [`validate_write`](Self::validate_write).
    pub fn commit_write(&mut self, value: &Value) -> MibResult<()> {
        self.ensure_writable()?;
        match self.validated.take() {
            Some(validated) if validated == *value => {}
            _ => {
                tracing::warn!(
                    snmp.oid = %self.info.node_oid,
                    snmp.instance = %self.info.instance_oid,
                    "commit without a matching validate"
                );
                return Err(MibError::InconsistentValue);
            }
        }
        let accessor = self
            .accessor
            .as_mut()
            .ok_or(MibError::ResourceUnavailable)?;
        accessor.set_value(&self.info, value)
    }

    /// End the access sequence now.
    ///
    /// Dropping the instance has the same effect.
    pub fn release(self) {
        drop(self);
    }

    fn ensure_writable(&self) -> MibResult<()> {
        if !self.info.access.is_writable() {
            tracing::debug!(
                snmp.oid = %self.info.node_oid,
                snmp.instance = %self.info.instance_oid,
                access = %self.info.access,
                "write rejected"
            );
            return Err(MibError::NotWritable);
        }
        Ok(())
    }
}

impl Drop for NodeInstance<'_> {
    fn drop(&mut self) {
        if let Some(mut accessor) = self.accessor.take() {
            accessor.release(&mut self.info);
            tracing::trace!(
                snmp.oid = %self.info.node_oid,
                snmp.instance = %self.info.instance_oid,
                "instance released"
            );
        }
    }
}

impl fmt::Debug for NodeInstance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeInstance")
            .field("node_oid", &self.info.node_oid)
            .field("instance_oid", &self.info.instance_oid)
            .field("asn1_type", &self.info.asn1_type)
            .field("access", &self.info.access)
            .field("reference", &self.info.reference)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, ScalarHandler};
    use crate::oid;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

    struct Unused;

    impl ScalarHandler for Unused {
        fn asn1_type(&self) -> Asn1Type {
            Asn1Type::Integer
        }

        fn get(&self) -> MibResult<Value> {
            Ok(Value::Integer(0))
        }
    }

    #[derive(Default)]
    struct Probe {
        value: Arc<AtomicI32>,
        releases: Arc<AtomicU32>,
    }

    impl InstanceAccess for Probe {
        fn get_value(&mut self, _info: &InstanceInfo) -> MibResult<Value> {
            Ok(Value::Integer(self.value.load(Ordering::SeqCst)))
        }

        fn test_set(&mut self, info: &InstanceInfo, value: &Value) -> MibResult<()> {
            match value {
                Value::Integer(v) if *v >= 0 => test_set_ok(info, value),
                _ => Err(MibError::WrongValue),
            }
        }

        fn set_value(&mut self, _info: &InstanceInfo, value: &Value) -> MibResult<()> {
            self.value
                .store(value.as_i32().ok_or(MibError::WrongType)?, Ordering::SeqCst);
            Ok(())
        }

        fn release(&mut self, _info: &mut InstanceInfo) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn instance<'m>(node: &'m Node, access: Access, probe: Probe) -> NodeInstance<'m> {
        NodeInstance::new(
            node,
            oid!(1, 3, 6, 1, 4),
            oid!(0),
            Asn1Type::Integer,
            access,
            probe,
        )
    }

    #[test]
    fn test_access_flags() {
        assert!(Access::ReadOnly.is_readable());
        assert!(!Access::ReadOnly.is_writable());
        assert!(Access::WriteOnly.is_writable());
        assert!(!Access::WriteOnly.is_readable());
        assert!(Access::ReadWrite.is_readable() && Access::ReadWrite.is_writable());
        assert!(!Access::NotAccessible.is_readable());
    }

    #[test]
    fn test_read_and_full_oid() {
        let node = Node::scalar(4, Unused);
        let probe = Probe::default();
        probe.value.store(7, Ordering::SeqCst);
        let mut inst = instance(&node, Access::ReadOnly, probe);
        assert_eq!(inst.get_value(), Ok(Value::Integer(7)));
        assert_eq!(inst.oid().unwrap(), oid!(1, 3, 6, 1, 4, 0));
    }

    #[test]
    fn test_read_rejected_without_read_access() {
        let node = Node::scalar(4, Unused);
        let mut inst = instance(&node, Access::WriteOnly, Probe::default());
        assert_eq!(inst.get_value(), Err(MibError::NoAccess));
    }

    #[test]
    fn test_write_rejected_on_read_only() {
        let node = Node::scalar(4, Unused);
        let mut inst = instance(&node, Access::ReadOnly, Probe::default());
        assert_eq!(
            inst.validate_write(&Value::Integer(1)),
            Err(MibError::NotWritable)
        );
        assert_eq!(
            inst.commit_write(&Value::Integer(1)),
            Err(MibError::NotWritable)
        );
    }

    #[test]
    fn test_validate_then_commit() {
        let node = Node::scalar(4, Unused);
        let probe = Probe::default();
        let value = probe.value.clone();
        let mut inst = instance(&node, Access::ReadWrite, probe);

        assert_eq!(
            inst.validate_write(&Value::from("x")),
            Err(MibError::WrongType)
        );
        assert_eq!(
            inst.validate_write(&Value::Integer(-1)),
            Err(MibError::WrongValue)
        );
        inst.validate_write(&Value::Integer(5)).unwrap();
        inst.commit_write(&Value::Integer(5)).unwrap();
        assert_eq!(value.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_commit_requires_matching_validate() {
        let node = Node::scalar(4, Unused);
        let probe = Probe::default();
        let value = probe.value.clone();
        let mut inst = instance(&node, Access::ReadWrite, probe);

        assert_eq!(
            inst.commit_write(&Value::Integer(5)),
            Err(MibError::InconsistentValue)
        );
        inst.validate_write(&Value::Integer(5)).unwrap();
        assert_eq!(
            inst.commit_write(&Value::Integer(6)),
            Err(MibError::InconsistentValue)
        );
        // the validation was consumed by the failed commit
        assert_eq!(
            inst.commit_write(&Value::Integer(5)),
            Err(MibError::InconsistentValue)
        );
        assert_eq!(value.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_release_exactly_once() {
        let node = Node::scalar(4, Unused);

        let probe = Probe::default();
        let releases = probe.releases.clone();
        let inst = instance(&node, Access::ReadOnly, probe);
        inst.release();
        assert_eq!(releases.load(Ordering::SeqCst), 1);

        let probe = Probe::default();
        let releases = probe.releases.clone();
        {
            let mut inst = instance(&node, Access::WriteOnly, probe);
            let _ = inst.get_value();
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reference_payload() {
        let node = Node::scalar(4, Unused);
        let inst = instance(&node, Access::ReadOnly, Probe::default())
            .with_reference(Reference::U32(42));
        assert_eq!(inst.reference().as_u32(), Some(42));
        assert_eq!(inst.reference().as_i32(), None);
    }
}

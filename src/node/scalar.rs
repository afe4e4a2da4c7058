//! Scalar leaf: one object with its single instance at `.0`.

use crate::asn1::Asn1Type;
use crate::error::{MibError, MibResult};
use crate::instance::{Access, InstanceAccess, InstanceInfo, NodeInstance};
use crate::oid::Oid;
use crate::value::Value;

use super::{Leaf, LeafRequest};

/// Value source of a scalar object.
///
/// `test_set` accepts everything by default and `set` refuses; a writable
/// scalar overrides `access` and `set`, and `test_set` when values need
/// range checks.
pub trait ScalarHandler: Send + Sync {
    fn asn1_type(&self) -> Asn1Type;

    fn access(&self) -> Access {
        Access::ReadOnly
    }

    fn get(&self) -> MibResult<Value>;

    fn test_set(&self, value: &Value) -> MibResult<()> {
        let _ = value;
        Ok(())
    }

    fn set(&self, value: &Value) -> MibResult<()> {
        let _ = value;
        Err(MibError::NotWritable)
    }

    /// Called once when an instance of this scalar is released.
    fn release(&self) {}
}

/// Leaf wrapping a [`ScalarHandler`].
pub struct ScalarNode {
    handler: Box<dyn ScalarHandler>,
}

impl ScalarNode {
    pub fn new(handler: impl ScalarHandler + 'static) -> Self {
        Self {
            handler: Box::new(handler),
        }
    }

    fn instance<'m>(&'m self, req: &LeafRequest<'_, 'm>) -> NodeInstance<'m> {
        req.instance(
            Oid::from_literal(&[0]),
            self.handler.asn1_type(),
            self.handler.access(),
            ScalarAccess {
                handler: self.handler.as_ref(),
            },
        )
    }
}

impl Leaf for ScalarNode {
    fn resolve_exact<'m>(&'m self, req: &LeafRequest<'_, 'm>) -> MibResult<NodeInstance<'m>> {
        if !matches!(req.instance_oid, [0]) {
            return Err(MibError::NoSuchInstance);
        }
        Ok(self.instance(req))
    }

    fn resolve_next<'m>(&'m self, req: &LeafRequest<'_, 'm>) -> Option<NodeInstance<'m>> {
        // `.0` is the only instance; only the empty OID sorts before it
        if !req.instance_oid.is_empty() {
            return None;
        }
        Some(self.instance(req))
    }
}

struct ScalarAccess<'m> {
    handler: &'m dyn ScalarHandler,
}

impl InstanceAccess for ScalarAccess<'_> {
    fn get_value(&mut self, _info: &InstanceInfo) -> MibResult<Value> {
        self.handler.get()
    }

    fn test_set(&mut self, _info: &InstanceInfo, value: &Value) -> MibResult<()> {
        self.handler.test_set(value)
    }

    fn set_value(&mut self, _info: &InstanceInfo, value: &Value) -> MibResult<()> {
        self.handler.set(value)
    }

    fn release(&mut self, _info: &mut InstanceInfo) {
        self.handler.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::oid;
    use std::sync::atomic::{AtomicI32, Ordering};

    struct Contact(AtomicI32);

    impl ScalarHandler for Contact {
        fn asn1_type(&self) -> Asn1Type {
            Asn1Type::Integer
        }

        fn access(&self) -> Access {
            Access::ReadWrite
        }

        fn get(&self) -> MibResult<Value> {
            Ok(Value::Integer(self.0.load(Ordering::Relaxed)))
        }

        fn set(&self, value: &Value) -> MibResult<()> {
            self.0
                .store(value.as_i32().ok_or(MibError::WrongType)?, Ordering::Relaxed);
            Ok(())
        }
    }

    fn request<'a, 'm>(node: &'m Node, node_oid: &'a Oid, inst: &'a [u32]) -> LeafRequest<'a, 'm> {
        LeafRequest::new(node, node_oid, inst)
    }

    #[test]
    fn test_exact_only_at_zero() {
        let node = Node::scalar(4, Contact(AtomicI32::new(3)));
        let node_oid = oid!(1, 3, 6, 1, 2, 1, 1, 4);
        let leaf = node.as_leaf().unwrap();

        let mut inst = leaf.resolve_exact(&request(&node, &node_oid, &[0])).unwrap();
        assert_eq!(inst.instance_oid(), &oid!(0));
        assert_eq!(inst.get_value(), Ok(Value::Integer(3)));
        drop(inst);

        let bad: [&[u32]; 3] = [&[], &[1], &[0, 0]];
        for bad in bad {
            assert_eq!(
                leaf.resolve_exact(&request(&node, &node_oid, bad)).unwrap_err(),
                MibError::NoSuchInstance
            );
        }
    }

    #[test]
    fn test_next_from_empty_only() {
        let node = Node::scalar(4, Contact(AtomicI32::new(3)));
        let node_oid = oid!(1, 3, 6, 1, 2, 1, 1, 4);
        let leaf = node.as_leaf().unwrap();

        let inst = leaf.resolve_next(&request(&node, &node_oid, &[])).unwrap();
        assert_eq!(inst.oid().unwrap(), oid!(1, 3, 6, 1, 2, 1, 1, 4, 0));
        drop(inst);

        assert!(leaf.resolve_next(&request(&node, &node_oid, &[0])).is_none());
        assert!(leaf.resolve_next(&request(&node, &node_oid, &[0, 1])).is_none());
    }

    #[test]
    fn test_write_through_handler() {
        let node = Node::scalar(4, Contact(AtomicI32::new(3)));
        let node_oid = oid!(1, 3, 6, 1, 2, 1, 1, 4);
        let leaf = node.as_leaf().unwrap();

        let mut inst = leaf.resolve_exact(&request(&node, &node_oid, &[0])).unwrap();
        inst.validate_write(&Value::Integer(9)).unwrap();
        inst.commit_write(&Value::Integer(9)).unwrap();
        assert_eq!(inst.get_value(), Ok(Value::Integer(9)));
    }
}

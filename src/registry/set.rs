//! Two-phase SET (RFC 3416 section 4.2.5).

use crate::error::{ErrorStatus, MibError};
use crate::instance::NodeInstance;
use crate::stats::Counter;
use crate::value::Value;
use crate::varbind::VarBind;

use super::MibRegistry;

/// Why a SET request was refused or only partly applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("set failed at varbind {index}: {status}")]
pub struct SetFailure {
    /// Response error status.
    pub status: ErrorStatus,
    /// 1-based position of the offending varbind.
    pub index: usize,
    /// The error the instance reported.
    pub error: MibError,
}

impl SetFailure {
    fn new(position: usize, error: MibError, status: ErrorStatus) -> Self {
        Self {
            status,
            index: position + 1,
            error,
        }
    }
}

impl MibRegistry {
    /// Write every varbind or none of them.
    ///
    /// 1. **Test phase**: resolve each OID and run
    ///    [`validate_write`](NodeInstance::validate_write). Any failure aborts
    ///    with nothing written.
    /// 2. **Commit phase**: [`commit_write`](NodeInstance::commit_write) each
    ///    instance in request order. A failure is reported as `commitFailed`;
    ///    earlier commits stay applied.
    ///
    /// Every resolved instance is released before this returns.
    pub fn set(&self, varbinds: &[VarBind]) -> Result<(), SetFailure> {
        self.count(Counter::InSetRequests, 1);

        let mut pending: Vec<(NodeInstance<'_>, &Value)> = Vec::with_capacity(varbinds.len());
        for (position, vb) in varbinds.iter().enumerate() {
            let tested = self
                .get_instance(&vb.oid)
                .and_then(|mut instance| instance.validate_write(&vb.value).map(|()| instance));
            match tested {
                Ok(instance) => pending.push((instance, &vb.value)),
                Err(error) => {
                    tracing::debug!(snmp.oid = %vb.oid, %error, "set rejected in test phase");
                    self.count_error(error);
                    return Err(SetFailure::new(position, error, error.to_error_status()));
                }
            }
        }

        for (position, (instance, value)) in pending.iter_mut().enumerate() {
            if let Err(error) = instance.commit_write(*value) {
                tracing::warn!(
                    snmp.oid = %instance.node_oid(),
                    snmp.instance = %instance.instance_oid(),
                    %error,
                    committed = position,
                    "set failed in commit phase"
                );
                self.count_error(MibError::CommitFailed);
                return Err(SetFailure::new(
                    position,
                    error,
                    ErrorStatus::CommitFailed,
                ));
            }
        }

        self.count(Counter::InTotalSetVars, pending.len() as u32);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI32, Ordering};

    use super::*;
    use crate::asn1::Asn1Type;
    use crate::error::MibResult;
    use crate::instance::Access;
    use crate::node::{Node, ScalarHandler};
    use crate::oid;
    use crate::registry::MibRegistry;

    /// Writable integer that refuses negatives and fails to commit 99.
    struct Cell(Arc<AtomicI32>);

    impl ScalarHandler for Cell {
        fn asn1_type(&self) -> Asn1Type {
            Asn1Type::Integer
        }

        fn access(&self) -> Access {
            Access::ReadWrite
        }

        fn get(&self) -> MibResult<Value> {
            Ok(Value::Integer(self.0.load(Ordering::SeqCst)))
        }

        fn test_set(&self, value: &Value) -> MibResult<()> {
            match value.as_i32() {
                Some(v) if v >= 0 => Ok(()),
                _ => Err(MibError::WrongValue),
            }
        }

        fn set(&self, value: &Value) -> MibResult<()> {
            let v = value.as_i32().ok_or(MibError::WrongType)?;
            if v == 99 {
                return Err(MibError::ResourceUnavailable);
            }
            self.0.store(v, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Fixed;

    impl ScalarHandler for Fixed {
        fn asn1_type(&self) -> Asn1Type {
            Asn1Type::Integer
        }

        fn get(&self) -> MibResult<Value> {
            Ok(Value::Integer(0))
        }
    }

    fn registry() -> (MibRegistry, Arc<AtomicI32>, Arc<AtomicI32>) {
        let a = Arc::new(AtomicI32::new(0));
        let b = Arc::new(AtomicI32::new(0));
        let root = Node::tree(
            1,
            vec![
                Node::scalar(1, Cell(a.clone())),
                Node::scalar(2, Cell(b.clone())),
                Node::scalar(3, Fixed),
            ],
        )
        .unwrap();
        let registry = MibRegistry::builder().mib(oid!(1), root).build().unwrap();
        (registry, a, b)
    }

    #[test]
    fn test_all_applied() {
        let (registry, a, b) = registry();
        registry
            .set(&[
                VarBind::new(oid!(1, 1, 0), Value::Integer(10)),
                VarBind::new(oid!(1, 2, 0), Value::Integer(20)),
            ])
            .unwrap();
        assert_eq!(a.load(Ordering::SeqCst), 10);
        assert_eq!(b.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_test_phase_failure_writes_nothing() {
        let (registry, a, b) = registry();
        let failure = registry
            .set(&[
                VarBind::new(oid!(1, 1, 0), Value::Integer(10)),
                VarBind::new(oid!(1, 2, 0), Value::Integer(-1)),
            ])
            .unwrap_err();
        assert_eq!(failure.index, 2);
        assert_eq!(failure.status, ErrorStatus::WrongValue);
        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_and_read_only_objects() {
        let (registry, _, _) = registry();
        let failure = registry
            .set(&[VarBind::new(oid!(1, 9, 0), Value::Integer(1))])
            .unwrap_err();
        assert_eq!(failure.error, MibError::NoSuchObject);
        assert_eq!(failure.status, ErrorStatus::NotWritable);
        assert_eq!(failure.index, 1);

        let failure = registry
            .set(&[VarBind::new(oid!(1, 3, 0), Value::Integer(1))])
            .unwrap_err();
        assert_eq!(failure.status, ErrorStatus::NotWritable);

        let failure = registry
            .set(&[VarBind::new(oid!(1, 1, 0), Value::from("text"))])
            .unwrap_err();
        assert_eq!(failure.status, ErrorStatus::WrongType);
    }

    #[test]
    fn test_commit_failure() {
        let (registry, a, b) = registry();
        let failure = registry
            .set(&[
                VarBind::new(oid!(1, 1, 0), Value::Integer(10)),
                VarBind::new(oid!(1, 2, 0), Value::Integer(99)),
            ])
            .unwrap_err();
        assert_eq!(failure.index, 2);
        assert_eq!(failure.status, ErrorStatus::CommitFailed);
        assert_eq!(failure.error, MibError::ResourceUnavailable);
        assert_eq!(a.load(Ordering::SeqCst), 10);
        assert_eq!(b.load(Ordering::SeqCst), 0);
    }
}

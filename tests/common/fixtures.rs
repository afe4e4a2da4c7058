//! Common test fixtures: handlers, trees and OIDs.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use snmp_mib::asn1::Asn1Type;
use snmp_mib::error::{MibError, MibResult};
use snmp_mib::instance::{Access, Reference};
use snmp_mib::node::{Node, ScalarHandler, TableColumn, TableHandler, TableNode};
use snmp_mib::oid::OidRange;
use snmp_mib::tracker::NextOidTracker;
use snmp_mib::{MibRegistry, NextInstance, Oid, Value, oid};

// =============================================================================
// Subtree roots
// =============================================================================

/// Base of the odd-object MIB: 1.3.6.1.4.1.32473
pub fn odd_base() -> Oid {
    oid!(1, 3, 6, 1, 4, 1, 32473)
}

/// Base of the table MIB: 1.3.6.1.4.1.32473.2
pub fn table_base() -> Oid {
    oid!(1, 3, 6, 1, 4, 1, 32473, 2)
}

pub fn nonexistent_oid() -> Oid {
    oid!(1, 3, 6, 1, 99, 99, 99, 0)
}

// =============================================================================
// Release accounting
// =============================================================================

/// Shared count of instance releases seen by a handler.
#[derive(Clone, Default)]
pub struct Releases(Arc<AtomicUsize>);

impl Releases {
    pub fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Scalar handlers
// =============================================================================

/// Read-only INTEGER scalar.
pub struct Fixed(pub i32);

impl ScalarHandler for Fixed {
    fn asn1_type(&self) -> Asn1Type {
        Asn1Type::Integer
    }

    fn get(&self) -> MibResult<Value> {
        Ok(Value::Integer(self.0))
    }
}

/// Read-write INTEGER scalar backed by a shared cell.
///
/// Negative values fail validation. Committing 99 fails with
/// `resourceUnavailable`.
#[derive(Clone, Default)]
pub struct Cell(pub Arc<AtomicI32>);

impl Cell {
    pub fn new(value: i32) -> Self {
        Self(Arc::new(AtomicI32::new(value)))
    }

    pub fn load(&self) -> i32 {
        self.0.load(Ordering::SeqCst)
    }
}

impl ScalarHandler for Cell {
    fn asn1_type(&self) -> Asn1Type {
        Asn1Type::Integer
    }

    fn access(&self) -> Access {
        Access::ReadWrite
    }

    fn get(&self) -> MibResult<Value> {
        Ok(Value::Integer(self.load()))
    }

    fn test_set(&self, value: &Value) -> MibResult<()> {
        match value.as_i32() {
            Some(v) if v >= 0 => Ok(()),
            Some(_) => Err(MibError::WrongValue),
            None => Err(MibError::WrongType),
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

/// Read-only INTEGER scalar whose every read fails with `genErr`.
#[derive(Clone, Default)]
pub struct Broken(pub Releases);

impl ScalarHandler for Broken {
    fn asn1_type(&self) -> Asn1Type {
        Asn1Type::Integer
    }

    fn get(&self) -> MibResult<Value> {
        Err(MibError::GenErr)
    }

    fn release(&self) {
        self.0.record();
    }
}

// =============================================================================
// In-memory table
// =============================================================================

/// Rows keyed by their full index, one INTEGER value per column.
#[derive(Clone, Default)]
pub struct MemTable {
    rows: Arc<Mutex<BTreeMap<Vec<u32>, BTreeMap<u32, i32>>>>,
    pub releases: Releases,
}

impl MemTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, index: &[u32], column: u32, value: i32) {
        self.rows
            .lock()
            .unwrap()
            .entry(index.to_vec())
            .or_default()
            .insert(column, value);
    }

    pub fn value(&self, index: &[u32], column: u32) -> Option<i32> {
        self.rows
            .lock()
            .unwrap()
            .get(index)
            .and_then(|row| row.get(&column).copied())
    }

    /// A table node over this storage with read-only column 2 and read-write
    /// column 3.
    pub fn node(&self, index_ranges: Vec<OidRange>) -> TableNode {
        TableNode::new(
            vec![
                TableColumn::new(3, Asn1Type::Integer, Access::ReadWrite),
                TableColumn::new(2, Asn1Type::Integer, Access::ReadOnly),
                TableColumn::new(1, Asn1Type::Integer, Access::NotAccessible),
            ],
            index_ranges,
            self.clone(),
        )
        .unwrap()
    }
}

impl TableHandler for MemTable {
    fn cell(&self, column: &TableColumn, index: &[u32]) -> Option<Reference> {
        self.value(index, column.id).map(|_| Reference::None)
    }

    fn next_cells(&self, column: &TableColumn, tracker: &mut NextOidTracker<Reference>) {
        // reverse order: the tracker must not depend on it
        let rows = self.rows.lock().unwrap();
        for (index, row) in rows.iter().rev() {
            if row.contains_key(&column.id) {
                tracker.check(index, Reference::None);
            }
        }
    }

    fn get(&self, column: &TableColumn, index: &[u32], _cell: &Reference) -> MibResult<Value> {
        self.value(index, column.id)
            .map(Value::Integer)
            .ok_or(MibError::NoSuchInstance)
    }

    fn test_set(
        &self,
        _column: &TableColumn,
        _index: &[u32],
        _cell: &Reference,
        value: &Value,
    ) -> MibResult<()> {
        match value.as_i32() {
            Some(v) if (0..=100).contains(&v) => Ok(()),
            _ => Err(MibError::WrongValue),
        }
    }

    fn set(
        &self,
        column: &TableColumn,
        index: &[u32],
        _cell: &Reference,
        value: &Value,
    ) -> MibResult<()> {
        let v = value.as_i32().ok_or(MibError::WrongType)?;
        self.insert(index, column.id, v);
        Ok(())
    }

    fn release(&self, _column: &TableColumn, _index: &[u32], _cell: &Reference) {
        self.releases.record();
    }
}

// =============================================================================
// Registries
// =============================================================================

/// Scalars at `.1.0`, `.3.0` and `.5.0` below [`odd_base`].
pub fn odd_registry() -> MibRegistry {
    let root = Node::tree(
        32473,
        vec![
            Node::scalar(5, Fixed(5)),
            Node::scalar(1, Fixed(1)),
            Node::scalar(3, Fixed(3)),
        ],
    )
    .unwrap();
    MibRegistry::builder().mib(odd_base(), root).build().unwrap()
}

/// Every OID a walk from `start` returns, collected through repeated
/// next lookups.
pub fn next_chain(registry: &MibRegistry, start: &Oid) -> Vec<Oid> {
    let mut out = Vec::new();
    let mut current = start.clone();
    while let NextInstance::Found { oid, .. } = registry.get_next_instance(&current).unwrap() {
        assert!(oid > current, "{oid} does not follow {current}");
        out.push(oid.clone());
        current = oid;
    }
    out
}

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

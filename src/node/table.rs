//! Table leaf.
//!
//! Instances of a table node are laid out as `1.<column>.<index...>`, where
//! `1` is the conceptual row entry, `<column>` selects a column and the index
//! arcs identify the row. Every row index has exactly as many arcs as the
//! table has index ranges, and each arc must fall within its range.
//!
//! The handler owns the rows. For next resolution it is handed a
//! [`NextOidTracker`] per column and offers its row indexes to it, so it can
//! search its own storage however suits it.

use crate::asn1::Asn1Type;
use crate::error::{Error, MibError, MibResult, Result};
use crate::instance::{Access, InstanceAccess, InstanceInfo, NodeInstance, Reference};
use crate::oid::{MAX_OID_LEN, Oid, OidRange, in_range};
use crate::tracker::{NextOidResult, NextOidTracker};
use crate::value::Value;

use super::{Leaf, LeafRequest};

/// Arc of the conceptual row entry below a table node.
pub const TABLE_ENTRY_ARC: u32 = 1;

/// One column of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableColumn {
    pub id: u32,
    pub asn1_type: Asn1Type,
    pub access: Access,
}

impl TableColumn {
    pub const fn new(id: u32, asn1_type: Asn1Type, access: Access) -> Self {
        Self {
            id,
            asn1_type,
            access,
        }
    }
}

/// Row storage behind a [`TableNode`].
pub trait TableHandler: Send + Sync {
    /// Find the cell at `index` in `column`. The index has already been
    /// checked against the table's index ranges.
    fn cell(&self, column: &TableColumn, index: &[u32]) -> Option<Reference>;

    /// Offer the index of every row that has a cell in `column` to
    /// `tracker`, via [`NextOidTracker::check`].
    ///
    /// Rows at or before [`tracker.start()`](NextOidTracker::start) may be
    /// skipped; the tracker ignores them anyway.
    fn next_cells(&self, column: &TableColumn, tracker: &mut NextOidTracker<Reference>);

    fn get(&self, column: &TableColumn, index: &[u32], cell: &Reference) -> MibResult<Value>;

    fn test_set(
        &self,
        column: &TableColumn,
        index: &[u32],
        cell: &Reference,
        value: &Value,
    ) -> MibResult<()> {
        let _ = (column, index, cell, value);
        Ok(())
    }

    fn set(
        &self,
        column: &TableColumn,
        index: &[u32],
        cell: &Reference,
        value: &Value,
    ) -> MibResult<()> {
        let _ = (column, index, cell, value);
        Err(MibError::NotWritable)
    }

    /// Called once for every cell instance when it is released, including
    /// candidates the next search resolved and then passed over.
    fn release(&self, column: &TableColumn, index: &[u32], cell: &Reference) {
        let _ = (column, index, cell);
    }
}

pub struct TableNode {
    columns: Vec<TableColumn>,
    index_ranges: Vec<OidRange>,
    handler: Box<dyn TableHandler>,
}

impl TableNode {
    /// Create a table. Columns are sorted by id; duplicate ids are rejected.
    pub fn new(
        mut columns: Vec<TableColumn>,
        index_ranges: Vec<OidRange>,
        handler: impl TableHandler + 'static,
    ) -> Result<Self> {
        columns.sort_by_key(|c| c.id);
        if let Some(dup) = columns.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(Error::DuplicateArc {
                parent: TABLE_ENTRY_ARC,
                arc: dup[0].id,
            });
        }
        Ok(Self {
            columns,
            index_ranges,
            handler: Box::new(handler),
        })
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn index_ranges(&self) -> &[OidRange] {
        &self.index_ranges
    }

    fn column(&self, id: u32) -> Option<&TableColumn> {
        self.columns
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|i| &self.columns[i])
    }

    fn valid_index(&self, index: &[u32]) -> bool {
        index.len() == self.index_ranges.len() && in_range(index, &self.index_ranges)
    }

    fn instance<'m>(
        &'m self,
        req: &LeafRequest<'_, 'm>,
        column: &'m TableColumn,
        index: &[u32],
        cell: Reference,
    ) -> Option<NodeInstance<'m>> {
        let instance_oid = Oid::combine(&[TABLE_ENTRY_ARC, column.id], index).ok()?;
        let accessor = CellAccess {
            column,
            handler: self.handler.as_ref(),
        };
        Some(
            req.instance(instance_oid, column.asn1_type, column.access, accessor)
                .with_reference(cell),
        )
    }
}

impl Leaf for TableNode {
    fn resolve_exact<'m>(&'m self, req: &LeafRequest<'_, 'm>) -> MibResult<NodeInstance<'m>> {
        let [TABLE_ENTRY_ARC, column_id, index @ ..] = req.instance_oid else {
            return Err(MibError::NoSuchInstance);
        };
        let column = self
            .column(*column_id)
            .filter(|c| c.access != Access::NotAccessible)
            .ok_or(MibError::NoSuchInstance)?;
        if !self.valid_index(index) {
            return Err(MibError::NoSuchInstance);
        }
        let cell = self
            .handler
            .cell(column, index)
            .ok_or(MibError::NoSuchInstance)?;
        self.instance(req, column, index, cell)
            .ok_or(MibError::NoSuchInstance)
    }

    fn resolve_next<'m>(&'m self, req: &LeafRequest<'_, 'm>) -> Option<NodeInstance<'m>> {
        let (first_column, row_start): (u32, &[u32]) = match req.instance_oid {
            [] | [0, ..] | [TABLE_ENTRY_ARC] => (0, &[]),
            [TABLE_ENTRY_ARC, column, rest @ ..] => (*column, rest),
            _ => return None,
        };

        let from = self.columns.partition_point(|c| c.id < first_column);
        for column in &self.columns[from..] {
            if column.access == Access::NotAccessible {
                continue;
            }
            let start = if column.id == first_column {
                row_start
            } else {
                &[]
            };
            if let Some((index, cell)) = self.next_row(req, column, start) {
                return self.instance(req, column, index.arcs(), cell);
            }
        }
        None
    }
}

impl TableNode {
    /// The first row of `column` after `start` whose index is valid.
    ///
    /// An invalid index offered by the handler is skipped and the column is
    /// searched again from it, so rows sorting after it are still found.
    fn next_row(
        &self,
        req: &LeafRequest<'_, '_>,
        column: &TableColumn,
        start: &[u32],
    ) -> Option<(Oid, Reference)> {
        let mut start = start.to_vec();
        loop {
            let mut tracker = NextOidTracker::from_arcs(&start, MAX_OID_LEN - 2);
            self.handler.next_cells(column, &mut tracker);

            let rejected = match tracker.into_result() {
                NextOidResult::Match { oid, reference } if self.valid_index(oid.arcs()) => {
                    return Some((oid, reference));
                }
                NextOidResult::Match { oid, .. } => oid.arcs().to_vec(),
                NextOidResult::BufferTooSmall { arcs } => arcs,
                NextOidResult::NoMatch => return None,
            };
            tracing::debug!(
                snmp.oid = %req.node_oid,
                column = column.id,
                len = rejected.len(),
                "table handler offered an index outside its ranges"
            );
            start = skip_past(rejected)?;
        }
    }
}

/// Search start that lies past `index`.
///
/// The tracker only keeps the first [`MAX_OID_LEN`] arcs of a start, so a
/// longer index is replaced by the end of the prefix subtree it lies in.
/// Nothing in that subtree fits an instance OID.
fn skip_past(mut index: Vec<u32>) -> Option<Vec<u32>> {
    if index.len() <= MAX_OID_LEN {
        return Some(index);
    }
    index.truncate(MAX_OID_LEN);
    let last = index.last_mut()?;
    *last = last.checked_add(1)?;
    Some(index)
}

struct CellAccess<'m> {
    column: &'m TableColumn,
    handler: &'m dyn TableHandler,
}

impl CellAccess<'_> {
    fn index<'i>(info: &'i InstanceInfo) -> &'i [u32] {
        info.instance_oid.arcs().get(2..).unwrap_or(&[])
    }
}

impl InstanceAccess for CellAccess<'_> {
    fn get_value(&mut self, info: &InstanceInfo) -> MibResult<Value> {
        self.handler
            .get(self.column, Self::index(info), &info.reference)
    }

    fn test_set(&mut self, info: &InstanceInfo, value: &Value) -> MibResult<()> {
        self.handler
            .test_set(self.column, Self::index(info), &info.reference, value)
    }

    fn set_value(&mut self, info: &InstanceInfo, value: &Value) -> MibResult<()> {
        self.handler
            .set(self.column, Self::index(info), &info.reference, value)
    }

    fn release(&mut self, info: &mut InstanceInfo) {
        self.handler
            .release(self.column, Self::index(info), &info.reference);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::oid;

    /// Rows keyed by a single index arc; column 3 is sparse.
    struct Rows(Vec<u32>);

    impl TableHandler for Rows {
        fn cell(&self, column: &TableColumn, index: &[u32]) -> Option<Reference> {
            let row = *index.first()?;
            if column.id == 3 && row % 2 == 0 {
                return None;
            }
            self.0.contains(&row).then_some(Reference::U32(row))
        }

        fn next_cells(&self, column: &TableColumn, tracker: &mut NextOidTracker<Reference>) {
            for &row in &self.0 {
                if column.id == 3 && row % 2 == 0 {
                    continue;
                }
                tracker.check(&[row], Reference::U32(row));
            }
        }

        fn get(&self, column: &TableColumn, index: &[u32], cell: &Reference) -> MibResult<Value> {
            assert_eq!(cell.as_u32(), index.first().copied());
            Ok(Value::Integer((column.id * 100 + index[0]) as i32))
        }
    }

    fn table() -> Node {
        let columns = vec![
            TableColumn::new(3, Asn1Type::Integer, Access::ReadOnly),
            TableColumn::new(1, Asn1Type::Integer, Access::NotAccessible),
            TableColumn::new(2, Asn1Type::Integer, Access::ReadOnly),
        ];
        let table = TableNode::new(columns, vec![OidRange::new(1, 100)], Rows(vec![7, 2, 5]))
            .unwrap();
        Node::table(2, table)
    }

    fn next_of(node: &Node, after: &[u32]) -> Option<Oid> {
        let node_oid = oid!(1, 2);
        let req = LeafRequest::new(node, &node_oid, after);
        node.as_leaf()
            .unwrap()
            .resolve_next(&req)
            .map(|inst| inst.instance_oid().clone())
    }

    fn exact(node: &Node, inst: &[u32]) -> MibResult<Value> {
        let node_oid = oid!(1, 2);
        let req = LeafRequest::new(node, &node_oid, inst);
        node.as_leaf().unwrap().resolve_exact(&req)?.get_value()
    }

    #[test]
    fn test_exact() {
        let node = table();
        assert_eq!(exact(&node, &[1, 2, 5]), Ok(Value::Integer(205)));
        assert_eq!(exact(&node, &[1, 3, 7]), Ok(Value::Integer(307)));
        // sparse column
        assert_eq!(exact(&node, &[1, 3, 2]), Err(MibError::NoSuchInstance));
        // not-accessible column
        assert_eq!(exact(&node, &[1, 1, 5]), Err(MibError::NoSuchInstance));
        // missing row, bad entry arc, bad index length, out of range
        assert_eq!(exact(&node, &[1, 2, 6]), Err(MibError::NoSuchInstance));
        assert_eq!(exact(&node, &[2, 2, 5]), Err(MibError::NoSuchInstance));
        assert_eq!(exact(&node, &[1, 2, 5, 0]), Err(MibError::NoSuchInstance));
        assert_eq!(exact(&node, &[1, 2, 0]), Err(MibError::NoSuchInstance));
        assert_eq!(exact(&node, &[1, 2]), Err(MibError::NoSuchInstance));
    }

    #[test]
    fn test_next_column_major() {
        let node = table();
        let mut seen = Vec::new();
        let mut cursor = Vec::new();
        while let Some(next) = next_of(&node, &cursor) {
            cursor = next.arcs().to_vec();
            seen.push(next);
        }
        assert_eq!(
            seen,
            vec![
                oid!(1, 2, 2),
                oid!(1, 2, 5),
                oid!(1, 2, 7),
                oid!(1, 3, 5),
                oid!(1, 3, 7)
            ]
        );
    }

    #[test]
    fn test_next_from_partial_positions() {
        let node = table();
        assert_eq!(next_of(&node, &[0, 9]), Some(oid!(1, 2, 2)));
        assert_eq!(next_of(&node, &[1]), Some(oid!(1, 2, 2)));
        assert_eq!(next_of(&node, &[1, 1, 99]), Some(oid!(1, 2, 2)));
        assert_eq!(next_of(&node, &[1, 2, 5, 0]), Some(oid!(1, 2, 7)));
        assert_eq!(next_of(&node, &[1, 2, 7]), Some(oid!(1, 3, 5)));
        assert_eq!(next_of(&node, &[1, 3, 7]), None);
        assert_eq!(next_of(&node, &[1, 4]), None);
        assert_eq!(next_of(&node, &[2]), None);
    }

    /// Offers whatever rows it is given, valid or not, in the given order.
    struct Loose(Vec<Vec<u32>>);

    impl TableHandler for Loose {
        fn cell(&self, _column: &TableColumn, index: &[u32]) -> Option<Reference> {
            self.0.iter().any(|r| r == index).then_some(Reference::None)
        }

        fn next_cells(&self, _column: &TableColumn, tracker: &mut NextOidTracker<Reference>) {
            for row in &self.0 {
                tracker.check(row, Reference::None);
            }
        }

        fn get(&self, _column: &TableColumn, index: &[u32], _cell: &Reference) -> MibResult<Value> {
            Ok(Value::Integer(index.iter().sum::<u32>() as i32))
        }
    }

    fn loose(rows: Vec<Vec<u32>>) -> Node {
        let columns = vec![
            TableColumn::new(2, Asn1Type::Integer, Access::ReadOnly),
            TableColumn::new(3, Asn1Type::Integer, Access::ReadOnly),
        ];
        let table = TableNode::new(columns, vec![OidRange::new(1, 5)], Loose(rows)).unwrap();
        Node::table(2, table)
    }

    #[test]
    fn test_next_skips_invalid_rows_below_valid_ones() {
        // 0 is below the range, [2, 1] has the wrong length, 9 is above
        let node = loose(vec![vec![9], vec![3], vec![0], vec![2, 1], vec![4]]);
        assert_eq!(next_of(&node, &[]), Some(oid!(1, 2, 3)));
        assert_eq!(next_of(&node, &[1, 2, 3]), Some(oid!(1, 2, 4)));
        assert_eq!(next_of(&node, &[1, 2, 4]), Some(oid!(1, 3, 3)));
        assert_eq!(next_of(&node, &[1, 3, 4]), None);
    }

    #[test]
    fn test_next_skips_rows_too_long_for_an_oid() {
        let long = vec![1; MAX_OID_LEN + 3];
        let node = loose(vec![long, vec![2]]);
        assert_eq!(next_of(&node, &[]), Some(oid!(1, 2, 2)));
        assert_eq!(skip_past(vec![7; MAX_OID_LEN + 1]).map(|v| v.len()), Some(MAX_OID_LEN));
        assert_eq!(skip_past(vec![u32::MAX; MAX_OID_LEN + 1]), None);
    }

    #[test]
    fn test_duplicate_column() {
        let columns = vec![
            TableColumn::new(1, Asn1Type::Integer, Access::ReadOnly),
            TableColumn::new(1, Asn1Type::Integer, Access::ReadOnly),
        ];
        assert!(TableNode::new(columns, vec![], Rows(vec![])).is_err());
    }
}

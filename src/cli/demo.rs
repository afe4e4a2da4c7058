//! Demonstration MIB served by the `mib-walk` tool.
//!
//! | Base | Contents | Leaf kind |
//! |---|---|---|
//! | `1.3.6.1.2.1.1` | system group | scalar array |
//! | `1.3.6.1.2.1.2` | ifNumber, ifTable | scalar, table |
//! | `1.3.6.1.2.1.11` | snmp group counters | scalars |
//! | `1.3.6.1.4.1.32473.1` | sensor readings owned by a worker thread | thread-sync |
//!
//! `32473` is the enterprise number reserved for documentation (RFC 5612).

use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

use bytes::Bytes;

use crate::asn1::Asn1Type;
use crate::codec::{decode_bits, decode_truthvalue, encode_bits, encode_truthvalue};
use crate::error::{MibError, MibResult, Result};
use crate::instance::{Access, Reference};
use crate::node::{
    Node, ScalarArrayHandler, ScalarHandler, ScalarObject, TableColumn, TableHandler, TableNode,
    ThreadSyncNode,
};
use crate::oid;
use crate::oid::{Oid, OidRange};
use crate::registry::MibRegistry;
use crate::stats::{Counter, Statistics};
use crate::tracker::NextOidTracker;
use crate::value::Value;

/// Longest value accepted for the writable system strings.
const DISPLAY_STRING_MAX: usize = 255;

/// The demonstration registry plus the worker thread behind its thread-sync
/// leaf.
pub struct Demo {
    pub registry: MibRegistry,
    pub statistics: Arc<Statistics>,
    worker: Option<JoinHandle<usize>>,
}

impl Demo {
    /// Drop the registry and wait for the worker thread to finish.
    pub fn shutdown(self) {
        let Demo {
            registry, worker, ..
        } = self;
        drop(registry);
        match worker.map(JoinHandle::join) {
            Some(Ok(0)) | None => {}
            Some(Ok(leaked)) => tracing::warn!(leaked, "sensor worker stopped with live instances"),
            Some(Err(_)) => tracing::warn!("sensor worker thread panicked"),
        }
    }
}

/// Build the demonstration registry.
pub fn build() -> Result<Demo> {
    let statistics = Arc::new(Statistics::new());

    let (sensors, worker) = ThreadSyncNode::channel(sensor_leaf()?, 8);
    let worker = std::thread::Builder::new()
        .name("sensor-worker".into())
        .spawn(move || worker.run_blocking())
        .map_err(|e| {
            tracing::warn!(error = %e, "could not start sensor worker");
            crate::Error::SyncDisconnected
        })?;

    let registry = MibRegistry::builder()
        .mib(oid!(1, 3, 6, 1, 2, 1, 1), system_group()?)
        .mib(oid!(1, 3, 6, 1, 2, 1, 2), interfaces()?)
        .mib(oid!(1, 3, 6, 1, 2, 1, 11), snmp_group(&statistics)?)
        .mib(oid!(1, 3, 6, 1, 4, 1, 32473, 1), Node::thread_sync(1, sensors))
        .statistics(statistics.clone())
        .build()?;

    Ok(Demo {
        registry,
        statistics,
        worker: Some(worker),
    })
}

// system group

struct SystemGroup {
    started: Instant,
    contact: Mutex<String>,
    name: Mutex<String>,
    location: Mutex<String>,
}

impl SystemGroup {
    fn text(&self, arc: u32) -> Option<&Mutex<String>> {
        match arc {
            4 => Some(&self.contact),
            5 => Some(&self.name),
            6 => Some(&self.location),
            _ => None,
        }
    }
}

impl ScalarArrayHandler for SystemGroup {
    fn get(&self, object: &ScalarObject) -> MibResult<Value> {
        if let Some(text) = self.text(object.arc) {
            let text = text.lock().map_err(|_| MibError::GenErr)?;
            return Ok(Value::from(text.as_str()));
        }
        match object.arc {
            1 => Ok(Value::from(concat!(
                "snmp-mib demonstration agent ",
                env!("CARGO_PKG_VERSION")
            ))),
            2 => Ok(Value::ObjectIdentifier(oid!(1, 3, 6, 1, 4, 1, 32473, 1))),
            3 => {
                let ticks = self.started.elapsed().as_millis() / 10;
                Ok(Value::TimeTicks(u32::try_from(ticks).unwrap_or(u32::MAX)))
            }
            // application + end-to-end
            7 => Ok(Value::Integer(72)),
            _ => Err(MibError::NoSuchInstance),
        }
    }

    fn test_set(&self, object: &ScalarObject, value: &Value) -> MibResult<()> {
        let bytes = value.as_bytes().ok_or(MibError::WrongType)?;
        if bytes.len() > DISPLAY_STRING_MAX {
            return Err(MibError::WrongLength);
        }
        if std::str::from_utf8(bytes).is_err() {
            return Err(MibError::WrongValue);
        }
        self.text(object.arc).map(|_| ()).ok_or(MibError::NotWritable)
    }

    fn set(&self, object: &ScalarObject, value: &Value) -> MibResult<()> {
        let text = self.text(object.arc).ok_or(MibError::NotWritable)?;
        let new = value.as_str().ok_or(MibError::WrongValue)?;
        *text.lock().map_err(|_| MibError::CommitFailed)? = new.to_owned();
        Ok(())
    }
}

fn system_group() -> Result<Node> {
    use Access::{ReadOnly, ReadWrite};
    use Asn1Type::{Integer, ObjectIdentifier, OctetString, TimeTicks};

    let objects = vec![
        ScalarObject::new(1, OctetString, ReadOnly),
        ScalarObject::new(2, ObjectIdentifier, ReadOnly),
        ScalarObject::new(3, TimeTicks, ReadOnly),
        ScalarObject::new(4, OctetString, ReadWrite),
        ScalarObject::new(5, OctetString, ReadWrite),
        ScalarObject::new(6, OctetString, ReadWrite),
        ScalarObject::new(7, Integer, ReadOnly),
    ];
    let handler = SystemGroup {
        started: Instant::now(),
        contact: Mutex::new("noc@example.net".into()),
        name: Mutex::new("demo-1".into()),
        location: Mutex::new("rack 4".into()),
    };
    Node::scalar_array(1, objects, handler)
}

// interfaces group

struct Interface {
    index: u32,
    descr: &'static str,
    if_type: i32,
    mtu: i32,
    speed: u32,
    admin_status: AtomicI32,
    in_octets: AtomicU32,
}

impl Interface {
    fn new(index: u32, descr: &'static str, if_type: i32, mtu: i32, speed: u32) -> Self {
        Self {
            index,
            descr,
            if_type,
            mtu,
            speed,
            admin_status: AtomicI32::new(1),
            in_octets: AtomicU32::new(index * 1_000),
        }
    }
}

struct IfNumber(Arc<Vec<Interface>>);

impl ScalarHandler for IfNumber {
    fn asn1_type(&self) -> Asn1Type {
        Asn1Type::Integer
    }

    fn get(&self) -> MibResult<Value> {
        Ok(Value::Integer(self.0.len() as i32))
    }
}

struct IfTable(Arc<Vec<Interface>>);

impl IfTable {
    fn row(&self, cell: &Reference) -> MibResult<&Interface> {
        cell.as_u32()
            .and_then(|pos| self.0.get(pos as usize))
            .ok_or(MibError::GenErr)
    }
}

impl TableHandler for IfTable {
    fn cell(&self, _column: &TableColumn, index: &[u32]) -> Option<Reference> {
        let wanted = *index.first()?;
        let pos = self.0.iter().position(|row| row.index == wanted)?;
        Some(Reference::U32(pos as u32))
    }

    fn next_cells(&self, _column: &TableColumn, tracker: &mut NextOidTracker<Reference>) {
        for (pos, row) in self.0.iter().enumerate() {
            tracker.check(&[row.index], Reference::U32(pos as u32));
        }
    }

    fn get(&self, column: &TableColumn, _index: &[u32], cell: &Reference) -> MibResult<Value> {
        let row = self.row(cell)?;
        Ok(match column.id {
            1 => Value::Integer(row.index as i32),
            2 => Value::from(row.descr),
            3 => Value::Integer(row.if_type),
            4 => Value::Integer(row.mtu),
            5 => Value::Gauge32(row.speed),
            7 => Value::Integer(row.admin_status.load(Ordering::Relaxed)),
            10 => Value::Counter32(row.in_octets.fetch_add(64, Ordering::Relaxed)),
            _ => return Err(MibError::NoSuchInstance),
        })
    }

    fn test_set(
        &self,
        column: &TableColumn,
        _index: &[u32],
        _cell: &Reference,
        value: &Value,
    ) -> MibResult<()> {
        match (column.id, value.as_i32()) {
            // up(1), down(2), testing(3)
            (7, Some(1..=3)) => Ok(()),
            (7, _) => Err(MibError::WrongValue),
            _ => Err(MibError::NotWritable),
        }
    }

    fn set(
        &self,
        column: &TableColumn,
        _index: &[u32],
        cell: &Reference,
        value: &Value,
    ) -> MibResult<()> {
        if column.id != 7 {
            return Err(MibError::NotWritable);
        }
        let status = value.as_i32().ok_or(MibError::WrongType)?;
        self.row(cell)?.admin_status.store(status, Ordering::Relaxed);
        Ok(())
    }
}

fn interfaces() -> Result<Node> {
    use Access::{ReadOnly, ReadWrite};
    use Asn1Type::{Counter32, Gauge32, Integer, OctetString};

    let rows = Arc::new(vec![
        Interface::new(1, "lo", 24, 65536, 10_000_000),
        Interface::new(2, "eth0", 6, 1500, 1_000_000_000),
        Interface::new(3, "eth1", 6, 9000, 1_000_000_000),
        Interface::new(10, "wg0", 53, 1420, 0),
    ]);
    let columns = vec![
        TableColumn::new(1, Integer, ReadOnly),
        TableColumn::new(2, OctetString, ReadOnly),
        TableColumn::new(3, Integer, ReadOnly),
        TableColumn::new(4, Integer, ReadOnly),
        TableColumn::new(5, Gauge32, ReadOnly),
        TableColumn::new(7, Integer, ReadWrite),
        TableColumn::new(10, Counter32, ReadOnly),
    ];
    let table = TableNode::new(
        columns,
        vec![OidRange::new(1, i32::MAX as u32)],
        IfTable(rows.clone()),
    )?;
    Node::tree(
        2,
        vec![Node::scalar(1, IfNumber(rows)), Node::table(2, table)],
    )
}

// snmp group

struct StatCounter(Arc<Statistics>, Counter);

impl ScalarHandler for StatCounter {
    fn asn1_type(&self) -> Asn1Type {
        Asn1Type::Counter32
    }

    fn get(&self) -> MibResult<Value> {
        Ok(Value::Counter32(self.0.get(self.1)))
    }
}

/// snmpEnableAuthenTraps, a TruthValue.
struct EnableAuthenTraps(AtomicI32);

impl ScalarHandler for EnableAuthenTraps {
    fn asn1_type(&self) -> Asn1Type {
        Asn1Type::Integer
    }

    fn access(&self) -> Access {
        Access::ReadWrite
    }

    fn get(&self) -> MibResult<Value> {
        Ok(Value::Integer(self.0.load(Ordering::Relaxed)))
    }

    fn test_set(&self, value: &Value) -> MibResult<()> {
        decode_truthvalue(value.as_i32().ok_or(MibError::WrongType)?).map(|_| ())
    }

    fn set(&self, value: &Value) -> MibResult<()> {
        let enabled = decode_truthvalue(value.as_i32().ok_or(MibError::WrongType)?)?;
        self.0.store(encode_truthvalue(enabled), Ordering::Relaxed);
        Ok(())
    }
}

fn snmp_group(statistics: &Arc<Statistics>) -> Result<Node> {
    const COUNTERS: &[(u32, Counter)] = &[
        (1, Counter::InPkts),
        (2, Counter::OutPkts),
        (13, Counter::InTotalReqVars),
        (14, Counter::InTotalSetVars),
        (15, Counter::InGetRequests),
        (16, Counter::InGetNexts),
        (17, Counter::InSetRequests),
        (21, Counter::OutNoSuchNames),
        (22, Counter::OutBadValues),
        (24, Counter::OutGenErrs),
    ];
    let mut nodes: Vec<Node> = COUNTERS
        .iter()
        .map(|&(arc, counter)| Node::scalar(arc, StatCounter(statistics.clone(), counter)))
        .collect();
    nodes.push(Node::scalar(
        30,
        EnableAuthenTraps(AtomicI32::new(encode_truthvalue(false))),
    ));
    Node::tree(11, nodes)
}

// sensors, owned by the worker thread

/// Number of named bits in the sensor alarm BITS object.
const ALARM_BITS: u8 = 6;

struct Sensors {
    temperature: AtomicI32,
    alarms: AtomicU32,
}

impl ScalarArrayHandler for Sensors {
    fn get(&self, object: &ScalarObject) -> MibResult<Value> {
        match object.arc {
            1 => Ok(Value::Integer(self.temperature.load(Ordering::Relaxed))),
            2 => Ok(Value::OctetString(encode_bits(
                self.alarms.load(Ordering::Relaxed),
                ALARM_BITS,
            ))),
            _ => Err(MibError::NoSuchInstance),
        }
    }

    fn test_set(&self, object: &ScalarObject, value: &Value) -> MibResult<()> {
        if object.arc != 2 {
            return Err(MibError::NotWritable);
        }
        let bytes = value.as_bytes().ok_or(MibError::WrongType)?;
        if bytes.len() > usize::from(ALARM_BITS).div_ceil(8) {
            return Err(MibError::WrongLength);
        }
        decode_bits(bytes, ALARM_BITS).map(|_| ())
    }

    fn set(&self, _object: &ScalarObject, value: &Value) -> MibResult<()> {
        let bytes = value.as_bytes().ok_or(MibError::WrongType)?;
        self.alarms
            .store(decode_bits(bytes, ALARM_BITS)?, Ordering::Relaxed);
        Ok(())
    }
}

fn sensor_leaf() -> Result<Node> {
    let objects = vec![
        ScalarObject::new(1, Asn1Type::Integer, Access::ReadOnly),
        ScalarObject::new(2, Asn1Type::OctetString, Access::ReadWrite),
    ];
    Node::scalar_array(
        1,
        objects,
        Sensors {
            temperature: AtomicI32::new(41),
            alarms: AtomicU32::new(0b10),
        },
    )
}

/// Base OID and name of each demonstration MIB, for `--list`.
pub fn subtrees() -> Vec<(Oid, &'static str)> {
    vec![
        (oid!(1, 3, 6, 1, 2, 1, 1), "system"),
        (oid!(1, 3, 6, 1, 2, 1, 2), "interfaces"),
        (oid!(1, 3, 6, 1, 2, 1, 11), "snmp"),
        (oid!(1, 3, 6, 1, 4, 1, 32473, 1), "sensors (thread-sync)"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::varbind::VarBind;

    #[test]
    fn test_demo_walk() {
        let demo = build().unwrap();
        let all: Vec<VarBind> = demo
            .registry
            .walk(oid!())
            .collect::<crate::Result<_>>()
            .unwrap();
        // 7 system + ifNumber + 4 rows x 7 columns + 11 snmp + 2 sensors
        assert_eq!(all.len(), 7 + 1 + 28 + 11 + 2);
        assert!(all.windows(2).all(|w| w[0].oid < w[1].oid));
        assert_eq!(
            all.last().unwrap().oid,
            oid!(1, 3, 6, 1, 4, 1, 32473, 1, 2, 0)
        );
        demo.shutdown();
    }

    #[test]
    fn test_demo_writes() {
        let demo = build().unwrap();
        let reg = &demo.registry;

        let sys_name = oid!(1, 3, 6, 1, 2, 1, 1, 5, 0);
        reg.set(&[VarBind::new(sys_name.clone(), Value::from("core-7"))])
            .unwrap();
        assert_eq!(reg.get(&sys_name).unwrap().value, Value::from("core-7"));

        let admin = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 7, 10);
        assert!(reg.set(&[VarBind::new(admin.clone(), Value::Integer(9))]).is_err());
        reg.set(&[VarBind::new(admin.clone(), Value::Integer(2))])
            .unwrap();
        assert_eq!(reg.get(&admin).unwrap().value, Value::Integer(2));

        let alarms = oid!(1, 3, 6, 1, 4, 1, 32473, 1, 2, 0);
        reg.set(&[VarBind::new(
            alarms.clone(),
            Value::OctetString(Bytes::from_static(&[0x84])),
        )])
        .unwrap();
        assert_eq!(
            reg.get(&alarms).unwrap().value,
            Value::OctetString(Bytes::from_static(&[0x84]))
        );

        let traps = oid!(1, 3, 6, 1, 2, 1, 11, 30, 0);
        assert!(reg.set(&[VarBind::new(traps.clone(), Value::Integer(0))]).is_err());
        reg.set(&[VarBind::new(traps.clone(), Value::Integer(1))])
            .unwrap();
        demo.shutdown();
    }
}

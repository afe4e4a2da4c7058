//! Thread-sync proxy leaf.
//!
//! Some leaves can only be touched from one particular thread or task, the
//! one that owns the data behind them. [`ThreadSyncNode::channel`] splits such
//! a leaf in two:
//!
//! - a [`ThreadSyncNode`] that sits in the tree and forwards every resolution
//!   and access as a message;
//! - a [`SyncWorker`] that owns the real leaf and answers those messages on
//!   the owning side, via [`SyncWorker::run`] (async) or
//!   [`SyncWorker::run_blocking`] (a dedicated thread).
//!
//! The proxy side waits for each reply, so it must be called from plain
//! threads. If the worker is gone, resolution fails with
//! `resourceUnavailable` (exact) or finds nothing (next).
//!
//! Instances resolved through the proxy stay live on the worker until the
//! proxy instance is released.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};

use crate::asn1::Asn1Type;
use crate::error::{Error, MibError, MibResult, Result};
use crate::instance::{Access, InstanceAccess, InstanceInfo, NodeInstance, Reference};
use crate::oid::Oid;
use crate::value::Value;

use super::{Leaf, LeafRequest, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolveMode {
    Exact,
    Next,
}

struct RemoteInstance {
    id: u64,
    instance_oid: Oid,
    asn1_type: Asn1Type,
    access: Access,
    reference: Reference,
}

enum SyncRequest {
    Resolve {
        mode: ResolveMode,
        node_oid: Oid,
        instance_oid: Oid,
        reply: oneshot::Sender<MibResult<RemoteInstance>>,
    },
    GetValue {
        id: u64,
        reply: oneshot::Sender<MibResult<Value>>,
    },
    TestSet {
        id: u64,
        value: Value,
        reply: oneshot::Sender<MibResult<()>>,
    },
    SetValue {
        id: u64,
        value: Value,
        reply: oneshot::Sender<MibResult<()>>,
    },
    Release {
        id: u64,
    },
}

/// Tree-side half of a thread-sync leaf.
pub struct ThreadSyncNode {
    tx: mpsc::Sender<SyncRequest>,
}

impl ThreadSyncNode {
    /// Split `leaf` into a proxy and the worker that serves it.
    ///
    /// `depth` bounds the number of requests queued at the worker.
    pub fn channel(leaf: Node, depth: usize) -> (ThreadSyncNode, SyncWorker) {
        let (tx, rx) = mpsc::channel(depth.max(1));
        (ThreadSyncNode { tx }, SyncWorker { leaf, rx })
    }

    /// Returns `true` while the worker is running.
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }

    fn resolve<'m>(
        &'m self,
        req: &LeafRequest<'_, 'm>,
        mode: ResolveMode,
    ) -> Result<MibResult<NodeInstance<'m>>> {
        let instance_oid = Oid::from_slice(req.instance_oid)?;
        let remote = call(&self.tx, |reply| SyncRequest::Resolve {
            mode,
            node_oid: req.node_oid.clone(),
            instance_oid,
            reply,
        })?;
        Ok(remote.map(|remote| {
            req.instance(
                remote.instance_oid,
                remote.asn1_type,
                remote.access,
                RemoteAccess {
                    id: remote.id,
                    tx: &self.tx,
                },
            )
            .with_reference(remote.reference)
        }))
    }
}

impl Leaf for ThreadSyncNode {
    fn resolve_exact<'m>(&'m self, req: &LeafRequest<'_, 'm>) -> MibResult<NodeInstance<'m>> {
        match self.resolve(req, ResolveMode::Exact) {
            Ok(result) => result,
            Err(Error::InvalidOid { .. }) => Err(MibError::NoSuchInstance),
            Err(err) => {
                tracing::warn!(snmp.oid = %req.node_oid, error = %err, "thread-sync resolve failed");
                Err(MibError::ResourceUnavailable)
            }
        }
    }

    fn resolve_next<'m>(&'m self, req: &LeafRequest<'_, 'm>) -> Option<NodeInstance<'m>> {
        match self.resolve(req, ResolveMode::Next) {
            Ok(result) => result.ok(),
            Err(Error::InvalidOid { .. }) => None,
            Err(err) => {
                tracing::warn!(snmp.oid = %req.node_oid, error = %err, "thread-sync resolve failed");
                None
            }
        }
    }
}

/// Send one request and wait for its reply.
fn call<T>(
    tx: &mpsc::Sender<SyncRequest>,
    build: impl FnOnce(oneshot::Sender<T>) -> SyncRequest,
) -> Result<T> {
    let (reply, response) = oneshot::channel();
    tx.blocking_send(build(reply))
        .map_err(|_| Error::SyncDisconnected)?;
    response.blocking_recv().map_err(|_| Error::SyncDisconnected)
}

struct RemoteAccess<'m> {
    id: u64,
    tx: &'m mpsc::Sender<SyncRequest>,
}

impl RemoteAccess<'_> {
    fn call<T>(
        &self,
        info: &InstanceInfo,
        build: impl FnOnce(oneshot::Sender<MibResult<T>>) -> SyncRequest,
    ) -> MibResult<T> {
        call(self.tx, build).unwrap_or_else(|err| {
            tracing::warn!(
                snmp.oid = %info.node_oid,
                snmp.instance = %info.instance_oid,
                error = %err,
                "thread-sync access failed"
            );
            Err(MibError::ResourceUnavailable)
        })
    }
}

impl InstanceAccess for RemoteAccess<'_> {
    fn get_value(&mut self, info: &InstanceInfo) -> MibResult<Value> {
        let id = self.id;
        self.call(info, |reply| SyncRequest::GetValue { id, reply })
    }

    fn test_set(&mut self, info: &InstanceInfo, value: &Value) -> MibResult<()> {
        let id = self.id;
        let value = value.clone();
        self.call(info, |reply| SyncRequest::TestSet { id, value, reply })
    }

    fn set_value(&mut self, info: &InstanceInfo, value: &Value) -> MibResult<()> {
        let id = self.id;
        let value = value.clone();
        self.call(info, |reply| SyncRequest::SetValue { id, value, reply })
    }

    fn release(&mut self, info: &mut InstanceInfo) {
        if self
            .tx
            .blocking_send(SyncRequest::Release { id: self.id })
            .is_err()
        {
            tracing::warn!(
                snmp.oid = %info.node_oid,
                snmp.instance = %info.instance_oid,
                "thread-sync worker gone before release"
            );
        }
    }
}

/// Owning-side half of a thread-sync leaf.
pub struct SyncWorker {
    leaf: Node,
    rx: mpsc::Receiver<SyncRequest>,
}

impl SyncWorker {
    /// Serve requests until every proxy is dropped.
    ///
    /// Returns the number of instances that were never released.
    pub async fn run(self) -> usize {
        let SyncWorker { leaf, mut rx } = self;
        let mut state = WorkerState::new(&leaf);
        while let Some(request) = rx.recv().await {
            state.serve(request);
        }
        state.finish()
    }

    /// Serve requests on the current thread until every proxy is dropped.
    ///
    /// Returns the number of instances that were never released.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async runtime.
    pub fn run_blocking(self) -> usize {
        let SyncWorker { leaf, mut rx } = self;
        let mut state = WorkerState::new(&leaf);
        while let Some(request) = rx.blocking_recv() {
            state.serve(request);
        }
        state.finish()
    }
}

struct WorkerState<'m> {
    leaf: &'m Node,
    live: HashMap<u64, NodeInstance<'m>>,
    next_id: u64,
}

impl<'m> WorkerState<'m> {
    fn new(leaf: &'m Node) -> Self {
        Self {
            leaf,
            live: HashMap::new(),
            next_id: 0,
        }
    }

    fn serve(&mut self, request: SyncRequest) {
        match request {
            SyncRequest::Resolve {
                mode,
                node_oid,
                instance_oid,
                reply,
            } => {
                let result = self.resolve(mode, &node_oid, &instance_oid);
                if let Err(Ok(remote)) = reply.send(result) {
                    // requester gave up; drop its instance here
                    self.live.remove(&remote.id);
                }
            }
            SyncRequest::GetValue { id, reply } => {
                let result = self.with_instance(id, |inst| inst.get_value());
                let _ = reply.send(result);
            }
            SyncRequest::TestSet { id, value, reply } => {
                let result = self.with_instance(id, |inst| inst.validate_write(&value));
                let _ = reply.send(result);
            }
            SyncRequest::SetValue { id, value, reply } => {
                let result = self.with_instance(id, |inst| inst.commit_write(&value));
                let _ = reply.send(result);
            }
            SyncRequest::Release { id } => {
                if self.live.remove(&id).is_none() {
                    tracing::debug!(id, "release of unknown thread-sync instance");
                }
            }
        }
    }

    fn resolve(
        &mut self,
        mode: ResolveMode,
        node_oid: &Oid,
        instance_oid: &Oid,
    ) -> MibResult<RemoteInstance> {
        let leaf = self.leaf.as_leaf().ok_or(MibError::NoSuchObject)?;
        let req = LeafRequest::new(self.leaf, node_oid, instance_oid.arcs());
        let instance = match mode {
            ResolveMode::Exact => leaf.resolve_exact(&req)?,
            ResolveMode::Next => leaf.resolve_next(&req).ok_or(MibError::NoSuchInstance)?,
        };

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let remote = RemoteInstance {
            id,
            instance_oid: instance.instance_oid().clone(),
            asn1_type: instance.asn1_type(),
            access: instance.access(),
            reference: instance.reference().clone(),
        };
        self.live.insert(id, instance);
        Ok(remote)
    }

    fn with_instance<T>(
        &mut self,
        id: u64,
        f: impl FnOnce(&mut NodeInstance<'m>) -> MibResult<T>,
    ) -> MibResult<T> {
        match self.live.get_mut(&id) {
            Some(instance) => f(instance),
            None => {
                tracing::debug!(id, "access to unknown thread-sync instance");
                Err(MibError::ResourceUnavailable)
            }
        }
    }

    fn finish(self) -> usize {
        let leaked = self.live.len();
        if leaked > 0 {
            tracing::debug!(
                count = leaked,
                "thread-sync worker stopping with live instances"
            );
        }
        leaked
    }
}

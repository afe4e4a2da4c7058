//! Scalar array leaf: several scalars below one node, each at `<arc>.0`.

use crate::asn1::Asn1Type;
use crate::error::{Error, MibError, MibResult, Result};
use crate::instance::{Access, InstanceAccess, InstanceInfo, NodeInstance, Reference};
use crate::oid::Oid;
use crate::tracker::NextOidTracker;
use crate::value::Value;

use super::{Leaf, LeafRequest};

/// Definition of one scalar in a [`ScalarArrayNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarObject {
    pub arc: u32,
    pub asn1_type: Asn1Type,
    pub access: Access,
}

impl ScalarObject {
    pub const fn new(arc: u32, asn1_type: Asn1Type, access: Access) -> Self {
        Self {
            arc,
            asn1_type,
            access,
        }
    }
}

/// Value source shared by all objects of a scalar array.
pub trait ScalarArrayHandler: Send + Sync {
    fn get(&self, object: &ScalarObject) -> MibResult<Value>;

    fn test_set(&self, object: &ScalarObject, value: &Value) -> MibResult<()> {
        let _ = (object, value);
        Ok(())
    }

    fn set(&self, object: &ScalarObject, value: &Value) -> MibResult<()> {
        let _ = (object, value);
        Err(MibError::NotWritable)
    }

    fn release(&self, object: &ScalarObject) {
        let _ = object;
    }
}

pub struct ScalarArrayNode {
    objects: Vec<ScalarObject>,
    handler: Box<dyn ScalarArrayHandler>,
}

impl ScalarArrayNode {
    pub(super) fn new(
        arc: u32,
        mut objects: Vec<ScalarObject>,
        handler: impl ScalarArrayHandler + 'static,
    ) -> Result<Self> {
        objects.sort_by_key(|o| o.arc);
        if let Some(dup) = objects.windows(2).find(|w| w[0].arc == w[1].arc) {
            return Err(Error::DuplicateArc {
                parent: arc,
                arc: dup[0].arc,
            });
        }
        Ok(Self {
            objects,
            handler: Box::new(handler),
        })
    }

    pub fn objects(&self) -> &[ScalarObject] {
        &self.objects
    }

    fn object(&self, arc: u32) -> Option<&ScalarObject> {
        self.objects
            .binary_search_by_key(&arc, |o| o.arc)
            .ok()
            .map(|i| &self.objects[i])
    }

    fn instance<'m>(
        &'m self,
        req: &LeafRequest<'_, 'm>,
        object: &'m ScalarObject,
    ) -> NodeInstance<'m> {
        req.instance(
            Oid::from_literal(&[object.arc, 0]),
            object.asn1_type,
            object.access,
            ScalarArrayAccess {
                object,
                handler: self.handler.as_ref(),
            },
        )
        .with_reference(Reference::U32(object.arc))
    }
}

impl Leaf for ScalarArrayNode {
    fn resolve_exact<'m>(&'m self, req: &LeafRequest<'_, 'm>) -> MibResult<NodeInstance<'m>> {
        match req.instance_oid {
            [arc, 0] => self
                .object(*arc)
                .map(|object| self.instance(req, object))
                .ok_or(MibError::NoSuchInstance),
            _ => Err(MibError::NoSuchInstance),
        }
    }

    fn resolve_next<'m>(&'m self, req: &LeafRequest<'_, 'm>) -> Option<NodeInstance<'m>> {
        let mut tracker = NextOidTracker::from_arcs(req.instance_oid, 2);
        for object in &self.objects {
            let candidate = [object.arc, 0];
            if !tracker.precheck(&candidate) {
                continue;
            }
            tracker.check(&candidate, object);
        }
        tracker
            .reference()
            .copied()
            .map(|object| self.instance(req, object))
    }
}

struct ScalarArrayAccess<'m> {
    object: &'m ScalarObject,
    handler: &'m dyn ScalarArrayHandler,
}

impl InstanceAccess for ScalarArrayAccess<'_> {
    fn get_value(&mut self, _info: &InstanceInfo) -> MibResult<Value> {
        self.handler.get(self.object)
    }

    fn test_set(&mut self, _info: &InstanceInfo, value: &Value) -> MibResult<()> {
        self.handler.test_set(self.object, value)
    }

    fn set_value(&mut self, _info: &InstanceInfo, value: &Value) -> MibResult<()> {
        self.handler.set(self.object, value)
    }

    fn release(&mut self, _info: &mut InstanceInfo) {
        self.handler.release(self.object);
    }
}

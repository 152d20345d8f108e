//! Network graph model
//!
//! An arena of ensembles, nodes, networks and connections addressed by typed
//! handles. Handle equality is entity identity: two objects with the same
//! label are still different entities.

mod loader;

use serde::Serialize;

use crate::types::{ConnectionId, EntityRef, ObjectId, ObjectKind, SyncError, SyncResult};

pub use loader::{demo_model, LoadedModel, ModelSpec, NetworkSpec, ObjectSpec};

/// Children owned directly by a network, in enumeration order
#[derive(Debug, Clone, Default)]
pub struct Contents {
    pub ensembles: Vec<ObjectId>,
    pub nodes: Vec<ObjectId>,
    pub networks: Vec<ObjectId>,
    pub connections: Vec<ConnectionId>,
}

impl Contents {
    /// Objects in emission order: ensembles, then nodes, then networks
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.ensembles
            .iter()
            .chain(self.nodes.iter())
            .chain(self.networks.iter())
            .copied()
    }
}

/// An ensemble, node or network
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub kind: ObjectKind,
    pub label: Option<String>,
    pub parent: Option<ObjectId>,
    /// Present only for networks
    pub contents: Option<Contents>,
}

/// A directed connection between two objects
#[derive(Debug, Clone)]
pub struct ConnectionData {
    pub pre: ObjectId,
    pub post: ObjectId,
    pub parent: ObjectId,
}

/// Object counts reported by the HTTP API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelStats {
    pub label: String,
    pub ensembles: usize,
    pub nodes: usize,
    pub networks: usize,
    pub connections: usize,
}

/// Nested network graph with a single root network
#[derive(Debug, Clone)]
pub struct Model {
    objects: Vec<ObjectData>,
    connections: Vec<ConnectionData>,
}

impl Model {
    /// Create a model whose root network carries `label`
    pub fn new(label: impl Into<String>) -> Self {
        let root = ObjectData {
            kind: ObjectKind::Network,
            label: Some(label.into()),
            parent: None,
            contents: Some(Contents::default()),
        };
        Self {
            objects: vec![root],
            connections: Vec::new(),
        }
    }

    /// The top-level network
    pub fn root(&self) -> ObjectId {
        ObjectId::new(0)
    }

    pub fn add_ensemble(
        &mut self,
        parent: ObjectId,
        label: impl Into<String>,
    ) -> SyncResult<ObjectId> {
        self.add_object(parent, ObjectKind::Ensemble, Some(label.into()))
    }

    pub fn add_node(
        &mut self,
        parent: ObjectId,
        label: impl Into<String>,
    ) -> SyncResult<ObjectId> {
        self.add_object(parent, ObjectKind::Node, Some(label.into()))
    }

    pub fn add_network(
        &mut self,
        parent: ObjectId,
        label: impl Into<String>,
    ) -> SyncResult<ObjectId> {
        self.add_object(parent, ObjectKind::Network, Some(label.into()))
    }

    /// Add an object of any kind; `None` gives it the kind's default label
    pub fn add_object(
        &mut self,
        parent: ObjectId,
        kind: ObjectKind,
        label: Option<String>,
    ) -> SyncResult<ObjectId> {
        self.require_network(parent)?;

        let id = ObjectId::new(self.objects.len());
        self.objects.push(ObjectData {
            kind,
            label,
            parent: Some(parent),
            contents: kind.is_container().then(Contents::default),
        });

        let contents = self.contents_mut(parent)?;
        match kind {
            ObjectKind::Ensemble => contents.ensembles.push(id),
            ObjectKind::Node => contents.nodes.push(id),
            ObjectKind::Network => contents.networks.push(id),
        }
        Ok(id)
    }

    /// Connect `pre` to `post`, owned by the network `parent`
    pub fn connect(
        &mut self,
        parent: ObjectId,
        pre: ObjectId,
        post: ObjectId,
    ) -> SyncResult<ConnectionId> {
        self.require_network(parent)?;
        for endpoint in [pre, post] {
            if self.object(endpoint).is_none() {
                return Err(SyncError::Model(format!(
                    "connection endpoint #{} does not exist",
                    endpoint.index()
                )));
            }
        }

        let id = ConnectionId::new(self.connections.len());
        self.connections.push(ConnectionData { pre, post, parent });
        self.contents_mut(parent)?.connections.push(id);
        Ok(id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectData> {
        self.objects.get(id.index())
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&ConnectionData> {
        self.connections.get(id.token())
    }

    /// Direct children of a network, or `None` for leaves
    pub fn contents(&self, id: ObjectId) -> Option<&Contents> {
        self.object(id).and_then(|o| o.contents.as_ref())
    }

    /// Human-readable label, falling back to the kind's default
    pub fn label(&self, id: ObjectId) -> String {
        match self.object(id) {
            Some(ObjectData { label: Some(label), .. }) => label.clone(),
            Some(object) => object.kind.default_label().to_string(),
            None => String::new(),
        }
    }

    /// Whether the entity is a network that can be expanded
    pub fn is_container(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Object(id) => self.contents(id).is_some(),
            EntityRef::Connection(_) => false,
        }
    }

    /// Count objects by kind; the root network is not counted
    pub fn stats(&self) -> ModelStats {
        let mut stats = ModelStats {
            label: self.label(self.root()),
            connections: self.connections.len(),
            ..ModelStats::default()
        };
        for object in self.objects.iter().skip(1) {
            match object.kind {
                ObjectKind::Ensemble => stats.ensembles += 1,
                ObjectKind::Node => stats.nodes += 1,
                ObjectKind::Network => stats.networks += 1,
            }
        }
        stats
    }

    fn require_network(&self, id: ObjectId) -> SyncResult<()> {
        match self.object(id) {
            Some(object) if object.kind.is_container() => Ok(()),
            Some(_) => Err(SyncError::Model(format!(
                "object #{} is not a network",
                id.index()
            ))),
            None => Err(SyncError::Model(format!(
                "object #{} does not exist",
                id.index()
            ))),
        }
    }

    fn contents_mut(&mut self, id: ObjectId) -> SyncResult<&mut Contents> {
        self.objects
            .get_mut(id.index())
            .and_then(|o| o.contents.as_mut())
            .ok_or_else(|| SyncError::Model(format!("object #{} is not a network", id.index())))
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new("model")
    }
}

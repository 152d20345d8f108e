//! Model description files
//!
//! A model file is a JSON document describing the root network. Objects are
//! named locally; connections refer to their endpoints by dotted path from
//! the root (`"b.c"` is object `c` inside network `b`) and are owned by the
//! network that declares them.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Model;
use crate::types::{ObjectId, ObjectKind, SyncError, SyncResult, VisualAttributes};

/// An ensemble or node declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub attributes: VisualAttributes,
}

/// A connection declaration; endpoints are dotted paths from the root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub pre: String,
    pub post: String,
}

/// A network declaration with its children
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Local name; optional only for the root
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub attributes: VisualAttributes,
    #[serde(default)]
    pub ensembles: Vec<ObjectSpec>,
    #[serde(default)]
    pub nodes: Vec<ObjectSpec>,
    #[serde(default)]
    pub networks: Vec<NetworkSpec>,
    #[serde(default)]
    pub connections: Vec<ConnectionSpec>,
}

/// A model file is the description of its root network
pub type ModelSpec = NetworkSpec;

/// A model together with the visual overrides its file configured
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub model: Model,
    pub attributes: Vec<(ObjectId, VisualAttributes)>,
}

impl LoadedModel {
    /// Load a model description from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a model description from JSON text
    pub fn from_json(text: &str) -> SyncResult<Self> {
        let spec: ModelSpec = serde_json::from_str(text)?;
        Self::from_spec(&spec)
    }

    /// Build a model from an already parsed description
    pub fn from_spec(spec: &ModelSpec) -> SyncResult<Self> {
        let label = spec
            .label
            .clone()
            .filter(|l| !l.is_empty())
            .or_else(|| Some(spec.name.clone()).filter(|n| !n.is_empty()))
            .unwrap_or_else(|| "model".to_string());

        let mut builder = Builder {
            model: Model::new(label),
            paths: HashMap::new(),
            attributes: Vec::new(),
            pending: Vec::new(),
        };
        let root = builder.model.root();
        if !spec.attributes.is_unset() {
            builder.attributes.push((root, spec.attributes));
        }
        builder.add_children(root, "", spec)?;
        builder.finish()
    }
}

struct Builder {
    model: Model,
    paths: HashMap<String, ObjectId>,
    attributes: Vec<(ObjectId, VisualAttributes)>,
    pending: Vec<(ObjectId, ConnectionSpec)>,
}

impl Builder {
    fn add_children(
        &mut self,
        network: ObjectId,
        prefix: &str,
        spec: &NetworkSpec,
    ) -> SyncResult<()> {
        for ensemble in &spec.ensembles {
            self.add_leaf(network, prefix, ObjectKind::Ensemble, ensemble)?;
        }
        for node in &spec.nodes {
            self.add_leaf(network, prefix, ObjectKind::Node, node)?;
        }
        for child in &spec.networks {
            let label = child.label.clone().unwrap_or_else(|| child.name.clone());
            let id = self.register(
                network,
                prefix,
                ObjectKind::Network,
                &child.name,
                label,
                child.attributes,
            )?;
            let child_prefix = join_path(prefix, &child.name);
            self.add_children(id, &child_prefix, child)?;
        }
        // Endpoints may be declared later in the file, resolve once all objects exist
        for connection in &spec.connections {
            self.pending.push((network, connection.clone()));
        }
        Ok(())
    }

    fn add_leaf(
        &mut self,
        network: ObjectId,
        prefix: &str,
        kind: ObjectKind,
        spec: &ObjectSpec,
    ) -> SyncResult<ObjectId> {
        let label = spec.label.clone().unwrap_or_else(|| spec.name.clone());
        self.register(network, prefix, kind, &spec.name, label, spec.attributes)
    }

    fn register(
        &mut self,
        network: ObjectId,
        prefix: &str,
        kind: ObjectKind,
        name: &str,
        label: String,
        attributes: VisualAttributes,
    ) -> SyncResult<ObjectId> {
        if name.is_empty() || name.contains('.') {
            return Err(SyncError::Model(format!(
                "invalid object name {:?} in network {:?}",
                name, prefix
            )));
        }
        let path = join_path(prefix, name);
        if self.paths.contains_key(&path) {
            return Err(SyncError::Model(format!("duplicate object path {:?}", path)));
        }

        let label = if label.is_empty() { None } else { Some(label) };
        let id = self.model.add_object(network, kind, label)?;
        self.paths.insert(path, id);
        if !attributes.is_unset() {
            self.attributes.push((id, attributes));
        }
        Ok(id)
    }

    fn resolve(&self, path: &str) -> SyncResult<ObjectId> {
        self.paths
            .get(path)
            .copied()
            .ok_or_else(|| SyncError::Model(format!("unknown connection endpoint {:?}", path)))
    }

    fn finish(mut self) -> SyncResult<LoadedModel> {
        let pending = std::mem::take(&mut self.pending);
        for (owner, connection) in pending {
            let pre = self.resolve(&connection.pre)?;
            let post = self.resolve(&connection.post)?;
            self.model.connect(owner, pre, post)?;
        }
        Ok(LoadedModel {
            model: self.model,
            attributes: self.attributes,
        })
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Small model served when no model file is configured
pub fn demo_model() -> SyncResult<LoadedModel> {
    let mut model = Model::new("demo");
    let root = model.root();

    let stimulus = model.add_node(root, "stimulus")?;
    let sensory = model.add_ensemble(root, "sensory")?;
    let memory = model.add_network(root, "memory")?;
    let state = model.add_ensemble(memory, "state")?;
    let gate = model.add_node(memory, "gate")?;
    let motor = model.add_network(root, "motor")?;
    let output = model.add_ensemble(motor, "output")?;

    model.connect(root, stimulus, sensory)?;
    model.connect(memory, sensory, state)?;
    model.connect(memory, gate, state)?;
    model.connect(memory, state, state)?;
    model.connect(motor, state, output)?;

    let attributes = vec![
        (stimulus, VisualAttributes::placed((0.1, 0.5), (0.05, 0.05))),
        (memory, VisualAttributes::placed((0.5, 0.5), (0.2, 0.2))),
    ];
    Ok(LoadedModel { model, attributes })
}

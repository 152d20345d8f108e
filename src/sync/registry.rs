//! Identity registry
//!
//! Mints client-visible UIDs for model entities and maps them back. Object
//! UIDs come from the sanitized label; connection UIDs from the connection's
//! identity token (`conn_<token>`). Any clash gets a numeric suffix, so two
//! entities never share a UID even when their labels collide.

use std::collections::HashMap;

use crate::model::Model;
use crate::types::{EntityRef, SyncError, SyncResult};

/// Prefix of every connection UID
pub const CONNECTION_PREFIX: &str = "conn_";

/// Bidirectional entity <-> UID map for one session
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    uids: HashMap<EntityRef, String>,
    entities: HashMap<String, EntityRef>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entity's UID, minting and registering one on first use
    pub fn assign_or_lookup(&mut self, model: &Model, entity: EntityRef) -> String {
        if let Some(uid) = self.uids.get(&entity) {
            return uid.clone();
        }

        let base = match entity {
            EntityRef::Object(id) => {
                let base = sanitize(&model.label(id));
                if base.is_empty() {
                    model
                        .object(id)
                        .map(|o| o.kind.as_str().to_string())
                        .unwrap_or_else(|| "obj".to_string())
                } else {
                    base
                }
            }
            EntityRef::Connection(id) => format!("{}{}", CONNECTION_PREFIX, id.token()),
        };

        let uid = self.disambiguate(base);
        self.uids.insert(entity, uid.clone());
        self.entities.insert(uid.clone(), entity);
        uid
    }

    /// UID already assigned to the entity, if any
    pub fn lookup(&self, entity: EntityRef) -> Option<&str> {
        self.uids.get(&entity).map(String::as_str)
    }

    /// Entity a UID was assigned to
    pub fn resolve(&self, uid: &str) -> SyncResult<EntityRef> {
        self.entities
            .get(uid)
            .copied()
            .ok_or_else(|| SyncError::UnknownUid(uid.to_string()))
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.uids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }

    fn disambiguate(&self, base: String) -> String {
        if !self.entities.contains_key(&base) {
            return base;
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{}_{}", base, suffix);
            if !self.entities.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Reduce a label to `[A-Za-z0-9_]`, mapping everything else to `_`
fn sanitize(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObjectKind;

    fn sample() -> (Model, Vec<EntityRef>) {
        let mut model = Model::new("root");
        let root = model.root();
        let a = model.add_node(root, "A").unwrap();
        let b = model.add_network(root, "B").unwrap();
        let conn = model.connect(root, a, b).unwrap();
        (model, vec![a.into(), b.into(), conn.into()])
    }

    #[test]
    fn test_repeated_lookup_is_stable() {
        let (model, entities) = sample();
        let mut registry = IdentityRegistry::new();

        for entity in &entities {
            let first = registry.assign_or_lookup(&model, *entity);
            let second = registry.assign_or_lookup(&model, *entity);
            assert_eq!(first, second);
        }
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_uids_follow_labels_and_tokens() {
        let (model, entities) = sample();
        let mut registry = IdentityRegistry::new();

        assert_eq!(registry.assign_or_lookup(&model, entities[0]), "A");
        assert_eq!(registry.assign_or_lookup(&model, entities[1]), "B");
        assert_eq!(registry.assign_or_lookup(&model, entities[2]), "conn_0");
    }

    #[test]
    fn test_colliding_labels_are_disambiguated() {
        let mut model = Model::new("root");
        let root = model.root();
        let first = model.add_ensemble(root, "layer 1").unwrap();
        let second = model.add_ensemble(root, "layer-1").unwrap();
        let third = model.add_node(root, "layer_1").unwrap();
        let mut registry = IdentityRegistry::new();

        let uids: Vec<String> = [first, second, third]
            .into_iter()
            .map(|id| registry.assign_or_lookup(&model, id.into()))
            .collect();

        assert_eq!(uids, vec!["layer_1", "layer_1_2", "layer_1_3"]);
        assert_eq!(registry.resolve("layer_1_2").unwrap(), EntityRef::Object(second));
    }

    #[test]
    fn test_label_cannot_steal_connection_uid() {
        let mut model = Model::new("root");
        let root = model.root();
        let impostor = model.add_node(root, "conn_0").unwrap();
        let conn = model.connect(root, impostor, impostor).unwrap();
        let mut registry = IdentityRegistry::new();

        assert_eq!(registry.assign_or_lookup(&model, impostor.into()), "conn_0");
        assert_eq!(registry.assign_or_lookup(&model, conn.into()), "conn_0_2");
    }

    #[test]
    fn test_blank_label_falls_back_to_kind() {
        let mut model = Model::new("root");
        let root = model.root();
        let blank = model
            .add_object(root, ObjectKind::Network, Some("   ".to_string()))
            .unwrap();
        let mut registry = IdentityRegistry::new();

        assert_eq!(registry.assign_or_lookup(&model, blank.into()), "net");
    }

    #[test]
    fn test_resolve_unknown_uid() {
        let registry = IdentityRegistry::new();
        assert!(matches!(
            registry.resolve("does-not-exist"),
            Err(SyncError::UnknownUid(uid)) if uid == "does-not-exist"
        ));
    }
}

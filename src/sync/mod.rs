//! Graph synchronizer
//!
//! Expands one queued network per tick, emitting a creation message for each
//! direct child object and then one message per direct connection. Client
//! commands feed the queue and the attribute store.
//!
//! The registry, attribute store and queue are owned here and never shared;
//! [`SyncSession`] puts the whole synchronizer behind one lock so ticks and
//! commands never interleave.

mod attributes;
mod channel;
mod queue;
mod registry;
mod session;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;

use crate::model::Model;
use crate::protocol::{
    ClientCommand, ConnectionCreated, ConnectionTag, ObjectCreated, OutboundMessage,
};
use crate::types::{ConnectionId, EntityRef, ObjectId, SyncError, SyncResult};

pub use attributes::{default_position, AttributeStore};
pub use channel::MessageChannel;
pub use queue::ExpansionQueue;
pub use registry::{IdentityRegistry, CONNECTION_PREFIX};
pub use session::SyncSession;

/// Per-session expansion engine
pub struct GraphSynchronizer {
    model: Arc<Model>,
    registry: IdentityRegistry,
    attributes: AttributeStore,
    queue: ExpansionQueue,
    rng: Box<dyn RngCore + Send>,
}

impl GraphSynchronizer {
    /// Create a synchronizer with the root network already queued
    pub fn new(model: Arc<Model>) -> Self {
        Self::with_rng(model, StdRng::from_entropy())
    }

    /// Create a synchronizer drawing default positions from `rng`
    pub fn with_rng<R>(model: Arc<Model>, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        let mut queue = ExpansionQueue::new();
        queue.enqueue(model.root());

        Self {
            model,
            registry: IdentityRegistry::new(),
            attributes: AttributeStore::new(),
            queue,
            rng: Box::new(rng),
        }
    }

    /// Replace the attribute store, e.g. with configured overrides.
    ///
    /// Networks configured as expanded are queued after the root, parents
    /// before children. A network is only queued when every ancestor is
    /// queued too, so the client always has its creation message first.
    pub fn with_attributes(mut self, attributes: AttributeStore) -> Self {
        self.attributes = attributes;
        self.queue_configured_expansions();
        self
    }

    fn queue_configured_expansions(&mut self) {
        let mut frontier = vec![self.model.root()];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for network in frontier {
                let Some(contents) = self.model.contents(network) else {
                    continue;
                };
                for &child in &contents.networks {
                    if self.attributes.get(child).expanded {
                        self.queue.enqueue(child);
                        next.push(child);
                    }
                }
            }
            frontier = next;
        }
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Number of containers waiting to be expanded
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Expand the next queued container, if any.
    ///
    /// Returns the number of messages written.
    pub fn tick<C>(&mut self, channel: &mut C) -> SyncResult<usize>
    where
        C: MessageChannel + ?Sized,
    {
        match self.queue.dequeue_next() {
            Some(container) => self.expand(container, channel),
            None => Ok(0),
        }
    }

    /// Emit every direct child of `container`, then mark it expanded
    fn expand<C>(&mut self, container: ObjectId, channel: &mut C) -> SyncResult<usize>
    where
        C: MessageChannel + ?Sized,
    {
        let model = Arc::clone(&self.model);
        let contents = model.contents(container).ok_or_else(|| {
            SyncError::NotAContainer(format!("object #{}", container.index()))
        })?;

        let parent = if container == model.root() {
            None
        } else {
            Some(self.registry.assign_or_lookup(&model, container.into()))
        };

        let mut written = 0;
        for object in contents.objects() {
            let message = self.object_message(object, parent.clone())?;
            self.send(channel, &message)?;
            written += 1;
        }
        for &connection in &contents.connections {
            let message = self.connection_message(connection, parent.clone())?;
            self.send(channel, &message)?;
            written += 1;
        }

        self.attributes.set_expanded(container);
        debug!(
            container = parent.as_deref().unwrap_or("<root>"),
            messages = written,
            registered = self.registry.len(),
            "Expanded network"
        );
        Ok(written)
    }

    fn object_message(
        &mut self,
        object: ObjectId,
        parent: Option<String>,
    ) -> SyncResult<OutboundMessage> {
        let kind = match self.model.object(object) {
            Some(data) => data.kind,
            None => {
                return Err(SyncError::Model(format!(
                    "object #{} does not exist",
                    object.index()
                )))
            }
        };
        let uid = self.registry.assign_or_lookup(&self.model, object.into());
        let (pos, size) = self.attributes.placement(object, &mut *self.rng);

        Ok(OutboundMessage::Object(ObjectCreated {
            uid,
            label: self.model.label(object),
            pos: [pos.0, pos.1],
            size: [size.0, size.1],
            kind,
            parent,
        }))
    }

    fn connection_message(
        &mut self,
        connection: ConnectionId,
        parent: Option<String>,
    ) -> SyncResult<OutboundMessage> {
        let data = self.model.connection(connection).cloned().ok_or_else(|| {
            SyncError::Model(format!("connection #{} does not exist", connection.token()))
        })?;
        let uid = self.registry.assign_or_lookup(&self.model, connection.into());
        let pre = self.registry.assign_or_lookup(&self.model, data.pre.into());
        let post = self.registry.assign_or_lookup(&self.model, data.post.into());

        Ok(OutboundMessage::Connection(ConnectionCreated {
            uid,
            pre,
            post,
            kind: ConnectionTag::Conn,
            parent,
        }))
    }

    fn send<C>(&self, channel: &mut C, message: &OutboundMessage) -> SyncResult<()>
    where
        C: MessageChannel + ?Sized,
    {
        channel.write(serde_json::to_string(message)?)
    }

    /// Parse and apply one client text frame
    pub fn handle_command(&mut self, text: &str) -> SyncResult<()> {
        let command = ClientCommand::parse(text)?;
        self.apply(command)
    }

    /// Apply an already parsed command
    pub fn apply(&mut self, command: ClientCommand) -> SyncResult<()> {
        match command {
            ClientCommand::Expand { uid } => self.act_expand(&uid),
            ClientCommand::Collapse { uid } | ClientCommand::AutoCollapse { uid } => {
                self.act_collapse(&uid)
            }
            ClientCommand::PosSize {
                uid,
                x,
                y,
                width,
                height,
            } => self.act_pos_size(&uid, (x, y), (width, height)),
        }
    }

    fn act_expand(&mut self, uid: &str) -> SyncResult<()> {
        let container = self.resolve_container(uid)?;
        self.queue.enqueue(container);
        debug!(uid, pending = self.queue.len(), "Queued network for expansion");
        Ok(())
    }

    fn act_collapse(&mut self, uid: &str) -> SyncResult<()> {
        let container = self.resolve_container(uid)?;
        self.attributes.set_collapsed(container);
        debug!(uid, "Collapsed network");
        Ok(())
    }

    fn act_pos_size(&mut self, uid: &str, pos: (f64, f64), size: (f64, f64)) -> SyncResult<()> {
        match self.registry.resolve(uid)? {
            EntityRef::Object(object) => {
                self.attributes.set_pos_size(object, pos, size);
                Ok(())
            }
            EntityRef::Connection(_) => Err(SyncError::NoGeometry(uid.to_string())),
        }
    }

    fn resolve_container(&self, uid: &str) -> SyncResult<ObjectId> {
        match self.registry.resolve(uid)? {
            EntityRef::Object(object) if self.model.is_container(object.into()) => Ok(object),
            _ => Err(SyncError::NotAContainer(uid.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ObjectKind, VisualAttributes, DEFAULT_SIZE};

    struct Scenario {
        model: Arc<Model>,
        a: ObjectId,
        b: ObjectId,
        c: ObjectId,
    }

    /// Root holds node A and network B; B holds node C and owns A -> C
    fn scenario() -> Scenario {
        let mut model = Model::new("root");
        let root = model.root();
        let a = model.add_node(root, "A").unwrap();
        let b = model.add_network(root, "B").unwrap();
        let c = model.add_node(b, "C").unwrap();
        model.connect(b, a, c).unwrap();
        Scenario {
            model: Arc::new(model),
            a,
            b,
            c,
        }
    }

    fn synchronizer(model: &Arc<Model>) -> GraphSynchronizer {
        GraphSynchronizer::with_rng(Arc::clone(model), StdRng::seed_from_u64(42))
    }

    fn parse(outbox: &[String]) -> Vec<OutboundMessage> {
        outbox
            .iter()
            .map(|m| serde_json::from_str(m).unwrap())
            .collect()
    }

    #[test]
    fn test_first_tick_expands_root_only() {
        let s = scenario();
        let mut sync = synchronizer(&s.model);
        let mut outbox: Vec<String> = Vec::new();

        assert_eq!(sync.tick(&mut outbox).unwrap(), 2);

        let messages = parse(&outbox);
        assert_eq!(messages[0].uid(), "A");
        assert_eq!(messages[1].uid(), "B");
        assert!(messages.iter().all(|m| m.parent().is_none()));
        assert!(messages.iter().all(|m| !m.is_connection()));
        assert!(sync.attributes().get(s.model.root()).expanded);
        assert!(sync.registry().lookup(s.c.into()).is_none());
        assert_eq!(sync.pending(), 0);
    }

    #[test]
    fn test_tick_on_empty_queue_is_noop() {
        let s = scenario();
        let mut sync = synchronizer(&s.model);
        let mut outbox: Vec<String> = Vec::new();

        sync.tick(&mut outbox).unwrap();
        outbox.clear();

        assert_eq!(sync.tick(&mut outbox).unwrap(), 0);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_expand_command_emits_children_then_connection() {
        let s = scenario();
        let mut sync = synchronizer(&s.model);
        let mut outbox: Vec<String> = Vec::new();
        sync.tick(&mut outbox).unwrap();
        outbox.clear();

        sync.handle_command(r#"{"act":"expand","uid":"B"}"#).unwrap();
        assert_eq!(sync.pending(), 1);
        sync.tick(&mut outbox).unwrap();

        let messages = parse(&outbox);
        assert_eq!(messages.len(), 2);
        match &messages[0] {
            OutboundMessage::Object(o) => {
                assert_eq!(o.uid, "C");
                assert_eq!(o.kind, ObjectKind::Node);
                assert_eq!(o.parent.as_deref(), Some("B"));
                assert_eq!(o.size, [DEFAULT_SIZE.0, DEFAULT_SIZE.1]);
            }
            other => panic!("expected object, got {:?}", other),
        }
        match &messages[1] {
            OutboundMessage::Connection(c) => {
                assert_eq!(c.pre, "A");
                assert_eq!(c.post, "C");
                assert_eq!(c.parent.as_deref(), Some("B"));
                assert!(c.uid.starts_with(CONNECTION_PREFIX));
            }
            other => panic!("expected connection, got {:?}", other),
        }
        assert!(sync.attributes().get(s.b).expanded);
    }

    #[test]
    fn test_unknown_uid_emits_nothing() {
        let s = scenario();
        let mut sync = synchronizer(&s.model);
        let mut outbox: Vec<String> = Vec::new();
        sync.tick(&mut outbox).unwrap();
        outbox.clear();

        let err = sync
            .handle_command(r#"{"act":"expand","uid":"does-not-exist"}"#)
            .unwrap_err();
        assert!(matches!(err, SyncError::UnknownUid(_)));
        assert_eq!(sync.tick(&mut outbox).unwrap(), 0);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_expanding_a_leaf_is_rejected() {
        let s = scenario();
        let mut sync = synchronizer(&s.model);
        sync.tick(&mut Vec::<String>::new()).unwrap();

        let err = sync.handle_command(r#"{"act":"expand","uid":"A"}"#).unwrap_err();
        assert!(matches!(err, SyncError::NotAContainer(_)));
        assert_eq!(sync.pending(), 0);
    }

    #[test]
    fn test_reexpansion_reemits_with_stable_uids() {
        let s = scenario();
        let mut sync = synchronizer(&s.model);
        sync.tick(&mut Vec::<String>::new()).unwrap();

        sync.handle_command(r#"{"act":"expand","uid":"B"}"#).unwrap();
        sync.handle_command(r#"{"act":"expand","uid":"B"}"#).unwrap();
        let mut first: Vec<String> = Vec::new();
        let mut second: Vec<String> = Vec::new();
        sync.tick(&mut first).unwrap();
        sync.tick(&mut second).unwrap();

        let uids = |outbox: &[String]| -> Vec<String> {
            parse(outbox).iter().map(|m| m.uid().to_string()).collect()
        };
        assert_eq!(uids(&first), uids(&second));
    }

    #[test]
    fn test_collapse_clears_expanded_flag() {
        let s = scenario();
        let mut sync = synchronizer(&s.model);
        sync.tick(&mut Vec::<String>::new()).unwrap();
        sync.handle_command(r#"{"act":"expand","uid":"B"}"#).unwrap();
        sync.tick(&mut Vec::<String>::new()).unwrap();

        sync.handle_command(r#"{"act":"collapse","uid":"B"}"#).unwrap();
        assert!(!sync.attributes().get(s.b).expanded);
    }

    #[test]
    fn test_pos_size_is_used_on_reemission() {
        let s = scenario();
        let mut sync = synchronizer(&s.model);
        sync.tick(&mut Vec::<String>::new()).unwrap();

        sync.handle_command(
            r#"{"act":"posSize","uid":"A","x":0.3,"y":0.6,"width":0.1,"height":0.2}"#,
        )
        .unwrap();
        sync.queue.enqueue(s.model.root());
        let mut outbox: Vec<String> = Vec::new();
        sync.tick(&mut outbox).unwrap();

        match &parse(&outbox)[0] {
            OutboundMessage::Object(o) => {
                assert_eq!(o.uid, "A");
                assert_eq!(o.pos, [0.3, 0.6]);
                assert_eq!(o.size, [0.1, 0.2]);
            }
            other => panic!("expected object, got {:?}", other),
        }
        assert_eq!(sync.attributes().get(s.a).pos, Some((0.3, 0.6)));
    }

    #[test]
    fn test_pos_size_on_connection_is_rejected() {
        let s = scenario();
        let mut sync = synchronizer(&s.model);
        sync.tick(&mut Vec::<String>::new()).unwrap();
        sync.handle_command(r#"{"act":"expand","uid":"B"}"#).unwrap();
        sync.tick(&mut Vec::<String>::new()).unwrap();

        let err = sync
            .handle_command(r#"{"act":"posSize","uid":"conn_0","x":0,"y":0,"width":1,"height":1}"#)
            .unwrap_err();
        assert!(matches!(err, SyncError::NoGeometry(_)));
    }

    #[test]
    fn test_configured_attributes_are_emitted() {
        let s = scenario();
        let overrides = AttributeStore::from_overrides([(
            s.b,
            VisualAttributes::placed((0.9, 0.1), (0.5, 0.5)),
        )]);
        let mut sync = synchronizer(&s.model).with_attributes(overrides);
        let mut outbox: Vec<String> = Vec::new();
        sync.tick(&mut outbox).unwrap();

        match &parse(&outbox)[1] {
            OutboundMessage::Object(o) => {
                assert_eq!(o.kind, ObjectKind::Network);
                assert_eq!(o.pos, [0.9, 0.1]);
                assert_eq!(o.size, [0.5, 0.5]);
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_closed_channel_surfaces_error() {
        let s = scenario();
        let mut sync = synchronizer(&s.model);
        let (mut tx, rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        drop(rx);

        let err = sync.tick(&mut tx).unwrap_err();
        assert!(matches!(err, SyncError::ChannelWrite(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_configured_expanded_networks_are_queued() {
        let mut model = Model::new("root");
        let root = model.root();
        let outer = model.add_network(root, "outer").unwrap();
        let inner = model.add_network(outer, "inner").unwrap();
        model.add_node(inner, "leaf").unwrap();
        let hidden = model.add_network(root, "hidden").unwrap();
        let orphan = model.add_network(hidden, "orphan").unwrap();
        let model = Arc::new(model);

        let expanded = VisualAttributes {
            expanded: true,
            ..VisualAttributes::default()
        };
        let overrides = AttributeStore::from_overrides([
            (outer, expanded),
            (inner, expanded),
            (orphan, expanded),
        ]);
        let mut sync = synchronizer(&model).with_attributes(overrides);

        // root, outer, inner; orphan waits because "hidden" is collapsed
        assert_eq!(sync.pending(), 3);

        let mut outbox: Vec<String> = Vec::new();
        while sync.pending() > 0 {
            sync.tick(&mut outbox).unwrap();
        }
        let parents: Vec<Option<String>> = parse(&outbox)
            .iter()
            .map(|m| m.parent().map(str::to_string))
            .collect();
        assert_eq!(
            parents,
            vec![
                None,
                None,
                Some("outer".to_string()),
                Some("inner".to_string())
            ]
        );
    }

    #[test]
    fn test_auto_collapse_clears_expanded_flag() {
        let s = scenario();
        let mut sync = synchronizer(&s.model);
        sync.tick(&mut Vec::<String>::new()).unwrap();
        sync.handle_command(r#"{"act":"expand","uid":"B"}"#).unwrap();
        sync.tick(&mut Vec::<String>::new()).unwrap();
        assert!(sync.attributes().get(s.b).expanded);

        sync.handle_command(r#"{"act":"autoCollapse","uid":"B"}"#).unwrap();
        assert!(!sync.attributes().get(s.b).expanded);
    }

    #[test]
    fn test_missing_entities_are_reported_as_model_errors() {
        let s = scenario();
        let mut sync = synchronizer(&s.model);

        assert!(matches!(
            sync.object_message(ObjectId::new(99), None),
            Err(SyncError::Model(_))
        ));
        assert!(matches!(
            sync.connection_message(ConnectionId::new(99), None),
            Err(SyncError::Model(_))
        ));
        assert!(sync.registry().is_empty());
    }
}

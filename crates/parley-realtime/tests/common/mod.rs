//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use parley_core::config::RealtimeConfig;
use parley_core::traits::{IdentityService, MembershipService, VerifiedIdentity};
use parley_core::types::{ChannelId, ConversationId, OccupancyLimit, ServerId, UserId};
use parley_core::{AppError, AppResult};
use parley_directory::MemoryDirectory;
use parley_directory::memory::ChannelKind;
use parley_realtime::connection::handle::ConnectionId;
use parley_realtime::message::types::OutboundMessage;
use parley_realtime::{Collaborators, RealtimeEngine};

/// Token verifier backed by a fixed token table.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    tokens: Mutex<HashMap<String, VerifiedIdentity>>,
}

impl StaticIdentity {
    pub fn issue(&self, token: &str, user_id: UserId, username: &str) {
        self.tokens.lock().unwrap().insert(
            token.to_string(),
            VerifiedIdentity {
                user_id,
                username: Some(username.to_string()),
            },
        );
    }
}

#[async_trait]
impl IdentityService for StaticIdentity {
    async fn verify_token(&self, token: &str) -> AppResult<VerifiedIdentity> {
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::authentication("Invalid token"))
    }
}

/// A registered connection and its outbound queue.
pub struct Client {
    pub id: ConnectionId,
    pub user_id: Option<UserId>,
    rx: mpsc::Receiver<OutboundMessage>,
}

impl Client {
    /// Takes every event currently queued.
    pub fn drain(&mut self) -> Vec<OutboundMessage> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Takes every queued event and returns their wire type names.
    pub fn drain_types(&mut self) -> Vec<&'static str> {
        self.drain().iter().map(OutboundMessage::event_type).collect()
    }

    /// Takes queued events and keeps the ones of the given type.
    pub fn take(&mut self, event_type: &str) -> Vec<OutboundMessage> {
        self.drain()
            .into_iter()
            .filter(|event| event.event_type() == event_type)
            .collect()
    }
}

/// Engine wired to an in-memory directory and a static token table.
pub struct Harness {
    pub engine: RealtimeEngine,
    pub directory: Arc<MemoryDirectory>,
    pub identity: Arc<StaticIdentity>,
    pub server_id: ServerId,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(RealtimeConfig::default())
    }

    pub fn with_config(config: RealtimeConfig) -> Self {
        Self::build(config, |directory| directory)
    }

    /// Builds a harness whose membership checks go through `membership`,
    /// which receives the shared directory to delegate to.
    pub fn with_membership<M>(membership: impl FnOnce(Arc<MemoryDirectory>) -> Arc<M>) -> Self
    where
        M: MembershipService,
    {
        Self::build(RealtimeConfig::default(), membership)
    }

    fn build<M>(
        config: RealtimeConfig,
        membership: impl FnOnce(Arc<MemoryDirectory>) -> Arc<M>,
    ) -> Self
    where
        M: MembershipService,
    {
        let directory = Arc::new(MemoryDirectory::new());
        let identity = Arc::new(StaticIdentity::default());
        let server_id = ServerId::new();
        directory.add_server(server_id, []);

        let engine = RealtimeEngine::new(
            config,
            Collaborators {
                identity: identity.clone(),
                membership: membership(directory.clone()),
                messages: directory.clone(),
                channels: directory.clone(),
            },
        );

        Self {
            engine,
            directory,
            identity,
            server_id,
        }
    }

    /// Creates a user who belongs to the harness server and returns their
    /// id; the token is the username.
    pub fn member(&self, username: &str) -> UserId {
        let user_id = self.outsider(username);
        self.directory.add_member(self.server_id, user_id);
        user_id
    }

    /// Creates a user with a valid token but no server membership.
    pub fn outsider(&self, username: &str) -> UserId {
        let user_id = UserId::new();
        self.directory.add_user(user_id, username);
        self.identity.issue(username, user_id, username);
        user_id
    }

    pub fn text_channel(&self) -> ChannelId {
        let channel_id = ChannelId::new();
        self.directory
            .add_channel(self.server_id, channel_id, ChannelKind::Text);
        channel_id
    }

    pub fn voice_channel(&self, limit: u32) -> ChannelId {
        let channel_id = ChannelId::new();
        self.directory.add_channel(
            self.server_id,
            channel_id,
            ChannelKind::Voice(OccupancyLimit::from(limit)),
        );
        channel_id
    }

    pub fn conversation(&self, participants: &[UserId]) -> ConversationId {
        let conversation_id = ConversationId::new();
        self.directory
            .add_conversation(conversation_id, participants.iter().copied());
        conversation_id
    }

    /// Opens an unauthenticated connection.
    pub fn connect(&self) -> Client {
        let (handle, rx) = self.engine.connections.register();
        Client {
            id: handle.id,
            user_id: None,
            rx,
        }
    }

    /// Opens a connection and authenticates it with `token`, leaving the
    /// queue empty.
    pub async fn login(&self, token: &str) -> Client {
        let mut client = self.connect();
        self.send(&client, json!({ "type": "authenticate", "token": token }))
            .await;
        client.user_id = self
            .engine
            .connections
            .get(client.id)
            .and_then(|handle| handle.user_id());
        assert!(client.user_id.is_some(), "login failed for {token}");
        client.drain();
        client
    }

    pub async fn send(&self, client: &Client, frame: Value) {
        self.send_raw(client, &frame.to_string()).await;
    }

    pub async fn send_raw(&self, client: &Client, raw: &str) {
        self.engine.router.handle_frame(client.id, raw).await;
    }

    pub async fn join(&self, client: &Client, kind: &str, id: impl ToString) {
        self.send(
            client,
            json!({ "type": "join_room", "room_kind": kind, "room_id": id.to_string() }),
        )
        .await;
    }

    pub fn disconnect(&self, client: &Client) {
        self.engine.router.disconnect(client.id);
    }
}

/// Extracts `(code, message)` from error events.
pub fn errors(events: &[OutboundMessage]) -> Vec<(String, String)> {
    events
        .iter()
        .filter_map(|event| match event {
            OutboundMessage::Error { code, message } => Some((code.clone(), message.clone())),
            _ => None,
        })
        .collect()
}

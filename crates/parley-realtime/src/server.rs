//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::info;

use parley_core::config::RealtimeConfig;
use parley_core::traits::{ChannelDirectory, IdentityService, MembershipService, MessageStore};

use crate::connection::authenticator::WsAuthenticator;
use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::manager::ConnectionManager;
use crate::connection::pool::ConnectionPool;
use crate::fanout::Fanout;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::presence::tracker::PresenceTracker;
use crate::room::registry::RoomRegistry;
use crate::router::EventRouter;
use crate::typing::TypingManager;
use crate::voice::VoiceManager;

/// External services the engine depends on.
#[derive(Debug, Clone)]
pub struct Collaborators {
    /// Token verification.
    pub identity: Arc<dyn IdentityService>,
    /// Room access checks.
    pub membership: Arc<dyn MembershipService>,
    /// Message persistence.
    pub messages: Arc<dyn MessageStore>,
    /// Channel metadata.
    pub channels: Arc<dyn ChannelDirectory>,
}

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection registry.
    pub connections: Arc<ConnectionManager>,
    /// Room membership index.
    pub rooms: Arc<RoomRegistry>,
    /// Presence tracker.
    pub presence: Arc<PresenceTracker>,
    /// Typing indicators.
    pub typing: Arc<TypingManager>,
    /// Voice occupancy.
    pub voice: Arc<VoiceManager>,
    /// Push point for outbound events.
    pub fanout: Arc<Fanout>,
    /// Inbound event router.
    pub router: Arc<EventRouter>,
    /// Metrics collector.
    pub metrics: Arc<EngineMetrics>,
    config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
    shutting_down: Arc<AtomicBool>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: RealtimeConfig, collaborators: Collaborators) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(EngineMetrics::new());
        let pool = Arc::new(ConnectionPool::new());
        let rooms = Arc::new(RoomRegistry::new());
        let presence = Arc::new(PresenceTracker::new());
        let fanout = Arc::new(Fanout::new(pool.clone(), rooms.clone(), metrics.clone()));
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            pool,
            rooms.clone(),
            presence.clone(),
            WsAuthenticator::new(collaborators.identity),
            metrics.clone(),
        ));
        let typing = Arc::new(TypingManager::new(
            config.typing_timeout(),
            fanout.clone(),
            metrics.clone(),
        ));
        let voice = Arc::new(VoiceManager::new());
        let router = Arc::new(EventRouter::new(
            config.clone(),
            connections.clone(),
            rooms.clone(),
            presence.clone(),
            typing.clone(),
            voice.clone(),
            fanout.clone(),
            collaborators.membership,
            collaborators.messages,
            collaborators.channels,
            metrics.clone(),
        ));

        info!(
            typing_timeout_ms = config.typing_timeout_ms,
            max_connections_per_user = config.max_connections_per_user,
            "Real-time engine initialized"
        );

        Self {
            connections,
            rooms,
            presence,
            typing,
            voice,
            fanout,
            router,
            metrics,
            config,
            shutdown_tx,
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Heartbeat settings for transports.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig::from(&self.config)
    }

    /// Point-in-time counters for health reporting.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            connections: self.connections.connection_count(),
            users: self.connections.user_count(),
            online_users: self.presence.online_count(),
            rooms: self.rooms.room_count(),
            typing_indicators: self.typing.active_count(),
            metrics: self.metrics.snapshot(),
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub fn shutdown(&self) {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        self.connections.close_all();
        info!("Real-time engine shut down");
    }
}

/// Engine counters exposed by the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    /// Open connections.
    pub connections: usize,
    /// Users with at least one authenticated connection.
    pub users: usize,
    /// Users whose presence is not offline.
    pub online_users: usize,
    /// Non-empty rooms.
    pub rooms: usize,
    /// Active typing indicators.
    pub typing_indicators: usize,
    /// Cumulative counters.
    pub metrics: MetricsSnapshot,
}

//! Presence tracker: one record per user, never deleted.
//!
//! The aggregate status is `Offline` exactly when the user has no live
//! connections; otherwise it is the user's explicit choice. Change events
//! carry the visible status, so invisible users appear offline.
//!
//! Delivery goes through [`PresenceTracker::publish`], which serializes
//! publications and always sends the record's current state. An event
//! computed before a later change can therefore never be the last one
//! observers see.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use parley_core::AppResult;
use parley_core::types::UserId;

use super::status::{ExplicitStatus, PresenceStatus};

use crate::message::types::OutboundMessage;
use crate::message::validator;

/// Presence state for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRecord {
    /// User.
    pub user_id: UserId,
    /// Cached display name.
    pub username: Option<String>,
    /// Aggregate status.
    pub status: PresenceStatus,
    /// The user's explicit preference, kept across reconnects.
    pub explicit: ExplicitStatus,
    /// Custom status text.
    pub custom_status: Option<String>,
    /// Last connect or disconnect.
    pub last_seen: DateTime<Utc>,
    /// Live connection count.
    pub connection_count: usize,
}

impl PresenceRecord {
    fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            username: None,
            status: PresenceStatus::Offline,
            explicit: ExplicitStatus::default(),
            custom_status: None,
            last_seen: Utc::now(),
            connection_count: 0,
        }
    }

    /// The change event other users receive for this record.
    pub fn to_event(&self) -> OutboundMessage {
        let status = self.status.visible();
        OutboundMessage::UserStatusChange {
            user_id: self.user_id,
            username: self.username.clone(),
            status,
            custom_status: if status == PresenceStatus::Offline {
                None
            } else {
                self.custom_status.clone()
            },
            last_seen: self.last_seen,
        }
    }
}

/// Tracks presence for all users.
#[derive(Debug)]
pub struct PresenceTracker {
    records: DashMap<UserId, PresenceRecord>,
    publish_lock: Mutex<()>,
}

impl PresenceTracker {
    /// Create a new presence tracker.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            publish_lock: Mutex::new(()),
        }
    }

    /// Cache a user's display name for outbound events.
    pub fn remember_username(&self, user_id: UserId, username: Option<String>) {
        if username.is_none() {
            return;
        }
        self.records
            .entry(user_id)
            .or_insert_with(|| PresenceRecord::new(user_id))
            .username = username;
    }

    /// Apply a live-connection count transition.
    ///
    /// Returns the change event when the visible status changed.
    pub fn on_connection_count_changed(
        &self,
        user_id: UserId,
        new_count: usize,
    ) -> Option<OutboundMessage> {
        let mut record = self
            .records
            .entry(user_id)
            .or_insert_with(|| PresenceRecord::new(user_id));

        let before = record.status.visible();
        record.connection_count = new_count;
        record.status = record.explicit.aggregate(new_count);
        record.last_seen = Utc::now();

        debug!(
            user_id = %user_id,
            connections = new_count,
            status = %record.status,
            "Presence connection count changed"
        );

        (record.status.visible() != before).then(|| record.to_event())
    }

    /// Set the user's explicit status.
    ///
    /// Invalid status strings are rejected, never coerced. While the user is
    /// offline the preference is stored but no event is produced.
    pub fn set_explicit_status(
        &self,
        user_id: UserId,
        status: &str,
        custom_status: Option<String>,
    ) -> AppResult<Option<OutboundMessage>> {
        let explicit: ExplicitStatus = status.parse()?;
        if let Some(custom) = &custom_status {
            validator::validate_custom_status(custom)?;
        }

        let mut record = self
            .records
            .entry(user_id)
            .or_insert_with(|| PresenceRecord::new(user_id));

        let before = record.status.visible();
        record.explicit = explicit;
        record.custom_status = custom_status;
        record.status = explicit.aggregate(record.connection_count);

        if record.connection_count == 0 {
            return Ok(None);
        }
        let after = record.status.visible();
        if before == PresenceStatus::Offline && after == PresenceStatus::Offline {
            return Ok(None);
        }
        Ok(Some(record.to_event()))
    }

    /// Get a copy of a user's record.
    pub fn get(&self, user_id: UserId) -> Option<PresenceRecord> {
        self.records.get(&user_id).map(|r| r.value().clone())
    }

    /// Get a user's aggregate status.
    pub fn status_of(&self, user_id: UserId) -> PresenceStatus {
        self.records
            .get(&user_id)
            .map(|r| r.status)
            .unwrap_or(PresenceStatus::Offline)
    }

    /// Hand the user's current presence event to `deliver`.
    ///
    /// Publications are serialized and the event is read after the lock is
    /// taken, so the last delivery always reflects the latest state. Never
    /// call this while holding a connection pool entry.
    pub fn publish<R>(
        &self,
        user_id: UserId,
        deliver: impl FnOnce(&OutboundMessage) -> R,
    ) -> Option<R> {
        let _guard = self
            .publish_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let event = self.records.get(&user_id).map(|r| r.to_event())?;
        Some(deliver(&event))
    }

    /// Number of users with at least one live connection.
    pub fn online_count(&self) -> usize {
        self.records.iter().filter(|r| r.connection_count > 0).count()
    }
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use parley_core::error::ErrorKind;

    use super::*;

    fn status_in(event: &OutboundMessage) -> PresenceStatus {
        match event {
            OutboundMessage::UserStatusChange { status, .. } => *status,
            other => panic!("expected status change, got {other:?}"),
        }
    }

    #[test]
    fn test_first_connection_goes_online_once() {
        let tracker = PresenceTracker::new();
        let user = UserId::new();

        let event = tracker.on_connection_count_changed(user, 1).expect("event");
        assert_eq!(status_in(&event), PresenceStatus::Online);
        assert!(tracker.on_connection_count_changed(user, 2).is_none());
        assert!(tracker.on_connection_count_changed(user, 1).is_none());

        let event = tracker.on_connection_count_changed(user, 0).expect("event");
        assert_eq!(status_in(&event), PresenceStatus::Offline);
        assert_eq!(tracker.status_of(user), PresenceStatus::Offline);
    }

    #[test]
    fn test_explicit_status_survives_reconnect() {
        let tracker = PresenceTracker::new();
        let user = UserId::new();

        tracker.on_connection_count_changed(user, 1);
        tracker
            .set_explicit_status(user, "dnd", None)
            .expect("valid status");
        tracker.on_connection_count_changed(user, 0);
        assert_eq!(tracker.status_of(user), PresenceStatus::Offline);

        let event = tracker.on_connection_count_changed(user, 1).expect("event");
        assert_eq!(status_in(&event), PresenceStatus::Dnd);
    }

    #[test]
    fn test_offline_user_status_is_stored_not_broadcast() {
        let tracker = PresenceTracker::new();
        let user = UserId::new();

        let event = tracker
            .set_explicit_status(user, "idle", Some("brb".into()))
            .expect("valid status");
        assert!(event.is_none());
        let record = tracker.get(user).expect("record");
        assert_eq!(record.status, PresenceStatus::Offline);
        assert_eq!(record.explicit, ExplicitStatus::Idle);
    }

    #[test]
    fn test_publish_sends_current_state() {
        let tracker = PresenceTracker::new();
        let user = UserId::new();
        assert!(tracker.publish(user, |_| ()).is_none());

        let stale = tracker.on_connection_count_changed(user, 1).expect("event");
        assert_eq!(status_in(&stale), PresenceStatus::Online);
        tracker
            .set_explicit_status(user, "dnd", None)
            .expect("valid status");

        let published = tracker.publish(user, status_in).expect("record");
        assert_eq!(published, PresenceStatus::Dnd);
    }

    #[test]
    fn test_invalid_status_rejected_and_state_unchanged() {
        let tracker = PresenceTracker::new();
        let user = UserId::new();
        tracker.on_connection_count_changed(user, 1);

        let err = tracker
            .set_explicit_status(user, "sleeping", None)
            .expect_err("should reject");
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(tracker.status_of(user), PresenceStatus::Online);
    }

    #[test]
    fn test_invisible_users_appear_offline() {
        let tracker = PresenceTracker::new();
        let user = UserId::new();
        tracker.on_connection_count_changed(user, 1);

        let event = tracker
            .set_explicit_status(user, "invisible", Some("secret".into()))
            .expect("valid status")
            .expect("event");
        match event {
            OutboundMessage::UserStatusChange {
                status,
                custom_status,
                ..
            } => {
                assert_eq!(status, PresenceStatus::Offline);
                assert!(custom_status.is_none());
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(tracker.status_of(user), PresenceStatus::Invisible);

        // Reconnecting while invisible reveals nothing.
        tracker.on_connection_count_changed(user, 0);
        assert!(tracker.on_connection_count_changed(user, 1).is_none());
    }

    #[test]
    fn test_offline_iff_no_connections_for_any_trajectory() {
        let tracker = PresenceTracker::new();
        let user = UserId::new();
        let trajectory = [1, 2, 3, 2, 1, 2, 1, 0];
        let statuses = ["idle", "online", "dnd", "invisible"];

        for (i, count) in trajectory.iter().enumerate() {
            tracker.on_connection_count_changed(user, *count);
            let _ = tracker.set_explicit_status(user, statuses[i % statuses.len()], None);
            let record = tracker.get(user).expect("record");
            assert_eq!(
                record.status == PresenceStatus::Offline,
                record.connection_count == 0
            );
        }
        assert_eq!(tracker.status_of(user), PresenceStatus::Offline);
        assert_eq!(tracker.online_count(), 0);
    }

    #[test]
    fn test_custom_status_length_enforced() {
        let tracker = PresenceTracker::new();
        let user = UserId::new();
        tracker.on_connection_count_changed(user, 1);
        assert!(
            tracker
                .set_explicit_status(user, "online", Some("x".repeat(129)))
                .is_err()
        );
    }
}

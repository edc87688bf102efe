//! Voice occupancy manager.
//!
//! The capacity check and the insert happen under one map entry guard, so
//! concurrent joins can never push a channel past its limit.

use dashmap::DashMap;
use tracing::{debug, info};

use parley_core::types::{ChannelId, OccupancyLimit, ServerId, UserId, VoiceChannelInfo};
use parley_core::{AppError, AppResult};

use crate::connection::handle::ConnectionId;
use crate::message::types::VoiceStatePatch;

use super::entry::VoiceEntry;

#[derive(Debug)]
struct VoiceChannelState {
    server_id: ServerId,
    limit: OccupancyLimit,
    entries: Vec<VoiceEntry>,
}

/// Outcome of a successful join.
#[derive(Debug, Clone)]
pub struct VoiceJoin {
    /// The caller's entry.
    pub entry: VoiceEntry,
    /// Everyone in the channel after the join, in join order.
    pub occupants: Vec<VoiceEntry>,
    /// Parent server.
    pub server_id: ServerId,
    /// `false` when the user already held a seat and only the owning
    /// connection changed.
    pub newly_joined: bool,
}

impl VoiceJoin {
    /// Occupant count after the join.
    pub fn connected_users(&self) -> usize {
        self.occupants.len()
    }
}

/// Outcome of a leave.
#[derive(Debug, Clone)]
pub struct VoiceLeave {
    /// The removed entry.
    pub entry: VoiceEntry,
    /// Parent server.
    pub server_id: ServerId,
    /// Occupant count after the leave.
    pub connected_users: usize,
}

/// Tracks voice channel occupancy.
#[derive(Debug, Default)]
pub struct VoiceManager {
    channels: DashMap<ChannelId, VoiceChannelState>,
}

impl VoiceManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a seat in a voice channel.
    ///
    /// Fails with a `Capacity` error when the channel is full. A user who
    /// already holds a seat keeps it and the seat moves to `conn_id`.
    pub fn join(
        &self,
        info: VoiceChannelInfo,
        user_id: UserId,
        conn_id: ConnectionId,
    ) -> AppResult<VoiceJoin> {
        let mut state = self
            .channels
            .entry(info.channel_id)
            .or_insert_with(|| VoiceChannelState {
                server_id: info.server_id,
                limit: info.user_limit,
                entries: Vec::new(),
            });
        state.server_id = info.server_id;
        state.limit = info.user_limit;

        if let Some(existing) = state.entries.iter_mut().find(|e| e.user_id == user_id) {
            existing.connection_id = conn_id;
            let entry = existing.clone();
            debug!(
                channel_id = %info.channel_id,
                user_id = %user_id,
                conn_id = %conn_id,
                "Voice seat moved to new connection"
            );
            return Ok(VoiceJoin {
                entry,
                occupants: state.entries.clone(),
                server_id: state.server_id,
                newly_joined: false,
            });
        }

        if state.limit.is_full(state.entries.len()) {
            let occupied = state.entries.len();
            let empty = state.entries.is_empty();
            drop(state);
            if empty {
                self.channels
                    .remove_if(&info.channel_id, |_, s| s.entries.is_empty());
            }
            return Err(AppError::capacity(format!(
                "Voice channel is full ({occupied} connected)"
            )));
        }

        let entry = VoiceEntry::new(info.channel_id, user_id, conn_id);
        state.entries.push(entry.clone());

        info!(
            channel_id = %info.channel_id,
            user_id = %user_id,
            connected = state.entries.len(),
            "User joined voice channel"
        );

        Ok(VoiceJoin {
            entry,
            occupants: state.entries.clone(),
            server_id: state.server_id,
            newly_joined: true,
        })
    }

    /// Give up a seat. Returns `None` if the user held none.
    pub fn leave(&self, channel_id: ChannelId, user_id: UserId) -> Option<VoiceLeave> {
        self.remove_where(channel_id, |entry| entry.user_id == user_id)
    }

    /// Apply a flag update. Returns `None` (and logs) if the user holds no
    /// seat, which happens when an update races a leave.
    pub fn update_state(
        &self,
        channel_id: ChannelId,
        user_id: UserId,
        patch: VoiceStatePatch,
    ) -> Option<VoiceEntry> {
        let updated = self.channels.get_mut(&channel_id).and_then(|mut state| {
            state
                .entries
                .iter_mut()
                .find(|e| e.user_id == user_id)
                .map(|entry| {
                    entry.apply(patch);
                    entry.clone()
                })
        });
        if updated.is_none() {
            debug!(
                channel_id = %channel_id,
                user_id = %user_id,
                "Dropping voice state update for user not in channel"
            );
        }
        updated
    }

    /// Remove every seat owned by a connection.
    pub fn leave_connection(&self, conn_id: ConnectionId) -> Vec<VoiceLeave> {
        let channels: Vec<ChannelId> = self
            .channels
            .iter()
            .filter(|state| state.entries.iter().any(|e| e.connection_id == conn_id))
            .map(|state| *state.key())
            .collect();

        channels
            .into_iter()
            .filter_map(|channel_id| {
                self.remove_where(channel_id, |entry| entry.connection_id == conn_id)
            })
            .collect()
    }

    /// Current occupants of a channel, in join order.
    pub fn occupants(&self, channel_id: ChannelId) -> Vec<VoiceEntry> {
        self.channels
            .get(&channel_id)
            .map(|state| state.entries.clone())
            .unwrap_or_default()
    }

    /// Current occupant count of a channel.
    pub fn occupancy(&self, channel_id: ChannelId) -> usize {
        self.channels
            .get(&channel_id)
            .map(|state| state.entries.len())
            .unwrap_or(0)
    }

    /// Voice channels the user currently sits in.
    pub fn channels_of(&self, user_id: UserId) -> Vec<ChannelId> {
        self.channels
            .iter()
            .filter(|state| state.entries.iter().any(|e| e.user_id == user_id))
            .map(|state| *state.key())
            .collect()
    }

    fn remove_where(
        &self,
        channel_id: ChannelId,
        matches: impl Fn(&VoiceEntry) -> bool,
    ) -> Option<VoiceLeave> {
        let mut state = self.channels.get_mut(&channel_id)?;
        let position = state.entries.iter().position(&matches)?;
        let entry = state.entries.remove(position);
        let server_id = state.server_id;
        let connected_users = state.entries.len();
        drop(state);

        if connected_users == 0 {
            self.channels
                .remove_if(&channel_id, |_, s| s.entries.is_empty());
        }

        info!(
            channel_id = %channel_id,
            user_id = %entry.user_id,
            connected = connected_users,
            "User left voice channel"
        );

        Some(VoiceLeave {
            entry,
            server_id,
            connected_users,
        })
    }
}

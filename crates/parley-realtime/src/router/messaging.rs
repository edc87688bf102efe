//! Message, typing, reaction, and status events.

use parley_core::AppResult;
use parley_core::traits::VerifiedIdentity;
use parley_core::types::{Destination, MessageId, NewMessage, UserId};

use crate::connection::handle::ConnectionHandle;
use crate::message::types::OutboundMessage;
use crate::message::validator;
use crate::room::types::RoomId;

use super::EventRouter;

impl EventRouter {
    pub(super) async fn send_message(
        &self,
        identity: &VerifiedIdentity,
        destination: Destination,
        content: String,
        reply_to: Option<MessageId>,
    ) -> AppResult<()> {
        validator::validate_message_content(&content, self.config.max_message_length)?;
        self.authorize_room(identity.user_id, RoomId::from(destination))
            .await?;

        let persisted = self
            .messages
            .persist(NewMessage {
                author_id: identity.user_id,
                destination,
                content,
                reply_to,
            })
            .await?;

        self.typing.stop_typing(destination, identity.user_id);
        self.publish_message(&persisted);
        Ok(())
    }

    pub(super) fn typing_start(
        &self,
        handle: &ConnectionHandle,
        identity: &VerifiedIdentity,
        destination: Destination,
    ) -> AppResult<()> {
        self.require_subscription(handle.id, RoomId::from(destination))?;
        self.typing.start_typing(
            destination,
            identity.user_id,
            identity.username.clone(),
            handle.id,
        );
        Ok(())
    }

    pub(super) fn status_change(
        &self,
        handle: &ConnectionHandle,
        identity: &VerifiedIdentity,
        status: &str,
        custom_status: Option<String>,
    ) -> AppResult<()> {
        let changed = self
            .presence
            .set_explicit_status(identity.user_id, status, custom_status)?
            .is_some();
        if changed {
            self.broadcast_presence(identity.user_id, Some(handle.id));
        }
        Ok(())
    }

    pub(super) fn react(
        &self,
        handle: &ConnectionHandle,
        user_id: UserId,
        destination: Destination,
        message_id: MessageId,
        emoji: String,
        added: bool,
    ) -> AppResult<()> {
        validator::validate_emoji(&emoji)?;
        let room = RoomId::from(destination);
        self.require_subscription(handle.id, room)?;

        let event = if added {
            OutboundMessage::ReactionAdded {
                destination,
                message_id,
                user_id,
                emoji,
            }
        } else {
            OutboundMessage::ReactionRemoved {
                destination,
                message_id,
                user_id,
                emoji,
            }
        };
        self.fanout.to_room(&room, &event, Some(handle.id));
        Ok(())
    }
}

//! Message, typing, and reaction fanout through the event router.

mod common;

use std::time::Duration;

use serde_json::json;

use parley_core::types::{Destination, MessageId};
use parley_realtime::message::types::OutboundMessage;

use common::{Harness, errors};

#[tokio::test]
async fn test_channel_message_reaches_subscribers_only() {
    let h = Harness::new();
    let alice_id = h.member("alice");
    h.member("bob");
    h.member("carol");
    let channel = h.text_channel();

    let mut alice = h.login("alice").await;
    let mut bob = h.login("bob").await;
    let mut carol = h.login("carol").await;
    h.join(&alice, "channel", channel).await;
    h.join(&bob, "channel", channel).await;
    alice.drain();
    bob.drain();
    carol.drain();

    h.send(
        &alice,
        json!({ "type": "send_message", "channel_id": channel, "content": "hello" }),
    )
    .await;

    let received = bob.take("new_message");
    assert_eq!(received.len(), 1);
    match &received[0] {
        OutboundMessage::NewMessage { message } => {
            assert_eq!(message.content, "hello");
            assert_eq!(message.author.id, alice_id);
            assert_eq!(message.destination, Destination::Channel(channel));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(alice.take("new_message").len(), 1);
    assert!(carol.drain().is_empty());
}

#[tokio::test]
async fn test_delivery_follows_current_subscription() {
    let h = Harness::new();
    h.member("alice");
    h.member("bob");
    let channel = h.text_channel();

    let mut alice = h.login("alice").await;
    let mut bob = h.login("bob").await;
    h.join(&alice, "channel", channel).await;
    h.join(&bob, "channel", channel).await;
    alice.drain();
    bob.drain();

    let say = |content: &str| {
        json!({ "type": "send_message", "channel_id": channel, "content": content })
    };

    h.send(
        &bob,
        json!({ "type": "leave_room", "room_kind": "channel", "room_id": channel.to_string() }),
    )
    .await;
    assert_eq!(bob.drain_types(), vec!["room_left"]);

    h.send(&alice, say("while away")).await;
    assert!(bob.take("new_message").is_empty());

    h.send(&alice, say("before rejoin")).await;
    h.join(&bob, "channel", channel).await;
    assert_eq!(bob.drain_types(), vec!["room_joined"]);

    h.send(&alice, say("after rejoin")).await;
    let received = bob.take("new_message");
    assert_eq!(received.len(), 1);
    match &received[0] {
        OutboundMessage::NewMessage { message } => assert_eq!(message.content, "after rejoin"),
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(alice.take("new_message").len(), 3);
}

#[tokio::test]
async fn test_send_to_inaccessible_channel_yields_one_error() {
    let h = Harness::new();
    h.member("alice");
    h.outsider("mallory");
    let channel = h.text_channel();

    let mut alice = h.login("alice").await;
    let mut mallory = h.login("mallory").await;
    h.join(&alice, "channel", channel).await;
    alice.drain();

    h.send(
        &mallory,
        json!({ "type": "send_message", "channel_id": channel, "content": "spam" }),
    )
    .await;

    let events = mallory.drain();
    let errs = errors(&events);
    assert_eq!(events.len(), 1);
    assert_eq!(errs[0].0, "AUTHORIZATION");
    assert!(alice.take("new_message").is_empty());
    assert!(alice.take("error").is_empty());
}

#[tokio::test]
async fn test_message_validation() {
    let h = Harness::new();
    h.member("alice");
    let channel = h.text_channel();
    let mut alice = h.login("alice").await;
    h.join(&alice, "channel", channel).await;
    alice.drain();

    h.send(
        &alice,
        json!({ "type": "send_message", "channel_id": channel, "content": "   " }),
    )
    .await;
    let errs = errors(&alice.drain());
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].0, "VALIDATION");

    let long = "x".repeat(h.engine.config().max_message_length + 1);
    h.send(
        &alice,
        json!({ "type": "send_message", "channel_id": channel, "content": long }),
    )
    .await;
    assert_eq!(errors(&alice.drain())[0].0, "VALIDATION");

    h.send(&alice, json!({ "type": "send_message", "content": "nowhere" }))
        .await;
    assert_eq!(errors(&alice.drain())[0].0, "VALIDATION");
}

#[tokio::test]
async fn test_dm_room_is_restricted_to_participants() {
    let h = Harness::new();
    let alice_id = h.outsider("alice");
    let bob_id = h.outsider("bob");
    h.outsider("eve");
    let conversation = h.conversation(&[alice_id, bob_id]);

    let mut alice = h.login("alice").await;
    let mut bob = h.login("bob").await;
    let mut eve = h.login("eve").await;
    h.join(&alice, "dm", conversation).await;
    h.join(&bob, "dm", conversation).await;
    h.join(&eve, "dm", conversation).await;
    assert_eq!(alice.take("room_joined").len(), 1);
    assert_eq!(errors(&eve.drain())[0].0, "AUTHORIZATION");
    bob.drain();

    h.send(
        &alice,
        json!({ "type": "send_message", "conversation_id": conversation, "content": "psst" }),
    )
    .await;

    assert_eq!(bob.take("new_message").len(), 1);
    assert!(eve.drain().is_empty());
}

#[tokio::test]
async fn test_reply_must_reference_same_destination() {
    let h = Harness::new();
    h.member("alice");
    let channel = h.text_channel();
    let mut alice = h.login("alice").await;
    h.join(&alice, "channel", channel).await;
    alice.drain();

    h.send(
        &alice,
        json!({
            "type": "send_message",
            "channel_id": channel,
            "content": "re",
            "reply_to": MessageId::new(),
        }),
    )
    .await;
    let events = alice.drain();
    assert!(events.iter().all(|e| e.event_type() != "new_message"));
    assert_eq!(errors(&events).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_typing_indicator_expires_once() {
    let h = Harness::new();
    h.member("alice");
    h.member("bob");
    let channel = h.text_channel();
    let mut alice = h.login("alice").await;
    let mut bob = h.login("bob").await;
    h.join(&alice, "channel", channel).await;
    h.join(&bob, "channel", channel).await;
    alice.drain();
    bob.drain();

    h.send(&alice, json!({ "type": "typing_start", "channel_id": channel }))
        .await;
    assert_eq!(bob.take("user_typing").len(), 1);
    assert!(alice.take("user_typing").is_empty());

    tokio::time::sleep(h.engine.config().typing_timeout() + Duration::from_millis(50)).await;
    assert_eq!(bob.take("user_stopped_typing").len(), 1);

    tokio::time::sleep(h.engine.config().typing_timeout() * 2).await;
    assert!(bob.drain().is_empty());
    assert_eq!(h.engine.typing.active_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_refreshed_typing_is_not_expired_by_stale_timer() {
    let h = Harness::new();
    h.member("alice");
    h.member("bob");
    let channel = h.text_channel();
    let alice = h.login("alice").await;
    let mut bob = h.login("bob").await;
    h.join(&alice, "channel", channel).await;
    h.join(&bob, "channel", channel).await;
    bob.drain();

    let timeout = h.engine.config().typing_timeout();
    h.send(&alice, json!({ "type": "typing_start", "channel_id": channel }))
        .await;
    tokio::time::sleep(timeout / 2).await;
    h.send(&alice, json!({ "type": "typing_start", "channel_id": channel }))
        .await;
    tokio::time::sleep(timeout / 2 + Duration::from_millis(50)).await;

    assert!(bob.take("user_stopped_typing").is_empty());
    assert!(
        h.engine
            .typing
            .is_typing(Destination::Channel(channel), alice.user_id.unwrap())
    );

    tokio::time::sleep(timeout).await;
    assert_eq!(bob.take("user_stopped_typing").len(), 1);
}

#[tokio::test]
async fn test_sending_clears_typing() {
    let h = Harness::new();
    h.member("alice");
    h.member("bob");
    let channel = h.text_channel();
    let alice = h.login("alice").await;
    let mut bob = h.login("bob").await;
    h.join(&alice, "channel", channel).await;
    h.join(&bob, "channel", channel).await;

    h.send(&alice, json!({ "type": "typing_start", "channel_id": channel }))
        .await;
    h.send(
        &alice,
        json!({ "type": "send_message", "channel_id": channel, "content": "done" }),
    )
    .await;

    let types = bob.drain_types();
    assert!(types.contains(&"user_typing"));
    assert!(types.contains(&"user_stopped_typing"));
    assert!(types.contains(&"new_message"));
    assert_eq!(h.engine.typing.active_count(), 0);
}

#[tokio::test]
async fn test_typing_requires_subscription() {
    let h = Harness::new();
    h.member("alice");
    let channel = h.text_channel();
    let mut alice = h.login("alice").await;

    h.send(&alice, json!({ "type": "typing_start", "channel_id": channel }))
        .await;
    assert_eq!(errors(&alice.drain())[0].0, "AUTHORIZATION");
    assert_eq!(h.engine.typing.active_count(), 0);
}

#[tokio::test]
async fn test_reactions_fan_out_to_room() {
    let h = Harness::new();
    h.member("alice");
    h.member("bob");
    let channel = h.text_channel();
    let mut alice = h.login("alice").await;
    let mut bob = h.login("bob").await;
    h.join(&alice, "channel", channel).await;
    h.join(&bob, "channel", channel).await;
    alice.drain();
    bob.drain();

    let message_id = MessageId::new();
    h.send(
        &alice,
        json!({
            "type": "add_reaction",
            "channel_id": channel,
            "message_id": message_id,
            "emoji": "👍",
        }),
    )
    .await;
    h.send(
        &alice,
        json!({
            "type": "remove_reaction",
            "channel_id": channel,
            "message_id": message_id,
            "emoji": "👍",
        }),
    )
    .await;

    assert_eq!(bob.drain_types(), vec!["reaction_added", "reaction_removed"]);
    assert!(alice.drain().is_empty());
}

#[tokio::test]
async fn test_publish_message_reaches_room() {
    let h = Harness::new();
    h.member("alice");
    let channel = h.text_channel();
    let mut alice = h.login("alice").await;
    h.join(&alice, "channel", channel).await;
    alice.drain();

    let message = parley_core::types::PersistedMessage {
        id: MessageId::new(),
        destination: Destination::Channel(channel),
        server_id: Some(h.server_id),
        author: parley_core::types::MessageAuthor {
            id: alice.user_id.unwrap(),
            username: "alice".to_string(),
        },
        content: "from elsewhere".to_string(),
        reply_to: None,
        created_at: chrono::Utc::now(),
    };

    assert_eq!(h.engine.router.publish_message(&message), 1);
    assert_eq!(alice.take("new_message").len(), 1);
}

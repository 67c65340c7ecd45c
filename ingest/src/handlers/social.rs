//! Handlers for the social feed: chirps and reactions.

use serde_json::Value;

use agora_messages::data::{AddChirp, AddReaction, DeleteChirp, MessageData, Payload};
use agora_messages::decode_payload;
use agora_store::records::{ChirpRecord, NotificationKind, NotificationRecord, ReactionRecord};
use agora_store::StateTransition;
use agora_types::ProtocolError;

use crate::outcome::{HandlerError, HandlerOutcome};
use crate::registry::{HandlerContext, Registry, RegistryError};

pub fn configure(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(AddChirp::OBJECT, AddChirp::ACTION, decode_add_chirp, handle_add_chirp)?;
    registry.register(
        DeleteChirp::OBJECT,
        DeleteChirp::ACTION,
        decode_delete_chirp,
        handle_delete_chirp,
    )?;
    registry.register(
        AddReaction::OBJECT,
        AddReaction::ACTION,
        decode_add_reaction,
        handle_add_reaction,
    )?;
    Ok(())
}

fn decode_add_chirp(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::ChirpAdd(decode_payload::<AddChirp>(value)?))
}

fn decode_delete_chirp(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::ChirpDelete(decode_payload::<DeleteChirp>(value)?))
}

fn decode_add_reaction(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::ReactionAdd(decode_payload::<AddReaction>(value)?))
}

/// `chirp#add` — the chirp's id is the id of the message posting it. A
/// reply to one of the user's own chirps also yields a notification.
pub fn handle_add_chirp(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::ChirpAdd(add) = ctx.data else {
        return Err(HandlerError::new("chirp#add handler received wrong payload"));
    };

    let lao_id = ctx.lao_id()?;
    let chirp_id = ctx.message.message_id.clone();
    let sender = ctx.message.sender.clone();

    if let Some(existing) = ctx.state.chirp(&lao_id, &chirp_id) {
        if !existing.is_deleted && existing.sender == sender {
            return Ok(HandlerOutcome::Duplicate);
        }
        // a tombstone from the sender still needs the add applied so the
        // feed shows the deleted placeholder at the right position
    }

    let mut transitions = vec![StateTransition::AddChirp {
        lao_id: lao_id.clone(),
        chirp: ChirpRecord {
            id: chirp_id.clone(),
            sender: sender.clone(),
            text: add.text.clone(),
            time: add.timestamp,
            parent_id: add.parent_id.clone(),
            is_deleted: false,
        },
    }];

    if let (Some(own_key), Some(parent_id)) = (ctx.own_key, &add.parent_id) {
        let replied_to_own = ctx
            .state
            .chirp(&lao_id, parent_id)
            .is_some_and(|parent| &parent.sender == own_key);
        // a redelivered add after a tombstone must not re-notify
        let already_notified = ctx.state.notification(&lao_id, &chirp_id).is_some();
        if replied_to_own && &sender != own_key && !already_notified {
            transitions.push(StateTransition::AddNotification {
                notification: NotificationRecord {
                    id: chirp_id,
                    lao_id,
                    title: "Someone replied to your chirp".into(),
                    timestamp: add.timestamp,
                    has_been_read: false,
                    kind: NotificationKind::ChirpReply {
                        chirp_id: parent_id.clone(),
                    },
                },
            });
        }
    }

    Ok(HandlerOutcome::Apply(transitions))
}

/// `chirp#delete` — only the original sender's request tombstones the
/// chirp; anyone else's is ignored.
pub fn handle_delete_chirp(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::ChirpDelete(delete) = ctx.data else {
        return Err(HandlerError::new("chirp#delete handler received wrong payload"));
    };

    let lao_id = ctx.lao_id()?;
    let requester = ctx.message.sender.clone();

    if let Some(existing) = ctx.state.chirp(&lao_id, &delete.chirp_id) {
        if existing.is_deleted && existing.sender == requester {
            return Ok(HandlerOutcome::Duplicate);
        }
        if existing.sender != requester {
            return Ok(HandlerOutcome::Ignored);
        }
    }

    Ok(HandlerOutcome::Apply(vec![StateTransition::DeleteChirp {
        lao_id,
        chirp_id: delete.chirp_id.clone(),
        requester,
        time: delete.timestamp,
    }]))
}

/// `reaction#add` — one reaction per sender per codepoint per chirp.
pub fn handle_add_reaction(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::ReactionAdd(add) = ctx.data else {
        return Err(HandlerError::new("reaction#add handler received wrong payload"));
    };

    let lao_id = ctx.lao_id()?;
    let sender = ctx.message.sender.clone();

    if ctx
        .state
        .reactions(&lao_id, &add.chirp_id, &add.reaction_codepoint)
        .contains(&sender)
    {
        return Ok(HandlerOutcome::Duplicate);
    }

    Ok(HandlerOutcome::Apply(vec![StateTransition::AddReaction {
        lao_id,
        reaction: ReactionRecord {
            id: ctx.message.message_id.clone(),
            sender,
            codepoint: add.reaction_codepoint.clone(),
            chirp_id: add.chirp_id.clone(),
            time: add.timestamp,
        },
    }]))
}

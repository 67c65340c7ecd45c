//! Handlers for the roll-call lifecycle.
//!
//! The event record keeps the create id as its identity for its whole
//! lifetime; open/close/reopen messages reference it through update ids,
//! which the store resolves as aliases.

use serde_json::Value;

use agora_messages::data::{
    CloseRollCall, CreateRollCall, MessageData, OpenRollCall, Payload, ReopenRollCall,
};
use agora_messages::decode_payload;
use agora_store::records::{EventKind, EventRecord, RollCallStatus};
use agora_store::StateTransition;
use agora_types::{Hash, ProtocolError, PublicKey};

use crate::handlers::TIMESTAMP_FUTURE_LEEWAY_SECS;
use crate::outcome::{HandlerError, HandlerOutcome};
use crate::registry::{HandlerContext, Registry, RegistryError};

pub fn configure(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        CreateRollCall::OBJECT,
        CreateRollCall::ACTION,
        decode_create,
        handle_create,
    )?;
    registry.register(OpenRollCall::OBJECT, OpenRollCall::ACTION, decode_open, handle_open)?;
    registry.register(CloseRollCall::OBJECT, CloseRollCall::ACTION, decode_close, handle_close)?;
    registry.register(
        ReopenRollCall::OBJECT,
        ReopenRollCall::ACTION,
        decode_reopen,
        handle_reopen,
    )?;
    Ok(())
}

fn decode_create(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::RollCallCreate(decode_payload::<CreateRollCall>(value)?))
}

fn decode_open(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::RollCallOpen(decode_payload::<OpenRollCall>(value)?))
}

fn decode_close(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::RollCallClose(decode_payload::<CloseRollCall>(value)?))
}

fn decode_reopen(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::RollCallReopen(decode_payload::<ReopenRollCall>(value)?))
}

pub fn handle_create(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::RollCallCreate(create) = ctx.data else {
        return Err(HandlerError::new("roll_call#create handler received wrong payload"));
    };

    let lao = ctx.lao()?;
    let expected = CreateRollCall::expected_id(&lao.id, create.creation, &create.name);
    if expected != create.id {
        return Err(HandlerError::new(format!(
            "roll call id {} does not match recomputed {expected}",
            create.id
        )));
    }
    if create.creation.is_in_future(ctx.now, TIMESTAMP_FUTURE_LEEWAY_SECS) {
        return Err(HandlerError::new("creation timestamp lies in the future"));
    }

    if ctx.state.event(&create.id).is_some() {
        return Ok(HandlerOutcome::Duplicate);
    }

    Ok(HandlerOutcome::Apply(vec![StateTransition::AddEvent {
        event: EventRecord {
            id: create.id.clone(),
            lao_id: lao.id.clone(),
            name: create.name.clone(),
            created_at: create.creation,
            start: create.proposed_start,
            end: Some(create.proposed_end),
            kind: EventKind::RollCall {
                status: RollCallStatus::Created,
                update_id: None,
                attendees: Vec::new(),
            },
        },
    }]))
}

/// Resolve the roll-call event a lifecycle message refers to.
fn roll_call_event<'a>(
    ctx: &HandlerContext<'a>,
    reference: &Hash,
) -> Result<(&'a EventRecord, RollCallStatus, Option<Hash>, Vec<PublicKey>), HandlerError> {
    let event = ctx
        .state
        .event_by_id_or_alias(reference)
        .ok_or_else(|| HandlerError::new(format!("unknown roll call {reference}")))?;
    match &event.kind {
        EventKind::RollCall {
            status,
            update_id,
            attendees,
        } => Ok((event, *status, update_id.clone(), attendees.clone())),
        _ => Err(HandlerError::new(format!("event {reference} is not a roll call"))),
    }
}

pub fn handle_open(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::RollCallOpen(open) = ctx.data else {
        return Err(HandlerError::new("roll_call#open handler received wrong payload"));
    };

    let lao = ctx.lao()?;
    let expected = OpenRollCall::expected_update_id(&lao.id, &open.opens, open.opened_at);
    if expected != open.update_id {
        return Err(HandlerError::new(format!(
            "update_id {} does not match recomputed {expected}",
            open.update_id
        )));
    }

    let (event, status, update_id, attendees) = roll_call_event(ctx, &open.opens)?;
    match status {
        RollCallStatus::Opened if update_id.as_ref() == Some(&open.update_id) => {
            return Ok(HandlerOutcome::Duplicate)
        }
        RollCallStatus::Created => {}
        _ => {
            return Err(HandlerError::new(format!(
                "roll call {} cannot be opened from {status:?}",
                event.id
            )))
        }
    }

    let mut updated = event.clone();
    updated.kind = EventKind::RollCall {
        status: RollCallStatus::Opened,
        update_id: Some(open.update_id.clone()),
        attendees,
    };
    Ok(HandlerOutcome::Apply(vec![StateTransition::UpdateEvent {
        event: updated,
    }]))
}

pub fn handle_close(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::RollCallClose(close) = ctx.data else {
        return Err(HandlerError::new("roll_call#close handler received wrong payload"));
    };

    let lao = ctx.lao()?;
    let expected = CloseRollCall::expected_update_id(&lao.id, &close.closes, close.closed_at);
    if expected != close.update_id {
        return Err(HandlerError::new(format!(
            "update_id {} does not match recomputed {expected}",
            close.update_id
        )));
    }

    let (event, status, update_id, _attendees) = roll_call_event(ctx, &close.closes)?;
    match status {
        RollCallStatus::Closed if update_id.as_ref() == Some(&close.update_id) => {
            return Ok(HandlerOutcome::Duplicate)
        }
        RollCallStatus::Opened => {}
        _ => {
            return Err(HandlerError::new(format!(
                "roll call {} cannot be closed from {status:?}",
                event.id
            )))
        }
    }

    let mut updated = event.clone();
    updated.end = Some(close.closed_at);
    updated.kind = EventKind::RollCall {
        status: RollCallStatus::Closed,
        update_id: Some(close.update_id.clone()),
        attendees: close.attendees.clone(),
    };
    Ok(HandlerOutcome::Apply(vec![StateTransition::UpdateEvent {
        event: updated,
    }]))
}

pub fn handle_reopen(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::RollCallReopen(reopen) = ctx.data else {
        return Err(HandlerError::new("roll_call#reopen handler received wrong payload"));
    };

    let lao = ctx.lao()?;
    let expected = OpenRollCall::expected_update_id(&lao.id, &reopen.opens, reopen.opened_at);
    if expected != reopen.update_id {
        return Err(HandlerError::new(format!(
            "update_id {} does not match recomputed {expected}",
            reopen.update_id
        )));
    }

    let (event, status, update_id, attendees) = roll_call_event(ctx, &reopen.opens)?;
    match status {
        RollCallStatus::Opened if update_id.as_ref() == Some(&reopen.update_id) => {
            return Ok(HandlerOutcome::Duplicate)
        }
        RollCallStatus::Closed => {}
        _ => {
            return Err(HandlerError::new(format!(
                "roll call {} cannot be reopened from {status:?}",
                event.id
            )))
        }
    }

    let mut updated = event.clone();
    updated.kind = EventKind::RollCall {
        status: RollCallStatus::Opened,
        update_id: Some(reopen.update_id.clone()),
        attendees,
    };
    Ok(HandlerOutcome::Apply(vec![StateTransition::UpdateEvent {
        event: updated,
    }]))
}

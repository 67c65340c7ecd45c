//! Handler for `meeting#create`.

use serde_json::Value;

use agora_messages::data::{CreateMeeting, MessageData, Payload};
use agora_messages::decode_payload;
use agora_store::records::{EventKind, EventRecord};
use agora_store::StateTransition;
use agora_types::ProtocolError;

use crate::handlers::TIMESTAMP_FUTURE_LEEWAY_SECS;
use crate::outcome::{HandlerError, HandlerOutcome};
use crate::registry::{HandlerContext, Registry, RegistryError};

pub fn configure(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        CreateMeeting::OBJECT,
        CreateMeeting::ACTION,
        decode_create,
        handle_create,
    )?;
    Ok(())
}

fn decode_create(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::MeetingCreate(decode_payload::<CreateMeeting>(value)?))
}

pub fn handle_create(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::MeetingCreate(create) = ctx.data else {
        return Err(HandlerError::new("meeting#create handler received wrong payload"));
    };

    let lao = ctx.lao()?;
    let expected = CreateMeeting::expected_id(&lao.id, create.creation, &create.name);
    if expected != create.id {
        return Err(HandlerError::new(format!(
            "meeting id {} does not match recomputed {expected}",
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
            start: create.start,
            end: create.end,
            kind: EventKind::Meeting {
                location: create.location.clone(),
            },
        },
    }]))
}

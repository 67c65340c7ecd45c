//! Handlers for election lifecycle markers.

use serde_json::Value;

use agora_messages::data::{ElectionQuestion, EndElection, MessageData, Payload, SetupElection};
use agora_messages::decode_payload;
use agora_store::records::{ElectionStatus, EventKind, EventRecord};
use agora_store::StateTransition;
use agora_types::ProtocolError;

use crate::handlers::TIMESTAMP_FUTURE_LEEWAY_SECS;
use crate::outcome::{HandlerError, HandlerOutcome};
use crate::registry::{HandlerContext, Registry, RegistryError};

pub fn configure(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        SetupElection::OBJECT,
        SetupElection::ACTION,
        decode_setup,
        handle_setup,
    )?;
    registry.register(EndElection::OBJECT, EndElection::ACTION, decode_end, handle_end)?;
    Ok(())
}

fn decode_setup(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::ElectionSetup(decode_payload::<SetupElection>(value)?))
}

fn decode_end(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::ElectionEnd(decode_payload::<EndElection>(value)?))
}

pub fn handle_setup(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::ElectionSetup(setup) = ctx.data else {
        return Err(HandlerError::new("election#setup handler received wrong payload"));
    };

    let lao = ctx.lao()?;
    if setup.lao != lao.id {
        return Err(HandlerError::new(format!(
            "election#setup lao {} does not match channel LAO {}",
            setup.lao, lao.id
        )));
    }
    let expected = SetupElection::expected_id(&lao.id, setup.created_at, &setup.name);
    if expected != setup.id {
        return Err(HandlerError::new(format!(
            "election id {} does not match recomputed {expected}",
            setup.id
        )));
    }
    for question in &setup.questions {
        let expected = ElectionQuestion::expected_id(&setup.id, &question.question);
        if expected != question.id {
            return Err(HandlerError::new(format!(
                "question id {} does not match recomputed {expected}",
                question.id
            )));
        }
    }
    if setup.created_at.is_in_future(ctx.now, TIMESTAMP_FUTURE_LEEWAY_SECS) {
        return Err(HandlerError::new("created_at timestamp lies in the future"));
    }

    if ctx.state.event(&setup.id).is_some() {
        return Ok(HandlerOutcome::Duplicate);
    }

    Ok(HandlerOutcome::Apply(vec![StateTransition::AddEvent {
        event: EventRecord {
            id: setup.id.clone(),
            lao_id: lao.id.clone(),
            name: setup.name.clone(),
            created_at: setup.created_at,
            start: setup.start_time,
            end: Some(setup.end_time),
            kind: EventKind::Election {
                status: ElectionStatus::Setup,
                question_count: setup.questions.len(),
            },
        },
    }]))
}

pub fn handle_end(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::ElectionEnd(end) = ctx.data else {
        return Err(HandlerError::new("election#end handler received wrong payload"));
    };

    let lao = ctx.lao()?;
    if end.lao != lao.id {
        return Err(HandlerError::new(format!(
            "election#end lao {} does not match channel LAO {}",
            end.lao, lao.id
        )));
    }

    let event = ctx
        .state
        .event(&end.election)
        .ok_or_else(|| HandlerError::new(format!("unknown election {}", end.election)))?;
    let EventKind::Election { status, question_count } = &event.kind else {
        return Err(HandlerError::new(format!("event {} is not an election", end.election)));
    };
    if *status == ElectionStatus::Ended {
        return Ok(HandlerOutcome::Duplicate);
    }

    let mut updated = event.clone();
    updated.kind = EventKind::Election {
        status: ElectionStatus::Ended,
        question_count: *question_count,
    };
    Ok(HandlerOutcome::Apply(vec![StateTransition::UpdateEvent {
        event: updated,
    }]))
}

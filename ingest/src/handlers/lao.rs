//! Handlers for the LAO lifecycle routes.

use serde_json::Value;

use agora_crypto::verify;
use agora_messages::data::{CreateLao, GreetLao, MessageData, Payload, StateLao, UpdateLao};
use agora_messages::decode_payload;
use agora_store::records::{GreetRecord, LaoRecord};
use agora_store::StateTransition;
use agora_types::{ChannelId, ProtocolError};

use crate::handlers::TIMESTAMP_FUTURE_LEEWAY_SECS;
use crate::outcome::{HandlerError, HandlerOutcome};
use crate::registry::{HandlerContext, Registry, RegistryError};

pub fn configure(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(CreateLao::OBJECT, CreateLao::ACTION, decode_create, handle_create)?;
    registry.register(UpdateLao::OBJECT, UpdateLao::ACTION, decode_update, handle_update)?;
    registry.register(StateLao::OBJECT, StateLao::ACTION, decode_state, handle_state)?;
    registry.register(GreetLao::OBJECT, GreetLao::ACTION, decode_greet, handle_greet)?;
    Ok(())
}

fn decode_create(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::LaoCreate(decode_payload::<CreateLao>(value)?))
}

fn decode_update(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::LaoUpdateProperties(decode_payload::<UpdateLao>(value)?))
}

fn decode_state(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::LaoState(decode_payload::<StateLao>(value)?))
}

fn decode_greet(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::LaoGreet(decode_payload::<GreetLao>(value)?))
}

/// `lao#create` — arrives on the root channel; the id is self-certifying.
pub fn handle_create(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::LaoCreate(create) = ctx.data else {
        return Err(HandlerError::new("lao#create handler received wrong payload"));
    };

    let expected = CreateLao::expected_id(&create.organizer, create.creation, &create.name);
    if expected != create.id {
        return Err(HandlerError::new(format!(
            "lao id {} does not match recomputed {expected}",
            create.id
        )));
    }
    if create.creation.is_in_future(ctx.now, TIMESTAMP_FUTURE_LEEWAY_SECS) {
        return Err(HandlerError::new("creation timestamp lies in the future"));
    }
    if ctx.message.sender != create.organizer {
        return Err(HandlerError::new("lao#create must be sent by the organizer"));
    }

    if ctx.state.lao(&create.id).is_some() {
        return Ok(HandlerOutcome::Duplicate);
    }

    let mut subscribed_channels = std::collections::BTreeSet::new();
    subscribed_channels.insert(ChannelId::for_lao(&create.id));

    Ok(HandlerOutcome::Apply(vec![StateTransition::AddLao {
        lao: LaoRecord {
            id: create.id.clone(),
            name: create.name.clone(),
            creation: create.creation,
            last_modified: create.creation,
            organizer: create.organizer.clone(),
            witnesses: create.witnesses.iter().cloned().collect(),
            server_addresses: Vec::new(),
            subscribed_channels,
        },
    }]))
}

/// `lao#update_properties` — only the organizer may change name/witnesses.
pub fn handle_update(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::LaoUpdateProperties(update) = ctx.data else {
        return Err(HandlerError::new("lao#update_properties handler received wrong payload"));
    };

    let lao = ctx.lao()?;
    if ctx.message.sender != lao.organizer {
        return Err(HandlerError::new(
            "lao#update_properties must be sent by the organizer",
        ));
    }
    // the carried id is recomputed over the (possibly renamed) LAO
    let expected = CreateLao::expected_id(&lao.organizer, lao.creation, &update.name);
    if expected != update.id {
        return Err(HandlerError::new(format!(
            "lao#update_properties id {} does not match recomputed {expected}",
            update.id
        )));
    }
    if update.last_modified < lao.creation {
        return Err(HandlerError::new("last_modified precedes the LAO's creation"));
    }

    let new_witnesses: std::collections::BTreeSet<_> = update.witnesses.iter().cloned().collect();
    if lao.name == update.name
        && lao.last_modified == update.last_modified
        && lao.witnesses == new_witnesses
    {
        return Ok(HandlerOutcome::Duplicate);
    }

    Ok(HandlerOutcome::Apply(vec![StateTransition::UpdateLao {
        id: lao.id.clone(),
        name: update.name.clone(),
        last_modified: update.last_modified,
        witnesses: update.witnesses.clone(),
    }]))
}

/// `lao#state` — a server-broadcast snapshot after a witnessed update. All
/// carried modification signatures must verify over the modification id.
pub fn handle_state(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::LaoState(state) = ctx.data else {
        return Err(HandlerError::new("lao#state handler received wrong payload"));
    };

    let lao = ctx.lao()?;
    if state.id != lao.id {
        return Err(HandlerError::new(format!(
            "lao#state id {} does not match channel LAO {}",
            state.id, lao.id
        )));
    }
    for ws in &state.modification_signatures {
        if !verify(
            state.modification_id.as_str().as_bytes(),
            &ws.signature,
            &ws.witness,
        ) {
            return Err(HandlerError::new(format!(
                "modification signature by {} does not verify",
                ws.witness
            )));
        }
    }

    let new_witnesses: std::collections::BTreeSet<_> = state.witnesses.iter().cloned().collect();
    if lao.name == state.name
        && lao.last_modified == state.last_modified
        && lao.witnesses == new_witnesses
    {
        return Ok(HandlerOutcome::Duplicate);
    }

    Ok(HandlerOutcome::Apply(vec![StateTransition::UpdateLao {
        id: lao.id.clone(),
        name: state.name.clone(),
        last_modified: state.last_modified,
        witnesses: state.witnesses.clone(),
    }]))
}

/// `lao#greet` — store the handshake record; acting on it waits for the
/// greet watcher. Signatures already carried in the envelope are verified
/// and seed the collected set.
pub fn handle_greet(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::LaoGreet(greet) = ctx.data else {
        return Err(HandlerError::new("lao#greet handler received wrong payload"));
    };

    let lao = ctx.lao()?;
    if greet.lao != lao.id {
        return Err(HandlerError::new(format!(
            "lao#greet lao {} does not match channel LAO {}",
            greet.lao, lao.id
        )));
    }

    if ctx.state.greeting(&ctx.message.message_id).is_some() {
        return Ok(HandlerOutcome::Duplicate);
    }

    let mut collected = std::collections::BTreeSet::new();
    for ws in &ctx.message.witness_signatures {
        if !verify(
            ctx.message.message_id.as_str().as_bytes(),
            &ws.signature,
            &ws.witness,
        ) {
            return Err(HandlerError::new(format!(
                "witness signature by {} does not verify",
                ws.witness
            )));
        }
        collected.insert(ws.witness.clone());
    }

    Ok(HandlerOutcome::Apply(vec![
        StateTransition::AddGreeting {
            greeting: GreetRecord {
                message_id: ctx.message.message_id.clone(),
                lao_id: lao.id.clone(),
                server_key: ctx.message.sender.clone(),
                address: greet.address.clone(),
                peers: greet.peers.iter().map(|p| p.address.clone()).collect(),
                collected_signatures: collected,
            },
        },
        StateTransition::AddServerAddress {
            lao_id: lao.id.clone(),
            address: greet.address.clone(),
        },
    ]))
}

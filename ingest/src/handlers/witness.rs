//! Handler for `message#witness` cosignatures.

use serde_json::Value;

use agora_crypto::verify;
use agora_messages::data::{MessageData, Payload, WitnessMessage};
use agora_messages::decode_payload;
use agora_store::StateTransition;
use agora_types::ProtocolError;

use crate::outcome::{HandlerError, HandlerOutcome};
use crate::registry::{HandlerContext, Registry, RegistryError};

pub fn configure(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        WitnessMessage::OBJECT,
        WitnessMessage::ACTION,
        decode_witness,
        handle_witness,
    )?;
    Ok(())
}

fn decode_witness(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::MessageWitness(decode_payload::<WitnessMessage>(value)?))
}

/// Attach a verified cosignature to the record of the witnessed message.
///
/// Only greet records accumulate signatures in this client; a witness
/// message for anything else is ignored, not rejected — other builds may
/// track more message kinds.
pub fn handle_witness(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::MessageWitness(witness) = ctx.data else {
        return Err(HandlerError::new("message#witness handler received wrong payload"));
    };

    if !verify(
        witness.message_id.as_str().as_bytes(),
        &witness.signature,
        &ctx.message.sender,
    ) {
        return Err(HandlerError::new(
            "witness signature does not verify against the sender key",
        ));
    }

    match ctx.state.greeting(&witness.message_id) {
        Some(greeting) => {
            if greeting.collected_signatures.contains(&ctx.message.sender) {
                return Ok(HandlerOutcome::Duplicate);
            }
            Ok(HandlerOutcome::Apply(vec![
                StateTransition::AddGreetSignature {
                    message_id: witness.message_id.clone(),
                    witness: ctx.message.sender.clone(),
                },
            ]))
        }
        None => Ok(HandlerOutcome::Ignored),
    }
}

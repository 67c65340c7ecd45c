//! Handler for `coin#post_transaction` — the ledger reducer's entry point.

use serde_json::Value;

use agora_ledger::TransactionRecord;
use agora_messages::data::{MessageData, Payload, PostTransaction};
use agora_messages::decode_payload;
use agora_store::records::{EventKind, RollCallStatus};
use agora_store::StateTransition;
use agora_types::{Hash, ProtocolError};

use crate::outcome::{HandlerError, HandlerOutcome};
use crate::registry::{HandlerContext, Registry, RegistryError};

pub fn configure(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        PostTransaction::OBJECT,
        PostTransaction::ACTION,
        decode_post_transaction,
        handle_post_transaction,
    )?;
    Ok(())
}

fn decode_post_transaction(value: &Value) -> Result<MessageData, ProtocolError> {
    Ok(MessageData::CoinPostTransaction(decode_payload::<PostTransaction>(value)?))
}

/// The scope coins live in: the most recently closed roll call of the LAO.
fn latest_closed_roll_call(ctx: &HandlerContext<'_>, lao_id: &Hash) -> Option<Hash> {
    ctx.state
        .events_for(lao_id)
        .iter()
        .rev()
        .find(|event| {
            matches!(
                event.kind,
                EventKind::RollCall {
                    status: RollCallStatus::Closed,
                    ..
                }
            )
        })
        .map(|event| event.id.clone())
}

pub fn handle_post_transaction(ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
    let MessageData::CoinPostTransaction(post) = ctx.data else {
        return Err(HandlerError::new("coin#post_transaction handler received wrong payload"));
    };

    let lao = ctx.lao()?;

    // acceptance policy (trusting by default)
    ctx.policy
        .check(post)
        .map_err(|violation| HandlerError::new(violation.to_string()))?;

    let roll_call_id = latest_closed_roll_call(ctx, &lao.id).ok_or_else(|| {
        HandlerError::new("no closed roll call to scope the transaction")
    })?;

    let record = TransactionRecord::from_message(post);
    if let Some(existing) = ctx
        .state
        .cash()
        .transaction(&lao.id, &roll_call_id, &record.transaction_id)
    {
        if existing == &record {
            return Ok(HandlerOutcome::Duplicate);
        }
        return Err(HandlerError::new(format!(
            "transaction {} conflicts with an already stored body",
            record.transaction_id
        )));
    }

    Ok(HandlerOutcome::Apply(vec![StateTransition::AddTransaction {
        lao_id: lao.id.clone(),
        roll_call_id,
        transaction: record,
    }]))
}

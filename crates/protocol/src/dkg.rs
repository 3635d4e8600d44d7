//! Distributed key generation: every party sends its own public share to the
//! server, which multiplies them all (including its own) into the aggregate
//! public key and broadcasts the result back.
//!
//! The server side is modeled as a [`state_machine::StateMachineState`]
//! that completes once it has collected one share from every other party, in
//! the same fixed party-list order the protocol thread receives them in.

use std::fmt;
use std::str::FromStr;

use basic_types::PartyId;
use bigint::BigUint;
use serde::{Deserialize, Serialize};
use state_machine::{StateMachine, StateMachineState, StateMachineStateExt, StateMachineStateOutput, StateMachineStateResult};

use crate::errors::ProtocolError;
use crate::party::Party;

/// One party's public key share, addressed to the server.
#[derive(Clone, Serialize, Deserialize)]
pub struct ShareMessage {
    sender: PartyId,
    /// Decimal encoding of the share, since `BigUint` has no `serde` impl
    /// without enabling `num-bigint`'s own `serde` feature workspace-wide.
    value: String,
}

/// The server-side DKG collection state: waits for one share from each
/// party still in `expected`.
pub struct DkgCollectState {
    expected: Vec<PartyId>,
    collected: Vec<BigUint>,
}

impl DkgCollectState {
    /// Starts a fresh collection, expecting one share from each party in
    /// `expected`.
    pub fn new(expected: Vec<PartyId>) -> Self {
        Self { expected, collected: Vec::new() }
    }
}

impl fmt::Display for DkgCollectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DkgCollectState({}/{})", self.collected.len(), self.collected.len() + self.expected.len())
    }
}

impl StateMachineState for DkgCollectState {
    type RecipientId = PartyId;
    type InputMessage = ShareMessage;
    type OutputMessage = ShareMessage;
    type FinalResult = Vec<BigUint>;

    fn is_completed(&self) -> bool {
        self.expected.is_empty()
    }

    fn try_next(self) -> StateMachineStateResult<Self> {
        if self.is_completed() {
            Ok(StateMachineStateOutput::Final(self.collected))
        } else {
            Ok(StateMachineStateOutput::Empty(self))
        }
    }

    fn handle_message(mut self, message: Self::InputMessage) -> StateMachineStateResult<Self> {
        match self.expected.iter().position(|p| p == &message.sender) {
            Some(index) => {
                self.expected.remove(index);
                let value = BigUint::from_str(&message.value).map_err(|err| {
                    state_machine::errors::StateMachineError::UnexpectedError(anyhow::anyhow!(
                        "invalid DKG share from {}: {err}",
                        message.sender
                    ))
                })?;
                self.collected.push(value);
                self.advance_if_completed()
            }
            None => Ok(StateMachineStateOutput::OutOfOrder(self, message)),
        }
    }
}

/// Runs the server side of DKG: collects every other party's public share
/// (in fixed party-list order), multiplies them into its own share to form
/// the aggregate public key, and broadcasts the result.
pub async fn run_server(party: &mut Party) -> Result<(), ProtocolError> {
    let expected: Vec<PartyId> = party.router.other_parties().cloned().collect();
    let mut sm = StateMachine::new(DkgCollectState::new(expected.clone()));

    let mut shares = Vec::new();
    for sender in expected {
        let channel = party.router.registry().get(&sender).await?;
        let value = channel.receive_bigint().await?;
        let message = ShareMessage { sender, value: value.to_string() };
        if let state_machine::StateMachineOutput::Final(collected) = sm.handle_message(message)? {
            shares = collected;
        }
    }

    let modulus = party.key_holder.params().modulus().clone();
    let mut aggregate = party.key_holder.own_public_share().clone();
    for share in &shares {
        aggregate = modulus.mul_mod(&aggregate, share);
    }
    party.key_holder.set_aggregate_public_key(aggregate.clone());
    party.router.broadcast_bigint(&aggregate).await?;
    Ok(())
}

/// Runs the client side of DKG: sends this party's own share to the server
/// and overwrites it with whatever aggregate comes back.
pub async fn run_client(party: &mut Party) -> Result<(), ProtocolError> {
    let server = party.server_id();
    let channel = party.router.registry().get(&server).await?;
    channel.send_bigint(party.key_holder.own_public_share())?;
    let aggregate = channel.receive_bigint().await?;
    party.key_holder.set_aggregate_public_key(aggregate);
    Ok(())
}

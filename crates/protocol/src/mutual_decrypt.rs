//! The mutual decryption sub-protocol: the server broadcasts a ciphertext's
//! first half, every party contributes its partial decryption share, and the
//! server folds them into the second half to recover the plaintext.
//!
//! This collect-then-fold shape is identical to [`crate::dkg`]'s server-side
//! round, but it runs once per bloom filter position (or once per element in
//! the enhanced variant) rather than once per protocol run, so it is driven
//! directly rather than through the state machine engine to avoid paying that
//! abstraction's overhead on a hot per-position loop.

use bigint::BigUint;
use elgamal::Ciphertext;

use crate::errors::ProtocolError;
use crate::party::Party;

/// Runs the server side of one mutual decryption round over `ciphertext`,
/// returning the recovered plaintext.
pub async fn server_round(party: &Party, ciphertext: &Ciphertext) -> Result<BigUint, ProtocolError> {
    party.router.broadcast_bigint(&ciphertext.c1).await?;
    let own_share = party.key_holder.partial_decrypt(&ciphertext.c1);
    let mut shares = vec![own_share];
    shares.extend(party.router.collect_bigints().await?);
    let modulus = party.key_holder.params().modulus();
    Ok(elgamal::fully_decrypt(&ciphertext.c2, &shares, modulus))
}

/// Runs the client side of one mutual decryption round: receives `c1` from
/// the server and sends back this party's partial decryption share.
pub async fn client_round(party: &Party) -> Result<(), ProtocolError> {
    let server = party.server_id();
    let channel = party.router.registry().get(&server).await?;
    let c1 = channel.receive_bigint().await?;
    let share = party.key_holder.partial_decrypt(&c1);
    channel.send_bigint(&share)?;
    Ok(())
}

//! End-to-end runs of the full protocol (connection setup, distributed key
//! generation, one ring pass, mutual decryption, count extraction) across
//! three real parties talking over loopback TCP, matching the seed scenarios
//! of spec.md's testable-properties section: identical sets all meeting the
//! threshold with the exact occurrence count, and disjoint sets producing no
//! intersection at all.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use basic_types::Role;
use bigint::BigUint;
use elgamal::FieldParams;
use num_traits::FromPrimitive;
use otmpsi_config::PartyConfig;
use protocol::{Party, RoundOutcome, Variant};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// p = 727, p - 1 = 2 * 3 * 11^2, so q = 11 divides p - 1 twice over: enough
/// subgroup slack for a 3-party, threshold-2 run (`num_parties - threshold +
/// 1 == 2`). alpha = 5 is a primitive root mod 727.
fn field_params() -> FieldParams {
    FieldParams::new(
        BigUint::from_u32(727).unwrap(),
        BigUint::from_u32(5).unwrap(),
        BigUint::from_u32(11).unwrap(),
        2,
        vec![
            BigUint::from_u32(2).unwrap(),
            BigUint::from_u32(3).unwrap(),
            BigUint::from_u32(11).unwrap(),
        ],
    )
    .expect("p=727, q=11, power_q=2 is a consistent subgroup configuration")
}

/// Builds one party's configuration for a fixed `server -> alice -> bob ->
/// server` ring on three consecutive loopback ports starting at `base_port`.
fn party_config(base_port: u16, index: usize, local_name: &str) -> PartyConfig {
    let ports = [base_port, base_port + 1, base_port + 2];
    let addr = |i: usize| format!("127.0.0.1:{}", ports[i]);
    let right = (index + 1) % 3;
    PartyConfig {
        set_size: 0,
        bloom_filter_size: 64,
        same_num: 0,
        same_seed: 0,
        diff_seed: 0,
        benchmark_rounds: 1,
        number_of_parties: 3,
        threshold: 2,
        number_of_hash_functions: 3,
        hash_seeds: vec![11, 29, 47],
        is_server: index == 0,
        port: ports[index],
        local_name: local_name.to_string(),
        server_address: addr(0),
        right_neighbor_address: addr(right),
        all_parties: vec!["server".to_string(), "alice".to_string(), "bob".to_string()],
        buffer_size: 4,
    }
}

/// Establishes this party's connections, builds it, runs DKG, and runs one
/// base-variant round, bounded by a generous timeout so a wiring mistake
/// fails the test instead of hanging the suite.
async fn run_party(
    config: PartyConfig,
    params: FieldParams,
    role: Role,
    elements: Vec<u32>,
    seed: u64,
) -> anyhow::Result<RoundOutcome> {
    tokio::time::timeout(Duration::from_secs(30), async move {
        let registry = protocol::establish_connections(&config).await?;
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut party = Party::new(role, elements, params, config, registry, &mut rng)?;
        party.run_dkg().await?;
        let outcome = party.run_round(Variant::Base, &mut rng).await?;
        Ok::<_, anyhow::Error>(outcome)
    })
    .await
    .map_err(|_| anyhow::anyhow!("party did not complete its round within the timeout"))?
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn identical_sets_meet_threshold_with_exact_occurrence_count() {
    let params = field_params();
    let base_port = 19810u16;

    let server = tokio::spawn(run_party(
        party_config(base_port, 0, "server"),
        params.clone(),
        Role::Server,
        vec![1, 2, 3],
        1,
    ));
    let alice = tokio::spawn(run_party(
        party_config(base_port, 1, "alice"),
        params.clone(),
        Role::Client,
        vec![1, 2, 3],
        2,
    ));
    let bob = tokio::spawn(run_party(party_config(base_port, 2, "bob"), params, Role::Client, vec![1, 2, 3], 3));

    let (server, alice, bob) = tokio::join!(server, alice, bob);
    alice.expect("alice task panicked").expect("alice's round failed");
    bob.expect("bob task panicked").expect("bob's round failed");
    let outcome = server.expect("server task panicked").expect("server's round failed");

    // every element appears in all three parties' sets, clearing threshold 2
    // with the exact full occurrence count of 3, per spec.md's seed scenario 1.
    assert_eq!(outcome.intersection, vec![(3, 1), (3, 2), (3, 3)]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn disjoint_sets_produce_no_intersection() {
    let params = field_params();
    let base_port = 19820u16;

    let server = tokio::spawn(run_party(
        party_config(base_port, 0, "server"),
        params.clone(),
        Role::Server,
        vec![10, 20, 30],
        4,
    ));
    let alice = tokio::spawn(run_party(
        party_config(base_port, 1, "alice"),
        params.clone(),
        Role::Client,
        vec![40, 50, 60],
        5,
    ));
    let bob =
        tokio::spawn(run_party(party_config(base_port, 2, "bob"), params, Role::Client, vec![70, 80, 90], 6));

    let (server, alice, bob) = tokio::join!(server, alice, bob);
    alice.expect("alice task panicked").expect("alice's round failed");
    bob.expect("bob task panicked").expect("bob's round failed");
    let outcome = server.expect("server task panicked").expect("server's round failed");

    // no element is shared by any two parties, so nothing meets threshold 2,
    // per spec.md's seed scenario 3.
    assert!(outcome.intersection.is_empty());
}

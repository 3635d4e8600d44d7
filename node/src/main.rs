#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::iterator_step_by_zero,
    clippy::invalid_regex,
    clippy::string_slice,
    clippy::unimplemented,
    clippy::todo
)]

mod elements;

use std::path::PathBuf;

use anyhow::{Context, Error};
use basic_types::Role;
use clap::Parser;
use protocol::{establish_connections, Party, Variant};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tokio::select;
use tracing::{info, warn};

/// Runs one party of an OT-MPSI deployment.
#[derive(Parser)]
struct Cli {
    /// Path to this party's JSON configuration.
    #[clap(long, env = "OTMPSI_PARTY_CONFIG")]
    party_config: PathBuf,

    /// Path to the shared field parameter file.
    #[clap(long, env = "OTMPSI_FIELD_PARAMS")]
    field_params: PathBuf,

    /// Path to a file holding this party's local element set, one `u32` per
    /// line.
    #[clap(long, env = "OTMPSI_ELEMENTS")]
    elements: PathBuf,

    /// Run the enhanced variant instead of the base one.
    #[clap(long)]
    enhanced: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let _ = std::env::var("RUST_LOG").map_err(|_| std::env::set_var("RUST_LOG", "node=info"));
    tracing_subscriber::fmt::init();

    let (config, field_params) = otmpsi_config::load_with_field_params(&cli.party_config, &cli.field_params)
        .context("failed to load configuration")?;
    let local_elements = elements::load(&cli.elements).context("failed to load local element set")?;
    let role = if config.is_server { Role::Server } else { Role::Client };
    let variant = if cli.enhanced { Variant::Enhanced } else { Variant::Base };
    let rounds = config.benchmark_rounds;

    info!(party = %config.local_name, role = ?role, elements = local_elements.len(), "establishing connections");
    let registry = establish_connections(&config).await.context("failed to establish connections")?;

    let mut rng = ChaCha20Rng::from_entropy();
    let mut party =
        Party::new(role, local_elements, field_params, config, registry, &mut rng).context("failed to build party")?;

    info!("running distributed key generation");
    party.run_dkg().await.context("distributed key generation failed")?;

    select! {
        result = run_benchmark(&mut party, variant, &mut rng, rounds) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, shutting down");
        }
    }

    Ok(())
}

/// Runs `rounds` full protocol rounds (at least one), logging the server's
/// recovered intersection size each time, then measures the ring's
/// round-trip latency once.
async fn run_benchmark(
    party: &mut Party,
    variant: Variant,
    rng: &mut ChaCha20Rng,
    rounds: u32,
) -> Result<(), Error> {
    for round in 0..rounds.max(1) {
        let outcome = party.run_round(variant, rng).await?;
        if outcome.intersection.is_empty() {
            info!(round, "round complete, no elements met the threshold");
        } else {
            info!(round, found = outcome.intersection.len(), "round complete");
        }
    }

    if let Some(latency) = party.measure_ring_latency().await? {
        info!(?latency, "ring round-trip latency");
    }

    Ok(())
}

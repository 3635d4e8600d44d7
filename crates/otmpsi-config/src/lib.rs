//! Configuration loading for one OT-MPSI party: the per-run JSON document
//! plus the shared, offline-generated field parameter file.

#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::iterator_step_by_zero,
    clippy::invalid_regex,
    clippy::string_slice,
    clippy::unimplemented,
    clippy::todo
)]

mod errors;
mod field_params;
mod party_config;

pub use errors::ConfigError;
pub use field_params::FieldParamsFile;
pub use party_config::{load_with_field_params, PartyConfig};

//! `prysm-core` — shared error taxonomy, configuration, domain types, and
//! locale tables used by every other Prysm crate.

pub mod config;
pub mod error;
pub mod locale;
pub mod types;

pub use error::{PrysmError, Result};

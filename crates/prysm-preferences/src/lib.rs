//! `prysm-preferences` — the versioned preference store: v3.0 nested
//! topic/subtopic preferences with on-read migration from legacy shapes,
//! plus per-user scheduling preferences.

pub mod error;
pub mod migration;
pub mod store;

pub use error::{PreferencesError, Result};
pub use store::PreferenceStore;

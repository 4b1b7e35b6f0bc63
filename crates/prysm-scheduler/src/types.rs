use chrono::{DateTime, Utc};

/// One fired scheduling window for one user, forwarded from the tick loop
/// to the worker pool (spec §4.9).
#[derive(Debug, Clone)]
pub struct ScheduledRun {
    pub user_id: String,
    pub window_start: DateTime<Utc>,
    pub presenter_name: String,
    pub language: String,
    pub voice_id: String,
}

pub const DEFAULT_PRESENTER_NAME: &str = "Alex";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_VOICE_ID: &str = "voice-default";

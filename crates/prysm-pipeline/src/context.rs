use std::time::Duration;

use chrono::{DateTime, Utc};

/// Outcome of a single orchestrator stage (spec §4.8 ADDED detail).
/// Carried in the run result rather than `?`-propagated so later stages can
/// still run or record their own outcome (the push step is explicitly
/// non-fatal).
#[derive(Debug, Clone, Default)]
pub struct StepOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub duration: Option<Duration>,
}

impl StepOutcome {
    pub fn ok(duration: Duration) -> Self {
        Self { success: true, error: None, duration: Some(duration) }
    }

    pub fn failed(error: impl Into<String>, duration: Duration) -> Self {
        Self { success: false, error: Some(error.into()), duration: Some(duration) }
    }
}

/// Mutable run context threaded through `fetch_stage → report_stage →
/// podcast_stage → notify_stage`. Mirrors the single-pass, step-by-step
/// shape the teacher's non-streaming message pipeline uses, generalized
/// into explicit named stages instead of one long function body.
pub struct PipelineContext {
    pub user_id: String,
    pub presenter_name: String,
    pub language: String,
    pub country: String,
    pub voice_id: String,
    pub started_at: DateTime<Utc>,

    pub fetch: StepOutcome,
    pub report: StepOutcome,
    pub podcast: StepOutcome,
    pub notify: StepOutcome,

    pub article_count: usize,
    pub report_topic_count: usize,
    pub audio_url: Option<String>,
    pub push_sent: bool,
}

impl PipelineContext {
    pub fn new(user_id: impl Into<String>, presenter_name: impl Into<String>, language: impl Into<String>, country: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            presenter_name: presenter_name.into(),
            language: language.into(),
            country: country.into(),
            voice_id: voice_id.into(),
            started_at: Utc::now(),
            fetch: StepOutcome::default(),
            report: StepOutcome::default(),
            podcast: StepOutcome::default(),
            notify: StepOutcome::default(),
            article_count: 0,
            report_topic_count: 0,
            audio_url: None,
            push_sent: false,
        }
    }

    pub fn into_result(self) -> UpdateResult {
        UpdateResult {
            user_id: self.user_id,
            started_at: self.started_at,
            fetch: self.fetch,
            report: self.report,
            podcast: self.podcast,
            notify: self.notify,
            article_count: self.article_count,
            report_topic_count: self.report_topic_count,
            audio_url: self.audio_url,
            push_sent: self.push_sent,
        }
    }
}

/// Structured result of one `run_update` invocation (spec §4.8: "Return a
/// structured result with per-step success flags and key identifiers").
#[derive(Debug, Clone)]
pub struct UpdateResult {
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub fetch: StepOutcome,
    pub report: StepOutcome,
    pub podcast: StepOutcome,
    pub notify: StepOutcome,
    pub article_count: usize,
    pub report_topic_count: usize,
    pub audio_url: Option<String>,
    pub push_sent: bool,
}

impl UpdateResult {
    /// The pipeline is considered to have succeeded if every fatal stage
    /// (fetch, report, podcast) succeeded. Push is never fatal.
    pub fn succeeded(&self) -> bool {
        self.fetch.success && self.report.success && self.podcast.success
    }
}

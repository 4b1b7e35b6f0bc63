use std::sync::Arc;
use std::time::Instant;

use prysm_preferences::PreferenceStore;
use prysm_store::{DocStore, ObjectStore};
use tracing::{error, info};

use crate::context::{PipelineContext, UpdateResult};
use crate::fetcher::ContentFetcher;
use crate::notify::Notifier;
use crate::providers::Providers;
use crate::reports::ReportBuilder;
use crate::script::ScriptComposer;
use crate::speech::SpeechSynthesizer;

/// Pipeline Orchestrator (spec §4.8): chains fetcher → report builder →
/// script composer → synthesizer → notifier for one user. Steps 1-3 are
/// fatal; step 4 (push) is never fatal and its outcome is always recorded.
pub struct Orchestrator {
    fetcher: ContentFetcher,
    reports: ReportBuilder,
    script: ScriptComposer,
    speech: SpeechSynthesizer,
    notifier: Notifier,
    preferences: Arc<PreferenceStore>,
}

impl Orchestrator {
    pub fn new(
        providers: Providers,
        store: Arc<DocStore>,
        objects: Arc<ObjectStore>,
        preferences: Arc<PreferenceStore>,
    ) -> Self {
        Self {
            fetcher: ContentFetcher::new(providers.clone(), Arc::clone(&store)),
            reports: ReportBuilder::new(providers.clone(), Arc::clone(&store)),
            script: ScriptComposer::new(providers.clone(), Arc::clone(&store), Arc::clone(&objects)),
            speech: SpeechSynthesizer::new(providers.clone(), Arc::clone(&store), objects),
            notifier: Notifier::new(providers, store),
            preferences,
        }
    }

    pub async fn run_update(
        &self,
        user_id: &str,
        presenter_name: &str,
        language: &str,
        voice_id: &str,
    ) -> UpdateResult {
        let mut ctx = PipelineContext::new(user_id, presenter_name, language, "us", voice_id);

        let prefs = match self.preferences.get(user_id) {
            Ok(p) => p,
            Err(e) => {
                error!(user_id, error = %e, "failed to load preferences, aborting update");
                ctx.fetch = crate::context::StepOutcome::failed(e.to_string(), std::time::Duration::ZERO);
                return ctx.into_result();
            }
        };

        // Stage 1: fetch. Fatal.
        let fetch_start = Instant::now();
        match self
            .fetcher
            .refresh_user(user_id, &prefs.preferences, language, &ctx.country)
            .await
        {
            Ok(bundle) => {
                ctx.article_count = bundle.summary.total_articles;
                ctx.fetch = crate::context::StepOutcome::ok(fetch_start.elapsed());

                // Stage 2: report. Fatal.
                let report_start = Instant::now();
                match self.reports.complete_user_report(&bundle).await {
                    Ok(report_bundle) => {
                        ctx.report_topic_count = report_bundle.reports.len();
                        ctx.report = crate::context::StepOutcome::ok(report_start.elapsed());

                        // Stage 3: podcast (script + speech). Fatal.
                        let podcast_start = Instant::now();
                        match self.script.compose(&bundle, presenter_name, language, voice_id).await {
                            Ok(artifact) => match self.speech.synthesize(artifact).await {
                                Ok(final_artifact) => {
                                    ctx.audio_url = final_artifact.audio_url.clone();
                                    ctx.podcast = crate::context::StepOutcome::ok(podcast_start.elapsed());
                                }
                                Err(e) => {
                                    error!(user_id, error = %e, "speech synthesis failed");
                                    ctx.podcast = crate::context::StepOutcome::failed(e.to_string(), podcast_start.elapsed());
                                }
                            },
                            Err(e) => {
                                error!(user_id, error = %e, "script composition failed");
                                ctx.podcast = crate::context::StepOutcome::failed(e.to_string(), podcast_start.elapsed());
                            }
                        }
                    }
                    Err(e) => {
                        error!(user_id, error = %e, "report build failed");
                        ctx.report = crate::context::StepOutcome::failed(e.to_string(), report_start.elapsed());
                    }
                }
            }
            Err(e) => {
                error!(user_id, error = %e, "content fetch failed");
                ctx.fetch = crate::context::StepOutcome::failed(e.to_string(), fetch_start.elapsed());
            }
        }

        // Stage 4: notify. Never fatal, always attempted and recorded.
        let notify_start = Instant::now();
        match self.notifier.notify(user_id).await {
            Ok(Some(_)) => {
                ctx.push_sent = true;
                ctx.notify = crate::context::StepOutcome::ok(notify_start.elapsed());
            }
            Ok(None) => {
                ctx.notify = crate::context::StepOutcome::ok(notify_start.elapsed());
            }
            Err(e) => {
                ctx.notify = crate::context::StepOutcome::failed(e.to_string(), notify_start.elapsed());
            }
        }

        info!(
            user_id,
            succeeded = ctx.fetch.success && ctx.report.success && ctx.podcast.success,
            push_sent = ctx.push_sent,
            "pipeline run complete"
        );
        ctx.into_result()
    }
}

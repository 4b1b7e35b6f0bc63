pub mod context;
pub mod error;
pub mod fetcher;
pub mod notify;
pub mod orchestrate;
pub mod providers;
pub mod reports;
pub mod script;
pub mod speech;

pub use context::{PipelineContext, StepOutcome, UpdateResult};
pub use error::{PipelineError, Result};
pub use fetcher::ContentFetcher;
pub use notify::Notifier;
pub use orchestrate::Orchestrator;
pub use providers::Providers;
pub use reports::ReportBuilder;
pub use script::ScriptComposer;
pub use speech::SpeechSynthesizer;

pub mod db;
pub mod engine;
pub mod error;
pub mod pool;
pub mod types;

pub use engine::SchedulerEngine;
pub use error::{Result, SchedulerError};
pub use pool::WorkerPool;
pub use types::ScheduledRun;

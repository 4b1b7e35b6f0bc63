use std::sync::Arc;

use prysm_pipeline::Orchestrator;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::types::ScheduledRun;

const DEFAULT_WORKER_COUNT: usize = 4;
const CHANNEL_CAPACITY: usize = 256;

/// Bounded worker pool consuming `ScheduledRun`s fired by the scheduler
/// tick loop. A fixed number of long-lived `tokio::spawn` tasks each pull
/// from a shared `mpsc::Receiver`, generalizing
/// `skynet-scheduler::engine::SchedulerEngine`'s non-blocking
/// `fired_tx.try_send` forwarding into a consumer side with bounded
/// concurrency, rather than running every fired job inline on the tick
/// loop.
pub struct WorkerPool {
    tx: mpsc::Sender<ScheduledRun>,
}

impl WorkerPool {
    /// Spawn `worker_count` consumer tasks (default 4), each driving the
    /// orchestrator for whichever `ScheduledRun` it receives next.
    pub fn spawn(orchestrator: Arc<Orchestrator>, worker_count: Option<usize>) -> Self {
        let worker_count = worker_count.unwrap_or(DEFAULT_WORKER_COUNT).max(1);
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        for worker_id in 0..worker_count {
            let orchestrator = Arc::clone(&orchestrator);
            let rx = Arc::clone(&rx);
            tokio::spawn(async move {
                loop {
                    let run = {
                        let mut rx = rx.lock().await;
                        rx.recv().await
                    };
                    let Some(run) = run else {
                        info!(worker_id, "worker pool channel closed, worker exiting");
                        break;
                    };
                    info!(worker_id, user_id = run.user_id, "worker picking up scheduled run");
                    let result = orchestrator
                        .run_update(&run.user_id, &run.presenter_name, &run.language, &run.voice_id)
                        .await;
                    if !result.succeeded() {
                        warn!(worker_id, user_id = run.user_id, "scheduled run did not fully succeed");
                    }
                }
            });
        }

        Self { tx }
    }

    /// Non-blocking submit. Returns `false` if the pool's channel is full or
    /// closed; the caller (the tick loop) logs and drops the run rather than
    /// stalling.
    pub fn try_submit(&self, run: ScheduledRun) -> bool {
        self.tx.try_send(run).is_ok()
    }

    pub fn sender(&self) -> mpsc::Sender<ScheduledRun> {
        self.tx.clone()
    }
}

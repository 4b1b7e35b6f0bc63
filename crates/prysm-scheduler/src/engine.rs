use std::sync::Mutex;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use prysm_core::types::{ScheduleKind, SchedulingPreferences, Weekday};
use prysm_preferences::PreferenceStore;
use rusqlite::Connection;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::db::{init_db, try_claim_window};
use crate::error::Result;
use crate::types::{ScheduledRun, DEFAULT_LANGUAGE, DEFAULT_PRESENTER_NAME, DEFAULT_VOICE_ID};

const TICK_INTERVAL: StdDuration = StdDuration::from_secs(15 * 60);
const TRIGGER_WINDOW: Duration = Duration::minutes(15);

/// Scheduler (spec §4.9): on a fixed 15-minute tick, scans all users'
/// scheduling preferences and forwards a `ScheduledRun` for every user whose
/// target time has elapsed within the current window, exactly once per
/// window. Grounded on `skynet-scheduler::engine::SchedulerEngine::run`'s
/// `tokio::select!` interval/shutdown loop and its non-blocking
/// `fired_tx.try_send` forwarding, generalized from a 1s job poll to a
/// 15-minute preferences scan with a persisted idempotency table in place
/// of the teacher's `next_run`-advance-on-fire bookkeeping.
pub struct SchedulerEngine {
    conn: Mutex<Connection>,
    preferences: std::sync::Arc<PreferenceStore>,
    fired_tx: mpsc::Sender<ScheduledRun>,
}

impl SchedulerEngine {
    pub fn new(
        conn: Connection,
        preferences: std::sync::Arc<PreferenceStore>,
        fired_tx: mpsc::Sender<ScheduledRun>,
    ) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self { conn: Mutex::new(conn), preferences, fired_tx })
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("scheduler engine started");
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick() {
                        error!("scheduler tick error: {e}");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("scheduler engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    fn tick(&self) -> Result<()> {
        let now = Utc::now();
        let conn = self.conn.lock().unwrap();
        let scheduled = self.preferences.scan_scheduling()?;

        for prefs in scheduled {
            let Some(target) = today_target(&prefs, now) else {
                continue;
            };
            if !is_due(&prefs, target, now) {
                continue;
            }

            let window_key = target.to_rfc3339();
            let claimed = try_claim_window(&conn, &prefs.user_id, &window_key, &now.to_rfc3339())?;
            if !claimed {
                debug!(user_id = prefs.user_id, window = window_key, "window already fired, skipping");
                continue;
            }

            let run = ScheduledRun {
                user_id: prefs.user_id.clone(),
                window_start: target,
                presenter_name: DEFAULT_PRESENTER_NAME.to_string(),
                language: DEFAULT_LANGUAGE.to_string(),
                voice_id: DEFAULT_VOICE_ID.to_string(),
            };

            if self.fired_tx.try_send(run).is_err() {
                warn!(user_id = prefs.user_id, "worker pool channel full or closed, run dropped");
            } else {
                info!(user_id = prefs.user_id, window = window_key, "scheduled run fired");
            }
        }
        Ok(())
    }
}

/// Today's target time at `(hour, minute)` UTC for this preference row.
fn today_target(prefs: &SchedulingPreferences, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(now.year(), now.month(), now.day(), prefs.hour as u32, prefs.minute as u32, 0)
        .single()
}

/// Daily: fires whenever `0 <= now - target <= 15m`. Weekly additionally
/// requires today's weekday to match.
fn is_due(prefs: &SchedulingPreferences, target: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    if prefs.kind == ScheduleKind::Weekly {
        let today = Weekday::from_chrono(now.weekday());
        if prefs.day != Some(today) {
            return false;
        }
    }
    let delta = now - target;
    delta >= Duration::zero() && delta <= TRIGGER_WINDOW
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(kind: ScheduleKind, hour: u32, minute: u32, day: Option<Weekday>) -> SchedulingPreferences {
        SchedulingPreferences { user_id: "u1".to_string(), kind, hour: hour as u8, minute: minute as u8, day }
    }

    #[test]
    fn daily_fires_within_window() {
        let now = Utc.with_ymd_and_hms(2026, 7, 28, 9, 10, 0).unwrap();
        let p = prefs(ScheduleKind::Daily, 9, 0, None);
        let target = today_target(&p, now).unwrap();
        assert!(is_due(&p, target, now));
    }

    #[test]
    fn daily_does_not_fire_outside_window() {
        let now = Utc.with_ymd_and_hms(2026, 7, 28, 9, 20, 0).unwrap();
        let p = prefs(ScheduleKind::Daily, 9, 0, None);
        let target = today_target(&p, now).unwrap();
        assert!(!is_due(&p, target, now));
    }

    #[test]
    fn daily_does_not_fire_before_target() {
        let now = Utc.with_ymd_and_hms(2026, 7, 28, 8, 59, 0).unwrap();
        let p = prefs(ScheduleKind::Daily, 9, 0, None);
        let target = today_target(&p, now).unwrap();
        assert!(!is_due(&p, target, now));
    }

    #[test]
    fn weekly_requires_matching_weekday() {
        // 2026-07-28 is a Tuesday.
        let now = Utc.with_ymd_and_hms(2026, 7, 28, 9, 5, 0).unwrap();
        let p = prefs(ScheduleKind::Weekly, 9, 0, Some(Weekday::Monday));
        let target = today_target(&p, now).unwrap();
        assert!(!is_due(&p, target, now));

        let p_match = prefs(ScheduleKind::Weekly, 9, 0, Some(Weekday::Tuesday));
        assert!(is_due(&p_match, target, now));
    }
}

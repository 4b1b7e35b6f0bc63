use std::sync::Arc;

use prysm_core::types::{
    PreferencesTree, SchedulingPreferences, UserPreferences, CURRENT_FORMAT_VERSION,
};
use prysm_store::DocStore;
use tracing::{info, warn};

use crate::error::{PreferencesError, Result};
use crate::migration;

const PREFERENCES_COLLECTION: &str = "preferences";
const SCHEDULING_COLLECTION: &str = "scheduling_preferences";

/// Preference Store (spec §4.1): v3.0 nested preferences with on-read
/// migration from legacy flat shapes, plus scheduling preferences.
/// Grounded on `skynet_users::db` generalized from fixed columns to one
/// JSON document per user, since preferences are variable-depth.
pub struct PreferenceStore {
    store: Arc<DocStore>,
}

impl PreferenceStore {
    pub fn new(store: Arc<DocStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a v3.0 preferences tree. Every leaf must carry
    /// both `subreddits` and `queries` arrays (possibly empty) — enforced
    /// structurally by `PreferencesTree`'s type, so the only remaining
    /// check is that the caller didn't hand us an empty user id.
    pub fn save(&self, user_id: &str, preferences: PreferencesTree) -> Result<UserPreferences> {
        if user_id.trim().is_empty() {
            return Err(PreferencesError::InvalidSchema(
                "user_id must not be empty".to_string(),
            ));
        }
        self.save_with(user_id, preferences, Default::default(), "en")
    }

    pub fn save_with(
        &self,
        user_id: &str,
        preferences: PreferencesTree,
        detail_level: prysm_core::types::DetailLevel,
        language: &str,
    ) -> Result<UserPreferences> {
        let doc = UserPreferences {
            user_id: user_id.to_string(),
            preferences,
            detail_level,
            language: language.to_string(),
            format_version: CURRENT_FORMAT_VERSION.to_string(),
            updated_at: chrono::Utc::now(),
            specific_subjects: Default::default(),
        };
        self.store.set(PREFERENCES_COLLECTION, user_id, &doc)?;
        info!(user_id, topics = doc.topics_count(), "preferences saved");
        Ok(doc)
    }

    /// Fetch a user's preferences, migrating legacy shapes on read and
    /// persisting the migrated document back. Returns an empty v3.0
    /// skeleton when the user has never saved preferences (spec §6).
    pub fn get(&self, user_id: &str) -> Result<UserPreferences> {
        let raw: Option<serde_json::Value> = self.store.get(PREFERENCES_COLLECTION, user_id)?;
        let Some(raw) = raw else {
            return Ok(UserPreferences::empty(user_id));
        };

        if !migration::needs_migration(&raw) {
            return Ok(serde_json::from_value(raw)?);
        }

        warn!(user_id, "migrating legacy preferences document");
        let migrated = migration::migrate(raw);
        self.store.set(PREFERENCES_COLLECTION, user_id, &migrated)?;
        Ok(migrated)
    }

    /// Union `new_entities` into `specific_subjects` via a transactional
    /// read-union-write (spec §5).
    pub fn update_specific_subjects(
        &self,
        user_id: &str,
        new_entities: &[String],
    ) -> Result<UserPreferences> {
        // Ensure the document exists (and is migrated) before merging.
        let _ = self.get(user_id)?;

        let merged = self.store.merge(PREFERENCES_COLLECTION, user_id, |current| {
            let mut doc: UserPreferences = serde_json::from_value(current)
                .unwrap_or_else(|_| UserPreferences::empty(user_id));
            for entity in new_entities {
                doc.specific_subjects.insert(entity.clone());
            }
            doc.updated_at = chrono::Utc::now();
            serde_json::to_value(&doc).expect("UserPreferences serializes")
        })?;
        Ok(serde_json::from_value(merged)?)
    }

    /// Scheduling preferences default to daily 9:00 when absent so callers
    /// never special-case a missing row (spec §4.1 ADDED detail).
    pub fn get_scheduling(&self, user_id: &str) -> Result<SchedulingPreferences> {
        let found: Option<SchedulingPreferences> =
            self.store.get(SCHEDULING_COLLECTION, user_id)?;
        Ok(found.unwrap_or_else(|| SchedulingPreferences {
            user_id: user_id.to_string(),
            ..Default::default()
        }))
    }

    pub fn save_scheduling(&self, prefs: &SchedulingPreferences) -> Result<()> {
        self.store
            .set(SCHEDULING_COLLECTION, &prefs.user_id, prefs)?;
        Ok(())
    }

    /// All users with a scheduling-preferences document, for the scheduler
    /// tick to scan.
    pub fn scan_scheduling(&self) -> Result<Vec<SchedulingPreferences>> {
        Ok(self
            .store
            .scan(SCHEDULING_COLLECTION, |_: &SchedulingPreferences| true)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::collections::BTreeMap;

    fn store() -> PreferenceStore {
        let doc_store = Arc::new(DocStore::new(Connection::open_in_memory().unwrap()).unwrap());
        PreferenceStore::new(doc_store)
    }

    #[test]
    fn get_missing_user_returns_empty_skeleton() {
        let store = store();
        let prefs = store.get("nobody").unwrap();
        assert_eq!(prefs.format_version, CURRENT_FORMAT_VERSION);
        assert_eq!(prefs.topics_count(), 0);
    }

    #[test]
    fn save_then_get_roundtrips() {
        let store = store();
        let mut tree: PreferencesTree = BTreeMap::new();
        tree.entry("technology".to_string()).or_default().insert(
            "ai".to_string(),
            prysm_core::types::SubtopicPrefs {
                subreddits: vec!["singularity".to_string()],
                queries: vec!["ai".to_string()],
            },
        );
        store.save("u1", tree).unwrap();
        let got = store.get("u1").unwrap();
        assert_eq!(got.topics_count(), 1);
        assert_eq!(got.subtopics_count(), 1);
    }

    #[test]
    fn get_migrates_legacy_document_and_persists_it() {
        let store = store();
        store
            .store
            .set(
                PREFERENCES_COLLECTION,
                "u2",
                &serde_json::json!({
                    "user_id": "u2",
                    "topics": ["Sport"],
                    "subtopics": {"football": {}}
                }),
            )
            .unwrap();

        let migrated = store.get("u2").unwrap();
        assert_eq!(migrated.format_version, CURRENT_FORMAT_VERSION);
        assert!(migrated.preferences.contains_key("sports"));

        // Second read must not re-migrate (idempotent, already v3.0).
        let again = store.get("u2").unwrap();
        assert_eq!(again.preferences, migrated.preferences);
    }

    #[test]
    fn update_specific_subjects_unions_across_calls() {
        let store = store();
        store.save("u3", BTreeMap::new()).unwrap();
        store
            .update_specific_subjects("u3", &["tesla".to_string()])
            .unwrap();
        let result = store
            .update_specific_subjects("u3", &["tesla".to_string(), "spacex".to_string()])
            .unwrap();
        assert_eq!(result.specific_subjects.len(), 2);
    }

    #[test]
    fn get_scheduling_defaults_to_daily_nine() {
        let store = store();
        let prefs = store.get_scheduling("u4").unwrap();
        assert_eq!(prefs.hour, 9);
        assert_eq!(prefs.minute, 0);
        assert_eq!(prefs.kind, prysm_core::types::ScheduleKind::Daily);
    }
}

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use prysm_core::locale;
use prysm_core::types::{CURRENT_FORMAT_VERSION, DetailLevel, PreferencesTree, UserPreferences};

/// Flat v1/v2 preferences document: a list of topic labels (possibly
/// locale-specific) plus a separate subtopic-name → config map with no
/// parent-topic linkage (spec §4.1, "on-read migration").
#[derive(Debug, Deserialize)]
struct LegacyDocument {
    user_id: String,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    subtopics: BTreeMap<String, LegacySubtopic>,
    #[serde(default)]
    detail_level: Option<DetailLevel>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    specific_subjects: BTreeSet<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LegacySubtopic {
    #[serde(default)]
    subreddits: Option<Vec<String>>,
    #[serde(default)]
    queries: Option<Vec<String>>,
}

/// `true` when `doc`'s `format_version` is missing or not
/// [`CURRENT_FORMAT_VERSION`] — the signal that on-read migration is needed.
pub fn needs_migration(doc: &Value) -> bool {
    doc.get("format_version")
        .and_then(Value::as_str)
        .map(|v| v != CURRENT_FORMAT_VERSION)
        .unwrap_or(true)
}

/// Migrate a legacy v1/v2 document into the v3.0 nested shape. Pure
/// function of its input — running it twice on the same legacy document
/// produces byte-identical output (spec: "migration must be idempotent").
pub fn migrate(raw: Value) -> UserPreferences {
    let legacy: LegacyDocument = match serde_json::from_value(raw.clone()) {
        Ok(doc) => doc,
        Err(_) => LegacyDocument {
            user_id: raw
                .get("user_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            topics: Vec::new(),
            subtopics: BTreeMap::new(),
            detail_level: None,
            language: None,
            specific_subjects: BTreeSet::new(),
        },
    };

    let mut preferences: PreferencesTree = BTreeMap::new();

    for label in &legacy.topics {
        let canonical = locale::canonical_topic(label);
        preferences.entry(canonical.to_string()).or_default();
    }

    for (subtopic_name, legacy_subtopic) in &legacy.subtopics {
        let parent = locale::subtopic_parent(subtopic_name).unwrap_or("general");
        let entry = preferences.entry(parent.to_string()).or_default();

        let prefs = match (&legacy_subtopic.subreddits, &legacy_subtopic.queries) {
            (None, None) => locale::catalog_defaults(subtopic_name),
            (subreddits, queries) => {
                let mut defaults = locale::catalog_defaults(subtopic_name);
                if let Some(subreddits) = subreddits {
                    defaults.subreddits = subreddits.clone();
                }
                if let Some(queries) = queries {
                    defaults.queries = queries.clone();
                }
                defaults
            }
        };
        entry.insert(subtopic_name.clone(), prefs);
    }

    UserPreferences {
        user_id: legacy.user_id,
        preferences,
        detail_level: legacy.detail_level.unwrap_or_default(),
        language: legacy.language.unwrap_or_else(|| "en".to_string()),
        format_version: CURRENT_FORMAT_VERSION.to_string(),
        updated_at: Utc::now(),
        specific_subjects: legacy.specific_subjects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_maps_locale_topics_and_infers_subtopic_parent() {
        let legacy = serde_json::json!({
            "user_id": "u1",
            "topics": ["Technologie", "Sport"],
            "subtopics": {
                "ai": {"subreddits": ["singularity"], "queries": ["artificial intelligence"]},
                "football": {}
            }
        });
        let migrated = migrate(legacy);
        assert_eq!(migrated.format_version, CURRENT_FORMAT_VERSION);
        assert!(migrated.preferences.contains_key("technology"));
        assert!(migrated.preferences.contains_key("sports"));
        let ai = &migrated.preferences["technology"]["ai"];
        assert_eq!(ai.subreddits, vec!["singularity"]);
        let football = &migrated.preferences["sports"]["football"];
        assert!(football.queries.contains(&"football".to_string()));
    }

    #[test]
    fn migrate_is_idempotent_on_the_same_input() {
        let legacy = serde_json::json!({
            "user_id": "u1",
            "topics": ["business"],
            "subtopics": {"startups": {}}
        });
        let first = migrate(legacy.clone());
        let second = migrate(legacy);
        assert_eq!(first.preferences, second.preferences);
        assert_eq!(first.user_id, second.user_id);
    }

    #[test]
    fn unknown_subtopic_parent_falls_back_to_general() {
        let legacy = serde_json::json!({
            "user_id": "u1",
            "topics": [],
            "subtopics": {"some_obscure_thing": {}}
        });
        let migrated = migrate(legacy);
        assert!(migrated.preferences.contains_key("general"));
    }

    #[test]
    fn needs_migration_detects_missing_and_stale_versions() {
        assert!(needs_migration(&serde_json::json!({})));
        assert!(needs_migration(&serde_json::json!({"format_version": "2.0"})));
        assert!(!needs_migration(&serde_json::json!({"format_version": "3.0"})));
    }
}

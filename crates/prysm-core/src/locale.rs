//! Compile-time lookup tables for locale/category normalization and
//! per-language prompt strings (spec §9: "ad-hoc string tables... become
//! compile-time tables with a single lookup API").
//!
//! Grounded on `skynet-agent::registry::KNOWN_PROVIDERS` — a `&'static [..]`
//! table plus a small lookup function, rather than scattered match arms.

use crate::types::SubtopicPrefs;

/// The eight canonical topic slugs every legacy label is normalized into
/// (spec §4.1).
pub const CANONICAL_TOPICS: &[&str] = &[
    "technology",
    "business",
    "sports",
    "science",
    "health",
    "entertainment",
    "world",
    "general",
];

/// A locale-specific topic label and the canonical slug it maps to.
struct TopicAlias {
    label: &'static str,
    canonical: &'static str,
}

/// Locale-specific topic labels seen in legacy (v1/v2) documents, mapped to
/// canonical English category slugs. Matching is case-insensitive.
const TOPIC_ALIASES: &[TopicAlias] = &[
    TopicAlias { label: "technologie", canonical: "technology" },
    TopicAlias { label: "tecnologia", canonical: "technology" },
    TopicAlias { label: "technology", canonical: "technology" },
    TopicAlias { label: "tech", canonical: "technology" },
    TopicAlias { label: "affaires", canonical: "business" },
    TopicAlias { label: "negocios", canonical: "business" },
    TopicAlias { label: "business", canonical: "business" },
    TopicAlias { label: "finance", canonical: "business" },
    TopicAlias { label: "sport", canonical: "sports" },
    TopicAlias { label: "sports", canonical: "sports" },
    TopicAlias { label: "deportes", canonical: "sports" },
    TopicAlias { label: "science", canonical: "science" },
    TopicAlias { label: "sciences", canonical: "science" },
    TopicAlias { label: "ciencia", canonical: "science" },
    TopicAlias { label: "sante", canonical: "health" },
    TopicAlias { label: "santé", canonical: "health" },
    TopicAlias { label: "health", canonical: "health" },
    TopicAlias { label: "salud", canonical: "health" },
    TopicAlias { label: "divertissement", canonical: "entertainment" },
    TopicAlias { label: "entertainment", canonical: "entertainment" },
    TopicAlias { label: "entretenimiento", canonical: "entertainment" },
    TopicAlias { label: "monde", canonical: "world" },
    TopicAlias { label: "world", canonical: "world" },
    TopicAlias { label: "mundo", canonical: "world" },
    TopicAlias { label: "general", canonical: "general" },
    TopicAlias { label: "generale", canonical: "general" },
];

/// Resolve a (possibly locale-specific) topic label to a canonical slug.
/// Unknown labels fall back to `"general"` (spec §4.1(a)).
pub fn canonical_topic(label: &str) -> &'static str {
    let lower = label.trim().to_lowercase();
    TOPIC_ALIASES
        .iter()
        .find(|a| a.label == lower)
        .map(|a| a.canonical)
        .unwrap_or("general")
}

struct SubtopicParent {
    subtopic: &'static str,
    topic: &'static str,
}

/// Fixed subtopic → parent topic table used during migration (spec §4.1(b)).
/// Subtopics absent from this table are placed under `"general"`.
const SUBTOPIC_PARENTS: &[SubtopicParent] = &[
    SubtopicParent { subtopic: "ai", topic: "technology" },
    SubtopicParent { subtopic: "startups", topic: "business" },
    SubtopicParent { subtopic: "finance", topic: "business" },
    SubtopicParent { subtopic: "markets", topic: "business" },
    SubtopicParent { subtopic: "mental health", topic: "health" },
    SubtopicParent { subtopic: "nutrition", topic: "health" },
    SubtopicParent { subtopic: "football", topic: "sports" },
    SubtopicParent { subtopic: "basketball", topic: "sports" },
    SubtopicParent { subtopic: "space", topic: "science" },
    SubtopicParent { subtopic: "climate", topic: "science" },
    SubtopicParent { subtopic: "movies", topic: "entertainment" },
    SubtopicParent { subtopic: "music", topic: "entertainment" },
    SubtopicParent { subtopic: "gaming", topic: "entertainment" },
    SubtopicParent { subtopic: "politics", topic: "world" },
    SubtopicParent { subtopic: "elections", topic: "world" },
];

/// Resolve a subtopic's inferred parent topic. Returns `None` when unknown
/// (caller defaults to `"general"` per spec §4.1(b)).
pub fn subtopic_parent(subtopic: &str) -> Option<&'static str> {
    let lower = subtopic.trim().to_lowercase();
    SUBTOPIC_PARENTS
        .iter()
        .find(|p| p.subtopic == lower)
        .map(|p| p.topic)
}

struct CatalogEntry {
    subtopic: &'static str,
    subreddits: &'static [&'static str],
}

/// Built-in catalog of default `{subreddits, queries}` for well-known
/// subtopics, consulted when a migrated subtopic lacks both fields
/// (spec §4.1(c)).
const CATALOG: &[CatalogEntry] = &[
    CatalogEntry { subtopic: "ai", subreddits: &["artificial", "MachineLearning"] },
    CatalogEntry { subtopic: "startups", subreddits: &["startups", "Entrepreneur"] },
    CatalogEntry { subtopic: "finance", subreddits: &["finance", "investing"] },
    CatalogEntry { subtopic: "mental health", subreddits: &["mentalhealth"] },
    CatalogEntry { subtopic: "football", subreddits: &["soccer"] },
    CatalogEntry { subtopic: "basketball", subreddits: &["nba"] },
    CatalogEntry { subtopic: "space", subreddits: &["space"] },
    CatalogEntry { subtopic: "movies", subreddits: &["movies"] },
    CatalogEntry { subtopic: "gaming", subreddits: &["gaming"] },
];

/// Fill a migrated subtopic's `{subreddits, queries}` from the catalog, or
/// default to `{[], [subtopic_name]}` when the subtopic is unknown.
pub fn catalog_defaults(subtopic: &str) -> SubtopicPrefs {
    let lower = subtopic.trim().to_lowercase();
    match CATALOG.iter().find(|e| e.subtopic == lower) {
        Some(entry) => SubtopicPrefs {
            subreddits: entry.subreddits.iter().map(|s| s.to_string()).collect(),
            queries: vec![subtopic.to_string()],
        },
        None => SubtopicPrefs {
            subreddits: Vec::new(),
            queries: vec![subtopic.to_string()],
        },
    }
}

/// Per-language prompt phrases for the conversational discovery service
/// (spec §4.10): substrings that, if present in the assistant's reply,
/// indicate the conversation is wrapping up or ready to hand off to news.
pub struct LanguagePhrases {
    pub language: &'static str,
    pub ending_phrases: &'static [&'static str],
    pub ready_phrases: &'static [&'static str],
}

const LANGUAGE_PHRASES: &[LanguagePhrases] = &[
    LanguagePhrases {
        language: "en",
        ending_phrases: &["that's all for now", "talk soon", "see you later"],
        ready_phrases: &["let's get your news started", "ready to show you the news", "time to check the news"],
    },
    LanguagePhrases {
        language: "fr",
        ending_phrases: &["c'est tout pour l'instant", "à bientôt"],
        ready_phrases: &["passons aux actualités", "prêt à découvrir vos actualités"],
    },
    LanguagePhrases {
        language: "es",
        ending_phrases: &["eso es todo por ahora", "hasta pronto"],
        ready_phrases: &["vamos a ver tus noticias", "listo para mostrarte las noticias"],
    },
];

/// Look up the phrase table for `language`, defaulting to English when the
/// language has no dedicated table.
pub fn language_phrases(language: &str) -> &'static LanguagePhrases {
    let lower = language.trim().to_lowercase();
    LANGUAGE_PHRASES
        .iter()
        .find(|p| p.language == lower)
        .unwrap_or(&LANGUAGE_PHRASES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_topic_maps_locale_labels() {
        assert_eq!(canonical_topic("Technologie"), "technology");
        assert_eq!(canonical_topic("Business"), "business");
        assert_eq!(canonical_topic("Unknown Label"), "general");
    }

    #[test]
    fn subtopic_parent_known_and_unknown() {
        assert_eq!(subtopic_parent("AI"), Some("technology"));
        assert_eq!(subtopic_parent("Finance"), Some("business"));
        assert_eq!(subtopic_parent("Bespoke Gadgetry"), None);
    }

    #[test]
    fn catalog_defaults_known_subtopic() {
        let prefs = catalog_defaults("AI");
        assert!(prefs.subreddits.contains(&"artificial".to_string()));
        assert_eq!(prefs.queries, vec!["AI".to_string()]);
    }

    #[test]
    fn catalog_defaults_unknown_subtopic() {
        let prefs = catalog_defaults("Underwater Basket Weaving");
        assert!(prefs.subreddits.is_empty());
        assert_eq!(prefs.queries, vec!["Underwater Basket Weaving".to_string()]);
    }

    #[test]
    fn language_phrases_fallback_to_english() {
        let p = language_phrases("de");
        assert_eq!(p.language, "en");
    }
}

use prysm_providers::LlmProvider;

use crate::error::Result;

const EXTRACT_MAX_TOKENS: u32 = 120;
const EXTRACT_TEMPERATURE: f32 = 0.0;
const MODEL: &str = "claude-sonnet-4-6";

/// Inline, synchronous entity extractor (spec §4.10, second paragraph): a
/// stricter LLM call that only extracts entities the USER explicitly
/// named, never the assistant's own wording, returned as a JSON array.
pub async fn extract_entities(llm: &dyn LlmProvider, user_message: &str, language: &str) -> Result<Vec<String>> {
    let system = format!(
        "Extract only the concrete named entities (companies, people, products, or \
        events) that the USER explicitly mentioned in their message below, written in \
        language code '{language}'. Do not infer or add anything not literally named. \
        Respond with ONLY a JSON array of strings, e.g. [\"Tesla\", \"SpaceX\"]. If there \
        are none, respond with []."
    );
    let messages = vec![("user".to_string(), user_message.to_string())];

    let completion = llm
        .complete(&system, &messages, EXTRACT_MAX_TOKENS, EXTRACT_TEMPERATURE, MODEL)
        .await?;

    Ok(parse_entity_array(&completion.text))
}

fn parse_entity_array(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().trim_start_matches("```json").trim_start_matches("```").trim_end_matches("```").trim();
    serde_json::from_str::<Vec<String>>(trimmed).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_entity_array_handles_plain_json() {
        let entities = parse_entity_array(r#"["Tesla", "SpaceX"]"#);
        assert_eq!(entities, vec!["Tesla".to_string(), "SpaceX".to_string()]);
    }

    #[test]
    fn parse_entity_array_strips_markdown_fences() {
        let entities = parse_entity_array("```json\n[\"OpenAI\"]\n```");
        assert_eq!(entities, vec!["OpenAI".to_string()]);
    }

    #[test]
    fn parse_entity_array_defaults_to_empty_on_garbage() {
        let entities = parse_entity_array("not json at all");
        assert!(entities.is_empty());
    }

    #[test]
    fn parse_entity_array_handles_empty_array() {
        let entities = parse_entity_array("[]");
        assert!(entities.is_empty());
    }
}

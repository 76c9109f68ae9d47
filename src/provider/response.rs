//! Response schemas and validation of raw model output.

use super::{GuessReply, ProviderError};
use crate::games::codenames::{Board, Clue, ClueCount};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, instrument};

/// Reply expected from a clue giver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClueResponse {
    /// A single word, not on the board.
    pub word: String,
    /// How many of your words the clue relates to. 0 means none relate,
    /// 100 means all remaining words relate.
    pub number: i64,
    /// Short explanation of the clue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Reply expected from a guesser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GuessResponse {
    /// Exactly one board word.
    #[serde(default, deserialize_with = "one_or_first")]
    #[schemars(with = "String")]
    pub words: String,
    /// Set to true to stop guessing for this turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<bool>,
    /// Short explanation of the guess.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Older prompts asked for a list; take its first entry.
fn one_or_first<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(word) => word,
        OneOrMany::Many(words) => words.into_iter().next().unwrap_or_default(),
    })
}

/// Removes a surrounding Markdown code fence and any prose around the
/// JSON object.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
        text = text.trim_end();
        text = text.strip_suffix("```").unwrap_or(text).trim();
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Parses and validates a clue reply against the board.
#[instrument(skip(raw, board), fields(raw_len = raw.len()))]
pub fn parse_clue(raw: &str, board: &Board) -> Result<Clue, ProviderError> {
    let response: ClueResponse = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| ProviderError::Schema(format!("clue reply is not valid JSON: {}", e)))?;

    let word = response.word.trim();
    if word.is_empty() {
        return Err(ProviderError::Schema("clue word is empty".to_string()));
    }
    if word.split_whitespace().count() != 1 {
        return Err(ProviderError::Schema(format!(
            "clue '{}' is not a single word",
            word
        )));
    }
    let number = u32::try_from(response.number).map_err(|_| {
        ProviderError::Schema(format!("clue number {} is out of range", response.number))
    })?;

    let lowered = word.to_lowercase();
    if let Some(label) = board
        .cells()
        .iter()
        .map(|cell| cell.label())
        .find(|label| lowered.contains(&label.to_lowercase()))
    {
        return Err(ProviderError::Schema(format!(
            "clue '{}' uses board word '{}'",
            word, label
        )));
    }

    debug!(word, number, "Clue reply validated");
    Ok(Clue {
        word: word.to_string(),
        count: ClueCount::from(number),
        rationale: response.reasoning,
    })
}

/// Parses and validates a guess reply.
///
/// Whether the word is on the board is for the rules to decide.
#[instrument(skip(raw), fields(raw_len = raw.len()))]
pub fn parse_guess(raw: &str) -> Result<GuessReply, ProviderError> {
    let response: GuessResponse = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| ProviderError::Schema(format!("guess reply is not valid JSON: {}", e)))?;

    if response.skip == Some(true) {
        return Ok(GuessReply::Skip {
            rationale: response.reasoning,
        });
    }

    let word = response.words.trim();
    if word.is_empty() {
        return Err(ProviderError::Schema("guess names no word".to_string()));
    }
    Ok(GuessReply::Word {
        word: word.to_string(),
        rationale: response.reasoning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn board() -> Board {
        let words = (0..25).map(|i| format!("W{i:02}")).collect();
        Board::shuffled(words, &mut StdRng::seed_from_u64(3)).expect("valid")
    }

    #[test]
    fn test_strip_code_fence() {
        let raw = "```json\n{\"word\":\"SEA\",\"number\":2}\n```";
        assert_eq!(strip_code_fence(raw), "{\"word\":\"SEA\",\"number\":2}");
        assert_eq!(
            strip_code_fence("Sure! {\"a\":1} hope that helps"),
            "{\"a\":1}"
        );
    }

    #[test]
    fn test_parse_clue_valid() {
        let clue = parse_clue(
            r#"{"word":"SEA","number":2,"reasoning":"water"}"#,
            &board(),
        )
        .expect("valid clue");
        assert_eq!(clue.word, "SEA");
        assert_eq!(clue.count, ClueCount::Exact(2));
        assert_eq!(clue.rationale.as_deref(), Some("water"));
    }

    #[test]
    fn test_parse_clue_rejects_missing_field() {
        let err = parse_clue(r#"{"word":"SEA"}"#, &board()).unwrap_err();
        assert!(matches!(err, ProviderError::Schema(_)));
    }

    #[test]
    fn test_parse_clue_rejects_wrong_type() {
        let err = parse_clue(r#"{"word":"SEA","number":"two"}"#, &board()).unwrap_err();
        assert!(matches!(err, ProviderError::Schema(_)));
    }

    #[test]
    fn test_parse_clue_rejects_negative_number() {
        let err = parse_clue(r#"{"word":"SEA","number":-1}"#, &board()).unwrap_err();
        assert!(matches!(err, ProviderError::Schema(_)));
    }

    #[test]
    fn test_parse_clue_rejects_board_word() {
        let err = parse_clue(r#"{"word":"w03x","number":1}"#, &board()).unwrap_err();
        assert!(matches!(err, ProviderError::Schema(msg) if msg.contains("W03")));
    }

    #[test]
    fn test_parse_clue_rejects_phrase() {
        let err = parse_clue(r#"{"word":"deep sea","number":1}"#, &board()).unwrap_err();
        assert!(matches!(err, ProviderError::Schema(_)));
    }

    #[test]
    fn test_parse_guess_word_and_legacy_list() {
        assert_eq!(
            parse_guess(r#"{"words":"W01"}"#).unwrap(),
            GuessReply::Word {
                word: "W01".to_string(),
                rationale: None
            }
        );
        assert_eq!(
            parse_guess(r#"{"words":["W02","W03"]}"#).unwrap(),
            GuessReply::Word {
                word: "W02".to_string(),
                rationale: None
            }
        );
    }

    #[test]
    fn test_parse_guess_skip() {
        let reply = parse_guess(r#"{"skip":true,"reasoning":"unsure"}"#).unwrap();
        assert_eq!(
            reply,
            GuessReply::Skip {
                rationale: Some("unsure".to_string())
            }
        );
    }

    #[test]
    fn test_parse_guess_rejects_empty() {
        assert!(matches!(
            parse_guess(r#"{"words":"  "}"#),
            Err(ProviderError::Schema(_))
        ));
        assert!(matches!(
            parse_guess("not json"),
            Err(ProviderError::Schema(_))
        ));
    }
}

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use game_types::{GameError, Question};
use serde::Deserialize;
use uuid::Uuid;

use crate::GameRng;

/// Source of question content. Implementations return exactly one question per requested
/// level, in the order the levels were given.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    async fn questions_for_levels(
        &self,
        levels: &[u8],
        rng: &mut GameRng,
    ) -> Result<Vec<Question>, GameError>;
}

/// Entry of a JSON question pack. The first answer listed is the correct one unless
/// `correct_index` says otherwise.
#[derive(Debug, Deserialize)]
struct PackEntry {
    level: u8,
    text: String,
    answers: Vec<String>,
    #[serde(default)]
    correct_index: u8,
}

/// Parse a JSON array of questions, validating each entry against a ladder of `levels` rungs.
pub fn parse_question_pack(json: &str, levels: u8) -> Result<Vec<Question>> {
    let entries: Vec<PackEntry> =
        serde_json::from_str(json).context("Question pack is not valid JSON")?;

    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            if entry.level >= levels {
                return Err(anyhow!(
                    "Question #{} has level {}, ladder has {} levels",
                    position,
                    entry.level,
                    levels
                ));
            }
            if entry.text.trim().is_empty() {
                return Err(anyhow!("Question #{} has no text", position));
            }
            let answers: [String; 4] = entry.answers.try_into().map_err(|answers: Vec<String>| {
                anyhow!("Question #{} has {} answers, expected 4", position, answers.len())
            })?;
            if entry.correct_index > 3 {
                return Err(anyhow!(
                    "Question #{} has correct index {}",
                    position,
                    entry.correct_index
                ));
            }

            Ok(Question {
                id: Uuid::new_v4(),
                level: entry.level,
                text: entry.text,
                answers,
                correct_index: entry.correct_index,
            })
        })
        .collect()
}

/// Load a question pack from disk.
pub fn load_question_pack<P: AsRef<std::path::Path>>(path: P, levels: u8) -> Result<Vec<Question>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read question pack {}", path.display()))?;
    parse_question_pack(&json, levels)
}

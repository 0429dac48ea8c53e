use game_types::{GameError, HelpHash, Letter, Question};
use std::collections::BTreeMap;

use crate::GameRng;

/// One rung of a game: a question plus the per-game order its answers are shown in.
#[derive(Debug, Clone, PartialEq)]
pub struct GameQuestion {
    question: Question,
    /// `option_mapping[letter.index()]` is the index into `question.answers`.
    option_mapping: [u8; 4],
    pub help_hash: HelpHash,
}

impl GameQuestion {
    /// Bind a question to a freshly shuffled letter order.
    pub fn new(question: Question, rng: &mut GameRng) -> Self {
        let mut option_mapping = [0u8, 1, 2, 3];
        rng.shuffle(&mut option_mapping);
        Self {
            question,
            option_mapping,
            help_hash: HelpHash::default(),
        }
    }

    /// Rebuild a stored game question, rejecting mappings that are not a permutation.
    pub fn from_parts(
        question: Question,
        option_mapping: [u8; 4],
        help_hash: HelpHash,
    ) -> Result<Self, GameError> {
        let mut seen = [false; 4];
        for &target in &option_mapping {
            match seen.get_mut(target as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(GameError::InvalidGameData {
                        message: format!("option mapping {:?} is not a permutation", option_mapping),
                    });
                }
            }
        }
        if question.correct_index > 3 {
            return Err(GameError::InvalidGameData {
                message: format!("question {} has correct index {}", question.id, question.correct_index),
            });
        }

        Ok(Self {
            question,
            option_mapping,
            help_hash,
        })
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn option_mapping(&self) -> [u8; 4] {
        self.option_mapping
    }

    pub fn level(&self) -> u8 {
        self.question.level
    }

    pub fn text(&self) -> &str {
        &self.question.text
    }

    /// Letter currently pointing at the correct answer.
    pub fn correct_answer_key(&self) -> Letter {
        Letter::ALL
            .into_iter()
            .find(|letter| self.option_mapping[letter.index()] == self.question.correct_index)
            .unwrap_or(Letter::A) // unreachable for a permutation
    }

    pub fn answer_correct(&self, letter: Letter) -> bool {
        letter == self.correct_answer_key()
    }

    /// Every letter with its answer text, regardless of lifelines used.
    pub fn variants(&self) -> BTreeMap<Letter, String> {
        Letter::ALL
            .into_iter()
            .map(|letter| {
                let answer = &self.question.answers[self.option_mapping[letter.index()] as usize];
                (letter, answer.clone())
            })
            .collect()
    }

    /// Variants as presented to the player: narrowed to two after fifty-fifty.
    pub fn presented_variants(&self) -> BTreeMap<Letter, String> {
        let mut variants = self.variants();
        if let Some(kept) = &self.help_hash.fifty_fifty {
            variants.retain(|letter, _| kept.contains(letter));
        }
        variants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn question() -> Question {
        Question {
            id: Uuid::new_v4(),
            level: 3,
            text: "Who lives well in Russia?".to_string(),
            answers: [
                "Everyone".to_string(),
                "No one".to_string(),
                "Animals".to_string(),
                "People".to_string(),
            ],
            correct_index: 0,
        }
    }

    // a -> answer 2, b -> answer 1, c -> answer 4, d -> answer 3
    fn fixed_game_question() -> GameQuestion {
        GameQuestion::from_parts(question(), [1, 0, 3, 2], HelpHash::default()).unwrap()
    }

    #[test]
    fn test_variants_follow_mapping() {
        let gq = fixed_game_question();
        let variants = gq.variants();
        assert_eq!(variants[&Letter::A], "No one");
        assert_eq!(variants[&Letter::B], "Everyone");
        assert_eq!(variants[&Letter::C], "People");
        assert_eq!(variants[&Letter::D], "Animals");
    }

    #[test]
    fn test_correct_answer_key() {
        let gq = fixed_game_question();
        assert_eq!(gq.correct_answer_key(), Letter::B);
        assert!(gq.answer_correct(Letter::B));
        assert!(!gq.answer_correct(Letter::A));
    }

    #[test]
    fn test_level_and_text_delegate() {
        let gq = fixed_game_question();
        assert_eq!(gq.level(), 3);
        assert_eq!(gq.text(), "Who lives well in Russia?");
    }

    #[test]
    fn test_help_hash_starts_empty() {
        let mut rng = GameRng::new(1);
        let gq = GameQuestion::new(question(), &mut rng);
        assert!(gq.help_hash.is_empty());
    }

    #[test]
    fn test_shuffled_mapping_is_permutation() {
        let mut rng = GameRng::new(99);
        for _ in 0..50 {
            let gq = GameQuestion::new(question(), &mut rng);
            let mut targets = gq.option_mapping();
            targets.sort();
            assert_eq!(targets, [0, 1, 2, 3]);
            assert_eq!(gq.variants()[&gq.correct_answer_key()], "Everyone");
        }
    }

    #[test]
    fn test_rejects_non_permutation() {
        let result = GameQuestion::from_parts(question(), [0, 0, 1, 2], HelpHash::default());
        assert!(matches!(result, Err(GameError::InvalidGameData { .. })));

        let result = GameQuestion::from_parts(question(), [0, 1, 2, 7], HelpHash::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_presented_variants_after_fifty_fifty() {
        let mut gq = fixed_game_question();
        gq.help_hash.fifty_fifty = Some(vec![Letter::A, Letter::B]);

        let presented = gq.presented_variants();
        assert_eq!(presented.len(), 2);
        assert_eq!(presented[&Letter::A], "No one");
        assert_eq!(presented[&Letter::B], "Everyone");
        assert_eq!(gq.variants().len(), 4);
    }
}

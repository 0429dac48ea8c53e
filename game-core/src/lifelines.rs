//! Lifeline outcomes. Each function is pure apart from the random source; the once-per-game
//! rule is enforced by [`crate::Game::use_help`], not here.

use game_types::{HelpType, Letter};
use std::collections::BTreeMap;
use tracing::debug;

use crate::{GameQuestion, GameRng};

/// Chance the audience favours the right answer.
const AUDIENCE_ACCURACY: f64 = 0.8;
/// Chance the friend names the right answer.
const FRIEND_ACCURACY: f64 = 0.8;

const FRIENDS: [&str; 6] = ["Vasya", "Misha", "Olga", "Anna", "Pavel", "Kate"];

/// Simulated audience poll: a percentage for every letter, summing to 100.
pub fn audience_poll(correct: Letter, rng: &mut GameRng) -> BTreeMap<Letter, u8> {
    let favours_correct = rng.gen_bool(AUDIENCE_ACCURACY);
    let weights: Vec<(Letter, u32)> = Letter::ALL
        .into_iter()
        .map(|letter| {
            let weight = if letter == correct && favours_correct {
                rng.gen_range(45..91)
            } else {
                rng.gen_range(0..46)
            };
            (letter, weight)
        })
        .collect();

    normalize_to_percent(&weights, correct)
}

/// Largest-remainder rounding so the shares add up to exactly 100.
fn normalize_to_percent(weights: &[(Letter, u32)], fallback: Letter) -> BTreeMap<Letter, u8> {
    let total: u32 = weights.iter().map(|(_, weight)| weight).sum();
    if total == 0 {
        return Letter::ALL
            .into_iter()
            .map(|letter| (letter, if letter == fallback { 100 } else { 0 }))
            .collect();
    }

    let mut shares: Vec<(Letter, u32, u32)> = weights
        .iter()
        .map(|&(letter, weight)| {
            let scaled = weight * 100;
            (letter, scaled / total, scaled % total)
        })
        .collect();

    let assigned: u32 = shares.iter().map(|(_, share, _)| share).sum();
    let mut by_remainder: Vec<usize> = (0..shares.len()).collect();
    by_remainder.sort_by(|&a, &b| shares[b].2.cmp(&shares[a].2));
    for &index in by_remainder.iter().take((100 - assigned) as usize) {
        shares[index].1 += 1;
    }

    shares
        .into_iter()
        .map(|(letter, share, _)| (letter, share as u8))
        .collect()
}

/// Keeps the correct letter plus one random wrong letter, in letter order.
pub fn fifty_fifty(correct: Letter, rng: &mut GameRng) -> Vec<Letter> {
    let wrong: Vec<Letter> = Letter::ALL
        .into_iter()
        .filter(|&letter| letter != correct)
        .collect();
    let kept = *rng.choose(&wrong).unwrap_or(&wrong[0]);

    let mut result = vec![correct, kept];
    result.sort();
    result
}

/// Phone-a-friend transcript naming one letter, usually the right one.
pub fn friend_call(correct: Letter, rng: &mut GameRng) -> String {
    let letter = if rng.gen_bool(FRIEND_ACCURACY) {
        correct
    } else {
        let wrong: Vec<Letter> = Letter::ALL
            .into_iter()
            .filter(|&letter| letter != correct)
            .collect();
        *rng.choose(&wrong).unwrap_or(&wrong[0])
    };
    let friend = rng.choose(&FRIENDS).copied().unwrap_or(FRIENDS[0]);

    format!(
        "{} thinks the answer is {}",
        friend,
        letter.as_str().to_ascii_uppercase()
    )
}

/// Run `help` against a question and record the result in its help hash.
pub fn apply_help(question: &mut GameQuestion, help: HelpType, rng: &mut GameRng) {
    let correct = question.correct_answer_key();
    match help {
        HelpType::AudienceHelp => {
            question.help_hash.audience_help = Some(audience_poll(correct, rng));
        }
        HelpType::FiftyFifty => {
            question.help_hash.fifty_fifty = Some(fifty_fifty(correct, rng));
        }
        HelpType::FriendCall => {
            question.help_hash.friend_call = Some(friend_call(correct, rng));
        }
    }
    debug!("Applied {:?} to question {}", help, question.question().id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audience_poll_covers_all_letters_and_sums_to_100() {
        let mut rng = GameRng::new(11);
        for _ in 0..500 {
            let poll = audience_poll(Letter::C, &mut rng);
            assert_eq!(poll.keys().copied().collect::<Vec<_>>(), Letter::ALL.to_vec());
            assert_eq!(poll.values().map(|&p| p as u32).sum::<u32>(), 100);
        }
    }

    #[test]
    fn test_audience_poll_favours_correct_on_average() {
        let mut rng = GameRng::new(5);
        let mut correct_total = 0u32;
        let mut other_total = 0u32;
        for _ in 0..1000 {
            let poll = audience_poll(Letter::B, &mut rng);
            correct_total += poll[&Letter::B] as u32;
            other_total += poll[&Letter::A] as u32;
        }
        assert!(correct_total > other_total);
    }

    #[test]
    fn test_normalize_all_zero_weights() {
        let weights: Vec<(Letter, u32)> = Letter::ALL.into_iter().map(|l| (l, 0)).collect();
        let poll = normalize_to_percent(&weights, Letter::D);
        assert_eq!(poll[&Letter::D], 100);
        assert_eq!(poll[&Letter::A], 0);
    }

    #[test]
    fn test_fifty_fifty_keeps_correct_and_one_other() {
        let mut rng = GameRng::new(8);
        for correct in Letter::ALL {
            for _ in 0..100 {
                let kept = fifty_fifty(correct, &mut rng);
                assert_eq!(kept.len(), 2);
                assert!(kept.contains(&correct));
                assert_ne!(kept[0], kept[1]);
            }
        }
    }

    #[test]
    fn test_friend_call_names_a_letter() {
        let mut rng = GameRng::new(21);
        let text = friend_call(Letter::A, &mut rng);
        assert!(text.contains("thinks the answer is"));
        assert!(["A", "B", "C", "D"].iter().any(|l| text.ends_with(l)));
    }

    #[test]
    fn test_friend_call_biased_towards_correct() {
        let mut rng = GameRng::new(13);
        let hits = (0..1000)
            .filter(|_| friend_call(Letter::D, &mut rng).ends_with('D'))
            .count();
        assert!(hits > 600, "friend was right only {} times", hits);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let mut a = GameRng::new(77);
        let mut b = GameRng::new(77);
        assert_eq!(audience_poll(Letter::A, &mut a), audience_poll(Letter::A, &mut b));
        assert_eq!(friend_call(Letter::A, &mut a), friend_call(Letter::A, &mut b));
    }
}

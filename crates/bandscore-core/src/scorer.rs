//! Exact-match scoring for reading and listening answer sets.

use crate::model::AnswerSet;

/// Count the answers in `answers` that match the key in `correct`.
///
/// Only keys of `correct` are considered. Both sides are trimmed and
/// lowercased before comparison; a missing or blank submitted answer is
/// simply wrong.
pub fn score_answers(answers: &AnswerSet, correct: &AnswerSet) -> u32 {
    correct
        .iter()
        .filter(|(question, expected)| {
            answers
                .get(question.as_str())
                .map(|given| normalize(given))
                .is_some_and(|given| !given.is_empty() && given == normalize(expected))
        })
        .count() as u32
}

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, &str)]) -> AnswerSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        let answers = set(&[("1", "  TRUE "), ("2", "A")]);
        let correct = set(&[("1", "true"), ("2", "b")]);
        assert_eq!(score_answers(&answers, &correct), 1);
    }

    #[test]
    fn missing_answers_count_as_wrong() {
        let answers = set(&[("1", "north")]);
        let correct = set(&[("1", "North"), ("2", "south"), ("3", "east")]);
        assert_eq!(score_answers(&answers, &correct), 1);
    }

    #[test]
    fn extra_answers_are_ignored() {
        let answers = set(&[("1", "a"), ("99", "b")]);
        let correct = set(&[("1", "a")]);
        assert_eq!(score_answers(&answers, &correct), 1);
    }

    #[test]
    fn blank_answer_never_matches() {
        let answers = set(&[("1", "   ")]);
        let correct = set(&[("1", "")]);
        assert_eq!(score_answers(&answers, &correct), 0);
    }

    #[test]
    fn empty_key_scores_zero() {
        let answers = set(&[("1", "a")]);
        assert_eq!(score_answers(&answers, &AnswerSet::new()), 0);
    }

    #[test]
    fn score_never_exceeds_key_size() {
        let correct = set(&[("1", "a"), ("2", "b"), ("3", "c")]);
        let answers = correct.clone();
        assert_eq!(score_answers(&answers, &correct), 3);
    }

    #[test]
    fn counts_words() {
        assert_eq!(word_count("  Some people   believe\nthat cities\tgrow "), 6);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n"), 0);
    }
}

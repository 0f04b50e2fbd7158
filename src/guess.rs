//! Batch evaluation of submitted guesses
//!
//! A batch is one comma-separated submission. Each token is classified as
//! a duplicate, a valid new place, or not on the list. The first duplicate
//! stops evaluation of the rest of the batch.

use crate::places::Places;
use crate::session::GuessedEntry;

/// Classification of a single token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerdict {
    Accepted(GuessedEntry),
    Duplicate,
    NotOnList,
}

/// Result of evaluating one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub accepted: Vec<GuessedEntry>,
    /// The token that stopped the batch
    pub duplicate: Option<String>,
    pub not_on_list: Vec<String>,
}

impl BatchOutcome {
    pub fn had_duplicate(&self) -> bool {
        self.duplicate.is_some()
    }
}

/// Split on commas, trim and lower-case, drop empty tokens
pub fn split_batch(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn judge_token(
    token: &str,
    guessed: &[GuessedEntry],
    places: &Places,
    letter: char,
) -> TokenVerdict {
    if guessed.iter().any(|g| g.matches(token)) {
        return TokenVerdict::Duplicate;
    }

    match places.lookup(token) {
        Some(record) if record.starts_with(letter) => {
            TokenVerdict::Accepted(GuessedEntry::from_token(token))
        }
        _ => TokenVerdict::NotOnList,
    }
}

/// Evaluate tokens in order against the already-guessed list.
/// Places accepted earlier in the batch count as guessed for later tokens.
pub fn evaluate_batch(
    tokens: &[String],
    guessed: &[GuessedEntry],
    places: &Places,
    letter: char,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    let mut seen: Vec<GuessedEntry> = guessed.to_vec();

    for token in tokens {
        match judge_token(token, &seen, places, letter) {
            TokenVerdict::Duplicate => {
                outcome.duplicate = Some(token.clone());
                break;
            }
            TokenVerdict::Accepted(entry) => {
                seen.push(entry.clone());
                outcome.accepted.push(entry);
            }
            TokenVerdict::NotOnList => outcome.not_on_list.push(token.clone()),
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::PlaceRecord;

    fn places() -> Places {
        Places::from_records(
            ["Paris", "Prague", "Porto", "Berlin", "London"]
                .iter()
                .map(|n| PlaceRecord::new(*n))
                .collect(),
        )
    }

    fn entries(names: &[&str]) -> Vec<GuessedEntry> {
        names.iter().map(|n| GuessedEntry::from_token(n)).collect()
    }

    #[test]
    fn test_split_batch() {
        assert_eq!(split_batch(" Paris , PRAGUE"), vec!["paris", "prague"]);
        assert_eq!(split_batch("porto,,  ,"), vec!["porto"]);
        assert!(split_batch("").is_empty());
    }

    #[test]
    fn test_valid_tokens_accepted_in_order() {
        let outcome = evaluate_batch(&split_batch("Paris,Prague"), &[], &places(), 'p');
        assert_eq!(outcome.accepted, entries(&["Paris", "Prague"]));
        assert!(outcome.not_on_list.is_empty());
        assert!(!outcome.had_duplicate());
    }

    #[test]
    fn test_wrong_letter_is_not_on_list() {
        let outcome = evaluate_batch(&split_batch("Berlin"), &[], &places(), 'p');
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.not_on_list, vec!["berlin"]);
    }

    #[test]
    fn test_unknown_token_is_not_on_list() {
        let outcome = evaluate_batch(&split_batch("paris, pompeii"), &[], &places(), 'p');
        assert_eq!(outcome.accepted, entries(&["Paris"]));
        assert_eq!(outcome.not_on_list, vec!["pompeii"]);
    }

    #[test]
    fn test_duplicate_short_circuits_batch() {
        let guessed = entries(&["Paris"]);
        let outcome = evaluate_batch(
            &split_batch("paris, paris, london"),
            &guessed,
            &places(),
            'p',
        );
        assert_eq!(outcome.duplicate.as_deref(), Some("paris"));
        assert!(outcome.accepted.is_empty());
        assert!(outcome.not_on_list.is_empty());
    }

    #[test]
    fn test_duplicate_within_same_batch() {
        let outcome = evaluate_batch(&split_batch("porto, PORTO, prague"), &[], &places(), 'p');
        assert_eq!(outcome.accepted, entries(&["Porto"]));
        assert_eq!(outcome.duplicate.as_deref(), Some("porto"));
    }

    #[test]
    fn test_judge_token_duplicate_beats_lookup() {
        let guessed = entries(&["Prague"]);
        assert_eq!(
            judge_token("prague", &guessed, &places(), 'p'),
            TokenVerdict::Duplicate
        );
    }
}

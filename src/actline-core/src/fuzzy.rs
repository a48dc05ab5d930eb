//! Fuzzy ranking of candidate strings against a typed fragment.
//!
//! Scores are integers in `0..=100`. The base measure is the sequence
//! matcher ratio `2·M / T` (M matched characters, T total characters) which
//! is refined the way interactive fuzzy finders usually do it:
//!
//! - token sort / token set variants forgive word order and repetition
//! - partial variants compare the shorter string against the best window of
//!   the longer one, scaled down so whole-string matches still win
//!
//! Ranking keeps a few degenerate cases that make completion predictable;
//! see [`best_choices`].

use std::collections::BTreeSet;

use similar::TextDiff;

/// Default minimum score a candidate needs to be offered.
pub const DEFAULT_FUZZY_TOLERANCE: u8 = 75;

const UNBASE_SCALE: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.90;
const LONG_PARTIAL_SCALE: f64 = 0.60;

// ============================================================
// NORMALIZATION
// ============================================================

/// Normalizes text before scoring.
///
/// Every character that is neither alphanumeric nor `_` becomes a space, the
/// result is lowercased and trimmed. Text made only of punctuation reduces to
/// the empty string.
pub fn normalize(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.to_lowercase().trim().to_string()
}

// ============================================================
// SCORERS
// ============================================================

fn round_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Plain sequence matcher ratio of two strings, `0..=100`.
///
/// Either side being empty scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let similarity = TextDiff::from_chars(a, b).ratio();
    round_score(f64::from(similarity) * 100.0)
}

/// Best ratio of the shorter string against every equally long window of the
/// longer string.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (shorter, longer) = if char_len(a) <= char_len(b) {
        (a, b)
    } else {
        (b, a)
    };
    let longer: Vec<char> = longer.chars().collect();
    let window = char_len(shorter);

    let mut best = 0;
    for start in 0..=(longer.len() - window) {
        let candidate: String = longer[start..start + window].iter().collect();
        let score = ratio(shorter, &candidate);
        if score >= 100 {
            return 100;
        }
        best = best.max(score);
    }
    best
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort_score(a: &str, b: &str, partial: bool) -> u8 {
    let (a, b) = (sorted_tokens(a), sorted_tokens(b));
    if partial {
        partial_ratio(&a, &b)
    } else {
        ratio(&a, &b)
    }
}

fn token_set_score(a: &str, b: &str, partial: bool) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let intersection = tokens_a
        .intersection(&tokens_b)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let only_a = tokens_a
        .difference(&tokens_b)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let only_b = tokens_b
        .difference(&tokens_a)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let combined_a = format!("{} {}", intersection, only_a).trim().to_string();
    let combined_b = format!("{} {}", intersection, only_b).trim().to_string();

    let score = |x: &str, y: &str| {
        if partial {
            partial_ratio(x, y)
        } else {
            ratio(x, y)
        }
    };

    score(&intersection, &combined_a)
        .max(score(&intersection, &combined_b))
        .max(score(&combined_a, &combined_b))
}

/// Weighted similarity between a typed query and a candidate, `0..=100`.
///
/// Both sides are normalized first. Strings of similar length are compared
/// whole (plus token variants); strings whose lengths differ by 1.5x or more
/// also get partial-window variants.
pub fn weighted_ratio(query: &str, choice: &str) -> u8 {
    let query = normalize(query);
    let choice = normalize(choice);
    if query.is_empty() || choice.is_empty() {
        return 0;
    }

    let base = f64::from(ratio(&query, &choice));
    let (query_len, choice_len) = (char_len(&query), char_len(&choice));
    let length_ratio = query_len.max(choice_len) as f64 / query_len.min(choice_len) as f64;

    if length_ratio < 1.5 {
        let token_sort = f64::from(token_sort_score(&query, &choice, false)) * UNBASE_SCALE;
        let token_set = f64::from(token_set_score(&query, &choice, false)) * UNBASE_SCALE;
        return round_score(base.max(token_sort).max(token_set));
    }

    let partial_scale = if length_ratio > 8.0 {
        LONG_PARTIAL_SCALE
    } else {
        PARTIAL_SCALE
    };
    let partial = f64::from(partial_ratio(&query, &choice)) * partial_scale;
    let partial_sort =
        f64::from(token_sort_score(&query, &choice, true)) * UNBASE_SCALE * partial_scale;
    let partial_set =
        f64::from(token_set_score(&query, &choice, true)) * UNBASE_SCALE * partial_scale;

    round_score(base.max(partial).max(partial_sort).max(partial_set))
}

// ============================================================
// RANKING
// ============================================================

/// Yields the choices matching `query`, best match first.
///
/// - no choices: nothing
/// - a single choice: that choice, unfiltered
/// - an empty query, or one that normalizes to nothing: every choice in its
///   original order
/// - otherwise: choices scoring at least `tolerance`, by descending score,
///   ties kept in original order
pub fn best_choices<'a, S: AsRef<str>>(
    choices: &'a [S],
    query: &str,
    tolerance: u8,
) -> impl Iterator<Item = &'a str> + use<'a, S> {
    let choices: Vec<&'a str> = choices.iter().map(AsRef::as_ref).collect();

    let ranked = if choices.len() <= 1 || query.is_empty() || normalize(query).is_empty() {
        choices
    } else {
        let mut scored: Vec<(u8, &'a str)> = choices
            .into_iter()
            .map(|choice| (weighted_ratio(query, choice), choice))
            .inspect(|(score, choice)| tracing::trace!(query, choice, score, "fuzzy score"))
            .filter(|(score, _)| *score >= tolerance)
            .collect();
        // Stable sort keeps original order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, choice)| choice).collect()
    };

    ranked.into_iter()
}

/// Returns the single best match for `value`, if any.
///
/// Follows the same degenerate rules as [`best_choices`]: an empty choice
/// list gives `None`, a single choice is always returned, and a query that
/// normalizes to nothing returns the first choice. Otherwise the highest
/// scoring choice is returned, the earliest one on ties, even when every
/// score is zero.
pub fn best_single_choice<'a, S: AsRef<str>>(choices: &'a [S], value: &str) -> Option<&'a str> {
    match choices {
        [] => None,
        [only] => Some(only.as_ref()),
        [first, ..] if normalize(value).is_empty() => Some(first.as_ref()),
        _ => {
            let mut best: Option<(u8, &'a str)> = None;
            for choice in choices.iter().map(AsRef::as_ref) {
                let score = weighted_ratio(value, choice);
                if best.is_none_or(|(best_score, _)| score > best_score) {
                    best = Some((score, choice));
                }
            }
            best.map(|(_, choice)| choice)
        }
    }
}

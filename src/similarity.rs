//! Approximate string similarity on a 0-100 scale.
//!
//! [`weighted_ratio`] combines a plain edit-based ratio with substring and
//! token-order-insensitive variants, so `"Snake Plant"` and `"plant, snake"`
//! score as near-identical while unrelated names stay low. All functions
//! are symmetric in their two arguments and deterministic.
use std::collections::BTreeSet;

use rapidfuzz::fuzz;

// ---

/// Length ratio above which substring matching is considered.
const PARTIAL_LENGTH_RATIO: f64 = 1.5;

/// Length ratio above which substring matches are discounted harder.
const LONG_LENGTH_RATIO: f64 = 8.0;

const TOKEN_SCALE: f64 = 0.95;

/// Best overall similarity between two names, as an integer in `[0, 100]`.
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    // ---
    let a = process(a);
    let b = process(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let base = ratio(&a, &b);
    let (len_a, len_b) = (a.chars().count() as f64, b.chars().count() as f64);
    let length_ratio = len_a.max(len_b) / len_a.min(len_b);

    let best = if length_ratio < PARTIAL_LENGTH_RATIO {
        base.max(token_sort_ratio(&a, &b) * TOKEN_SCALE)
            .max(token_set_ratio(&a, &b) * TOKEN_SCALE)
    } else {
        let partial_scale = if length_ratio < LONG_LENGTH_RATIO { 0.9 } else { 0.6 };
        let token_scale = TOKEN_SCALE * partial_scale;
        base.max(partial_ratio(&a, &b) * partial_scale)
            .max(partial_token_sort_ratio(&a, &b) * token_scale)
            .max(partial_token_set_ratio(&a, &b) * token_scale)
    };

    best.round().clamp(0.0, 100.0) as u8
}

/// `2 * LCS / (|a| + |b|) * 100`, where LCS is the longest common
/// subsequence (normalized Indel similarity).
pub fn ratio(a: &str, b: &str) -> f64 {
    // ---
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Ratio of the shorter string against its best-aligned window of the longer.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    // ---
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return 0.0;
    }
    if short.len() == long.len() {
        return ratio_chars(&short, &long);
    }

    long.windows(short.len())
        .map(|window| ratio_chars(&short, window))
        .fold(0.0, f64::max)
}

/// Ratio after sorting the whitespace-separated tokens of each string.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Ratio comparing the shared tokens against each side's full token set.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    token_set_with(a, b, ratio)
}

fn partial_token_sort_ratio(a: &str, b: &str) -> f64 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn partial_token_set_ratio(a: &str, b: &str) -> f64 {
    token_set_with(a, b, partial_ratio)
}

// ---

/// Lower-case, turn every non-alphanumeric character into a space and
/// collapse runs of whitespace.
fn process(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_set_with(a: &str, b: &str, score: fn(&str, &str) -> f64) -> f64 {
    // ---
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let shared = join(tokens_a.intersection(&tokens_b));
    let only_a = join(tokens_a.difference(&tokens_b));
    let only_b = join(tokens_b.difference(&tokens_a));

    let combined_a = format!("{shared} {only_a}").trim().to_string();
    let combined_b = format!("{shared} {only_b}").trim().to_string();

    score(&shared, &combined_a)
        .max(score(&shared, &combined_b))
        .max(score(&combined_a, &combined_b))
}

fn join<'a>(tokens: impl Iterator<Item = &'a &'a str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

/// Indel similarity of two char sequences on 0-100; empty input scores 0.
fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    // ---
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    fuzz::ratio(a.iter().copied(), b.iter().copied()) * 100.0
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_identical_and_empty() {
        // ---
        assert_eq!(weighted_ratio("Monstera", "monstera"), 100);
        assert_eq!(weighted_ratio("", "monstera"), 0);
        assert_eq!(weighted_ratio("  ,, ", "monstera"), 0);
    }

    #[test]
    fn test_misspelling_scores_high() {
        // ---
        // LCS of "snak plant" / "snake plant" is 10, so 200 * 10 / 21 = 95.2
        assert_eq!(weighted_ratio("Snak Plant", "snake plant"), 95);
        assert!(weighted_ratio("Monstera delicosa", "monstera deliciosa") >= 90);
    }

    #[test]
    fn test_reordered_tokens_beat_plain_ratio() {
        // ---
        let plain = ratio("snake plant", "plant snake");
        let weighted = weighted_ratio("Snake Plant", "Plant, Snake");

        assert!(plain < 75.0);
        assert_eq!(weighted, 95);
    }

    #[test]
    fn test_substring_is_favoured() {
        // ---
        // "pothos" fully contained in a much longer name
        let score = weighted_ratio("pothos", "golden pothos vine");
        assert_eq!(score, 90);
        assert!(ratio("pothos", "golden pothos vine") < 60.0);
    }

    #[test]
    fn test_unrelated_names_score_low() {
        // ---
        assert!(weighted_ratio("cactus", "fiddle leaf fig") < 50);
        assert!(weighted_ratio("rose", "monstera deliciosa") < 75);
    }

    #[test]
    fn test_symmetric() {
        // ---
        let pairs = [
            ("Snak Plant", "snake plant"),
            ("pothos", "golden pothos vine"),
            ("ficus lyrata", "fiddle leaf fig"),
            ("aloe", "aloe vera"),
        ];
        for (a, b) in pairs {
            assert_eq!(weighted_ratio(a, b), weighted_ratio(b, a), "{a} / {b}");
        }
    }

    #[test]
    fn test_token_set_ignores_extra_tokens() {
        // ---
        assert_eq!(token_set_ratio("aloe vera", "vera aloe plant"), 100.0);
        assert_eq!(token_sort_ratio("aloe vera", "vera aloe"), 100.0);
    }

    #[test]
    fn test_indel_ratio() {
        // ---
        assert_eq!(ratio("monstera", "monstera"), 100.0);
        assert_eq!(ratio("", ""), 0.0);
        assert_eq!(ratio("fig", ""), 0.0);
        // LCS 3 of 4 + 4 chars
        assert_eq!(ratio("abcd", "abce"), 75.0);
    }

    #[test]
    fn test_partial_ratio_windows() {
        // ---
        assert_eq!(partial_ratio("fig", "fiddle leaf fig"), 100.0);
        assert_eq!(partial_ratio("", "fig"), 0.0);
    }
}

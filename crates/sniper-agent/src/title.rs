//! Coupon title extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use sniper_protocols::CardSnapshot;

use crate::vocabulary::Vocabulary;

/// Name used when a card yields no usable text.
pub const PLACEHOLDER_TITLE: &str = "Coupon";

static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\s*%").expect("percent pattern"));
static OFF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\boff\b").expect("off pattern"));
static KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(desconto|frete|cashback|sem juros|em |discount|shipping|interest-free)")
        .expect("keyword pattern")
});

/// Heuristic score of how likely a card line names the coupon.
pub fn score_line(line: &str) -> u32 {
    let mut score = 0;
    if PERCENT.is_match(line) {
        score += 5;
    }
    if OFF.is_match(line) {
        score += 4;
    }
    if KEYWORDS.is_match(line) {
        score += 2;
    }
    if line.chars().count() >= 6 {
        score += 1;
    }
    score
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Pick a human-readable name for the coupon on `card`.
///
/// Preference: the title element's `title` attribute, then its text, then the
/// best-scoring non-boilerplate card line (earliest wins ties), then the first
/// such line, then [`PLACEHOLDER_TITLE`].
pub fn extract_title(card: &CardSnapshot, vocabulary: &Vocabulary, max_chars: usize) -> String {
    let explicit = [card.title_attr.as_deref(), card.title_text.as_deref()]
        .into_iter()
        .flatten()
        .map(collapse)
        .find(|t| !t.is_empty());
    if let Some(title) = explicit {
        return truncate(&title, max_chars);
    }

    let text = card.text.replace('\r', "\n");
    let lines: Vec<String> = text
        .split('\n')
        .map(collapse)
        .filter(|l| !l.is_empty() && !vocabulary.is_boilerplate(l))
        .collect();

    let mut best: Option<(&str, u32)> = None;
    for line in &lines {
        let score = score_line(line);
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((line.as_str(), score));
        }
    }

    match (best, lines.first()) {
        (Some((line, _)), _) => truncate(line, max_chars),
        (None, Some(first)) => truncate(first, max_chars),
        (None, None) => PLACEHOLDER_TITLE.to_string(),
    }
}

//! Candidate discovery.

use std::collections::HashSet;

use sniper_protocols::{ControlSnapshot, DriverError, NodeRef, PageDriver};

use crate::vocabulary::{Vocabulary, normalize_text};

/// A control identified as a likely coupon-claim affordance.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The interactive element to click.
    pub target: NodeRef,
    /// Visible text of the matched control.
    pub text: String,
    /// Visible text of the enclosing card.
    pub card_text: String,
}

/// Case-insensitive substring match against the card text. Empty matches all.
pub fn matches_filter(card_text: &str, filter: &str) -> bool {
    let filter = normalize_text(filter);
    filter.is_empty() || normalize_text(card_text).contains(&filter)
}

/// Reduce a scan to clickable, filtered, de-duplicated candidates in page order.
pub fn select_candidates(
    controls: Vec<ControlSnapshot>,
    vocabulary: &Vocabulary,
    filter: &str,
) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut output = Vec::new();

    for control in controls {
        if !control.visible || !vocabulary.has_action(&control.text) {
            continue;
        }
        if !control.target_visible || control.target_disabled {
            continue;
        }
        if !matches_filter(&control.card_text, filter) {
            continue;
        }
        if !seen.insert(control.target) {
            continue;
        }
        output.push(Candidate {
            target: control.target,
            text: control.text,
            card_text: control.card_text,
        });
    }

    output
}

/// Scan the page and select candidates.
pub async fn discover(
    driver: &dyn PageDriver,
    vocabulary: &Vocabulary,
    filter: &str,
) -> Result<Vec<Candidate>, DriverError> {
    let controls = driver.scan_controls().await?;
    Ok(select_candidates(controls, vocabulary, filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(node: u64, text: &str, card: &str) -> ControlSnapshot {
        ControlSnapshot {
            node: NodeRef(node),
            text: text.to_string(),
            visible: true,
            target: NodeRef(node),
            target_visible: true,
            target_disabled: false,
            card_text: card.to_string(),
        }
    }

    #[test]
    fn test_matches_filter() {
        assert!(matches_filter("Anything", ""));
        assert!(matches_filter("10% OFF\nFrete  grátis", "frete grátis"));
        assert!(matches_filter("CASHBACK de 5%", "Cashback"));
        assert!(!matches_filter("10% OFF", "frete"));
    }

    #[test]
    fn test_select_requires_visible_action_text() {
        let mut hidden = control(3, "Aplicar", "c");
        hidden.visible = false;
        let controls = vec![
            control(1, "Aplicar", "10% OFF"),
            control(2, "Ver mais", "Termos"),
            hidden,
        ];
        let candidates = select_candidates(controls, &Vocabulary::default(), "");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].target, NodeRef(1));
    }

    #[test]
    fn test_select_skips_disabled_targets() {
        let mut disabled = control(1, "Aplicar", "10% OFF");
        disabled.target_disabled = true;
        let candidates = select_candidates(vec![disabled], &Vocabulary::default(), "");
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_select_applies_filter_to_card() {
        let controls = vec![
            control(1, "Aplicar", "10% OFF em Eletrônicos"),
            control(2, "Aplicar", "Frete grátis acima de R$ 79"),
        ];
        let candidates = select_candidates(controls, &Vocabulary::default(), "frete");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].target, NodeRef(2));
    }

    #[test]
    fn test_select_dedupes_by_resolved_target() {
        // A span inside a button resolves to the same target as the button.
        let mut span = control(11, "Aplicar", "10% OFF");
        span.target = NodeRef(10);
        let controls = vec![control(10, "Aplicar", "10% OFF"), span];

        let candidates = select_candidates(controls, &Vocabulary::default(), "");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].target, NodeRef(10));
    }
}

//! Words the harvesting heuristics recognize.

/// Collapse runs of whitespace, trim and lowercase.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Claim verbs, boilerplate lines and modal acknowledge texts.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Each action as its sequence of words.
    actions: Vec<Vec<String>>,
    /// Normalized lines that never name a coupon.
    boilerplate: Vec<String>,
    /// Normalized acknowledge texts.
    dismiss: Vec<String>,
}

impl Vocabulary {
    pub fn new<S: AsRef<str>>(actions: &[S], boilerplate: &[S], dismiss: &[S]) -> Self {
        let actions: Vec<Vec<String>> = actions
            .iter()
            .map(|a| words(a.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();

        let mut ignored: Vec<String> = actions.iter().map(|w| w.join(" ")).collect();
        ignored.extend(boilerplate.iter().map(|b| normalize_text(b.as_ref())));

        Self {
            actions,
            boilerplate: ignored,
            dismiss: dismiss.iter().map(|d| normalize_text(d.as_ref())).collect(),
        }
    }

    /// Whether `text` contains an action verb as a whole word.
    pub fn has_action(&self, text: &str) -> bool {
        let tokens = words(text);
        self.actions.iter().any(|action| {
            tokens
                .windows(action.len())
                .any(|window| window == action.as_slice())
        })
    }

    /// Whether a card line is an action-only or generic line.
    pub fn is_boilerplate(&self, line: &str) -> bool {
        let line = normalize_text(line);
        self.boilerplate.iter().any(|b| *b == line)
    }

    /// Whether `text` is exactly a modal acknowledge text.
    pub fn is_dismiss(&self, text: &str) -> bool {
        let text = normalize_text(text);
        !text.is_empty() && self.dismiss.iter().any(|d| *d == text)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(
            &[
                "aplicar", "ganhar", "resgatar", "usar", "ativar", "pegar", "apply", "claim",
                "redeem", "use", "activate", "get",
            ],
            &[
                "ver mais",
                "saiba mais",
                "termos",
                "regras",
                "cupom",
                "see more",
                "learn more",
                "terms",
                "rules",
                "coupon",
            ],
            &["ok", "entendi"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Ganhe\n  10%\tOFF  "), "ganhe 10% off");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_action_matches_whole_words() {
        let vocab = Vocabulary::default();
        assert!(vocab.has_action("Aplicar"));
        assert!(vocab.has_action("  CLAIM  now"));
        assert!(vocab.has_action("Ativar cupom"));
        assert!(!vocab.has_action("Aplicado"));
        assert!(!vocab.has_action("Usuário"));
        assert!(!vocab.has_action("Ver mais"));
        assert!(!vocab.has_action(""));
    }

    #[test]
    fn test_multi_word_action() {
        let vocab = Vocabulary::new(&["pick up"], &[], &[]);
        assert!(vocab.has_action("Pick  up now"));
        assert!(!vocab.has_action("pick it up"));
    }

    #[test]
    fn test_boilerplate_lines() {
        let vocab = Vocabulary::default();
        assert!(vocab.is_boilerplate("Aplicar"));
        assert!(vocab.is_boilerplate("  Ver   mais "));
        assert!(vocab.is_boilerplate("CUPOM"));
        assert!(!vocab.is_boilerplate("Aplicar cupom"));
        assert!(!vocab.is_boilerplate("10% OFF"));
    }

    #[test]
    fn test_dismiss_requires_exact_text() {
        let vocab = Vocabulary::default();
        assert!(vocab.is_dismiss("OK"));
        assert!(vocab.is_dismiss(" Entendi "));
        assert!(!vocab.is_dismiss("ok, entendi"));
        assert!(!vocab.is_dismiss(""));
    }
}

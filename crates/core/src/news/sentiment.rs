use std::collections::HashMap;

use crate::news::SentimentScorer;

// Word polarities tuned for market headlines.
const LEXICON: &[(&str, f64)] = &[
    ("beat", 0.5),
    ("beats", 0.5),
    ("boost", 0.4),
    ("boosts", 0.4),
    ("bullish", 0.6),
    ("gain", 0.4),
    ("gains", 0.4),
    ("good", 0.7),
    ("great", 0.8),
    ("growth", 0.3),
    ("high", 0.16),
    ("higher", 0.25),
    ("jump", 0.4),
    ("jumps", 0.4),
    ("outperform", 0.5),
    ("positive", 0.23),
    ("profit", 0.3),
    ("rally", 0.5),
    ("rallies", 0.5),
    ("record", 0.3),
    ("rise", 0.3),
    ("rises", 0.3),
    ("soar", 0.6),
    ("soars", 0.6),
    ("strong", 0.43),
    ("surge", 0.5),
    ("surges", 0.5),
    ("upgrade", 0.5),
    ("upgrades", 0.5),
    ("win", 0.8),
    ("best", 1.0),
    ("bad", -0.7),
    ("bearish", -0.6),
    ("crash", -0.7),
    ("cut", -0.3),
    ("cuts", -0.3),
    ("decline", -0.4),
    ("declines", -0.4),
    ("downgrade", -0.5),
    ("downgrades", -0.5),
    ("drop", -0.4),
    ("drops", -0.4),
    ("fall", -0.4),
    ("falls", -0.4),
    ("fear", -0.5),
    ("fears", -0.5),
    ("fraud", -0.8),
    ("lawsuit", -0.5),
    ("loss", -0.5),
    ("losses", -0.5),
    ("low", -0.1),
    ("lower", -0.25),
    ("miss", -0.5),
    ("misses", -0.5),
    ("negative", -0.3),
    ("plunge", -0.7),
    ("plunges", -0.7),
    ("recall", -0.4),
    ("slide", -0.4),
    ("slides", -0.4),
    ("slump", -0.6),
    ("weak", -0.38),
    ("worst", -1.0),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "isn't", "aren't", "won't", "don't", "doesn't", "didn't"];
const NEGATION_FACTOR: f64 = -0.5;

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("extremely", 1.5),
    ("sharply", 1.4),
    ("slightly", 0.5),
];

/// Averages the polarity of every lexicon word in the text. A preceding negation flips and
/// dampens a word; a preceding intensifier scales it.
#[derive(Debug, Clone)]
pub struct LexiconSentimentScorer {
    words: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconSentimentScorer {
    fn default() -> Self {
        Self {
            words: LEXICON.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }
}

impl SentimentScorer for LexiconSentimentScorer {
    fn polarity(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
            .collect();

        let mut sum = 0.0;
        let mut hits = 0usize;
        for (idx, token) in tokens.iter().enumerate() {
            let Some(&base) = self.words.get(*token) else {
                continue;
            };

            let mut p = base;
            let prev = idx.checked_sub(1).map(|i| tokens[i]);
            if let Some(factor) = prev.and_then(|w| self.intensifiers.get(w)) {
                p *= factor;
            }
            let window = &tokens[idx.saturating_sub(2)..idx];
            if window.iter().any(|w| NEGATIONS.contains(w)) {
                p *= NEGATION_FACTOR;
            }

            sum += p.clamp(-1.0, 1.0);
            hits += 1;
        }

        if hits == 0 {
            return 0.0;
        }
        (sum / hits as f64).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> f64 {
        LexiconSentimentScorer::default().polarity(text)
    }

    #[test]
    fn neutral_text_scores_zero() {
        assert_eq!(score("Apple to hold annual shareholder meeting"), 0.0);
        assert_eq!(score(""), 0.0);
    }

    #[test]
    fn direction_follows_wording() {
        assert!(score("Tesla shares surge after record deliveries") > 0.0);
        assert!(score("Intel stock plunges as losses widen") < 0.0);
    }

    #[test]
    fn negation_flips_and_dampens() {
        let plain = score("Results were good");
        let negated = score("Results were not good");
        assert!(plain > 0.0);
        assert!(negated < 0.0);
        assert!(negated.abs() < plain.abs());
    }

    #[test]
    fn intensifier_scales_but_stays_in_range() {
        assert!(score("very strong quarter") > score("strong quarter"));
        assert!(score("extremely best best best") <= 1.0);
        assert!(score("extremely worst") >= -1.0);
    }
}

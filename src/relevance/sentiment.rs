use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Scalar sentiment of a text in [-1, 1]
pub trait PolarityAnalyzer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

/// Word polarities, roughly following the pattern/TextBlob English adjective lexicon
static LEXICON: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        // positive
        ("good", 0.7),
        ("great", 0.8),
        ("best", 1.0),
        ("better", 0.5),
        ("excellent", 1.0),
        ("awesome", 1.0),
        ("amazing", 0.6),
        ("wonderful", 1.0),
        ("perfect", 1.0),
        ("beautiful", 0.85),
        ("brilliant", 0.9),
        ("fantastic", 0.4),
        ("incredible", 0.9),
        ("impressive", 1.0),
        ("outstanding", 0.5),
        ("nice", 0.6),
        ("happy", 0.8),
        ("love", 0.5),
        ("loved", 0.7),
        ("like", 0.2),
        ("enjoy", 0.4),
        ("fun", 0.3),
        ("funny", 0.25),
        ("cool", 0.35),
        ("easy", 0.43),
        ("simple", 0.1),
        ("free", 0.4),
        ("cheap", 0.4),
        ("new", 0.14),
        ("fresh", 0.3),
        ("fast", 0.2),
        ("powerful", 0.3),
        ("strong", 0.43),
        ("safe", 0.5),
        ("secure", 0.4),
        ("success", 0.3),
        ("successful", 0.75),
        ("win", 0.8),
        ("wins", 0.8),
        ("winning", 0.5),
        ("positive", 0.23),
        ("important", 0.4),
        ("interesting", 0.5),
        ("useful", 0.3),
        ("helpful", 0.3),
        ("popular", 0.6),
        ("top", 0.5),
        ("favorite", 0.5),
        ("favourite", 0.5),
        ("glad", 0.5),
        ("excited", 0.4),
        ("exciting", 0.3),
        ("hope", 0.3),
        ("hopeful", 0.3),
        ("improved", 0.4),
        ("improve", 0.3),
        ("recovery", 0.2),
        ("record", 0.2),
        ("boost", 0.3),
        ("gain", 0.3),
        ("gains", 0.3),
        ("rise", 0.1),
        ("surge", 0.2),
        ("breakthrough", 0.5),
        ("smart", 0.21),
        ("clean", 0.37),
        ("clear", 0.1),
        ("real", 0.2),
        ("true", 0.35),
        ("right", 0.29),
        ("correct", 0.3),
        ("legendary", 0.6),
        ("epic", 0.4),
        ("ultimate", 0.3),
        ("proud", 0.8),
        ("peace", 0.3),
        ("celebrate", 0.4),
        // negative
        ("bad", -0.7),
        ("worse", -0.4),
        ("worst", -1.0),
        ("terrible", -1.0),
        ("horrible", -1.0),
        ("awful", -1.0),
        ("poor", -0.4),
        ("sad", -0.5),
        ("angry", -0.5),
        ("hate", -0.8),
        ("hated", -0.9),
        ("wrong", -0.5),
        ("fake", -0.5),
        ("false", -0.4),
        ("fail", -0.5),
        ("failed", -0.5),
        ("failure", -0.3),
        ("broken", -0.4),
        ("boring", -1.0),
        ("stupid", -0.8),
        ("ugly", -0.7),
        ("dangerous", -0.6),
        ("deadly", -0.2),
        ("dead", -0.2),
        ("death", -0.3),
        ("crash", -0.4),
        ("crisis", -0.4),
        ("war", -0.4),
        ("attack", -0.4),
        ("disaster", -0.6),
        ("scandal", -0.5),
        ("fraud", -0.6),
        ("scam", -0.6),
        ("risk", -0.2),
        ("risky", -0.3),
        ("threat", -0.4),
        ("fear", -0.4),
        ("worried", -0.3),
        ("crazy", -0.6),
        ("hard", -0.29),
        ("difficult", -0.5),
        ("slow", -0.3),
        ("expensive", -0.5),
        ("weak", -0.38),
        ("loss", -0.3),
        ("losses", -0.3),
        ("lose", -0.3),
        ("lost", -0.3),
        ("fall", -0.2),
        ("drop", -0.2),
        ("decline", -0.3),
        ("plunge", -0.4),
        ("negative", -0.3),
        ("problem", -0.3),
        ("problems", -0.3),
        ("issue", -0.1),
        ("bug", -0.2),
        ("controversial", -0.3),
        ("shocking", -0.5),
        ("annoying", -0.8),
        ("disappointing", -0.6),
        ("useless", -0.5),
        ("mistake", -0.4),
        ("sick", -0.71),
        ("pain", -0.4),
        ("evil", -1.0),
        ("violent", -0.8),
        ("illegal", -0.5),
    ]
    .into_iter()
    .collect()
});

/// Words that scale the polarity of the next scored word
static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("very", 1.3),
        ("really", 1.3),
        ("so", 1.3),
        ("super", 1.3),
        ("extremely", 1.5),
        ("incredibly", 1.4),
        ("absolutely", 1.4),
        ("totally", 1.3),
        ("too", 1.2),
        ("quite", 1.1),
        ("pretty", 1.1),
        ("somewhat", 0.7),
        ("slightly", 0.5),
        ("barely", 0.3),
    ]
    .into_iter()
    .collect()
});

const NEGATORS: &[&str] = &["not", "no", "never", "neither", "nor", "without", "cannot"];

/// Negation inverts and dampens, so "not good" is mildly negative
const NEGATION_FACTOR: f64 = -0.5;

/// Lexicon scorer: the polarity of a text is the mean polarity of its scored words
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconAnalyzer;

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't")
}

impl PolarityAnalyzer for LexiconAnalyzer {
    fn polarity(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let words = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
            .map(|word| word.trim_matches(|c: char| c == '\'' || c == '’'))
            .filter(|word| !word.is_empty());

        let mut scores = Vec::new();
        let mut multiplier = 1.0;
        let mut negated = false;

        for word in words {
            let word = word.replace('’', "'");

            if is_negator(&word) {
                negated = true;
                continue;
            }

            if let Some(factor) = INTENSIFIERS.get(word.as_str()) {
                multiplier *= factor;
                continue;
            }

            if let Some(polarity) = LEXICON.get(word.as_str()) {
                let mut score = polarity * multiplier;
                if negated {
                    score *= NEGATION_FACTOR;
                }
                scores.push(score.clamp(-1.0, 1.0));
            }

            multiplier = 1.0;
            negated = false;
        }

        if scores.is_empty() {
            return 0.0;
        }

        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_neutral_text_is_zero() {
        let analyzer = LexiconAnalyzer::new();
        assert_eq!(analyzer.polarity(""), 0.0);
        assert_eq!(analyzer.polarity("The committee met on Tuesday."), 0.0);
    }

    #[test]
    fn test_single_words() {
        let analyzer = LexiconAnalyzer::new();
        assert!(approx(analyzer.polarity("good"), 0.7));
        assert!(approx(analyzer.polarity("A terrible day"), -1.0));
    }

    #[test]
    fn test_mean_over_scored_words() {
        let analyzer = LexiconAnalyzer::new();
        // (0.7 + -0.7) / 2
        assert!(approx(analyzer.polarity("good food, bad service"), 0.0));
    }

    #[test]
    fn test_intensifier_and_clamp() {
        let analyzer = LexiconAnalyzer::new();
        assert!(approx(analyzer.polarity("very good"), 0.91));
        assert!(approx(analyzer.polarity("extremely excellent"), 1.0));
    }

    #[test]
    fn test_negation() {
        let analyzer = LexiconAnalyzer::new();
        assert!(approx(analyzer.polarity("not good"), -0.35));
        assert!(approx(analyzer.polarity("This isn't bad"), 0.35));
        assert!(approx(analyzer.polarity("don’t love it"), -0.25));
    }

    #[test]
    fn test_negation_does_not_leak_past_unscored_words() {
        let analyzer = LexiconAnalyzer::new();
        // "not" is consumed by "the"; "good" keeps its polarity
        assert!(approx(analyzer.polarity("not the good one"), 0.7));
    }

    #[test]
    fn test_range() {
        let analyzer = LexiconAnalyzer::new();
        for text in [
            "absolutely the best awesome perfect wonderful",
            "the worst terrible horrible evil disaster",
            "not not not very very very bad",
        ] {
            let polarity = analyzer.polarity(text);
            assert!((-1.0..=1.0).contains(&polarity), "{text}: {polarity}");
        }
    }
}

pub mod sentiment;

pub use sentiment::{LexiconAnalyzer, PolarityAnalyzer};

/// Decides whether a headline relates to a video's content
pub trait RelevancePolicy: Send + Sync {
    fn is_relevant(&self, content: &str, headline: &str) -> bool;

    /// Relevant headlines in their original order
    fn filter(&self, content: &str, headlines: &[String]) -> Vec<String> {
        headlines
            .iter()
            .filter(|headline| self.is_relevant(content, headline))
            .cloned()
            .collect()
    }
}

/// Headlines whose sentiment polarity is close to the content's
pub struct SentimentPolicy<A = LexiconAnalyzer> {
    analyzer: A,
    threshold: f64,
}

impl SentimentPolicy<LexiconAnalyzer> {
    pub fn new(threshold: f64) -> Self {
        Self::with_analyzer(LexiconAnalyzer::new(), threshold)
    }
}

impl<A: PolarityAnalyzer> SentimentPolicy<A> {
    pub fn with_analyzer(analyzer: A, threshold: f64) -> Self {
        Self {
            analyzer,
            threshold,
        }
    }

    fn within_threshold(&self, content_polarity: f64, headline: &str) -> bool {
        let headline_polarity = self.analyzer.polarity(headline);
        let difference = (content_polarity - headline_polarity).abs();
        tracing::debug!(
            "Polarity difference {:.3} for headline {:?}",
            difference,
            headline
        );
        difference < self.threshold
    }
}

impl<A: PolarityAnalyzer> RelevancePolicy for SentimentPolicy<A> {
    fn is_relevant(&self, content: &str, headline: &str) -> bool {
        self.within_threshold(self.analyzer.polarity(content), headline)
    }

    fn filter(&self, content: &str, headlines: &[String]) -> Vec<String> {
        let content_polarity = self.analyzer.polarity(content);
        headlines
            .iter()
            .filter(|headline| self.within_threshold(content_polarity, headline))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Analyzer with fixed polarities per text
    struct FixedAnalyzer(HashMap<&'static str, f64>);

    impl PolarityAnalyzer for FixedAnalyzer {
        fn polarity(&self, text: &str) -> f64 {
            self.0.get(text).copied().unwrap_or(0.0)
        }
    }

    fn policy(entries: &[(&'static str, f64)]) -> SentimentPolicy<FixedAnalyzer> {
        SentimentPolicy::with_analyzer(FixedAnalyzer(entries.iter().copied().collect()), 0.2)
    }

    #[test]
    fn test_difference_at_threshold_is_excluded() {
        let policy = policy(&[("content", 0.0), ("edge", 0.2), ("negative edge", -0.2)]);
        assert!(!policy.is_relevant("content", "edge"));
        assert!(!policy.is_relevant("content", "negative edge"));
    }

    #[test]
    fn test_difference_below_threshold_is_included() {
        let policy = policy(&[("content", 0.0), ("close", 0.19), ("negative close", -0.19)]);
        assert!(policy.is_relevant("content", "close"));
        assert!(policy.is_relevant("content", "negative close"));
    }

    #[test]
    fn test_filter_keeps_order() {
        let policy = policy(&[
            ("content", 0.5),
            ("a", 0.45),
            ("b", -0.5),
            ("c", 0.6),
            ("d", 0.9),
        ]);
        let headlines: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();

        assert_eq!(policy.filter("content", &headlines), vec!["a", "c"]);
    }

    #[test]
    fn test_filter_empty_headlines() {
        let policy = SentimentPolicy::new(0.2);
        assert!(policy.filter("anything", &[]).is_empty());
    }

    #[test]
    fn test_lexicon_policy() {
        let policy = SentimentPolicy::new(0.2);
        let content = "Rust is a good language with a great community";
        let headlines = vec![
            "Great news for a good cause".to_string(),
            "Terrible crash leaves markets in crisis".to_string(),
        ];

        assert_eq!(policy.filter(content, &headlines), vec![headlines[0].clone()]);
    }

    #[test]
    fn test_policy_is_object_safe() {
        let boxed: Box<dyn RelevancePolicy> = Box::new(SentimentPolicy::new(0.2));
        assert!(boxed.is_relevant("neutral", "also neutral"));
    }
}

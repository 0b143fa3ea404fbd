//! VADER scorer backed by the `vader_sentiment` lexicon.

use {
    vader_sentiment::SentimentIntensityAnalyzer,
    super::{
        PolarityScores,
        SentimentLabel,
        SentimentMethod,
        SentimentModel,
        SentimentResult,
    },
};

pub struct VaderAnalyzer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderAnalyzer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    /// Text without any scorable token comes back as fully neutral.
    pub fn polarity_scores(&self, text: &str) -> PolarityScores {
        let scores = self.analyzer.polarity_scores(text);
        let score = |key: &str| scores.get(key).copied().unwrap_or(0.0);

        let (pos, neg, neu) = (score("pos"), score("neg"), score("neu"));
        if pos + neg + neu == 0.0 {
            return PolarityScores::neutral();
        }

        PolarityScores {
            pos,
            neg,
            neu,
            compound: score("compound").clamp(-1.0, 1.0),
        }
    }
}

impl Default for VaderAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentModel for VaderAnalyzer {
    fn method(&self) -> SentimentMethod {
        SentimentMethod::Vader
    }

    fn analyze(&self, text: &str) -> SentimentResult {
        let scores = self.polarity_scores(text);

        SentimentResult {
            label: SentimentLabel::from_compound(scores.compound),
            score: scores.compound.abs(),
            polarity: Some(scores),
        }
    }

    fn empty_result(&self) -> SentimentResult {
        SentimentResult {
            polarity: Some(PolarityScores::neutral()),
            ..SentimentResult::neutral()
        }
    }
}

use {
    std::path::Path,
    tracing::{info, warn},
    rust_bert::{
        pipelines::{
            common::ModelType,
            sentiment::{
                Sentiment,
                SentimentConfig,
                SentimentModel as BertSentimentModel,
                SentimentPolarity,
            },
        },
        resources::LocalResource,
    },
    crate::error::{Error, Result},
    super::{SentimentLabel, SentimentMethod, SentimentModel, SentimentResult},
};

/// DistilBERT fine-tuned on SST-2. Without a model directory the default
/// rust-bert sentiment pipeline is downloaded.
pub struct DistilBertAnalyzer {
    model: BertSentimentModel,
}

impl DistilBertAnalyzer {
    pub fn new(model_dir: Option<&Path>) -> Result<Self> {
        let config = match model_dir {
            Some(dir) => {
                info!("loading distilbert sentiment model from {}", dir.display());
                local_config(dir)
            },
            None => {
                info!("loading default distilbert sentiment model");
                SentimentConfig::default()
            },
        };

        let model = BertSentimentModel::new(config)
            .map_err(|err| Error::ModelLoad(err.to_string()))?;

        Ok(Self {
            model,
        })
    }
}

impl SentimentModel for DistilBertAnalyzer {
    fn method(&self) -> SentimentMethod {
        SentimentMethod::DistilBert
    }

    fn analyze(&self, text: &str) -> SentimentResult {
        self.analyze_batch(&[text]).pop().unwrap_or_else(SentimentResult::neutral)
    }

    fn analyze_batch(&self, texts: &[&str]) -> Vec<SentimentResult> {
        let predictions = self.model.predict(texts);
        if predictions.len() != texts.len() {
            // predictions are positional, so a short answer can't be aligned
            warn!("distilbert returned {} predictions for {} texts", predictions.len(), texts.len());
            return texts.iter().map(|_| SentimentResult::neutral()).collect();
        }
        predictions.into_iter().map(into_result).collect()
    }
}

// converted checkpoint layout: rust_model.ot, config.json, vocab.txt
fn local_config(dir: &Path) -> SentimentConfig {
    let resource = |name: &str| LocalResource {
        local_path: dir.join(name),
    };

    SentimentConfig::new(
        ModelType::DistilBert,
        resource("rust_model.ot"),
        resource("config.json"),
        resource("vocab.txt"),
        None,
        true,
        None,
        None,
    )
}

fn into_result(sentiment: Sentiment) -> SentimentResult {
    let label = match sentiment.polarity {
        SentimentPolarity::Positive => SentimentLabel::Positive,
        SentimentPolarity::Negative => SentimentLabel::Negative,
    };

    SentimentResult {
        label,
        score: sentiment.score.clamp(0.0, 1.0),
        polarity: None,
    }
}

pub mod vader;
#[cfg(feature = "distilbert")]
pub mod distilbert;

use {
    std::{collections::BTreeMap, fmt, path::Path, str::FromStr},
    tracing::info,
    serde::Serialize,
    crate::{
        error::{Error, Result},
        table::{Table, Value},
    },
    self::vader::VaderAnalyzer,
};

pub const DEFAULT_BATCH_SIZE: usize = 32;
pub const POSITIVE_THRESHOLD: f64 = 0.05;
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentMethod {
    Vader,
    DistilBert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// Lexicon sub-scores. `pos`, `neg` and `neu` are proportions summing to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolarityScores {
    pub pos: f64,
    pub neg: f64,
    pub neu: f64,
    pub compound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f64,
    pub polarity: Option<PolarityScores>,
}

pub trait SentimentModel {
    fn method(&self) -> SentimentMethod;

    fn analyze(&self, text: &str) -> SentimentResult;

    fn analyze_batch(&self, texts: &[&str]) -> Vec<SentimentResult> {
        texts.iter().map(|text| self.analyze(text)).collect()
    }

    fn empty_result(&self) -> SentimentResult {
        SentimentResult::neutral()
    }
}

pub struct SentimentAnalyzer {
    method: SentimentMethod,
    model: Box<dyn SentimentModel>,
    batch_size: usize,
}

impl SentimentMethod {
    pub fn name(&self) -> &'static str {
        match self {
            SentimentMethod::Vader => "vader",
            SentimentMethod::DistilBert => "distilbert",
        }
    }

    pub fn label_column(&self) -> String {
        format!("sentiment_label_{}", self.name())
    }

    pub fn score_column(&self) -> String {
        format!("sentiment_score_{}", self.name())
    }
}

impl fmt::Display for SentimentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SentimentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "vader" => Ok(SentimentMethod::Vader),
            "distilbert" => Ok(SentimentMethod::DistilBert),
            _ => Err(Error::InvalidConfiguration(format!(
                "Unknown method: \"{}\" (expected one of: vader, distilbert)",
                s,
            ))),
        }
    }
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
        }
    }

    pub fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PolarityScores {
    pub fn neutral() -> Self {
        Self {
            pos: 0.0,
            neg: 0.0,
            neu: 1.0,
            compound: 0.0,
        }
    }
}

impl SentimentResult {
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
            polarity: None,
        }
    }
}

impl SentimentAnalyzer {
    pub fn new(method: &str) -> Result<Self> {
        Self::with_method(method.parse()?)
    }

    pub fn with_method(method: SentimentMethod) -> Result<Self> {
        Self::with_model(method, None)
    }

    /// `model_dir` points at a local transformer checkpoint. The lexicon
    /// method has no weights and ignores it.
    pub fn with_model(method: SentimentMethod, model_dir: Option<&Path>) -> Result<Self> {
        let model: Box<dyn SentimentModel> = match method {
            SentimentMethod::Vader => Box::new(VaderAnalyzer::new()),
            SentimentMethod::DistilBert => distilbert_model(model_dir)?,
        };

        info!("initialized sentiment analyzer with {} method", model.method());

        Ok(Self {
            method,
            model,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn method(&self) -> SentimentMethod {
        self.method
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn analyze_text(&self, text: &str) -> SentimentResult {
        if text.trim().is_empty() {
            return self.model.empty_result();
        }
        self.model.analyze(text)
    }

    /// Blank texts are answered without reaching the model; the rest go
    /// through it in chunks of `batch_size`.
    pub fn analyze_texts(&self, texts: &[&str]) -> Vec<SentimentResult> {
        let mut results: Vec<Option<SentimentResult>> = texts.iter()
            .map(|text| if text.trim().is_empty() { Some(self.model.empty_result()) } else { None })
            .collect();

        let pending: Vec<usize> = (0..texts.len()).filter(|i| results[*i].is_none()).collect();
        for chunk in pending.chunks(self.batch_size) {
            let batch: Vec<&str> = chunk.iter().map(|i| texts[*i]).collect();
            for (index, result) in chunk.iter().zip(self.model.analyze_batch(&batch)) {
                results[*index] = Some(result);
            }
        }

        results.into_iter()
            .map(|v| v.unwrap_or_else(|| self.model.empty_result()))
            .collect()
    }

    /// Appends `sentiment_label_<method>` and `sentiment_score_<method>`.
    pub fn analyze_table(&self, table: &Table, text_column: &str) -> Result<Table> {
        let texts = table.texts(text_column)?;

        info!("analyzing sentiment for {} reviews using {}", texts.len(), self.method);
        let results = self.analyze_texts(&texts);

        let mut distribution: BTreeMap<SentimentLabel, usize> = BTreeMap::new();
        for result in &results {
            *distribution.entry(result.label).or_default() += 1;
        }
        for (label, count) in &distribution {
            info!("{}: {} reviews ({:.1}%)", label, count, *count as f64 * 100.0 / results.len() as f64);
        }

        let labels = results.iter().map(|v| Value::text(v.label.as_str())).collect();
        let scores = results.iter().map(|v| Value::Float(v.score)).collect();

        table.clone()
            .with_column(self.method.label_column(), labels)?
            .with_column(self.method.score_column(), scores)
    }
}

#[cfg(feature = "distilbert")]
fn distilbert_model(model_dir: Option<&Path>) -> Result<Box<dyn SentimentModel>> {
    Ok(Box::new(distilbert::DistilBertAnalyzer::new(model_dir)?))
}

#[cfg(not(feature = "distilbert"))]
fn distilbert_model(_model_dir: Option<&Path>) -> Result<Box<dyn SentimentModel>> {
    Err(Error::ModelUnavailable(SentimentMethod::DistilBert.name().to_owned()))
}

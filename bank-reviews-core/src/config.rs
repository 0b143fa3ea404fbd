use {
    std::fs::read_to_string,
    tracing::warn,
    serde::Deserialize,
    crate::{
        error::Result,
        themes::{
            taxonomy::{Taxonomy, ThemeDefinition},
            tfidf::TfidfConfig,
        },
    },
};

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default)]
    pub steps: StepsConfig,
    pub data: Option<DataConfig>,
    pub sentiment: Option<SentimentConfig>,
    pub themes: Option<ThemesConfig>,
}

#[derive(Deserialize, Debug)]
pub struct StepsConfig {
    #[serde(default)]
    pub preprocess: StepConfig,
    #[serde(default)]
    pub sentiment: StepConfig,
    #[serde(default)]
    pub themes: StepConfig,
    #[serde(default)]
    pub export: StepConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StepConfig {
    pub enabled: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DataConfig {
    raw_reviews: Option<String>,
    processed_reviews: Option<String>,
    preprocessing_stats: Option<String>,
    sentiment_reviews: Option<String>,
    themed_reviews: Option<String>,
    theme_sentiment: Option<String>,
    dashboard_export: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct SentimentConfig {
    pub methods: Vec<String>,
    pub batch_size: usize,
    pub text_column: String,
    pub model: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ThemesConfig {
    pub max_features: usize,
    pub ngram_range: (usize, usize),
    pub min_df: usize,
    pub top_n: usize,
    pub text_column: String,
    pub taxonomy: Option<Vec<ThemeDefinition>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            steps: StepsConfig::default(),
            data: None,
            sentiment: None,
            themes: None,
        }
    }
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self {
            preprocess: StepConfig::default(),
            sentiment: StepConfig::default(),
            themes: StepConfig::default(),
            export: StepConfig::default(),
        }
    }
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_reviews: None,
            processed_reviews: None,
            preprocessing_stats: None,
            sentiment_reviews: None,
            themed_reviews: None,
            theme_sentiment: None,
            dashboard_export: None,
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            methods: vec!["vader".to_owned()],
            batch_size: 32,
            text_column: "review_text".to_owned(),
            model: None,
        }
    }
}

impl Default for ThemesConfig {
    fn default() -> Self {
        let tfidf = TfidfConfig::default();

        Self {
            max_features: tfidf.max_features,
            ngram_range: tfidf.ngram_range,
            min_df: tfidf.min_df,
            top_n: tfidf.top_n,
            text_column: "review_text".to_owned(),
            taxonomy: None,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        read_to_string("./config.toml")
            .or_else(|_| read_to_string("/config/config.toml"))
            .map_err(|err| err.to_string())
            .and_then(|v| Self::parse(&v).map_err(|err| err.to_string()))
            .unwrap_or_else(|err| {
                warn!("failed to read config: {}", err);
                Config::default()
            })
    }

    pub fn parse(source: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn data(&self) -> DataConfig {
        self.data.as_ref().cloned().unwrap_or_default()
    }

    pub fn sentiment(&self) -> SentimentConfig {
        self.sentiment.as_ref().cloned().unwrap_or_default()
    }

    pub fn themes(&self) -> ThemesConfig {
        self.themes.as_ref().cloned().unwrap_or_default()
    }
}

impl DataConfig {
    pub fn raw_reviews(&self) -> String {
        self.raw_reviews.as_ref().cloned().unwrap_or("data/raw/reviews_raw.csv".to_owned())
    }

    pub fn processed_reviews(&self) -> String {
        self.processed_reviews.as_ref().cloned().unwrap_or("data/processed/reviews_processed.csv".to_owned())
    }

    pub fn preprocessing_stats(&self) -> String {
        self.preprocessing_stats.as_ref().cloned().unwrap_or("data/processed/preprocessing_stats.json".to_owned())
    }

    pub fn sentiment_reviews(&self) -> String {
        self.sentiment_reviews.as_ref().cloned().unwrap_or("data/processed/reviews_with_sentiment.csv".to_owned())
    }

    pub fn themed_reviews(&self) -> String {
        self.themed_reviews.as_ref().cloned().unwrap_or("data/processed/reviews_with_themes.csv".to_owned())
    }

    pub fn theme_sentiment(&self) -> String {
        self.theme_sentiment.as_ref().cloned().unwrap_or("data/processed/theme_sentiment.csv".to_owned())
    }

    pub fn dashboard_export(&self) -> String {
        self.dashboard_export.as_ref().cloned().unwrap_or("dashboard/data/reviews_final.csv".to_owned())
    }
}

impl ThemesConfig {
    /// Taxonomy from config, or the built-in banking taxonomy when none is set.
    pub fn taxonomy(&self) -> Result<Taxonomy> {
        match &self.taxonomy {
            Some(definitions) => Taxonomy::new(definitions.clone()),
            None => Ok(Taxonomy::banking()),
        }
    }

    pub fn tfidf(&self) -> TfidfConfig {
        TfidfConfig {
            max_features: self.max_features,
            ngram_range: self.ngram_range,
            min_df: self.min_df,
            top_n: self.top_n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();

        assert!(config.steps.preprocess.enabled);
        assert!(config.steps.export.enabled);
        assert_eq!(config.sentiment().methods, vec!["vader".to_owned()]);
        assert_eq!(config.sentiment().model, None);
        assert_eq!(config.themes().text_column, "review_text");
        assert_eq!(config.data().raw_reviews(), "data/raw/reviews_raw.csv");
    }

    #[test]
    fn bundled_config_parses() {
        let config = Config::parse(include_str!("../../config.toml")).unwrap();

        assert_eq!(config.sentiment().methods, vec!["vader".to_owned()]);
        assert_eq!(config.themes().tfidf(), TfidfConfig::default());
        assert_eq!(config.data().dashboard_export(), "dashboard/data/reviews_final.csv");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::parse(r#"
[steps.export]
enabled = false

[sentiment]
methods = ["vader", "distilbert"]
model = "models/distilbert-sst2"

[themes]
top_n = 3
ngram_range = [1, 3]

[data]
raw_reviews = "input.csv"
"#).unwrap();

        assert!(!config.steps.export.enabled);
        assert!(config.steps.themes.enabled);
        assert_eq!(config.sentiment().methods.len(), 2);
        assert_eq!(config.sentiment().batch_size, 32);
        assert_eq!(config.sentiment().model.as_deref(), Some("models/distilbert-sst2"));
        assert_eq!(config.themes().top_n, 3);
        assert_eq!(config.themes().ngram_range, (1, 3));
        assert_eq!(config.themes().min_df, TfidfConfig::default().min_df);
        assert_eq!(config.data().raw_reviews(), "input.csv");
        assert_eq!(config.data().themed_reviews(), "data/processed/reviews_with_themes.csv");
    }

    #[test]
    fn default_taxonomy_has_core_themes() {
        let taxonomy = ThemesConfig::default().taxonomy().unwrap();
        let labels = taxonomy.labels();

        for expected in ["Account Access Issues", "Transaction Performance", "Technical Issues"] {
            assert!(labels.contains(&expected), "missing theme: {}", expected);
        }
    }

    #[test]
    fn configured_taxonomy_keeps_declaration_order() {
        let config = Config::parse(r#"
[[themes.taxonomy]]
label = "Fees"
keywords = ["fee", "charge"]

[[themes.taxonomy]]
label = "Cards"
keywords = ["card"]
"#).unwrap();

        let taxonomy = config.themes().taxonomy().unwrap();
        assert_eq!(taxonomy.labels(), vec!["Fees", "Cards"]);
    }

    #[test]
    fn configured_taxonomy_rejects_empty_keywords() {
        let config = Config::parse(r#"
[[themes.taxonomy]]
label = "Fees"
keywords = []
"#).unwrap();

        assert!(config.themes().taxonomy().is_err());
    }
}

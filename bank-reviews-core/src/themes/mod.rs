pub mod correlation;
pub mod taxonomy;
pub mod tfidf;

use {
    std::collections::BTreeMap,
    tracing::info,
    serde::Serialize,
    crate::{
        error::Result,
        normalizer::preprocess_text,
        table::{Table, Value},
    },
    self::{
        taxonomy::Taxonomy,
        tfidf::{extract_keywords_tfidf, TfidfConfig},
    },
};

pub use self::correlation::{correlation_for_column, get_theme_sentiment_correlation};

pub const OTHER_THEME: &str = "Other";
pub const UNKNOWN_THEME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeResult {
    pub themes: Vec<String>,
    pub primary_theme: String,
    pub matched_keywords: Vec<String>,
}

pub struct ThemeAnalyzer {
    taxonomy: Taxonomy,
    tfidf: TfidfConfig,
}

impl ThemeResult {
    pub fn unknown() -> Self {
        Self {
            themes: Vec::new(),
            primary_theme: UNKNOWN_THEME.to_owned(),
            matched_keywords: Vec::new(),
        }
    }
}

impl ThemeAnalyzer {
    pub fn new(taxonomy: Taxonomy, tfidf: TfidfConfig) -> Self {
        info!("initialized theme analyzer with {} themes", taxonomy.len());

        Self {
            taxonomy,
            tfidf,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn identify_themes(&self, text: &str) -> ThemeResult {
        if text.trim().is_empty() {
            return ThemeResult::unknown();
        }

        let text = preprocess_text(text);
        let tokens: Vec<&str> = text.split(' ').filter(|v| !v.is_empty()).collect();

        let mut themes = Vec::new();
        let mut matched_keywords: Vec<String> = Vec::new();
        let mut primary: Option<(&str, usize)> = None;

        for theme in self.taxonomy.iter() {
            let matched: Vec<&str> = theme.keywords().iter()
                .filter(|keyword| keyword.occurs_in(&tokens))
                .map(|keyword| keyword.text())
                .collect();

            if matched.is_empty() {
                continue;
            }

            // strictly greater, so earlier themes win ties
            if primary.map(|(_, count)| matched.len() > count).unwrap_or(true) {
                primary = Some((theme.label(), matched.len()));
            }

            themes.push(theme.label().to_owned());
            for keyword in matched {
                if !matched_keywords.iter().any(|v| v == keyword) {
                    matched_keywords.push(keyword.to_owned());
                }
            }
        }

        ThemeResult {
            themes,
            primary_theme: primary.map(|(label, _)| label).unwrap_or(OTHER_THEME).to_owned(),
            matched_keywords,
        }
    }

    pub fn extract_keywords(&self, texts: &[&str]) -> Vec<Vec<String>> {
        extract_keywords_tfidf(texts, &self.tfidf)
    }

    /// Adds `themes`, `primary_theme`, `matched_keywords` and `tfidf_keywords`.
    pub fn analyze_table(&self, table: &Table, text_column: &str) -> Result<Table> {
        let texts = table.texts(text_column)?;

        info!("identifying themes for {} reviews", texts.len());
        let results: Vec<ThemeResult> = texts.iter().map(|text| self.identify_themes(text)).collect();

        info!("extracting tf-idf keywords");
        let keywords = self.extract_keywords(&texts);

        let mut distribution: BTreeMap<&str, usize> = BTreeMap::new();
        for result in &results {
            *distribution.entry(result.primary_theme.as_str()).or_default() += 1;
        }
        for (theme, count) in &distribution {
            info!("{}: {} reviews", theme, count);
        }

        let mut themes = Vec::with_capacity(results.len());
        let mut primary_themes = Vec::with_capacity(results.len());
        let mut matched_keywords = Vec::with_capacity(results.len());
        for result in &results {
            themes.push(Value::List(result.themes.clone()));
            primary_themes.push(Value::text(result.primary_theme.as_str()));
            matched_keywords.push(Value::List(result.matched_keywords.clone()));
        }

        table.clone()
            .with_column("themes", themes)?
            .with_column("primary_theme", primary_themes)?
            .with_column("matched_keywords", matched_keywords)?
            .with_column("tfidf_keywords", keywords.into_iter().map(Value::List).collect())
    }
}

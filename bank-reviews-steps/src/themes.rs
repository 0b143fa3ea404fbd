use {
    tracing::{info, warn},
    anyhow::Context,
    bank_reviews_core::{
        config::Config,
        table::Table,
        themes::{get_theme_sentiment_correlation, ThemeAnalyzer},
    },
};

pub fn themes_step(config: &Config) -> anyhow::Result<()> {
    if !config.steps.themes.enabled {
        return Ok(());
    }

    info!("running themes step");
    let data = config.data();
    let themes = config.themes();

    let analyzer = ThemeAnalyzer::new(themes.taxonomy()?, themes.tfidf());

    let table = Table::from_path(data.sentiment_reviews())
        .with_context(|| format!("failed to read reviews from {}", data.sentiment_reviews()))?;
    let table = analyzer.analyze_table(&table, &themes.text_column)?;

    table.to_path(data.themed_reviews())
        .with_context(|| format!("failed to write reviews to {}", data.themed_reviews()))?;
    info!("saved {} reviews with themes to {}", table.len(), data.themed_reviews());

    match get_theme_sentiment_correlation(&table) {
        Some(correlation) => {
            correlation.to_path(data.theme_sentiment())
                .with_context(|| format!("failed to write theme sentiment to {}", data.theme_sentiment()))?;
            info!("saved sentiment for {} themes to {}", correlation.len(), data.theme_sentiment());
        },
        None => warn!("reviews have no sentiment labels, theme sentiment report not written"),
    }

    Ok(())
}

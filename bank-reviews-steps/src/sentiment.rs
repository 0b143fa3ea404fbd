use {
    std::path::Path,
    tracing::info,
    anyhow::Context,
    bank_reviews_core::{
        config::Config,
        sentiment::SentimentAnalyzer,
        table::Table,
    },
};

pub fn sentiment_step(config: &Config) -> anyhow::Result<()> {
    if !config.steps.sentiment.enabled {
        return Ok(());
    }

    info!("running sentiment step");
    let data = config.data();
    let sentiment = config.sentiment();

    let mut table = Table::from_path(data.processed_reviews())
        .with_context(|| format!("failed to read processed reviews from {}", data.processed_reviews()))?;

    let model_dir = sentiment.model.as_deref().map(Path::new);
    for method in &sentiment.methods {
        let analyzer = SentimentAnalyzer::with_model(method.parse()?, model_dir)?
            .with_batch_size(sentiment.batch_size);
        table = analyzer.analyze_table(&table, &sentiment.text_column)?;
    }

    table.to_path(data.sentiment_reviews())
        .with_context(|| format!("failed to write reviews to {}", data.sentiment_reviews()))?;

    info!("saved {} reviews with sentiment to {}", table.len(), data.sentiment_reviews());

    Ok(())
}

use {
    std::{fs::{create_dir_all, File}, path::Path},
    tracing::info,
    anyhow::Context,
    bank_reviews_core::{
        config::Config,
        preprocessor::ReviewPreprocessor,
        table::Table,
    },
};

pub fn preprocess_step(config: &Config) -> anyhow::Result<()> {
    if !config.steps.preprocess.enabled {
        return Ok(());
    }

    info!("running preprocess step");
    let data = config.data();

    let raw = Table::from_path(data.raw_reviews())
        .with_context(|| format!("failed to read raw reviews from {}", data.raw_reviews()))?;
    info!("loaded {} raw reviews", raw.len());

    let mut preprocessor = ReviewPreprocessor::new(raw);
    preprocessor.process();
    let (table, stats) = preprocessor.into_parts();

    table.to_path(data.processed_reviews())
        .with_context(|| format!("failed to write processed reviews to {}", data.processed_reviews()))?;

    let stats_path = data.preprocessing_stats();
    if let Some(parent) = Path::new(&stats_path).parent() {
        create_dir_all(parent)?;
    }
    let file = File::create(&stats_path)
        .with_context(|| format!("failed to create {}", stats_path))?;
    serde_json::to_writer_pretty(file, &stats)?;

    info!("saved {} processed reviews to {}", table.len(), data.processed_reviews());

    Ok(())
}

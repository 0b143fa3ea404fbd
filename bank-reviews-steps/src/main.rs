mod export;
mod preprocess;
mod sentiment;
mod summary;
mod themes;
mod utils;

use {
    tracing::info,
    bank_reviews_core::config::Config,
    crate::{
        export::export_step,
        preprocess::preprocess_step,
        sentiment::sentiment_step,
        themes::themes_step,
        utils::init_logging,
    },
};

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::load();

    preprocess_step(&config)?;
    sentiment_step(&config)?;
    themes_step(&config)?;
    export_step(&config)?;

    info!("pipeline finished");

    Ok(())
}

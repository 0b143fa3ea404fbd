use {
    tracing::Level,
    tracing_subscriber::{prelude::*, filter::filter_fn},
};

// model downloads and tokenizer setup log every file at INFO
const NOISY_TARGETS: &[&str] = &["rust_bert", "cached_path", "tokenizers", "reqwest", "hyper"];

pub fn init_logging() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish()
        .with(filter_fn(|metadata| {
            if NOISY_TARGETS.iter().any(|target| metadata.target().starts_with(target)) {
                metadata.level() <= &Level::WARN
            } else {
                true
            }
        }))
        .init();
}

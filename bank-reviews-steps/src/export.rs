use {
    std::{fs::{create_dir_all, File}, path::Path},
    tracing::{info, warn},
    anyhow::Context,
    bank_reviews_core::{
        config::Config,
        entity::into_dashboard_record,
        table::Table,
    },
    crate::summary::ExportSummary,
};

pub fn export_step(config: &Config) -> anyhow::Result<()> {
    if !config.steps.export.enabled {
        return Ok(());
    }

    info!("running export step");
    let data = config.data();

    let table = Table::from_path(data.themed_reviews())
        .with_context(|| format!("failed to read reviews from {}", data.themed_reviews()))?;

    let path = data.dashboard_export();
    if let Some(parent) = Path::new(&path).parent() {
        create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_writer(
        File::create(&path).with_context(|| format!("failed to create {}", path))?
    );

    let mut summary = ExportSummary::new();

    for row in 0..table.len() {
        let record = match into_dashboard_record(&table, row) {
            Ok(v) => v,
            Err(err) => {
                warn!("skipping review: {}", err);
                summary.skip();
                continue;
            }
        };

        writer.serialize(&record)?;
        summary.exported(record.bank_name());
    }

    writer.flush()?;
    summary.log(&path);
    info!("source columns: {}", table.column_names().join(", "));

    Ok(())
}

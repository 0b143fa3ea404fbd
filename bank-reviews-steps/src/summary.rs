use {
    std::{collections::BTreeMap, time::Instant},
    tracing::info,
};

/// Per-bank tally of dashboard rows, logged once the export file is flushed.
pub struct ExportSummary {
    started_at: Instant,
    banks: BTreeMap<String, usize>,
    skipped: usize,
}

impl ExportSummary {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            banks: BTreeMap::new(),
            skipped: 0,
        }
    }

    pub fn exported(&mut self, bank: &str) {
        *self.banks.entry(bank.to_owned()).or_default() += 1;
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn total(&self) -> usize {
        self.banks.values().sum()
    }

    pub fn log(&self, path: &str) {
        let elapsed = self.started_at.elapsed().as_secs_f32();
        info!("exported {} reviews to {} in {:.2}s ({} skipped)", self.total(), path, elapsed, self.skipped);

        for (bank, count) in &self.banks {
            info!("{}: {} reviews", bank, count);
        }
    }
}

use {
    std::collections::BTreeMap,
    tracing::warn,
    crate::{
        sentiment::SentimentLabel,
        table::{Table, Value},
    },
};

const SENTIMENT_LABEL_PREFIX: &str = "sentiment_label_";

#[derive(Debug, Default, Clone, Copy)]
struct ThemeCounts {
    total: usize,
    positive: usize,
    negative: usize,
}

/// Sentiment split per theme, using the first `sentiment_label_*` column.
/// `None` when the table has no sentiment labels or no themes.
pub fn get_theme_sentiment_correlation(table: &Table) -> Option<Table> {
    let column = table.column_names()
        .into_iter()
        .find(|name| name.starts_with(SENTIMENT_LABEL_PREFIX));

    match column {
        Some(column) => correlation_for_column(table, column),
        None => {
            warn!("no sentiment label column found, skipping theme sentiment correlation");
            None
        },
    }
}

pub fn correlation_for_column(table: &Table, sentiment_column: &str) -> Option<Table> {
    let labels = table.column(sentiment_column)?;
    let themes = match table.column("themes") {
        Some(v) => v,
        None => {
            warn!("no themes column found, skipping theme sentiment correlation");
            return None;
        },
    };

    let mut counts: BTreeMap<String, ThemeCounts> = BTreeMap::new();
    for (label, themes) in labels.iter().zip(themes) {
        let label = label.as_str().unwrap_or("");
        for theme in themes.as_list().unwrap_or_default() {
            let entry = counts.entry(theme).or_default();
            entry.total += 1;
            if label == SentimentLabel::Positive.as_str() {
                entry.positive += 1;
            } else if label == SentimentLabel::Negative.as_str() {
                entry.negative += 1;
            }
        }
    }

    let mut theme = Vec::with_capacity(counts.len());
    let mut total = Vec::with_capacity(counts.len());
    let mut positive_pct = Vec::with_capacity(counts.len());
    let mut negative_pct = Vec::with_capacity(counts.len());

    for (label, v) in counts {
        theme.push(Value::Text(label));
        total.push(Value::Int(v.total as i64));
        positive_pct.push(Value::Float(percentage(v.positive, v.total)));
        negative_pct.push(Value::Float(percentage(v.negative, v.total)));
    }

    Table::from_columns(vec![
        ("theme", theme),
        ("total", total),
        ("positive_pct", positive_pct),
        ("negative_pct", negative_pct),
    ]).ok()
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 10_000.0 / total as f64).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn themes(labels: &[&str]) -> Value {
        Value::List(labels.iter().map(|v| (*v).to_owned()).collect())
    }

    #[test]
    fn splits_sentiment_per_theme() {
        let table = Table::from_columns(vec![
            ("review_text", vec!["Login is broken".into(), "Login works great".into(), "App crashes".into(), "App is stable".into()]),
            ("themes", vec![
                themes(&["Account Access Issues"]),
                themes(&["Account Access Issues"]),
                themes(&["Technical Issues"]),
                themes(&["Technical Issues", "Account Access Issues"]),
            ]),
            ("sentiment_label_vader", vec!["NEGATIVE".into(), "POSITIVE".into(), "NEGATIVE".into(), "NEUTRAL".into()]),
        ]).unwrap();

        let result = get_theme_sentiment_correlation(&table).unwrap();

        assert_eq!(result.column_names(), vec!["theme", "total", "positive_pct", "negative_pct"]);
        assert_eq!(result.texts("theme").unwrap(), vec!["Account Access Issues", "Technical Issues"]);
        assert_eq!(result.column("total").unwrap(), &[Value::Int(3), Value::Int(2)]);
        assert_eq!(result.column("positive_pct").unwrap(), &[Value::Float(33.33), Value::Float(0.0)]);
        assert_eq!(result.column("negative_pct").unwrap(), &[Value::Float(33.33), Value::Float(50.0)]);
    }

    #[test]
    fn themes_read_back_from_csv_are_parsed() {
        let table = Table::from_columns(vec![
            ("themes", vec!["[\"Customer Support\"]".into(), Value::Null, "[]".into()]),
            ("sentiment_label_distilbert", vec!["POSITIVE".into(), "NEGATIVE".into(), "NEGATIVE".into()]),
        ]).unwrap();

        let result = get_theme_sentiment_correlation(&table).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.value("positive_pct", 0), Some(&Value::Float(100.0)));
    }

    #[test]
    fn first_sentiment_column_wins() {
        let table = Table::from_columns(vec![
            ("themes", vec![themes(&["Technical Issues"])]),
            ("sentiment_label_vader", vec!["NEGATIVE".into()]),
            ("sentiment_label_distilbert", vec!["POSITIVE".into()]),
        ]).unwrap();

        let result = get_theme_sentiment_correlation(&table).unwrap();
        assert_eq!(result.value("negative_pct", 0), Some(&Value::Float(100.0)));

        let result = correlation_for_column(&table, "sentiment_label_distilbert").unwrap();
        assert_eq!(result.value("positive_pct", 0), Some(&Value::Float(100.0)));
    }

    #[test]
    fn missing_columns_yield_none() {
        let no_sentiment = Table::from_columns(vec![
            ("review_text", vec!["test".into()]),
            ("themes", vec![themes(&["Technical Issues"])]),
        ]).unwrap();
        assert!(get_theme_sentiment_correlation(&no_sentiment).is_none());

        let no_themes = Table::from_columns(vec![
            ("sentiment_label_vader", vec!["POSITIVE".into()]),
        ]).unwrap();
        assert!(get_theme_sentiment_correlation(&no_themes).is_none());
    }
}

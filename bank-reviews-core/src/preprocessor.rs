use {
    std::{cmp::Ordering, collections::HashSet},
    tracing::{info, warn},
    serde::Serialize,
    chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime},
    crate::{
        normalizer::{clean_whitespace, is_english},
        table::{Table, Value},
    },
};

const CRITICAL_COLUMNS: &[&str] = &["review_text", "rating", "bank_name"];
const DUPLICATE_KEY_COLUMNS: &[&str] = &["review_text", "rating", "bank_code"];
const OUTPUT_COLUMNS: &[&str] = &[
    "review_id",
    "review_text",
    "rating",
    "review_date",
    "review_year",
    "review_month",
    "bank_code",
    "bank_name",
    "user_name",
    "thumbs_up",
    "text_length",
    "source",
];

#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct PreprocessingStats {
    pub original_count: usize,
    pub missing_critical_removed: usize,
    pub duplicates_removed: usize,
    pub empty_reviews_removed: usize,
    pub invalid_ratings_removed: usize,
    pub non_english_removed: usize,
    pub final_count: usize,
}

/// Cleans a raw scraped review table. Each step is a no-op for columns the
/// table doesn't have.
pub struct ReviewPreprocessor {
    table: Table,
    stats: PreprocessingStats,
}

impl ReviewPreprocessor {
    pub fn new(table: Table) -> Self {
        let stats = PreprocessingStats {
            original_count: table.len(),
            ..PreprocessingStats::default()
        };

        Self {
            table,
            stats,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn stats(&self) -> &PreprocessingStats {
        &self.stats
    }

    pub fn into_parts(self) -> (Table, PreprocessingStats) {
        (self.table, self.stats)
    }

    pub fn check_missing_data(&self) -> Vec<(String, usize)> {
        let mut missing = Vec::new();

        for name in self.table.column_names() {
            let nulls = self.table.column(name)
                .map(|values| values.iter().filter(|v| v.is_null()).count())
                .unwrap_or(0);

            if nulls > 0 {
                warn!("{}: {} missing values ({:.2}%)", name, nulls, nulls as f64 * 100.0 / self.table.len() as f64);
            }
            missing.push((name.to_owned(), nulls));
        }

        missing
    }

    pub fn handle_missing_values(&mut self) {
        let columns: Vec<&[Value]> = CRITICAL_COLUMNS.iter().filter_map(|name| self.table.column(name)).collect();
        let mask: Vec<bool> = (0..self.table.len())
            .map(|row| columns.iter().all(|values| !values[row].is_null()))
            .collect();

        let removed = self.table.retain_rows(&mask);
        if removed > 0 {
            warn!("removed {} rows with missing critical values", removed);
        }
        self.stats.missing_critical_removed += removed;

        fill_nulls(&mut self.table, "user_name", Value::text("Anonymous"));
        fill_nulls(&mut self.table, "thumbs_up", Value::Int(0));
        fill_nulls(&mut self.table, "reply_content", Value::text(""));
    }

    /// Keeps the first row for each (text, rating, bank) combination.
    pub fn remove_duplicates(&mut self) {
        let columns: Vec<&[Value]> = DUPLICATE_KEY_COLUMNS.iter().filter_map(|name| self.table.column(name)).collect();
        if columns.is_empty() {
            return;
        }

        let mut seen = HashSet::new();
        let mask: Vec<bool> = (0..self.table.len())
            .map(|row| {
                let key: Vec<String> = columns.iter().map(|values| duplicate_key(&values[row])).collect();
                seen.insert(key)
            })
            .collect();

        let removed = self.table.retain_rows(&mask);
        info!("removed {} duplicate reviews", removed);
        self.stats.duplicates_removed += removed;
    }

    pub fn clean_text(&mut self) {
        if !self.table.map_column("review_text", |v| match v.as_str() {
            Some(text) => Value::Text(clean_whitespace(text)),
            None => Value::Null,
        }) {
            return;
        }

        let mask: Vec<bool> = self.table.texts("review_text")
            .map(|texts| texts.iter().map(|v| !v.is_empty()).collect())
            .unwrap_or_default();
        let removed = self.table.retain_rows(&mask);
        if removed > 0 {
            info!("removed {} empty reviews", removed);
        }
        self.stats.empty_reviews_removed += removed;

        let lengths = self.table.texts("review_text")
            .map(|texts| texts.iter().map(|v| Value::Int(v.chars().count() as i64)).collect())
            .unwrap_or_default();
        if let Err(err) = self.table.set_column("text_length", lengths) {
            warn!("failed to add text_length column: {}", err);
        }
    }

    /// Rewrites `review_date` as `YYYY-MM-DD` and adds `review_year` and
    /// `review_month`. Dates that fail to parse become null.
    pub fn normalize_dates(&mut self) {
        let dates: Vec<Option<NaiveDate>> = match self.table.column("review_date") {
            Some(values) => values.iter().map(|v| v.as_str().and_then(parse_date)).collect(),
            None => return,
        };

        let unparsed = self.table.column("review_date")
            .map(|values| values.iter().zip(&dates).filter(|(v, date)| !v.is_null() && date.is_none()).count())
            .unwrap_or(0);
        if unparsed > 0 {
            warn!("{} review dates could not be parsed", unparsed);
        }

        let columns = vec![
            ("review_date", dates.iter().map(|v| Value::from(v.map(|d| d.format("%Y-%m-%d").to_string()))).collect()),
            ("review_year", dates.iter().map(|v| Value::from(v.map(|d| d.year() as i64))).collect()),
            ("review_month", dates.iter().map(|v| Value::from(v.map(|d| d.month() as i64))).collect()),
        ];
        for (name, values) in columns {
            if let Err(err) = self.table.set_column(name, values) {
                warn!("failed to set {} column: {}", name, err);
            }
        }

        let (min, max) = (dates.iter().flatten().min(), dates.iter().flatten().max());
        if let (Some(min), Some(max)) = (min, max) {
            info!("review dates range from {} to {}", min, max);
        }
    }

    pub fn validate_ratings(&mut self) {
        let ratings: Vec<Option<i64>> = match self.table.column("rating") {
            Some(values) => values.iter().map(|v| v.as_i64().filter(|r| (1..=5).contains(r))).collect(),
            None => return,
        };

        let mask: Vec<bool> = ratings.iter().map(Option::is_some).collect();
        self.table.map_column("rating", |v| v.as_i64().map(Value::Int).unwrap_or(Value::Null));

        let removed = self.table.retain_rows(&mask);
        if removed > 0 {
            warn!("removed {} reviews with invalid ratings", removed);
        }
        self.stats.invalid_ratings_removed += removed;
    }

    pub fn filter_english_reviews(&mut self) {
        let mask: Vec<bool> = match self.table.texts("review_text") {
            Ok(texts) => texts.iter().map(|v| is_english(v)).collect(),
            Err(_) => return,
        };

        let removed = self.table.retain_rows(&mask);
        info!("removed {} non-English reviews", removed);
        self.stats.non_english_removed += removed;
    }

    /// Keeps the output columns and sorts by bank, newest reviews first.
    pub fn prepare_final_output(&mut self) {
        self.table = self.table.select(OUTPUT_COLUMNS);

        self.table.sort_rows_by(|table, a, b| {
            let text = |name: &str, row: usize| table.value(name, row).and_then(Value::as_str);

            let (date_a, date_b) = (text("review_date", a), text("review_date", b));

            nulls_last(text("bank_code", a), text("bank_code", b))
                .then_with(|| match (date_a, date_b) {
                    (Some(date_a), Some(date_b)) => date_b.cmp(date_a),
                    _ => nulls_last(date_a, date_b),
                })
        });
    }

    pub fn process(&mut self) -> &PreprocessingStats {
        info!("preprocessing {} reviews", self.table.len());

        self.check_missing_data();
        self.handle_missing_values();
        self.remove_duplicates();
        self.clean_text();
        self.normalize_dates();
        self.validate_ratings();
        self.filter_english_reviews();
        self.prepare_final_output();

        self.stats.final_count = self.table.len();
        let retention = if self.stats.original_count == 0 {
            0.0
        } else {
            self.stats.final_count as f64 * 100.0 / self.stats.original_count as f64
        };
        info!(
            "preprocessing finished: {} of {} reviews kept ({:.1}%)",
            self.stats.final_count,
            self.stats.original_count,
            retention,
        );

        &self.stats
    }
}

fn fill_nulls(table: &mut Table, name: &str, fill: Value) {
    table.map_column(name, |v| if v.is_null() { fill.clone() } else { v.clone() });
}

// ratings read back as "5" and "5.0" must collide
fn duplicate_key(value: &Value) -> String {
    value.as_i64()
        .map(|v| v.to_string())
        .unwrap_or_else(|| value.to_string())
}

fn nulls_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").ok().map(|v| v.date()))
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|v| v.naive_local().date()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|v| Value::Int(*v)).collect()
    }

    fn texts(values: &[&str]) -> Vec<Value> {
        values.iter().map(|v| Value::text(*v)).collect()
    }

    #[test]
    fn clean_text_normalizes_whitespace_and_drops_empty() {
        let table = Table::from_columns(vec![
            ("review_text", vec![
                "This   is   a   test".into(),
                "Hello\n\nWorld".into(),
                "  Trimmed  ".into(),
                "".into(),
                Value::Null,
                "Normal text here".into(),
            ]),
            ("rating", ints(&[5, 4, 3, 2, 1, 5])),
        ]).unwrap();
        let mut preprocessor = ReviewPreprocessor::new(table);

        preprocessor.clean_text();

        let table = preprocessor.table();
        assert_eq!(table.texts("review_text").unwrap(), vec!["This is a test", "Hello World", "Trimmed", "Normal text here"]);
        assert_eq!(table.column("text_length").unwrap(), &ints(&[14, 11, 7, 16])[..]);
        assert_eq!(preprocessor.stats().empty_reviews_removed, 2);
    }

    #[test]
    fn remove_duplicates_keeps_first() {
        let table = Table::from_columns(vec![
            ("review_text", texts(&["Great app", "Great app", "Bad app", "Great app"])),
            ("rating", texts(&["5", "5.0", "1", "4"])),
            ("bank_code", texts(&["CBE", "CBE", "CBE", "BOA"])),
        ]).unwrap();
        let mut preprocessor = ReviewPreprocessor::new(table);

        preprocessor.remove_duplicates();

        assert_eq!(preprocessor.table().len(), 3);
        assert_eq!(preprocessor.table().texts("rating").unwrap(), vec!["5", "1", "4"]);
        assert_eq!(preprocessor.stats().duplicates_removed, 1);
    }

    #[test]
    fn handle_missing_values_drops_and_fills() {
        let table = Table::from_columns(vec![
            ("review_text", vec!["Good".into(), Value::Null, "Bad".into(), "OK".into()]),
            ("rating", vec![Value::Int(5), Value::Int(4), Value::Null, Value::Int(3)]),
            ("bank_name", vec!["CBE".into(), "BOA".into(), "Dashen".into(), Value::Null]),
            ("user_name", vec!["User1".into(), Value::Null, "User3".into(), "User4".into()]),
            ("thumbs_up", vec![Value::Null, Value::Null, Value::Int(5), Value::Int(0)]),
        ]).unwrap();
        let mut preprocessor = ReviewPreprocessor::new(table);

        preprocessor.handle_missing_values();

        let table = preprocessor.table();
        assert_eq!(table.len(), 1);
        assert_eq!(table.texts("user_name").unwrap(), vec!["User1"]);
        assert_eq!(table.value("thumbs_up", 0), Some(&Value::Int(0)));
        assert_eq!(preprocessor.stats().missing_critical_removed, 3);
    }

    #[test]
    fn handle_missing_values_fills_anonymous() {
        let table = Table::from_columns(vec![
            ("review_text", texts(&["Good app", "Bad app"])),
            ("user_name", vec![Value::Null, "User2".into()]),
            ("reply_content", vec![Value::Null, "Thanks".into()]),
        ]).unwrap();
        let mut preprocessor = ReviewPreprocessor::new(table);

        preprocessor.handle_missing_values();

        assert_eq!(preprocessor.table().texts("user_name").unwrap(), vec!["Anonymous", "User2"]);
        assert_eq!(preprocessor.table().value("reply_content", 0), Some(&Value::text("")));
    }

    #[test]
    fn normalize_dates_adds_year_and_month() {
        let table = Table::from_columns(vec![
            ("review_date", vec![
                "2024-01-15".into(),
                "2024-02-20 10:30:00".into(),
                "2024-03-25T08:00:00+03:00".into(),
                "yesterday".into(),
            ]),
            ("review_text", texts(&["a", "b", "c", "d"])),
        ]).unwrap();
        let mut preprocessor = ReviewPreprocessor::new(table);

        preprocessor.normalize_dates();

        let table = preprocessor.table();
        assert_eq!(table.len(), 4);
        assert_eq!(table.column("review_date").unwrap(), &[
            Value::text("2024-01-15"),
            Value::text("2024-02-20"),
            Value::text("2024-03-25"),
            Value::Null,
        ]);
        assert_eq!(table.column("review_year").unwrap(), &[Value::Int(2024), Value::Int(2024), Value::Int(2024), Value::Null]);
        assert_eq!(table.column("review_month").unwrap(), &[Value::Int(1), Value::Int(2), Value::Int(3), Value::Null]);
    }

    #[test]
    fn validate_ratings_removes_out_of_range() {
        let table = Table::from_columns(vec![
            ("rating", texts(&["1", "2", "3", "4", "5", "0", "6", "-1", "10"])),
            ("review_text", texts(&["a"; 9])),
        ]).unwrap();
        let mut preprocessor = ReviewPreprocessor::new(table);

        preprocessor.validate_ratings();

        assert_eq!(preprocessor.table().column("rating").unwrap(), &ints(&[1, 2, 3, 4, 5])[..]);
        assert_eq!(preprocessor.stats().invalid_ratings_removed, 4);
    }

    #[test]
    fn filter_english_reviews_drops_other_scripts() {
        let table = Table::from_columns(vec![
            ("review_text", texts(&[
                "This is an English review",
                "Another English text here",
                "ይህ አማርኛ ነው",
                "Good app works well",
                "هذا عربي",
            ])),
            ("rating", ints(&[5, 4, 3, 2, 1])),
        ]).unwrap();
        let mut preprocessor = ReviewPreprocessor::new(table);

        preprocessor.filter_english_reviews();

        assert_eq!(preprocessor.table().len(), 3);
        assert!(preprocessor.table().texts("review_text").unwrap().iter().all(|v| is_english(v)));
        assert_eq!(preprocessor.stats().non_english_removed, 2);
    }

    #[test]
    fn prepare_final_output_selects_and_sorts() {
        let table = Table::from_columns(vec![
            ("review_id", texts(&["r1", "r2", "r3", "r4"])),
            ("review_text", texts(&["Good", "Bad", "OK", "Fine"])),
            ("review_date", vec!["2024-01-01".into(), "2024-01-02".into(), "2024-01-03".into(), Value::Null]),
            ("bank_code", texts(&["CBE", "BOA", "CBE", "CBE"])),
            ("extra_column", texts(&["x", "y", "z", "w"])),
        ]).unwrap();
        let mut preprocessor = ReviewPreprocessor::new(table);

        preprocessor.prepare_final_output();

        let table = preprocessor.table();
        assert_eq!(table.column_names(), vec!["review_id", "review_text", "review_date", "bank_code"]);
        assert_eq!(table.texts("review_id").unwrap(), vec!["r2", "r3", "r1", "r4"]);
    }

    #[test]
    fn process_runs_every_step() {
        let table = Table::from_columns(vec![
            ("review_id", texts(&["r1", "r2", "r3", "r4", "r5", "r6"])),
            ("review_text", vec![
                "Great app,   very   fast".into(),
                "Great app, very fast".into(),
                "ይህ አማርኛ ነው".into(),
                "Login keeps failing".into(),
                Value::Null,
                "Transfers are slow".into(),
            ]),
            ("rating", texts(&["5", "5", "4", "9", "3", "2"])),
            ("review_date", texts(&["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05", "2024-01-06"])),
            ("bank_code", texts(&["CBE", "CBE", "BOA", "BOA", "BOA", "BOA"])),
            ("bank_name", texts(&["CBE", "CBE", "BOA", "BOA", "BOA", "BOA"])),
            ("user_name", vec![Value::Null, "U2".into(), "U3".into(), "U4".into(), "U5".into(), "U6".into()]),
        ]).unwrap();
        let mut preprocessor = ReviewPreprocessor::new(table);

        let stats = preprocessor.process().clone();

        assert_eq!(stats, PreprocessingStats {
            original_count: 6,
            missing_critical_removed: 1,
            duplicates_removed: 0,
            empty_reviews_removed: 0,
            invalid_ratings_removed: 1,
            non_english_removed: 1,
            final_count: 3,
        });

        let table = preprocessor.table();
        assert_eq!(table.texts("review_id").unwrap(), vec!["r6", "r2", "r1"]);
        assert_eq!(table.texts("review_text").unwrap()[2], "Great app, very fast");
        assert_eq!(table.texts("user_name").unwrap()[2], "Anonymous");
        assert!(table.has_column("review_year"));
        assert!(!table.has_column("reply_content"));
    }

    #[test]
    fn empty_table_is_a_no_op() {
        let mut preprocessor = ReviewPreprocessor::new(Table::new());

        let stats = preprocessor.process();

        assert_eq!(stats, &PreprocessingStats::default());
        assert!(preprocessor.table().is_empty());
    }
}

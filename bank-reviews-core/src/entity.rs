use {
    typed_builder::TypedBuilder,
    serde::{Serialize, Deserialize},
    chrono::NaiveDate,
    crate::{
        normalizer::{clean_whitespace, MIN_TEXT_LENGTH},
        sentiment::SentimentMethod,
        table::{Table, Value},
    },
};

#[derive(TypedBuilder, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Review {
    review_id: String,
    review_text: String,
    #[builder(default)]
    cleaned_text: Option<String>,
    rating: u8,
    #[builder(default)]
    review_date: Option<NaiveDate>,
    bank_code: String,
    #[builder(default = "Anonymous".to_owned())]
    user_name: String,
    #[builder(default)]
    thumbs_up: u32,
}

// field order is the dashboard csv header
#[derive(TypedBuilder, Serialize, Debug)]
pub struct DashboardRecord {
    review_id: String,
    review_text: String,
    rating: u8,
    review_date: Option<NaiveDate>,
    bank_code: String,
    bank_name: String,
    user_name: String,
    thumbs_up: u32,
    sentiment_label_vader: Option<String>,
    sentiment_score_vader: Option<f64>,
    sentiment_label_distilbert: Option<String>,
    sentiment_score_distilbert: Option<f64>,
    primary_theme: Option<String>,
    themes: String,
}

impl Review {
    pub fn review_id(&self) -> &str {
        &self.review_id
    }

    pub fn review_text(&self) -> &str {
        &self.review_text
    }

    pub fn cleaned_text(&self) -> Option<&str> {
        self.cleaned_text.as_deref()
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn review_date(&self) -> Option<NaiveDate> {
        self.review_date
    }

    pub fn bank_code(&self) -> &str {
        &self.bank_code
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn thumbs_up(&self) -> u32 {
        self.thumbs_up
    }
}

impl DashboardRecord {
    pub fn bank_name(&self) -> &str {
        &self.bank_name
    }

    pub fn primary_theme(&self) -> Option<&str> {
        self.primary_theme.as_deref()
    }
}

/// Builds a review from one table row, enforcing the invariants every
/// review leaving the pipeline must hold.
pub fn into_review_entity(table: &Table, row: usize) -> Result<Review, String> {
    let text = text_at(table, "review_text", row)
        .filter(|v| v.trim().chars().count() >= MIN_TEXT_LENGTH)
        .ok_or_else(|| format!("row {}: review text is missing or shorter than {} characters", row, MIN_TEXT_LENGTH))?;

    let rating = table.value("rating", row)
        .and_then(Value::as_i64)
        .filter(|v| (1..=5).contains(v))
        .ok_or_else(|| format!("row {}: rating is missing or outside 1-5", row))?;

    Ok(Review::builder()
        .review_id(text_at(table, "review_id", row).map(|v| v.to_owned()).unwrap_or_else(|| format!("row-{}", row)))
        .cleaned_text(Some(clean_whitespace(text)))
        .review_text(text.to_owned())
        .rating(rating as u8)
        .review_date(text_at(table, "review_date", row).and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok()))
        .bank_code(text_at(table, "bank_code", row).unwrap_or("").to_owned())
        .user_name(text_at(table, "user_name", row).unwrap_or("Anonymous").to_owned())
        .thumbs_up(table.value("thumbs_up", row).and_then(Value::as_i64).map(|v| v.max(0) as u32).unwrap_or(0))
        .build())
}

pub fn into_dashboard_record(table: &Table, row: usize) -> Result<DashboardRecord, String> {
    let review = into_review_entity(table, row)?;

    let label = |method: SentimentMethod| text_at(table, &method.label_column(), row).map(|v| v.to_owned());
    let score = |method: SentimentMethod| table.value(&method.score_column(), row).and_then(Value::as_f64);

    let themes = table.value("themes", row)
        .and_then(Value::as_list)
        .unwrap_or_default()
        .join("; ");

    Ok(DashboardRecord::builder()
        .bank_name(text_at(table, "bank_name", row).unwrap_or(&review.bank_code).to_owned())
        .sentiment_label_vader(label(SentimentMethod::Vader))
        .sentiment_score_vader(score(SentimentMethod::Vader))
        .sentiment_label_distilbert(label(SentimentMethod::DistilBert))
        .sentiment_score_distilbert(score(SentimentMethod::DistilBert))
        .primary_theme(text_at(table, "primary_theme", row).map(|v| v.to_owned()))
        .themes(themes)
        .review_id(review.review_id)
        .review_text(review.review_text)
        .rating(review.rating)
        .review_date(review.review_date)
        .bank_code(review.bank_code)
        .user_name(review.user_name)
        .thumbs_up(review.thumbs_up)
        .build())
}

fn text_at<'a>(table: &'a Table, column: &str, row: usize) -> Option<&'a str> {
    table.value(column, row).and_then(Value::as_str)
}

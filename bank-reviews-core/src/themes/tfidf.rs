//! Per-review keyword extraction weighted by TF-IDF over the batch.

use {
    std::{cmp::Ordering, collections::{HashMap, HashSet}},
    once_cell::sync::Lazy,
    tracing::debug,
    crate::normalizer::preprocess_text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TfidfConfig {
    pub max_features: usize,
    pub ngram_range: (usize, usize),
    pub min_df: usize,
    pub top_n: usize,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            max_features: 100,
            ngram_range: (1, 2),
            min_df: 2,
            top_n: 5,
        }
    }
}

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| ENGLISH_STOP_WORDS.iter().cloned().collect());

/// Top `config.top_n` terms for each text, in input order. The vocabulary
/// is built from `texts` alone, so small batches give short or empty lists.
pub fn extract_keywords_tfidf(texts: &[&str], config: &TfidfConfig) -> Vec<Vec<String>> {
    let documents: Vec<HashMap<String, usize>> = texts.iter()
        .map(|text| term_counts(text, config.ngram_range))
        .collect();

    let vocabulary = build_vocabulary(&documents, config);
    debug!("tf-idf vocabulary has {} terms over {} documents", vocabulary.len(), documents.len());

    let total = documents.len() as f64;
    documents.iter()
        .map(|counts| {
            let mut weights: Vec<(&str, f64)> = counts.iter()
                .filter_map(|(term, count)| {
                    vocabulary.get(term).map(|df| (term.as_str(), *count as f64 * idf(total, *df as f64)))
                })
                .filter(|(_, weight)| *weight > 0.0)
                .collect();

            weights.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(b.0)));
            weights.into_iter()
                .take(config.top_n)
                .map(|(term, _)| term.to_owned())
                .collect()
        })
        .collect()
}

fn idf(documents: f64, document_frequency: f64) -> f64 {
    ((1.0 + documents) / (1.0 + document_frequency)).ln() + 1.0
}

/// Kept terms mapped to their document frequency.
fn build_vocabulary(documents: &[HashMap<String, usize>], config: &TfidfConfig) -> HashMap<String, usize> {
    let mut frequency: HashMap<&str, (usize, usize)> = HashMap::new();
    for counts in documents {
        for (term, count) in counts {
            let entry = frequency.entry(term.as_str()).or_default();
            entry.0 += 1;
            entry.1 += count;
        }
    }

    let mut terms: Vec<(&str, usize, usize)> = frequency.into_iter()
        .filter(|(_, (df, _))| *df >= config.min_df.max(1))
        .map(|(term, (df, total))| (term, df, total))
        .collect();

    terms.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(b.0)));
    terms.into_iter()
        .take(config.max_features)
        .map(|(term, df, _)| (term.to_owned(), df))
        .collect()
}

fn term_counts(text: &str, ngram_range: (usize, usize)) -> HashMap<String, usize> {
    let text = preprocess_text(text);
    let tokens: Vec<&str> = text.split(' ')
        .filter(|v| v.len() >= 2 && !STOP_WORDS.contains(v))
        .collect();

    let (min_n, max_n) = (ngram_range.0.max(1), ngram_range.1.max(ngram_range.0.max(1)));

    let mut counts = HashMap::new();
    for n in min_n..=max_n {
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    counts
}

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
    "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
    "amongst", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below",
    "beside", "besides", "between", "beyond", "both", "but", "by", "can", "cannot",
    "could", "did", "do", "does", "done", "down", "due", "during", "each", "eg", "either",
    "else", "elsewhere", "enough", "etc", "even", "ever", "every", "everyone",
    "everything", "everywhere", "except", "few", "for", "former", "formerly", "from",
    "further", "had", "has", "have", "he", "hence", "her", "here", "hereafter", "hereby",
    "herein", "hers", "herself", "him", "himself", "his", "how", "however", "ie", "if",
    "in", "indeed", "into", "is", "it", "its", "itself", "just", "last", "latter",
    "latterly", "least", "less", "many", "may", "me", "meanwhile", "might", "mine",
    "more", "moreover", "most", "mostly", "much", "must", "my", "myself", "namely",
    "neither", "never", "nevertheless", "next", "no", "nobody", "none", "noone", "nor",
    "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one",
    "only", "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves",
    "out", "over", "own", "per", "perhaps", "please", "rather", "same", "seem", "seemed",
    "seeming", "seems", "several", "she", "should", "since", "so", "some", "somehow",
    "someone", "something", "sometime", "sometimes", "somewhere", "still", "such",
    "than", "that", "the", "their", "them", "themselves", "then", "thence", "there",
    "thereafter", "thereby", "therefore", "therein", "thereupon", "these", "they",
    "this", "those", "though", "through", "throughout", "thru", "thus", "to",
    "together", "too", "toward", "towards", "under", "until", "up", "upon", "us",
    "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole",
    "whom", "whose", "why", "will", "with", "within", "without", "would", "yet", "you",
    "your", "yours", "yourself", "yourselves",
];

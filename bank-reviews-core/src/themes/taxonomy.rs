use {
    std::collections::HashSet,
    serde::{Serialize, Deserialize},
    crate::{
        error::{Error, Result},
        normalizer::preprocess_text,
    },
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ThemeDefinition {
    pub label: String,
    pub keywords: Vec<String>,
}

/// A keyword as declared, plus its preprocessed words used for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    text: String,
    words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    label: String,
    keywords: Vec<Keyword>,
}

/// Ordered theme list. Declaration order decides primary theme ties.
#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    themes: Vec<Theme>,
}

impl ThemeDefinition {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_owned(),
            keywords: keywords.iter().map(|v| (*v).to_owned()).collect(),
        }
    }
}

impl Keyword {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// True when some run of consecutive tokens starts with this keyword's
    /// words in order.
    pub fn occurs_in(&self, tokens: &[&str]) -> bool {
        let n = self.words.len();
        if n == 0 || tokens.len() < n {
            return false;
        }

        tokens.windows(n).any(|window| {
            window.iter().zip(&self.words).all(|(token, word)| token.starts_with(word.as_str()))
        })
    }
}

impl Theme {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }
}

impl Taxonomy {
    pub fn new(definitions: Vec<ThemeDefinition>) -> Result<Self> {
        if definitions.is_empty() {
            return Err(Error::InvalidConfiguration("theme taxonomy is empty".to_owned()));
        }

        let mut labels = HashSet::new();
        let mut themes = Vec::with_capacity(definitions.len());

        for definition in definitions {
            let label = definition.label.trim().to_owned();
            if label.is_empty() {
                return Err(Error::InvalidConfiguration("theme label is empty".to_owned()));
            }
            if !labels.insert(label.clone()) {
                return Err(Error::InvalidConfiguration(format!("duplicate theme label: \"{}\"", label)));
            }
            if definition.keywords.is_empty() {
                return Err(Error::InvalidConfiguration(format!("theme \"{}\" has no keywords", label)));
            }

            let mut keywords = Vec::with_capacity(definition.keywords.len());
            for text in definition.keywords {
                let words: Vec<String> = preprocess_text(&text).split(' ')
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_owned())
                    .collect();

                if words.is_empty() {
                    return Err(Error::InvalidConfiguration(format!(
                        "theme \"{}\" has keyword \"{}\" with no letters",
                        label,
                        text,
                    )));
                }

                keywords.push(Keyword { text, words });
            }

            themes.push(Theme { label, keywords });
        }

        Ok(Self {
            themes,
        })
    }

    /// Themes seen in app store reviews of Ethiopian banking apps.
    pub fn banking() -> Self {
        let definitions = vec![
            ThemeDefinition::new("Account Access Issues", &[
                "login", "log in", "sign in", "password", "account", "access",
                "authentication", "otp", "verification", "locked", "pin", "username",
            ]),
            ThemeDefinition::new("Transaction Performance", &[
                "transfer", "transaction", "payment", "slow", "delay", "pending",
                "money", "deposit", "withdraw", "balance",
            ]),
            ThemeDefinition::new("Technical Issues", &[
                "crash", "bug", "error", "freeze", "frozen", "not working",
                "doesnt work", "glitch", "update", "loading", "fail", "stuck",
            ]),
            ThemeDefinition::new("User Interface & Experience", &[
                "interface", "ui", "design", "layout", "navigation", "easy",
                "user friendly", "confusing", "experience", "smooth", "works well",
                "simple", "beautiful", "menu",
            ]),
            ThemeDefinition::new("Customer Support", &[
                "customer service", "customer support", "support", "help", "respond",
                "response", "call center", "contact", "staff", "branch",
            ]),
            ThemeDefinition::new("Feature Requests", &[
                "feature", "add", "please add", "wish", "would like", "should have",
                "option", "request", "suggest", "improve", "need",
            ]),
            ThemeDefinition::new("Security & Privacy", &[
                "secure", "security", "privacy", "fraud", "hack", "scam", "safe",
                "stolen", "unauthorized", "trust",
            ]),
        ];

        Self {
            themes: definitions.into_iter()
                .map(|definition| Theme {
                    keywords: definition.keywords.into_iter()
                        .map(|text| Keyword {
                            words: text.split(' ').map(|v| v.to_owned()).collect(),
                            text,
                        })
                        .collect(),
                    label: definition.label,
                })
                .collect(),
        }
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn labels(&self) -> Vec<&str> {
        self.themes.iter().map(|v| v.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Theme> {
        self.themes.iter()
    }
}

//! Document task classification.
//!
//! A task is "document-bearing" when its description mentions one of a
//! configurable set of keywords. Document tasks see the current draft and
//! their output replaces it; every other task leaves the draft alone.

use planexec_config::{ClassifierConfig, DEFAULT_DOCUMENT_KEYWORDS};

#[derive(Debug, Clone)]
pub struct TaskClassifier {
    /// Lowercased keywords
    keywords: Vec<String>,
}

impl TaskClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(&config.document_keywords)
    }

    /// Case-insensitive substring match against the keyword set.
    pub fn is_document_task(&self, description: &str) -> bool {
        let description = description.to_lowercase();
        self.keywords.iter().any(|k| description.contains(k.as_str()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for TaskClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_DOCUMENT_KEYWORDS)
    }
}

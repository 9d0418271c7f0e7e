//! Keyword Classifier: maps free text to a pose hint.

use serde::Serialize;

use super::poses::names;

/// One pose and the lowercase substrings that select it
#[derive(Debug, Clone, Serialize)]
pub struct KeywordEntry {
    pub pose: String,
    pub keywords: Vec<String>,
}

/// Ordered keyword sets. The first entry with any matching substring wins;
/// there is no specificity ranking.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeywordTable {
    entries: Vec<KeywordEntry>,
}

impl KeywordTable {
    pub fn new<P, K>(entries: impl IntoIterator<Item = (P, Vec<K>)>) -> Self
    where
        P: Into<String>,
        K: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(pose, keywords)| KeywordEntry {
                pose: pose.into(),
                keywords: keywords
                    .iter()
                    .map(|k| k.as_ref().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();
        Self { entries }
    }

    pub fn builtin() -> Self {
        Self::new([
            (
                names::HAPPY,
                vec![
                    "happy", "great", "won", "win", "awesome", "amazing", "love", "yay",
                    "excited", "glad", "proud",
                ],
            ),
            (
                names::SURPRISED,
                vec![
                    "wow", "omg", "no way", "crazy", "wild", "unbelievable", "suddenly",
                    "shocked",
                ],
            ),
            (
                names::SAD,
                vec![
                    "sad", "bad", "awful", "terrible", "cried", "lonely", "upset", "rough",
                    "miss",
                ],
            ),
            (
                names::THINKING,
                vec!["maybe", "think", "wonder", "confused", "not sure", "idk", "hmm"],
            ),
            (
                names::STRETCHING,
                vec!["tired", "exhausted", "sleepy", "long day", "stretch"],
            ),
        ])
    }

    /// Pose hint for `text`, if any keyword occurs in it (case-insensitive)
    pub fn classify(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|entry| entry.pose.as_str())
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

impl FaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Ordered FAQ entries. An entry's identity is its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    entries: Vec<FaqEntry>,
}

impl Corpus {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FaqEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn questions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.question.as_str()).collect()
    }
}

impl FromIterator<FaqEntry> for Corpus {
    fn from_iter<I: IntoIterator<Item = FaqEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<Vec<(&str, &str)>> for Corpus {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        pairs
            .into_iter()
            .map(|(q, a)| FaqEntry::new(q, a))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched_index: usize,
    pub question: String,
    pub answer: String,
    pub score: f32,
}

/// Best match from each index for the same query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualMatch {
    pub lexical: MatchResult,
    pub semantic: MatchResult,
}

impl DualMatch {
    pub fn agree(&self) -> bool {
        self.lexical.matched_index == self.semantic.matched_index
    }
}

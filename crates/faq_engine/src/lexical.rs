use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::error::BuildError;
use crate::index::LexicalIndex;
use crate::tokenize::lexical_terms;

/// Unit-length sparse vector, entries sorted by term column. An empty vector
/// stands for the zero vector.
#[derive(Debug, Clone, Default, PartialEq)]
struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    fn from_counts(counts: HashMap<usize, f32>, idf: &[f32]) -> Self {
        let mut entries: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * idf[col]))
            .collect();
        entries.sort_unstable_by_key(|(col, _)| *col);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut entries {
                *w /= norm;
            }
        } else {
            entries.clear();
        }

        Self { entries }
    }

    fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.entries.len() && j < other.entries.len() {
            let (a, wa) = self.entries[i];
            let (b, wb) = other.entries[j];
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Both sides are unit length, so the dot product is the cosine.
    fn cosine(&self, other: &SparseVector) -> f32 {
        if self.is_zero() || other.is_zero() {
            0.0
        } else {
            self.dot(other).clamp(-1.0, 1.0)
        }
    }
}

/// TF-IDF vector space fitted once over the corpus questions.
///
/// Term weights use the smoothed form `ln((1 + n) / (1 + df)) + 1`, so a term
/// present in every question still carries weight 1. Queries are projected
/// onto the fitted vocabulary only; unseen terms are dropped.
#[derive(Debug, Clone)]
pub struct TfIdfIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    documents: Vec<SparseVector>,
}

impl TfIdfIndex {
    #[instrument(skip_all, fields(questions = questions.len()))]
    pub fn build<S: AsRef<str>>(questions: &[S]) -> Result<Self, BuildError> {
        if questions.is_empty() {
            return Err(BuildError::EmptyCorpus);
        }

        let tokenized: Vec<Vec<String>> = questions
            .iter()
            .map(|q| lexical_terms(q.as_ref()))
            .collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();
        let mut counts_per_doc: Vec<HashMap<usize, f32>> = Vec::with_capacity(tokenized.len());

        for terms in tokenized {
            let mut counts: HashMap<usize, f32> = HashMap::new();
            for term in terms {
                let next = vocabulary.len();
                let col = *vocabulary.entry(term).or_insert(next);
                if col == doc_freq.len() {
                    doc_freq.push(0);
                }
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
            for col in counts.keys() {
                doc_freq[*col] += 1;
            }
            counts_per_doc.push(counts);
        }

        if vocabulary.is_empty() {
            return Err(BuildError::DegenerateCorpus);
        }

        let n = questions.len() as f32;
        let idf: Vec<f32> = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        let documents: Vec<SparseVector> = counts_per_doc
            .into_iter()
            .map(|counts| SparseVector::from_counts(counts, &idf))
            .collect();

        info!(
            questions = documents.len(),
            vocabulary = vocabulary.len(),
            "built lexical index"
        );

        Ok(Self {
            vocabulary,
            idf,
            documents,
        })
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Fitted weight of `term`, if it was seen during build.
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.get(term).map(|&col| self.idf[col])
    }

    fn vectorize(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for term in lexical_terms(text) {
            if let Some(&col) = self.vocabulary.get(&term) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }
        SparseVector::from_counts(counts, &self.idf)
    }
}

impl LexicalIndex for TfIdfIndex {
    fn len(&self) -> usize {
        self.documents.len()
    }

    fn score(&self, query: &str) -> Vec<f32> {
        let q = self.vectorize(query);
        self.documents.par_iter().map(|d| q.cosine(d)).collect()
    }
}

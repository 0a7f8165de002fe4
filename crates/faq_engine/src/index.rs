//! The two seams the retrieval engine depends on. Any implementation can be
//! dropped in through [`RetrievalEngine::from_parts`](crate::RetrievalEngine::from_parts).

use crate::retrieval::best_index;

fn top_of(mut scores: Vec<f32>, len: usize) -> (usize, f32) {
    scores.truncate(len);
    best_index(&scores).unwrap_or((0, 0.0))
}

/// Term-overlap similarity over a fixed question set.
pub trait LexicalIndex: Send + Sync {
    /// Number of indexed questions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One score per indexed question, in corpus order.
    fn score(&self, query: &str) -> Vec<f32>;

    /// Argmax over the first `len()` scores, ties to the lowest index.
    fn best_match(&self, query: &str) -> (usize, f32) {
        top_of(self.score(query), self.len())
    }
}

/// Dense-embedding similarity over a fixed question set.
pub trait SemanticIndex: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dimensionality(&self) -> usize;

    /// Embedding of `text`. All zeros means nothing in `text` was known to
    /// the model.
    fn embed(&self, text: &str) -> Vec<f32>;

    fn score(&self, query: &str) -> Vec<f32>;

    /// Argmax over the first `len()` scores, ties to the lowest index.
    fn best_match(&self, query: &str) -> (usize, f32) {
        top_of(self.score(query), self.len())
    }
}

impl LexicalIndex for Box<dyn LexicalIndex> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn score(&self, query: &str) -> Vec<f32> {
        (**self).score(query)
    }

    fn best_match(&self, query: &str) -> (usize, f32) {
        (**self).best_match(query)
    }
}

impl SemanticIndex for Box<dyn SemanticIndex> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn dimensionality(&self) -> usize {
        (**self).dimensionality()
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        (**self).embed(text)
    }

    fn score(&self, query: &str) -> Vec<f32> {
        (**self).score(query)
    }

    fn best_match(&self, query: &str) -> (usize, f32) {
        (**self).best_match(query)
    }
}

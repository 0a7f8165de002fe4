use tracing::{debug, info, instrument};

use crate::config::EmbeddingConfig;
use crate::error::{BuildError, EngineError, Result};
use crate::index::{LexicalIndex, SemanticIndex};
use crate::lexical::TfIdfIndex;
use crate::model::{Corpus, DualMatch, MatchResult};
use crate::semantic::Word2VecIndex;

/// Owns the corpus and both indexes and answers queries against them.
///
/// A value of this type only exists once both indexes have been built, and
/// nothing in it changes afterwards. Share it by reference (or `Arc`) between
/// as many query handlers as needed.
#[derive(Debug, Clone)]
pub struct RetrievalEngine<L = TfIdfIndex, S = Word2VecIndex> {
    corpus: Corpus,
    lexical: L,
    semantic: S,
}

impl RetrievalEngine {
    /// Builds the TF-IDF and word2vec indexes over `corpus` in parallel.
    #[instrument(skip_all, fields(entries = corpus.len()))]
    pub fn initialize(corpus: Corpus, config: &EmbeddingConfig) -> Result<Self> {
        let questions = corpus.questions();
        let (lexical, semantic) = rayon::join(
            || TfIdfIndex::build(&questions),
            || Word2VecIndex::build(&questions, config),
        );
        let (lexical, semantic) = (lexical?, semantic?);

        info!(
            entries = corpus.len(),
            lexical_vocabulary = lexical.vocabulary_len(),
            semantic_vocabulary = semantic.model().vocabulary_len(),
            "retrieval engine ready"
        );

        Self::from_parts(corpus, lexical, semantic)
    }
}

impl<L: LexicalIndex, S: SemanticIndex> RetrievalEngine<L, S> {
    /// Assembles an engine from indexes built elsewhere. Both must cover
    /// exactly the corpus questions.
    pub fn from_parts(corpus: Corpus, lexical: L, semantic: S) -> Result<Self> {
        if corpus.is_empty() {
            return Err(BuildError::EmptyCorpus.into());
        }
        for actual in [lexical.len(), semantic.len()] {
            if actual != corpus.len() {
                return Err(BuildError::CorpusMismatch {
                    expected: corpus.len(),
                    actual,
                }
                .into());
            }
        }

        Ok(Self {
            corpus,
            lexical,
            semantic,
        })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn lexical(&self) -> &L {
        &self.lexical
    }

    pub fn semantic(&self) -> &S {
        &self.semantic
    }

    /// Best match from each index. Only a blank query is rejected.
    pub fn answer(&self, query: &str) -> Result<DualMatch> {
        if query.trim().is_empty() {
            return Err(EngineError::EmptyQuery);
        }

        let (lexical, semantic) = rayon::join(
            || self.lexical.best_match(query),
            || self.semantic.best_match(query),
        );
        debug!(
            lexical_index = lexical.0,
            lexical_score = lexical.1,
            semantic_index = semantic.0,
            semantic_score = semantic.1,
            "answered query"
        );

        Ok(DualMatch {
            lexical: self.match_result(lexical),
            semantic: self.match_result(semantic),
        })
    }

    fn match_result(&self, (index, score): (usize, f32)) -> MatchResult {
        debug_assert!(
            index < self.corpus.len(),
            "index {index} out of range for {} entries",
            self.corpus.len()
        );
        let index = index.min(self.corpus.len() - 1);
        let entry = &self.corpus.entries()[index];
        MatchResult {
            matched_index: index,
            question: entry.question.clone(),
            answer: entry.answer.clone(),
            score,
        }
    }
}

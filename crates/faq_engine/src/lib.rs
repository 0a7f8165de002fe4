pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod index;
pub mod lexical;
pub mod model;
pub mod retrieval;
pub mod semantic;
pub mod storage;
pub mod tokenize;

pub use config::{
    Architecture, EmbeddingConfig, DEFAULT_DIMENSIONALITY, DEFAULT_EPOCHS, DEFAULT_MIN_TERM_COUNT,
    DEFAULT_NEGATIVE, DEFAULT_SEED, DEFAULT_WINDOW,
};
pub use engine::RetrievalEngine;
pub use error::{BuildError, EngineError};
pub use eval::{
    evaluate_cases, read_eval_cases, EvalCase, EvalOutcome, EvalSummary, Gate, MethodSummary,
};
pub use index::{LexicalIndex, SemanticIndex};
pub use lexical::TfIdfIndex;
pub use model::{Corpus, DualMatch, FaqEntry, MatchResult};
pub use retrieval::{best_index, cosine_similarity};
pub use semantic::{EmbeddingModel, Word2VecIndex};
pub use storage::load_corpus;

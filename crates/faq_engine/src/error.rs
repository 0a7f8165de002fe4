use thiserror::Error;

/// Structural problems found while building an index. None of them can be
/// fixed by retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("corpus has no entries")]
    EmptyCorpus,

    #[error("corpus questions produce an empty vocabulary")]
    DegenerateCorpus,

    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),

    #[error("index covers {actual} questions but the corpus has {expected}")]
    CorpusMismatch { expected: usize, actual: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("failed to initialize retrieval engine: {0}")]
    Initialization(#[source] BuildError),

    #[error("query is empty")]
    EmptyQuery,
}

impl From<BuildError> for EngineError {
    fn from(err: BuildError) -> Self {
        EngineError::Initialization(err)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

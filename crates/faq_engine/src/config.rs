use serde::{Deserialize, Serialize};

use crate::error::BuildError;

pub const DEFAULT_DIMENSIONALITY: usize = 100;
pub const DEFAULT_WINDOW: usize = 5;
pub const DEFAULT_MIN_TERM_COUNT: usize = 1;
pub const DEFAULT_NEGATIVE: usize = 5;
pub const DEFAULT_EPOCHS: usize = 5;
pub const DEFAULT_LEARNING_RATE: f32 = 0.025;
pub const DEFAULT_MIN_LEARNING_RATE: f32 = 0.0001;
pub const DEFAULT_SEED: u64 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    /// Predict the centre word from the mean of its context.
    #[default]
    Cbow,
    /// Predict the centre word from each context word separately.
    SkipGram,
}

/// Training parameters for the semantic index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub dimensionality: usize,
    pub window: usize,
    /// Terms seen fewer times than this are left out of the model. The
    /// default of 1 keeps every term.
    pub min_term_count: usize,
    pub negative: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    pub min_learning_rate: f32,
    pub architecture: Architecture,
    pub seed: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimensionality: DEFAULT_DIMENSIONALITY,
            window: DEFAULT_WINDOW,
            min_term_count: DEFAULT_MIN_TERM_COUNT,
            negative: DEFAULT_NEGATIVE,
            epochs: DEFAULT_EPOCHS,
            learning_rate: DEFAULT_LEARNING_RATE,
            min_learning_rate: DEFAULT_MIN_LEARNING_RATE,
            architecture: Architecture::default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.dimensionality == 0 {
            return Err(BuildError::InvalidConfig(
                "dimensionality must be > 0".to_string(),
            ));
        }
        if self.window == 0 {
            return Err(BuildError::InvalidConfig("window must be > 0".to_string()));
        }
        if self.epochs == 0 {
            return Err(BuildError::InvalidConfig("epochs must be > 0".to_string()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(BuildError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.min_learning_rate.is_finite() && self.min_learning_rate >= 0.0) {
            return Err(BuildError::InvalidConfig(format!(
                "min_learning_rate must be non-negative, got {}",
                self.min_learning_rate
            )));
        }
        Ok(())
    }
}

//! Word2vec-style semantic index.
//!
//! A small word2vec model (CBOW or skip-gram, negative sampling) is trained
//! on the whitespace-split corpus questions. Each question is then
//! represented by the mean of its word vectors and queries are compared
//! against those means by cosine similarity.
//!
//! Training is single-threaded and driven by a seeded RNG, so the same corpus
//! and config always produce the same model.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::config::{Architecture, EmbeddingConfig};
use crate::error::BuildError;
use crate::index::SemanticIndex;
use crate::retrieval::score_rows;
use crate::tokenize::whitespace_tokens;

/// Exponent applied to term counts when drawing negative samples.
const NOISE_POWER: f64 = 0.75;
/// Logits are clamped to this magnitude before the sigmoid.
const MAX_EXP: f32 = 6.0;

/// Term → dense vector mapping. Vectors are stored as the columns of a
/// `dimensionality × vocabulary` matrix.
#[derive(Debug, Clone)]
pub struct EmbeddingModel {
    vocabulary: HashMap<String, usize>,
    vectors: DMatrix<f32>,
}

impl EmbeddingModel {
    /// Trains a model over pre-tokenized sentences.
    pub fn train(sentences: &[Vec<&str>], config: &EmbeddingConfig) -> Result<Self, BuildError> {
        config.validate()?;

        let (vocabulary, counts) = build_vocabulary(sentences, config.min_term_count);
        let mut rng = StdRng::seed_from_u64(config.seed);
        let dim = config.dimensionality;

        if vocabulary.is_empty() {
            return Ok(Self {
                vocabulary,
                vectors: DMatrix::zeros(dim, 0),
            });
        }

        let input = DMatrix::from_fn(dim, vocabulary.len(), |_, _| {
            (rng.gen::<f32>() - 0.5) / dim as f32
        });
        let noise = WeightedIndex::new(counts.iter().map(|&c| (c as f64).powf(NOISE_POWER)))
            .map_err(|e| BuildError::InvalidConfig(format!("noise distribution: {e}")))?;

        let encoded: Vec<Vec<usize>> = sentences
            .iter()
            .map(|s| s.iter().filter_map(|w| vocabulary.get(*w).copied()).collect())
            .collect();

        let mut trainer = Trainer {
            config,
            input,
            output: DMatrix::zeros(dim, vocabulary.len()),
            noise,
            rng,
        };
        trainer.run(&encoded);

        Ok(Self {
            vocabulary,
            vectors: trainer.input,
        })
    }

    pub fn dimensionality(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    pub fn vector(&self, term: &str) -> Option<Vec<f32>> {
        self.vocabulary
            .get(term)
            .map(|&col| self.vectors.column(col).iter().copied().collect())
    }

    /// Mean of the vectors of the known tokens; the zero vector when none
    /// are known.
    pub fn mean_vector(&self, tokens: &[&str]) -> DVector<f32> {
        let mut sum = DVector::zeros(self.dimensionality());
        let mut known = 0usize;
        for token in tokens {
            if let Some(&col) = self.vocabulary.get(*token) {
                sum += self.vectors.column(col);
                known += 1;
            }
        }
        if known > 0 {
            sum /= known as f32;
        }
        sum
    }
}

/// Counts terms and keeps those seen at least `min_count` times, most
/// frequent first. Ties keep first-seen order.
fn build_vocabulary(
    sentences: &[Vec<&str>],
    min_count: usize,
) -> (HashMap<String, usize>, Vec<usize>) {
    let mut seen: HashMap<&str, (usize, usize)> = HashMap::new();
    for word in sentences.iter().flatten() {
        let order = seen.len();
        seen.entry(*word).or_insert((0, order)).0 += 1;
    }

    let mut kept: Vec<(&str, usize, usize)> = seen
        .into_iter()
        .filter(|(_, (count, _))| *count >= min_count)
        .map(|(word, (count, order))| (word, count, order))
        .collect();
    kept.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let counts = kept.iter().map(|(_, count, _)| *count).collect();
    let vocabulary = kept
        .into_iter()
        .enumerate()
        .map(|(col, (word, _, _))| (word.to_string(), col))
        .collect();
    (vocabulary, counts)
}

/// Word positions visited over the whole run, never zero.
fn total_steps(words_per_epoch: usize, epochs: usize) -> usize {
    words_per_epoch.saturating_mul(epochs).max(1)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x.clamp(-MAX_EXP, MAX_EXP)).exp())
}

struct Trainer<'a> {
    config: &'a EmbeddingConfig,
    input: DMatrix<f32>,
    output: DMatrix<f32>,
    noise: WeightedIndex<f64>,
    rng: StdRng,
}

impl Trainer<'_> {
    fn run(&mut self, sentences: &[Vec<usize>]) {
        let words_per_epoch: usize = sentences.iter().map(Vec::len).sum();
        let total = total_steps(words_per_epoch, self.config.epochs) as f32;
        let (start_lr, min_lr) = (self.config.learning_rate, self.config.min_learning_rate);
        let mut processed = 0usize;

        for epoch in 0..self.config.epochs {
            for sentence in sentences {
                for pos in 0..sentence.len() {
                    let progress = processed as f32 / total;
                    let alpha = (start_lr - (start_lr - min_lr) * progress).max(min_lr);
                    processed += 1;

                    let span = self.config.window - self.rng.gen_range(0..self.config.window);
                    let lo = pos.saturating_sub(span);
                    let hi = (pos + span + 1).min(sentence.len());
                    let context: Vec<usize> = (lo..hi)
                        .filter(|&j| j != pos)
                        .map(|j| sentence[j])
                        .collect();
                    if context.is_empty() {
                        continue;
                    }

                    match self.config.architecture {
                        Architecture::Cbow => self.train_cbow(sentence[pos], &context, alpha),
                        Architecture::SkipGram => {
                            self.train_skip_gram(sentence[pos], &context, alpha)
                        }
                    }
                }
            }
            debug!(epoch, "finished embedding epoch");
        }
    }

    fn train_cbow(&mut self, center: usize, context: &[usize], alpha: f32) {
        let mut hidden = DVector::<f32>::zeros(self.input.nrows());
        for &c in context {
            hidden += self.input.column(c);
        }
        hidden /= context.len() as f32;

        let grad = self.update_output(&hidden, center, alpha);
        for &c in context {
            self.input.column_mut(c).axpy(1.0, &grad, 1.0);
        }
    }

    fn train_skip_gram(&mut self, center: usize, context: &[usize], alpha: f32) {
        for &c in context {
            let hidden = self.input.column(c).clone_owned();
            let grad = self.update_output(&hidden, center, alpha);
            self.input.column_mut(c).axpy(1.0, &grad, 1.0);
        }
    }

    /// One positive and `negative` noise updates of the output layer.
    /// Returns the gradient for the hidden layer.
    fn update_output(&mut self, hidden: &DVector<f32>, target: usize, alpha: f32) -> DVector<f32> {
        let mut samples = Vec::with_capacity(self.config.negative + 1);
        samples.push((target, 1.0f32));
        for _ in 0..self.config.negative {
            let word = self.noise.sample(&mut self.rng);
            if word != target {
                samples.push((word, 0.0));
            }
        }

        let mut grad = DVector::zeros(hidden.len());
        for (word, label) in samples {
            let f = sigmoid(hidden.dot(&self.output.column(word)));
            let g = (label - f) * alpha;
            grad.axpy(g, &self.output.column(word), 1.0);
            self.output.column_mut(word).axpy(g, hidden, 1.0);
        }
        grad
    }
}

/// Averaged-embedding index over the corpus questions.
#[derive(Debug, Clone)]
pub struct Word2VecIndex {
    model: EmbeddingModel,
    table: Vec<Vec<f32>>,
}

impl Word2VecIndex {
    #[instrument(skip_all, fields(questions = questions.len(), dim = config.dimensionality))]
    pub fn build<S>(questions: &[S], config: &EmbeddingConfig) -> Result<Self, BuildError>
    where
        S: AsRef<str> + Sync,
    {
        if questions.is_empty() {
            return Err(BuildError::EmptyCorpus);
        }
        config.validate()?;

        let sentences: Vec<Vec<&str>> = questions
            .iter()
            .map(|q| whitespace_tokens(q.as_ref()))
            .collect();
        let model = EmbeddingModel::train(&sentences, config)?;
        if model.vocabulary_len() == 0 {
            warn!(
                min_term_count = config.min_term_count,
                "embedding vocabulary is empty; every question embeds to zero"
            );
        }

        let table: Vec<Vec<f32>> = sentences
            .par_iter()
            .map(|tokens| model.mean_vector(tokens).iter().copied().collect())
            .collect();

        info!(
            questions = table.len(),
            vocabulary = model.vocabulary_len(),
            "built semantic index"
        );

        Ok(Self { model, table })
    }

    pub fn model(&self) -> &EmbeddingModel {
        &self.model
    }

    /// Stored embedding of corpus question `index`.
    pub fn question_embedding(&self, index: usize) -> Option<&[f32]> {
        self.table.get(index).map(Vec::as_slice)
    }
}

impl SemanticIndex for Word2VecIndex {
    fn len(&self) -> usize {
        self.table.len()
    }

    fn dimensionality(&self) -> usize {
        self.model.dimensionality()
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        self.model
            .mean_vector(&whitespace_tokens(text))
            .iter()
            .copied()
            .collect()
    }

    fn score(&self, query: &str) -> Vec<f32> {
        let q = self.embed(query);
        score_rows(&q, &self.table)
    }
}

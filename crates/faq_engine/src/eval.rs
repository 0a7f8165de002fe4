use crate::engine::RetrievalEngine;
use crate::index::{LexicalIndex, SemanticIndex};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

/// A labelled query: `question` should retrieve corpus entry `expected_index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalCase {
    pub case_id: String,
    pub question: String,
    pub expected_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalOutcome {
    pub case_id: String,
    pub lexical_index: Option<usize>,
    pub lexical_score: f32,
    pub lexical_passed: bool,
    pub semantic_index: Option<usize>,
    pub semantic_score: f32,
    pub semantic_passed: bool,
    pub latency_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodSummary {
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f32,
}

impl MethodSummary {
    fn from_flags(flags: impl Iterator<Item = bool>) -> Self {
        let (mut passed, mut total) = (0usize, 0usize);
        for flag in flags {
            total += 1;
            if flag {
                passed += 1;
            }
        }
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f32 / total as f32
        };
        Self {
            passed,
            failed: total - passed,
            pass_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    pub evaluated_at: DateTime<Utc>,
    pub total: usize,
    pub lexical: MethodSummary,
    pub semantic: MethodSummary,
    pub outcomes: Vec<EvalOutcome>,
}

/// Which method's pass rate a run is gated on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    #[default]
    Lexical,
    Semantic,
    /// Both methods must reach the required rate.
    Both,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gate::Lexical => "lexical",
            Gate::Semantic => "semantic",
            Gate::Both => "both",
        })
    }
}

impl FromStr for Gate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lexical" => Ok(Gate::Lexical),
            "semantic" => Ok(Gate::Semantic),
            "both" => Ok(Gate::Both),
            other => Err(format!(
                "unknown gate '{other}' (expected lexical, semantic or both)"
            )),
        }
    }
}

impl EvalSummary {
    /// Lowest pass rate among the methods `gate` selects.
    pub fn gated_pass_rate(&self, gate: Gate) -> f32 {
        match gate {
            Gate::Lexical => self.lexical.pass_rate,
            Gate::Semantic => self.semantic.pass_rate,
            Gate::Both => self.lexical.pass_rate.min(self.semantic.pass_rate),
        }
    }

    pub fn meets(&self, required_pass_rate: f32, gate: Gate) -> bool {
        self.gated_pass_rate(gate) >= required_pass_rate
    }
}

pub fn read_eval_cases(path: &Path) -> anyhow::Result<Vec<EvalCase>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let cases: Vec<EvalCase> =
        serde_json::from_reader(BufReader::new(file)).context("parse eval cases json")?;
    Ok(cases)
}

/// Runs every case through the engine. A case whose question is blank fails
/// on both methods rather than aborting the run.
pub fn evaluate_cases<L, S>(engine: &RetrievalEngine<L, S>, cases: &[EvalCase]) -> EvalSummary
where
    L: LexicalIndex,
    S: SemanticIndex,
{
    let mut outcomes = Vec::with_capacity(cases.len());

    for case in cases {
        let start = Instant::now();
        let result = engine.answer(&case.question).ok();
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let (lexical_index, lexical_score) = result
            .as_ref()
            .map(|r| (Some(r.lexical.matched_index), r.lexical.score))
            .unwrap_or((None, 0.0));
        let (semantic_index, semantic_score) = result
            .as_ref()
            .map(|r| (Some(r.semantic.matched_index), r.semantic.score))
            .unwrap_or((None, 0.0));

        outcomes.push(EvalOutcome {
            case_id: case.case_id.clone(),
            lexical_index,
            lexical_score,
            lexical_passed: lexical_index == Some(case.expected_index),
            semantic_index,
            semantic_score,
            semantic_passed: semantic_index == Some(case.expected_index),
            latency_ms,
        });
    }

    EvalSummary {
        evaluated_at: Utc::now(),
        total: outcomes.len(),
        lexical: MethodSummary::from_flags(outcomes.iter().map(|o| o.lexical_passed)),
        semantic: MethodSummary::from_flags(outcomes.iter().map(|o| o.semantic_passed)),
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingConfig;
    use crate::model::Corpus;

    fn engine() -> RetrievalEngine {
        let corpus = Corpus::from(vec![
            ("How do I reset my password?", "Use the reset link."),
            ("What are your business hours?", "9am to 6pm."),
            ("How do I track my order?", "Use the tracking page."),
        ]);
        let config = EmbeddingConfig {
            dimensionality: 16,
            ..Default::default()
        };
        RetrievalEngine::initialize(corpus, &config).expect("init")
    }

    fn case(id: &str, question: &str, expected_index: usize) -> EvalCase {
        EvalCase {
            case_id: id.to_string(),
            question: question.to_string(),
            expected_index,
        }
    }

    #[test]
    fn summarises_lexical_passes() {
        let cases = vec![
            case("c1", "reset password", 0),
            case("c2", "business hours", 1),
            case("c3", "track order", 0),
        ];
        let summary = evaluate_cases(&engine(), &cases);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.lexical.passed, 2);
        assert_eq!(summary.lexical.failed, 1);
        assert!((summary.lexical.pass_rate - 2.0 / 3.0).abs() < 1e-6);
        assert!(!summary.outcomes[2].lexical_passed);
        assert!(summary.meets(0.6, Gate::Lexical));
        assert!(!summary.meets(0.7, Gate::Lexical));
        assert_eq!(
            summary.semantic.passed + summary.semantic.failed,
            summary.total
        );
    }

    fn summary_with_rates(lexical: f32, semantic: f32) -> EvalSummary {
        let method = |pass_rate| MethodSummary {
            passed: 0,
            failed: 0,
            pass_rate,
        };
        EvalSummary {
            evaluated_at: Utc::now(),
            total: 0,
            lexical: method(lexical),
            semantic: method(semantic),
            outcomes: Vec::new(),
        }
    }

    #[test]
    fn gate_selects_which_rate_is_enforced() {
        let summary = summary_with_rates(0.9, 0.4);

        assert!(summary.meets(0.8, Gate::Lexical));
        assert!(!summary.meets(0.8, Gate::Semantic));
        assert!(!summary.meets(0.8, Gate::Both));
        assert!(summary.meets(0.4, Gate::Both));
        assert_eq!(summary.gated_pass_rate(Gate::Both), 0.4);
    }

    #[test]
    fn gate_parses_and_prints() {
        for gate in [Gate::Lexical, Gate::Semantic, Gate::Both] {
            assert_eq!(gate.to_string().parse::<Gate>(), Ok(gate));
        }
        assert_eq!("SEMANTIC".parse::<Gate>(), Ok(Gate::Semantic));
        assert!("tfidf".parse::<Gate>().is_err());
    }

    #[test]
    fn blank_question_fails_both_methods() {
        let summary = evaluate_cases(&engine(), &[case("blank", "  ", 0)]);
        let outcome = &summary.outcomes[0];

        assert_eq!(outcome.lexical_index, None);
        assert!(!outcome.lexical_passed);
        assert!(!outcome.semantic_passed);
        assert_eq!(summary.lexical.pass_rate, 0.0);
    }

    #[test]
    fn empty_case_list_has_zero_rate() {
        let summary = evaluate_cases(&engine(), &[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.lexical.pass_rate, 0.0);
    }
}

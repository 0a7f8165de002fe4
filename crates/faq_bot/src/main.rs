mod router;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use faq_engine::{
    evaluate_cases, load_corpus, read_eval_cases, Architecture, EmbeddingConfig, Gate,
    RetrievalEngine, DEFAULT_DIMENSIONALITY, DEFAULT_EPOCHS, DEFAULT_MIN_TERM_COUNT,
    DEFAULT_NEGATIVE, DEFAULT_SEED, DEFAULT_WINDOW,
};
use router::{format_dual_match, Inbound, MessageRouter, RouterTexts};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_MIN_PASS_RATE: f32 = 0.8;

#[derive(Debug, Parser)]
#[command(name = "faq")]
#[command(about = "Answer questions from an FAQ corpus with TF-IDF and word2vec matching")]
struct Cli {
    /// Length of the word vectors.
    #[arg(long, global = true, default_value_t = DEFAULT_DIMENSIONALITY)]
    dimensionality: usize,

    /// Maximum distance between a word and its context words during training.
    #[arg(long, global = true, default_value_t = DEFAULT_WINDOW)]
    window: usize,

    /// Words seen fewer times than this are left out of the embedding model.
    #[arg(long, global = true, default_value_t = DEFAULT_MIN_TERM_COUNT)]
    min_term_count: usize,

    #[arg(long, global = true, default_value_t = DEFAULT_EPOCHS)]
    epochs: usize,

    /// Negative samples per training pair.
    #[arg(long, global = true, default_value_t = DEFAULT_NEGATIVE)]
    negative: usize,

    #[arg(long, global = true, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Train skip-gram instead of CBOW.
    #[arg(long, global = true)]
    skip_gram: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Query {
        #[arg(long)]
        corpus: PathBuf,
        #[arg(long)]
        question: String,
        #[arg(long)]
        json: bool,
    },
    Chat {
        #[arg(long)]
        corpus: PathBuf,
    },
    Eval {
        #[arg(long)]
        corpus: PathBuf,
        #[arg(long)]
        cases: PathBuf,
        #[arg(long, default_value_t = DEFAULT_MIN_PASS_RATE)]
        min_pass_rate: f32,
        /// Method whose pass rate must reach --min-pass-rate: lexical, semantic or both.
        #[arg(long, default_value_t = Gate::Lexical)]
        gate: Gate,
    },
}

impl Cli {
    fn embedding_config(&self) -> EmbeddingConfig {
        EmbeddingConfig {
            dimensionality: self.dimensionality,
            window: self.window,
            min_term_count: self.min_term_count,
            epochs: self.epochs,
            negative: self.negative,
            seed: self.seed,
            architecture: if self.skip_gram {
                Architecture::SkipGram
            } else {
                Architecture::Cbow
            },
            ..Default::default()
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_engine(cli: &Cli, corpus: &Path) -> Result<RetrievalEngine> {
    let corpus = load_corpus(corpus)?;
    info!(entries = corpus.len(), "loaded corpus");
    RetrievalEngine::initialize(corpus, &cli.embedding_config())
        .context("initialize retrieval engine")
}

/// `/photo <path>` uploads a local file, any other `/name` is a command.
fn inbound_from_line(line: &str) -> Result<Inbound> {
    let Some(command) = line.trim().strip_prefix('/') else {
        return Ok(Inbound::Text(line.to_string()));
    };

    match command.split_once(char::is_whitespace) {
        Some(("photo", path)) => {
            let path = Path::new(path.trim());
            let meta =
                std::fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(Inbound::Photo {
                file_name,
                file_size: meta.len(),
            })
        }
        _ => Ok(Inbound::Command(command.trim().to_string())),
    }
}

fn chat(engine: &RetrievalEngine) -> Result<()> {
    let router = MessageRouter::new(engine);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("read stdin")?;
        let message = match inbound_from_line(&line) {
            Ok(message) => message,
            Err(err) => {
                eprintln!("error: {err:#}");
                continue;
            }
        };

        let reply = router.route(&message);
        writeln!(stdout, "{}", reply.text).context("write reply")?;
        if let Some(buttons) = reply.keyboard {
            writeln!(stdout, "[ {} ]", buttons.join(" | ")).context("write keyboard")?;
        }
        writeln!(stdout).context("write reply")?;
    }

    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match &cli.command {
        Commands::Query {
            corpus,
            question,
            json,
        } => {
            let engine = load_engine(&cli, corpus)?;
            let result = engine.answer(question)?;

            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).context("serialize result")?
                );
            } else {
                println!("{}", format_dual_match(&result, &RouterTexts::default()));
                println!(
                    "lexical_index={} lexical_score={:.4} semantic_index={} semantic_score={:.4}",
                    result.lexical.matched_index,
                    result.lexical.score,
                    result.semantic.matched_index,
                    result.semantic.score
                );
            }
        }
        Commands::Chat { corpus } => {
            let engine = load_engine(&cli, corpus)?;
            chat(&engine)?;
        }
        Commands::Eval {
            corpus,
            cases,
            min_pass_rate,
            gate,
        } => {
            let run_id = format!("eval-{}", chrono::Utc::now().timestamp_millis());
            let engine = load_engine(&cli, corpus)?;
            let cases = read_eval_cases(cases)?;
            let summary = evaluate_cases(&engine, &cases);

            println!(
                "run_id={} total={} lexical_passed={} lexical_pass_rate={:.4} semantic_passed={} semantic_pass_rate={:.4} gate={} required={:.4} meets_threshold={}",
                run_id,
                summary.total,
                summary.lexical.passed,
                summary.lexical.pass_rate,
                summary.semantic.passed,
                summary.semantic.pass_rate,
                gate,
                min_pass_rate,
                summary.meets(*min_pass_rate, *gate)
            );

            for o in &summary.outcomes {
                println!(
                    "case={} lexical={} ({:.4}) semantic={} ({:.4}) lexical_passed={} semantic_passed={} latency={:.1}ms",
                    o.case_id,
                    o.lexical_index.map_or("null".to_string(), |i| i.to_string()),
                    o.lexical_score,
                    o.semantic_index.map_or("null".to_string(), |i| i.to_string()),
                    o.semantic_score,
                    o.lexical_passed,
                    o.semantic_passed,
                    o.latency_ms
                );
            }

            if !summary.meets(*min_pass_rate, *gate) {
                anyhow::bail!(
                    "{} pass rate {:.4} is below required {:.4}",
                    gate,
                    summary.gated_pass_rate(*gate),
                    min_pass_rate
                );
            }
        }
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_with_global_flags() {
        let args = [
            "faq",
            "query",
            "--corpus",
            "faq.json",
            "--question",
            "hours?",
            "--dimensionality",
            "32",
            "--skip-gram",
        ];
        let cli = Cli::try_parse_from(args).expect("parse");
        let config = cli.embedding_config();

        assert_eq!(config.dimensionality, 32);
        assert_eq!(config.window, DEFAULT_WINDOW);
        assert_eq!(config.architecture, Architecture::SkipGram);
        assert!(matches!(cli.command, Commands::Query { json: false, .. }));
    }

    #[test]
    fn eval_defaults_min_pass_rate() {
        let args = ["faq", "eval", "--corpus", "a.json", "--cases", "b.json"];
        let cli = Cli::try_parse_from(args).expect("parse");
        match cli.command {
            Commands::Eval {
                min_pass_rate,
                gate,
                ..
            } => {
                assert_eq!(min_pass_rate, DEFAULT_MIN_PASS_RATE);
                assert_eq!(gate, Gate::Lexical);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn eval_accepts_gate_selector() {
        let args = [
            "faq", "eval", "--corpus", "a.json", "--cases", "b.json", "--gate", "both",
        ];
        let cli = Cli::try_parse_from(args).expect("parse");
        assert!(matches!(cli.command, Commands::Eval { gate: Gate::Both, .. }));

        let bad = ["faq", "eval", "--corpus", "a.json", "--cases", "b.json", "--gate", "x"];
        assert!(Cli::try_parse_from(bad).is_err());
    }

    #[test]
    fn lines_map_to_inbound_messages() {
        assert_eq!(
            inbound_from_line("/start").expect("line"),
            Inbound::Command("start".into())
        );
        assert_eq!(
            inbound_from_line("what are your hours?").expect("line"),
            Inbound::Text("what are your hours?".into())
        );
    }

    #[test]
    fn photo_line_reads_local_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("receipt.png");
        std::fs::write(&path, [0u8; 10]).expect("write");

        let message = inbound_from_line(&format!("/photo {}", path.display())).expect("line");
        assert_eq!(
            message,
            Inbound::Photo {
                file_name: "receipt.png".into(),
                file_size: 10,
            }
        );
        assert!(inbound_from_line("/photo /definitely/not/here.png").is_err());
    }
}

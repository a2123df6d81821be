//! nertrain command-line tool
//!
//! Trains a named-entity pipeline from a phrase-annotated JSON file, saves
//! it, and runs predictions with it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nertrain_core::converter::{Converter, ConverterConfig, MatchMode};
use nertrain_core::optimizer::DEFAULT_LEARN_RATE;
use nertrain_core::pipeline::Pipeline;
use nertrain_trainer::data::{convert_records, load_records, RecordError};
use nertrain_trainer::{Trainer, TrainerConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default directory for saved models
fn default_model_dir(name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nertrain")
        .join("models")
        .join(name)
}

/// CLI arguments
#[derive(Parser)]
#[command(name = "nertrain")]
#[command(about = "Train and run named-entity recognition models")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model on a phrase-annotated JSON file
    Train(TrainArgs),
    /// Print the entities a saved model predicts
    Predict {
        /// Directory of a saved model
        #[arg(short, long, env = "NERTRAIN_MODEL")]
        model: PathBuf,

        /// Texts to analyse
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print the training examples a data file converts to, one JSON object per line
    Convert {
        /// Training data file
        #[arg(short, long, env = "NERTRAIN_DATA")]
        data: PathBuf,

        /// Treat phrases as regular expressions
        #[arg(long)]
        pattern: bool,
    },
}

#[derive(Args)]
struct TrainArgs {
    /// Entity labels to register (repeatable or comma separated)
    #[arg(
        short,
        long = "label",
        required = true,
        env = "NERTRAIN_LABELS",
        value_delimiter = ','
    )]
    labels: Vec<String>,

    /// Training data file
    #[arg(short, long, env = "NERTRAIN_DATA")]
    data: PathBuf,

    /// Number of passes over the training data
    #[arg(short = 'n', long, env = "NERTRAIN_ITERATIONS", default_value_t = 10)]
    iterations: usize,

    /// Feature dropout rate
    #[arg(long, env = "NERTRAIN_DROP", default_value_t = 0.35)]
    drop: f32,

    /// Perceptron learning rate
    #[arg(long, env = "NERTRAIN_LEARN_RATE", default_value_t = DEFAULT_LEARN_RATE)]
    learn_rate: f32,

    /// Seed for shuffling and dropout
    #[arg(long, env = "NERTRAIN_SEED", default_value_t = 0)]
    seed: u64,

    /// Continue training a saved model instead of starting blank
    #[arg(short, long, env = "NERTRAIN_BASE_MODEL")]
    base_model: Option<PathBuf>,

    /// Language code for a blank model
    #[arg(long, default_value = "en")]
    lang: String,

    /// Save the trained model
    #[arg(short, long)]
    save: bool,

    /// Output directory (implies --save)
    #[arg(short, long, env = "NERTRAIN_OUTPUT")]
    output: Option<PathBuf>,

    /// Model name recorded in the saved metadata
    #[arg(long, default_value = "model")]
    name: String,

    /// Treat phrases as regular expressions
    #[arg(long)]
    pattern: bool,

    /// Text to run through the trained model (repeatable)
    #[arg(short, long)]
    query: Vec<String>,
}

fn match_mode(pattern: bool) -> MatchMode {
    if pattern {
        MatchMode::Pattern
    } else {
        MatchMode::Literal
    }
}

fn report_rejected(rejected: &[RecordError]) {
    for record in rejected {
        eprintln!("skipped record {}: {}", record.index, record.error);
    }
}

fn train(args: TrainArgs) -> Result<()> {
    let converter =
        Converter::new(ConverterConfig::for_training().with_match_mode(match_mode(args.pattern)));
    let config = TrainerConfig::new()
        .with_iterations(args.iterations)
        .with_drop(args.drop)
        .with_learn_rate(args.learn_rate)
        .with_seed(args.seed);

    let pipeline = match &args.base_model {
        Some(dir) => Pipeline::load(dir)
            .with_context(|| format!("failed to load base model from {}", dir.display()))?,
        None => Pipeline::blank(&args.lang),
    };

    let mut trainer = Trainer::new(pipeline, &args.labels, config).with_converter(converter);
    let summary = trainer.load_training_json(&args.data)?;
    report_rejected(&summary.rejected);
    info!(examples = summary.loaded, "training data ready");

    for report in trainer.train()? {
        println!("{report}");
    }

    if args.save || args.output.is_some() {
        let dir = args.output.unwrap_or_else(|| default_model_dir(&args.name));
        trainer.save_model(&dir, &args.name)?;
    }

    for query in &args.query {
        println!("{:?}", trainer.predict_entities(query)?);
    }

    Ok(())
}

fn predict(model: &Path, texts: &[String]) -> Result<()> {
    let nlp = Pipeline::load(model)
        .with_context(|| format!("failed to load model from {}", model.display()))?;
    for text in texts {
        println!("{:?}", nlp.predict_entities(text));
    }
    Ok(())
}

fn convert(data: &Path, pattern: bool) -> Result<()> {
    let records = load_records(data)
        .with_context(|| format!("failed to load training data from {}", data.display()))?;
    let converter = Converter::new(ConverterConfig::new().with_match_mode(match_mode(pattern)));
    let report = convert_records(&records, &converter);

    for example in &report.examples {
        println!("{}", serde_json::to_string(example)?);
    }
    report_rejected(&report.rejected);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Train(args) => train(args),
        Commands::Predict { model, text } => predict(&model, &text),
        Commands::Convert { data, pattern } => convert(&data, pattern),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_model_dir() {
        let dir = default_model_dir("play");
        assert!(dir.ends_with("nertrain/models/play"));
    }

    #[test]
    fn test_parse_train_args() {
        let cli = Cli::try_parse_from([
            "nertrain", "train", "--label", "ANIMAL,PLACE", "--data", "train.json", "-n", "3",
            "--drop", "0.2", "--query", "Do you like horses?",
        ])
        .unwrap();

        let Commands::Train(args) = cli.command else {
            panic!("expected train command");
        };
        assert_eq!(args.labels, vec!["ANIMAL".to_string(), "PLACE".to_string()]);
        assert_eq!(args.iterations, 3);
        assert_eq!(args.drop, 0.2);
        assert_eq!(args.learn_rate, DEFAULT_LEARN_RATE);
        assert_eq!(args.name, "model");
        assert!(!args.save);
        assert_eq!(args.query, vec!["Do you like horses?".to_string()]);
    }

    #[test]
    fn test_parse_learn_rate() {
        let cli = Cli::try_parse_from([
            "nertrain", "train", "-l", "ANIMAL", "-d", "train.json", "--learn-rate", "0.5",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else {
            panic!("expected train command");
        };
        assert_eq!(args.learn_rate, 0.5);
    }

    #[test]
    fn test_train_requires_label() {
        assert!(Cli::try_parse_from(["nertrain", "train", "--data", "train.json"]).is_err());
    }
}

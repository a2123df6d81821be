//! Training loop for a [`TrainablePipeline`].

use std::fmt;
use std::path::Path;

use anyhow::{bail, Context};
use nertrain_core::converter::{Converter, ConverterConfig};
use nertrain_core::optimizer::{Optimizer, DEFAULT_LEARN_RATE};
use nertrain_core::pipeline::{Losses, TrainablePipeline};
use nertrain_core::types::TrainingExample;
use oorandom::Rand64;
use tracing::{debug, info, warn};

use crate::data::{load_training_json, RecordError};

/// Upper bound for the dropout rate; a rate of 1.0 would drop every feature.
pub const MAX_DROP: f32 = 0.95;

/// Configuration for a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Number of passes over the training data
    pub iterations: usize,
    /// Feature dropout rate applied during updates
    pub drop: f32,
    /// Learning rate handed to the optimizer
    pub learn_rate: f32,
    /// Seed for shuffling and dropout
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            drop: 0.35,
            learn_rate: DEFAULT_LEARN_RATE,
            seed: 0,
        }
    }
}

impl TrainerConfig {
    /// Create a new trainer configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the dropout rate, clamped to `[0.0, MAX_DROP]`.
    pub fn with_drop(mut self, drop: f32) -> Self {
        self.drop = drop.clamp(0.0, MAX_DROP);
        self
    }

    pub fn with_learn_rate(mut self, learn_rate: f32) -> Self {
        self.learn_rate = learn_rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Losses reported after one pass over the training data.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    /// 1-based epoch number
    pub epoch: usize,
    pub losses: Losses,
    /// Number of examples seen in this epoch
    pub examples: usize,
}

impl fmt::Display for EpochReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Epoch {} ({} examples) - losses: {{", self.epoch, self.examples)?;
        for (i, (name, loss)) in self.losses.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {loss:.3}")?;
        }
        write!(f, "}}")
    }
}

/// Outcome of loading a training file.
#[derive(Debug)]
pub struct LoadSummary {
    pub loaded: usize,
    pub rejected: Vec<RecordError>,
}

/// A training session: the pipeline, its optimizer and the training data.
pub struct Trainer<P: TrainablePipeline> {
    pipeline: P,
    optimizer: Optimizer,
    config: TrainerConfig,
    converter: Converter,
    training_data: Vec<TrainingExample>,
    rng: Rand64,
}

impl<P: TrainablePipeline> Trainer<P> {
    /// Register `labels` on `pipeline` and prepare an optimizer.
    ///
    /// Blank pipelines start from fresh weights; loaded pipelines continue
    /// from their saved weights.
    pub fn new<L: AsRef<str>>(mut pipeline: P, labels: &[L], config: TrainerConfig) -> Self {
        for label in labels {
            let label = label.as_ref();
            if pipeline.add_label(label) {
                debug!(label, "added label");
            }
        }

        let optimizer = if pipeline.is_blank() {
            pipeline.begin_training(config.learn_rate, config.seed)
        } else {
            pipeline.create_optimizer(config.learn_rate, config.seed)
        };

        Self {
            pipeline,
            optimizer,
            rng: Rand64::new(u128::from(config.seed)),
            config,
            converter: Converter::new(ConverterConfig::for_training()),
            training_data: Vec::new(),
        }
    }

    /// Replace the converter used by [`load_training_json`](Self::load_training_json).
    pub fn with_converter(mut self, converter: Converter) -> Self {
        self.converter = converter;
        self
    }

    /// Load and convert a training file, replacing the current training data.
    pub fn load_training_json<Q: AsRef<Path>>(&mut self, path: Q) -> anyhow::Result<LoadSummary> {
        let path = path.as_ref();
        let report = load_training_json(path, &self.converter)
            .with_context(|| format!("failed to load training data from {}", path.display()))?;

        info!(
            loaded = report.examples.len(),
            rejected = report.rejected.len(),
            mode = ?self.converter.config().match_mode,
            "loaded training data from {}",
            path.display()
        );
        if !report.rejected.is_empty() {
            warn!(count = report.rejected.len(), "some training records were rejected");
        }

        self.training_data = report.examples;
        Ok(LoadSummary {
            loaded: self.training_data.len(),
            rejected: report.rejected,
        })
    }

    /// Use already converted examples as training data.
    pub fn set_training_data(&mut self, examples: Vec<TrainingExample>) {
        self.training_data = examples;
    }

    pub fn training_data(&self) -> &[TrainingExample] {
        &self.training_data
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn optimizer(&self) -> &Optimizer {
        &self.optimizer
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn into_pipeline(self) -> P {
        self.pipeline
    }

    /// Run `config.iterations` epochs, shuffling before each one.
    pub fn train(&mut self) -> anyhow::Result<Vec<EpochReport>> {
        if self.training_data.is_empty() {
            bail!("no training data loaded");
        }

        let epochs = self.config.iterations;
        info!(
            epochs,
            examples = self.training_data.len(),
            drop = self.config.drop,
            "starting training"
        );

        let mut reports = Vec::with_capacity(epochs);
        for epoch in 1..=epochs {
            shuffle(&mut self.training_data, &mut self.rng);

            let mut losses = Losses::new();
            for example in &self.training_data {
                self.pipeline
                    .update(example, &mut self.optimizer, self.config.drop, &mut losses)
                    .with_context(|| format!("update failed on {:?}", example.text))?;
            }

            let report = EpochReport {
                epoch,
                losses,
                examples: self.training_data.len(),
            };
            info!(epoch, epochs, "{report}");
            reports.push(report);
        }

        self.pipeline.finish_training(&self.optimizer);
        Ok(reports)
    }

    /// Name the model and write it to `output_dir`.
    pub fn save_model<Q: AsRef<Path>>(
        &mut self,
        output_dir: Q,
        model_name: &str,
    ) -> anyhow::Result<()> {
        let output_dir = output_dir.as_ref();
        self.pipeline.set_name(model_name);
        self.pipeline
            .to_disk(output_dir)
            .with_context(|| format!("failed to save model to {}", output_dir.display()))?;
        info!("Saved model: {}, to directory: {}", model_name, output_dir.display());
        Ok(())
    }

    /// Predicted `(label, text)` pairs for `text`.
    pub fn predict_entities(&self, text: &str) -> anyhow::Result<Vec<(String, String)>> {
        let entities = self.pipeline.predict(text)?;
        Ok(entities.iter().map(|e| e.to_pair()).collect())
    }
}

/// Fisher-Yates shuffle driven by `rng`.
fn shuffle<T>(items: &mut [T], rng: &mut Rand64) {
    for i in (1..items.len()).rev() {
        let j = rng.rand_range(0..(i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}

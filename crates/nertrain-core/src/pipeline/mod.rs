//! # Trainable Pipeline
//!
//! The [`TrainablePipeline`] trait is the seam between training
//! orchestration and the model backend. [`Pipeline`] is the bundled
//! implementation backed by [`PerceptronNer`](crate::tagger::PerceptronNer).

pub mod meta;
pub mod nlp;

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::optimizer::Optimizer;
use crate::types::{Entity, TrainingExample};

pub use meta::{ModelMeta, NER_COMPONENT};
pub use nlp::Pipeline;

/// Accumulated loss per pipeline component.
pub type Losses = BTreeMap<String, f32>;

/// A named-entity pipeline that can be trained, saved and applied.
pub trait TrainablePipeline {
    /// Register an entity label. Returns `false` if it was already known.
    fn add_label(&mut self, label: &str) -> bool;

    /// Labels known to the recognizer, in registration order.
    fn labels(&self) -> Vec<String>;

    /// Whether the pipeline was created blank rather than loaded from disk.
    fn is_blank(&self) -> bool;

    /// Reset the weights and return a fresh optimizer.
    fn begin_training(&mut self, learn_rate: f32, seed: u64) -> Optimizer;

    /// Return an optimizer that continues training the current weights.
    fn create_optimizer(&self, learn_rate: f32, seed: u64) -> Optimizer;

    /// Apply one update for `example`, adding the loss to `losses`.
    fn update(
        &mut self,
        example: &TrainingExample,
        optimizer: &mut Optimizer,
        drop: f32,
        losses: &mut Losses,
    ) -> Result<()>;

    /// Called once after the last update.
    fn finish_training(&mut self, optimizer: &Optimizer);

    /// Set the model name written by [`to_disk`](Self::to_disk).
    fn set_name(&mut self, name: &str);

    /// Persist the pipeline to `dir`, creating it if needed.
    fn to_disk(&self, dir: &Path) -> Result<()>;

    /// Predict entities in `text`.
    fn predict(&self, text: &str) -> Result<Vec<Entity>>;
}

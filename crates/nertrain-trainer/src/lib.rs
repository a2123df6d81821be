//! # nertrain Trainer
//!
//! Training-data loading and the training session that drives a
//! [`TrainablePipeline`](nertrain_core::pipeline::TrainablePipeline)
//! through shuffled epochs.

pub mod data;
pub mod trainer;

pub use data::{
    convert_records, load_records, load_training_json, parse_records, LoadReport, RecordError,
};
pub use trainer::{EpochReport, LoadSummary, Trainer, TrainerConfig, MAX_DROP};

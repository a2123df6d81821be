//! # nertrain
//!
//! Convert phrase-annotated sentences into entity spans, train a
//! named-entity pipeline on them, save it, and predict with it.
//!
//! ```rust
//! use nertrain::{Pipeline, Trainer, TrainerConfig, TrainingExample, EntitySpan};
//!
//! let example = TrainingExample::new(
//!     "Do you like horses?",
//!     vec![EntitySpan::new(12, 18, "ANIMAL")],
//! ).unwrap();
//!
//! let config = TrainerConfig::new().with_iterations(5).with_drop(0.0);
//! let mut trainer = Trainer::new(Pipeline::blank("en"), &["ANIMAL"], config);
//! trainer.set_training_data(vec![example]);
//! let reports = trainer.train().unwrap();
//! assert_eq!(reports.len(), 5);
//! ```

pub use nertrain_core::*;
pub use nertrain_trainer::{
    convert_records, load_records, load_training_json, parse_records, EpochReport, LoadReport,
    LoadSummary, RecordError, Trainer, TrainerConfig,
};

/// Training-data loading and the training loop.
pub use nertrain_trainer as trainer;

//! # nertrain Core
//!
//! Annotation conversion and a trainable named-entity pipeline. Turns
//! phrase-level annotations into character-offset entity spans, and trains
//! an averaged-perceptron BIO tagger on them.
//!
//! ## Quick Start
//!
//! ```rust
//! use nertrain_core::converter::convert;
//!
//! let spans = convert(
//!     "Do you like horses and dogs?",
//!     &["horses", "dogs"],
//!     &["ANIMAL", "ANIMAL"],
//! )
//! .unwrap();
//!
//! assert_eq!(spans[0].as_triple(), (12, 18, "ANIMAL"));
//! assert_eq!(spans[1].as_triple(), (23, 27, "ANIMAL"));
//! ```
pub mod converter;
pub mod error;
pub mod offsets;
pub mod optimizer;
pub mod pipeline;
pub mod tagger;
pub mod types;

// Re-export primary API
pub use converter::{Converter, ConverterConfig, MatchMode, OverlapPolicy, UnmatchedPolicy};
pub use error::{NerError, Result};
pub use optimizer::Optimizer;
pub use pipeline::{Losses, ModelMeta, Pipeline, TrainablePipeline};
pub use tagger::{BioTag, LabelSet, PerceptronNer, Tokenizer};
pub use types::{AnnotationRecord, Entity, EntitySpan, TrainingExample};

pub mod annotation;
pub mod entity;

pub use annotation::{AnnotationRecord, EntitySpan, TrainingExample};
pub use entity::Entity;

pub mod align;
pub mod bio_tags;
pub mod features;
pub mod perceptron;
pub mod tokenizer;
pub mod viterbi;

pub use align::spans_to_tags;
pub use bio_tags::{extract_spans, BioTag, LabelSet, TaggedSpan};
pub use perceptron::PerceptronNer;
pub use tokenizer::{Token, Tokenizer};
pub use viterbi::ViterbiDecoder;

//! # Averaged Perceptron Entity Recognizer
//!
//! Feature-based structured perceptron over BIO tags with Viterbi
//! decoding. Weights live in one sparse table keyed by feature name; tag
//! transitions are stored in the same table under `T:<tag index>` keys so
//! they grow and average like every other weight.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{NerError, Result};
use crate::offsets::byte_to_char;
use crate::optimizer::Optimizer;
use crate::tagger::align::spans_to_tags;
use crate::tagger::bio_tags::{extract_spans, BioTag, LabelSet};
use crate::tagger::features::sentence_features;
use crate::tagger::tokenizer::{Token, Tokenizer};
use crate::tagger::viterbi::ViterbiDecoder;
use crate::types::{Entity, TrainingExample};

/// Running sums for weight averaging. Never persisted.
///
/// `updates` counts the updates since the last [`PerceptronNer::finish_training`];
/// stamps are relative to it.
#[derive(Debug, Clone, Default)]
struct Averages {
    updates: u64,
    totals: HashMap<String, Vec<f32>>,
    stamps: HashMap<String, Vec<u64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerceptronNer {
    labels: LabelSet,
    weights: HashMap<String, Vec<f32>>,
    #[serde(skip)]
    averages: Averages,
    #[serde(skip)]
    tokenizer: Tokenizer,
}

fn transition_key(prev: BioTag) -> String {
    format!("T:{}", prev.index())
}

impl PerceptronNer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Register a label, growing every weight vector by its two tags.
    /// Returns `false` if the label was already known.
    pub fn add_label(&mut self, label: &str) -> bool {
        if !self.labels.add(label) {
            return false;
        }
        let num_tags = self.labels.num_tags();
        for values in self.weights.values_mut() {
            values.resize(num_tags, 0.0);
        }
        for totals in self.averages.totals.values_mut() {
            totals.resize(num_tags, 0.0);
        }
        for stamps in self.averages.stamps.values_mut() {
            stamps.resize(num_tags, 0);
        }
        true
    }

    /// Check that every weight row holds one value per tag.
    ///
    /// # Errors
    ///
    /// Returns [`NerError::ModelLoad`] naming the first row of the wrong length.
    pub fn check_shape(&self) -> Result<()> {
        let num_tags = self.labels.num_tags();
        match self.weights.iter().find(|(_, row)| row.len() != num_tags) {
            Some((key, row)) => Err(NerError::ModelLoad(format!(
                "weight row {key:?} has {} values, expected {num_tags}",
                row.len()
            ))),
            None => Ok(()),
        }
    }

    /// Number of weight rows (features plus transition rows).
    pub fn num_features(&self) -> usize {
        self.weights.len()
    }

    /// One perceptron update on a single example.
    ///
    /// Each feature is dropped with probability `drop` before decoding.
    /// Returns the number of mis-tagged tokens.
    pub fn update(
        &mut self,
        example: &TrainingExample,
        optimizer: &mut Optimizer,
        drop: f32,
    ) -> Result<f32> {
        let tokens = self.tokenizer.tokenize(&example.text);
        if tokens.is_empty() {
            return Ok(0.0);
        }

        let gold = spans_to_tags(&example.text, &tokens, &example.spans, &self.labels)?;
        let features: Vec<Vec<String>> = sentence_features(&tokens)
            .into_iter()
            .map(|feats| feats.into_iter().filter(|_| optimizer.keep(drop)).collect())
            .collect();

        optimizer.next_step();
        self.averages.updates += 1;
        let step = self.averages.updates;
        let guess = self.decode(&features);

        let loss = gold.iter().zip(&guess).filter(|(g, p)| g != p).count();
        if loss == 0 {
            return Ok(0.0);
        }

        let lr = optimizer.learn_rate();
        for (i, (gold_tag, guess_tag)) in gold.iter().zip(&guess).enumerate() {
            if gold_tag == guess_tag {
                continue;
            }
            trace!(
                token = %tokens[i].text,
                gold = %self.labels.tag_name(*gold_tag),
                guess = %self.labels.tag_name(*guess_tag),
                "mis-tagged token"
            );
            for feature in &features[i] {
                self.update_param(feature, gold_tag.index(), lr, step);
                self.update_param(feature, guess_tag.index(), -lr, step);
            }
        }

        for i in 1..gold.len() {
            let gold_pair = (gold[i - 1], gold[i]);
            let guess_pair = (guess[i - 1], guess[i]);
            if gold_pair != guess_pair {
                self.update_param(&transition_key(gold_pair.0), gold_pair.1.index(), lr, step);
                self.update_param(&transition_key(guess_pair.0), guess_pair.1.index(), -lr, step);
            }
        }

        debug!(loss, tokens = tokens.len(), step, "perceptron update");
        Ok(loss as f32)
    }

    /// Replace every weight with its average over the updates since the
    /// last call.
    pub fn finish_training(&mut self) {
        let averages = std::mem::take(&mut self.averages);
        let step = averages.updates;
        if step == 0 {
            return;
        }

        for (key, values) in &mut self.weights {
            let totals = averages.totals.get(key);
            let stamps = averages.stamps.get(key);
            for (tag, value) in values.iter_mut().enumerate() {
                let total = totals.and_then(|t| t.get(tag)).copied().unwrap_or(0.0);
                let stamp = stamps.and_then(|s| s.get(tag)).copied().unwrap_or(0);
                let accumulated = total + step.saturating_sub(stamp) as f32 * *value;
                *value = accumulated / step as f32;
            }
        }
    }

    /// Tag `text` and group the tags into entities.
    pub fn predict(&self, text: &str) -> Vec<Entity> {
        let tokens = self.tokenizer.tokenize(text);
        if tokens.is_empty() {
            return Vec::new();
        }

        let tags = self.decode(&sentence_features(&tokens));
        extract_spans(&tags)
            .into_iter()
            .filter_map(|span| {
                self.to_entity(text, &tokens, span.label, span.start_token, span.end_token)
            })
            .collect()
    }

    fn to_entity(
        &self,
        text: &str,
        tokens: &[Token],
        label: usize,
        start_token: usize,
        end_token: usize,
    ) -> Option<Entity> {
        let (start, end) = self.tokenizer.get_spans(tokens, start_token, end_token)?;
        Some(Entity {
            label: self.labels.get(label)?.to_string(),
            text: text.get(start..end)?.to_string(),
            start: byte_to_char(text, start)?,
            end: byte_to_char(text, end)?,
        })
    }

    fn decode(&self, features: &[Vec<String>]) -> Vec<BioTag> {
        let num_tags = self.labels.num_tags();

        let emissions: Vec<Vec<f32>> = features
            .iter()
            .map(|feats| {
                let mut scores = vec![0.0f32; num_tags];
                for values in feats.iter().filter_map(|f| self.weights.get(f)) {
                    for (score, w) in scores.iter_mut().zip(values) {
                        *score += w;
                    }
                }
                scores
            })
            .collect();

        let transitions: Vec<Vec<f32>> = (0..num_tags)
            .map(|prev| {
                BioTag::from_index(prev, self.labels.len())
                    .and_then(|tag| self.weights.get(&transition_key(tag)))
                    .map(|row| {
                        let mut row = row.clone();
                        row.resize(num_tags, 0.0);
                        row
                    })
                    .unwrap_or_else(|| vec![0.0; num_tags])
            })
            .collect();

        ViterbiDecoder::new(self.labels.len()).decode(&emissions, &transitions)
    }

    fn update_param(&mut self, key: &str, tag: usize, delta: f32, step: u64) {
        let num_tags = self.labels.num_tags();

        let values = self
            .weights
            .entry(key.to_string())
            .or_insert_with(|| vec![0.0; num_tags]);
        let totals = self
            .averages
            .totals
            .entry(key.to_string())
            .or_insert_with(|| vec![0.0; num_tags]);
        let stamps = self
            .averages
            .stamps
            .entry(key.to_string())
            .or_insert_with(|| vec![0; num_tags]);

        totals[tag] += step.saturating_sub(stamps[tag]) as f32 * values[tag];
        stamps[tag] = step;
        values[tag] += delta;
    }
}

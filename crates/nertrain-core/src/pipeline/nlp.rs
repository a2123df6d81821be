use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{NerError, Result};
use crate::optimizer::Optimizer;
use crate::pipeline::meta::{ModelMeta, NER_COMPONENT};
use crate::pipeline::{Losses, TrainablePipeline};
use crate::tagger::PerceptronNer;
use crate::types::{Entity, TrainingExample};

const META_FILE: &str = "meta.json";
const MODEL_FILE: &str = "model.json";

/// Tokenizer + entity recognizer pipeline.
///
/// # Examples
/// ```
/// use nertrain_core::pipeline::{Pipeline, TrainablePipeline};
///
/// let mut nlp = Pipeline::blank("en");
/// assert!(nlp.add_label("ANIMAL"));
/// assert!(nlp.predict_entities("Do you like horses?").is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    meta: ModelMeta,
    ner: PerceptronNer,
    source: Option<PathBuf>,
}

impl Pipeline {
    /// Create an untrained pipeline for `lang`.
    pub fn blank(lang: &str) -> Self {
        Self {
            meta: ModelMeta::new(lang),
            ner: PerceptronNer::new(),
            source: None,
        }
    }

    /// Load a pipeline previously written with [`TrainablePipeline::to_disk`].
    ///
    /// # Errors
    ///
    /// Returns [`NerError::ModelLoad`] if the directory does not contain a
    /// readable model or its weights do not fit its labels.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let meta: ModelMeta = read_json(&dir.join(META_FILE))?;
        let ner: PerceptronNer = read_json(&dir.join(NER_COMPONENT).join(MODEL_FILE))?;
        ner.check_shape()?;

        info!(
            name = %meta.name,
            labels = ner.labels().len(),
            features = ner.num_features(),
            "loaded model from {}",
            dir.display()
        );

        Ok(Self {
            meta,
            ner,
            source: Some(dir.to_path_buf()),
        })
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// Predicted `(label, text)` pairs for `text`.
    pub fn predict_entities(&self, text: &str) -> Vec<(String, String)> {
        self.ner.predict(text).iter().map(Entity::to_pair).collect()
    }
}

impl TrainablePipeline for Pipeline {
    fn add_label(&mut self, label: &str) -> bool {
        self.ner.add_label(label)
    }

    fn labels(&self) -> Vec<String> {
        self.ner.labels().as_slice().to_vec()
    }

    fn is_blank(&self) -> bool {
        self.source.is_none()
    }

    fn begin_training(&mut self, learn_rate: f32, seed: u64) -> Optimizer {
        let mut ner = PerceptronNer::new();
        for label in self.ner.labels().as_slice() {
            ner.add_label(label);
        }
        self.ner = ner;
        Optimizer::new(learn_rate, seed)
    }

    fn create_optimizer(&self, learn_rate: f32, seed: u64) -> Optimizer {
        Optimizer::new(learn_rate, seed)
    }

    fn update(
        &mut self,
        example: &TrainingExample,
        optimizer: &mut Optimizer,
        drop: f32,
        losses: &mut Losses,
    ) -> Result<()> {
        let loss = self.ner.update(example, optimizer, drop)?;
        *losses.entry(NER_COMPONENT.to_string()).or_insert(0.0) += loss;
        Ok(())
    }

    fn finish_training(&mut self, _optimizer: &Optimizer) {
        self.ner.finish_training();
    }

    fn set_name(&mut self, name: &str) {
        self.meta.name = name.to_string();
    }

    fn to_disk(&self, dir: &Path) -> Result<()> {
        let ner_dir = dir.join(NER_COMPONENT);
        fs::create_dir_all(&ner_dir)?;

        let mut meta = self.meta.clone();
        meta.labels = self.labels();
        fs::write(dir.join(META_FILE), serde_json::to_string_pretty(&meta)?)?;
        fs::write(ner_dir.join(MODEL_FILE), serde_json::to_string(&self.ner)?)?;

        Ok(())
    }

    fn predict(&self, text: &str) -> Result<Vec<Entity>> {
        Ok(self.ner.predict(text))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| NerError::ModelLoad(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| NerError::ModelLoad(format!("malformed {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntitySpan;

    fn train(nlp: &mut Pipeline) {
        let examples: Vec<TrainingExample> = [
            ("Do you like horses and dogs?", vec![(12, 18), (23, 27)]),
            ("I walked the dogs yesterday", vec![(13, 17)]),
            ("The horses ran across the field", vec![(4, 10)]),
            ("Nobody likes rainy weather", vec![]),
        ]
        .into_iter()
        .map(|(text, spans)| {
            let spans = spans
                .into_iter()
                .map(|(s, e)| EntitySpan::new(s, e, "ANIMAL"))
                .collect();
            TrainingExample::new(text, spans).unwrap()
        })
        .collect();

        let mut optimizer = nlp.begin_training(1.0, 0);
        for _ in 0..10 {
            let mut losses = Losses::new();
            for example in &examples {
                nlp.update(example, &mut optimizer, 0.0, &mut losses).unwrap();
            }
            assert!(losses.contains_key(NER_COMPONENT));
        }
        nlp.finish_training(&optimizer);
    }

    #[test]
    fn test_blank_pipeline() {
        let nlp = Pipeline::blank("en");
        assert!(nlp.is_blank());
        assert_eq!(nlp.meta().lang, "en");
        assert_eq!(nlp.meta().pipeline, vec!["ner".to_string()]);
        assert!(nlp.labels().is_empty());
    }

    #[test]
    fn test_begin_training_keeps_labels() {
        let mut nlp = Pipeline::blank("en");
        nlp.add_label("ANIMAL");
        nlp.add_label("PLACE");
        let optimizer = nlp.begin_training(0.5, 1);
        assert_eq!(optimizer.step(), 0);
        assert_eq!(optimizer.learn_rate(), 0.5);
        assert_eq!(nlp.labels(), vec!["ANIMAL".to_string(), "PLACE".to_string()]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut nlp = Pipeline::blank("en");
        nlp.add_label("ANIMAL");
        train(&mut nlp);
        nlp.set_name("play");
        nlp.to_disk(dir.path()).unwrap();

        assert!(dir.path().join("meta.json").exists());
        assert!(dir.path().join("ner").join("model.json").exists());

        let loaded = Pipeline::load(dir.path()).unwrap();
        assert!(!loaded.is_blank());
        assert_eq!(loaded.meta().name, "play");
        assert_eq!(loaded.meta().labels, vec!["ANIMAL".to_string()]);
        assert_eq!(
            loaded.predict_entities("Do you like horses and dogs?"),
            nlp.predict_entities("Do you like horses and dogs?")
        );
    }

    #[test]
    fn test_load_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = Pipeline::load(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, NerError::ModelLoad(_)));
    }

    #[test]
    fn test_load_malformed_meta() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(META_FILE), "{not json").unwrap();
        let err = Pipeline::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_load_rejects_mismatched_weights() {
        let dir = tempfile::tempdir().unwrap();
        Pipeline::blank("en").to_disk(dir.path()).unwrap();
        fs::write(
            dir.path().join(NER_COMPONENT).join(MODEL_FILE),
            r#"{"labels": ["ANIMAL"], "weights": {"bias": [0.0]}}"#,
        )
        .unwrap();

        let err = Pipeline::load(dir.path()).unwrap_err();
        assert!(matches!(err, NerError::ModelLoad(_)));
        assert!(err.to_string().contains("bias"));
    }

    #[test]
    fn test_continue_training_with_new_optimizer() {
        let example = TrainingExample::new(
            "Do you like horses?",
            vec![EntitySpan::new(12, 18, "ANIMAL")],
        )
        .unwrap();
        let mut nlp = Pipeline::blank("en");
        nlp.add_label("ANIMAL");

        let mut losses = Losses::new();
        let mut optimizer = nlp.begin_training(1.0, 0);
        for _ in 0..5 {
            nlp.update(&example, &mut optimizer, 0.0, &mut losses).unwrap();
        }

        let mut optimizer = nlp.create_optimizer(1.0, 0);
        for _ in 0..5 {
            nlp.update(&example, &mut optimizer, 0.0, &mut losses).unwrap();
        }
        nlp.finish_training(&optimizer);

        assert!(losses[NER_COMPONENT].is_finite());
        assert!(nlp.ner.check_shape().is_ok());
        let predicted = nlp.predict_entities("Do you like horses?");
        assert!(predicted.iter().all(|(label, _)| label == "ANIMAL"));
    }

    #[test]
    fn test_update_accumulates_losses() {
        let mut nlp = Pipeline::blank("en");
        nlp.add_label("ANIMAL");
        let mut optimizer = nlp.begin_training(1.0, 0);
        let example = TrainingExample::new(
            "Do you like horses?",
            vec![EntitySpan::new(12, 18, "ANIMAL")],
        )
        .unwrap();

        let mut losses = Losses::new();
        nlp.update(&example, &mut optimizer, 0.0, &mut losses).unwrap();
        assert_eq!(losses.get(NER_COMPONENT), Some(&1.0));
        assert_eq!(optimizer.step(), 1);
    }
}

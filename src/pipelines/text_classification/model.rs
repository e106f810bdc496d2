use std::collections::HashMap;

use candle_core::{Device, Tensor};
use tokenizers::{Encoding, Tokenizer};

use crate::error::{PipelineError, Result};
use crate::pipelines::cache::ModelOptions;

/// Labels paired with probabilities, highest first.
pub type LabelScores = Vec<(String, f32)>;

/// A sequence classifier with a fixed label set read from its checkpoint.
pub trait TextClassificationModel {
    type Options: ModelOptions + std::fmt::Debug + Clone;

    fn new(options: Self::Options, device: Device) -> Result<Self>
    where
        Self: Sized;

    /// Unnormalized class scores for one encoded text, shape `(num_labels,)`.
    fn logits(&self, encoding: &Encoding) -> Result<Tensor>;

    fn labels(&self) -> &LabelMap;

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    fn device(&self) -> &Device;
}

pub(crate) fn encode(tokenizer: &Tokenizer, text: &str) -> Result<Encoding> {
    if text.trim().is_empty() {
        return Err(PipelineError::InvalidInput("Cannot classify blank text".into()));
    }
    tokenizer.encode(text, true).map_err(|e| {
        PipelineError::Tokenization(format!(
            "Tokenization failed on '{}': {}",
            &text.chars().take(50).collect::<String>(),
            e
        ))
    })
}

/// Class names in logit order, built from a checkpoint's `id2label` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl LabelMap {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// `id2label` keys are stringified indices and must cover `0..n` exactly.
    pub fn from_id2label(id2label: &HashMap<String, String>) -> Result<Self> {
        if id2label.is_empty() {
            return Err(PipelineError::ModelLoad(
                "Checkpoint config has no id2label table".into(),
            ));
        }

        let mut slots: Vec<Option<String>> = vec![None; id2label.len()];
        for (id, label) in id2label {
            let index: usize = id.parse().map_err(|_| {
                PipelineError::ModelLoad(format!("id2label key '{id}' is not an index"))
            })?;
            let slot = slots.get_mut(index).ok_or_else(|| {
                PipelineError::ModelLoad(format!(
                    "id2label index {index} out of range for {} labels",
                    id2label.len()
                ))
            })?;
            *slot = Some(label.clone());
        }

        let labels = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| PipelineError::ModelLoad(format!("id2label is missing index {i}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Pairs per-class probabilities with their labels, highest first.
    pub fn rank(&self, probs: &[f32]) -> Result<LabelScores> {
        if probs.len() != self.labels.len() {
            return Err(PipelineError::Inference(format!(
                "Classifier produced {} scores for {} labels",
                probs.len(),
                self.labels.len()
            )));
        }

        let mut scores: LabelScores = self.labels.iter().cloned().zip(probs.iter().copied()).collect();
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id2label(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn orders_labels_by_index() {
        let map = LabelMap::from_id2label(&id2label(&[
            ("1", "POSITIVE"),
            ("0", "NEGATIVE"),
        ]))
        .unwrap();
        assert_eq!(map.iter().collect::<Vec<_>>(), vec!["NEGATIVE", "POSITIVE"]);
    }

    #[test]
    fn rejects_gaps_and_garbage_keys() {
        assert!(LabelMap::from_id2label(&id2label(&[("0", "a"), ("2", "c")])).is_err());
        assert!(LabelMap::from_id2label(&id2label(&[("zero", "a")])).is_err());
        assert!(LabelMap::from_id2label(&HashMap::new()).is_err());
    }

    #[test]
    fn rank_sorts_descending() {
        let map = LabelMap::new(vec!["anger".into(), "joy".into(), "neutral".into()]);
        let ranked = map.rank(&[0.1, 0.7, 0.2]).unwrap();
        let labels: Vec<_> = ranked.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["joy", "neutral", "anger"]);
        assert!((ranked[0].1 - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn blank_text_is_rejected_before_tokenizing() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = dir.path().join("vocab.txt");
        std::fs::write(&vocab, "[PAD]\n[UNK]\n[CLS]\n[SEP]\nhi\n").unwrap();
        let tokenizer = crate::loaders::wordpiece_tokenizer(&vocab, true).unwrap();

        let err = encode(&tokenizer, "  \t").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert_eq!(encode(&tokenizer, "hi").unwrap().get_ids(), &[2, 4, 3]);
    }

    #[test]
    fn rank_rejects_shape_mismatch() {
        let map = LabelMap::new(vec!["a".into(), "b".into()]);
        let err = map.rank(&[1.0]).unwrap_err();
        assert!(matches!(err, PipelineError::Inference(_)));
    }
}

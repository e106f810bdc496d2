use std::sync::Arc;

use candle_core::D;
use candle_nn::ops::softmax;
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use super::model::{encode, LabelMap, TextClassificationModel};
use crate::error::{PipelineError, Result};
use crate::pipelines::stats::PipelineStats;

// ============ Output types ============

/// A label with confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Label as spelled in the checkpoint (e.g. `POSITIVE`, `anger`).
    pub label: String,
    /// Softmax probability (0.0 to 1.0).
    pub score: f32,
}

/// Output from `run()`.
#[derive(Debug)]
pub struct Output {
    /// Every label of the model, ranked by confidence.
    pub predictions: Vec<Prediction>,
    /// Execution statistics.
    pub stats: PipelineStats,
}

impl Output {
    /// Highest-scoring prediction.
    pub fn top(&self) -> Option<&Prediction> {
        self.predictions.first()
    }
}

// ============ Pipeline ============

/// Classifies a sentence against the fixed label set of a fine-tuned checkpoint.
///
/// Construct with [`TextClassificationPipelineBuilder`](super::TextClassificationPipelineBuilder).
///
/// # Examples
///
/// ```rust,no_run
/// # use assertive_rewriter::text_classification::TextClassificationPipelineBuilder;
/// # fn main() -> assertive_rewriter::error::Result<()> {
/// let pipeline = TextClassificationPipelineBuilder::english_emotion().build()?;
///
/// let output = pipeline.run("I am so angry about the delay")?;
/// for p in &output.predictions {
///     println!("{}: {:.2}", p.label, p.score);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TextClassificationPipeline<M: TextClassificationModel> {
    pub(crate) model: Arc<M>,
    pub(crate) tokenizer: Tokenizer,
}

impl<M: TextClassificationModel> TextClassificationPipeline<M> {
    /// Classify one text. Predictions cover every label, highest score first.
    pub fn run(&self, text: &str) -> Result<Output> {
        let stats_builder = PipelineStats::start();

        let encoding = encode(&self.tokenizer, text)?;
        let logits = self.model.logits(&encoding)?;
        let probs = softmax(&logits, D::Minus1)?.to_vec1::<f32>()?;

        let predictions: Vec<Prediction> = self
            .model
            .labels()
            .rank(&probs)?
            .into_iter()
            .map(|(label, score)| Prediction { label, score })
            .collect();

        if predictions.is_empty() {
            return Err(PipelineError::Inference(
                "Classifier returned no predictions".into(),
            ));
        }

        Ok(Output {
            predictions,
            stats: stats_builder.finish(encoding.len()),
        })
    }

    /// The label set this pipeline predicts over, in logit order.
    pub fn labels(&self) -> &LabelMap {
        self.model.labels()
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

use candle_core::{Device, Tensor};
use candle_transformers::models::xlm_roberta::{Config, XLMRobertaForSequenceClassification};
use tokenizers::{Encoding, Tokenizer};

use super::{HubModel, MAX_SEQUENCE_LENGTH};
use crate::error::{PipelineError, Result};
use crate::loaders::{CheckpointConfigLoader, TokenizerFamily, TokenizerLoader, WeightsLoader};
use crate::pipelines::text_classification::model::{LabelMap, TextClassificationModel};

/// RoBERTa-family sequence classifier (`roberta.*` encoder, `classifier.dense` / `classifier.out_proj` head).
///
/// XLM-R and RoBERTa share an architecture and weight layout, so candle's
/// XLM-R implementation loads plain RoBERTa and DistilRoBERTa checkpoints.
pub struct RobertaClassifier {
    model: XLMRobertaForSequenceClassification,
    device: Device,
    labels: LabelMap,
}

impl RobertaClassifier {
    pub fn new(model: HubModel, device: Device) -> Result<Self> {
        let checkpoint = CheckpointConfigLoader::new(&model).load()?;
        let config: Config = serde_json::from_str(&checkpoint.raw)?;
        let labels = LabelMap::from_id2label(&checkpoint.id2label)?;

        let vb = WeightsLoader::new(&model).load(&device)?;
        let classifier = XLMRobertaForSequenceClassification::new(labels.len(), &config, vb)
            .map_err(|e| {
                PipelineError::ModelLoad(format!("Failed to build RoBERTa from '{model}': {e}"))
            })?;

        tracing::debug!(%model, labels = labels.len(), "roberta classifier ready");

        Ok(Self {
            model: classifier,
            device,
            labels,
        })
    }
}

impl TextClassificationModel for RobertaClassifier {
    type Options = HubModel;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        RobertaClassifier::new(options, device)
    }

    fn logits(&self, encoding: &Encoding) -> Result<Tensor> {
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let logits = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids)?;

        Ok(logits.squeeze(0)?)
    }

    fn labels(&self) -> &LabelMap {
        &self.labels
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        TokenizerLoader::new(&options, TokenizerFamily::ByteLevelBpe, MAX_SEQUENCE_LENGTH).load()
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

use candle_core::{DType, Device, IndexOp, Module, Tensor};
use candle_nn::{linear, Linear};
use candle_transformers::models::distilbert::{Config, DistilBertModel};
use serde::Deserialize;
use tokenizers::{Encoding, Tokenizer};

use super::{HubModel, MAX_SEQUENCE_LENGTH};
use crate::error::{PipelineError, Result};
use crate::loaders::{CheckpointConfigLoader, TokenizerFamily, TokenizerLoader, WeightsLoader};
use crate::pipelines::text_classification::model::{LabelMap, TextClassificationModel};

/// The one `config.json` field the classification head needs that candle's `Config` keeps private.
#[derive(Deserialize)]
struct HeadConfig {
    dim: usize,
}

/// DistilBERT sequence classifier: encoder, `pre_classifier`, ReLU, `classifier` over the `[CLS]` state.
pub struct DistilBertClassifier {
    encoder: DistilBertModel,
    pre_classifier: Linear,
    classifier: Linear,
    device: Device,
    labels: LabelMap,
}

impl DistilBertClassifier {
    pub fn new(model: HubModel, device: Device) -> Result<Self> {
        let checkpoint = CheckpointConfigLoader::new(&model).load()?;
        let config: Config = serde_json::from_str(&checkpoint.raw)?;
        let head: HeadConfig = serde_json::from_str(&checkpoint.raw)?;
        let labels = LabelMap::from_id2label(&checkpoint.id2label)?;

        let vb = WeightsLoader::new(&model).load(&device)?;

        let load_err = |e: candle_core::Error| {
            PipelineError::ModelLoad(format!("Failed to build DistilBERT from '{model}': {e}"))
        };
        let encoder = DistilBertModel::load(vb.pp("distilbert"), &config).map_err(load_err)?;
        let pre_classifier =
            linear(head.dim, head.dim, vb.pp("pre_classifier")).map_err(load_err)?;
        let classifier = linear(head.dim, labels.len(), vb.pp("classifier")).map_err(load_err)?;

        tracing::debug!(%model, labels = labels.len(), "distilbert classifier ready");

        Ok(Self {
            encoder,
            pre_classifier,
            classifier,
            device,
            labels,
        })
    }
}

impl TextClassificationModel for DistilBertClassifier {
    type Options = HubModel;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        DistilBertClassifier::new(options, device)
    }

    fn logits(&self, encoding: &Encoding) -> Result<Tensor> {
        let ids = encoding.get_ids();
        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        // Nonzero entries are masked out; one unpadded text attends everywhere.
        let attention_mask = Tensor::zeros((ids.len(), ids.len()), DType::U8, &self.device)?;

        let hidden = self.encoder.forward(&input_ids, &attention_mask)?;
        let cls = hidden.i((.., 0))?;
        let pooled = self.pre_classifier.forward(&cls)?.relu()?;
        let logits = self.classifier.forward(&pooled)?;

        Ok(logits.squeeze(0)?)
    }

    fn labels(&self) -> &LabelMap {
        &self.labels
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        TokenizerLoader::new(&options, TokenizerFamily::WordPiece, MAX_SEQUENCE_LENGTH).load()
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

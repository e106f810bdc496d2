//! Model provider: turns configured Hub checkpoints into ready classifiers.
//!
//! The controller only sees [`ModelProvider`] and [`TextClassifier`], so the
//! Hub-backed implementation here can be swapped for in-memory fakes.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::error::{PipelineError, Result};
use crate::loaders::CheckpointConfigLoader;
use crate::models::{Architecture, HubModel};
use crate::text_classification::{
    DeviceRequest, Prediction, TextClassificationModel, TextClassificationPipeline,
    TextClassificationPipelineBuilder,
};

/// Scores a text against a fixed label set.
pub trait TextClassifier: Send + Sync {
    /// Every label the classifier knows, highest score first.
    fn classify(&self, text: &str) -> Result<Vec<Prediction>>;
}

impl<M> TextClassifier for TextClassificationPipeline<M>
where
    M: TextClassificationModel + Send + Sync,
{
    fn classify(&self, text: &str) -> Result<Vec<Prediction>> {
        let output = self.run(text)?;
        tracing::debug!(
            tokens = output.stats.input_tokens,
            elapsed_ms = output.stats.total_time.as_millis() as u64,
            "classified"
        );
        Ok(output.predictions)
    }
}

/// The two classifiers an analysis runs.
#[derive(Clone)]
pub struct Classifiers {
    /// `None` when sentiment analysis is switched off.
    pub sentiment: Option<Arc<dyn TextClassifier>>,
    pub emotion: Arc<dyn TextClassifier>,
}

/// Source of [`Classifiers`]. Loading may be slow and may fail.
pub trait ModelProvider {
    fn load_models(&self) -> Result<Classifiers>;
}

/// Loads classifiers from the Hugging Face Hub (or its local cache).
#[derive(Debug, Clone)]
pub struct HubModelProvider {
    sentiment: Option<HubModel>,
    emotion: HubModel,
    device: DeviceRequest,
}

impl HubModelProvider {
    pub fn new(sentiment: Option<HubModel>, emotion: HubModel) -> Self {
        Self {
            sentiment,
            emotion,
            device: DeviceRequest::Cpu,
        }
    }

    pub fn on_device(mut self, device: DeviceRequest) -> Self {
        self.device = device;
        self
    }

    pub fn sentiment_model(&self) -> Option<&HubModel> {
        self.sentiment.as_ref()
    }

    pub fn emotion_model(&self) -> &HubModel {
        &self.emotion
    }

    pub fn device(&self) -> DeviceRequest {
        self.device
    }
}

impl Default for HubModelProvider {
    fn default() -> Self {
        Self::new(
            Some(HubModel::default_sentiment()),
            HubModel::english_emotion(),
        )
    }
}

impl ModelProvider for HubModelProvider {
    fn load_models(&self) -> Result<Classifiers> {
        info!(device = %self.device, "Loading the models...");
        let started = Instant::now();

        let sentiment = match &self.sentiment {
            Some(model) => {
                info!(%model, "loading sentiment classifier");
                Some(build_classifier(model, self.device)?)
            }
            None => {
                info!("sentiment analysis disabled");
                None
            }
        };

        info!(model = %self.emotion, "loading emotion classifier");
        let emotion = build_classifier(&self.emotion, self.device)?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Models loaded successfully"
        );

        Ok(Classifiers { sentiment, emotion })
    }
}

/// Picks the architecture from the checkpoint's `model_type` and builds its pipeline.
fn build_classifier(model: &HubModel, device: DeviceRequest) -> Result<Arc<dyn TextClassifier>> {
    let checkpoint = CheckpointConfigLoader::new(model).load()?;
    let model_type = checkpoint.model_type.as_deref().unwrap_or("<missing>");

    match Architecture::from_model_type(model_type) {
        Some(Architecture::DistilBert) => {
            let pipeline = TextClassificationPipelineBuilder::distilbert(model.clone())
                .device(device)
                .build()?;
            Ok(Arc::new(pipeline))
        }
        Some(Architecture::Roberta) => {
            let pipeline = TextClassificationPipelineBuilder::roberta(model.clone())
                .device(device)
                .build()?;
            Ok(Arc::new(pipeline))
        }
        None => Err(PipelineError::ModelLoad(format!(
            "'{model}' has model_type '{model_type}'; supported: distilbert, roberta, xlm-roberta"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_provider_binds_both_models_on_cpu() {
        let provider = HubModelProvider::default();
        assert_eq!(
            provider.sentiment_model(),
            Some(&HubModel::default_sentiment())
        );
        assert_eq!(provider.emotion_model(), &HubModel::english_emotion());
        assert_eq!(provider.device(), DeviceRequest::Cpu);
    }

    #[test]
    fn sentiment_can_be_disabled() {
        let provider = HubModelProvider::new(None, HubModel::english_emotion())
            .on_device(DeviceRequest::Cuda(0));
        assert!(provider.sentiment_model().is_none());
        assert_eq!(provider.device(), DeviceRequest::Cuda(0));
    }
}

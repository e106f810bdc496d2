use std::marker::PhantomData;

use super::model::TextClassificationModel;
use super::pipeline::TextClassificationPipeline;
use crate::error::Result;
use crate::models::{DistilBertClassifier, HubModel, RobertaClassifier};
use crate::pipelines::cache::global_cache;
use crate::pipelines::utils::{build_cache_key, DeviceRequest};

/// Builder for creating [`TextClassificationPipeline`] instances.
///
/// Use [`Self::distilbert`] or [`Self::roberta`] with any matching Hub
/// checkpoint, or the [`Self::default_sentiment`] / [`Self::english_emotion`]
/// shortcuts.
///
/// # Examples
///
/// ```rust,no_run
/// # use assertive_rewriter::text_classification::TextClassificationPipelineBuilder;
/// # fn main() -> assertive_rewriter::error::Result<()> {
/// let pipeline = TextClassificationPipelineBuilder::default_sentiment()
///     .cuda(0)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct TextClassificationPipelineBuilder<M: TextClassificationModel> {
    options: M::Options,
    device_request: DeviceRequest,
    _model: PhantomData<fn() -> M>,
}

impl<M: TextClassificationModel> TextClassificationPipelineBuilder<M> {
    pub(crate) fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Cpu,
            _model: PhantomData,
        }
    }

    /// Use CPU for inference (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    pub fn device(mut self, device_request: DeviceRequest) -> Self {
        self.device_request = device_request;
        self
    }

    /// Builds the pipeline with configured settings.
    ///
    /// Weights already loaded by another live pipeline for the same checkpoint
    /// and device are shared rather than loaded again.
    ///
    /// # Errors
    ///
    /// Returns an error if downloading, model loading, or device initialization fails.
    pub fn build(self) -> Result<TextClassificationPipeline<M>>
    where
        M: Send + Sync + 'static,
    {
        let device = self.device_request.resolve()?;

        let key = build_cache_key(&self.options, &device);

        let model = global_cache().get_or_create(&key, || {
            M::new(self.options.clone(), device.clone())
        })?;

        let tokenizer = M::get_tokenizer(self.options.clone())?;

        Ok(TextClassificationPipeline { model, tokenizer })
    }
}

impl TextClassificationPipelineBuilder<DistilBertClassifier> {
    /// Creates a builder for a DistilBERT sequence-classification checkpoint.
    pub fn distilbert(model: HubModel) -> Self {
        Self::new(model)
    }

    /// The pinned DistilBERT SST-2 sentiment model (`POSITIVE` / `NEGATIVE`).
    pub fn default_sentiment() -> Self {
        Self::new(HubModel::default_sentiment())
    }
}

impl TextClassificationPipelineBuilder<RobertaClassifier> {
    /// Creates a builder for a RoBERTa-family sequence-classification checkpoint.
    pub fn roberta(model: HubModel) -> Self {
        Self::new(model)
    }

    /// The seven-way DistilRoBERTa English emotion model.
    pub fn english_emotion() -> Self {
        Self::new(HubModel::english_emotion())
    }
}

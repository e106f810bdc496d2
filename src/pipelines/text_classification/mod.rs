//! Text classification pipeline.
//!
//! Score a sentence against the fixed label set of a fine-tuned checkpoint:
//! sentiment (`POSITIVE` / `NEGATIVE`) or emotion (`anger`, `joy`, ...).
//! Returns every label ranked by confidence.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use assertive_rewriter::text_classification::TextClassificationPipelineBuilder;
//!
//! # fn main() -> assertive_rewriter::error::Result<()> {
//! let sentiment = TextClassificationPipelineBuilder::default_sentiment().build()?;
//! let emotion = TextClassificationPipelineBuilder::english_emotion().build()?;
//!
//! let text = "I am thrilled about the results";
//! let s = sentiment.run(text)?;
//! let e = emotion.run(text)?;
//!
//! if let (Some(s), Some(e)) = (s.top(), e.top()) {
//!     println!("sentiment: {} ({:.2}), emotion: {} ({:.2})", s.label, s.score, e.label, e.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Models
//!
//! | Architecture | Builder Method | Default checkpoint |
//! |--------------|----------------|--------------------|
//! | DistilBERT | [`TextClassificationPipelineBuilder::distilbert`] | [`TextClassificationPipelineBuilder::default_sentiment`] |
//! | RoBERTa / DistilRoBERTa | [`TextClassificationPipelineBuilder::roberta`] | [`TextClassificationPipelineBuilder::english_emotion`] |

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::models::HubModel;
pub use crate::pipelines::cache::ModelOptions;
pub use crate::pipelines::stats::PipelineStats;
pub use crate::pipelines::utils::DeviceRequest;
pub use builder::TextClassificationPipelineBuilder;
pub use model::{LabelMap, LabelScores, TextClassificationModel};
pub use pipeline::{Output, Prediction, TextClassificationPipeline};

/// Only for generic annotations. Use [`TextClassificationPipelineBuilder::distilbert`].
pub type DistilBertTextClassifier = crate::models::DistilBertClassifier;

/// Only for generic annotations. Use [`TextClassificationPipelineBuilder::roberta`].
pub type RobertaTextClassifier = crate::models::RobertaClassifier;

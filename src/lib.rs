//! # Assertive Rewriter
//!
//! Detects the emotion behind a sentence with candle text classifiers and
//! rewrites it in a professional, assertive tone.
//!
//! ```rust,no_run
//! use assertive_rewriter::controller::{Analyzer, Outcome};
//! use assertive_rewriter::provider::HubModelProvider;
//!
//! let mut analyzer = Analyzer::new(HubModelProvider::default());
//! if let Outcome::Analyzed(report) = analyzer.analyze("I am so angry about the delay") {
//!     assert_eq!(report.emotion_display(), "Anger");
//!     println!("{}", report.transformed);
//! }
//! ```

pub mod assertive;
pub mod console;
pub mod controller;
pub mod error;
pub mod provider;

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;

pub use error::{PipelineError, Result};
pub use models::HubModel;
pub use pipelines::text_classification;

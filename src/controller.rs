//! One analysis request end to end: validate, classify, rewrite, report.
//!
//! Models are acquired through the [`ModelProvider`] at most once per
//! [`Analyzer`]. A failed load caches nothing, so the next request tries again.

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::assertive::transform_to_assertive;
use crate::error::{PipelineError, Result};
use crate::provider::{Classifiers, ModelProvider};
use crate::text_classification::Prediction;

/// Shown instead of results when the input is blank.
pub const EMPTY_INPUT_WARNING: &str = "Please enter a sentence to analyze.";

/// Where a request is in its lifecycle. Every request ends in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Idle,
    AwaitingInput,
    Warning,
    ModelsLoading,
    Analyzing,
    Rendering,
}

/// Everything shown to the user after a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// The sentence exactly as submitted.
    pub input: String,
    /// Top sentiment prediction. Display only; never affects the rewrite.
    pub sentiment: Option<Prediction>,
    /// Why sentiment is missing when its classifier failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_error: Option<String>,
    /// Top emotion prediction, label lowercased.
    pub emotion: Prediction,
    /// Assertive rewrite, or `input` unchanged when the emotion has no template.
    pub transformed: String,
}

impl AnalysisReport {
    /// Emotion label with its first letter uppercased, e.g. `Anger`.
    pub fn emotion_display(&self) -> String {
        capitalize(&self.emotion.label)
    }
}

impl std::fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "--- Results ---")?;
        writeln!(f, "Input Sentence: \"{}\"", self.input)?;
        if let Some(sentiment) = &self.sentiment {
            writeln!(
                f,
                "Sentiment: {} ({:.2})",
                capitalize(&sentiment.label),
                sentiment.score
            )?;
        } else if let Some(reason) = &self.sentiment_error {
            writeln!(f, "Sentiment: unavailable ({reason})")?;
        }
        writeln!(f, "Detected Emotion: {}", self.emotion_display())?;
        write!(f, "Professional/Assertive Sentence: \"{}\"", self.transformed)
    }
}

/// Result of one request, as rendered to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Input was rejected before any model ran.
    Warning { message: String },
    Analyzed(AnalysisReport),
    /// Loading or inference failed. `retryable` failures may succeed on the next request.
    Failed { message: String, retryable: bool },
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Warning { message } => write!(f, "Warning: {message}"),
            Outcome::Analyzed(report) => write!(f, "{report}"),
            Outcome::Failed { message, retryable } => {
                write!(f, "Error: {message}")?;
                if *retryable {
                    write!(f, "\nRun the analysis again to retry.")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Loading,
    Inference,
}

/// Drives requests against classifiers obtained once from a [`ModelProvider`].
///
/// ```rust,no_run
/// use assertive_rewriter::controller::{Analyzer, Outcome};
/// use assertive_rewriter::provider::HubModelProvider;
///
/// let mut analyzer = Analyzer::new(HubModelProvider::default());
/// match analyzer.analyze("I am so angry about the delay") {
///     Outcome::Analyzed(report) => println!("{report}"),
///     other => eprintln!("{other}"),
/// }
/// ```
pub struct Analyzer<P> {
    provider: P,
    models: OnceCell<Classifiers>,
    stage: Stage,
    trail: Vec<Stage>,
}

impl<P: ModelProvider> Analyzer<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            models: OnceCell::new(),
            stage: Stage::Idle,
            trail: Vec::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Stages the most recent request passed through, starting after `Idle`.
    pub fn last_trail(&self) -> &[Stage] {
        &self.trail
    }

    pub fn models_loaded(&self) -> bool {
        self.models.get().is_some()
    }

    /// Loads the models now rather than on the first request.
    pub fn warm_up(&self) -> Result<()> {
        self.models
            .get_or_try_init(|| self.provider.load_models())
            .map(|_| ())
    }

    /// Handles one "Run Analysis" action.
    pub fn analyze(&mut self, input: &str) -> Outcome {
        self.trail.clear();
        self.enter(Stage::AwaitingInput);

        let outcome = if input.trim().is_empty() {
            self.enter(Stage::Warning);
            warn!("empty input, nothing to analyze");
            Outcome::Warning {
                message: EMPTY_INPUT_WARNING.to_string(),
            }
        } else {
            match self.run(input) {
                Ok(report) => Outcome::Analyzed(report),
                Err((phase, e)) => {
                    error!(error = %e, ?phase, "analysis failed");
                    let message = match phase {
                        Phase::Loading => format!("Could not load the models: {e}"),
                        Phase::Inference => format!("Could not analyze the sentence: {e}"),
                    };
                    Outcome::Failed {
                        message,
                        retryable: e.is_retryable(),
                    }
                }
            }
        };

        self.enter(Stage::Idle);
        outcome
    }

    fn run(&mut self, sentence: &str) -> std::result::Result<AnalysisReport, (Phase, PipelineError)> {
        self.enter(Stage::ModelsLoading);
        let provider = &self.provider;
        let models = self
            .models
            .get_or_try_init(|| provider.load_models())
            .map_err(|e| (Phase::Loading, e))?
            .clone();

        self.enter(Stage::Analyzing);
        let report = analyze_sentence(&models, sentence).map_err(|e| (Phase::Inference, e))?;

        self.enter(Stage::Rendering);
        info!(
            emotion = %report.emotion.label,
            score = report.emotion.score,
            rewritten = report.transformed != report.input,
            "analysis complete"
        );
        Ok(report)
    }

    fn enter(&mut self, next: Stage) {
        tracing::trace!(from = ?self.stage, to = ?next, "stage");
        self.stage = next;
        self.trail.push(next);
    }
}

/// Classifies `sentence` and picks its rewrite. `sentence` must not be blank.
fn analyze_sentence(models: &Classifiers, sentence: &str) -> Result<AnalysisReport> {
    let (sentiment, sentiment_error) = match &models.sentiment {
        Some(classifier) => match classifier.classify(sentence) {
            Ok(predictions) => match predictions.into_iter().next() {
                Some(top) => (Some(top), None),
                None => (None, Some("Sentiment classifier returned no labels".to_string())),
            },
            Err(e) => {
                warn!(error = %e, "sentiment classification failed, continuing without it");
                (None, Some(e.to_string()))
            }
        },
        None => (None, None),
    };

    let top = models
        .emotion
        .classify(sentence)?
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::Inference("Emotion classifier returned no labels".into()))?;

    let emotion = Prediction {
        label: top.label.to_lowercase(),
        score: top.score,
    };
    let transformed = transform_to_assertive(&emotion.label, sentence).to_string();

    Ok(AnalysisReport {
        input: sentence.to_string(),
        sentiment,
        sentiment_error,
        emotion,
        transformed,
    })
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_matches_display_convention() {
        assert_eq!(capitalize("anger"), "Anger");
        assert_eq!(capitalize("POSITIVE"), "Positive");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn report_renders_all_fields() {
        let report = AnalysisReport {
            input: "I am so angry about the delay".into(),
            sentiment: Some(Prediction {
                label: "NEGATIVE".into(),
                score: 0.987,
            }),
            sentiment_error: None,
            emotion: Prediction {
                label: "anger".into(),
                score: 0.9,
            },
            transformed: "I understand this happened and will address it constructively.".into(),
        };

        let rendered = report.to_string();
        assert_eq!(
            rendered,
            "--- Results ---\n\
             Input Sentence: \"I am so angry about the delay\"\n\
             Sentiment: Negative (0.99)\n\
             Detected Emotion: Anger\n\
             Professional/Assertive Sentence: \"I understand this happened and will address it constructively.\""
        );
    }

    #[test]
    fn failure_mentions_retry_only_when_retryable() {
        let retry = Outcome::Failed {
            message: "offline".into(),
            retryable: true,
        };
        let fatal = Outcome::Failed {
            message: "bad checkpoint".into(),
            retryable: false,
        };
        assert!(retry.to_string().contains("retry"));
        assert!(!fatal.to_string().contains("retry"));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(Outcome::Warning {
            message: EMPTY_INPUT_WARNING.into(),
        })
        .unwrap();
        assert_eq!(json["status"], "warning");
        assert_eq!(json["message"], EMPTY_INPUT_WARNING);
    }

    #[test]
    fn failed_sentiment_is_reported() {
        let report = AnalysisReport {
            input: "We shipped it".into(),
            sentiment: None,
            sentiment_error: Some("sentiment head broke".into()),
            emotion: Prediction {
                label: "joy".into(),
                score: 0.8,
            },
            transformed: "This is a great moment, and I appreciate it.".into(),
        };

        assert!(report
            .to_string()
            .contains("Sentiment: unavailable (sentiment head broke)"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["sentiment_error"], "sentiment head broke");
    }
}

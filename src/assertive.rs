//! Emotion-keyed assertive rewrites.
//!
//! Four emotions map to a fixed professional sentence. Every other label,
//! including the ones the emotion model can emit but nothing is written for
//! (`disgust`, `fear`, `surprise`), passes the original sentence through.
//!
//! Lookup is exact and case-sensitive. Callers lowercase model labels first.
//!
//! ```rust
//! use assertive_rewriter::assertive::transform_to_assertive;
//!
//! assert_eq!(
//!     transform_to_assertive("joy", "I am thrilled about the results"),
//!     "This is a great moment, and I appreciate it."
//! );
//! assert_eq!(
//!     transform_to_assertive("surprise", "It is raining outside"),
//!     "It is raining outside"
//! );
//! ```

use serde::Serialize;

/// Emotion categories of the English emotion classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anger,
    Disgust,
    Fear,
    Joy,
    Neutral,
    Sadness,
    Surprise,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Anger,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Joy,
        Emotion::Neutral,
        Emotion::Sadness,
        Emotion::Surprise,
    ];

    /// Lowercase label as the classifier spells it.
    pub fn label(self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Joy => "joy",
            Emotion::Neutral => "neutral",
            Emotion::Sadness => "sadness",
            Emotion::Surprise => "surprise",
        }
    }

    /// Exact, case-sensitive match: `"Anger"` is not [`Emotion::Anger`].
    pub fn from_label(label: &str) -> Option<Emotion> {
        Emotion::ALL.into_iter().find(|e| e.label() == label)
    }

    /// The fixed rewrite for this emotion, if one exists.
    pub fn assertive_template(self) -> Option<&'static str> {
        match self {
            Emotion::Anger => {
                Some("I understand this happened and will address it constructively.")
            }
            Emotion::Sadness => {
                Some("I acknowledge the results and will take steps to improve.")
            }
            Emotion::Joy => Some("This is a great moment, and I appreciate it."),
            Emotion::Neutral => Some("I acknowledge this event and will proceed accordingly."),
            // No rewrite written yet; the sentence is echoed.
            Emotion::Disgust | Emotion::Fear | Emotion::Surprise => None,
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How a sentence will be rewritten for a given label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Replace the sentence with a fixed template.
    Template(Emotion, &'static str),
    /// Keep the sentence as typed.
    PassThrough,
}

impl Rewrite {
    pub fn for_label(emotion_label: &str) -> Rewrite {
        Emotion::from_label(emotion_label)
            .and_then(|emotion| {
                emotion
                    .assertive_template()
                    .map(|template| Rewrite::Template(emotion, template))
            })
            .unwrap_or(Rewrite::PassThrough)
    }

    pub fn apply<'a>(self, sentence: &'a str) -> &'a str {
        match self {
            Rewrite::Template(_, template) => template,
            Rewrite::PassThrough => sentence,
        }
    }
}

/// Rewrites `sentence` in an assertive tone chosen by `emotion_label`.
///
/// Total: unknown labels return `sentence` unchanged.
pub fn transform_to_assertive<'a>(emotion_label: &str, sentence: &'a str) -> &'a str {
    Rewrite::for_label(emotion_label).apply(sentence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for emotion in Emotion::ALL {
            assert_eq!(Emotion::from_label(emotion.label()), Some(emotion));
        }
    }

    #[test]
    fn exactly_four_emotions_have_templates() {
        let covered: Vec<_> = Emotion::ALL
            .into_iter()
            .filter(|e| e.assertive_template().is_some())
            .collect();
        assert_eq!(
            covered,
            vec![Emotion::Anger, Emotion::Joy, Emotion::Neutral, Emotion::Sadness]
        );
    }

    #[test]
    fn uncovered_emotion_is_pass_through() {
        assert_eq!(Rewrite::for_label("fear"), Rewrite::PassThrough);
        assert_eq!(Rewrite::for_label(""), Rewrite::PassThrough);
    }

    #[test]
    fn template_carries_its_emotion() {
        assert!(matches!(
            Rewrite::for_label("sadness"),
            Rewrite::Template(Emotion::Sadness, _)
        ));
    }
}

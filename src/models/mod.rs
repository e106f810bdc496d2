// ============ Model implementations ============

pub(crate) mod distilbert;
pub(crate) mod roberta;

pub use distilbert::DistilBertClassifier;
pub use roberta::RobertaClassifier;

use serde::{Deserialize, Serialize};

/// Checkpoint behind the `sentiment-analysis` task when no model is named.
pub const DEFAULT_SENTIMENT_REPO: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";
/// Commit the default sentiment checkpoint is pinned to.
pub const DEFAULT_SENTIMENT_REVISION: &str = "714eb0f";
/// Seven-way English emotion classifier (anger, disgust, fear, joy, neutral, sadness, surprise).
pub const ENGLISH_EMOTION_REPO: &str = "j-hartmann/emotion-english-distilroberta-base";

/// Context window shared by the DistilBERT and RoBERTa checkpoints.
pub(crate) const MAX_SEQUENCE_LENGTH: usize = 512;

/// Encoder families with a sequence-classification implementation here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    DistilBert,
    Roberta,
}

impl Architecture {
    /// Maps a checkpoint's `config.json` `model_type`.
    pub fn from_model_type(model_type: &str) -> Option<Self> {
        match model_type {
            "distilbert" => Some(Architecture::DistilBert),
            "roberta" | "xlm-roberta" => Some(Architecture::Roberta),
            _ => None,
        }
    }
}

/// A model repository on the Hugging Face Hub, optionally pinned to a revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HubModel {
    /// Repository id, e.g. `j-hartmann/emotion-english-distilroberta-base`.
    pub repo: String,
    /// Branch, tag, or commit. `None` follows `main`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

impl HubModel {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            revision: None,
        }
    }

    pub fn at_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    /// The pinned DistilBERT SST-2 sentiment checkpoint.
    pub fn default_sentiment() -> Self {
        Self::new(DEFAULT_SENTIMENT_REPO).at_revision(DEFAULT_SENTIMENT_REVISION)
    }

    /// The DistilRoBERTa English emotion checkpoint.
    pub fn english_emotion() -> Self {
        Self::new(ENGLISH_EMOTION_REPO)
    }
}

impl std::fmt::Display for HubModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.revision {
            Some(revision) => write!(f, "{}@{}", self.repo, revision),
            None => write!(f, "{}", self.repo),
        }
    }
}

impl std::str::FromStr for HubModel {
    type Err = String;

    /// Parses `owner/name` or `owner/name@revision`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (repo, revision) = match s.split_once('@') {
            Some((repo, revision)) => (repo, Some(revision)),
            None => (s, None),
        };
        if repo.is_empty() || revision.is_some_and(str::is_empty) {
            return Err(format!("Invalid model id: '{s}'"));
        }
        let model = HubModel::new(repo);
        Ok(match revision {
            Some(revision) => model.at_revision(revision),
            None => model,
        })
    }
}

impl crate::pipelines::cache::ModelOptions for HubModel {
    fn cache_key(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sentiment_is_pinned() {
        let model = HubModel::default_sentiment();
        assert_eq!(
            model.to_string(),
            "distilbert/distilbert-base-uncased-finetuned-sst-2-english@714eb0f"
        );
    }

    #[test]
    fn parses_repo_with_and_without_revision() {
        let plain: HubModel = "j-hartmann/emotion-english-distilroberta-base".parse().unwrap();
        assert_eq!(plain, HubModel::english_emotion());

        let pinned: HubModel = "owner/name@v1.0".parse().unwrap();
        assert_eq!(pinned.repo, "owner/name");
        assert_eq!(pinned.revision.as_deref(), Some("v1.0"));
    }

    #[test]
    fn architecture_from_model_type() {
        assert_eq!(
            Architecture::from_model_type("distilbert"),
            Some(Architecture::DistilBert)
        );
        assert_eq!(
            Architecture::from_model_type("roberta"),
            Some(Architecture::Roberta)
        );
        assert_eq!(
            Architecture::from_model_type("xlm-roberta"),
            Some(Architecture::Roberta)
        );
        assert_eq!(Architecture::from_model_type("modernbert"), None);
    }

    #[test]
    fn rejects_empty_parts() {
        assert!("".parse::<HubModel>().is_err());
        assert!("owner/name@".parse::<HubModel>().is_err());
        assert!("@abc".parse::<HubModel>().is_err());
    }

    #[test]
    fn revision_is_omitted_from_json_when_unset() {
        let json = serde_json::to_string(&HubModel::english_emotion()).unwrap();
        assert_eq!(
            json,
            r#"{"repo":"j-hartmann/emotion-english-distilroberta-base"}"#
        );
    }
}

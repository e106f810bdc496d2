use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use serde::Deserialize;
use tokenizers::models::bpe::BPE;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::pre_tokenizers::byte_level::ByteLevel;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::processors::roberta::RobertaProcessing;
use tokenizers::{
    DecoderWrapper, ModelWrapper, NormalizerWrapper, PostProcessorWrapper, PreTokenizerWrapper,
    Tokenizer, TokenizerBuilder, TruncationParams,
};

use crate::error::{PipelineError, Result};
use crate::models::HubModel;

const MAX_DOWNLOAD_ATTEMPTS: u32 = 3;

/// Resolves one file of a Hub checkpoint to a local path, downloading it on a cache miss.
#[derive(Debug, Clone)]
pub struct HfLoader {
    pub model: HubModel,
    pub filename: String,
}

impl HfLoader {
    pub fn new(model: &HubModel, filename: &str) -> Self {
        Self {
            model: model.clone(),
            filename: filename.into(),
        }
    }

    pub fn load(&self) -> Result<PathBuf> {
        let hf_api = ApiBuilder::new().with_progress(false).build().map_err(|e| {
            PipelineError::Download(format!("Failed to initialize HuggingFace API: {e}"))
        })?;

        let repo = match &self.model.revision {
            Some(revision) => {
                Repo::with_revision(self.model.repo.clone(), RepoType::Model, revision.clone())
            }
            None => Repo::model(self.model.repo.clone()),
        };
        let hf_repo = hf_api.repo(repo);

        let mut attempts = 0u32;

        for attempt in 0..MAX_DOWNLOAD_ATTEMPTS {
            attempts = attempt + 1;
            match hf_repo.get(&self.filename) {
                Ok(path) => {
                    tracing::debug!(file = %self.filename, model = %self.model, "resolved {}", path.display());
                    return Ok(path);
                }
                Err(e) => {
                    let error_msg = e.to_string();
                    // Another process is filling the same cache entry.
                    if error_msg.contains("Lock acquisition failed")
                        && attempt < MAX_DOWNLOAD_ATTEMPTS - 1
                    {
                        let wait_time = Duration::from_millis(100 * (1 << attempt));
                        tracing::warn!(
                            file = %self.filename,
                            "hub cache locked, retrying in {}ms",
                            wait_time.as_millis()
                        );
                        std::thread::sleep(wait_time);
                        continue;
                    }
                    return Err(PipelineError::Download(format!(
                        "Failed to download '{}' from '{}': {}",
                        self.filename, self.model, error_msg
                    )));
                }
            }
        }

        Err(PipelineError::Download(format!(
            "Download timed out for '{}' from '{}' after {} attempt(s)",
            self.filename, self.model, attempts
        )))
    }
}

/// How to assemble a tokenizer when a checkpoint ships no `tokenizer.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerFamily {
    /// BERT-style WordPiece from `vocab.txt`.
    WordPiece,
    /// RoBERTa-style byte-level BPE from `vocab.json` and `merges.txt`.
    ByteLevelBpe,
}

#[derive(Deserialize)]
struct TokenizerSettings {
    #[serde(default = "default_lowercase")]
    do_lower_case: bool,
}

fn default_lowercase() -> bool {
    true
}

#[derive(Clone)]
pub struct TokenizerLoader {
    pub model: HubModel,
    pub family: TokenizerFamily,
    pub max_length: usize,
}

impl TokenizerLoader {
    pub fn new(model: &HubModel, family: TokenizerFamily, max_length: usize) -> Self {
        Self {
            model: model.clone(),
            family,
            max_length,
        }
    }

    /// Uses `tokenizer.json` when published, otherwise builds from the slow-tokenizer files.
    pub fn load(&self) -> Result<Tokenizer> {
        let mut tokenizer = match HfLoader::new(&self.model, "tokenizer.json").load() {
            Ok(path) => Tokenizer::from_file(&path).map_err(|e| {
                PipelineError::Tokenization(format!(
                    "Failed to load tokenizer from '{}': {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) => {
                tracing::debug!(model = %self.model, error = %e, "no tokenizer.json, assembling {:?}", self.family);
                self.assemble()?
            }
        };

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: self.max_length,
                ..Default::default()
            }))
            .map_err(|e| {
                PipelineError::Tokenization(format!(
                    "Failed to configure truncation for '{}': {}",
                    self.model, e
                ))
            })?;

        Ok(tokenizer)
    }

    fn assemble(&self) -> Result<Tokenizer> {
        match self.family {
            TokenizerFamily::WordPiece => {
                let vocab = HfLoader::new(&self.model, "vocab.txt").load()?;
                let lowercase = HfLoader::new(&self.model, "tokenizer_config.json")
                    .load()
                    .ok()
                    .and_then(|path| std::fs::read_to_string(path).ok())
                    .and_then(|raw| serde_json::from_str::<TokenizerSettings>(&raw).ok())
                    .map_or(true, |settings| settings.do_lower_case);
                wordpiece_tokenizer(&vocab, lowercase)
            }
            TokenizerFamily::ByteLevelBpe => {
                let vocab = HfLoader::new(&self.model, "vocab.json").load()?;
                let merges = HfLoader::new(&self.model, "merges.txt").load()?;
                byte_level_bpe_tokenizer(&vocab, &merges)
            }
        }
    }
}

type WrappedBuilder = TokenizerBuilder<
    ModelWrapper,
    NormalizerWrapper,
    PreTokenizerWrapper,
    PostProcessorWrapper,
    DecoderWrapper,
>;

fn utf8_path(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        PipelineError::Tokenization(format!("Non UTF-8 tokenizer path '{}'", path.display()))
    })
}

fn tokenizer_error(what: &str) -> impl Fn(tokenizers::Error) -> PipelineError + '_ {
    move |e| PipelineError::Tokenization(format!("Failed to build {what} tokenizer: {e}"))
}

/// BERT uncased/cased tokenizer: `[CLS] ... [SEP]` around WordPiece pieces.
pub(crate) fn wordpiece_tokenizer(vocab_path: &Path, lowercase: bool) -> Result<Tokenizer> {
    let vocab = WordPiece::read_file(utf8_path(vocab_path)?).map_err(tokenizer_error("WordPiece"))?;
    let special = |token: &str| {
        vocab.get(token).copied().ok_or_else(|| {
            PipelineError::Tokenization(format!("'{token}' missing from {}", vocab_path.display()))
        })
    };
    let cls = special("[CLS]")?;
    let sep = special("[SEP]")?;
    special("[UNK]")?;

    let model = WordPiece::builder()
        .vocab(vocab)
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(tokenizer_error("WordPiece"))?;

    let tokenizer = WrappedBuilder::new()
        .with_model(model.into())
        .with_normalizer(Some(BertNormalizer::new(true, true, None, lowercase).into()))
        .with_pre_tokenizer(Some(BertPreTokenizer.into()))
        .with_post_processor(Some(
            BertProcessing::new(("[SEP]".to_string(), sep), ("[CLS]".to_string(), cls)).into(),
        ))
        .build()
        .map_err(tokenizer_error("WordPiece"))?;

    Ok(Tokenizer::from(tokenizer))
}

/// RoBERTa tokenizer: `<s> ... </s>` around byte-level BPE pieces.
pub(crate) fn byte_level_bpe_tokenizer(vocab_path: &Path, merges_path: &Path) -> Result<Tokenizer> {
    let (vocab, merges) = BPE::read_file(utf8_path(vocab_path)?, utf8_path(merges_path)?)
        .map_err(tokenizer_error("BPE"))?;
    let special = |token: &str| {
        vocab.get(token).copied().ok_or_else(|| {
            PipelineError::Tokenization(format!("'{token}' missing from {}", vocab_path.display()))
        })
    };
    let cls = special("<s>")?;
    let sep = special("</s>")?;

    let model = BPE::builder()
        .vocab_and_merges(vocab, merges)
        .build()
        .map_err(tokenizer_error("BPE"))?;

    let tokenizer = WrappedBuilder::new()
        .with_model(model.into())
        .with_pre_tokenizer(Some(ByteLevel::default().add_prefix_space(false).into()))
        .with_post_processor(Some(
            RobertaProcessing::new(("</s>".to_string(), sep), ("<s>".to_string(), cls))
                .trim_offsets(true)
                .add_prefix_space(false)
                .into(),
        ))
        .with_decoder(Some(ByteLevel::default().into()))
        .build()
        .map_err(tokenizer_error("BPE"))?;

    Ok(Tokenizer::from(tokenizer))
}

#[derive(Deserialize)]
struct RawClassifierConfig {
    #[serde(default)]
    model_type: Option<String>,
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// A checkpoint's `config.json`, kept raw so each architecture can parse its own `Config`.
pub struct CheckpointConfig {
    pub raw: String,
    pub model_type: Option<String>,
    pub id2label: HashMap<String, String>,
}

pub struct CheckpointConfigLoader {
    pub config_file_loader: HfLoader,
}

impl CheckpointConfigLoader {
    pub fn new(model: &HubModel) -> Self {
        Self {
            config_file_loader: HfLoader::new(model, "config.json"),
        }
    }

    pub fn load(&self) -> Result<CheckpointConfig> {
        let config_path = self.config_file_loader.load()?;
        let raw = std::fs::read_to_string(config_path)?;
        let parsed: RawClassifierConfig = serde_json::from_str(&raw)?;

        Ok(CheckpointConfig {
            raw,
            model_type: parsed.model_type,
            id2label: parsed.id2label,
        })
    }
}

/// Prefers `model.safetensors`, falls back to `pytorch_model.bin`.
pub struct WeightsLoader {
    pub safetensors_loader: HfLoader,
    pub pytorch_loader: HfLoader,
}

impl WeightsLoader {
    pub fn new(model: &HubModel) -> Self {
        Self {
            safetensors_loader: HfLoader::new(model, "model.safetensors"),
            pytorch_loader: HfLoader::new(model, "pytorch_model.bin"),
        }
    }

    pub fn load(&self, device: &Device) -> Result<VarBuilder<'static>> {
        let weights_path = self
            .safetensors_loader
            .load()
            .or_else(|_| self.pytorch_loader.load())?;
        let path_str = weights_path.display().to_string();

        let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device) }
        } else {
            VarBuilder::from_pth(&weights_path, DType::F32, device)
        };

        vb.map_err(|e| {
            PipelineError::ModelLoad(format!("Failed to read weights from '{path_str}': {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn wordpiece_from_vocab_txt() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = fixture(
            &dir,
            "vocab.txt",
            "[PAD]\n[UNK]\n[CLS]\n[SEP]\nhello\nworld\n##s\n",
        );

        let tokenizer = wordpiece_tokenizer(&vocab, true).unwrap();
        let encoding = tokenizer.encode("Hello worlds zebra", true).unwrap();
        assert_eq!(encoding.get_ids(), &[2, 4, 5, 6, 1, 3]);
        assert_eq!(encoding.get_attention_mask(), &[1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn wordpiece_needs_special_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = fixture(&dir, "vocab.txt", "hello\nworld\n");

        let err = wordpiece_tokenizer(&vocab, true).unwrap_err();
        assert!(matches!(err, PipelineError::Tokenization(_)));
    }

    #[test]
    fn byte_level_bpe_from_vocab_and_merges() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = fixture(
            &dir,
            "vocab.json",
            r#"{"<s>":0,"<pad>":1,"</s>":2,"<unk>":3,"a":4,"b":5,"ab":6,"Ġ":7,"Ġab":8,"Ġa":9}"#,
        );
        let merges = fixture(&dir, "merges.txt", "#version: 0.2\nĠ a\nĠa b\na b\n");

        let tokenizer = byte_level_bpe_tokenizer(&vocab, &merges).unwrap();
        let encoding = tokenizer.encode("ab ab", true).unwrap();
        assert_eq!(encoding.get_ids(), &[0, 6, 8, 2]);
    }
}

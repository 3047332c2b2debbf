//! Tiny on-disk cross-encoders for exercising the real inference path.
//!
//! Weights are random; tests compare the model against itself (batched vs
//! single, repeated calls), never against reference scores.

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::xlm_roberta::{
    Config as XlmRobertaConfig, XLMRobertaForSequenceClassification,
};
use std::path::Path;
use tempfile::TempDir;

use super::classifier::Architecture;
use super::loader::{CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE};

pub const HIDDEN_SIZE: usize = 16;
pub const MAX_POSITIONS: usize = 514;

const SPECIAL_TOKENS: [&str; 4] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]"];

pub const WORDS: [&str; 20] = [
    "what", "is", "a", "the", "panda", "giant", "bear", "bamboo", "china", "python", "rust",
    "language", "programming", "memory", "safety", "borrow", "checker", "compiler", "cute",
    "animals",
];

fn vocab() -> serde_json::Map<String, serde_json::Value> {
    SPECIAL_TOKENS
        .iter()
        .chain(WORDS.iter())
        .enumerate()
        .map(|(id, token)| (token.to_string(), serde_json::json!(id)))
        .collect()
}

/// BERT-style pair tokenizer: lowercase, whitespace split, word-level vocab,
/// `[CLS] A [SEP] B [SEP]` with segment ids.
pub fn tokenizer_json() -> serde_json::Value {
    let special = |token: &str, type_id: u32| {
        serde_json::json!({"SpecialToken": {"id": token, "type_id": type_id}})
    };
    let sequence = |id: &str, type_id: u32| {
        serde_json::json!({"Sequence": {"id": id, "type_id": type_id}})
    };

    serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": {"type": "Lowercase"},
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": {
            "type": "TemplateProcessing",
            "single": [special("[CLS]", 0), sequence("A", 0), special("[SEP]", 0)],
            "pair": [
                special("[CLS]", 0),
                sequence("A", 0),
                special("[SEP]", 0),
                sequence("B", 1),
                special("[SEP]", 1)
            ],
            "special_tokens": {
                "[CLS]": {"id": "[CLS]", "ids": [2], "tokens": ["[CLS]"]},
                "[SEP]": {"id": "[SEP]", "ids": [3], "tokens": ["[SEP]"]}
            }
        },
        "decoder": null,
        "model": {"type": "WordLevel", "vocab": vocab(), "unk_token": "[UNK]"}
    })
}

pub fn config_json(architecture: Architecture) -> serde_json::Value {
    let vocab_size = SPECIAL_TOKENS.len() + WORDS.len();
    match architecture {
        Architecture::Bert => serde_json::json!({
            "model_type": "bert",
            "vocab_size": vocab_size,
            "hidden_size": HIDDEN_SIZE,
            "num_hidden_layers": 1,
            "num_attention_heads": 2,
            "intermediate_size": 32,
            "hidden_act": "gelu",
            "hidden_dropout_prob": 0.0,
            "max_position_embeddings": MAX_POSITIONS,
            "type_vocab_size": 2,
            "initializer_range": 0.02,
            "layer_norm_eps": 1e-12,
            "pad_token_id": 0
        }),
        Architecture::XlmRoberta => serde_json::json!({
            "model_type": "xlm-roberta",
            "vocab_size": vocab_size,
            "hidden_size": HIDDEN_SIZE,
            "num_hidden_layers": 1,
            "num_attention_heads": 2,
            "intermediate_size": 32,
            "hidden_act": "gelu",
            "hidden_dropout_prob": 0.0,
            "attention_probs_dropout_prob": 0.0,
            "position_embedding_type": "absolute",
            "max_position_embeddings": MAX_POSITIONS,
            "type_vocab_size": 2,
            "layer_norm_eps": 1e-5,
            "pad_token_id": 0
        }),
    }
}

fn write_weights(
    architecture: Architecture,
    config: &serde_json::Value,
    path: &Path,
) -> candle_core::Result<()> {
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);

    match architecture {
        Architecture::Bert => {
            let config: BertConfig = serde_json::from_value(config.clone())
                .map_err(|e| candle_core::Error::Msg(e.to_string()))?;
            BertModel::load(vb.pp("bert"), &config)?;
            candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;
        }
        Architecture::XlmRoberta => {
            let config: XlmRobertaConfig = serde_json::from_value(config.clone())
                .map_err(|e| candle_core::Error::Msg(e.to_string()))?;
            XLMRobertaForSequenceClassification::new(1, &config, vb)?;
        }
    }

    varmap.save(path)
}

/// Writes `config.json`, `tokenizer.json` and random `model.safetensors`
/// into a fresh directory laid out like a hub snapshot.
pub fn model_dir(architecture: Architecture) -> TempDir {
    let dir = TempDir::new().unwrap();
    let config = config_json(architecture);

    std::fs::write(
        dir.path().join(CONFIG_FILE),
        serde_json::to_string_pretty(&config).unwrap(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join(TOKENIZER_FILE),
        serde_json::to_string_pretty(&tokenizer_json()).unwrap(),
    )
    .unwrap();
    write_weights(architecture, &config, &dir.path().join(WEIGHTS_FILE)).unwrap();

    dir
}

/// Only the tokenizer, for tests that never touch weights.
pub fn tokenizer_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(TOKENIZER_FILE),
        serde_json::to_string(&tokenizer_json()).unwrap(),
    )
    .unwrap();
    dir
}

/// A document of `words` vocabulary words, cycling through the vocabulary.
pub fn long_document(words: usize) -> String {
    WORDS
        .iter()
        .cycle()
        .take(words)
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

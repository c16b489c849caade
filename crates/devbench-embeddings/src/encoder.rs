use ndarray::Array2;
use std::path::Path;
use tokenizers::tokenizer::Tokenizer;
use tokenizers::TruncationParams;

use crate::error::{EmbedError, Result};

/// Default maximum sequence length for sentence transformers
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// Token tensors for a batch, padded to a common width.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBatch {
    pub input_ids: Array2<i64>,
    pub attention_mask: Array2<i64>,
    pub token_type_ids: Array2<i64>,
}

impl EncodedBatch {
    pub fn batch_size(&self) -> usize {
        self.input_ids.nrows()
    }

    pub fn seq_len(&self) -> usize {
        self.input_ids.ncols()
    }
}

/// Unpadded encoding of one text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenRow {
    pub ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub type_ids: Vec<u32>,
}

/// Turns a batch of texts into model inputs.
pub trait TextEncoder {
    fn encode_batch(&self, texts: &[String]) -> Result<EncodedBatch>;

    /// Longest token sequence a single text is cut to.
    fn max_length(&self) -> usize;
}

/// Builds encoders from a tokenizer file.
pub trait EncoderLoader {
    fn load(&self, tokenizer_file: &Path) -> Result<Box<dyn TextEncoder>>;
}

/// HuggingFace tokenizer for the embedding model
pub struct HfEncoder {
    tokenizer: Tokenizer,
    max_length: usize,
}

impl HfEncoder {
    /// Load tokenizer from a JSON file
    pub fn from_file(path: impl AsRef<Path>, max_length: usize) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EmbedError::TokenizerLoad(format!(
                "tokenizer file not found: {}",
                path.display()
            )));
        }

        let mut tokenizer = Tokenizer::from_file(path)
            .map_err(|e| EmbedError::TokenizerLoad(e.to_string()))?;

        // Truncate inside the tokenizer so special tokens survive
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..TruncationParams::default()
            }))
            .map_err(|e| EmbedError::TokenizerLoad(e.to_string()))?;
        // Padding from tokenizer.json (often Fixed) is ignored; pad_batch
        // pads to the longest row
        tokenizer.with_padding(None);

        Ok(Self {
            tokenizer,
            max_length,
        })
    }
}

impl TextEncoder for HfEncoder {
    fn encode_batch(&self, texts: &[String]) -> Result<EncodedBatch> {
        // Encode with special tokens (CLS and SEP) automatically added
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbedError::Tokenization(e.to_string()))?;

        let rows: Vec<TokenRow> = encodings
            .iter()
            .map(|e| TokenRow {
                ids: e.get_ids().to_vec(),
                attention_mask: e.get_attention_mask().to_vec(),
                type_ids: e.get_type_ids().to_vec(),
            })
            .collect();

        pad_batch(&rows, self.max_length)
    }

    fn max_length(&self) -> usize {
        self.max_length
    }
}

/// Loads [`HfEncoder`]s with a fixed maximum length.
#[derive(Debug, Clone)]
pub struct HfEncoderLoader {
    pub max_length: usize,
}

impl Default for HfEncoderLoader {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl EncoderLoader for HfEncoderLoader {
    fn load(&self, tokenizer_file: &Path) -> Result<Box<dyn TextEncoder>> {
        Ok(Box::new(HfEncoder::from_file(tokenizer_file, self.max_length)?))
    }
}

/// Pads rows to the longest one (capped at `max_length`).
///
/// Padding positions get id 0 and mask 0. Rows longer than `max_length` are
/// cut.
pub fn pad_batch(rows: &[TokenRow], max_length: usize) -> Result<EncodedBatch> {
    let width = rows
        .iter()
        .map(|r| r.ids.len())
        .max()
        .unwrap_or(0)
        .min(max_length);

    if rows.is_empty() || width == 0 {
        return Err(EmbedError::Tokenization(
            "batch produced no tokens".to_string(),
        ));
    }

    let mut input_ids = Array2::<i64>::zeros((rows.len(), width));
    let mut attention_mask = Array2::<i64>::zeros((rows.len(), width));
    let mut token_type_ids = Array2::<i64>::zeros((rows.len(), width));

    for (i, row) in rows.iter().enumerate() {
        let len = row.ids.len().min(width);
        for j in 0..len {
            input_ids[[i, j]] = row.ids[j] as i64;
            attention_mask[[i, j]] = row.attention_mask.get(j).copied().unwrap_or(1) as i64;
            token_type_ids[[i, j]] = row.type_ids.get(j).copied().unwrap_or(0) as i64;
        }
    }

    Ok(EncodedBatch {
        input_ids,
        attention_mask,
        token_type_ids,
    })
}

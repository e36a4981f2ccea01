//! Synchronous ONNX embedding engine for text-to-vector conversion.
//!
//! Defaults to the bge-small-en-v1.5 model (384 dimensions) with mean pooling
//! and L2 normalization.

use hf_hub::api::sync::Api;
use ort::inputs;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

use super::{Embedder, EmbeddingError, l2_normalize};

/// HuggingFace model used when none is configured.
pub const DEFAULT_MODEL_ID: &str = "BAAI/bge-small-en-v1.5";

const MAX_SEQUENCE_LENGTH: usize = 512;

/// ONNX embedding engine for synchronous text-to-vector conversion.
pub struct OnnxEmbedder {
    session: Session,
    tokenizer: Tokenizer,
    requires_token_type_ids: bool,
}

impl OnnxEmbedder {
    /// Load model from cache or download on first use.
    ///
    /// Uses `hf_hub::api::sync::Api` with the ureq feature for blocking I/O.
    /// Files are cached locally in the HF Hub cache and only downloaded once.
    pub fn new(model_id: &str) -> Result<Self, EmbeddingError> {
        let api = Api::new()?;
        let repo = api.model(model_id.to_string());

        let model_path = repo
            .get("onnx/model.onnx")
            .or_else(|_| repo.get("model.onnx"))?;
        let tokenizer_path = repo.get("tokenizer.json")?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)?;
        // Batches are padded to their longest member.
        tokenizer
            .with_padding(Some(PaddingParams::default()))
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))?;

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level1)
            .map_err(ort::Error::from)?
            .commit_from_file(&model_path)?;

        let requires_token_type_ids = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");

        tracing::debug!(model_id, requires_token_type_ids, "loaded ONNX embedding model");

        Ok(OnnxEmbedder {
            session,
            tokenizer,
            requires_token_type_ids,
        })
    }

    /// Run one padded forward pass over non-empty texts.
    fn run_batch(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encodings = self.tokenizer.encode_batch(texts.to_vec(), true)?;
        let batch_size = encodings.len();
        let seq_len = encodings.first().map(|e| e.get_ids().len()).unwrap_or(0);

        if batch_size == 0 || seq_len == 0 {
            return Err(EmbeddingError::Inference(
                "Tokenizer produced no tokens".to_string(),
            ));
        }

        let mut input_ids = Vec::with_capacity(batch_size * seq_len);
        let mut attention_mask = Vec::with_capacity(batch_size * seq_len);
        for encoding in &encodings {
            if encoding.get_ids().len() != seq_len {
                return Err(EmbeddingError::Inference(format!(
                    "Unpadded batch: expected {} tokens, got {}",
                    seq_len,
                    encoding.get_ids().len()
                )));
            }
            input_ids.extend(encoding.get_ids().iter().map(|&id| id as i64));
            attention_mask.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
        }
        let mask = attention_mask.clone();

        let input_ids_tensor = Tensor::from_array(([batch_size, seq_len], input_ids))?;
        let attention_mask_tensor = Tensor::from_array(([batch_size, seq_len], attention_mask))?;

        let outputs = if self.requires_token_type_ids {
            let token_type_ids = vec![0i64; batch_size * seq_len];
            let token_type_ids_tensor = Tensor::from_array(([batch_size, seq_len], token_type_ids))?;
            self.session.run(inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            ])?
        } else {
            self.session.run(inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor
            ])?
        };

        let (shape, data) = outputs
            .get("last_hidden_state")
            .or_else(|| outputs.get("token_embeddings"))
            .ok_or_else(|| {
                EmbeddingError::Inference(
                    "Output tensor 'last_hidden_state' or 'token_embeddings' not found".to_string(),
                )
            })?
            .try_extract_tensor::<f32>()?;

        if shape.len() != 3 || shape[0] as usize != batch_size || shape[1] as usize != seq_len {
            return Err(EmbeddingError::Inference(format!(
                "Expected output (batch={}, seq_len={}, hidden), got {:?}",
                batch_size, seq_len, shape
            )));
        }
        let hidden_dim = shape[2] as usize;

        Ok(data
            .chunks(seq_len * hidden_dim)
            .zip(mask.chunks(seq_len))
            .map(|(tokens, mask)| l2_normalize(&mean_pool(tokens, mask, hidden_dim)))
            .collect())
    }
}

impl Embedder for OnnxEmbedder {
    fn embed_one(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_many(&[text.to_string()])?;
        vectors.pop().ok_or(EmbeddingError::CountMismatch {
            expected: 1,
            actual: 0,
        })
    }

    /// Empty strings map to a zero vector; everything else goes through a
    /// single padded batch. Texts over 512 tokens are truncated.
    fn embed_many(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let non_empty: Vec<&str> = texts
            .iter()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .collect();

        let mut computed = if non_empty.is_empty() {
            Vec::new()
        } else {
            self.run_batch(&non_empty)?
        }
        .into_iter();

        let mut dims = None;
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            if text.is_empty() {
                vectors.push(None);
            } else {
                let vector = computed.next().ok_or(EmbeddingError::CountMismatch {
                    expected: non_empty.len(),
                    actual: vectors.iter().filter(|v| v.is_some()).count(),
                })?;
                dims = Some(vector.len());
                vectors.push(Some(vector));
            }
        }

        let dims = match dims {
            Some(d) => d,
            // All inputs empty: the model's width is unknown without a forward pass.
            None => self.run_batch(&[" "])?.first().map(Vec::len).unwrap_or(0),
        };

        Ok(vectors
            .into_iter()
            .map(|v| v.unwrap_or_else(|| vec![0.0f32; dims]))
            .collect())
    }
}

/// Attention-masked mean over token embeddings.
fn mean_pool(tokens: &[f32], mask: &[i64], hidden_dim: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden_dim];

    for (chunk, &mask_value) in tokens.chunks(hidden_dim).zip(mask.iter()) {
        let mask_value = mask_value as f32;
        for (pooled_value, &x) in pooled.iter_mut().zip(chunk.iter()) {
            *pooled_value += x * mask_value;
        }
    }

    let mask_sum: f32 = mask.iter().map(|&m| m as f32).sum::<f32>().max(1e-9);
    for value in pooled.iter_mut() {
        *value /= mask_sum;
    }

    pooled
}

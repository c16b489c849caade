//! Attention-masked mean pooling.

use ndarray::{s, ArrayView2, ArrayView3};

use crate::error::{EmbedError, Result};

/// Lower bound on the mask sum, so an all-padding row yields zeros.
const MIN_MASK_SUM: f32 = 1e-9;

/// Collapse `[batch, seq, hidden]` token states into one vector per row,
/// averaging only positions where `attention_mask` is non-zero.
pub fn mean_pool(hidden: ArrayView3<f32>, attention_mask: ArrayView2<i64>) -> Result<Vec<Vec<f32>>> {
    let (batch, seq_len, _) = hidden.dim();
    if attention_mask.dim() != (batch, seq_len) {
        return Err(EmbedError::Inference(format!(
            "attention mask shape {:?} does not match hidden states {:?}",
            attention_mask.dim(),
            hidden.dim()
        )));
    }

    let mut pooled = Vec::with_capacity(batch);
    for i in 0..batch {
        let tokens = hidden.slice(s![i, .., ..]);
        let mask = attention_mask.row(i).mapv(|m| m as f32);

        let sum = tokens.t().dot(&mask);
        let count = mask.sum().max(MIN_MASK_SUM);

        pooled.push(sum.iter().map(|v| v / count).collect());
    }

    Ok(pooled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_mean_over_unmasked_tokens() {
        // One row, three tokens, last is padding
        let hidden = array![[[1.0, 2.0], [3.0, 4.0], [100.0, 100.0]]];
        let mask = array![[1, 1, 0]];
        let pooled = mean_pool(hidden.view(), mask.view()).unwrap();
        assert_eq!(pooled, vec![vec![2.0, 3.0]]);
    }

    #[test]
    fn test_rows_pooled_independently() {
        let hidden = array![
            [[1.0, 1.0], [3.0, 3.0]],
            [[5.0, -5.0], [9.0, 9.0]],
        ];
        let mask = array![[1, 1], [1, 0]];
        let pooled = mean_pool(hidden.view(), mask.view()).unwrap();
        assert_eq!(pooled, vec![vec![2.0, 2.0], vec![5.0, -5.0]]);
    }

    #[test]
    fn test_all_padding_row_is_zero() {
        let hidden = array![[[4.0, 4.0]]];
        let mask = array![[0]];
        let pooled = mean_pool(hidden.view(), mask.view()).unwrap();
        assert_eq!(pooled, vec![vec![0.0, 0.0]]);
    }

    #[test]
    fn test_shape_mismatch() {
        let hidden = Array3::<f32>::zeros((2, 3, 4));
        let mask = array![[1, 1, 1]];
        assert!(mean_pool(hidden.view(), mask.view()).is_err());
    }
}

//! Next-token selection from a logits row.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::config::GenerationConfig;
use crate::error::{GenerateError, Result};

/// Pick the next token id from the logits of the last position.
///
/// Greedy when `config.do_sample` is false, otherwise temperature-scaled
/// top-k sampling using `rng`.
pub fn select_next_token<R: Rng + ?Sized>(
    logits: &[f32],
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<u32> {
    if config.do_sample {
        sample_top_k(logits, config.temperature, config.top_k, rng)
    } else {
        argmax(logits)
    }
}

/// Index of the largest finite logit. Ties go to the lowest index.
pub fn argmax(logits: &[f32]) -> Result<u32> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &value) in logits.iter().enumerate() {
        if !value.is_finite() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((i, value)),
        }
    }

    best.map(|(i, _)| i as u32)
        .ok_or_else(|| GenerateError::Inference("logits contain no finite values".to_string()))
}

fn sample_top_k<R: Rng + ?Sized>(
    logits: &[f32],
    temperature: f32,
    top_k: usize,
    rng: &mut R,
) -> Result<u32> {
    let mut candidates: Vec<(usize, f32)> = logits
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .collect();

    if candidates.is_empty() {
        return Err(GenerateError::Inference(
            "logits contain no finite values".to_string(),
        ));
    }

    // Stable sort keeps index order among equal logits
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    if top_k > 0 && candidates.len() > top_k {
        candidates.truncate(top_k);
    }

    let max = candidates[0].1;
    let weights: Vec<f32> = candidates
        .iter()
        .map(|(_, v)| ((v - max) / temperature).exp())
        .collect();

    let dist = WeightedIndex::new(&weights)
        .map_err(|e| GenerateError::Inference(format!("invalid sampling weights: {}", e)))?;

    Ok(candidates[dist.sample(rng)].0 as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 2.5, -1.0, 2.4]).unwrap(), 1);
    }

    #[test]
    fn test_argmax_ties_resolve_to_lowest_index() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 3.0]).unwrap(), 1);
    }

    #[test]
    fn test_argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, 0.5, f32::NAN]).unwrap(), 1);
    }

    #[test]
    fn test_argmax_empty_fails() {
        assert!(argmax(&[]).is_err());
        assert!(argmax(&[f32::NAN]).is_err());
    }

    #[test]
    fn test_greedy_ignores_rng() {
        let config = GenerationConfig::greedy(10);
        let logits = [0.2, 0.9, 0.1];
        let mut a = StdRng::seed_from_u64(1);
        let mut b = StdRng::seed_from_u64(999);
        assert_eq!(
            select_next_token(&logits, &config, &mut a).unwrap(),
            select_next_token(&logits, &config, &mut b).unwrap()
        );
    }

    #[test]
    fn test_top_k_one_is_greedy() {
        let config = GenerationConfig {
            do_sample: true,
            top_k: 1,
            ..GenerationConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(
                select_next_token(&[0.0, 5.0, 4.9], &config, &mut rng).unwrap(),
                1
            );
        }
    }

    #[test]
    fn test_sampling_stays_within_top_k() {
        let config = GenerationConfig {
            do_sample: true,
            top_k: 2,
            ..GenerationConfig::default()
        };
        let logits = [1.0, 0.0, 3.0, 2.9, -4.0];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let token = select_next_token(&logits, &config, &mut rng).unwrap();
            assert!(token == 2 || token == 3, "unexpected token {}", token);
        }
    }

    #[test]
    fn test_sampling_same_seed_same_sequence() {
        let config = GenerationConfig {
            do_sample: true,
            top_k: 0,
            ..GenerationConfig::default()
        };
        let logits = [0.5, 0.4, 0.3, 0.2, 0.1];
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..16)
                .map(|_| select_next_token(&logits, &config, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(11), draw(11));
    }
}

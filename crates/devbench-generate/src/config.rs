//! Generation configuration shared across a run.

use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, Result};

/// Decoding options for one run. Built once, then only borrowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound on newly generated tokens
    pub max_new_tokens: usize,
    /// `false` selects greedy decoding
    pub do_sample: bool,
    /// Softmax temperature, only used when sampling
    pub temperature: f32,
    /// Candidates kept before sampling (0 = whole vocabulary)
    pub top_k: usize,
    /// Seed for the sampling RNG, reset on every generate call
    pub seed: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 100,
            do_sample: false,
            temperature: 1.0,
            top_k: 50,
            seed: 42,
        }
    }
}

impl GenerationConfig {
    /// Deterministic greedy decoding capped at `max_new_tokens`.
    pub fn greedy(max_new_tokens: usize) -> Self {
        Self {
            max_new_tokens,
            do_sample: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_new_tokens == 0 {
            return Err(GenerateError::InvalidConfig(
                "max_new_tokens must be at least 1".to_string(),
            ));
        }
        if self.do_sample && !(self.temperature > 0.0) {
            return Err(GenerateError::InvalidConfig(format!(
                "temperature must be positive when sampling, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_greedy_hundred_tokens() {
        let config = GenerationConfig::default();
        assert_eq!(config.max_new_tokens, 100);
        assert!(!config.do_sample);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_greedy_constructor() {
        let config = GenerationConfig::greedy(50);
        assert_eq!(config.max_new_tokens, 50);
        assert!(!config.do_sample);
    }

    #[test]
    fn test_zero_tokens_rejected() {
        assert!(GenerationConfig::greedy(0).validate().is_err());
    }

    #[test]
    fn test_sampling_requires_positive_temperature() {
        let config = GenerationConfig {
            do_sample: true,
            temperature: 0.0,
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());

        // Temperature is ignored for greedy decoding
        let greedy = GenerationConfig {
            temperature: 0.0,
            ..GenerationConfig::default()
        };
        assert!(greedy.validate().is_ok());
    }
}

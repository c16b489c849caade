//! Embedded demonstration: multilingual sentences and similarity pairs.

use std::io::Write;

use crate::error::Result;
use crate::service::EmbeddingService;

pub const DEMO_TEXTS: [&str; 5] = [
    "El gato está en el tejado",
    "The cat is on the roof",
    "Python es un lenguaje de programación",
    "El perro corre por el parque",
    "Machine learning es fascinante",
];

/// (Spanish, English) same sentence; cat vs dog; Python vs ML
pub const DEMO_PAIRS: [(usize, usize); 3] = [(0, 1), (0, 3), (2, 4)];

/// Characters shown per sentence in the similarity listing.
const PREVIEW_CHARS: usize = 40;

pub fn run_demo(service: &EmbeddingService, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "Demo: embeddings on {}", service.device())?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out)?;

    let texts: Vec<String> = DEMO_TEXTS.iter().map(|t| t.to_string()).collect();

    writeln!(out, "Generating embeddings for {} texts...", texts.len())?;
    let batch = service.embed(&texts)?;
    writeln!(out, "Embeddings shape: ({}, {})", batch.len(), batch.dimensions())?;

    writeln!(out)?;
    writeln!(out, "Similarities:")?;
    for (i, j) in DEMO_PAIRS {
        let sim = service.similarity(DEMO_TEXTS[i], DEMO_TEXTS[j])?;
        writeln!(out, "  '{}...'", preview(DEMO_TEXTS[i]))?;
        writeln!(out, "  '{}...'", preview(DEMO_TEXTS[j]))?;
        writeln!(out, "  → Similarity: {:.3}", sim)?;
        writeln!(out)?;
    }

    Ok(())
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_is_char_safe() {
        // "á" and "ó" are multi-byte
        assert_eq!(preview("Python es un lenguaje de programación").chars().count(), 37);
        assert_eq!(preview(&"ñ".repeat(50)).chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn test_pairs_index_demo_texts() {
        for (i, j) in DEMO_PAIRS {
            assert!(i < DEMO_TEXTS.len() && j < DEMO_TEXTS.len());
        }
    }
}

//! Intent detection for `mode = auto` (spec §4.4 step 2).
//!
//! Deterministic and side-effect free: lexical cue matching, score
//! normalization into a probability distribution, then argmax. Ties are
//! broken by a fixed priority order (factual, conceptual, procedural,
//! balanced) so the same query always classifies the same way.

use rag_core::search::Intent;

/// `balanced` is the default outcome when no cue fires; giving it a small
/// base weight rather than special-casing "no matches" keeps the scoring
/// path uniform.
const BALANCED_BASE_WEIGHT: f64 = 0.1;

const FACTUAL_CUES: &[&str] = &["what is", "when", "who", "define"];
const CONCEPTUAL_CUES: &[&str] = &["why", "explain", "how does", "relate"];
const PROCEDURAL_CUES: &[&str] = &["how to", "steps", "implement", "build"];

/// Per-intent lexical cue scores before normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Scores {
    factual: f64,
    conceptual: f64,
    procedural: f64,
    balanced: f64,
}

fn score(query_lower: &str) -> Scores {
    let count = |cues: &[&str]| cues.iter().filter(|cue| query_lower.contains(*cue)).count() as f64;
    Scores {
        factual: count(FACTUAL_CUES),
        conceptual: count(CONCEPTUAL_CUES),
        procedural: count(PROCEDURAL_CUES),
        balanced: BALANCED_BASE_WEIGHT,
    }
}

/// Normalize raw cue scores into a probability distribution and return the
/// argmax, with ties broken in priority order (factual > conceptual >
/// procedural > balanced).
#[must_use]
pub fn detect_intent(query: &str) -> Intent {
    let scores = score(&query.to_lowercase());
    let total = scores.factual + scores.conceptual + scores.procedural + scores.balanced;

    // Normalizing is a no-op on the argmax (all four divide by the same
    // positive total) but keeps the contract ("normalize to a probability
    // distribution") literal and gives callers a meaningful distribution
    // if they want to inspect it later.
    let probabilities = [
        (Intent::Factual, scores.factual / total),
        (Intent::Conceptual, scores.conceptual / total),
        (Intent::Procedural, scores.procedural / total),
        (Intent::Balanced, scores.balanced / total),
    ];

    probabilities
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(intent, _)| intent)
        .unwrap_or(Intent::Balanced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedural_cues_select_procedural_intent() {
        let intent = detect_intent("how to implement a strategic plan");
        assert_eq!(intent, Intent::Procedural);
        assert_eq!(intent.hybrid_weights(), (0.6, 0.4));
    }

    #[test]
    fn conceptual_cues_select_conceptual_intent() {
        let intent = detect_intent("why does strategy fail in practice");
        assert_eq!(intent, Intent::Conceptual);
        assert_eq!(intent.hybrid_weights(), (0.8, 0.2));
    }

    #[test]
    fn factual_cues_select_factual_intent() {
        assert_eq!(detect_intent("what is strategy"), Intent::Factual);
        assert_eq!(detect_intent("who wrote this plan"), Intent::Factual);
    }

    #[test]
    fn no_cues_default_to_balanced() {
        assert_eq!(detect_intent("strategy execution"), Intent::Balanced);
    }

    #[test]
    fn detection_is_deterministic() {
        let query = "how to explain why strategy matters";
        assert_eq!(detect_intent(query), detect_intent(query));
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(detect_intent("WHY does this fail"), Intent::Conceptual);
    }
}

//! Dynamic batch sizing (spec §4.1).
//!
//! The effective batch size scales inversely with mean input length, and
//! is halved again when the caller is already close to the rate limit —
//! smaller batches fail (and get retried) cheaper than one large one.

/// Texts shorter than this (mean length) are considered "short".
const SHORT_THRESHOLD: usize = 500;
/// Texts longer than this (mean length) are considered "long".
const LONG_THRESHOLD: usize = 2000;

/// Compute the effective batch size for a set of input texts.
///
/// `base` is the configured baseline (e.g. 100), `min`/`max` clamp the
/// result (e.g. 10/200). `near_rate_limit` halves the result when the
/// caller has used at least 80% of its per-minute budget.
#[must_use]
pub fn effective_batch_size(
    texts: &[String],
    base: usize,
    min: usize,
    max: usize,
    near_rate_limit: bool,
) -> usize {
    if texts.is_empty() {
        return 0;
    }

    let mean_len = texts.iter().map(String::len).sum::<usize>() / texts.len();

    let mut size = if mean_len < SHORT_THRESHOLD {
        base.saturating_mul(2)
    } else if mean_len > LONG_THRESHOLD {
        base / 2
    } else {
        base
    };

    if near_rate_limit {
        size /= 2;
    }

    size.clamp(min.max(1), max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts_of_len(n: usize, len: usize) -> Vec<String> {
        (0..n).map(|_| "a".repeat(len)).collect()
    }

    #[test]
    fn short_texts_double_the_base() {
        let texts = texts_of_len(5, 100);
        assert_eq!(effective_batch_size(&texts, 100, 10, 200, false), 200);
    }

    #[test]
    fn medium_texts_use_the_base() {
        let texts = texts_of_len(5, 1000);
        assert_eq!(effective_batch_size(&texts, 100, 10, 200, false), 100);
    }

    #[test]
    fn long_texts_halve_the_base() {
        let texts = texts_of_len(5, 3000);
        assert_eq!(effective_batch_size(&texts, 100, 10, 200, false), 50);
    }

    #[test]
    fn near_rate_limit_halves_again() {
        let texts = texts_of_len(5, 1000);
        assert_eq!(effective_batch_size(&texts, 100, 10, 200, true), 50);
    }

    #[test]
    fn result_is_clamped_to_bounds() {
        let texts = texts_of_len(5, 3000);
        // base/2 = 5, below min of 10 -> clamped up
        assert_eq!(effective_batch_size(&texts, 10, 10, 200, false), 10);
    }

    #[test]
    fn empty_input_yields_zero() {
        assert_eq!(effective_batch_size(&[], 100, 10, 200, false), 0);
    }
}

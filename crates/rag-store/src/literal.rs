//! SQL literal helpers.
//!
//! `sqlx` has no native Postgres `vector` type without pulling in the
//! `pgvector` crate; the gateway instead formats the query vector as a
//! `pgvector` array literal and casts it server-side (`$1::vector`),
//! mirroring the teacher's `vec_to_sql` brute-force-array idiom
//! (`zen_search::vector`) adapted from a `DuckDB` array literal to a
//! `pgvector` one.

use std::fmt::Write as _;

/// Format a float slice as a `pgvector` array literal: `[0.1,0.2,...]`.
#[must_use]
pub fn vector_literal(v: &[f32]) -> String {
    let mut s = String::with_capacity(v.len() * 10 + 2);
    s.push('[');
    for (i, x) in v.iter().enumerate() {
        if i > 0 {
            s.push(',');
        }
        let _ = write!(s, "{x}");
    }
    s.push(']');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_bracketed_csv() {
        assert_eq!(vector_literal(&[1.0, 0.5, -2.0]), "[1,0.5,-2]");
    }

    #[test]
    fn empty_vector_is_empty_brackets() {
        assert_eq!(vector_literal(&[]), "[]");
    }
}

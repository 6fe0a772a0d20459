//! ID generation helpers.
//!
//! IDs are UUIDv4 rendered with a short, human-legible prefix
//! (`doc_`, `chk_`, `sess_`, `msg_`) so logs and API responses read
//! unambiguously without a lookup table.

use uuid::Uuid;

/// Generate a new prefixed ID, e.g. `new_id("doc")` -> `doc_3fa...`.
#[must_use]
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_preserved() {
        let id = new_id("doc");
        assert!(id.starts_with("doc_"));
        assert_eq!(id.len(), "doc_".len() + 36);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_id("doc"), new_id("doc"));
    }
}

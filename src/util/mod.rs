use std::sync::atomic::{AtomicUsize, Ordering};

use sha2::{Digest, Sha256};
use uuid::Uuid;

pub mod config;
pub mod persistence;
pub mod version;

static ID_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Process-local sequential id, e.g. `notice-3`.
pub fn generate_id(prefix: &str) -> String {
    let value = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{value}")
}

/// Globally unique id for a submitted transport request.
pub fn generate_request_id() -> String {
    format!("req-{}", Uuid::new_v4().simple())
}

pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_distinct() {
        let first = generate_id("notice");
        let second = generate_id("notice");
        assert_ne!(first, second);
        assert!(first.starts_with("notice-"));
    }

    #[test]
    fn empty_input_produces_known_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(generate_request_id(), generate_request_id());
    }
}

//! Derivation of cache keys from `(tenant_id, model, prompt)`.

use infercache_core::constants::DOMAIN_CACHE_KEY;
use infercache_core::error::{CacheError, Result};
use infercache_core::types::CacheKey;

use crate::hash::sha3_256_multi;

/// Derives the cache key for a tenant, model and prompt.
///
/// `tenant_id` and `model` must contain at least one non-whitespace
/// character. `prompt` may be empty: an empty prompt is a valid request.
/// All three components are hashed byte-for-byte, so prompts that differ
/// only in case or whitespace produce different keys.
///
/// # Errors
///
/// Returns [`CacheError::InvalidKey`] naming the rejected component.
///
/// # Example
///
/// ```rust
/// use infercache_key::make_key;
///
/// let a = make_key("acme", "gpt-4o", "What is Rust?").unwrap();
/// let b = make_key("acme", "gpt-4o", "What is Rust?").unwrap();
/// assert_eq!(a, b);
///
/// assert!(make_key("", "gpt-4o", "hi").is_err());
/// ```
pub fn make_key(tenant_id: &str, model: &str, prompt: &str) -> Result<CacheKey> {
    validate_component("tenant_id", tenant_id)?;
    validate_component("model", model)?;

    let digest = sha3_256_multi(
        DOMAIN_CACHE_KEY,
        &[tenant_id.as_bytes(), model.as_bytes(), prompt.as_bytes()],
    );
    Ok(CacheKey::from_digest(digest))
}

fn validate_component(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CacheError::invalid_key(field, "must not be empty"));
    }
    if value.trim().is_empty() {
        return Err(CacheError::invalid_key(field, "must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_make_key_deterministic() {
        let k1 = make_key("t1", "m1", "hello").unwrap();
        let k2 = make_key("t1", "m1", "hello").unwrap();
        assert_eq!(k1, k2);
    }

    #[test]
    fn test_make_key_tenant_aware() {
        let k1 = make_key("t1", "m1", "hello").unwrap();
        let k2 = make_key("t2", "m1", "hello").unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_make_key_model_aware() {
        let k1 = make_key("t1", "gpt-4o", "hello").unwrap();
        let k2 = make_key("t1", "claude", "hello").unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_make_key_prompt_is_exact() {
        let k1 = make_key("t1", "m1", "Hello  world").unwrap();
        let k2 = make_key("t1", "m1", "hello world").unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_empty_prompt_is_valid() {
        let empty = make_key("t1", "m1", "").unwrap();
        let space = make_key("t1", "m1", " ").unwrap();
        assert_ne!(empty, space);
    }

    #[test]
    fn test_no_separator_collision() {
        // "a|b" as tenant with model "c" must differ from tenant "a" with model "b|c"
        let k1 = make_key("a|b", "c", "p").unwrap();
        let k2 = make_key("a", "b|c", "p").unwrap();
        assert_ne!(k1, k2);
    }

    #[test_case("", "m1", "tenant_id" ; "empty tenant")]
    #[test_case("   ", "m1", "tenant_id" ; "blank tenant")]
    #[test_case("t1", "", "model" ; "empty model")]
    #[test_case("t1", "\t\n", "model" ; "blank model")]
    fn test_invalid_identity_rejected(tenant: &str, model: &str, expected_field: &str) {
        match make_key(tenant, model, "prompt") {
            Err(CacheError::InvalidKey { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected InvalidKey, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn prop_distinct_triples_distinct_keys(
            a in ("[a-z]{1,8}", "[a-z]{1,8}", ".{0,16}"),
            b in ("[a-z]{1,8}", "[a-z]{1,8}", ".{0,16}"),
        ) {
            let ka = make_key(&a.0, &a.1, &a.2).unwrap();
            let kb = make_key(&b.0, &b.1, &b.2).unwrap();
            prop_assert_eq!(a == b, ka == kb);
        }
    }
}

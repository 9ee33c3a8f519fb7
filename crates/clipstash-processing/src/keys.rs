//! Storage key derivation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

use crate::orientation::Orientation;

/// Entropy width of the random token. 32 bytes encode to 43 URL-safe
/// characters; collisions are treated as cryptographically negligible,
/// so no existence check is performed against the store.
const TOKEN_BYTES: usize = 32;

/// Derive the durable storage key for a classified upload:
/// `{orientation}/{token}`. Called only after classification succeeds,
/// so the prefix always reflects real content.
pub fn derive_storage_key(orientation: Orientation) -> String {
    let mut raw = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut raw);
    format!("{}/{}", orientation.as_str(), URL_SAFE_NO_PAD.encode(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn token_of(key: &str) -> &str {
        key.split_once('/').unwrap().1
    }

    #[test]
    fn key_carries_label_prefix_and_url_safe_token() {
        let key = derive_storage_key(Orientation::Landscape);
        assert!(key.starts_with("landscape/"));

        let token = token_of(&key);
        assert!(token.len() >= 40);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn keys_do_not_collide_across_many_derivations() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(derive_storage_key(Orientation::Portrait)));
        }
    }
}

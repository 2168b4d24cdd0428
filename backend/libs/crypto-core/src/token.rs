//! Opaque CSPRNG tokens for refresh handles, magic links, and share codes
//! (§4.4, §11). These never get decoded, only hashed and compared, so a
//! base62 alphabet keeps them URL-safe without the JWT machinery in
//! `crate::jwt`.

use rand::Rng;

const BASE62: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generate a random base62 token of the given length.
pub fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE62[rng.gen_range(0..BASE62.len())] as char)
        .collect()
}

/// Hex-encoded SHA256 digest of a token, for at-rest storage (§4.4: refresh
/// handles and magic tokens are stored hashed, never in plaintext).
pub fn token_hash(token: &str) -> String {
    hex::encode(crate::hash::sha256(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_token_has_requested_length() {
        assert_eq!(random_token(8).len(), 8);
        assert_eq!(random_token(32).len(), 32);
    }

    #[test]
    fn token_hash_is_deterministic() {
        assert_eq!(token_hash("abc"), token_hash("abc"));
        assert_ne!(token_hash("abc"), token_hash("abd"));
    }
}

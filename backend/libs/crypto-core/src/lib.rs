//! Shared cryptographic primitives for the matching-platform core.
//!
//! End-to-end message encryption is client-side only (the core stores and
//! returns an opaque base64 public key blob, see `core-service::http::keys`);
//! this crate only provides the primitives the core itself needs: bearer
//! token signing/validation and one-way hashing for cache keys, revocation
//! keys, and token/share-code digests.

pub mod hash;
pub mod jwt;
pub mod token;

pub use token::{random_token, token_hash};

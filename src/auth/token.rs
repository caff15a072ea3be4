// src/auth/token.rs
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Session cookies and sign-in links: 32 bytes -> 43 chars.
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Market documents, users and form sessions: 15 bytes -> 20 chars.
pub const ID_BYTES: usize = 15;

pub fn new_session_token() -> String {
    generate_token(&mut OsRng, SESSION_TOKEN_BYTES)
}

/// Short random id, URL-safe so it can sit in a path segment.
pub fn new_id() -> String {
    generate_token(&mut OsRng, ID_BYTES)
}

/// Base64 URL-safe (no padding) encoding of `nbytes` random bytes.
pub fn generate_token<R: RngCore>(rng: &mut R, nbytes: usize) -> String {
    let mut buf = vec![0u8; nbytes];
    rng.fill_bytes(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buf)
}

/// SHA-256 of the raw token. Only this is stored.
pub fn hash_token(token: &str) -> [u8; 32] {
    let digest = Sha256::digest(token.as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

//! Key material derivation from configured secret strings.
//!
//! Secrets are turned into cipher keys by truncation and zero padding only.
//! No key-stretching function (KDF/hash) is applied: the padded secret bytes
//! are used directly as key material. That is a known weakness of the legacy
//! scheme this crate stays wire-compatible with. Adding a KDF would orphan
//! every previously written ciphertext, so it must never be done silently.

/// Byte length of an AES block (and of the block-cipher padding unit).
pub const BLOCK_LEN: usize = 16;

/// Byte length of the AES-256 key used by the authenticated codec.
pub const FIXED_KEY_LEN: usize = 32;

/// Maximum number of characters of the secret consumed by the block-cipher
/// key derivation.
pub const MAX_SECRET_CHARS: usize = 32;

/// Truncate `s` to at most `max_chars` characters (code points, not bytes).
///
/// Returns the original slice unchanged when it is already short enough.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Right-pad `data` with zero bytes until its length is a multiple of
/// [`BLOCK_LEN`].
///
/// Input that is already block-aligned (including empty input) is returned
/// unchanged. The padding is reversed on decrypt by right-stripping trailing
/// zero bytes, which is lossy when the plaintext itself ends in a zero byte.
pub fn pad_to_block(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    while out.len() % BLOCK_LEN != 0 {
        out.push(0);
    }
    out
}

/// Derive block-cipher key material from a secret string.
///
/// The secret is truncated to at most [`MAX_SECRET_CHARS`] characters, UTF-8
/// encoded, then zero-padded to a multiple of [`BLOCK_LEN`]. For secrets in
/// the supported range the result is 16 or 32 bytes (AES-128 or AES-256);
/// the caller validates the length when building its key schedule.
pub fn derive_block_key(secret: &str) -> Vec<u8> {
    let truncated = truncate_chars(secret, MAX_SECRET_CHARS);
    pad_to_block(truncated.as_bytes())
}

/// Derive exactly [`FIXED_KEY_LEN`] bytes of key material from a secret
/// string.
///
/// Secrets of 32 bytes or more are truncated to their first 32 bytes;
/// shorter secrets are right-padded with zero bytes.
pub fn derive_fixed_key(secret: &str) -> [u8; FIXED_KEY_LEN] {
    let bytes = secret.as_bytes();
    let mut key = [0u8; FIXED_KEY_LEN];
    if bytes.len() >= FIXED_KEY_LEN {
        key.copy_from_slice(&bytes[..FIXED_KEY_LEN]);
    } else {
        key[..bytes.len()].copy_from_slice(bytes);
    }
    key
}

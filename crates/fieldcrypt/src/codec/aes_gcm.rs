//! AES-256-GCM encryption of individual string fields.
//!
//! This is the default scheme. Every ciphertext is self-contained:
//!
//! ```text
//! base64(header) ++ base64(nonce) ++ base64(tag) ++ base64(ciphertext)
//!    24 chars        24 chars        24 chars        remainder
//! ```
//!
//! `header` is 16 random public bytes bound into the tag as associated data,
//! `nonce` is a fresh random 16 bytes per call, `tag` is the 16-byte GCM
//! authentication tag. The first 72 characters therefore always decode to
//! exactly three 16-byte fields; everything after them is the ciphertext
//! body. The 16-byte nonce (GCM's native is 12) is fixed by the stored data
//! format and must not be changed.

use std::fmt;

use aes_gcm::{
    aead::{consts::U16, generic_array::GenericArray, AeadInPlace, KeyInit, OsRng},
    aes::Aes256,
    AesGcm, Nonce, Tag,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::codec::{CodecError, FieldCodec, Method};
use crate::key;

/// AES-256-GCM parameterised with the format's 16-byte nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Byte length of the random associated-data header.
const HEADER_LEN: usize = 16;

/// Byte length of the nonce.
const NONCE_LEN: usize = 16;

/// Length of one base64-encoded 16-byte field.
const B64_FIELD_LEN: usize = 24;

/// Length of the base64 metadata prefix: header, nonce and tag.
const METADATA_LEN: usize = 3 * B64_FIELD_LEN;

/// Authenticated AES-256-GCM codec (method name `aes`).
pub struct AesGcmCodec {
    cipher: Aes256Gcm16,
}

impl AesGcmCodec {
    /// Build the codec from a configured secret string.
    ///
    /// The key is derived by [`key::derive_fixed_key`]: the secret's first 32
    /// UTF-8 bytes, zero-padded when shorter. Derivation cannot fail, so any
    /// secret yields a working codec.
    pub fn new(secret: &str) -> Self {
        let mut key = key::derive_fixed_key(secret);
        let cipher = Aes256Gcm16::new(GenericArray::from_slice(&key));
        // The schedule holds its own copy; scrub ours before the buffer drops.
        key.iter_mut().for_each(|b| *b = 0);
        Self { cipher }
    }
}

/// Decode one 24-character metadata field to its 16 raw bytes.
fn decode_field(field: &[u8]) -> Result<[u8; 16], CodecError> {
    let bytes = STANDARD
        .decode(field)
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|_| CodecError::Decode("metadata field is not 16 bytes".to_string()))
}

impl FieldCodec for AesGcmCodec {
    fn method(&self) -> Method {
        Method::Aes
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, CodecError> {
        // OsRng is the OS CSPRNG; header and nonce are fresh per call.
        use aes_gcm::aead::rand_core::RngCore;
        let mut header = [0u8; HEADER_LEN];
        OsRng.fill_bytes(&mut header);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let mut body = plaintext.as_bytes().to_vec();
        let tag = self
            .cipher
            .encrypt_in_place_detached(nonce, &header, &mut body)
            .map_err(|e| CodecError::Primitive(e.to_string()))?;

        let mut out = String::with_capacity(METADATA_LEN + body.len() * 4 / 3 + 4);
        out.push_str(&STANDARD.encode(header));
        out.push_str(&STANDARD.encode(nonce_bytes));
        out.push_str(&STANDARD.encode(tag));
        out.push_str(&STANDARD.encode(&body));
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CodecError> {
        let raw = ciphertext.as_bytes();
        if raw.len() < METADATA_LEN {
            return Err(CodecError::Decode(format!(
                "value of {} bytes is shorter than the {METADATA_LEN}-byte metadata prefix",
                raw.len()
            )));
        }
        let header = decode_field(&raw[..B64_FIELD_LEN])?;
        let nonce_bytes = decode_field(&raw[B64_FIELD_LEN..2 * B64_FIELD_LEN])?;
        let tag_bytes = decode_field(&raw[2 * B64_FIELD_LEN..METADATA_LEN])?;
        let mut body = STANDARD
            .decode(&raw[METADATA_LEN..])
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        let nonce = Nonce::from_slice(&nonce_bytes);
        let tag = Tag::from_slice(&tag_bytes);
        self.cipher
            .decrypt_in_place_detached(nonce, &header, &mut body, tag)
            .map_err(|_| CodecError::AuthenticationFailed)?;

        Ok(String::from_utf8(body)?)
    }
}

impl fmt::Debug for AesGcmCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AesGcmCodec([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef";

    /// Replace the base64 character at `idx` so the decoded bytes change.
    fn flip_char(s: &str, idx: usize) -> String {
        let mut bytes = s.as_bytes().to_vec();
        bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn round_trip() {
        let codec = AesGcmCodec::new(SECRET);
        let ciphertext = codec.encrypt("hello").unwrap();
        assert_eq!(codec.decrypt(&ciphertext).unwrap(), "hello");
    }

    #[test]
    fn round_trip_multibyte_plaintext() {
        let codec = AesGcmCodec::new(SECRET);
        let plaintext = "verschlüsselt 密文 🔒";
        let ciphertext = codec.encrypt(plaintext).unwrap();
        assert_eq!(codec.decrypt(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn empty_plaintext_yields_metadata_only_envelope() {
        let codec = AesGcmCodec::new(SECRET);
        let ciphertext = codec.encrypt("").unwrap();
        assert_eq!(ciphertext.len(), METADATA_LEN);
        assert_eq!(codec.decrypt(&ciphertext).unwrap(), "");
    }

    #[test]
    fn repeated_encryption_differs_but_both_decrypt() {
        let codec = AesGcmCodec::new(SECRET);
        let first = codec.encrypt("hello").unwrap();
        let second = codec.encrypt("hello").unwrap();
        assert_ne!(first, second);
        assert_eq!(codec.decrypt(&first).unwrap(), "hello");
        assert_eq!(codec.decrypt(&second).unwrap(), "hello");
    }

    #[test]
    fn metadata_prefix_decodes_to_three_16_byte_fields() {
        let codec = AesGcmCodec::new(SECRET);
        let ciphertext = codec.encrypt("framing check").unwrap();
        let raw = ciphertext.as_bytes();
        for start in [0, B64_FIELD_LEN, 2 * B64_FIELD_LEN] {
            let field = STANDARD.decode(&raw[start..start + B64_FIELD_LEN]).unwrap();
            assert_eq!(field.len(), 16);
        }
    }

    #[test]
    fn tampered_header_fails_authentication() {
        let codec = AesGcmCodec::new(SECRET);
        let ciphertext = codec.encrypt("bound to header").unwrap();
        let tampered = flip_char(&ciphertext, 0);
        assert!(matches!(
            codec.decrypt(&tampered),
            Err(CodecError::AuthenticationFailed)
        ));
    }

    #[test]
    fn tampered_tag_fails_authentication() {
        let codec = AesGcmCodec::new(SECRET);
        let ciphertext = codec.encrypt("tamper the tag").unwrap();
        let tampered = flip_char(&ciphertext, 2 * B64_FIELD_LEN);
        assert!(matches!(
            codec.decrypt(&tampered),
            Err(CodecError::AuthenticationFailed)
        ));
    }

    #[test]
    fn tampered_body_fails_authentication() {
        let codec = AesGcmCodec::new(SECRET);
        let ciphertext = codec.encrypt("tamper the body").unwrap();
        let tampered = flip_char(&ciphertext, METADATA_LEN);
        assert!(matches!(
            codec.decrypt(&tampered),
            Err(CodecError::AuthenticationFailed)
        ));
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let ciphertext = AesGcmCodec::new(SECRET).encrypt("secret").unwrap();
        let other = AesGcmCodec::new("another-secret-key");
        assert!(matches!(
            other.decrypt(&ciphertext),
            Err(CodecError::AuthenticationFailed)
        ));
    }

    #[test]
    fn truncated_value_is_rejected_as_malformed() {
        let codec = AesGcmCodec::new(SECRET);
        let ciphertext = codec.encrypt("truncate me").unwrap();
        assert!(matches!(
            codec.decrypt(&ciphertext[..40]),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn oversized_metadata_field_is_rejected() {
        // 24 unpadded characters decode to 18 bytes, not 16.
        let codec = AesGcmCodec::new(SECRET);
        let bogus = "A".repeat(METADATA_LEN);
        assert!(matches!(
            codec.decrypt(&bogus),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn malformed_body_base64_is_rejected() {
        let codec = AesGcmCodec::new(SECRET);
        let ciphertext = codec.encrypt("x").unwrap();
        let broken = format!("{}!!!", &ciphertext[..METADATA_LEN]);
        assert!(matches!(
            codec.decrypt(&broken),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn long_secret_is_truncated_to_32_bytes() {
        let base = "k".repeat(32);
        let long = format!("{base}-ignored-tail");
        let ciphertext = AesGcmCodec::new(&base).encrypt("hello").unwrap();
        assert_eq!(AesGcmCodec::new(&long).decrypt(&ciphertext).unwrap(), "hello");
    }

    #[test]
    fn debug_output_redacts_key_material() {
        let codec = AesGcmCodec::new(SECRET);
        let debug = format!("{codec:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(SECRET));
    }
}

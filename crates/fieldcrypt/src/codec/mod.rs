//! The codec abstraction every encryption scheme plugs into.
//!
//! A codec turns a plaintext string into a self-describing ciphertext string
//! and back. Three schemes are implemented:
//!
//! | method    | scheme                        | wire format                          |
//! |-----------|-------------------------------|--------------------------------------|
//! | `aes_ecb` | AES-ECB, deterministic        | `base64(blocks)`                     |
//! | `aes`     | AES-256-GCM, 16-byte nonce    | `b64(header)b64(nonce)b64(tag)b64(ct)` |
//! | `gm_sm2`  | SM2 public-key encryption     | `base64url(sm2_ciphertext)`          |
//!
//! Decryption failures are always a [`CodecError`]. The registry treats any
//! `CodecError` as "this value was not produced by this codec" and falls
//! through to the next registered scheme; only these variants exist, so no
//! unrelated failure can be swallowed by fallback.

pub mod aes_ecb;
pub mod aes_gcm;
pub mod sm2;

use std::fmt;
use std::str::FromStr;
use std::string::FromUtf8Error;

use thiserror::Error;

pub use aes_ecb::AesEcbCodec;
pub use aes_gcm::AesGcmCodec;
pub use sm2::Sm2Codec;

/// Named encryption schemes, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Deterministic AES in ECB mode. Legacy, kept for old ciphertext.
    AesEcb,
    /// AES-256-GCM with a random header and nonce. The default.
    Aes,
    /// SM2 public-key encryption (GB/T 32918).
    GmSm2,
}

impl Method {
    /// The stable name used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::AesEcb => "aes_ecb",
            Method::Aes => "aes",
            Method::GmSm2 => "gm_sm2",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aes_ecb" => Ok(Method::AesEcb),
            "aes" => Ok(Method::Aes),
            "gm_sm2" => Ok(Method::GmSm2),
            other => Err(SetupError::UnsupportedMethod {
                requested: other.to_owned(),
            }),
        }
    }
}

/// A single encryption scheme: plaintext string in, ciphertext string out.
///
/// Implementations hold their key material, are immutable after construction
/// and safe to share across threads.
pub trait FieldCodec: Send + Sync {
    /// The scheme this codec implements.
    fn method(&self) -> Method;

    /// Encrypt `plaintext` into this codec's textual wire format.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Primitive`] if the underlying cipher rejects the
    /// operation. Well-formed input never fails for the symmetric codecs.
    fn encrypt(&self, plaintext: &str) -> Result<String, CodecError>;

    /// Decrypt a value previously produced by [`FieldCodec::encrypt`].
    ///
    /// # Errors
    ///
    /// Any [`CodecError`] variant: the value is malformed for this codec's
    /// wire format, fails authentication, decrypts to non-UTF-8 bytes, or is
    /// rejected by the underlying primitive.
    fn decrypt(&self, ciphertext: &str) -> Result<String, CodecError>;
}

/// Recoverable decryption failures.
///
/// Every variant means "not decryptable by this codec", which is an expected
/// outcome when the registry probes codecs in fallback order.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value does not match this codec's wire format (base64 alphabet,
    /// framing, or length).
    #[error("malformed ciphertext: {0}")]
    Decode(String),

    /// Tag verification failed: wrong key, wrong scheme, or tampered data.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The decrypted bytes are not valid UTF-8.
    #[error("decrypted bytes are not valid UTF-8")]
    InvalidUtf8(#[from] FromUtf8Error),

    /// The underlying cryptographic primitive rejected the operation.
    #[error("crypto primitive failure: {0}")]
    Primitive(String),
}

/// Fatal codec or registry construction failures.
///
/// These abort startup and are never produced by encrypt or decrypt.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The configured method name is unknown, or names a codec that was not
    /// registered (for example `gm_sm2` without a configured keypair).
    #[error("unsupported encryption method `{requested}`")]
    UnsupportedMethod { requested: String },

    /// The key derived from the configured secret is not a valid AES key
    /// length.
    #[error("derived key is {derived} bytes, expected 16 or 32")]
    InvalidKeyLength { derived: usize },

    /// One half of the SM2 keypair failed to parse.
    #[error("invalid SM2 {role} key: {reason}")]
    InvalidKeypair { role: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_round_trip() {
        for method in [Method::AesEcb, Method::Aes, Method::GmSm2] {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
        }
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(Method::Aes.to_string(), "aes");
        assert_eq!(Method::AesEcb.to_string(), "aes_ecb");
        assert_eq!(Method::GmSm2.to_string(), "gm_sm2");
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = "rot13".parse::<Method>().unwrap_err();
        assert!(matches!(
            err,
            SetupError::UnsupportedMethod { ref requested } if requested == "rot13"
        ));
    }
}

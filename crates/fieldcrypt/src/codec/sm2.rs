//! SM2 public-key encryption of individual string fields (GB/T 32918).
//!
//! Values are encrypted with a fixed keypair loaded from configuration, so
//! unlike the symmetric codecs both halves must be present for the codec to
//! exist at all. Ciphertext component order is C1C2C3 and the textual form
//! is URL-safe base64; both are fixed by the stored data format.
//!
//! Keys are hex strings. The private key is the 32-byte scalar (64 hex
//! characters). The public key is accepted either as raw `X ‖ Y` coordinates
//! (128 hex characters, the form common GM/T tooling prints) or as a full
//! SEC1 point with the `04` prefix (130 hex characters).

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use sm2::elliptic_curve::common::getrandom::SysRng;
use sm2::pke::{DecryptingKey, EncryptingKey, Mode};
use sm2::{PublicKey, SecretKey};

use crate::codec::{CodecError, FieldCodec, Method, SetupError};

/// Component order of stored ciphertext values.
const MODE: Mode = Mode::C1C2C3;

/// Byte length of an uncompressed SEC1 point without its `04` prefix.
const RAW_POINT_LEN: usize = 64;

/// SM2 public-key codec (method name `gm_sm2`).
pub struct Sm2Codec {
    encrypting_key: EncryptingKey,
    decrypting_key: DecryptingKey,
}

impl Sm2Codec {
    /// Build the codec from a hex keypair.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidKeypair`] when either half is not valid
    /// hex, has the wrong length, names a point that is not on the curve, or
    /// is the zero scalar.
    pub fn new(public_key_hex: &str, private_key_hex: &str) -> Result<Self, SetupError> {
        let public = parse_public_key(public_key_hex)?;
        let secret = parse_private_key(private_key_hex)?;
        Ok(Self {
            encrypting_key: EncryptingKey::new_with_mode(public, MODE),
            decrypting_key: DecryptingKey::new_with_mode(secret.to_nonzero_scalar(), MODE),
        })
    }
}

fn parse_public_key(hex_key: &str) -> Result<PublicKey, SetupError> {
    let invalid = |reason: String| SetupError::InvalidKeypair {
        role: "public",
        reason,
    };
    let bytes = hex::decode(hex_key).map_err(|e| invalid(e.to_string()))?;
    let sec1 = if bytes.len() == RAW_POINT_LEN {
        // Raw X ‖ Y coordinates; restore the SEC1 uncompressed-point prefix.
        let mut prefixed = Vec::with_capacity(RAW_POINT_LEN + 1);
        prefixed.push(0x04);
        prefixed.extend_from_slice(&bytes);
        prefixed
    } else {
        bytes
    };
    PublicKey::from_sec1_bytes(&sec1).map_err(|e| invalid(e.to_string()))
}

fn parse_private_key(hex_key: &str) -> Result<SecretKey, SetupError> {
    let invalid = |reason: String| SetupError::InvalidKeypair {
        role: "private",
        reason,
    };
    let bytes = hex::decode(hex_key).map_err(|e| invalid(e.to_string()))?;
    SecretKey::from_slice(&bytes).map_err(|e| invalid(e.to_string()))
}

impl FieldCodec for Sm2Codec {
    fn method(&self) -> Method {
        Method::GmSm2
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, CodecError> {
        let ciphertext = self
            .encrypting_key
            .encrypt(&mut SysRng, plaintext.as_bytes())
            .map_err(|e| CodecError::Primitive(e.to_string()))?;
        Ok(URL_SAFE.encode(ciphertext))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CodecError> {
        let raw = URL_SAFE
            .decode(ciphertext)
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        let plaintext = self
            .decrypting_key
            .decrypt(&raw)
            .map_err(|e| CodecError::Primitive(e.to_string()))?;
        Ok(String::from_utf8(plaintext)?)
    }
}

impl fmt::Debug for Sm2Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sm2Codec([REDACTED])")
    }
}

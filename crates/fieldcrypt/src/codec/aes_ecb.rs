//! Deterministic AES-ECB encryption of individual string fields.
//!
//! **Legacy scheme.** ECB uses no nonce and no authentication tag: equal
//! plaintexts under the same key always produce equal ciphertexts, and
//! repeating 16-byte blocks remain visible in the output. The codec is kept
//! so that values written by old deployments stay readable, and so that a
//! deployment configured for it keeps producing compatible values.
//!
//! **Do not pick this scheme for new data.** The authenticated `aes` codec
//! is the default for a reason.
//!
//! Plaintext is zero-padded to a block multiple before encryption and the
//! padding is right-stripped after decryption, so plaintext that itself ends
//! in a zero byte comes back shortened. That loss is inherited from the
//! legacy format and must not be "fixed" here.

use std::fmt;

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes256};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::codec::{CodecError, FieldCodec, Method, SetupError};
use crate::key::{self, BLOCK_LEN};

/// Key schedule for whichever AES variant the derived key length selects.
enum EcbCipher {
    Aes128(Aes128),
    Aes256(Aes256),
}

/// Deterministic AES-ECB codec (method name `aes_ecb`).
pub struct AesEcbCodec {
    cipher: EcbCipher,
}

impl AesEcbCodec {
    /// Build the codec from a configured secret string.
    ///
    /// The key is derived by [`key::derive_block_key`]: the secret truncated
    /// to 32 characters, UTF-8 encoded, zero-padded to a block multiple.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidKeyLength`] when the derived key is not
    /// 16 or 32 bytes (empty secret, or multibyte characters pushing the
    /// padded length past 32).
    pub fn new(secret: &str) -> Result<Self, SetupError> {
        let mut key = key::derive_block_key(secret);
        let cipher = match key.len() {
            16 => EcbCipher::Aes128(Aes128::new(GenericArray::from_slice(&key))),
            32 => EcbCipher::Aes256(Aes256::new(GenericArray::from_slice(&key))),
            derived => return Err(SetupError::InvalidKeyLength { derived }),
        };
        // The schedule holds its own copy; scrub ours before the buffer drops.
        key.iter_mut().for_each(|b| *b = 0);
        Ok(Self { cipher })
    }

    fn encrypt_blocks(&self, buf: &mut [u8]) {
        for chunk in buf.chunks_mut(BLOCK_LEN) {
            let block = GenericArray::from_mut_slice(chunk);
            match &self.cipher {
                EcbCipher::Aes128(cipher) => cipher.encrypt_block(block),
                EcbCipher::Aes256(cipher) => cipher.encrypt_block(block),
            }
        }
    }

    fn decrypt_blocks(&self, buf: &mut [u8]) {
        for chunk in buf.chunks_mut(BLOCK_LEN) {
            let block = GenericArray::from_mut_slice(chunk);
            match &self.cipher {
                EcbCipher::Aes128(cipher) => cipher.decrypt_block(block),
                EcbCipher::Aes256(cipher) => cipher.decrypt_block(block),
            }
        }
    }
}

impl FieldCodec for AesEcbCodec {
    fn method(&self) -> Method {
        Method::AesEcb
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, CodecError> {
        let mut buf = key::pad_to_block(plaintext.as_bytes());
        self.encrypt_blocks(&mut buf);
        Ok(STANDARD.encode(&buf))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CodecError> {
        let mut buf = STANDARD
            .decode(ciphertext)
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        if buf.len() % BLOCK_LEN != 0 {
            return Err(CodecError::Decode(format!(
                "payload of {} bytes is not block-aligned",
                buf.len()
            )));
        }
        self.decrypt_blocks(&mut buf);

        // Reverse the zero padding applied on encrypt.
        let end = buf.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        buf.truncate(end);

        Ok(String::from_utf8(buf)?)
    }
}

impl fmt::Debug for AesEcbCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AesEcbCodec([REDACTED])")
    }
}

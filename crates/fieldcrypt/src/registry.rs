//! The codec registry and its fallback-decryption facade.
//!
//! A [`Crypto`] holds one codec per scheme the deployment has ever written
//! data with, in a fixed order with the configured active codec at position
//! 0. Encryption always uses the active codec. Decryption walks the whole
//! list: a value that the active codec rejects is handed to each remaining
//! codec in turn, so data written under an older configuration keeps
//! decrypting after the active method changes.
//!
//! Decrypt deliberately returns `Option`: with self-describing formats there
//! is no way to distinguish "wrong key" from "not ciphertext", so exhausting
//! the registry means the value is unreadable, not that the caller misused
//! the API.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, info, trace};

use crate::codec::{
    AesEcbCodec, AesGcmCodec, CodecError, FieldCodec, Method, SetupError, Sm2Codec,
};
use crate::config::Config;

/// Ordered codec registry with the active codec at position 0.
pub struct Crypto {
    codecs: Vec<Box<dyn FieldCodec>>,
}

impl Crypto {
    /// Arrange `codecs` so the one implementing `active` sits at position 0,
    /// preserving the relative order of the rest.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::UnsupportedMethod`] when no codec in `codecs`
    /// implements `active`.
    pub fn new(active: Method, mut codecs: Vec<Box<dyn FieldCodec>>) -> Result<Self, SetupError> {
        let position = codecs
            .iter()
            .position(|codec| codec.method() == active)
            .ok_or_else(|| SetupError::UnsupportedMethod {
                requested: active.to_string(),
            })?;
        let front = codecs.remove(position);
        codecs.insert(0, front);

        info!(
            active = %active,
            registered = codecs.len(),
            "crypto registry ready"
        );
        Ok(Self { codecs })
    }

    /// Build the standard registry from configuration.
    ///
    /// The symmetric codecs are always registered, in the fixed order
    /// `aes_ecb`, `aes`. The SM2 codec joins only when both keypair halves
    /// are configured; selecting `gm_sm2` without them fails the same way an
    /// unknown method name does.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] when the method name is unknown or absent from
    /// the registry, or when any codec rejects its key material.
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let active: Method = config.crypto_method.parse()?;

        let mut codecs: Vec<Box<dyn FieldCodec>> = vec![
            Box::new(AesEcbCodec::new(&config.secret_key)?),
            Box::new(AesGcmCodec::new(&config.secret_key)),
        ];
        if let (Some(public), Some(private)) =
            (&config.gm_sm2_public_key, &config.gm_sm2_private_key)
        {
            codecs.push(Box::new(Sm2Codec::new(public, private)?));
        }

        Self::new(active, codecs)
    }

    /// The method ciphertext is currently written with.
    pub fn active_method(&self) -> Method {
        self.active().method()
    }

    /// Registered methods in decryption precedence order.
    pub fn methods(&self) -> Vec<Method> {
        self.codecs.iter().map(|codec| codec.method()).collect()
    }

    /// Encrypt `plaintext` with the active codec.
    ///
    /// There is no fallback on this path: a value must only ever be written
    /// in the configured format.
    ///
    /// # Errors
    ///
    /// Propagates the active codec's [`CodecError`] unchanged.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CodecError> {
        self.active().encrypt(plaintext)
    }

    /// Decrypt `ciphertext` with the first codec that accepts it.
    ///
    /// Codecs are tried in precedence order (active first, then the fixed
    /// registration order). Returns `None` when every codec rejects the
    /// value.
    pub fn decrypt(&self, ciphertext: &str) -> Option<String> {
        for codec in &self.codecs {
            match codec.decrypt(ciphertext) {
                Ok(plaintext) => {
                    trace!(method = %codec.method(), "value decrypted");
                    return Some(plaintext);
                }
                Err(err) => {
                    trace!(method = %codec.method(), error = %err, "codec rejected value");
                }
            }
        }
        debug!("value not decryptable by any registered codec");
        None
    }

    fn active(&self) -> &dyn FieldCodec {
        // Construction guarantees the active codec sits at position 0.
        self.codecs[0].as_ref()
    }
}

impl fmt::Debug for Crypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crypto")
            .field("codecs", &self.methods())
            .finish()
    }
}

/// Shared, lock-free handle to the current [`Crypto`] registry.
///
/// Clones are cheap and all observe the same registry. Backed by
/// [`ArcSwap`], so reads never block and a configuration change is rolled
/// out by building a fresh registry and swapping it in atomically.
#[derive(Clone, Debug)]
pub struct SharedCrypto {
    inner: Arc<ArcSwap<Crypto>>,
}

impl SharedCrypto {
    /// Wrap an initial registry.
    pub fn new(crypto: Crypto) -> Self {
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(crypto))),
        }
    }

    /// Snapshot of the current registry.
    pub fn load(&self) -> Arc<Crypto> {
        self.inner.load_full()
    }

    /// Encrypt with the current registry's active codec.
    ///
    /// # Errors
    ///
    /// Propagates the active codec's [`CodecError`] unchanged.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CodecError> {
        self.inner.load().encrypt(plaintext)
    }

    /// Decrypt with the current registry, trying every codec in order.
    pub fn decrypt(&self, ciphertext: &str) -> Option<String> {
        self.inner.load().decrypt(ciphertext)
    }

    /// Atomically replace the registry for every handle.
    pub fn swap(&self, crypto: Crypto) {
        self.inner.store(Arc::new(crypto));
    }
}

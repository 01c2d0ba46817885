//! Field-level encryption with pluggable schemes and fallback decryption.
//!
//! Applications encrypt sensitive fields with one configured scheme while
//! staying able to read values written under any scheme they ever used:
//! [`Crypto::encrypt`] always uses the active codec, and [`Crypto::decrypt`]
//! tries every registered codec in order until one accepts the value,
//! returning `None` once the registry is exhausted.
//!
//! # Wire formats
//!
//! ```text
//! aes_ecb   base64(AES-ECB blocks)                              deterministic, legacy
//! aes       b64(header) ++ b64(nonce) ++ b64(tag) ++ b64(body)  AES-256-GCM, default
//! gm_sm2    base64url(SM2 ciphertext, C1C2C3)                   public-key
//! ```
//!
//! Values a codec cannot read map to a recoverable [`CodecError`], never a
//! panic, which is what makes blind fallback across formats safe.
//!
//! # Example
//!
//! ```
//! use fieldcrypt::{Config, Crypto};
//!
//! let config = Config {
//!     crypto_method: "aes".into(),
//!     secret_key: "a-secret-of-at-most-32-chars".into(),
//!     gm_sm2_public_key: None,
//!     gm_sm2_private_key: None,
//!     log_level: "info".into(),
//! };
//! let crypto = Crypto::from_config(&config)?;
//!
//! let ciphertext = crypto.encrypt("752100")?;
//! assert_eq!(crypto.decrypt(&ciphertext), Some("752100".to_owned()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod config;
pub mod key;
pub mod registry;

pub use codec::{CodecError, FieldCodec, Method, SetupError};
pub use config::Config;
pub use registry::{Crypto, SharedCrypto};

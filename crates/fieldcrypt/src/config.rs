//! Configuration loading and validation.
//!
//! All values are read from environment variables at startup. Construction
//! fails with a clear error message naming the offending variable rather
//! than limping along with unusable key material.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated field-encryption configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Active encryption method: `aes_ecb`, `aes` or `gm_sm2`.
    #[serde(default = "default_crypto_method")]
    pub crypto_method: String,

    /// Secret string the symmetric keys are derived from. **Required.**
    pub secret_key: String,

    /// SM2 public key as hex. Set together with `GM_SM2_PRIVATE_KEY`.
    pub gm_sm2_public_key: Option<String>,

    /// SM2 private key as hex. Set together with `GM_SM2_PUBLIC_KEY`.
    pub gm_sm2_private_key: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_crypto_method() -> String {
    "aes".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `SECRET_KEY` is absent, or if any present
    /// variable fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.crypto_method, "CRYPTO_METHOD")?;
        ensure_non_empty(&self.secret_key, "SECRET_KEY")?;

        match (&self.gm_sm2_public_key, &self.gm_sm2_private_key) {
            (Some(_), None) => {
                anyhow::bail!("GM_SM2_PRIVATE_KEY is required when GM_SM2_PUBLIC_KEY is set")
            }
            (None, Some(_)) => {
                anyhow::bail!("GM_SM2_PUBLIC_KEY is required when GM_SM2_PRIVATE_KEY is set")
            }
            _ => {}
        }
        if let Some(key) = &self.gm_sm2_public_key {
            ensure_non_empty(key, "GM_SM2_PUBLIC_KEY")?;
        }
        if let Some(key) = &self.gm_sm2_private_key {
            ensure_non_empty(key, "GM_SM2_PRIVATE_KEY")?;
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Config {
        Config {
            crypto_method: default_crypto_method(),
            secret_key: "0123456789abcdef".into(),
            gm_sm2_public_key: None,
            gm_sm2_private_key: None,
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_crypto_method(), "aes");
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_accepts_minimal_config() {
        assert!(minimal().validate().is_ok());
    }

    #[test]
    fn validate_accepts_full_keypair() {
        let cfg = Config {
            gm_sm2_public_key: Some("04ab".into()),
            gm_sm2_private_key: Some("cd".into()),
            ..minimal()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_secret_key() {
        let cfg = Config {
            secret_key: "".into(),
            ..minimal()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_one_sided_keypair() {
        let cfg = Config {
            gm_sm2_public_key: Some("04ab".into()),
            ..minimal()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            gm_sm2_private_key: Some("cd".into()),
            ..minimal()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_keypair_values() {
        let cfg = Config {
            gm_sm2_public_key: Some("  ".into()),
            gm_sm2_private_key: Some("cd".into()),
            ..minimal()
        };
        assert!(cfg.validate().is_err());
    }
}

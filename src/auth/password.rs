use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use std::sync::Arc;
use tracing::{error, warn};

use crate::config::PasswordConfig;

/// Salted Argon2id hashing with a configurable work factor.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Digest at the configured work factor, verified when the account
    /// does not exist.
    dummy_digest: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cfg: &PasswordConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let dummy_digest = argon2
            .hash_password(b"pomovue-unknown-account", &salt)
            .map_err(|e| anyhow::anyhow!("argon2 dummy digest: {e}"))?
            .to_string();
        Ok(Self {
            argon2,
            dummy_digest: dummy_digest.into(),
        })
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// A digest that does not parse counts as a mismatch.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password digest is malformed");
                return false;
            }
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    /// Runs [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(&self, plain: String) -> anyhow::Result<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain)).await?
    }

    /// Runs [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(&self, plain: String, hash: String) -> anyhow::Result<bool> {
        let hasher = self.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash)).await?)
    }

    /// Spends one verification on the dummy digest; the outcome is discarded.
    pub async fn verify_dummy_blocking(&self, plain: String) -> anyhow::Result<()> {
        let digest = self.dummy_digest.to_string();
        self.verify_blocking(plain, digest).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(&PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap params are valid")
}

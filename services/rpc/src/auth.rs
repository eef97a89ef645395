//! Identity verification boundary.
//!
//! The dispatch core only needs one question answered: does this signature
//! prove control of this identity for this challenge? Real deployments back
//! this with an identity chain; the bundled verifier uses per-identity
//! shared secrets and a keyed hash.

use async_trait::async_trait;
use sha3::{Digest, Sha3_256};
use std::collections::HashMap;

/// Answers identity/challenge/signature verification requests.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// True when `signature` proves `identity` signed `challenge`.
    ///
    /// Errors are infrastructure failures (the verification backend being
    /// unreachable); a verification miss is `Ok(false)`.
    async fn verify(&self, identity: &str, challenge: &str, signature: &str)
        -> anyhow::Result<bool>;
}

/// Verifier over a table of per-identity shared secrets.
///
/// The expected signature is `hex(sha3_256(secret || challenge))`.
#[derive(Default)]
pub struct KeyedHashVerifier {
    secrets: HashMap<String, String>,
}

impl KeyedHashVerifier {
    pub fn new(secrets: HashMap<String, String>) -> Self {
        Self { secrets }
    }

    /// Compute the signature a holder of `secret` produces for `challenge`.
    pub fn signature(secret: &str, challenge: &str) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(secret.as_bytes());
        hasher.update(challenge.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl IdentityVerifier for KeyedHashVerifier {
    async fn verify(
        &self,
        identity: &str,
        challenge: &str,
        signature: &str,
    ) -> anyhow::Result<bool> {
        Ok(self
            .secrets
            .get(identity)
            .map(|secret| Self::signature(secret, challenge) == signature)
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> KeyedHashVerifier {
        let mut secrets = HashMap::new();
        secrets.insert("kristof.ibiza".to_string(), "topsecret".to_string());
        KeyedHashVerifier::new(secrets)
    }

    #[tokio::test]
    async fn test_valid_signature() {
        let verifier = verifier();
        let sig = KeyedHashVerifier::signature("topsecret", "1554112371");
        assert!(verifier
            .verify("kristof.ibiza", "1554112371", &sig)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_wrong_signature() {
        let verifier = verifier();
        assert!(!verifier
            .verify("kristof.ibiza", "1554112371", "deadbeef")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_unknown_identity() {
        let verifier = verifier();
        let sig = KeyedHashVerifier::signature("topsecret", "1554112371");
        assert!(!verifier.verify("nobody", "1554112371", &sig).await.unwrap());
    }
}

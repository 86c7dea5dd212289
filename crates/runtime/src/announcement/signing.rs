//! Announcement signing boundary.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use client_blockchain_core::{ContentHash, SocialAddress};
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{self, SigningKey, VerifyingKey};

use super::types::Signature;
use crate::api::SigningError;

/// Produces authorship proofs for announcement digests.
#[async_trait]
pub trait AnnouncementSigner: Send + Sync {
    async fn sign(
        &self,
        actor: &SocialAddress,
        digest: &ContentHash,
    ) -> Result<Signature, SigningError>;
}

/// In-process keyring holding one secp256k1 key per actor.
#[derive(Default)]
pub struct KeyringSigner {
    keys: RwLock<HashMap<SocialAddress, SigningKey>>,
}

impl KeyringSigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_key(&self, actor: SocialAddress, secret: [u8; 32]) -> Result<(), SigningError> {
        let key = SigningKey::from_slice(&secret)
            .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
        self.keys
            .write()
            .map_err(|_| SigningError::KeyStoreUnavailable)?
            .insert(actor, key);
        Ok(())
    }

    /// Generate a fresh key for `actor`, replacing any existing one.
    pub fn generate_key(&self, actor: SocialAddress) -> Result<(), SigningError> {
        let key = SigningKey::random(&mut rand::thread_rng());
        tracing::debug!("Generated signing key for {}", actor);
        self.keys
            .write()
            .map_err(|_| SigningError::KeyStoreUnavailable)?
            .insert(actor, key);
        Ok(())
    }

    pub fn has_key(&self, actor: &SocialAddress) -> bool {
        self.keys
            .read()
            .map(|keys| keys.contains_key(actor))
            .unwrap_or(false)
    }

    pub fn verifying_key(&self, actor: &SocialAddress) -> Result<VerifyingKey, SigningError> {
        let keys = self.keys.read().map_err(|_| SigningError::KeyStoreUnavailable)?;
        keys.get(actor)
            .map(|key| *key.verifying_key())
            .ok_or_else(|| SigningError::UnknownActor(actor.clone()))
    }

    pub fn verify(
        &self,
        actor: &SocialAddress,
        digest: &ContentHash,
        signature: &Signature,
    ) -> Result<(), SigningError> {
        let verifying_key = self.verifying_key(actor)?;
        let signature = ecdsa::Signature::from_slice(signature.as_bytes())
            .map_err(|_| SigningError::VerificationFailed(actor.clone()))?;
        verifying_key
            .verify(digest.as_bytes(), &signature)
            .map_err(|_| SigningError::VerificationFailed(actor.clone()))
    }
}

#[async_trait]
impl AnnouncementSigner for KeyringSigner {
    async fn sign(
        &self,
        actor: &SocialAddress,
        digest: &ContentHash,
    ) -> Result<Signature, SigningError> {
        let keys = self.keys.read().map_err(|_| SigningError::KeyStoreUnavailable)?;
        let key = keys
            .get(actor)
            .ok_or_else(|| SigningError::UnknownActor(actor.clone()))?;
        let signature: ecdsa::Signature = key.sign(digest.as_bytes());
        Ok(Signature(signature.to_bytes().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signs_and_verifies() {
        let signer = KeyringSigner::new();
        let actor = SocialAddress::from("0xAA");
        signer.insert_key(actor.clone(), [7u8; 32]).unwrap();

        let digest = ContentHash([1; 32]);
        let signature = signer.sign(&actor, &digest).await.unwrap();
        assert_eq!(signature.as_bytes().len(), 64);
        signer.verify(&actor, &digest, &signature).unwrap();

        let other = ContentHash([2; 32]);
        assert!(matches!(
            signer.verify(&actor, &other, &signature),
            Err(SigningError::VerificationFailed(_))
        ));
    }

    #[tokio::test]
    async fn unknown_actor_cannot_sign() {
        let signer = KeyringSigner::new();
        let err = signer
            .sign(&SocialAddress::from("0xBB"), &ContentHash([0; 32]))
            .await
            .unwrap_err();
        assert!(matches!(err, SigningError::UnknownActor(_)));
    }

    #[test]
    fn zero_secret_is_rejected() {
        let signer = KeyringSigner::new();
        assert!(matches!(
            signer.insert_key(SocialAddress::from("0xAA"), [0u8; 32]),
            Err(SigningError::InvalidKey(_))
        ));
    }
}

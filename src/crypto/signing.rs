//! Schnorr signatures over secp256k1 as the Zilliqa network defines them.
//!
//! Signing with secret `x`, public key `P` and message `m`:
//! pick a random `k`, set `Q = kG`, `r = SHA256(Q || P || m) mod n`,
//! `s = k - r*x mod n`. The signature is `r || s`. Verification recomputes
//! `Q = sG + rP` and checks that it hashes back to `r`.

use crate::crypto::hash::sha256_all;
use crate::error::{Result, SdkError};
use crate::types::primitives::{PublicKey, Signature};
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, ProjectivePoint, Scalar, SecretKey, U256};
use rand::RngCore;
use zeroize::Zeroizing;

/// Upper bound on fresh nonces tried before giving up. Each try fails with
/// negligible probability, so hitting this means the RNG is broken.
const MAX_SIGN_ATTEMPTS: usize = 64;

/// Signing service for Zilliqa Schnorr signatures
#[derive(Clone, Debug, Default)]
pub struct SigningService;

impl SigningService {
    /// Create a new signing service
    pub fn new() -> Self {
        Self
    }

    /// Sign `message` with `secret_key`. A fresh random nonce is drawn for each
    /// call, so signatures differ between calls but all verify.
    pub fn sign(&self, message: &[u8], secret_key: &SecretKey) -> Result<Signature> {
        let public_key = PublicKey::from_k256(&secret_key.public_key());
        let x: Scalar = *secret_key.to_nonzero_scalar();
        let mut rng = rand::rng();

        for _ in 0..MAX_SIGN_ATTEMPTS {
            let mut k_bytes = Zeroizing::new([0u8; 32]);
            rng.fill_bytes(&mut *k_bytes);
            let k = match Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*k_bytes))) {
                Some(k) if !bool::from(k.is_zero()) => k,
                _ => continue,
            };
            if let Some(signature) = try_sign(message, &k, &x, &public_key) {
                return Ok(signature);
            }
        }

        Err(SdkError::Crypto(
            "Signing failed: no usable nonce was found".to_string(),
        ))
    }

    /// Verify a signature against data and public key
    pub fn verify(
        &self,
        message: &[u8],
        signature: &Signature,
        public_key: &PublicKey,
    ) -> Result<bool> {
        let r = scalar_from_bytes(&signature.r())
            .ok_or_else(|| SdkError::Crypto("Invalid signature: r out of range".to_string()))?;
        let s = scalar_from_bytes(&signature.s())
            .ok_or_else(|| SdkError::Crypto("Invalid signature: s out of range".to_string()))?;
        if bool::from(r.is_zero()) || bool::from(s.is_zero()) {
            return Err(SdkError::Crypto("Invalid signature: zero component".to_string()));
        }

        let p = public_key.to_k256()?.to_projective();
        let q = ProjectivePoint::GENERATOR * s + p * r;
        if q == ProjectivePoint::IDENTITY {
            return Ok(false);
        }

        let expected = challenge(&q, public_key, message);
        Ok(expected == r)
    }
}

/// One signing attempt with a given nonce; `None` if the nonce produced a degenerate signature
fn try_sign(message: &[u8], k: &Scalar, x: &Scalar, public_key: &PublicKey) -> Option<Signature> {
    let q = ProjectivePoint::GENERATOR * k;
    let r = challenge(&q, public_key, message);
    if bool::from(r.is_zero()) {
        return None;
    }
    let s = *k - r * x;
    if bool::from(s.is_zero()) {
        return None;
    }

    let r_bytes: [u8; 32] = r.to_bytes().into();
    let s_bytes: [u8; 32] = s.to_bytes().into();
    Some(Signature::from_parts(&r_bytes, &s_bytes))
}

/// `SHA256(compress(Q) || P || m) mod n`
fn challenge(q: &ProjectivePoint, public_key: &PublicKey, message: &[u8]) -> Scalar {
    let q_compressed = q.to_affine().to_encoded_point(true);
    let digest = sha256_all(&[q_compressed.as_bytes(), public_key.as_bytes(), message]);
    <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(digest))
}

/// Canonical big-endian scalar; `None` when the value is not below the group order
fn scalar_from_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::from(Scalar::from_repr(FieldBytes::from(*bytes)))
}

/// Get public key from secret key
pub fn public_key_from_secret(secret_key: &SecretKey) -> PublicKey {
    PublicKey::from_k256(&secret_key.public_key())
}

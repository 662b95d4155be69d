// Copyright (C) 2020-2026  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Signing and signature verification backends used for `COSE_Sign1` structures.
//!
//! The traits here are the seams through which the crate signs the Mobile Security Object and
//! verifies the issuer's signature.  The [`EcdsaSigner`] & [`EcdsaVerifier`] implementations are
//! backed by OpenSSL.

use std::result::Result as StdResult;

use bherror::traits::{ErrorContext as _, ForeignError as _};
use bhx5chain::X5Chain;
use openssl::{
    bn::{BigNum, BigNumContext},
    ec::{EcGroup, EcKey, EcKeyRef},
    ecdsa::EcdsaSig,
    nid::Nid,
    pkey::{HasPublic, PKey, PKeyRef, Private, Public},
};
use serde::{Deserialize, Serialize};

use crate::{
    utils::digest::{sha256, sha384, sha512},
    MdocError, Result,
};

/// Boxed error returned by the pluggable backends.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Signature algorithms supported for the issuer's `COSE_Sign1` signature.
///
/// All of them are ECDSA variants, each tied to a single curve and digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SigningAlgorithm {
    /// ECDSA over P-256 with SHA-256
    Es256,
    /// ECDSA over P-384 with SHA-384
    Es384,
    /// ECDSA over P-521 with SHA-512
    Es512,
}

impl SigningAlgorithm {
    /// All the supported algorithms.
    pub const ALL: [Self; 3] = [Self::Es256, Self::Es384, Self::Es512];

    /// Returns the algorithm whose curve is `curve`, if any.
    pub fn from_curve(curve: Nid) -> Option<Self> {
        Self::ALL.into_iter().find(|algorithm| algorithm.curve() == curve)
    }

    /// The OpenSSL identifier of the curve of this algorithm.
    pub fn curve(&self) -> Nid {
        match self {
            Self::Es256 => Nid::X9_62_PRIME256V1,
            Self::Es384 => Nid::SECP384R1,
            Self::Es512 => Nid::SECP521R1,
        }
    }

    /// Length in bytes of a single coordinate or signature component on the curve.
    pub fn coordinate_len(&self) -> usize {
        match self {
            Self::Es256 => 32,
            Self::Es384 => 48,
            Self::Es512 => 66,
        }
    }

    fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Es256 => sha256(message).to_vec(),
            Self::Es384 => sha384(message).to_vec(),
            Self::Es512 => sha512(message).to_vec(),
        }
    }
}

impl std::fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::Es512 => "ES512",
        })
    }
}

/// An external signing backend.
///
/// The output of the signer must be the concatenation `r || s` of the ECDSA signature
/// components, each left-padded to [`SigningAlgorithm::coordinate_len`] bytes.
pub trait Signer {
    /// The algorithm this signer uses. Must be a constant function.
    fn algorithm(&self) -> SigningAlgorithm;

    /// Produce the signature of `message`.
    fn sign(&self, message: &[u8]) -> StdResult<Vec<u8>, BoxError>;
}

/// Subtrait for [`Signer`]-s which have an associated `x5chain`.
pub trait HasX5Chain: Signer {
    /// Return the certificate chain of the signing key, starting with its own certificate.
    fn x5chain(&self) -> X5Chain;
}

/// An external backend for signature verification.
pub trait SignatureVerifier: Sync {
    /// The algorithm used for the signature verification.
    fn algorithm(&self) -> SigningAlgorithm;

    /// Verifies the signature of the message, against the provided public key.
    ///
    /// # Return
    /// Method returns `Ok(true)` if the signature if valid for the given
    /// message, `Ok(false)` if it isn't (but there was no issue with the
    /// verifier itself), and `Err(_)` when the verifier itself encounters an
    /// error for any other reason.
    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &PKeyRef<Public>,
    ) -> StdResult<bool, BoxError>;
}

/// [`Signer`] implementation of the ECDSA algorithms.
pub struct EcdsaSigner {
    algorithm: SigningAlgorithm,
    private_key: EcKey<Private>,
}

impl EcdsaSigner {
    /// Generate a fresh key on the curve of `algorithm`.
    pub fn generate(algorithm: SigningAlgorithm) -> Result<Self> {
        let group = EcGroup::from_curve_name(algorithm.curve()).foreign_err(|| MdocError::Crypto)?;
        let private_key = EcKey::generate(&group)
            .foreign_err(|| MdocError::Crypto)
            .ctx(|| "key generation failed")?;

        Ok(Self {
            algorithm,
            private_key,
        })
    }

    /// Create a signer from a private key in the PEM format.
    ///
    /// The algorithm is determined by the curve of the key.
    pub fn from_private_key_pem(private_key_pem: &[u8]) -> Result<Self> {
        let private_key =
            EcKey::private_key_from_pem(private_key_pem).foreign_err(|| MdocError::Crypto)?;
        let algorithm = algorithm_of(&private_key)?;

        Ok(Self {
            algorithm,
            private_key,
        })
    }

    /// The public key of this signer.
    pub fn public_key(&self) -> Result<PKey<Public>> {
        let public_key =
            EcKey::from_public_key(self.private_key.group(), self.private_key.public_key())
                .foreign_err(|| MdocError::Crypto)?;

        PKey::from_ec_key(public_key).foreign_err(|| MdocError::Crypto)
    }

    /// Attaches the certificate chain of this signer's key.
    pub fn with_x5chain(self, x5chain: X5Chain) -> SignerWithChain<Self> {
        SignerWithChain {
            signer: self,
            x5chain,
        }
    }
}

impl Signer for EcdsaSigner {
    fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    fn sign(&self, message: &[u8]) -> StdResult<Vec<u8>, BoxError> {
        let digest = self.algorithm.digest(message);
        let signature = EcdsaSig::sign(&digest, self.private_key.as_ref())?;

        let len = self.algorithm.coordinate_len() as i32;
        let mut raw = signature.r().to_vec_padded(len)?;
        raw.extend(signature.s().to_vec_padded(len)?);

        Ok(raw)
    }
}

/// A [`Signer`] together with the certificate chain of its key.
pub struct SignerWithChain<S> {
    signer: S,
    x5chain: X5Chain,
}

impl<S: Signer> Signer for SignerWithChain<S> {
    fn algorithm(&self) -> SigningAlgorithm {
        self.signer.algorithm()
    }

    fn sign(&self, message: &[u8]) -> StdResult<Vec<u8>, BoxError> {
        self.signer.sign(message)
    }
}

impl<S: Signer> HasX5Chain for SignerWithChain<S> {
    fn x5chain(&self) -> X5Chain {
        self.x5chain.clone()
    }
}

/// [`SignatureVerifier`] implementation of the ECDSA algorithms.
#[derive(Debug, Clone, Copy)]
pub struct EcdsaVerifier {
    algorithm: SigningAlgorithm,
}

impl EcdsaVerifier {
    /// Creates a verifier of `algorithm` signatures.
    pub fn new(algorithm: SigningAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl SignatureVerifier for EcdsaVerifier {
    fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &PKeyRef<Public>,
    ) -> StdResult<bool, BoxError> {
        let public_key = public_key.ec_key()?;
        if algorithm_of(&public_key)? != self.algorithm {
            return Err(Box::new(bherror::Error::root(
                MdocError::KeyAlgorithmMismatch(self.algorithm),
            )));
        }

        let len = self.algorithm.coordinate_len();
        if signature.len() != 2 * len {
            return Ok(false);
        }

        let (r, s) = signature.split_at(len);
        let signature =
            EcdsaSig::from_private_components(BigNum::from_slice(r)?, BigNum::from_slice(s)?)?;

        let digest = self.algorithm.digest(message);

        Ok(signature.verify(&digest, &public_key)?)
    }
}

/// Returns the [`SigningAlgorithm`] matching the curve of `key`.
pub(crate) fn algorithm_of<T: HasPublic>(key: &EcKeyRef<T>) -> Result<SigningAlgorithm> {
    key.group()
        .curve_name()
        .and_then(SigningAlgorithm::from_curve)
        .ok_or_else(|| bherror::Error::root(MdocError::Crypto).ctx("unsupported curve"))
}

/// Returns the algorithm of the EC `key`, along with its affine coordinates padded to the
/// coordinate length of the curve.
pub(crate) fn ec_public_coordinates<T: HasPublic>(
    key: &EcKeyRef<T>,
) -> Result<(SigningAlgorithm, Vec<u8>, Vec<u8>)> {
    let algorithm = algorithm_of(key)?;

    let mut x = BigNum::new().foreign_err(|| MdocError::Crypto)?;
    let mut y = BigNum::new().foreign_err(|| MdocError::Crypto)?;
    let mut ctx = BigNumContext::new().foreign_err(|| MdocError::Crypto)?;
    key.public_key()
        .affine_coordinates(key.group(), &mut x, &mut y, &mut ctx)
        .foreign_err(|| MdocError::Crypto)?;

    let len = algorithm.coordinate_len() as i32;
    let x = x.to_vec_padded(len).foreign_err(|| MdocError::Crypto)?;
    let y = y.to_vec_padded(len).foreign_err(|| MdocError::Crypto)?;

    Ok((algorithm, x, y))
}

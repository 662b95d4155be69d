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

use bherror::traits::{ErrorContext as _, ForeignError as _};
use openssl::{
    error::ErrorStack,
    pkey::{PKey, Public},
    stack::Stack,
    x509::{
        store::{X509Store, X509StoreBuilder},
        verify::{X509VerifyFlags, X509VerifyParam},
        X509StoreContext, X509VerifyResult, X509,
    },
};

use crate::{verify_x5chain, Error, Result, VerifyOptions};

/// The `x5chain` as defined in [RFC 9360][1].
///
/// The certificates are ordered starting with the certificate containing the end-entity key
/// followed by the certificate that signed it, and so on, as stated in [RFC 9360][1].
///
/// All methods of this type that return an [`Error`] do so in case the `x5chain` is invalid.
///
/// [1]: <https://www.rfc-editor.org/rfc/rfc9360.html#section-2-5.4.1>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct X5Chain {
    // Never empty; the leaf comes first.
    certificates: Vec<X509>,
}

impl X5Chain {
    /// Create a new [`X5Chain`].
    ///
    /// The chain **MUST BE** ordered in such a way that the leaf certificate is at first place,
    /// then goes its issuer, and so on.  Only the names & key identifiers linking the certificates
    /// are checked here.
    ///
    /// # Warning
    ///
    /// Neither the signatures nor the validity periods are checked at this point.  Use
    /// [`X5Chain::verify`] for that, and [`X5Chain::verify_against_trusted_roots`] to validate the
    /// chain against a trusted root certificate.
    pub fn new(certificates: Vec<X509>) -> Result<Self> {
        validate_chain_order(&certificates)?;

        Ok(Self { certificates })
    }

    /// Constructs a [`X5Chain`] from raw bytes.
    ///
    /// Each certificate **MUST BE** represented as a [`Vec`] of bytes of the respective certificate
    /// in the _DER_ format, ordered as described in [`X5Chain::new`].
    pub fn from_raw_bytes(bytes: &[Vec<u8>]) -> Result<Self> {
        Self::new(parse_der_certificates(bytes)?)
    }

    /// Verify the signatures of the chain, and optionally the validity periods of its
    /// certificates, as described in [`verify_x5chain`].
    pub fn verify(&self, options: &VerifyOptions) -> Result<()> {
        verify_x5chain(&self.certificates, options)
    }

    /// Verify the [`X5Chain`] against trusted root certificates.
    ///
    /// The root certificate may be in chain, but it **MUST BE** found in `trust` as well.  The
    /// validity periods are checked at `now` (UNIX seconds), or against the current system time
    /// when it is [`None`].
    pub fn verify_against_trusted_roots(
        &self,
        trust: &X509Trust,
        now: Option<i64>,
    ) -> Result<()> {
        // `X509Store` and `Stack` are neither `Clone` nor `Debug`, so they are built per call.
        let untrusted = chain_to_stack(self.certificates[1..].iter().cloned())?;
        let trust = certs_to_store(trust.0.iter().cloned(), now)?;

        // The leaf in the untrusted chain is ignored by `X509StoreContext`.
        // See https://docs.openssl.org/master/man3/X509_STORE_CTX_new/
        let mut context = X509StoreContext::new().foreign_err(|| Error::X5Chain)?;
        let is_valid = context
            .init(&trust, self.leaf_certificate(), &untrusted, |ctx| {
                clean_up_after_openssl(|| ctx.verify_cert())
            })
            .foreign_err(|| Error::X5Chain)?;

        if !is_valid {
            return Err(bherror::Error::root(Error::X5Chain)
                .ctx("Chain validation against trusted root certificates failed")
                .ctx(format!(
                    "OpenSSL error on depth {}: {}",
                    context.error_depth(),
                    context.error()
                )));
        };

        Ok(())
    }

    /// Convert the chain into a list of DER encoded certificates.
    pub fn as_bytes(&self) -> Result<Vec<Vec<u8>>> {
        self.certificates
            .iter()
            .map(|certificate| certificate.to_der().foreign_err(|| Error::X5Chain))
            .collect()
    }

    /// Returns the public key from the leaf certificate.
    pub fn leaf_certificate_key(&self) -> Result<PKey<Public>> {
        self.leaf_certificate()
            .public_key()
            .foreign_err(|| Error::X5Chain)
            .ctx(|| "Failed to access X509 public key")
    }

    /// Returns the leaf certificate.
    pub fn leaf_certificate(&self) -> &X509 {
        &self.certificates[0]
    }

    /// Returns all the certificates, starting with the leaf.
    pub fn certificates(&self) -> &[X509] {
        &self.certificates
    }
}

/// Parses a list of DER encoded certificates, keeping their order.
pub fn parse_der_certificates(bytes: &[Vec<u8>]) -> Result<Vec<X509>> {
    bytes
        .iter()
        .enumerate()
        .map(|(i, der)| X509::from_der(der).foreign_err(|| Error::X5Chain).ctx(|| i))
        .collect::<Result<_>>()
        .ctx(|| "invalid X509 certificate")
}

/// A collection of [`X509`] trusted root certificates.
///
/// This is used to verify the authenticity of the [`X5Chain`].
#[derive(Debug, Clone)]
pub struct X509Trust(Vec<X509>);

impl X509Trust {
    /// Create a new [`X509Trust`].
    pub fn new(trust: Vec<X509>) -> Self {
        Self(trust)
    }

    /// Create a new [`X509Trust`] out of concatenated PEM certificates.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let certificates = X509::stack_from_pem(pem)
            .foreign_err(|| Error::X5Chain)
            .ctx(|| "invalid trusted root certificates")?;

        if certificates.is_empty() {
            return Err(bherror::Error::root(Error::X5Chain).ctx("no trusted root certificates"));
        }

        Ok(Self(certificates))
    }
}

/// Helper method for converting certificates to `Stack<x509>`.
fn chain_to_stack(chain: impl IntoIterator<Item = X509>) -> Result<Stack<X509>> {
    let mut stack = Stack::new().foreign_err(|| Error::X5Chain)?;

    for cert in chain {
        stack.push(cert).foreign_err(|| Error::X5Chain)?;
    }

    Ok(stack)
}

/// Helper method for converting certificates to `X509Store`.
fn certs_to_store(
    certificates: impl IntoIterator<Item = X509>,
    now: Option<i64>,
) -> Result<X509Store> {
    let mut builder = X509StoreBuilder::new().foreign_err(|| Error::X5Chain)?;
    builder
        .set_flags(X509VerifyFlags::X509_STRICT | X509VerifyFlags::CHECK_SS_SIGNATURE)
        .foreign_err(|| Error::X5Chain)?;

    if let Some(now) = now {
        // Also sets `X509_V_FLAG_USE_CHECK_TIME`, which the store inherits.
        let mut param = X509VerifyParam::new().foreign_err(|| Error::X5Chain)?;
        param.set_time(now as _);
        builder.set_param(&param).foreign_err(|| Error::X5Chain)?;
    }

    for cert in certificates {
        builder.add_cert(cert).foreign_err(|| Error::X5Chain)?;
    }

    Ok(builder.build())
}

/// Validates that each certificate in the chain was issued by the one following it.
///
/// # Note
///
/// This check is not provided through [`X509StoreContext`]. Without this check,
/// chains in reversed order would seem valid, even though they are not.
fn validate_chain_order(chain: &[X509]) -> Result<()> {
    if chain.is_empty() {
        return Err(bherror::Error::root(Error::X5Chain).ctx("chain is empty"));
    }

    for (index, pair) in chain.windows(2).enumerate() {
        let (child, parent) = (&pair[0], &pair[1]);

        let relationship = parent.issued(child);
        if relationship != X509VerifyResult::OK {
            return Err(bherror::Error::root(Error::X5Chain)
                .ctx("invalid chain order")
                .ctx(format!(
                    "certificate {} is not issued by certificate {}: {}",
                    index,
                    index + 1,
                    relationship
                )));
        }
    }

    Ok(())
}

/// Wrap a closure calling OpenSSL with low-level cleanup to make it safer in an async context.
///
/// Usage: wrap an `openssl` call in a closure and call this function with it.
/// Try to make the closure as small as possible.
pub(crate) fn clean_up_after_openssl<T>(
    f: impl FnOnce() -> std::result::Result<T, ErrorStack>,
) -> std::result::Result<T, ErrorStack> {
    let return_value = f()?;

    // The call succeeded, so anything left on the error stack is stale.
    drop(ErrorStack::get());

    Ok(return_value)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use openssl::{
        ec::{EcGroup, EcKey},
        nid::Nid,
    };

    use super::*;
    use crate::{Builder, Validity};

    const DAY: i64 = 24 * 60 * 60;

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    fn current() -> Validity {
        Validity::new(now() - DAY, now() + 30 * DAY)
    }

    fn public_key() -> PKey<Public> {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
        let key = EcKey::generate(&group).unwrap();
        PKey::from_ec_key(EcKey::from_public_key(&group, key.public_key()).unwrap()).unwrap()
    }

    /// Certificates are in order: leaf, intermediary, root.
    fn get_certs() -> [X509; 3] {
        let root = Builder::self_signed_root("root", current()).unwrap();
        let intermediary = root.issue_intermediary("intermediary", current()).unwrap();
        let leaf = intermediary
            .issue_leaf(&public_key(), "leaf", current())
            .unwrap();

        [
            leaf,
            intermediary.certificate().clone(),
            root.certificate().clone(),
        ]
    }

    #[test]
    fn test_validate_chain_order() {
        let [leaf, intermediary, root] = get_certs();

        // valid order
        validate_chain_order(&[leaf.clone(), intermediary.clone(), root.clone()]).unwrap();

        // reversed order is invalid
        let err = validate_chain_order(&[intermediary, leaf]).unwrap_err();
        assert!(matches!(err.error, Error::X5Chain));
        assert_empty_error_stack();

        // empty is invalid
        let err = validate_chain_order(&[]).unwrap_err();
        assert!(matches!(err.error, Error::X5Chain));
        assert_empty_error_stack();

        // single certificate is valid
        validate_chain_order(&[root]).unwrap();
    }

    #[test]
    fn test_from_raw_bytes() {
        let [leaf, intermediary, root] = get_certs();
        let leaf = leaf.to_der().unwrap();
        let intermediary = intermediary.to_der().unwrap();
        let root = root.to_der().unwrap();

        // valid chain
        let chain = X5Chain::from_raw_bytes(&[leaf.clone(), intermediary, root]).unwrap();
        assert_eq!(chain.as_bytes().unwrap()[0], leaf);
        assert_eq!(chain.certificates().len(), 3);

        // empty chain is invalid
        let err = X5Chain::from_raw_bytes(&[]).unwrap_err();
        assert!(matches!(err.error, Error::X5Chain));
        assert_empty_error_stack();

        // invalid bytes
        let err = X5Chain::from_raw_bytes(&[vec![0u8, 1u8], vec![2u8]]).unwrap_err();
        assert!(matches!(err.error, Error::X5Chain));
        assert_empty_error_stack();
    }

    #[test]
    fn test_verify() {
        let [leaf, intermediary, root] = get_certs();

        let chain = X5Chain::new(vec![leaf.clone(), intermediary.clone(), root]).unwrap();
        chain.verify(&VerifyOptions::at(now())).unwrap();

        // Without the root, the intermediary isn't self-signed.
        let chain = X5Chain::new(vec![leaf, intermediary]).unwrap();
        let err = chain.verify(&VerifyOptions::at(now())).unwrap_err();
        assert_eq!(err.error, Error::InvalidSignature(1));
    }

    #[test]
    fn test_verify_against_trusted_roots() {
        let [leaf, intermediary, root] = get_certs();

        let chain = X5Chain::new(vec![leaf.clone(), intermediary.clone()]).unwrap();

        // Chain is valid when the root CA is trusted
        let trusted = X509Trust::new(vec![root.clone()]);
        chain.verify_against_trusted_roots(&trusted, None).unwrap();

        // Chain is not valid when there are no trusted root CAs (this would
        // pass if `X509VerifyFlags::PARTIAL_CHAIN` was used)
        let trusted = X509Trust::new(vec![intermediary.clone()]);
        chain.verify_against_trusted_roots(&trusted, None).unwrap_err();
        assert_empty_error_stack();

        // Chain is not valid if leaf cannot be traced to root
        let chain = X5Chain::new(vec![leaf.clone()]).unwrap();
        let trusted = X509Trust::new(vec![root.clone()]);
        chain.verify_against_trusted_roots(&trusted, None).unwrap_err();
        assert_empty_error_stack();

        // Chain is not valid when leaf cannot be traced to any trusted root
        let chain = X5Chain::new(vec![leaf, intermediary, root]).unwrap();
        let trusted = X509Trust::new(Vec::new());
        chain.verify_against_trusted_roots(&trusted, None).unwrap_err();
        assert_empty_error_stack();
    }

    #[test]
    fn trusted_roots_checked_at_given_time() {
        // 2020-06-01T00:00:00Z
        let then = 1_591_000_000;
        let past = Validity::new(then - DAY, then + 30 * DAY);

        let root = Builder::self_signed_root("root", past).unwrap();
        let chain = root.generate_x5chain(&public_key(), past).unwrap();
        let trusted = root.trust();

        chain
            .verify_against_trusted_roots(&trusted, Some(then))
            .unwrap();
        assert_empty_error_stack();

        // Expired at the current system time.
        chain.verify_against_trusted_roots(&trusted, None).unwrap_err();
        assert_empty_error_stack();

        // Not yet valid.
        chain
            .verify_against_trusted_roots(&trusted, Some(then - 2 * DAY))
            .unwrap_err();
        assert_empty_error_stack();

        // A chain valid now is rejected at a time past its expiry.
        let [leaf, intermediary, root] = get_certs();
        let chain = X5Chain::new(vec![leaf, intermediary]).unwrap();
        chain
            .verify_against_trusted_roots(&X509Trust::new(vec![root]), Some(now() + 60 * DAY))
            .unwrap_err();
        assert_empty_error_stack();
    }

    #[test]
    fn test_trust_from_pem() {
        let [_, _, root] = get_certs();
        let pem = root.to_pem().unwrap();

        let trust = X509Trust::from_pem(&pem).unwrap();
        assert_eq!(trust.0, vec![root]);

        X509Trust::from_pem(b"not a certificate").unwrap_err();
    }

    pub(crate) fn assert_empty_error_stack() {
        let errors = openssl::error::ErrorStack::get();
        assert!(
            errors.errors().is_empty(),
            "Error stack was non-empty: {:?}",
            errors
        );
    }
}

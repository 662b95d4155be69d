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

use std::{num::NonZeroUsize, ops::Shr};

use bherror::traits::{ErrorContext as _, ForeignError as _};
use openssl::{
    asn1::{Asn1Integer, Asn1Time},
    bn::BigNum,
    ec::{EcGroup, EcKey},
    hash::MessageDigest,
    nid::Nid,
    pkey::{PKey, PKeyRef, Private, Public},
    x509::{
        extension::{AuthorityKeyIdentifier, BasicConstraints, KeyUsage, SubjectKeyIdentifier},
        X509Builder, X509Name, X509NameBuilder, X509NameRef, X509Ref, X509VerifyResult, X509,
    },
};
use rand::RngCore;

use crate::{Error, Result, X509Trust, X5Chain};

type PrivateKey = PKey<Private>;
type PublicKey = PKey<Public>;

/// X.509v3
///
/// See [RFC 5280 - section 4.1.2.1](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.1)
const VERSION: i32 = 2;

/// Length of the certificate serial number in bits.
///
/// See [RFC 5280 - section 4.1.2.2](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.2),
/// and this answer from [stackoverflow](https://stackoverflow.com/a/55277597).
const SERIAL_NUMBER_BITS: usize = 159;

/// Validity period of an issued certificate, as UNIX timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validity {
    /// The `notBefore` field of the certificate.
    pub not_before: i64,
    /// The `notAfter` field of the certificate.
    pub not_after: i64,
}

impl Validity {
    /// Creates a new [`Validity`].
    pub fn new(not_before: i64, not_after: i64) -> Self {
        Self {
            not_before,
            not_after,
        }
    }
}

/// Which extensions an issued certificate gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Profile {
    /// A root or intermediary certificate authority.
    Authority,
    /// A leaf used for general-purpose signing, e.g. of a Mobile Security Object.
    EndEntity,
}

#[derive(Debug)]
struct CertificatePrivateKeyPair {
    cert: X509,
    private_key: PrivateKey,
}

/// The signing side of [`issue_certificate`].
struct Signer<'a> {
    name: &'a X509NameRef,
    // `None` when the certificate is self-signed.
    certificate: Option<&'a X509Ref>,
    private_key: &'a PKeyRef<Private>,
}

impl CertificatePrivateKeyPair {
    fn from_private_key_and_cert(private_key: &str, cert: &str) -> Result<Self> {
        let private_key = PrivateKey::private_key_from_pem(private_key.as_bytes())
            .foreign_err(|| Error::Builder)
            .ctx(|| "couldn't load private key")?;

        let cert = X509::from_pem(cert.as_bytes())
            .foreign_err(|| Error::Builder)
            .ctx(|| "couldn't load certificate")?;

        Ok(Self { cert, private_key })
    }

    fn signer(&self) -> Signer<'_> {
        Signer {
            name: self.cert.subject_name(),
            certificate: Some(self.cert.as_ref()),
            private_key: &self.private_key,
        }
    }
}

fn generate_private_key() -> Result<PrivateKey> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).foreign_err(|| Error::Builder)?;
    let key = EcKey::generate(&group).foreign_err(|| Error::Builder)?;

    PrivateKey::from_ec_key(key)
        .foreign_err(|| Error::Builder)
        .ctx(|| "couldn't generate private key")
}

fn public_key_of(private_key: &PrivateKey) -> Result<PublicKey> {
    let der = private_key
        .public_key_to_der()
        .foreign_err(|| Error::Builder)?;

    PublicKey::public_key_from_der(&der).foreign_err(|| Error::Builder)
}

fn common_name(name: &str) -> Result<X509Name> {
    let mut builder = X509NameBuilder::new()
        .foreign_err(|| Error::Builder)
        .ctx(|| "couldn't create subject name")?;
    builder
        .append_entry_by_text("CN", name)
        .foreign_err(|| Error::Builder)
        .ctx(|| "couldn't append entry to subject name")?;

    Ok(builder.build())
}

/// Generate a vector of `n_bits`-many random bits which are not all zero, represented as a big
/// endian byte vector of minimum size.
///
/// All-zero samples are rejected, with at most 256 attempts.  Under the hypothesis that the RNG
/// output is uniform, exhausting the attempts happens with probability at most `2^(-256)`, so it
/// is reported as an error.
fn generate_random_nonzero_bits_big_endian(n_bits: NonZeroUsize) -> Result<Vec<u8>> {
    const MAX_ITERATIONS: usize = 256;

    let mut rng = rand::rng();

    let bytes = n_bits.get().div_ceil(8);
    let leading_zeros = (bytes * 8 - n_bits.get()) as u32;
    let most_significant_byte_mask = u8::MAX.shr(leading_zeros);

    let mut sample = vec![0u8; bytes];

    for _ in 0..MAX_ITERATIONS {
        rng.fill_bytes(&mut sample);
        sample[0] &= most_significant_byte_mask;

        if sample.iter().any(|b| *b != 0) {
            return Ok(sample);
        }
    }

    Err(bherror::Error::root(Error::Builder).ctx("Failed to generate a nonzero random bit vector"))
}

/// See this [stackexchange answer](https://crypto.stackexchange.com/questions/257/unpredictability-of-x-509-serial-numbers)
/// for more details.
fn generate_random_serial_number() -> Result<Asn1Integer> {
    let bits = NonZeroUsize::new(SERIAL_NUMBER_BITS)
        .ok_or_else(|| bherror::Error::root(Error::Builder))?;
    let serial_number = generate_random_nonzero_bits_big_endian(bits)?;

    BigNum::from_slice(&serial_number)
        .and_then(|serial_number| serial_number.to_asn1_integer())
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot create serial number")
}

fn set_validity(cert_builder: &mut X509Builder, validity: Validity) -> Result<()> {
    let not_before = Asn1Time::from_unix(validity.not_before)
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot create `not_before` time")?;
    cert_builder
        .set_not_before(&not_before)
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot set `not_before` time")?;

    let not_after = Asn1Time::from_unix(validity.not_after)
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot create `not_after` time")?;
    cert_builder
        .set_not_after(&not_after)
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot set `not_after` time")
}

/// Low-level method for creation of certificates.
fn issue_certificate(
    signer: &Signer<'_>,
    subject_public_key: &PKeyRef<Public>,
    subject_name: &X509NameRef,
    validity: Validity,
    profile: Profile,
) -> Result<X509> {
    let mut cert_builder = X509::builder()
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot create cert builder")?;
    cert_builder
        .set_version(VERSION)
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot set cert version")?;

    let serial_number = generate_random_serial_number()?;
    cert_builder
        .set_serial_number(&serial_number)
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot set serial number")?;

    cert_builder
        .set_pubkey(subject_public_key)
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot set public key")?;
    cert_builder
        .set_subject_name(subject_name)
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot set subject name")?;
    cert_builder
        .set_issuer_name(signer.name)
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot set issuer name")?;

    set_validity(&mut cert_builder, validity)?;

    let (basic_constraints, key_usage) = match profile {
        Profile::Authority => (
            BasicConstraints::new().critical().ca().build(),
            KeyUsage::new()
                .critical()
                .key_cert_sign()
                .crl_sign()
                .build(),
        ),
        Profile::EndEntity => (
            BasicConstraints::new().build(),
            KeyUsage::new()
                .critical()
                .digital_signature()
                .non_repudiation()
                .build(),
        ),
    };

    let basic_constraints = basic_constraints
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot create basic_constraints")?;
    cert_builder
        .append_extension(basic_constraints)
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot append basic constraints")?;

    let key_usage = key_usage
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot create key_usage")?;
    cert_builder
        .append_extension(key_usage)
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot append key usage")?;

    let subject_key_identifier = SubjectKeyIdentifier::new()
        .build(&cert_builder.x509v3_context(signer.certificate, None))
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot create subject_key_identifier")?;
    cert_builder
        .append_extension(subject_key_identifier)
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot append subject key identifier")?;

    // Self-signed roots don't need an authority key identifier.
    if let Some(issuer_certificate) = signer.certificate {
        let authority_key_identifier = AuthorityKeyIdentifier::new()
            .keyid(false)
            .issuer(false)
            .build(&cert_builder.x509v3_context(Some(issuer_certificate), None))
            .foreign_err(|| Error::Builder)
            .ctx(|| "Cannot create authority_key_identifier")?;
        cert_builder
            .append_extension(authority_key_identifier)
            .foreign_err(|| Error::Builder)
            .ctx(|| "Cannot append authority key identifier")?;
    }

    cert_builder
        .sign(signer.private_key, MessageDigest::sha256())
        .foreign_err(|| Error::Builder)
        .ctx(|| "Cannot sign certificate")?;

    Ok(cert_builder.build())
}

/// Builder of [`X5Chain`]; essentially a lightweight certificate authority.
///
/// It holds the private key & certificate of the issuing authority, along with the certificates
/// of all its ancestors up to the trusted root.
///
/// # Use case
///
/// The purpose of this builder is being able to programatically generate a leaf
/// certificate with a non-trivial certificate chain, without having to shell
/// out to e.g. the `openssl` tool.  Validity periods are explicit, so expired and not yet valid
/// chains can be produced as well.
///
/// The primary use cases are tests or demo software - this is not a
/// production-grade CA implementation.
#[derive(Debug)]
pub struct Builder {
    authority: CertificatePrivateKeyPair,
    // Issuers of the authority certificate, ending with the trusted root.
    ancestors: Vec<X509>,
}

impl Builder {
    /// Constructor of [`Builder`] expecting all input data to be in PEM format.
    ///
    /// The authority may be the trusted root itself.
    pub fn new(
        authority_private_key: &str,
        authority_certificate: &str,
        trusted_root_certificate: &str,
    ) -> Result<Self> {
        let trusted_root_certificate = X509::from_pem(trusted_root_certificate.as_bytes())
            .foreign_err(|| Error::Builder)
            .ctx(|| "invalid trusted root certificate")?;

        let authority = CertificatePrivateKeyPair::from_private_key_and_cert(
            authority_private_key,
            authority_certificate,
        )
        .ctx(|| "invalid certificate and private key pair")?;

        if trusted_root_certificate.issued(&authority.cert) != X509VerifyResult::OK {
            return Err(bherror::Error::root(Error::Builder))
                .ctx(|| "authority certificate must be issued by trusted root");
        }

        let ancestors = if authority.cert == trusted_root_certificate {
            Vec::new()
        } else {
            vec![trusted_root_certificate]
        };

        Ok(Self {
            authority,
            ancestors,
        })
    }

    /// Creates a new trusted root authority with a freshly generated P-256 key.
    pub fn self_signed_root(common_name_text: &str, validity: Validity) -> Result<Self> {
        let private_key = generate_private_key()?;
        let public_key = public_key_of(&private_key)?;
        let name = common_name(common_name_text)?;

        let signer = Signer {
            name: &name,
            certificate: None,
            private_key: &private_key,
        };
        let cert = issue_certificate(&signer, &public_key, &name, validity, Profile::Authority)
            .ctx(|| "couldn't issue root certificate")?;

        Ok(Self {
            authority: CertificatePrivateKeyPair { cert, private_key },
            ancestors: Vec::new(),
        })
    }

    /// Creates a new intermediary authority with a freshly generated P-256 key, issued by this
    /// authority.
    pub fn issue_intermediary(&self, common_name_text: &str, validity: Validity) -> Result<Self> {
        let private_key = generate_private_key()?;
        let public_key = public_key_of(&private_key)?;
        let name = common_name(common_name_text)?;

        let cert = issue_certificate(
            &self.authority.signer(),
            &public_key,
            &name,
            validity,
            Profile::Authority,
        )
        .ctx(|| "couldn't issue intermediary certificate")?;

        let mut ancestors = vec![self.authority.cert.clone()];
        ancestors.extend(self.ancestors.iter().cloned());

        Ok(Self {
            authority: CertificatePrivateKeyPair { cert, private_key },
            ancestors,
        })
    }

    /// Issues a leaf certificate for `public_key`, with extensions suitable for general-purpose
    /// signing.
    pub fn issue_leaf(
        &self,
        public_key: &PKeyRef<Public>,
        common_name_text: &str,
        validity: Validity,
    ) -> Result<X509> {
        let name = common_name(common_name_text)?;

        issue_certificate(
            &self.authority.signer(),
            public_key,
            &name,
            validity,
            Profile::EndEntity,
        )
        .ctx(|| "couldn't issue leaf certificate")
    }

    /// Create [`X5Chain`] ending with the trusted root, for a new leaf certificate of
    /// `leaf_public_key`.
    pub fn generate_x5chain(
        &self,
        leaf_public_key: &PKeyRef<Public>,
        validity: Validity,
    ) -> Result<X5Chain> {
        let leaf = self.issue_leaf(leaf_public_key, "issuer", validity)?;

        let mut chain = vec![leaf];
        chain.extend(self.chain());

        X5Chain::new(chain)
    }

    /// Certificate of this authority.
    pub fn certificate(&self) -> &X509 {
        &self.authority.cert
    }

    /// Certificates of this authority and its ancestors, ending with the trusted root.
    pub fn chain(&self) -> Vec<X509> {
        std::iter::once(&self.authority.cert)
            .chain(&self.ancestors)
            .cloned()
            .collect()
    }

    /// The trusted root of this authority, as a [`X509Trust`].
    pub fn trust(&self) -> X509Trust {
        let root = self.ancestors.last().unwrap_or(&self.authority.cert);

        X509Trust::new(vec![root.clone()])
    }
}

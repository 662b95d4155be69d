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

//! This module implements the issuer data authentication, as described in the section `9.1.2` of
//! the [ISO/IEC 18013-5:2021][1] standard.
//!
//! The Issuer signs the [`MobileSecurityObject`] holding the digests of every issued data element
//! as a `COSE_Sign1` structure, with the certificate chain of the signing key in the `x5chain`
//! header.
//!
//! [1]: <https://www.iso.org/standard/69084.html>

use std::collections::HashMap;

use bherror::traits::{
    ErrorContext as _, ForeignBoxed as _, ForeignError as _, PropagateError as _,
};
use bhx5chain::{parse_der_certificates, verify_x5chain, VerifyOptions, X5Chain};
use ciborium::Value;
use coset::{
    iana::{EnumI64 as _, HeaderParameter},
    Algorithm, CoseKey, Header, Label, RegisteredLabelWithPrivate,
};
use openssl::{
    pkey::{PKeyRef, Public},
    x509::X509,
};

use super::{
    response::{DigestID, IssuerNameSpaces, IssuerSignedItemBytes},
    schema::{decode_validated, mobile_security_object_schema},
};
use crate::{
    crypto::{EcdsaVerifier, HasX5Chain, SignatureVerifier as _, Signer, SigningAlgorithm},
    error::{code_err, MdocError, MdocErrorCode},
    models::{
        data_retrieval::common::{DocType, NameSpace},
        Bytes, BytesCbor, DateTime, MDOC_BYTES_CBOR_TAG,
    },
    utils::coset::{
        cose_key_from_jwk, cose_key_from_public_key, cose_key_to_jwk, coset_alg_to_signing_alg,
        deserialize_cose_sign1, deserialize_coset, serialize_coset, signing_alg_to_coset_alg, Jwk,
    },
    Result,
};

const MOBILE_SECURITY_OBJECT_VERSION: &str = "1.0";

const MSO_DEFAULT_DIGEST_ALG: DigestAlgorithm = DigestAlgorithm::Sha256;

/// The `COSE_Sign1` structure signing the [`MobileSecurityObject`].
///
/// The structure is accepted both with and without the `COSE_Sign1` _CBOR_ tag, and is always
/// serialized without it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IssuerAuth(
    #[serde(
        serialize_with = "serialize_coset",
        deserialize_with = "deserialize_cose_sign1"
    )]
    pub(crate) coset::CoseSign1,
);

impl IssuerAuth {
    /// Create a new [`IssuerAuth`].
    ///
    /// The `signer` algorithm is put in the protected header, and its certificate chain in the
    /// unprotected `x5chain` header.  The chain is encoded as a single byte string when it holds
    /// only the leaf certificate.
    ///
    /// Taking values from `name_spaces` we create the SHA-256 digests that are used for selective
    /// disclosure.  Digests are made using [`IssuerSignedItemBytes`] as specified in section
    /// `9.1.2.5` of the [ISO/IEC 18013-5:2021][1].
    ///
    /// [1]: <https://www.iso.org/standard/69084.html>
    pub fn new<S: Signer + HasX5Chain>(
        doc_type: DocType,
        name_spaces: &IssuerNameSpaces,
        device_key: DeviceKey,
        signer: &S,
        validity_info: ValidityInfo,
    ) -> Result<Self> {
        let protected = Header {
            alg: Some(Algorithm::Assigned(signing_alg_to_coset_alg(
                signer.algorithm(),
            ))),
            ..Default::default()
        };

        let unprotected = Header {
            rest: vec![(
                Label::Int(HeaderParameter::X5Chain.to_i64()),
                x5chain_to_cbor_value(signer.x5chain())?,
            )],
            ..Default::default()
        };

        let mso: MobileSecurityObjectBytes =
            MobileSecurityObject::new(doc_type, name_spaces, device_key, validity_info)?.into();
        let mut mso_bytes = vec![];
        ciborium::into_writer(&mso, &mut mso_bytes).foreign_err(|| MdocError::IssuerAuth)?;

        let cose_sign1 = coset::CoseSign1Builder::new()
            .protected(protected)
            .unprotected(unprotected)
            .payload(mso_bytes)
            .try_create_signature(&[], |data| signer.sign(data))
            .foreign_boxed_err(|| MdocError::IssuerAuth)?
            .build();

        Ok(Self(cose_sign1))
    }

    /// Return the `alg` element from the protected header of the underlying
    /// `COSE_Sign1` structure.
    pub fn signing_algorithm(&self) -> Option<SigningAlgorithm> {
        let alg = self.0.protected.header.alg.as_ref()?;

        let RegisteredLabelWithPrivate::Assigned(alg) = alg else {
            return None;
        };

        coset_alg_to_signing_alg(alg)
    }

    /// The signed payload, i.e. the encoded `MobileSecurityObjectBytes`.
    pub fn payload(&self) -> Option<&[u8]> {
        self.0.payload.as_deref()
    }

    /// Return the certificates of the `x5chain` header, in the order they are listed, leaf first.
    ///
    /// The header is looked up in the unprotected header, and then in the protected one.  No
    /// relation between the certificates is checked.
    pub fn x5chain_certificates(&self) -> Result<Vec<X509>> {
        let label = Label::Int(HeaderParameter::X5Chain.to_i64());

        let x5chain = self
            .0
            .unprotected
            .rest
            .iter()
            .chain(&self.0.protected.header.rest)
            .find_map(|(l, v)| (l == &label).then_some(v))
            .ok_or_else(|| bherror::Error::root(MdocError::X5Chain).ctx("missing `x5chain`"))?;

        let der = match x5chain {
            Value::Bytes(bytes) => vec![bytes.clone()],
            Value::Array(certificates) => certificates
                .iter()
                .map(|certificate| certificate.as_bytes().cloned())
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| {
                    bherror::Error::root(MdocError::X5Chain)
                        .ctx("`x5chain` must only contain bytes")
                })?,
            _ => {
                return Err(bherror::Error::root(MdocError::X5Chain)
                    .ctx("`x5chain` must be bytes or an array of bytes"))
            }
        };

        if der.is_empty() {
            return Err(bherror::Error::root(MdocError::X5Chain).ctx("`x5chain` is empty"));
        }

        parse_der_certificates(&der)
            .with_err(|| MdocError::X5Chain)
            .ctx(|| "invalid `x5chain`")
    }

    /// Return the `x5chain` as an [`X5Chain`], checking that each certificate is issued by the
    /// next one.
    pub fn x5chain(&self) -> Result<X5Chain> {
        X5Chain::new(self.x5chain_certificates()?).with_err(|| MdocError::X5Chain)
    }

    /// Verifies the certificate chain of the `x5chain` header, and the signature of the
    /// `COSE_Sign1` with the key of its leaf.
    ///
    /// The chain is verified as is, without any trusted root.  See [`verify_x5chain`].
    pub fn verify(&self, options: &VerifyOptions) -> Result<()> {
        let certificates = self.x5chain_certificates()?;

        verify_x5chain(&certificates, options).with_err(|| MdocError::X5Chain)?;

        let public_key = certificates[0]
            .public_key()
            .foreign_err(|| MdocError::X5Chain)
            .ctx(|| "invalid leaf certificate key")?;

        self.verify_signature(&public_key)
    }

    /// Verifies the signature of the underlying `COSE_Sign1` against the `public_key`.
    pub fn verify_signature(&self, public_key: &PKeyRef<Public>) -> Result<()> {
        let alg = self
            .signing_algorithm()
            .ok_or_else(|| bherror::Error::root(MdocError::MissingSigningAlgorithm))
            .ctx(|| "issuer authentication")?;

        // `coset` panics when verifying a detached payload
        if self.0.payload.is_none() {
            return Err(bherror::Error::root(MdocError::InvalidSignature).ctx("missing payload"));
        }

        let verifier = EcdsaVerifier::new(alg);

        self.0.verify_signature(&[], |sig, data| {
            let verified = verifier
                .verify(data, sig, public_key)
                .foreign_boxed_err(|| MdocError::InvalidSignature)
                .ctx(|| "error while verifying signature")?;

            if !verified {
                return Err(bherror::Error::root(MdocError::InvalidSignature)
                    .ctx("the signature is not valid"));
            };

            Ok(())
        })
    }

    /// Return the [`MobileSecurityObject`] from the payload of the underlying
    /// `COSE_Sign1` structure.
    ///
    /// See [`MobileSecurityObject::from_payload`].
    pub fn mso(&self) -> Result<MobileSecurityObject> {
        let payload = self.payload().ok_or_else(|| {
            bherror::Error::root(MdocError::IssuerAuth).ctx("MSO is missing")
        })?;

        MobileSecurityObject::from_payload(payload)
    }
}

fn x5chain_to_cbor_value(x5chain: X5Chain) -> Result<Value> {
    let mut certs = x5chain
        .as_bytes()
        .with_err(|| MdocError::X5Chain)
        .ctx(|| "X.509 certificate to DER error")?
        .into_iter()
        .map(Value::Bytes)
        .collect::<Vec<Value>>();

    Ok(if certs.len() == 1 {
        certs.remove(0)
    } else {
        Value::Array(certs)
    })
}

#[derive(Debug, serde::Serialize)]
struct MobileSecurityObjectBytes(BytesCbor<MobileSecurityObject>);

impl From<MobileSecurityObject> for MobileSecurityObjectBytes {
    fn from(value: MobileSecurityObject) -> Self {
        Self(value.into())
    }
}

/// [`MobileSecurityObject`] as defined in the section `9.1.2.4` of the [ISO/IEC
/// 18013-5:2021][1] standard.
///
/// [1]: <https://www.iso.org/standard/69084.html>
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileSecurityObject {
    version: String,
    digest_algorithm: DigestAlgorithm,
    value_digests: ValueDigests,
    device_key_info: DeviceKeyInfo,
    doc_type: DocType,
    validity_info: ValidityInfo,

    /// The information on where to read the status of this credential, kept as is.
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Value>,
}

impl MobileSecurityObject {
    fn new(
        doc_type: DocType,
        IssuerNameSpaces(ref name_spaces): &IssuerNameSpaces,
        device_key: DeviceKey,
        validity_info: ValidityInfo,
    ) -> Result<Self> {
        let digest = |item: &IssuerSignedItemBytes| -> Result<(DigestID, Bytes)> {
            Ok((
                item.item().digest_id(),
                item.digest(&MSO_DEFAULT_DIGEST_ALG)?.into(),
            ))
        };

        let value_digests = name_spaces
            .iter()
            .map(|(name_space, items)| {
                let digests = items
                    .iter()
                    .map(digest)
                    .collect::<Result<_>>()
                    .with_err(|| MdocError::MobileSecurityObject)?;

                Ok((name_space.clone(), DigestIDs(digests)))
            })
            .collect::<Result<_>>()?;

        Ok(MobileSecurityObject {
            version: MOBILE_SECURITY_OBJECT_VERSION.to_owned(),
            digest_algorithm: MSO_DEFAULT_DIGEST_ALG,
            value_digests: ValueDigests(value_digests),
            device_key_info: DeviceKeyInfo {
                device_key,
                key_authorizations: None,
                key_info: None,
            },
            doc_type,
            validity_info,
            status: None,
        })
    }

    /// Decodes the `MobileSecurityObjectBytes`, i.e. the [`MobileSecurityObject`] embedded as a
    /// tagged _CBOR_ byte string.
    ///
    /// The required members are checked first, in order, failing with the matching
    /// [`MdocErrorCode`]: `version`, `digestAlgorithm`, `valueDigests`, `deviceKeyInfo`,
    /// `docType`, `validityInfo`, then `deviceKeyInfo.deviceKey` and the `signed`, `validFrom` &
    /// `validUntil` members of `validityInfo`.  A member with the `null` value counts as missing.
    /// The structure is then validated and decoded.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let value: Value = ciborium::from_reader(payload)
            .foreign_err(|| MdocError::MobileSecurityObject)
            .ctx(|| "payload is not valid CBOR")?;

        let Value::Tag(MDOC_BYTES_CBOR_TAG, value) = value else {
            return Err(bherror::Error::root(MdocError::MobileSecurityObject).ctx(format!(
                "`MobileSecurityObjectBytes` MUST be tagged with `{MDOC_BYTES_CBOR_TAG}`"
            )));
        };

        let bytes = (*value).into_bytes().map_err(|_| {
            bherror::Error::root(MdocError::MobileSecurityObject)
                .ctx("`MobileSecurityObjectBytes` MUST be `Bytes`")
        })?;

        let mso: Value = ciborium::from_reader(bytes.as_slice())
            .foreign_err(|| MdocError::MobileSecurityObject)
            .ctx(|| "embedded MSO is not valid CBOR")?;

        check_required_members(&mso)?;

        decode_validated(&bytes, "MobileSecurityObject", mobile_security_object_schema())
    }

    /// The version of the structure.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The algorithm the digests are computed with.
    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.digest_algorithm
    }

    /// The digests of the issued data elements.
    pub fn value_digests(&self) -> &ValueDigests {
        &self.value_digests
    }

    /// The information on the key of the `mdoc` Device.
    pub fn device_key_info(&self) -> &DeviceKeyInfo {
        &self.device_key_info
    }

    /// The [`DocType`] the MSO is issued for.
    pub fn doc_type(&self) -> &DocType {
        &self.doc_type
    }

    /// The validity period of the credential.
    pub fn validity_info(&self) -> &ValidityInfo {
        &self.validity_info
    }

    /// The raw `status` member, if present.
    ///
    /// It points to where the status of the credential is published, e.g. a [Token Status
    /// List][1].
    ///
    /// [1]: <https://datatracker.ietf.org/doc/draft-ietf-oauth-status-list/>
    pub fn status(&self) -> Option<&Value> {
        self.status.as_ref()
    }

    /// Validates the digests of the provided [`IssuerNameSpaces`].
    ///
    /// The digests of data elements from the [`IssuerNameSpaces`] are calculated with the
    /// [`DigestAlgorithm`] of this MSO and compared to the ones it holds.  A namespace or a
    /// [`DigestID`] without a digest fails with [`MdocErrorCode::ValueDigestsMissing`], a
    /// digest that differs with [`MdocErrorCode::ValueDigestMismatch`].
    pub fn validate_name_spaces(&self, name_spaces: &IssuerNameSpaces) -> Result<()> {
        for (name_space, items) in name_spaces.iter() {
            if items.is_empty() {
                continue;
            }

            let mso_digests = self.value_digests.get(name_space).ok_or_else(|| {
                code_err(MdocErrorCode::ValueDigestsMissing)
                    .ctx(format!("no digests for namespace {name_space}"))
            })?;

            for item in items {
                let digest_id = item.item().digest_id();

                let mso_digest = mso_digests.get(&digest_id).ok_or_else(|| {
                    code_err(MdocErrorCode::ValueDigestsMissing)
                        .ctx(format!("no digest {digest_id} in namespace {name_space}"))
                })?;
                let target_digest = item.digest(&self.digest_algorithm)?;

                if mso_digest.as_slice() != target_digest {
                    return Err(code_err(MdocErrorCode::ValueDigestMismatch)
                        .ctx(format!("digest {digest_id} in namespace {name_space}")));
                }
            }
        }

        Ok(())
    }
}

/// Returns the member `key` of the `map`, with the `null` value treated as absent.
fn member<'a>(map: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    map.iter()
        .find_map(|(k, v)| (k.as_text() == Some(key)).then_some(v))
        .filter(|v| !v.is_null())
}

fn check_required_members(mso: &Value) -> Result<()> {
    let mso = mso.as_map().ok_or_else(|| {
        bherror::Error::root(MdocError::Schema("MobileSecurityObject")).ctx("expected a map")
    })?;

    let required = [
        ("version", MdocErrorCode::VersionMissing),
        ("digestAlgorithm", MdocErrorCode::DigestAlgorithmMissing),
        ("valueDigests", MdocErrorCode::ValueDigestsMissing),
        ("deviceKeyInfo", MdocErrorCode::DeviceKeyInfoMissing),
        ("docType", MdocErrorCode::DocTypeMissing),
        ("validityInfo", MdocErrorCode::ValidityInfoMissing),
    ];

    for (key, code) in required {
        if member(mso, key).is_none() {
            return Err(code_err(code).ctx(format!("`{key}` is missing")));
        }
    }

    let nested = [
        ("deviceKeyInfo", "deviceKey", MdocErrorCode::DeviceKeyMissing),
        ("validityInfo", "signed", MdocErrorCode::SignedMissing),
        ("validityInfo", "validFrom", MdocErrorCode::ValidFromMissing),
        ("validityInfo", "validUntil", MdocErrorCode::ValidUntilMissing),
    ];

    for (parent, key, code) in nested {
        let present = member(mso, parent)
            .and_then(Value::as_map)
            .and_then(|parent| member(parent, key))
            .is_some();

        if !present {
            return Err(code_err(code).ctx(format!("`{parent}.{key}` is missing")));
        }
    }

    Ok(())
}

/// The algorithm used for the digests of the Mobile Security Object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DigestAlgorithm {
    /// Designates the SHA-256 digest algorithm as specified in [ISO/IEC 10118-3][1].
    ///
    /// [1]: <https://www.iso.org/standard/67116.html>
    #[serde(rename = "SHA-256")]
    Sha256,
    /// Designates the SHA-384 digest algorithm as specified in [ISO/IEC 10118-3][1].
    ///
    /// [1]: <https://www.iso.org/standard/67116.html>
    #[serde(rename = "SHA-384")]
    Sha384,
    /// Designates the SHA-512 digest algorithm as specified in [ISO/IEC 10118-3][1].
    ///
    /// [1]: <https://www.iso.org/standard/67116.html>
    #[serde(rename = "SHA-512")]
    Sha512,
}

/// The digests of the data elements, per namespace.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValueDigests(HashMap<NameSpace, DigestIDs>);

impl ValueDigests {
    /// The digests of the given `name_space`.
    pub fn get(&self, name_space: &NameSpace) -> Option<&DigestIDs> {
        self.0.get(name_space)
    }
}

/// The digests of the data elements of a single namespace, by their [`DigestID`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DigestIDs(HashMap<DigestID, Bytes>);

impl DigestIDs {
    /// The digest with the given `digest_id`.
    pub fn get(&self, digest_id: &DigestID) -> Option<&Bytes> {
        self.0.get(digest_id)
    }
}

/// The key of the `mdoc` Device the credential is bound to, with its optional restrictions.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceKeyInfo {
    device_key: DeviceKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_authorizations: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_info: Option<Value>,
}

impl DeviceKeyInfo {
    /// The key of the `mdoc` Device.
    pub fn device_key(&self) -> &DeviceKey {
        &self.device_key
    }
}

/// The public key of the `mdoc` Device, as a `COSE_Key`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceKey(
    #[serde(
        serialize_with = "serialize_coset",
        deserialize_with = "deserialize_coset"
    )]
    pub(crate) CoseKey,
);

impl DeviceKey {
    /// Method for creating `DeviceKey` out of `JWK`.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self> {
        Ok(Self(
            cose_key_from_jwk(jwk).ctx(|| "Failed to create DeviceKey")?,
        ))
    }

    /// Creates the `DeviceKey` out of an EC public key.
    pub fn from_public_key(public_key: &PKeyRef<Public>) -> Result<Self> {
        Ok(Self(cose_key_from_public_key(public_key)?))
    }

    /// Returns a JWK representation of the underlying `COSE_Key`.
    pub fn as_jwk(&self) -> Result<Jwk> {
        cose_key_to_jwk(&self.0)
    }
}

/// [`ValidityInfo`] as defined in the section `9.1.2.4` of the [ISO/IEC 18013-5:2021][1]
/// standard.
///
/// [1]: <https://www.iso.org/standard/69084.html>
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(
    deny_unknown_fields,
    rename_all = "camelCase",
    try_from = "ValidityInfoDeserializeHelper"
)]
#[non_exhaustive]
pub struct ValidityInfo {
    /// The timestamp at which the signature was created.
    pub signed: DateTime,

    /// The timestamp before which the credential is not yet valid.
    pub valid_from: DateTime,

    /// The timestamp after which the credential is no longer valid.
    pub valid_until: DateTime,

    /// The timestamp at which the issuing authority infrastructure expects to
    /// re-sign the credential (and potentially update data elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_update: Option<DateTime>,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct ValidityInfoDeserializeHelper {
    signed: DateTime,
    valid_from: DateTime,
    valid_until: DateTime,
    expected_update: Option<DateTime>,
}

impl TryFrom<ValidityInfoDeserializeHelper> for ValidityInfo {
    type Error = bherror::Error<MdocError>;

    fn try_from(value: ValidityInfoDeserializeHelper) -> std::result::Result<Self, Self::Error> {
        Self::new(
            value.signed,
            value.valid_from,
            value.valid_until,
            value.expected_update,
        )
    }
}

impl ValidityInfo {
    /// Creates new [`ValidityInfo`], checking the provided data along the way.
    ///
    /// The data is validated as per `Section 9.1.2.4` of
    /// [ISO/IEC 18013-5:2021][1].
    ///
    /// - The timestamp of `valid_from` shall be equal or later than the
    ///   `signed` element.
    /// - The value of the `valid_until` timestamp shall be later than the
    ///   `valid_from` element.
    ///
    /// [1]: <https://www.iso.org/standard/69084.html>
    pub fn new(
        signed: DateTime,
        valid_from: DateTime,
        valid_until: DateTime,
        expected_update: Option<DateTime>,
    ) -> Result<Self> {
        // the timestamp of `valid_from` shall be equal or later than the `signed` element
        if valid_from < signed {
            return Err(bherror::Error::root(MdocError::InvalidValidityInfo)
                .ctx("`valid_from` must be equal or later than `signed`"));
        }

        // the value of the `valid_until` timestamp shall be later than the `valid_from` element
        if valid_until <= valid_from {
            return Err(bherror::Error::root(MdocError::InvalidValidityInfo)
                .ctx("`valid_until` must be later than `valid_from`"));
        }

        Ok(Self {
            signed,
            valid_from,
            valid_until,
            expected_update,
        })
    }

    /// Checks `current_time` against the validity period, widened by `clock_skew` seconds on
    /// both ends.
    pub fn validate(&self, current_time: u64, clock_skew: u64) -> Result<()> {
        let now = current_time as i128;
        let skew = clock_skew as i128;

        let valid_from = self.valid_from.timestamp();
        if now + skew < valid_from as i128 {
            return Err(code_err(MdocErrorCode::DocumentNotYetValid)
                .ctx(format!("valid from {valid_from}")));
        }

        let valid_until = self.valid_until.timestamp();
        if now > valid_until as i128 + skew {
            return Err(
                code_err(MdocErrorCode::DocumentExpired).ctx(format!("valid until {valid_until}"))
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use bhx5chain::{Builder, Validity};

    use super::*;
    use crate::{
        crypto::EcdsaSigner,
        models::data_retrieval::{
            common::{MDL_DOCUMENT_TYPE, MDL_NAMESPACE},
            device_retrieval::response::IssuerSignedItem,
        },
        utils::test::{device_key, issuer_authority, issuer_signer, now, validity_info},
    };

    fn mdl_items() -> Vec<IssuerSignedItemBytes> {
        vec![
            IssuerSignedItem::new(
                0u64.into(),
                "f4b65b3379407aa9a0390309b792344c".parse().unwrap(),
                "family_name".into(),
                "Doe".into(),
            )
            .into(),
            IssuerSignedItem::new(
                1u64.into(),
                "b82484fc40a0f1c999e9aa168eb6f57c".parse().unwrap(),
                "given_name".into(),
                "John".into(),
            )
            .into(),
            IssuerSignedItem::new(
                2u64.into(),
                "e247c0fe30b80eadce962b3de07084b3".parse().unwrap(),
                "birth_date".into(),
                "1980-01-02".into(),
            )
            .into(),
        ]
    }

    fn name_spaces(items: Vec<IssuerSignedItemBytes>) -> IssuerNameSpaces {
        IssuerNameSpaces(HashMap::from([(MDL_NAMESPACE.into(), items)]))
    }

    fn dummy_issuer_auth(current_time: u64) -> IssuerAuth {
        let authority = issuer_authority();

        IssuerAuth::new(
            MDL_DOCUMENT_TYPE.into(),
            &name_spaces(mdl_items()),
            device_key(),
            &issuer_signer(&authority),
            validity_info(current_time),
        )
        .unwrap()
    }

    fn mso_value(issuer_auth: &IssuerAuth) -> Vec<(Value, Value)> {
        let Value::Tag(_, bytes) =
            ciborium::from_reader::<Value, _>(issuer_auth.payload().unwrap()).unwrap()
        else {
            panic!("expected tagged MSO");
        };

        ciborium::from_reader::<Value, _>(bytes.as_bytes().unwrap().as_slice())
            .unwrap()
            .into_map()
            .unwrap()
    }

    fn mso_payload(mso: Vec<(Value, Value)>) -> Vec<u8> {
        let mut bytes = vec![];
        ciborium::into_writer(&Value::Map(mso), &mut bytes).unwrap();

        let mut payload = vec![];
        ciborium::into_writer(
            &Value::Tag(MDOC_BYTES_CBOR_TAG, Box::new(Value::Bytes(bytes))),
            &mut payload,
        )
        .unwrap();

        payload
    }

    fn without(mso: &[(Value, Value)], path: &[&str]) -> Vec<u8> {
        fn remove(map: &[(Value, Value)], path: &[&str]) -> Vec<(Value, Value)> {
            let (first, rest) = path.split_first().unwrap();

            map.iter()
                .filter(|(k, _)| !rest.is_empty() || k.as_text() != Some(first))
                .map(|(k, v)| match (k.as_text(), v) {
                    (Some(key), Value::Map(nested)) if key == *first && !rest.is_empty() => {
                        (k.clone(), Value::Map(remove(nested, rest)))
                    }
                    _ => (k.clone(), v.clone()),
                })
                .collect()
        }

        mso_payload(remove(mso, path))
    }

    fn with_null(mso: &[(Value, Value)], key: &str) -> Vec<u8> {
        mso_payload(
            mso.iter()
                .map(|(k, v)| {
                    if k.as_text() == Some(key) {
                        (k.clone(), Value::Null)
                    } else {
                        (k.clone(), v.clone())
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn load_third_party_issuer_auth() {
        const THIRD_PARTY_ISSUER_AUTH: &str = "\
8443a10126a1182159014b308201473081eea00302010202083\
9edc87a9a78f92a300a06082a8648ce3d040302301731153013\
06035504030c0c4d444f4320524f4f54204341301e170d32343\
03530323133313333305a170d3235303530323133313333305a\
301b3119301706035504030c104d444f4320546573742049737\
37565723059301306072a8648ce3d020106082a8648ce3d0301\
07034200041b4448341885fa84140f77790c69de810b977a723\
6f490da306a0cbe2a0a441379ddde146b36a44b6ba7bbc067b0\
4b71bad4b692a4616013d893d440ae253781a320301e300c060\
3551d130101ff04023000300e0603551d0f0101ff0404030207\
80300a06082a8648ce3d04030203480030450221008e7004100\
0ddec2a230b2586ecc59f8acd156f5d933d9363bc5e2263bb0a\
b69802201885a8b537327a69b022620f07c5c45d6293b86eed9\
27a3f04e82cc51cadf8635901c3d8185901bea6677665727369\
6f6e63312e306f646967657374416c676f726974686d6753484\
12d3235366c76616c756544696765737473a1716f72672e6973\
6f2e31383031332e352e31a300582025a0d893e78de394f50c1\
e4e4b741010a2fc683642ecb144f289ca9d74a168440158203f\
74f1795d847e6b72c548ca6f1e57c9a6def0f5c80fa643a8aae\
079939662bd0258202f028fcb6e1690f8c0e7d8569662564c78\
b88ea51f554a414cd04b69834f4e506d6465766963654b65794\
96e666fa1696465766963654b6579a401022001215820257958\
58a9cf54bd8575597e963dffc521696718c0b95ed3bc14acffe\
f6320e82258202dd4fae416f2bab6726593b97914c7b7e1342c\
d446bb8ef025a1cac6567cd40f67646f6354797065756f72672\
e69736f2e31383031332e352e312e6d444c6c76616c69646974\
79496e666fa3667369676e6564c0781e323032342d31302d323\
95431313a30323a30392e3933363334323036395a6976616c69\
6446726f6dc0781e323032342d31302d32395431313a30323a3\
0392e3933363334333733305a6a76616c6964556e74696cc078\
1e323032352d31302d32395431313a30323a30392e393336333\
4333934315a5840d274be6b6491b022cee4be5fcb6561414191\
53a10ccec1cefce93ea4df318d9d8b73c277a0eba2854a4b782\
e300ed9abd07e775942b1e93b33ad21c9b1a50509";

        let issuer_auth_bytes = hex::decode(THIRD_PARTY_ISSUER_AUTH).unwrap();
        let issuer_auth =
            ciborium::from_reader::<IssuerAuth, _>(issuer_auth_bytes.as_slice()).unwrap();

        let mut issuer_auth_deser_bytes = vec![];
        ciborium::into_writer(&issuer_auth, &mut issuer_auth_deser_bytes).unwrap();
        assert_eq!(issuer_auth_bytes, issuer_auth_deser_bytes);

        // the leaf is issued by "MDOC ROOT CA", which is not in the chain
        let certificates = issuer_auth.x5chain_certificates().unwrap();
        assert_eq!(certificates.len(), 1);
        assert_matches!(
            issuer_auth.verify_signature(&certificates[0].public_key().unwrap()),
            Ok(())
        );
        assert_eq!(
            issuer_auth
                .verify(&VerifyOptions::default())
                .unwrap_err()
                .error,
            MdocError::X5Chain
        );

        // the fractions of seconds are dropped
        let mso = issuer_auth.mso().unwrap();
        assert_eq!(mso.doc_type(), &MDL_DOCUMENT_TYPE.into());
        assert_eq!(mso.validity_info().signed.timestamp(), 1730199729);
        assert_eq!(mso.validity_info().valid_from.timestamp(), 1730199729);
        assert_eq!(mso.validity_info().valid_until.timestamp(), 1761735729);

        // the digests are computed over the items in the ISO member order
        assert_matches!(mso.validate_name_spaces(&name_spaces(mdl_items())), Ok(()));
    }

    #[test]
    fn create_issuer_auth() {
        let issuer_auth = dummy_issuer_auth(now());
        let mso = issuer_auth.mso().unwrap();
        let digests = mso.value_digests().get(&MDL_NAMESPACE.into()).unwrap();

        assert_eq!(
            hex::encode(digests.get(&0u64.into()).unwrap().as_slice()),
            "25a0d893e78de394f50c1e4e4b741010a2fc683642ecb144f289ca9d74a16844"
        );

        assert_eq!(
            hex::encode(digests.get(&1u64.into()).unwrap().as_slice()),
            "3f74f1795d847e6b72c548ca6f1e57c9a6def0f5c80fa643a8aae079939662bd"
        );

        assert_eq!(
            hex::encode(digests.get(&2u64.into()).unwrap().as_slice()),
            "2f028fcb6e1690f8c0e7d8569662564c78b88ea51f554a414cd04b69834f4e50"
        );

        assert_eq!(issuer_auth.signing_algorithm(), Some(SigningAlgorithm::Es256));
        assert_eq!(mso.version(), "1.0");
        assert_eq!(mso.digest_algorithm(), DigestAlgorithm::Sha256);
        assert_eq!(mso.device_key_info().device_key(), &device_key());
        assert_eq!(mso.status(), None);
    }

    // Based on example from [github][1]. This example is part of [RFC][2] and should be
    // representable for our verification check.
    //
    // The example was modified in a way to use x5chain for unprotected field. The x5chain was
    // generated manually from JWK found in [1]. This way we are compatible with our interface, but
    // we still use same payload and keys.
    //
    // [1] <https://github.com/cose-wg/Examples/blob/master/ecdsa-examples/ecdsa-sig-01.json>
    // [2] <https://datatracker.ietf.org/doc/html/rfc8152#page-102>
    #[test]
    fn verify_issuer_auth() {
        const CBOR_EXAMPLE: &str =
"8445a201260300a118215901ea308201e63082018ca00302010202142925438a3b4ab7567d1843aed31de1259ea37ff33\
00a06082a8648ce3d040302306a310b30090603550406130255533113301106035504080c0a43616c69666f726e6961311\
6301406035504070c0d53616e204672616e636973636f31183016060355040a0c0f4d79204f7267616e697a6174696f6e3\
114301206035504030c0b6578616d706c652e636f6d301e170d3234313231393039343834365a170d32353132313930393\
43834365a306a310b30090603550406130255533113301106035504080c0a43616c69666f726e696131163014060355040\
70c0d53616e204672616e636973636f31183016060355040a0c0f4d79204f7267616e697a6174696f6e311430120603550\
4030c0b6578616d706c652e636f6d3059301306072a8648ce3d020106082a8648ce3d03010703420004bac5b11cad8f99f\
9c72b05cf4b9e26d244dc189f745228255a219a86d6a09eff20138bf82dc1b6d562be0fa54ab7804a3a64b6d72ccfed6b6\
fb6ed28bbfc117ea310300e300c0603551d130101ff04023000300a06082a8648ce3d040302034800304502200d1150f20\
02bcb15d30326c0b4282635844e64173a16e85429da6439cef303bc0221009b95183e4ab8b47513cbab8635e26d55a57e5\
e0ce85f2099f9502f4a2d7048f454546869732069732074686520636f6e74656e742e58406520bbaf2081d7e0ed0f95f76\
eb0733d667005f7467cec4b87b9381a6ba1ede8e00df29f32a37230f39a842a54821fdd223092819d7728efb9d3a0080b7\
5380b";

        let issuer_auth_bytes = hex::decode(CBOR_EXAMPLE).unwrap();
        let mut issuer_auth =
            ciborium::from_reader::<IssuerAuth, _>(issuer_auth_bytes.as_slice()).unwrap();

        let public_key = issuer_auth.x5chain_certificates().unwrap()[0]
            .public_key()
            .unwrap();

        assert_eq!(issuer_auth.payload(), Some(b"This is the content.".as_slice()));
        assert_matches!(issuer_auth.verify_signature(&public_key), Ok(()));

        issuer_auth.0.payload = Some(b"This is other content.".to_vec());
        assert_eq!(
            issuer_auth.verify_signature(&public_key).unwrap_err().error,
            MdocError::InvalidSignature
        );

        issuer_auth.0.payload = None;
        assert_eq!(
            issuer_auth.verify_signature(&public_key).unwrap_err().error,
            MdocError::InvalidSignature
        );
    }

    #[test]
    fn issuer_auth_with_all_signing_algorithms() {
        let authority = issuer_authority();
        let now = now();

        for algorithm in SigningAlgorithm::ALL {
            let signer = EcdsaSigner::generate(algorithm).unwrap();
            let x5chain = authority
                .generate_x5chain(
                    &signer.public_key().unwrap(),
                    Validity::new(now as i64 - 3600, now as i64 + 3600),
                )
                .unwrap();
            let signer = signer.with_x5chain(x5chain);

            let issuer_auth = IssuerAuth::new(
                MDL_DOCUMENT_TYPE.into(),
                &name_spaces(mdl_items()),
                device_key(),
                &signer,
                validity_info(now),
            )
            .unwrap();

            assert_eq!(issuer_auth.signing_algorithm(), Some(algorithm));
            assert_eq!(issuer_auth.x5chain_certificates().unwrap().len(), 2);
            assert_matches!(issuer_auth.verify(&VerifyOptions::at(now as i64)), Ok(()));
        }
    }

    #[test]
    fn issuer_auth_x5chain_verification() {
        let now = now();
        let authority = issuer_authority();
        let signer = issuer_signer(&authority);

        let issuer_auth = IssuerAuth::new(
            MDL_DOCUMENT_TYPE.into(),
            &name_spaces(mdl_items()),
            device_key(),
            &signer,
            validity_info(now),
        )
        .unwrap();

        assert_eq!(issuer_auth.x5chain().unwrap(), signer.x5chain());
        assert_matches!(issuer_auth.verify(&VerifyOptions::at(now as i64)), Ok(()));

        // the chain is checked against the trusted root only on request
        let x5chain = issuer_auth.x5chain().unwrap();
        assert_matches!(
            x5chain.verify_against_trusted_roots(&authority.trust(), Some(now as i64)),
            Ok(())
        );

        let other_authority = Builder::self_signed_root(
            "Other Root",
            Validity::new(now as i64 - 3600, now as i64 + 3600),
        )
        .unwrap();
        assert!(x5chain
            .verify_against_trusted_roots(&other_authority.trust(), Some(now as i64))
            .is_err());

        // the certificates are long expired
        let far_future = now as i64 + 10 * 365 * 24 * 60 * 60;
        assert_eq!(
            issuer_auth
                .verify(&VerifyOptions::at(far_future))
                .unwrap_err()
                .error,
            MdocError::X5Chain
        );
    }

    #[test]
    fn issuer_auth_missing_x5chain() {
        let mut issuer_auth = dummy_issuer_auth(now());
        issuer_auth.0.unprotected.rest.clear();

        assert_eq!(
            issuer_auth.x5chain_certificates().unwrap_err().error,
            MdocError::X5Chain
        );

        issuer_auth.0.unprotected.rest = vec![(
            Label::Int(HeaderParameter::X5Chain.to_i64()),
            Value::Array(vec![Value::Text("not a certificate".to_owned())]),
        )];

        assert_eq!(
            issuer_auth.verify(&VerifyOptions::default()).unwrap_err().error,
            MdocError::X5Chain
        );
    }

    #[test]
    fn validate_name_spaces() {
        let mso = dummy_issuer_auth(now()).mso().unwrap();

        // all digests are present
        assert_matches!(mso.validate_name_spaces(&name_spaces(mdl_items())), Ok(()));

        // the empty namespaces are skipped
        assert_matches!(
            mso.validate_name_spaces(&IssuerNameSpaces(HashMap::from([(
                "org.example".into(),
                vec![]
            )]))),
            Ok(())
        );

        // the value was changed
        let tampered = IssuerSignedItem::new(
            0u64.into(),
            "f4b65b3379407aa9a0390309b792344c".parse().unwrap(),
            "family_name".into(),
            "Roe".into(),
        );
        assert_eq!(
            mso.validate_name_spaces(&name_spaces(vec![tampered.into()]))
                .unwrap_err()
                .error,
            MdocError::ErrorCode(MdocErrorCode::ValueDigestMismatch)
        );

        // no digest with the `DigestID`
        let unknown = IssuerSignedItem::new(
            7u64.into(),
            "f4b65b3379407aa9a0390309b792344c".parse().unwrap(),
            "family_name".into(),
            "Doe".into(),
        );
        assert_eq!(
            mso.validate_name_spaces(&name_spaces(vec![unknown.into()]))
                .unwrap_err()
                .error,
            MdocError::ErrorCode(MdocErrorCode::ValueDigestsMissing)
        );

        // no digests for the namespace
        assert_eq!(
            mso.validate_name_spaces(&IssuerNameSpaces(HashMap::from([(
                "org.example".into(),
                mdl_items()
            )])))
                .unwrap_err()
                .error,
            MdocError::ErrorCode(MdocErrorCode::ValueDigestsMissing)
        );
    }

    #[test]
    fn mso_required_members() {
        let mso = mso_value(&dummy_issuer_auth(now()));

        let cases = [
            (vec!["version"], MdocErrorCode::VersionMissing),
            (vec!["digestAlgorithm"], MdocErrorCode::DigestAlgorithmMissing),
            (vec!["valueDigests"], MdocErrorCode::ValueDigestsMissing),
            (vec!["deviceKeyInfo"], MdocErrorCode::DeviceKeyInfoMissing),
            (vec!["docType"], MdocErrorCode::DocTypeMissing),
            (vec!["validityInfo"], MdocErrorCode::ValidityInfoMissing),
            (vec!["deviceKeyInfo", "deviceKey"], MdocErrorCode::DeviceKeyMissing),
            (vec!["validityInfo", "signed"], MdocErrorCode::SignedMissing),
            (vec!["validityInfo", "validFrom"], MdocErrorCode::ValidFromMissing),
            (vec!["validityInfo", "validUntil"], MdocErrorCode::ValidUntilMissing),
        ];

        for (path, code) in cases {
            let err = MobileSecurityObject::from_payload(&without(&mso, &path)).unwrap_err();
            assert_eq!(err.error, MdocError::ErrorCode(code), "{path:?}");
        }

        // `null` counts as missing
        let err = MobileSecurityObject::from_payload(&with_null(&mso, "version")).unwrap_err();
        assert_eq!(err.error, MdocError::ErrorCode(MdocErrorCode::VersionMissing));

        // the first missing member is reported
        let without_doc_type = without_value(&mso, "docType");
        let err =
            MobileSecurityObject::from_payload(&without(&without_doc_type, &["version"])).unwrap_err();
        assert_eq!(err.error, MdocError::ErrorCode(MdocErrorCode::VersionMissing));

        assert_matches!(MobileSecurityObject::from_payload(&mso_payload(mso)), Ok(_));
    }

    fn without_value(mso: &[(Value, Value)], key: &str) -> Vec<(Value, Value)> {
        mso.iter()
            .filter(|(k, _)| k.as_text() != Some(key))
            .cloned()
            .collect()
    }

    #[test]
    fn mso_structure_is_validated() {
        let mut mso = mso_value(&dummy_issuer_auth(now()));
        for (key, value) in mso.iter_mut() {
            if key.as_text() == Some("digestAlgorithm") {
                *value = Value::Integer(256.into());
            }
        }

        let err = MobileSecurityObject::from_payload(&mso_payload(mso)).unwrap_err();
        assert_eq!(err.error, MdocError::Schema("MobileSecurityObject"));

        // the MSO must be embedded as a tagged byte string
        let mut untagged = vec![];
        ciborium::into_writer(&Value::Map(vec![]), &mut untagged).unwrap();
        assert_eq!(
            MobileSecurityObject::from_payload(&untagged).unwrap_err().error,
            MdocError::MobileSecurityObject
        );
    }

    #[test]
    fn validity_window_with_clock_skew() {
        let validity_info = ValidityInfo::new(
            1000.try_into().unwrap(),
            1000.try_into().unwrap(),
            2000.try_into().unwrap(),
            None,
        )
        .unwrap();

        assert_matches!(validity_info.validate(1500, 0), Ok(()));
        assert_matches!(validity_info.validate(1000, 0), Ok(()));
        assert_matches!(validity_info.validate(2000, 0), Ok(()));

        // within the skew
        assert_matches!(validity_info.validate(950, 60), Ok(()));
        assert_matches!(validity_info.validate(2050, 60), Ok(()));

        assert_eq!(
            validity_info.validate(999, 0).unwrap_err().error,
            MdocError::ErrorCode(MdocErrorCode::DocumentNotYetValid)
        );
        assert_eq!(
            validity_info.validate(939, 60).unwrap_err().error,
            MdocError::ErrorCode(MdocErrorCode::DocumentNotYetValid)
        );
        assert_eq!(
            validity_info.validate(2061, 60).unwrap_err().error,
            MdocError::ErrorCode(MdocErrorCode::DocumentExpired)
        );
    }

    #[test]
    fn validity_info_success() {
        let _validity_info = ValidityInfo::new(
            100.try_into().unwrap(),
            200.try_into().unwrap(),
            300.try_into().unwrap(),
            None,
        )
        .unwrap();

        let mut bytes = vec![];
        ciborium::into_writer(
            &Value::Map(vec![
                (
                    Value::Text("signed".to_owned()),
                    Value::Tag(0, Box::new(Value::Text("2025-08-17T16:39:57Z".to_owned()))),
                ),
                (
                    Value::Text("validFrom".to_owned()),
                    Value::Tag(0, Box::new(Value::Text("2025-08-17T16:51:02Z".to_owned()))),
                ),
                (
                    Value::Text("validUntil".to_owned()),
                    Value::Tag(0, Box::new(Value::Text("2025-08-17T18:11:00Z".to_owned()))),
                ),
                (
                    Value::Text("expectedUpdate".to_owned()),
                    Value::Tag(0, Box::new(Value::Text("2025-08-17T18:10:00Z".to_owned()))),
                ),
            ]),
            &mut bytes,
        )
        .unwrap();
        let validity_info: ValidityInfo = ciborium::from_reader(bytes.as_slice()).unwrap();
        assert!(validity_info.expected_update.is_some());
    }

    #[test]
    fn validity_info_valid_from_before_signed_fails() {
        let err = ValidityInfo::new(
            100.try_into().unwrap(),
            50.try_into().unwrap(), // before `signed`
            300.try_into().unwrap(),
            None,
        )
        .unwrap_err();
        assert_matches!(err.error, MdocError::InvalidValidityInfo);
    }

    #[test]
    fn validity_info_valid_until_before_valid_from_fails() {
        let err = ValidityInfo::new(
            100.try_into().unwrap(),
            200.try_into().unwrap(),
            150.try_into().unwrap(), // before `valid_from`
            None,
        )
        .unwrap_err();
        assert_matches!(err.error, MdocError::InvalidValidityInfo);
    }

    /// Example from the _Section 6.3.2._ of the [Token Status List (TSL)][1].
    ///
    /// [1]: <https://www.ietf.org/archive/id/draft-ietf-oauth-status-list-15.html>
    #[test]
    fn deserialize_issuer_auth_with_status() {
        const CBOR_HEX: &str =
            "8443a10126a118215901f3308201ef30820195a00302010202140bfec7da97e048e\
15ac3dacb9eafe82e64fd07f5300a06082a8648ce3d040302302331143012060355\
04030c0b75746f7069612069616361310b3009060355040613025553301e170d323\
4313030313030303030305a170d3235313030313030303030305a30213112301006\
035504030c0975746f706961206473310b300906035504061302555330593013060\
72a8648ce3d020106082a8648ce3d03010703420004ace7ab7340e5d9648c5a72a9\
a6f56745c7aad436a03a43efea77b5fa7b88f0197d57d8983e1b37d3a539f4d5883\
65e38cbbf5b94d68c547b5bc8731dcd2f146ba381a83081a5301c0603551d1f0415\
30133011a00fa00d820b6578616d706c652e636f6d301e0603551d1204173015811\
36578616d706c65406578616d706c652e636f6d301d0603551d0e0416041414e290\
17a6c35621ffc7a686b7b72db06cd12351301f0603551d2304183016801454fa238\
3a04c28e0d930792261c80c4881d2c00b300e0603551d0f0101ff04040302078030\
150603551d250101ff040b3009060728818c5d050102300a06082a8648ce3d04030\
20348003045022100b7103fd4b90529f50bd6f70c5ae5ce7f4f3d4d15a4e082812f\
9fa1f5c2e5aa0a0220070b2822ec7ce6c56804923a85b2cfbffd054cf9a915f070c\
fef7179a4bc6569590320d81859031ba766737461747573a16b7374617475735f6c\
697374a26369647819019c63757269782168747470733a2f2f6578616d706c652e6\
36f6d2f7374617475736c697374732f3167646f6354797065756f72672e69736f2e\
31383031332e352e312e6d444c6776657273696f6e63312e306c76616c696469747\
9496e666fa3667369676e6564c074323032342d31302d30315431333a33303a3032\
5a6976616c696446726f6dc074323032342d31302d30315431333a33303a30325a6\
a76616c6964556e74696cc074323032352d31302d30315431333a33303a30325a6c\
76616c756544696765737473a1716f72672e69736f2e31383031332e352e31ac005\
820a81d65ed5075fbd7ee19fa66e2bb3047ed826e2769873e7ef07c923da7a6f243\
01582048701a9546492284d266ed81d439230a582d0e1f17a08ab1859a3efe98069\
0a4025820d11fe48c8835b30bfb3895c3905436ddfb63f59ab9eee181b110985329\
2a8f62035820a741bf05e20a8bc359e32426106ed0899b2c60262cc3acc637ddc99\
41095fb7a045820ab67cb9a8f20a8572f77f02727367d08dc8e57fb89deb46b9c62\
6e94457b7d8b055820bacddb4142b3842bd555206eb5acb27ded063294995c7e7fe\
fbf93ece522604d065820bfd02b3aebdc05b53b5539226c38088d6d784b0ea0fab6\
9eb9311650a48d325307582027dab70fe71da63e5e5d199e8ae5b79cbe8904bc30c\
5b7544fb809e02ccb3e6a0858200dbd7ccc9c7727d3d17295f1b6f1914071670ee2\
3d4d33530c31f1f406b8e3b7095820a5beb5efadf37f21637209abc519830681cc5\
1f334818a823fec13b29552f5ba0a5820d8047c95f9272d7d07b2c13a9f5ac2ee02\
380ab272a165e569391d89a2152c3c0b582004939930ffb4911ef03487a153605a3\
0368b69f2437d6d21b4c90f92bc144c3e6d6465766963654b6579496e666fa16964\
65766963654b6579a40102200121582096313d6c63e24e3372742bfdb1a33ba2c89\
7dcd68ab8c753e4fbd48dca6b7f9a2258201fb3269edd418857de1b39a4e4a44b92\
fa484caa722c228288f01d0c03a2c3d66f646967657374416c676f726974686d675\
348412d3235365840b7c2d4abe85aa5ba814ef95de0385c71c802be8ac33a4a971a\
85ed800ba7acb59cb21035f4a68fc0caa450cbefd3b255aec72f83595f0ae7b7d50\
fe8a1c4cafe";

        let cbor_bytes = hex::decode(CBOR_HEX).unwrap();
        let issuer_auth: IssuerAuth = ciborium::from_reader(cbor_bytes.as_slice()).unwrap();
        let mso = issuer_auth.mso().unwrap();

        let status = mso.status().unwrap().as_map().unwrap();
        assert_eq!(status[0].0, Value::Text("status_list".to_owned()));

        let public_key = issuer_auth.x5chain_certificates().unwrap()[0]
            .public_key()
            .unwrap();
        assert_matches!(issuer_auth.verify_signature(&public_key), Ok(()));
    }
}

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

//! This module defines the error values returned by the crate API.

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::crypto::SigningAlgorithm;

/// Named reasons for rejecting an issuer-signed [`Document`][crate::models::Document].
///
/// The codes are reported in the `documentErrors` of a
/// [`DeviceResponse`][crate::models::DeviceResponse], and serialize as plain integers.
#[derive(
    strum_macros::Display,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize_repr,
    Deserialize_repr,
)]
#[repr(u8)]
pub enum MdocErrorCode {
    /// The `docType` of the document or of its Mobile Security Object is missing.
    DocTypeMissing = 1,
    /// The document has no `issuerSigned` part.
    IssuerSignedMissing = 2,
    /// The `issuerSigned` part has no `issuerAuth`.
    IssuerAuthMissing = 3,
    /// The `issuerSigned` part has no `nameSpaces`.
    IssuerNameSpacesMissing = 4,
    /// The `deviceKeyInfo` of the Mobile Security Object has no `deviceKey`.
    DeviceKeyMissing = 5,
    /// The Mobile Security Object has no `version`.
    VersionMissing = 6,
    /// The Mobile Security Object has no `digestAlgorithm`.
    DigestAlgorithmMissing = 7,
    /// The Mobile Security Object has no `valueDigests`, or a disclosed item has no digest.
    ValueDigestsMissing = 8,
    /// The Mobile Security Object has no `deviceKeyInfo`.
    DeviceKeyInfoMissing = 9,
    /// The Mobile Security Object has no `validityInfo`.
    ValidityInfoMissing = 10,
    /// The `validityInfo` has no `signed` timestamp.
    SignedMissing = 11,
    /// The `validityInfo` has no `validFrom` timestamp.
    ValidFromMissing = 12,
    /// The `validityInfo` has no `validUntil` timestamp.
    ValidUntilMissing = 13,
    /// The issuer certificate chain or the `COSE_Sign1` signature is not valid.
    IssuerAuthInvalid = 14,
    /// A disclosed item does not match its digest.
    ValueDigestMismatch = 15,
    /// The document is past its `validUntil`.
    DocumentExpired = 16,
    /// The document is before its `validFrom`.
    DocumentNotYetValid = 17,
    /// The `docType` signed by the issuer differs from the one of the document.
    DocTypeMismatch = 18,
    /// The issuer certificate chain does not lead to a trusted root.
    X5ChainInvalid = 19,
    /// Verification failed for a reason without a dedicated code.
    IssuerSignedVerificationFailed = 20,
}

/// Error type used across the crate API.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum MdocError {
    /// A named verification failure of a document.
    #[strum(to_string = "Document verification failed: {0}")]
    ErrorCode(MdocErrorCode),
    /// Error when a CBOR structure does not conform to its schema.
    #[strum(to_string = "Invalid {0} structure")]
    Schema(&'static str),
    /// Error used by
    /// [`MobileSecurityObject`][crate::models::data_retrieval::device_retrieval::issuer_auth::MobileSecurityObject]
    /// API.
    #[strum(to_string = "Error in Mobile Security Object")]
    MobileSecurityObject,
    /// Error used by [`issuer_auth`][crate::models::data_retrieval::device_retrieval::issuer_auth]
    /// API.
    #[strum(to_string = "Error in Issuer Auth")]
    IssuerAuth,
    /// An `IssuerSignedItem` without the `elementIdentifier`.
    #[strum(to_string = "IssuerSignedItem missing elementIdentifier")]
    MissingElementIdentifier,
    /// An `age_over_` data element whose identifier is malformed.
    #[strum(
        to_string = "Invalid age_over format: {0}. Expected format: age_over_NN where NN is a two-digit number"
    )]
    InvalidAgeOverFormat(String),
    /// An `age_over_NN` data element whose value is not a boolean.
    #[strum(to_string = "Invalid elementValue type for {0}. Expected boolean, got {1}")]
    InvalidAgeOverValue(String, &'static str),
    /// Error when we fail to decode a JWK.
    #[strum(to_string = "Error while converting JWK to DeviceKey: {0}")]
    JwkToCoseKey(String),
    /// Error when we fail to encode a JWK.
    #[strum(to_string = "Error while converting DeviceKey to JWK: {0}")]
    CoseKeyToJwk(String),
    /// Error when we fail to parse a
    /// [`DeviceResponse`][crate::models::DeviceResponse].
    #[strum(to_string = "Failed to parse Device Response: {0}")]
    DeviceResponseParse(String),
    /// Error when we detect a signature isn't valid.
    #[strum(to_string = "Signature validation failed")]
    InvalidSignature,
    /// Error when the underlying data model is missing a signing algorithm or if we don't support
    /// it.
    #[strum(to_string = "Signing algorithm is missing or unsupported")]
    MissingSigningAlgorithm,
    /// Error when a key can not be used with the given signing algorithm.
    #[strum(to_string = "Key is not suitable for {0}")]
    KeyAlgorithmMismatch(SigningAlgorithm),
    /// Error in the underlying cryptographic backend.
    #[strum(to_string = "Cryptographic backend error")]
    Crypto,
    /// Error when we expect an `x5chain` but it is missing or invalid.
    #[strum(to_string = "Missing or invalid X5Chain")]
    X5Chain,
    /// Error when we try to construct [`DateTime`][crate::models::DateTime] from an invalid value.
    #[strum(to_string = "Invalid value for Date Time")]
    InvalidDateTime,
    /// Invalid
    /// [`ValidityInfo`][crate::models::data_retrieval::device_retrieval::issuer_auth::ValidityInfo]
    /// data.
    #[strum(to_string = "Validity Info is invalid")]
    InvalidValidityInfo,
}

impl MdocError {
    /// Returns the [`MdocErrorCode`] to report for this error.
    ///
    /// Errors without a dedicated code are reported as
    /// [`MdocErrorCode::IssuerSignedVerificationFailed`].
    pub fn code(&self) -> MdocErrorCode {
        match self {
            Self::ErrorCode(code) => *code,
            _ => MdocErrorCode::IssuerSignedVerificationFailed,
        }
    }
}

impl From<MdocErrorCode> for MdocError {
    fn from(code: MdocErrorCode) -> Self {
        Self::ErrorCode(code)
    }
}

impl bherror::BhError for MdocError {}

/// Type alias for [`bherror::Result`] types returned by the crate's API.
pub type Result<T> = bherror::Result<T, MdocError>;

/// Shorthand for failing with the given [`MdocErrorCode`].
pub(crate) fn code_err(code: MdocErrorCode) -> bherror::Error<MdocError> {
    bherror::Error::root(MdocError::ErrorCode(code))
}

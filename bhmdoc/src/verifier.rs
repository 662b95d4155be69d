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

//! This module provides the verification of the issuer-signed part of the `mso_mdoc` Credentials.
//!
//! A [`Document`] is verified by [`verify_issuer_signed_document`], which runs the checks below in
//! order, failing on the first one with the given [`MdocErrorCode`].
//!
//!   1. The `docType` and `issuerSigned` are present ([`MdocErrorCode::DocTypeMissing`],
//!      [`MdocErrorCode::IssuerSignedMissing`]).
//!   2. The `issuerAuth` and `nameSpaces` are present ([`MdocErrorCode::IssuerAuthMissing`],
//!      [`MdocErrorCode::IssuerNameSpacesMissing`]).
//!   3. The `x5chain` is valid at the given time and the `issuerAuth` is signed by its leaf
//!      ([`MdocErrorCode::IssuerAuthInvalid`]).
//!   4. If trusted roots are given, the `x5chain` leads to one of them
//!      ([`MdocErrorCode::X5ChainInvalid`]).
//!   5. The Mobile Security Object has all the required members.
//!   6. The `docType` of the Mobile Security Object is the one of the document
//!      ([`MdocErrorCode::DocTypeMismatch`]).
//!   7. Every disclosed item matches its digest ([`MdocErrorCode::ValueDigestsMissing`],
//!      [`MdocErrorCode::ValueDigestMismatch`]).
//!   8. The document is within its validity period ([`MdocErrorCode::DocumentNotYetValid`],
//!      [`MdocErrorCode::DocumentExpired`]).
//!
//! A batch of documents is verified with [`verify_issuer_signed_documents`] or the [`Verifier`],
//! where a failure of one document never affects the others.

use bhx5chain::{VerifyOptions, X509Trust, DEFAULT_CLOCK_SKEW_SECONDS};
use serde::{Deserialize, Serialize};

use crate::{
    error::code_err,
    models::{
        data_retrieval::{
            common::DocType,
            device_retrieval::response::{Document, DocumentError},
            Claims,
        },
        DeviceResponse,
    },
    MdocErrorCode, Result,
};

/// Verifies the issuer-signed part of a single [`Document`] at `current_time`.
///
/// The `clock_skew` (in seconds) widens both the certificate validity and the document validity
/// periods.  See the [module documentation][self] for the performed checks.
pub fn verify_issuer_signed_document(
    document: &Document,
    current_time: u64,
    clock_skew: u64,
    trust: Option<&X509Trust>,
) -> Result<()> {
    let doc_type = document
        .doc_type()
        .ok_or_else(|| code_err(MdocErrorCode::DocTypeMissing))?;
    let issuer_signed = document
        .issuer_signed()
        .ok_or_else(|| code_err(MdocErrorCode::IssuerSignedMissing))?;

    let issuer_auth = issuer_signed
        .issuer_auth()
        .ok_or_else(|| code_err(MdocErrorCode::IssuerAuthMissing))?;
    let name_spaces = issuer_signed
        .name_spaces()
        .ok_or_else(|| code_err(MdocErrorCode::IssuerNameSpacesMissing))?;

    let options = VerifyOptions {
        now: Some(i64::try_from(current_time).unwrap_or(i64::MAX)),
        clock_skew_seconds: clock_skew,
    };
    issuer_auth.verify(&options).map_err(|err| {
        code_err(MdocErrorCode::IssuerAuthInvalid).ctx(format!("issuer authentication: {err}"))
    })?;

    if let Some(trust) = trust {
        issuer_auth
            .x5chain()?
            .verify_against_trusted_roots(trust, options.now)
            .map_err(|err| code_err(MdocErrorCode::X5ChainInvalid).ctx(err.to_string()))?;
    }

    let mso = issuer_auth.mso()?;

    if mso.doc_type() != doc_type {
        return Err(code_err(MdocErrorCode::DocTypeMismatch)
            .ctx(format!("signed `{}`, presented `{doc_type}`", mso.doc_type())));
    }

    mso.validate_name_spaces(name_spaces)?;

    mso.validity_info().validate(current_time, clock_skew)
}

/// The outcome of verifying a batch of documents.
///
/// Every input document ends up in exactly one of the two lists, and both lists keep the input
/// order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedDocuments {
    /// The documents that passed the verification, unchanged.
    pub documents: Vec<Document>,
    /// The error codes of the rejected documents.
    pub document_errors: Vec<DocumentError>,
}

/// Verifies each of the `documents` with `verify_one`, isolating the failures.
///
/// A failed document is reported under its `docType` (or `"unknown"` if it has none) with the
/// [`MdocErrorCode`] of the failure.  Failures without a dedicated code are reported as
/// [`MdocErrorCode::IssuerSignedVerificationFailed`].
pub fn verify_documents_with<F>(documents: Vec<Document>, mut verify_one: F) -> VerifiedDocuments
where
    F: FnMut(&Document) -> Result<()>,
{
    let mut verified = VerifiedDocuments::default();

    for document in documents {
        let doc_type = document.doc_type().cloned().unwrap_or_else(DocType::unknown);

        match verify_one(&document) {
            Ok(()) => {
                log::debug!("Document `{doc_type}` verified");
                verified.documents.push(document);
            }
            Err(err) => {
                let error_code = err.error.code();
                log::warn!("Document `{doc_type}` rejected with {error_code}: {err}");
                verified
                    .document_errors
                    .push(DocumentError::new(doc_type, error_code));
            }
        }
    }

    verified
}

/// Verifies the issuer-signed part of the `documents`.
///
/// The `current_time` defaults to the system time and the `clock_skew` to
/// [`DEFAULT_CLOCK_SKEW_SECONDS`].
pub fn verify_issuer_signed_documents(
    documents: Vec<Document>,
    current_time: Option<u64>,
    clock_skew: Option<u64>,
) -> VerifiedDocuments {
    let current_time = current_time.unwrap_or_else(system_time);
    let clock_skew = clock_skew.unwrap_or(DEFAULT_CLOCK_SKEW_SECONDS);

    verify_documents_with(documents, |document| {
        verify_issuer_signed_document(document, current_time, clock_skew, None)
    })
}

fn system_time() -> u64 {
    chrono::Utc::now().timestamp().try_into().unwrap_or_default()
}

fn default_clock_skew_seconds() -> u64 {
    DEFAULT_CLOCK_SKEW_SECONDS
}

/// Configuration of the [`Verifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifierConfig {
    /// Tolerated difference between the clocks of the issuer and the verifier, in seconds.
    #[serde(default = "default_clock_skew_seconds")]
    pub clock_skew_seconds: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            clock_skew_seconds: DEFAULT_CLOCK_SKEW_SECONDS,
        }
    }
}

/// Verifier of issued `mDoc` Credentials.
///
/// Without trusted roots only the integrity of the certificate chains is checked, i.e. any
/// self-consistent chain is accepted.  Use [`Verifier::with_trust`] to also require the chains to
/// lead to a known issuer.
#[derive(Debug, Default)]
pub struct Verifier {
    config: VerifierConfig,
    trust: Option<X509Trust>,
}

impl Verifier {
    /// Creates a new [`Verifier`] with the given configuration and no trusted roots.
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            config,
            trust: None,
        }
    }

    /// Requires the issuer certificate chains to lead to one of the `trust` roots.
    pub fn with_trust(mut self, trust: X509Trust) -> Self {
        self.trust = Some(trust);
        self
    }

    /// The configuration of the [`Verifier`].
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verifies the issuer-signed part of the `documents` at `current_time`.
    pub fn verify_documents(
        &self,
        documents: Vec<Document>,
        current_time: u64,
    ) -> VerifiedDocuments {
        verify_documents_with(documents, |document| {
            verify_issuer_signed_document(
                document,
                current_time,
                self.config.clock_skew_seconds,
                self.trust.as_ref(),
            )
        })
    }

    /// Verifies the documents of the `device_response`.
    ///
    /// The returned [`DeviceResponse`] holds the verified documents, and the error codes of the
    /// rejected ones in its `documentErrors`.
    pub fn verify_device_response(
        &self,
        device_response: DeviceResponse,
        current_time: u64,
    ) -> DeviceResponse {
        let documents = device_response.into_documents().unwrap_or_default();
        let verified = self.verify_documents(documents, current_time);

        DeviceResponse::new(verified.documents, verified.document_errors)
    }

    /// Parses the `vp_token` into a [`DeviceResponse`] and verifies its documents.
    ///
    /// # Error
    ///
    /// An error is returned only if the `vp_token` is not a well-formed [`DeviceResponse`].
    pub fn verify_vp_token(&self, vp_token: &str, current_time: u64) -> Result<DeviceResponse> {
        let device_response = DeviceResponse::from_base64_cbor(vp_token)?;

        Ok(self.verify_device_response(device_response, current_time))
    }

    /// Extracts the data elements of the verified `documents`.
    pub fn claims(documents: &[Document]) -> Vec<Claims> {
        documents.iter().map(Document::claims).collect()
    }
}

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

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! This crate provides the functionality for verifying the issuer-signed part of mobile driving
//! licenses (mDLs) and other `mso_mdoc` Credentials in compliance with the [ISO/IEC
//! 18013-5:2021][1] standard, as presented in the `vp_token` of the OpenID for [Verifiable
//! Presentations][2].
//!
//! [1]: <https://www.iso.org/standard/69084.html>
//! [2]: <https://openid.net/specs/openid-4-verifiable-presentations-1_0.html>
//!
//! # Details
//!
//! The crate defines multiple modules, which can be roughly divided as follows.
//!
//!   * High-level modules: [`issuer`] and [`verifier`].
//!   * The [`error`] module describing the error values, including the [`MdocErrorCode`]s reported
//!     for the rejected documents.
//!   * The [`crypto`] module with the signing & verification primitives.
//!   * Low-level data model -- [`models`], including the grouping of the `age_over_NN` data
//!     elements.
//!
//! A typical user of this crate is expected to care only about the high-level modules.  The lower
//! level data model is exposed for advanced users wishing to adapt the crate to their `mso_mdoc`
//! use case.
//!
//! # Examples
//!
//! ## Verifying a `vp_token`
//!
//! ```no_run
//! use bhmdoc::{Verifier, VerifierConfig};
//!
//! let trust = bhx5chain::X509Trust::from_pem(b"PEM encoded root certificates").unwrap();
//! let verifier = Verifier::new(VerifierConfig::default()).with_trust(trust);
//!
//! // `vp_token` as per <https://openid.net/specs/openid-4-verifiable-presentations-1_0.html>
//! let vp_token = "Base64url encoded Verifiable Presentation";
//! let current_time = 1746057600;
//!
//! let device_response = verifier.verify_vp_token(vp_token, current_time).unwrap();
//!
//! for error in device_response.document_errors() {
//!     println!("{} rejected: {}", error.doc_type(), error.error_code());
//! }
//!
//! let claims = Verifier::claims(device_response.documents());
//! ```
//!
//! ## Grouping the `age_over_NN` Data Elements
//!
//! ```no_run
//! use bhmdoc::models::{enrich_issuer_signed_items, IssuerSigned, NameSpace};
//!
//! let issuer_signed = IssuerSigned::from_base64_url("Base64url encoded IssuerSigned").unwrap();
//! let name_space = NameSpace::from("org.iso.18013.5.1");
//! let items = issuer_signed.name_spaces().unwrap().get(&name_space).unwrap();
//!
//! let enriched = enrich_issuer_signed_items(items).unwrap();
//!
//! // the smallest threshold the holder is known to be over
//! let over = enriched.age_over_true_items.first().map(|item| item.nn);
//! ```

pub mod crypto;
pub mod error;
pub mod issuer;
pub mod models;
mod utils;
pub mod verifier;

pub use error::{MdocError, MdocErrorCode, Result};
pub use issuer::Issuer;
pub use models::data_retrieval::device_retrieval::issuer_auth::DeviceKey;
pub use utils::{
    coset::{cose_key_from_jwk, cose_key_to_jwk, Jwk},
    json::json_to_cbor,
};
pub use verifier::{
    verify_documents_with, verify_issuer_signed_document, verify_issuer_signed_documents,
    VerifiedDocuments, Verifier, VerifierConfig,
};

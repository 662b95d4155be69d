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

//! This crate provides functions and types for working with an ordered array of X.509 certificates
//! (`x5chain`) as defined in [RFC 9360][1].
//!
//! [1]: <https://www.rfc-editor.org/rfc/rfc9360.html#section-2-5.4.1>
//!
//! # Details
//!
//! The primary API this crate offers is the [`X5Chain`] struct, and the [`verify_x5chain`]
//! function which checks the validity periods and the signatures of an ordered chain, from the
//! leaf up to the self-signed root.
//!
//! # Examples
//!
//! ## Simple Use
//!
//! You can construct the [`X5Chain`] directly if you have [`openssl::x509::X509`] certificates.
//! The following example assumes that is the case for `*_certificate` variables.
//!
//! ```ignore
//! let x5chain = bhx5chain::X5Chain::new(vec![
//!     issuer_certificate,
//!     intermediary_certificate,
//!     root_certificate,
//! ])
//! .expect("ordered x5chain");
//!
//! // Check the validity periods (with 60 seconds of tolerance) and the signatures.
//! x5chain
//!     .verify(&bhx5chain::VerifyOptions::at(current_time))
//!     .expect("valid x5chain");
//!
//! let trust = bhx5chain::X509Trust::new(vec![trusted_root_certificate]);
//!
//! x5chain
//!     .verify_against_trusted_roots(&trust, Some(current_time))
//!     .expect("trusted x5chain");
//!```
//!
//! ## Advanced Use
//!
//! If you need to create certificates during the runtime, e.g. in tests, use the [`Builder`].
//!
//! ```
//! use bhx5chain::{Builder, Validity, VerifyOptions};
//! use openssl::{ec::{EcGroup, EcKey}, nid::Nid, pkey::PKey};
//!
//! let validity = Validity::new(1_700_000_000, 1_900_000_000);
//!
//! let root = Builder::self_signed_root("root", validity).unwrap();
//! let intermediary = root.issue_intermediary("intermediary", validity).unwrap();
//!
//! let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
//! let issuer_key = EcKey::generate(&group).unwrap();
//! let issuer_public_key =
//!     PKey::from_ec_key(EcKey::from_public_key(&group, issuer_key.public_key()).unwrap())
//!         .unwrap();
//!
//! let x5chain = intermediary
//!     .generate_x5chain(&issuer_public_key, validity)
//!     .unwrap();
//!
//! x5chain.verify(&VerifyOptions::at(1_800_000_000)).unwrap();
//! ```

mod builder;
mod error;
mod verify;
mod x5chain;

pub use builder::*;
pub use error::*;
pub use verify::*;
pub use x5chain::*;

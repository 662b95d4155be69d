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

//! This module defines the [`Issuer`] type, which issues the issuer-signed part of the `mso_mdoc`
//! Credentials, as defined by the [ISO/IEC 18013-5:2021][1] standard.
//!
//! [1]: <https://www.iso.org/standard/69084.html>

use rand::Rng;

use crate::{
    crypto::{HasX5Chain, Signer},
    models::{
        data_retrieval::{
            common::DocType,
            device_retrieval::{
                issuer_auth::{IssuerAuth, ValidityInfo},
                response::{IssuerNameSpaces, IssuerSigned, IssuerSignedItem},
            },
            Claims,
        },
        Bytes,
    },
    DeviceKey, Result,
};

/// The [`Issuer`] is responsible for issuing `mDL` & other `mso_mdoc` Credentials.
///
/// Every data element gets a fresh random salt and a digest ID unique within its name space.  The
/// digests are bound by the `MobileSecurityObject`, which is signed with the provided [`Signer`] and
/// carries its certificate chain in the unprotected header.
pub struct Issuer;

impl Issuer {
    /// Issue a new `mso_mdoc` Credential.
    pub fn issue<S: Signer + HasX5Chain, R: Rng + ?Sized>(
        &self,
        doc_type: DocType,
        claims: Claims,
        device_key: DeviceKey,
        signer: &S,
        rng: &mut R,
        validity_info: ValidityInfo,
    ) -> Result<IssuerSigned> {
        let name_spaces = IssuerNameSpaces(
            claims
                .0
                .into_iter()
                .map(|(name_space, elements)| {
                    let items = elements
                        .into_iter()
                        .enumerate()
                        .map(|(digest_id, (element_identifier, element_value))| {
                            IssuerSignedItem::new(
                                digest_id.into(),
                                Bytes::random_salt(rng),
                                element_identifier,
                                element_value,
                            )
                            .into()
                        })
                        .collect();

                    (name_space, items)
                })
                .collect(),
        );

        let issuer_auth =
            IssuerAuth::new(doc_type, &name_spaces, device_key, signer, validity_info)?;

        Ok(IssuerSigned::new(name_spaces, issuer_auth))
    }
}

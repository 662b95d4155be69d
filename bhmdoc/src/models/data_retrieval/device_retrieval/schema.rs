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

//! Structural schemas of the _CBOR_ structures of the section `8.3.2.1.2.2` of the [ISO/IEC
//! 18013-5:2021][1].
//!
//! Every structure is validated against its schema before it is decoded into the typed model, so
//! that the structural problems are reported with the full path to the offending value.
//!
//! [1]: <https://www.iso.org/standard/69084.html>

use bh_cbor_schema::{
    entry, Any, ArraySchema, Bytes, Int, MapSchema, Optional, Schema as _, StrictMapSchema, Tagged,
    Text, Uint, UnknownKeys,
};
use bherror::traits::{ForeignError as _, PropagateError as _};
use serde::de::DeserializeOwned;

use crate::{
    models::{MDOC_BYTES_CBOR_TAG, MDOC_TDATE_CBOR_TAG},
    MdocError, Result,
};

fn strict_map(
    target: &'static str,
    entries: Vec<(bh_cbor_schema::MapKey, Box<dyn bh_cbor_schema::Schema>)>,
    unknown_keys: UnknownKeys,
) -> Result<StrictMapSchema> {
    StrictMapSchema::new(target, entries, unknown_keys).with_err(|| MdocError::Schema(target))
}

/// Decodes the _CBOR_ `bytes` into `T`, after checking them against the `schema` of the `target`
/// structure.
pub(crate) fn decode_validated<T: DeserializeOwned>(
    bytes: &[u8],
    target: &'static str,
    schema: Result<StrictMapSchema>,
) -> Result<T> {
    let value: ciborium::Value =
        ciborium::from_reader(bytes).foreign_err(|| MdocError::Schema(target))?;

    schema?
        .parse(&value)
        .with_err(|| MdocError::Schema(target))?;

    ciborium::from_reader(bytes).foreign_err(|| MdocError::Schema(target))
}

fn tdate() -> Tagged<Text> {
    Tagged::new(MDOC_TDATE_CBOR_TAG, Text)
}

pub(crate) fn issuer_signed_item_schema() -> Result<StrictMapSchema> {
    strict_map(
        "IssuerSignedItem",
        vec![
            entry("digestID", Uint),
            entry("random", Bytes),
            entry("elementIdentifier", Text),
            entry("elementValue", Any),
        ],
        UnknownKeys::Strip,
    )
}

/// The timestamps are the only members of the `ValidityInfo`, anything else is rejected.
pub(crate) fn validity_info_schema() -> Result<StrictMapSchema> {
    strict_map(
        "ValidityInfo",
        vec![
            entry("signed", tdate()),
            entry("validFrom", tdate()),
            entry("validUntil", tdate()),
            entry("expectedUpdate", Optional(tdate())),
        ],
        UnknownKeys::Strict,
    )
}

pub(crate) fn device_key_info_schema() -> Result<StrictMapSchema> {
    strict_map(
        "DeviceKeyInfo",
        vec![
            entry("deviceKey", MapSchema::new("DeviceKey", Any, Any).nonempty()),
            entry("keyAuthorizations", Optional(Any)),
            entry("keyInfo", Optional(Any)),
        ],
        UnknownKeys::Strip,
    )
}

fn value_digests_schema() -> MapSchema<Text, MapSchema<Uint, Bytes>> {
    MapSchema::new(
        "ValueDigests",
        Text,
        MapSchema::new("DigestIDs", Uint, Bytes),
    )
}

pub(crate) fn mobile_security_object_schema() -> Result<StrictMapSchema> {
    strict_map(
        "MobileSecurityObject",
        vec![
            entry("version", Text),
            entry("digestAlgorithm", Text),
            entry("valueDigests", value_digests_schema()),
            entry("deviceKeyInfo", device_key_info_schema()?),
            entry("docType", Text),
            entry("validityInfo", validity_info_schema()?),
            entry("status", Optional(Any)),
        ],
        UnknownKeys::Strip,
    )
}

fn issuer_name_spaces_schema() -> MapSchema<Text, ArraySchema<Tagged<Bytes>>> {
    MapSchema::new(
        "IssuerNameSpaces",
        Text,
        ArraySchema::new("IssuerSignedItems", Tagged::new(MDOC_BYTES_CBOR_TAG, Bytes)).nonempty(),
    )
    .nonempty()
}

pub(crate) fn issuer_signed_schema() -> Result<StrictMapSchema> {
    strict_map(
        "IssuerSigned",
        vec![
            entry("nameSpaces", Optional(issuer_name_spaces_schema())),
            // `COSE_Sign1` is checked by `coset`
            entry("issuerAuth", Optional(Any)),
        ],
        UnknownKeys::Strip,
    )
}

/// Every member is optional, the missing ones are reported by the verifier with their own error
/// codes.
pub(crate) fn document_schema() -> Result<StrictMapSchema> {
    strict_map(
        "Document",
        vec![
            entry("docType", Optional(Text)),
            entry("issuerSigned", Optional(issuer_signed_schema()?)),
            entry("deviceSigned", Optional(Any)),
            entry("errors", Optional(Any)),
        ],
        UnknownKeys::Strip,
    )
}

pub(crate) fn device_response_schema() -> Result<StrictMapSchema> {
    strict_map(
        "DeviceResponse",
        vec![
            entry("version", Text),
            entry(
                "documents",
                Optional(ArraySchema::new("Documents", document_schema()?)),
            ),
            entry(
                "documentErrors",
                Optional(ArraySchema::new(
                    "DocumentErrors",
                    MapSchema::new("DocumentError", Text, Int).nonempty(),
                )),
            ),
            entry("status", Uint),
        ],
        UnknownKeys::Strip,
    )
}

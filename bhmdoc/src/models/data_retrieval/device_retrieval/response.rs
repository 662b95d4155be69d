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

//! The `DeviceResponse` structure of the section `8.3.2.1.2.2` of the [ISO/IEC 18013-5:2021][1],
//! reduced to the issuer-signed part of its documents.
//!
//! [1]: <https://www.iso.org/standard/69084.html>

use std::collections::HashMap;

use bh_cbor_schema::Schema as _;
use bherror::traits::{ErrorContext as _, ForeignError as _, PropagateError as _};
use ciborium::Value;
use serde::{Deserialize, Serialize};

use super::{
    issuer_auth::{DigestAlgorithm, IssuerAuth},
    schema::{decode_validated, device_response_schema, issuer_signed_item_schema,
        issuer_signed_schema},
};
use crate::{
    error::MdocErrorCode,
    models::{
        data_retrieval::{
            common::{DataElementIdentifier, DataElementValue, DocType, NameSpace},
            Claims,
        },
        Bytes, BytesCbor,
    },
    utils::{
        base64::{base64_url_decode_lenient, base64_url_encode},
        digest::digest,
    },
    MdocError, Result,
};

const DEVICE_RESPONSE_VERSION: &str = "1.0";

/// The status of a `DeviceResponse` which was processed successfully.
pub const DEVICE_RESPONSE_STATUS_OK: u64 = 0;

/// [`DeviceResponse`] as defined in the section `8.3.2.1.2.2` of the [ISO/IEC 18013-5:2021][1]
/// standard.
///
/// [1]: <https://www.iso.org/standard/69084.html>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    documents: Option<Vec<Document>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_errors: Option<Vec<DocumentError>>,
    status: u64,
}

impl DeviceResponse {
    /// Creates a new successful [`DeviceResponse`].
    ///
    /// The empty lists are left out of the response.
    pub fn new(documents: Vec<Document>, document_errors: Vec<DocumentError>) -> Self {
        Self {
            version: DEVICE_RESPONSE_VERSION.to_owned(),
            documents: (!documents.is_empty()).then_some(documents),
            document_errors: (!document_errors.is_empty()).then_some(document_errors),
            status: DEVICE_RESPONSE_STATUS_OK,
        }
    }

    /// Parses the _CBOR_ encoded [`DeviceResponse`].
    ///
    /// The structure is validated first, and the problems found are reported in the error
    /// context.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        decode_validated(bytes, "DeviceResponse", device_response_schema())
            .with_err(|| MdocError::DeviceResponseParse("invalid structure".to_owned()))
    }

    /// Parses the provided `base64url`-encoded `string` of _CBOR_ data into
    /// [`DeviceResponse`].
    pub fn from_base64_cbor(value: &str) -> Result<Self> {
        // HACK(third-party): the `vp_token` of a certain `third-party` implementation is encoded
        // with the padding, which is accepted here.
        let decoded = base64_url_decode_lenient(value)
            .foreign_err(|| MdocError::DeviceResponseParse("invalid base64".to_owned()))?;

        Self::from_cbor(&decoded)
    }

    /// Serializes the [`DeviceResponse`] to `base64url`-encoded (**without
    /// padding**) `string` of _CBOR_ data.
    pub fn to_base64_cbor(&self) -> Result<String> {
        let mut cbor = Vec::new();
        ciborium::into_writer(self, &mut cbor).foreign_err(|| {
            MdocError::DeviceResponseParse("serialization to CBOR failed".to_owned())
        })?;

        Ok(base64_url_encode(cbor))
    }

    /// The version of the `DeviceResponse` structure.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The status code, [`DEVICE_RESPONSE_STATUS_OK`] for a processed response.
    pub fn status(&self) -> u64 {
        self.status
    }

    /// The presented documents, empty if there are none.
    pub fn documents(&self) -> &[Document] {
        self.documents.as_deref().unwrap_or_default()
    }

    /// The errors of the rejected documents, empty if there are none.
    pub fn document_errors(&self) -> &[DocumentError] {
        self.document_errors.as_deref().unwrap_or_default()
    }

    /// Consumes the [`DeviceResponse`] and returns the underlying
    /// [`Document`]s.
    pub fn into_documents(self) -> Option<Vec<Document>> {
        self.documents
    }
}

/// A single presented document.
///
/// All the members are optional at this level, so a malformed document can still be reported
/// under its `docType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_type: Option<DocType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer_signed: Option<IssuerSigned>,
    /// Kept as is, the device authentication is not verified by this crate.
    #[serde(skip_serializing_if = "Option::is_none")]
    device_signed: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Value>,
}

impl Document {
    /// Creates a new [`Document`] carrying only the issuer-signed data.
    pub fn new(doc_type: DocType, issuer_signed: IssuerSigned) -> Self {
        Self {
            doc_type: Some(doc_type),
            issuer_signed: Some(issuer_signed),
            device_signed: None,
            errors: None,
        }
    }

    /// Creates a [`Document`] with only some of its members, as received from a third party.
    pub fn from_parts(doc_type: Option<DocType>, issuer_signed: Option<IssuerSigned>) -> Self {
        Self {
            doc_type,
            issuer_signed,
            device_signed: None,
            errors: None,
        }
    }

    /// The [`DocType`] of the document.
    pub fn doc_type(&self) -> Option<&DocType> {
        self.doc_type.as_ref()
    }

    /// The issuer-signed part of the document.
    pub fn issuer_signed(&self) -> Option<&IssuerSigned> {
        self.issuer_signed.as_ref()
    }

    /// The raw device-signed part of the document, if present.
    pub fn device_signed(&self) -> Option<&Value> {
        self.device_signed.as_ref()
    }

    /// Extracts the issuer-signed data elements.
    pub fn claims(&self) -> Claims {
        self.issuer_signed
            .as_ref()
            .map(IssuerSigned::claims)
            .unwrap_or_else(|| Claims(HashMap::new()))
    }
}

/// [`DocumentError`] as defined in the section `8.3.2.1.2.2` of the [ISO/IEC 18013-5:2021][1]
/// standard, reporting the error code of a rejected document.
///
/// It is encoded as a single-entry map `{docType: code}`.
///
/// [1]: <https://www.iso.org/standard/69084.html>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "HashMap<DocType, MdocErrorCode>",
    try_from = "HashMap<DocType, MdocErrorCode>"
)]
pub struct DocumentError {
    doc_type: DocType,
    error_code: MdocErrorCode,
}

impl DocumentError {
    /// Creates a new [`DocumentError`].
    pub fn new(doc_type: DocType, error_code: MdocErrorCode) -> Self {
        Self {
            doc_type,
            error_code,
        }
    }

    /// The [`DocType`] of the rejected document.
    pub fn doc_type(&self) -> &DocType {
        &self.doc_type
    }

    /// The reason the document was rejected.
    pub fn error_code(&self) -> MdocErrorCode {
        self.error_code
    }
}

impl From<DocumentError> for HashMap<DocType, MdocErrorCode> {
    fn from(value: DocumentError) -> Self {
        HashMap::from([(value.doc_type, value.error_code)])
    }
}

impl TryFrom<HashMap<DocType, MdocErrorCode>> for DocumentError {
    type Error = String;

    fn try_from(value: HashMap<DocType, MdocErrorCode>) -> std::result::Result<Self, Self::Error> {
        if value.len() != 1 {
            return Err(format!(
                "DocumentError must have exactly one entry, got {}",
                value.len()
            ));
        }

        value
            .into_iter()
            .next()
            .map(|(doc_type, error_code)| Self::new(doc_type, error_code))
            .ok_or_else(|| "DocumentError must have exactly one entry".to_owned())
    }
}

/// [`IssuerSigned`] as defined in the section `8.3.2.1.2.2` of the [ISO/IEC 18013-5:2021][1]
/// standard.
///
/// [1]: <https://www.iso.org/standard/69084.html>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSigned {
    #[serde(skip_serializing_if = "Option::is_none")]
    name_spaces: Option<IssuerNameSpaces>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer_auth: Option<IssuerAuth>,
}

impl IssuerSigned {
    /// Creates a new [`IssuerSigned`].
    pub fn new(name_spaces: IssuerNameSpaces, issuer_auth: IssuerAuth) -> Self {
        Self {
            name_spaces: Some(name_spaces),
            issuer_auth: Some(issuer_auth),
        }
    }

    /// Creates an [`IssuerSigned`] with only some of its members, as received from a third party.
    pub fn from_parts(
        name_spaces: Option<IssuerNameSpaces>,
        issuer_auth: Option<IssuerAuth>,
    ) -> Self {
        Self {
            name_spaces,
            issuer_auth,
        }
    }

    /// Deserializes the provided _CBOR_-serialized and _base64url_-encoded string into the
    /// [`IssuerSigned`].
    pub fn from_base64_url(base64_url: &str) -> Result<Self> {
        // HACK(third-party): the payload of a certain `third-party` implementation is encoded with
        // the padding.
        let decoded = base64_url_decode_lenient(base64_url)
            .foreign_err(|| MdocError::Schema("IssuerSigned"))
            .ctx(|| "invalid base64-url payload")?;

        decode_validated(&decoded, "IssuerSigned", issuer_signed_schema())
    }

    /// The disclosed issuer-signed items.
    pub fn name_spaces(&self) -> Option<&IssuerNameSpaces> {
        self.name_spaces.as_ref()
    }

    /// The Issuer's signature over the Mobile Security Object.
    pub fn issuer_auth(&self) -> Option<&IssuerAuth> {
        self.issuer_auth.as_ref()
    }


    /// Extracts the data elements.
    pub fn claims(&self) -> Claims {
        self.name_spaces
            .as_ref()
            .map(IssuerNameSpaces::claims)
            .unwrap_or_else(|| Claims(HashMap::new()))
    }
}

/// The issuer-signed items, grouped by their namespace.
///
/// The order of the namespaces is not preserved on re-encoding, the order of the items within a
/// namespace is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IssuerNameSpaces(pub(crate) HashMap<NameSpace, Vec<IssuerSignedItemBytes>>);

impl IssuerNameSpaces {
    /// The items of the given `name_space`.
    pub fn get(&self, name_space: &NameSpace) -> Option<&[IssuerSignedItemBytes]> {
        self.0.get(name_space).map(Vec::as_slice)
    }

    /// Iterates over the namespaces and their items.
    pub fn iter(&self) -> impl Iterator<Item = (&NameSpace, &[IssuerSignedItemBytes])> {
        self.0
            .iter()
            .map(|(name_space, items)| (name_space, items.as_slice()))
    }

    /// Extracts the data elements.
    pub fn claims(&self) -> Claims {
        Claims(
            self.0
                .iter()
                .map(|(k, vs)| {
                    let vs_map = vs
                        .iter()
                        .map(|item| {
                            let item = item.item();
                            (item.element_identifier.clone(), item.element_value.clone())
                        })
                        .collect();

                    (k.clone(), vs_map)
                })
                .collect(),
        )
    }
}

impl From<HashMap<NameSpace, Vec<IssuerSignedItemBytes>>> for IssuerNameSpaces {
    fn from(value: HashMap<NameSpace, Vec<IssuerSignedItemBytes>>) -> Self {
        Self(value)
    }
}

/// An [`IssuerSignedItem`] embedded as a tagged _CBOR_ byte string.
///
/// The bytes received are retained, as the digest is computed over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuerSignedItemBytes(pub(crate) BytesCbor<IssuerSignedItem>);

impl IssuerSignedItemBytes {
    /// The embedded [`IssuerSignedItem`].
    pub fn item(&self) -> &IssuerSignedItem {
        &self.0.inner
    }

    /// Computes the digest of the serialized `self`.
    pub fn digest(&self, alg: &DigestAlgorithm) -> Result<Vec<u8>> {
        let serialize = || -> Result<Vec<u8>> {
            let mut payload = Vec::new();
            ciborium::into_writer(self, &mut payload)
                .foreign_err(|| MdocError::IssuerAuth)
                .ctx(|| "unable to serialize `IssuerSignedItemBytes`")?;

            Ok(payload)
        };

        let payload = match self.0.original_data {
            Some(ref original_data) => original_data,
            None => &serialize()?,
        };

        Ok(digest(alg, payload))
    }
}

impl From<IssuerSignedItem> for IssuerSignedItemBytes {
    fn from(value: IssuerSignedItem) -> Self {
        Self(value.into())
    }
}

impl From<IssuerSignedItemBytes> for IssuerSignedItem {
    fn from(value: IssuerSignedItemBytes) -> Self {
        value.0.inner
    }
}

/// [`IssuerSignedItem`] as defined in the section `8.3.2.1.2.2` of the [ISO/IEC
/// 18013-5:2021][1] standard.
///
/// Unknown members are dropped when decoding.
///
/// [1]: <https://www.iso.org/standard/69084.html>
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct IssuerSignedItem {
    #[serde(rename = "digestID")]
    pub(crate) digest_id: DigestID,
    pub(crate) random: Bytes,
    pub(crate) element_identifier: DataElementIdentifier,
    pub(crate) element_value: DataElementValue,
}

impl IssuerSignedItem {
    /// Creates a new [`IssuerSignedItem`].
    pub fn new(
        digest_id: DigestID,
        random: Bytes,
        element_identifier: DataElementIdentifier,
        element_value: DataElementValue,
    ) -> Self {
        Self {
            digest_id,
            random,
            element_identifier,
            element_value,
        }
    }

    /// The identifier of the digest in the Mobile Security Object.
    pub fn digest_id(&self) -> DigestID {
        self.digest_id
    }

    /// The salt of the item.
    pub fn random(&self) -> &Bytes {
        &self.random
    }

    /// The identifier of the data element.
    pub fn element_identifier(&self) -> &DataElementIdentifier {
        &self.element_identifier
    }

    /// The value of the data element.
    pub fn element_value(&self) -> &DataElementValue {
        &self.element_value
    }
}

impl TryFrom<Value> for IssuerSignedItem {
    type Error = bherror::Error<MdocError>;

    fn try_from(value: Value) -> Result<Self> {
        let invalid = || bherror::Error::root(MdocError::Schema("IssuerSignedItem"));

        let Value::Map(entries) = issuer_signed_item_schema()?
            .parse(&value)
            .with_err(|| MdocError::Schema("IssuerSignedItem"))?
        else {
            return Err(invalid());
        };

        let mut digest_id = None;
        let mut random = None;
        let mut element_identifier = None;
        let mut element_value = None;

        // the schema guarantees both the presence & the types of the members
        for (key, value) in entries {
            match key.as_text() {
                Some("digestID") => {
                    digest_id = value.as_integer().and_then(|id| u64::try_from(id).ok())
                }
                Some("random") => random = value.into_bytes().ok(),
                Some("elementIdentifier") => element_identifier = value.into_text().ok(),
                Some("elementValue") => element_value = Some(value),
                _ => {}
            }
        }

        Ok(Self {
            digest_id: digest_id.ok_or_else(invalid)?.into(),
            random: random.ok_or_else(invalid)?.into(),
            element_identifier: element_identifier.ok_or_else(invalid)?.into(),
            element_value: element_value.ok_or_else(invalid)?.into(),
        })
    }
}

/// [`DigestID`] as defined in the section `9.1.2.4` of the [ISO/IEC 18013-5:2021][1] standard.
///
/// [1]: <https://www.iso.org/standard/69084.html>
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DigestID(u64);

impl DigestID {
    /// The numeric value of the identifier.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DigestID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DigestID {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<usize> for DigestID {
    fn from(value: usize) -> Self {
        Self(value as u64)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use ciborium::{from_reader, into_writer};

    use super::*;
    use crate::utils::test::{
        issue_document, THIRD_PARTY_ISSUER_SIGNED, THIRD_PARTY_PID_DOC_TYPE, THIRD_PARTY_VP_TOKEN,
    };

    fn text(value: &str) -> Value {
        Value::Text(value.to_owned())
    }

    #[test]
    fn device_response_from_vp_token() {
        let response = DeviceResponse::from_base64_cbor(THIRD_PARTY_VP_TOKEN).unwrap();

        assert_eq!(response.version(), "1.0");
        assert_eq!(response.status(), DEVICE_RESPONSE_STATUS_OK);
        assert!(response.document_errors().is_empty());

        let [document] = response.documents() else {
            panic!("expected a single document");
        };

        assert_eq!(document.doc_type(), Some(&THIRD_PARTY_PID_DOC_TYPE.into()));
        assert!(document.device_signed().is_some());
        assert_eq!(
            serde_json::Value::Object(document.claims().into_json().unwrap()),
            serde_json::json!({
                "eu.europa.ec.eudi.pid.1": {
                    "family_name": "John",
                }
            })
        );
    }

    #[test]
    fn device_response_from_base64() {
        /// This was generated by a `third-party` implementation at some point.
        const PAYLOAD: &str = "o2d2ZXJzaW9uYzEuMGlkb2N1bWVudHOBo2dkb2NUeXBldW9y\
Zy5pc28uMTgwMTMuNS4xLm1ETGxpc3N1ZXJTaWduZWSiam5hbWVTcGFjZXOhcW9yZ19pc29fMTgwMTN\
fNV8xgtgYWFKkaGRpZ2VzdElEAGZyYW5kb21QIBsw4QdcCU7p3TAlXLUhR3FlbGVtZW50SWRlbnRpZm\
llcmtmYW1pbHlfbmFtZWxlbGVtZW50VmFsdWVjRG9l2BhYWKRoZGlnZXN0SUQCZnJhbmRvbVACqLYXh\
eJFRzC40lsh6yq8cWVsZW1lbnRJZGVudGlmaWVyamJpcnRoX2RhdGVsZWxlbWVudFZhbHVlajE5ODAt\
MDEtMDJqaXNzdWVyQXV0aIRDoQEmoRghWQFLMIIBRzCB7qADAgECAgg57ch6mnj5KjAKBggqhkjOPQQ\
DAjAXMRUwEwYDVQQDDAxNRE9DIFJPT1QgQ0EwHhcNMjQwNTAyMTMxMzMwWhcNMjUwNTAyMTMxMzMwWj\
AbMRkwFwYDVQQDDBBNRE9DIFRlc3QgSXNzdWVyMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEG0RIN\
BiF-oQUD3d5DGnegQuXenI29JDaMGoMvioKRBN53d4UazakS2unu8BnsEtxutS2kqRhYBPYk9RAriU3\
gaMgMB4wDAYDVR0TAQH_BAIwADAOBgNVHQ8BAf8EBAMCB4AwCgYIKoZIzj0EAwIDSAAwRQIhAI5wBBA\
A3ewqIwslhuzFn4rNFW9dkz2TY7xeImO7CraYAiAYhai1NzJ6abAiYg8HxcRdYpO4bu2Sej8E6CzFHK\
34Y1kBw9gYWQG-pmd2ZXJzaW9uYzEuMG9kaWdlc3RBbGdvcml0aG1nU0hBLTI1Nmx2YWx1ZURpZ2Vzd\
HOhcW9yZ19pc29fMTgwMTNfNV8xowBYIIXUtCznu-4CnWivDESZoRvtlxjQdmt79EdKfzubMty1AVgg\
vBXpuXDOlefwcyCY2yOOK4ONuyNq__cpD64kBycgVUACWCBhHekPObnLF5tmMy6BX4aZ2rbI8Getkzb\
zo8OhrW-T621kZXZpY2VLZXlJbmZvoWlkZXZpY2VLZXmkAQIgASFYIHcbsgk0wLT6AIkzndNF4CLjAj\
7bNEf4dMw0c98EINZ3Ilgg80Q6qOipMrsZB7WDWI6dyGqa8jNARA58GtHx0oyLUt9nZG9jVHlwZXVvc\
mcuaXNvLjE4MDEzLjUuMS5tRExsdmFsaWRpdHlJbmZvo2ZzaWduZWTAeB4yMDI0LTEyLTA0VDA4OjQz\
OjQ2Ljk1NzI5ODY3N1ppdmFsaWRGcm9twHgeMjAyNC0xMi0wNFQwODo0Mzo0Ni45NTczMDA1NTFaanZ\
hbGlkVW50aWzAeB4yMDI1LTEyLTA0VDA4OjQzOjQ2Ljk1NzMwMDk5NlpYQE4rD9KsoPn9QFfdBNStvM\
NEaaCfkGsUf462YdFWxpyvQK2z8socwOWKxtsRsu05UQjSDKClfrYnIjdrK9qgHV9sZGV2aWNlU2lnb\
mVkompuYW1lU3BhY2Vz2BhBoGpkZXZpY2VBdXRooW9kZXZpY2VTaWduYXR1cmWEQ6EBJqEYIYD2WEDs\
5eTKpqi4GeqQSGuBlU4NVSidbnVpWrSC0OHGUThorpCiRuWvBa4zsQwK5of3yGQiuqlCQrkgLFVYpjJ\
tseR5ZnN0YXR1cwA=";

        let response = DeviceResponse::from_base64_cbor(PAYLOAD).unwrap();

        let [document] = response.documents() else {
            panic!("expected a single document");
        };
        assert_eq!(document.doc_type(), Some(&"org.iso.18013.5.1.mDL".into()));

        let issuer_signed = document.issuer_signed().unwrap();
        let items = issuer_signed
            .name_spaces()
            .unwrap()
            .get(&"org_iso_18013_5_1".into())
            .unwrap();

        assert_eq!(
            items
                .iter()
                .map(|item| (item.item().digest_id().value(), item.item().random().clone()))
                .collect::<Vec<_>>(),
            vec![
                (0, Bytes::from_hex("201b30e1075c094ee9dd30255cb52147").unwrap()),
                (2, Bytes::from_hex("02a8b61785e2454730b8d25b21eb2abc").unwrap()),
            ]
        );
        assert_eq!(
            serde_json::Value::Object(document.claims().into_json().unwrap()),
            serde_json::json!({
                "org_iso_18013_5_1": {
                    "family_name": "Doe",
                    "birth_date": "1980-01-02",
                }
            })
        );
    }

    #[test]
    fn issuer_signed_from_base64_with_padding() {
        let issuer_signed = IssuerSigned::from_base64_url(THIRD_PARTY_ISSUER_SIGNED).unwrap();

        assert!(issuer_signed.issuer_auth().is_some());
        assert_eq!(
            issuer_signed
                .name_spaces()
                .unwrap()
                .get(&THIRD_PARTY_PID_DOC_TYPE.into())
                .unwrap()
                .len(),
            8
        );
    }

    #[test]
    fn device_response_round_trip() {
        let document = issue_document();
        let response = DeviceResponse::new(
            vec![document],
            vec![DocumentError::new(
                "org.example.unknown".into(),
                MdocErrorCode::DocTypeMismatch,
            )],
        );

        let serialized = response.to_base64_cbor().unwrap();
        let deserialized = DeviceResponse::from_base64_cbor(&serialized).unwrap();

        // the retained original bytes re-encode to the same payload
        assert_eq!(deserialized.to_base64_cbor().unwrap(), serialized);
        assert_eq!(deserialized.documents().len(), 1);
        assert_eq!(deserialized.document_errors(), response.document_errors());
        assert_eq!(deserialized.documents()[0].claims(), response.documents()[0].claims());
    }

    #[test]
    fn device_response_structure_is_validated() {
        let mut cbor = vec![];
        into_writer(
            &Value::Map(vec![
                (text("version"), text("1.0")),
                (text("documents"), Value::Array(vec![])),
            ]),
            &mut cbor,
        )
        .unwrap();

        let err = DeviceResponse::from_cbor(&cbor).unwrap_err();
        assert_matches!(err.error, MdocError::DeviceResponseParse(_));
    }

    #[test]
    fn document_error_is_single_entry_map() {
        let error = DocumentError::new(
            "org.iso.18013.5.1.mDL".into(),
            MdocErrorCode::ValueDigestsMissing,
        );

        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            serde_json::json!({ "org.iso.18013.5.1.mDL": 8 })
        );

        let mut cbor = vec![];
        into_writer(&error, &mut cbor).unwrap();
        assert_eq!(from_reader::<DocumentError, _>(cbor.as_slice()).unwrap(), error);

        assert!(serde_json::from_value::<DocumentError>(serde_json::json!({
            "org.iso.18013.5.1.mDL": 8,
            "eu.europa.ec.eudi.pid.1": 14,
        }))
        .is_err());
    }

    #[test]
    fn issuer_signed_item_without_element_identifier_fails() {
        let item = Value::Map(vec![
            (text("digestID"), Value::from(0)),
            (text("random"), Value::Bytes(vec![0; 16])),
            (text("elementValue"), text("Doe")),
        ]);

        let err = IssuerSignedItem::try_from(item).unwrap_err();
        assert_matches!(err.error, MdocError::Schema("IssuerSignedItem"));
    }

    #[test]
    fn reordered_fields_in_issuer_signed_item_bytes_produce_different_digest() {
        // Generated with cbor.zone
        const ISSUER_SIGNED_ITEM_BYTES: &str = "d8185852a46672616e646f6d50f4b65b3379407aa9a0390309\
b792344c71656c656d656e744964656e7469666965726b66616d696c795f6e616d65686469676573744944006c656c656d\
656e7456616c756563446f65";

        let mut issuer_signed_item_bytes: IssuerSignedItemBytes =
            ciborium::from_reader(hex::decode(ISSUER_SIGNED_ITEM_BYTES).unwrap().as_slice())
                .unwrap();

        let deserialized_data_digest = issuer_signed_item_bytes
            .digest(&DigestAlgorithm::Sha256)
            .unwrap();

        // this is same as creating new instance without deserialized data
        issuer_signed_item_bytes.0.original_data = None;

        let newly_created_data_digest = issuer_signed_item_bytes
            .digest(&DigestAlgorithm::Sha256)
            .unwrap();

        assert_ne!(deserialized_data_digest, newly_created_data_digest);
    }
}

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

//! Grouping of the disclosed [`IssuerSignedItem`]s for answering the `age_over_NN` queries.
//!
//! The `age_over_NN` data elements attest whether the holder is at least `NN` years old.  They are
//! split by their value and ordered so that a linear scan can stop at the first relevant
//! attestation: the `true` ones ascending by `NN`, the `false` ones descending by `NN`.  Every other
//! item keeps the order it was disclosed in.

use std::cmp::Reverse;

use bherror::traits::ForeignError as _;
use ciborium::Value;

use super::response::{IssuerSignedItem, IssuerSignedItemBytes};
use crate::{models::MDOC_BYTES_CBOR_TAG, MdocError, Result};

const AGE_OVER_PREFIX: &str = "age_over_";

const MAX_AGE_OVER: u8 = 99;

/// An `age_over_NN` item along with its parsed `NN`.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeOverItem {
    /// The age threshold `NN`.
    pub nn: u8,
    /// The disclosed item.
    pub item: IssuerSignedItem,
}

/// The disclosed items, grouped as returned by [`enrich_issuer_signed_items`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedItems {
    /// The items other than `age_over_NN`, in the original order.
    pub normal_items: Vec<IssuerSignedItem>,
    /// The `age_over_NN` items with the `true` value, ascending by `NN`.
    pub age_over_true_items: Vec<AgeOverItem>,
    /// The `age_over_NN` items with the `false` value, descending by `NN`.
    pub age_over_false_items: Vec<AgeOverItem>,
}

/// Groups the disclosed items into the normal and the `age_over_NN` ones.
///
/// An identifier starting with `age_over_` must be followed by exactly two decimal digits, and its
/// value must be a boolean.  Otherwise [`MdocError::InvalidAgeOverFormat`] or
/// [`MdocError::InvalidAgeOverValue`] is returned.
pub fn enrich_issuer_signed_items(items: &[IssuerSignedItemBytes]) -> Result<EnrichedItems> {
    enrich(items.iter().map(|item| item.item().clone()))
}

/// Same as [`enrich_issuer_signed_items`], for the raw `IssuerSignedItemBytes`, i.e. the items
/// embedded as tagged _CBOR_ byte strings.
///
/// An item without the `elementIdentifier` fails with [`MdocError::MissingElementIdentifier`].
pub fn enrich_issuer_signed_item_values(tags: &[Value]) -> Result<EnrichedItems> {
    let items = tags
        .iter()
        .map(decode_tagged_item)
        .collect::<Result<Vec<_>>>()?;

    enrich(items)
}

fn decode_tagged_item(tag: &Value) -> Result<IssuerSignedItem> {
    let Value::Tag(MDOC_BYTES_CBOR_TAG, inner) = tag else {
        return Err(bherror::Error::root(MdocError::Schema("IssuerSignedItemBytes"))
            .ctx(format!("MUST be tagged with `{MDOC_BYTES_CBOR_TAG}`")));
    };

    let bytes = inner.as_bytes().ok_or_else(|| {
        bherror::Error::root(MdocError::Schema("IssuerSignedItemBytes")).ctx("MUST be `Bytes`")
    })?;

    let item: Value = ciborium::from_reader(bytes.as_slice())
        .foreign_err(|| MdocError::Schema("IssuerSignedItemBytes"))?;

    if let Value::Map(entries) = &item {
        let has_identifier = entries
            .iter()
            .any(|(key, _)| key.as_text() == Some("elementIdentifier"));

        if !has_identifier {
            return Err(bherror::Error::root(MdocError::MissingElementIdentifier));
        }
    }

    IssuerSignedItem::try_from(item)
}

fn enrich(items: impl IntoIterator<Item = IssuerSignedItem>) -> Result<EnrichedItems> {
    let mut enriched = EnrichedItems::default();

    for item in items {
        let identifier = item.element_identifier().as_str();

        let Some(suffix) = identifier.strip_prefix(AGE_OVER_PREFIX) else {
            enriched.normal_items.push(item);
            continue;
        };

        let nn = parse_age_over(identifier, suffix)?;

        let is_over = match &item.element_value().0 {
            Value::Bool(value) => *value,
            other => {
                return Err(bherror::Error::root(MdocError::InvalidAgeOverValue(
                    identifier.to_owned(),
                    bh_cbor_schema::type_name(other),
                )))
            }
        };

        let age_over = AgeOverItem { nn, item };
        if is_over {
            enriched.age_over_true_items.push(age_over);
        } else {
            enriched.age_over_false_items.push(age_over);
        }
    }

    enriched.age_over_true_items.sort_by_key(|item| item.nn);
    enriched
        .age_over_false_items
        .sort_by_key(|item| Reverse(item.nn));

    Ok(enriched)
}

fn parse_age_over(identifier: &str, suffix: &str) -> Result<u8> {
    let invalid = || bherror::Error::root(MdocError::InvalidAgeOverFormat(identifier.to_owned()));

    if suffix.len() != 2 || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let nn: u8 = suffix
        .parse()
        .foreign_err(|| MdocError::InvalidAgeOverFormat(identifier.to_owned()))?;

    if nn > MAX_AGE_OVER {
        return Err(invalid());
    }

    Ok(nn)
}

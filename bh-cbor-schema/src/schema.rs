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

use bherror::traits::ForeignError as _;
use ciborium::Value;
use serde::de::DeserializeOwned;

use crate::{issue::Issues, Result, SchemaError};

/// A validator of untyped CBOR values.
pub trait Schema: Send + Sync {
    /// Validates `value`, recording every problem found into `issues`.
    ///
    /// Returns the freshly constructed validated value, or [`None`] if at least one issue was
    /// recorded.
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value>;

    /// Whether the validated value may be absent.
    ///
    /// Keys of a [`StrictMapSchema`][crate::StrictMapSchema] whose schema is optional are not
    /// required to be present.
    fn is_optional(&self) -> bool {
        false
    }

    /// Validates `value`, failing with [`SchemaError::Invalid`] carrying all the issues found.
    fn parse(&self, value: &Value) -> Result<Value> {
        let mut issues = Issues::default();

        match self.check(value, &mut issues) {
            Some(output) if issues.is_empty() => Ok(output),
            _ => Err(bherror::Error::root(SchemaError::Invalid(issues))),
        }
    }

    /// Validates `value` and deserializes the validated value into `T`.
    fn parse_as<T: DeserializeOwned>(&self, value: &Value) -> Result<T>
    where
        Self: Sized,
    {
        self.parse(value)?
            .deserialized()
            .foreign_err(|| SchemaError::Deserialize)
    }
}

impl<S: Schema + ?Sized> Schema for Box<S> {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        (**self).check(value, issues)
    }

    fn is_optional(&self) -> bool {
        (**self).is_optional()
    }
}

/// Returns the name of the kind of `value`, as used in validation messages.
///
/// Containers are reported as `Map` & `Array`, a missing value as `null`, and the primitive kinds
/// as `string`, `number`, `boolean` & `bytes`.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Map(_) => "Map",
        Value::Array(_) => "Array",
        Value::Null => "null",
        Value::Text(_) => "string",
        Value::Integer(_) | Value::Float(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Bytes(_) => "bytes",
        Value::Tag(..) => "Tag",
        _ => "unknown",
    }
}

/// Message used when `value` is not of the `expected` kind.
pub(crate) fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {expected}, received {}", type_name(value))
}

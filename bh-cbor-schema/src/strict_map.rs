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

//! Validation of maps with a fixed set of keys.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
};

use ciborium::Value;

use crate::{
    issue::{Issues, PathSegment},
    schema::mismatch,
    Result, Schema, SchemaError,
};

/// A key of a [`StrictMapSchema`].
///
/// Keys order integers first, and then text strings, each in their natural order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    /// An integer key, as used by COSE structures.
    Int(i64),
    /// A text key, as used by `mso_mdoc` structures.
    Text(String),
}

impl MapKey {
    /// Returns the [`MapKey`] corresponding to `value`, if `value` can be one.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(text) => Some(Self::Text(text.clone())),
            Value::Integer(integer) => i64::try_from(*integer).ok().map(Self::Int),
            _ => None,
        }
    }

    /// Converts the key into a CBOR value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(int) => Value::from(*int),
            Self::Text(text) => Value::from(text.as_str()),
        }
    }
}

impl From<&str> for MapKey {
    fn from(key: &str) -> Self {
        Self::Text(key.to_owned())
    }
}

impl From<i64> for MapKey {
    fn from(key: i64) -> Self {
        Self::Int(key)
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(int) => write!(f, "{int}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

/// What to do with keys which are present in the validated map, but not declared in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Silently omit them from the output.
    #[default]
    Strip,
    /// Reject the map.
    Strict,
}

/// Shorthand for building the entries of a [`StrictMapSchema`].
pub fn entry(key: impl Into<MapKey>, schema: impl Schema + 'static) -> (MapKey, Box<dyn Schema>) {
    (key.into(), Box::new(schema))
}

/// Validates a map against a fixed `key -> schema` contract.
///
/// The validation runs in the following steps, and stops after the first one that fails:
///
///   1. the value must be a map;
///   2. no key may appear more than once;
///   3. all the required keys must be present, i.e. keys whose schema is not
///      [optional][Schema::is_optional];
///   4. in the [`UnknownKeys::Strict`] mode, no undeclared key may be present;
///   5. every declared key which is present must conform to its schema.
///
/// The last step reports all the issues of all the keys.
pub struct StrictMapSchema {
    target: String,
    entries: Vec<(MapKey, Box<dyn Schema>)>,
    index: HashMap<MapKey, usize>,
    required_keys: BTreeSet<MapKey>,
    unknown_keys: UnknownKeys,
}

impl StrictMapSchema {
    /// Creates a new [`StrictMapSchema`] named `target`.
    ///
    /// Fails with [`SchemaError::DuplicateKey`] if a key is declared more than once.
    pub fn new(
        target: impl Into<String>,
        entries: Vec<(MapKey, Box<dyn Schema>)>,
        unknown_keys: UnknownKeys,
    ) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        let mut required_keys = BTreeSet::new();

        for (position, (key, schema)) in entries.iter().enumerate() {
            if index.insert(key.clone(), position).is_some() {
                return Err(bherror::Error::root(SchemaError::DuplicateKey(key.clone())));
            }

            if !schema.is_optional() {
                required_keys.insert(key.clone());
            }
        }

        Ok(Self {
            target: target.into(),
            entries,
            index,
            required_keys,
            unknown_keys,
        })
    }

    /// Name of the validated structure.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Keys which must be present in every validated map, in sorted order.
    pub fn required_keys(&self) -> impl Iterator<Item = &MapKey> {
        self.required_keys.iter()
    }

    /// All the declared keys, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &MapKey> {
        self.entries.iter().map(|(key, _)| key)
    }
}

impl fmt::Debug for StrictMapSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrictMapSchema")
            .field("target", &self.target)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .field("unknown_keys", &self.unknown_keys)
            .finish()
    }
}

fn join<'a>(keys: impl IntoIterator<Item = &'a MapKey>) -> String {
    keys.into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Schema for StrictMapSchema {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        let Value::Map(input) = value else {
            issues.push_scoped(&self.target, mismatch("Map", value));
            return None;
        };

        let mut input_keys = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for key in input.iter().filter_map(|(key, _)| MapKey::from_value(key)) {
            if input_keys.contains(&key) {
                duplicates.insert(key);
            } else {
                input_keys.insert(key);
            }
        }

        if !duplicates.is_empty() {
            issues.push_scoped(
                &self.target,
                format!("Duplicate keys: {}", join(&duplicates)),
            );
            return None;
        }

        let missing: Vec<_> = self.required_keys.difference(&input_keys).collect();
        if !missing.is_empty() {
            issues.push_scoped(
                &self.target,
                format!("Missing required keys: {}", join(missing)),
            );
            return None;
        }

        if self.unknown_keys == UnknownKeys::Strict {
            let mut unknown: Vec<String> = input_keys
                .iter()
                .filter(|key| !self.index.contains_key(key))
                .map(ToString::to_string)
                .collect();
            // Keys which can't be declared at all are unknown as well.
            unknown.extend(
                input
                    .iter()
                    .filter(|(key, _)| MapKey::from_value(key).is_none())
                    .map(|(key, _)| format!("<{}>", crate::type_name(key))),
            );

            if !unknown.is_empty() {
                issues.push_scoped(
                    &self.target,
                    format!("Unrecognized keys: {}", unknown.join(", ")),
                );
                return None;
            }
        }

        let mut output = Vec::with_capacity(input.len());
        let mut valid = true;

        for (key, value) in input {
            let Some(key) = MapKey::from_value(key) else {
                continue;
            };
            let Some(&position) = self.index.get(&key) else {
                continue;
            };
            let schema = &self.entries[position].1;

            let segment: PathSegment = match &key {
                MapKey::Int(int) => (*int).into(),
                MapKey::Text(text) => text.as_str().into(),
            };

            match issues.nested(&self.target, &[segment], |issues| {
                schema.check(value, issues)
            }) {
                Some(Value::Null) if schema.is_optional() => {}
                Some(value) => output.push((key.to_value(), value)),
                None => valid = false,
            }
        }

        valid.then_some(Value::Map(output))
    }
}

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

//! Generic validators of arrays, maps, records & tuples.

use ciborium::Value;

use crate::{
    issue::{Issues, PathSegment},
    schema::mismatch,
    Schema,
};

const EMPTY_CONTAINER: &str = "At least one entry must be provided.";

/// Validates an array whose items all conform to the same schema.
///
/// Issues of the items are reported under the path `[index, ...]`.
#[derive(Debug, Clone)]
pub struct ArraySchema<S> {
    target: String,
    item: S,
    nonempty: bool,
}

impl<S: Schema> ArraySchema<S> {
    /// Creates a new [`ArraySchema`] named `target`.
    pub fn new(target: impl Into<String>, item: S) -> Self {
        Self {
            target: target.into(),
            item,
            nonempty: false,
        }
    }

    /// Rejects empty arrays.
    pub fn nonempty(mut self) -> Self {
        self.nonempty = true;
        self
    }
}

impl<S: Schema> Schema for ArraySchema<S> {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        let Value::Array(items) = value else {
            issues.push_scoped(&self.target, mismatch("Array", value));
            return None;
        };

        if self.nonempty && items.is_empty() {
            issues.push_scoped(&self.target, EMPTY_CONTAINER);
            return None;
        }

        let mut output = Vec::with_capacity(items.len());
        let mut valid = true;

        for (index, item) in items.iter().enumerate() {
            match issues.nested(&self.target, &[index.into()], |issues| {
                self.item.check(item, issues)
            }) {
                Some(item) => output.push(item),
                None => valid = false,
            }
        }

        valid.then_some(Value::Array(output))
    }
}

/// Validates a map whose keys and values conform to the key & value schemas.
///
/// Entries are addressed by their position, so issues are reported under the path
/// `[index, "key", ...]` or `[index, "value", ...]`.
#[derive(Debug, Clone)]
pub struct MapSchema<K, V> {
    target: String,
    key: K,
    value: V,
    nonempty: bool,
}

impl<K: Schema, V: Schema> MapSchema<K, V> {
    /// Creates a new [`MapSchema`] named `target`.
    pub fn new(target: impl Into<String>, key: K, value: V) -> Self {
        Self {
            target: target.into(),
            key,
            value,
            nonempty: false,
        }
    }

    /// Rejects empty maps.
    pub fn nonempty(mut self) -> Self {
        self.nonempty = true;
        self
    }
}

impl<K: Schema, V: Schema> Schema for MapSchema<K, V> {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        let Value::Map(entries) = value else {
            issues.push_scoped(&self.target, mismatch("Map", value));
            return None;
        };

        if self.nonempty && entries.is_empty() {
            issues.push_scoped(&self.target, EMPTY_CONTAINER);
            return None;
        }

        let mut output = Vec::with_capacity(entries.len());
        let mut valid = true;

        for (index, (key, value)) in entries.iter().enumerate() {
            let key = issues.nested(&self.target, &[index.into(), "key".into()], |issues| {
                self.key.check(key, issues)
            });
            let value = issues.nested(&self.target, &[index.into(), "value".into()], |issues| {
                self.value.check(value, issues)
            });

            match (key, value) {
                (Some(key), Some(value)) => output.push((key, value)),
                _ => valid = false,
            }
        }

        valid.then_some(Value::Map(output))
    }
}

/// Validates a map with text keys, whose values conform to the same schema.
///
/// Entries are addressed by their key, so issues are reported under the path `[key, ...]`.
#[derive(Debug, Clone)]
pub struct RecordSchema<V> {
    target: String,
    value: V,
    nonempty: bool,
}

impl<V: Schema> RecordSchema<V> {
    /// Creates a new [`RecordSchema`] named `target`.
    pub fn new(target: impl Into<String>, value: V) -> Self {
        Self {
            target: target.into(),
            value,
            nonempty: false,
        }
    }

    /// Rejects empty records.
    pub fn nonempty(mut self) -> Self {
        self.nonempty = true;
        self
    }
}

impl<V: Schema> Schema for RecordSchema<V> {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        let Value::Map(entries) = value else {
            issues.push_scoped(&self.target, mismatch("Map", value));
            return None;
        };

        if self.nonempty && entries.is_empty() {
            issues.push_scoped(&self.target, EMPTY_CONTAINER);
            return None;
        }

        let mut output = Vec::with_capacity(entries.len());
        let mut valid = true;

        for (index, (key, value)) in entries.iter().enumerate() {
            let Value::Text(name) = key else {
                issues.nested(&self.target, &[index.into(), "key".into()], |issues| {
                    issues.push(mismatch("string", key))
                });
                valid = false;
                continue;
            };

            let segment = PathSegment::Key(name.clone());
            match issues.nested(&self.target, &[segment], |issues| {
                self.value.check(value, issues)
            }) {
                Some(value) => output.push((key.clone(), value)),
                None => valid = false,
            }
        }

        valid.then_some(Value::Map(output))
    }
}

/// Validates a fixed-length array whose items conform to the respective schemas.
pub struct TupleSchema {
    target: String,
    items: Vec<Box<dyn Schema>>,
}

impl TupleSchema {
    /// Creates a new [`TupleSchema`] named `target`.
    pub fn new(target: impl Into<String>, items: Vec<Box<dyn Schema>>) -> Self {
        Self {
            target: target.into(),
            items,
        }
    }
}

impl Schema for TupleSchema {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        let Value::Array(items) = value else {
            issues.push_scoped(&self.target, mismatch("Array", value));
            return None;
        };

        if items.len() != self.items.len() {
            issues.push_scoped(
                &self.target,
                format!(
                    "expected {} items, received {}",
                    self.items.len(),
                    items.len()
                ),
            );
            return None;
        }

        let mut output = Vec::with_capacity(items.len());
        let mut valid = true;

        for (index, (schema, item)) in self.items.iter().zip(items).enumerate() {
            match issues.nested(&self.target, &[index.into()], |issues| {
                schema.check(item, issues)
            }) {
                Some(item) => output.push(item),
                None => valid = false,
            }
        }

        valid.then_some(Value::Array(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entry, Int, StrictMapSchema, Text, UnknownKeys};

    fn issues_of(schema: &impl Schema, value: &Value) -> Vec<(Vec<PathSegment>, String)> {
        schema
            .parse(value)
            .unwrap_err()
            .error
            .issues()
            .unwrap()
            .iter()
            .map(|issue| (issue.path.clone(), issue.message.clone()))
            .collect()
    }

    fn item_schema() -> StrictMapSchema {
        StrictMapSchema::new("Item", vec![entry("id", Text)], UnknownKeys::Strip).unwrap()
    }

    fn item(id: Value) -> Value {
        Value::Map(vec![(Value::from("id"), id)])
    }

    #[test]
    fn array_wrong_type_is_a_single_issue() {
        let schema = ArraySchema::new("Items", Text);

        assert_eq!(
            issues_of(&schema, &Value::Map(vec![])),
            [(vec![], "Items: expected Array, received Map".to_owned())]
        );
    }

    #[test]
    fn array_nonempty() {
        let schema = ArraySchema::new("Items", Text).nonempty();

        assert_eq!(
            issues_of(&schema, &Value::Array(vec![])),
            [(
                vec![],
                "Items: At least one entry must be provided.".to_owned()
            )]
        );
        assert!(ArraySchema::new("Items", Text)
            .parse(&Value::Array(vec![]))
            .is_ok());
    }

    #[test]
    fn array_collects_all_failing_items() {
        let schema = ArraySchema::new("Items", Text);
        let input = Value::Array(vec![
            Value::from(1),
            Value::from("ok"),
            Value::Bool(true),
        ]);

        assert_eq!(
            issues_of(&schema, &input),
            [
                (
                    vec![0usize.into()],
                    "Items: expected string, received number".to_owned()
                ),
                (
                    vec![2usize.into()],
                    "Items: expected string, received boolean".to_owned()
                ),
            ]
        );
    }

    #[test]
    fn nested_array_paths() {
        let schema = ArraySchema::new("Outer", item_schema());
        let input = Value::Array(vec![item(Value::from("a")), item(Value::from(2))]);
        assert_eq!(
            issues_of(&schema, &input),
            [(
                vec![1usize.into(), "id".into()],
                "Item: expected string, received number".to_owned()
            )]
        );

        let schema = ArraySchema::new("Outer", ArraySchema::new("Inner", item_schema()));
        let input = Value::Array(vec![Value::Array(vec![item(Value::Null)])]);
        assert_eq!(
            issues_of(&schema, &input)[0].0,
            vec![0usize.into(), 0usize.into(), "id".into()]
        );
    }

    #[test]
    fn array_output_is_validated_copy() {
        let schema = ArraySchema::new("Items", item_schema());
        let input = Value::Array(vec![Value::Map(vec![
            (Value::from("id"), Value::from("a")),
            (Value::from("extra"), Value::from(1)),
        ])]);

        assert_eq!(
            schema.parse(&input).unwrap(),
            Value::Array(vec![item(Value::from("a"))])
        );
    }

    #[test]
    fn map_paths_use_entry_index() {
        let schema = MapSchema::new("Digests", Int, Text);
        let input = Value::Map(vec![
            (Value::from(1), Value::from("a")),
            (Value::from("two"), Value::from("b")),
            (Value::from(3), Value::from(3)),
        ]);

        assert_eq!(
            issues_of(&schema, &input),
            [
                (
                    vec![1usize.into(), "key".into()],
                    "Digests: expected number, received string".to_owned()
                ),
                (
                    vec![2usize.into(), "value".into()],
                    "Digests: expected string, received number".to_owned()
                ),
            ]
        );
    }

    #[test]
    fn map_nonempty_and_wrong_type() {
        let schema = MapSchema::new("Digests", Int, Text).nonempty();

        assert_eq!(
            issues_of(&schema, &Value::Map(vec![])),
            [(
                vec![],
                "Digests: At least one entry must be provided.".to_owned()
            )]
        );
        assert_eq!(
            issues_of(&schema, &Value::from("x")),
            [(vec![], "Digests: expected Map, received string".to_owned())]
        );
    }

    #[test]
    fn record_paths_use_key() {
        let schema = RecordSchema::new("NameSpaces", ArraySchema::new("Items", Text));
        let input = Value::Map(vec![
            (
                Value::from("org.iso.18013.5.1"),
                Value::Array(vec![Value::from("a")]),
            ),
            (
                Value::from("eu.europa.ec.eudi.pid.1"),
                Value::Array(vec![Value::from(1)]),
            ),
            (Value::from(7), Value::Array(vec![])),
        ]);

        assert_eq!(
            issues_of(&schema, &input),
            [
                (
                    vec!["eu.europa.ec.eudi.pid.1".into(), 0usize.into()],
                    "Items: expected string, received number".to_owned()
                ),
                (
                    vec![2usize.into(), "key".into()],
                    "NameSpaces: expected string, received number".to_owned()
                ),
            ]
        );
    }

    #[test]
    fn tuple_checks_length_then_items() {
        let schema = TupleSchema::new("Pair", vec![Box::new(Int), Box::new(Text)]);

        assert_eq!(
            schema
                .parse(&Value::Array(vec![Value::from(1), Value::from("a")]))
                .unwrap(),
            Value::Array(vec![Value::from(1), Value::from("a")])
        );
        assert_eq!(
            issues_of(&schema, &Value::Array(vec![Value::from(1)])),
            [(vec![], "Pair: expected 2 items, received 1".to_owned())]
        );
        assert_eq!(
            issues_of(&schema, &Value::Array(vec![Value::from("a"), Value::from(1)])),
            [
                (
                    vec![0usize.into()],
                    "Pair: expected number, received string".to_owned()
                ),
                (
                    vec![1usize.into()],
                    "Pair: expected string, received number".to_owned()
                ),
            ]
        );
    }
}

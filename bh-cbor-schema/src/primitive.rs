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

//! Schemas of single (non-container) values.

use ciborium::Value;

use crate::{issue::Issues, schema::mismatch, Schema};

/// Accepts a text string.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl Schema for Text {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        match value {
            Value::Text(_) => Some(value.clone()),
            _ => {
                issues.push(mismatch("string", value));
                None
            }
        }
    }
}

/// Accepts a byte string.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bytes;

impl Schema for Bytes {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        match value {
            Value::Bytes(_) => Some(value.clone()),
            _ => {
                issues.push(mismatch("bytes", value));
                None
            }
        }
    }
}

/// Accepts a boolean.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bool;

impl Schema for Bool {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        match value {
            Value::Bool(_) => Some(value.clone()),
            _ => {
                issues.push(mismatch("boolean", value));
                None
            }
        }
    }
}

/// Accepts any integer which fits into [`i64`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Int;

impl Schema for Int {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        match value {
            Value::Integer(integer) if i64::try_from(*integer).is_ok() => Some(value.clone()),
            Value::Integer(_) => {
                issues.push("integer out of range");
                None
            }
            _ => {
                issues.push(mismatch("number", value));
                None
            }
        }
    }
}

/// Accepts a non-negative integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uint;

impl Schema for Uint {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        match value {
            Value::Integer(integer) if u64::try_from(*integer).is_ok() => Some(value.clone()),
            Value::Integer(_) => {
                issues.push("expected a non-negative integer");
                None
            }
            _ => {
                issues.push(mismatch("number", value));
                None
            }
        }
    }
}

/// Accepts any number, integer or floating point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Number;

impl Schema for Number {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        match value {
            Value::Integer(_) | Value::Float(_) => Some(value.clone()),
            _ => {
                issues.push(mismatch("number", value));
                None
            }
        }
    }
}

/// Accepts any value, including `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Any;

impl Schema for Any {
    fn check(&self, value: &Value, _issues: &mut Issues) -> Option<Value> {
        Some(value.clone())
    }
}

/// Accepts exactly the given value.
#[derive(Debug, Clone)]
pub struct Literal(pub Value);

impl Schema for Literal {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        if *value == self.0 {
            return Some(value.clone());
        }

        issues.push(format!(
            "expected literal {:?}, received {:?}",
            self.0, value
        ));
        None
    }
}

/// Accepts a CBOR tag with the given number, whose content is accepted by the inner schema.
#[derive(Debug, Clone)]
pub struct Tagged<S> {
    tag: u64,
    inner: S,
}

impl<S: Schema> Tagged<S> {
    /// Creates a new [`Tagged`] schema.
    pub fn new(tag: u64, inner: S) -> Self {
        Self { tag, inner }
    }
}

impl<S: Schema> Schema for Tagged<S> {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        match value {
            Value::Tag(tag, content) if *tag == self.tag => {
                let content = self.inner.check(content, issues)?;
                Some(Value::Tag(*tag, Box::new(content)))
            }
            Value::Tag(tag, _) => {
                issues.push(format!("expected tag {}, received tag {tag}", self.tag));
                None
            }
            _ => {
                issues.push(mismatch(&format!("tag {}", self.tag), value));
                None
            }
        }
    }
}

/// Makes the inner schema optional.
///
/// A `null` value is accepted and treated as absent.
#[derive(Debug, Clone)]
pub struct Optional<S>(pub S);

impl<S: Schema> Schema for Optional<S> {
    fn check(&self, value: &Value, issues: &mut Issues) -> Option<Value> {
        match value {
            Value::Null => Some(Value::Null),
            _ => self.0.check(value, issues),
        }
    }

    fn is_optional(&self) -> bool {
        true
    }
}

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

use crate::{issue::Issues, strict_map::MapKey};

/// Error returned by the crate API.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum SchemaError {
    /// The validated value does not conform to the schema.
    #[strum(to_string = "Schema validation failed:\n{0}")]
    Invalid(Issues),
    /// The same key was declared twice in the entries of a
    /// [`StrictMapSchema`][crate::StrictMapSchema].
    #[strum(to_string = "Duplicate key `{0}` in schema entries")]
    DuplicateKey(MapKey),
    /// The validated value could not be converted into the requested Rust type.
    #[strum(to_string = "Validated value does not match the target type")]
    Deserialize,
}

impl SchemaError {
    /// Returns the collected validation issues, if this is a [`SchemaError::Invalid`] error.
    pub fn issues(&self) -> Option<&Issues> {
        match self {
            Self::Invalid(issues) => Some(issues),
            _ => None,
        }
    }
}

impl bherror::BhError for SchemaError {}

/// The [`bherror::Result`] type with the error type of [`SchemaError`], used throughout this
/// crate.
pub type Result<T> = bherror::Result<T, SchemaError>;

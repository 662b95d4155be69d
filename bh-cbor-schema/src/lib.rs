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

//! This crate provides a strict validation engine for untyped CBOR values, as produced by
//! [`ciborium`].
//!
//! Structures exchanged in the [ISO/IEC 18013-5:2021][1] `mso_mdoc` format (`IssuerSignedItem`,
//! `MobileSecurityObject`, COSE headers, ...) are CBOR maps with a fixed set of text or integer
//! keys.  This crate validates such maps, and the generic containers around them, before they are
//! turned into typed Rust structures, reporting every problem with the exact path at which it was
//! found.
//!
//! [1]: <https://www.iso.org/standard/69084.html>
//!
//! # Details
//!
//! Every validator implements the [`Schema`] trait.  Validation never stops at the first
//! offending field.  Instead, all problems are collected into [`Issues`] and reported together,
//! except in the following cases where the remaining checks would be meaningless:
//!
//!   * the value is not of the expected container kind,
//!   * a non-empty container is empty,
//!   * a [`StrictMapSchema`] is missing required keys, or has unrecognized keys in the
//!     [`UnknownKeys::Strict`] mode.
//!
//! On success, a freshly constructed [`ciborium::Value`] is returned, which contains only the
//! validated data.
//!
//! # Examples
//!
//! ```
//! use bh_cbor_schema::{entry, Schema, StrictMapSchema, Text, Uint, UnknownKeys};
//! use ciborium::Value;
//!
//! let user = StrictMapSchema::new(
//!     "User",
//!     vec![entry("name", Text), entry("age", Uint)],
//!     UnknownKeys::Strip,
//! )
//! .unwrap();
//!
//! let input = Value::Map(vec![(Value::from("name"), Value::from("Alice"))]);
//! let error = user.parse(&input).unwrap_err();
//! let issues = error.error.issues().unwrap();
//!
//! assert_eq!(issues.len(), 1);
//! assert_eq!(issues[0].message, "User: Missing required keys: age");
//! ```

mod container;
mod error;
mod issue;
mod primitive;
mod schema;
mod strict_map;

pub use container::*;
pub use error::*;
pub use issue::*;
pub use primitive::*;
pub use schema::*;
pub use strict_map::*;

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

use std::{fmt, ops::Deref};

/// A single step of the path from the validated root value to an [`Issue`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A text key of a map, or the `key`/`value` marker of a map entry.
    Key(String),
    /// A position within an array, or an integer key of a map.
    Index(i64),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        // Nothing we validate comes close to `i64::MAX` entries.
        Self::Index(index as i64)
    }
}

impl From<i64> for PathSegment {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A single validation problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// Path from the validated root value to the offending value.
    pub path: Vec<PathSegment>,
    /// Human readable description of the problem.
    pub message: String,
    // Set once the message carries the name of the schema which reported it.
    scoped: bool,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }

        let path = self
            .path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "[{path}]: {}", self.message)
    }
}

/// Accumulator of [`Issue`]s, passed through the whole validation call tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Issues(Vec<Issue>);

impl Issues {
    /// Records an issue about the value currently being validated.
    ///
    /// The message is later prefixed with the target of the closest enclosing container.
    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(Issue {
            path: Vec::new(),
            message: message.into(),
            scoped: false,
        });
    }

    /// Records an issue about the container named `target` itself.
    pub fn push_scoped(&mut self, target: &str, message: impl fmt::Display) {
        self.0.push(Issue {
            path: Vec::new(),
            message: format!("{target}: {message}"),
            scoped: true,
        });
    }

    /// Runs `f` against a fresh accumulator and moves every issue it reports into `self`, with
    /// `segments` prepended to its path.
    ///
    /// Issues which are not yet scoped get prefixed with `target`.
    pub fn nested<T>(
        &mut self,
        target: &str,
        segments: &[PathSegment],
        f: impl FnOnce(&mut Issues) -> T,
    ) -> T {
        let mut inner = Issues::default();
        let output = f(&mut inner);

        self.0.extend(inner.0.into_iter().map(|mut issue| {
            if !issue.scoped {
                issue.message = format!("{target}: {}", issue.message);
                issue.scoped = true;
            }
            issue.path.splice(0..0, segments.iter().cloned());
            issue
        }));

        output
    }

    /// Consumes the accumulator, returning the collected issues.
    pub fn into_vec(self) -> Vec<Issue> {
        self.0
    }
}

impl Deref for Issues {
    type Target = [Issue];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.0.iter().map(ToString::to_string).collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_prefixes_path_and_scopes_once() {
        let mut issues = Issues::default();

        issues.nested("Outer", &["child".into()], |issues| {
            issues.nested("Inner", &["value".into()], |issues| {
                issues.push("expected string, received number");
            });
            issues.push_scoped("Inner", "Missing required keys: age");
        });

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].path, vec!["child".into(), "value".into()]);
        assert_eq!(issues[0].message, "Inner: expected string, received number");
        assert_eq!(issues[1].path, vec![PathSegment::from("child")]);
        assert_eq!(issues[1].message, "Inner: Missing required keys: age");
    }

    #[test]
    fn display_renders_path() {
        let mut issues = Issues::default();
        issues.nested("Tags", &[0usize.into(), "id".into()], |issues| {
            issues.push("expected string, received boolean")
        });

        assert_eq!(
            issues.to_string(),
            "[0, id]: Tags: expected string, received boolean"
        );
    }
}

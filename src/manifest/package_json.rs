//! In-memory package.json document
//!
//! Handles:
//! - dependencies
//! - devDependencies
//!
//! Every other top-level field is carried through untouched, in its
//! original order.

use crate::domain::{Dependency, DependencyKind};
use crate::error::ManifestError;
use regex::Regex;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Indentation used when the original file has none to copy
const DEFAULT_INDENT: &str = "  ";

/// A parsed package.json
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    document: Map<String, Value>,
    indent: String,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            document: Map::new(),
            indent: DEFAULT_INDENT.to_string(),
        }
    }
}

impl Manifest {
    /// Parse manifest content. `path` is only used for error messages.
    pub fn parse(content: &str, path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error(path, e.to_string()))?;

        let Value::Object(document) = value else {
            return Err(ManifestError::invalid_structure(
                path,
                "top-level value is not an object",
            ));
        };

        for kind in DependencyKind::ALL {
            if let Some(section) = document.get(kind.manifest_key()) {
                if !section.is_object() {
                    return Err(ManifestError::invalid_structure(
                        path,
                        format!("\"{}\" is not an object", kind.manifest_key()),
                    ));
                }
            }
        }

        Ok(Self {
            document,
            indent: detect_indent(content),
        })
    }

    /// Indentation unit reused when the manifest is written back
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Returns one dependency section
    pub fn section(&self, kind: DependencyKind) -> Option<&Map<String, Value>> {
        self.document
            .get(kind.manifest_key())
            .and_then(|v| v.as_object())
    }

    /// Returns the range declared for `name` in a specific section
    pub fn range(&self, kind: DependencyKind, name: &str) -> Option<&str> {
        self.section(kind)?.get(name)?.as_str()
    }

    /// Returns the section a package is declared in, `dependencies` first
    pub fn locate(&self, name: &str) -> Option<DependencyKind> {
        DependencyKind::ALL.into_iter().find(|kind| {
            self.section(*kind)
                .map(|section| section.contains_key(name))
                .unwrap_or(false)
        })
    }

    /// Returns the range of `name` in the section it is declared in
    pub fn range_of(&self, name: &str) -> Option<&str> {
        self.range(self.locate(name)?, name)
    }

    /// Declared dependencies: `dependencies` first, then `devDependencies`,
    /// each in manifest order. A name declared in both is reported once,
    /// from `dependencies`.
    pub fn dependencies(&self) -> Vec<Dependency> {
        let mut result: Vec<Dependency> = Vec::new();

        for kind in DependencyKind::ALL {
            let Some(section) = self.section(kind) else {
                continue;
            };
            for (name, value) in section {
                let Some(range) = value.as_str() else {
                    debug!(package = %name, section = %kind, "skipping non-string range");
                    continue;
                };
                if result.iter().any(|d| &d.name == name) {
                    continue;
                }
                result.push(Dependency::new(name.clone(), range, kind));
            }
        }

        result
    }

    /// Write `range` for `name` into the section that already declares it
    /// (`dependencies` preferred over `devDependencies`); undeclared names are
    /// added to `dependencies`. Returns the section written to.
    pub fn set_range(&mut self, name: &str, range: &str) -> DependencyKind {
        let kind = self.locate(name).unwrap_or(DependencyKind::Direct);

        let section = self
            .document
            .entry(kind.manifest_key())
            .or_insert_with(|| Value::Object(Map::new()));
        if !section.is_object() {
            *section = Value::Object(Map::new());
        }
        if let Value::Object(entries) = section {
            entries.insert(name.to_string(), Value::String(range.to_string()));
        }

        kind
    }

    /// Serialize the whole document, pretty-printed with the detected
    /// indentation and a trailing newline
    pub fn to_pretty_string(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut serializer = Serializer::with_formatter(&mut buf, formatter);
        self.document.serialize(&mut serializer)?;
        buf.push(b'\n');
        // serde_json only emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Indentation of the first indented line, or two spaces
fn detect_indent(content: &str) -> String {
    Regex::new(r"(?m)^([ \t]+)\S")
        .ok()
        .and_then(|re| re.captures(content))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}

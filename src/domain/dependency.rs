//! Dependency information structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// The manifest section a dependency is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// `dependencies`
    Direct,
    /// `devDependencies`
    Dev,
}

impl DependencyKind {
    /// Both classes in write-back precedence order
    pub const ALL: [DependencyKind; 2] = [DependencyKind::Direct, DependencyKind::Dev];

    /// The package.json key holding this class
    pub fn manifest_key(&self) -> &'static str {
        match self {
            DependencyKind::Direct => "dependencies",
            DependencyKind::Dev => "devDependencies",
        }
    }

    /// Returns true for `devDependencies`
    pub fn is_dev(&self) -> bool {
        matches!(self, DependencyKind::Dev)
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_key())
    }
}

/// A declared dependency together with its installed range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name
    pub name: String,
    /// Range string exactly as written in the manifest
    pub range: String,
    /// Which section declares it
    pub kind: DependencyKind,
}

impl Dependency {
    /// Creates a new dependency
    pub fn new(name: impl Into<String>, range: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            range: range.into(),
            kind,
        }
    }

    /// Creates a new `dependencies` entry
    pub fn direct(name: impl Into<String>, range: impl Into<String>) -> Self {
        Self::new(name, range, DependencyKind::Direct)
    }

    /// Creates a new `devDependencies` entry
    pub fn dev(name: impl Into<String>, range: impl Into<String>) -> Self {
        Self::new(name, range, DependencyKind::Dev)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dev_marker = if self.kind.is_dev() { " (dev)" } else { "" };
        write!(f, "{}@{}{}", self.name, self.range, dev_marker)
    }
}

//! Package identifiers
//!
//! An identifier has the form `type:namespace:name:version`, e.g.
//! `Maven:org.apache.commons:commons-lang3:3.12.0`. Namespace and version may
//! be empty (`NPM::left-pad:1.3.0`), type and name may not.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProvenanceError, Result, origin};

/// Unique identifier of a package
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    pub package_type: String,
    pub namespace: String,
    pub name: String,
    pub version: String,
}

impl Identifier {
    pub fn new(
        package_type: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            package_type: package_type.into(),
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse an identifier from its `type:namespace:name:version` form.
    ///
    /// Missing trailing components are treated as empty; the version may
    /// itself contain colons.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let mut parts = input.splitn(4, ':');
        let package_type = parts.next().unwrap_or_default();
        let namespace = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();
        let version = parts.next().unwrap_or_default();

        if package_type.is_empty() {
            return Err(origin::invalid_identifier(input, "package type is empty"));
        }
        if name.is_empty() {
            return Err(origin::invalid_identifier(input, "package name is empty"));
        }

        Ok(Self::new(package_type, namespace, name, version))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.package_type, self.namespace, self.name, self.version
        )
    }
}

impl FromStr for Identifier {
    type Err = ProvenanceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = ProvenanceError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.to_string()
    }
}

//! Registry change-sets.
//!
//! A [`ChangeSet`] is an ordered list of `(name, value)` pairs applied to one
//! hive-relative key. Order is preserved so writes happen deterministically,
//! and duplicate names are rejected at construction time.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Root hive a key path is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hive {
    #[serde(rename = "HKLM")]
    LocalMachine,
    #[serde(rename = "HKCU")]
    CurrentUser,
}

impl Hive {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalMachine => "HKLM",
            Self::CurrentUser => "HKCU",
        }
    }
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed registry value. The type tag is closed: 32-bit integer or string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RegValue {
    Dword(u32),
    String(String),
}

impl RegValue {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Dword(_) => "REG_DWORD",
            Self::String(_) => "REG_SZ",
        }
    }
}

impl fmt::Display for RegValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dword(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "\"{value}\""),
        }
    }
}

impl From<u32> for RegValue {
    fn from(value: u32) -> Self {
        Self::Dword(value)
    }
}

impl From<&str> for RegValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Named value writes scoped to one registry key.
///
/// The empty name `""` addresses the key's default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    hive: Hive,
    path: String,
    values: Vec<(String, RegValue)>,
}

impl ChangeSet {
    /// Build a change-set, validating the key path and value-name uniqueness.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidKeyPath`] when the path is empty, absolute or
    /// names a hive; [`CoreError::DuplicateValue`] when a name repeats.
    pub fn new<N, I>(hive: Hive, path: impl Into<String>, values: I) -> Result<Self, CoreError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, RegValue)>,
    {
        let path = path.into();
        validate_key_path(&path)?;

        let mut seen = BTreeSet::new();
        let mut ordered = Vec::new();
        for (name, value) in values {
            let name = name.into();
            // Value names are case-insensitive in the registry.
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(CoreError::DuplicateValue { path, name });
            }
            ordered.push((name, value));
        }

        Ok(Self {
            hive,
            path,
            values: ordered,
        })
    }

    /// One change-set per key path, all sharing the same values mapping.
    ///
    /// # Errors
    ///
    /// Propagates the first validation error from [`ChangeSet::new`].
    pub fn for_paths(
        hive: Hive,
        paths: &[&str],
        values: &[(&str, RegValue)],
    ) -> Result<Vec<Self>, CoreError> {
        paths
            .iter()
            .map(|path| Self::new(hive, *path, values.iter().cloned()))
            .collect()
    }

    #[must_use]
    pub const fn hive(&self) -> Hive {
        self.hive
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn values(&self) -> &[(String, RegValue)] {
        &self.values
    }

    /// `HKLM\SOFTWARE\...` form used in diagnostics.
    #[must_use]
    pub fn display_path(&self) -> String {
        format!("{}\\{}", self.hive, self.path)
    }
}

fn validate_key_path(path: &str) -> Result<(), CoreError> {
    let invalid = |reason: &str| CoreError::InvalidKeyPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.trim().is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.starts_with('\\') || path.ends_with('\\') {
        return Err(invalid("path must not start or end with a backslash"));
    }
    if path.contains("\\\\") {
        return Err(invalid("path contains an empty segment"));
    }
    let first = path.split('\\').next().unwrap_or_default().to_ascii_uppercase();
    if first.starts_with("HKEY_") || matches!(first.as_str(), "HKLM" | "HKCU" | "HKCR" | "HKU") {
        return Err(invalid("path must be hive-relative"));
    }
    Ok(())
}

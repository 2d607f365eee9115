//! Type-safe identifiers for repositories and secrets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::bail;
use crate::errors::{GhSecretError, Result};

/// A repository on the remote platform, identified by owner and name.
///
/// Equality and hashing use the `(owner, name)` pair, so a `HashSet` of
/// references collapses repeated targets.
///
/// # Example
///
/// ```
/// use ghsecret_types::RepositoryRef;
///
/// let repo: RepositoryRef = "aereal/myrepo".parse().unwrap();
/// assert_eq!(repo.owner(), "aereal");
/// assert_eq!(repo.name(), "myrepo");
/// assert_eq!(repo.to_string(), "aereal/myrepo");
///
/// assert!("myrepo".parse::<RepositoryRef>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Create a repository reference from its parts.
    ///
    /// # Errors
    ///
    /// Returns an error if either part is empty or contains a `/`.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        let name = name.into();
        if owner.is_empty() || name.is_empty() || owner.contains('/') || name.contains('/') {
            bail!(
                Validation,
                "malformed qualified repository name: {:?}",
                format!("{}/{}", owner, name)
            );
        }
        Ok(Self { owner, name })
    }

    /// Owner (user or organization) of the repository.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = GhSecretError;

    fn from_str(s: &str) -> Result<Self> {
        let Some((owner, name)) = s.split_once('/') else {
            bail!(Validation, "malformed qualified repository name: {:?}", s);
        };
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            bail!(Validation, "malformed qualified repository name: {:?}", s);
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl TryFrom<String> for RepositoryRef {
    type Error = GhSecretError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RepositoryRef> for String {
    fn from(repo: RepositoryRef) -> Self {
        repo.to_string()
    }
}

/// A validated Actions secret name.
///
/// Secret names must:
/// - Contain only ASCII letters, digits, and underscores
/// - Not start with a digit
/// - Not start with the reserved `GITHUB_` prefix (case-insensitive)
///
/// # Example
///
/// ```
/// use ghsecret_types::SecretName;
///
/// let name = SecretName::new("MY_SECRET").unwrap();
/// assert_eq!(name.as_str(), "MY_SECRET");
///
/// assert!(SecretName::new("").is_err());
/// assert!(SecretName::new("1PASSWORD").is_err());
/// assert!(SecretName::new("github_token").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecretName(String);

impl SecretName {
    /// Create a new validated secret name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name doesn't meet validation requirements.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        if !Self::is_valid(name) {
            return Err(GhSecretError::Validation(format!(
                "Invalid secret name '{}': must contain only letters, digits, and underscores, \
                must not start with a digit, and must not start with GITHUB_",
                name
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// Check if a name is valid without allocating.
    pub fn is_valid(name: &str) -> bool {
        let Some(first) = name.chars().next() else {
            return false;
        };
        if first.is_ascii_digit() {
            return false;
        }
        if name.get(..7).is_some_and(|prefix| prefix.eq_ignore_ascii_case("GITHUB_")) {
            return false;
        }
        name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SecretName {
    type Err = GhSecretError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SecretName {
    type Error = GhSecretError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SecretName> for String {
    fn from(name: SecretName) -> Self {
        name.0
    }
}

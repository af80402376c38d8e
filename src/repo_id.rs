//! `owner/repo` identifiers for hosted repositories.

use std::fmt;
use std::str::FromStr;

use crate::defaults::{DEFAULT_REPO_NAME, DEFAULT_REPO_OWNER};
use crate::error::{Error, Result};

/// A repository on the hosting platform, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// The canonical template repository.
    pub fn canonical() -> Self {
        Self::new(DEFAULT_REPO_OWNER, DEFAULT_REPO_NAME)
    }

    /// The `owner/repo` form, used as cache key and selection value.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidRepository {
            input: input.to_string(),
        };

        let (owner, name) = input.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        if owner.chars().any(char::is_whitespace) || name.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(Self::new(owner, name))
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

use std::fmt;

use crate::error::ValidationError;

pub const DEFAULT_REGISTRY: &str = "quay.io";

/// A digest-pinned image reference hosted under a known registry, e.g.
/// `quay.io/openshift-release-dev/ocp-release@sha256:...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pullspec {
    registry: String,
    repository: String,
    digest: String,
}

impl Pullspec {
    pub fn parse(pullspec: &str, registry: &str) -> Result<Self, ValidationError> {
        let Some((name, digest)) = pullspec.split_once('@') else {
            return Err(ValidationError::MalformedPullspec {
                pullspec: pullspec.to_string(),
            });
        };

        let prefix = format!("{registry}/");
        let Some(repository) = name.strip_prefix(&prefix) else {
            return Err(ValidationError::ForeignPullspec {
                pullspec: pullspec.to_string(),
                registry: registry.to_string(),
            });
        };
        if repository.is_empty() || digest.is_empty() {
            return Err(ValidationError::MalformedPullspec {
                pullspec: pullspec.to_string(),
            });
        }

        Ok(Self {
            registry: registry.to_string(),
            repository: repository.to_string(),
            digest: digest.to_string(),
        })
    }

    /// Repository path with the registry host stripped.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl fmt::Display for Pullspec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.registry, self.repository, self.digest)
    }
}

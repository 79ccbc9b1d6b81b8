use std::time::Duration;

use anyhow::{Context, Result};
use graphpush_core::{
    GraphError, Label, LabelKey, NewLabel, Node, Pullspec, ReleaseMetadata, ValidationError,
    DEFAULT_REGISTRY,
};
use graphpush_security::{verify_blob_digest, BlobDigestCheck};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::layer::extract_release_metadata;
use crate::registry::{LabelRegistry, LabelSet, MutationOutcome};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuayConfig {
    /// Registry host every payload pullspec must live under.
    pub registry: String,
    /// Base URL for the label API and blob downloads.
    pub api_base: String,
    /// Bearer token for label mutations. `None` means dry run.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for QuayConfig {
    fn default() -> Self {
        Self {
            registry: DEFAULT_REGISTRY.to_string(),
            api_base: format!("https://{DEFAULT_REGISTRY}"),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelList {
    #[serde(default)]
    labels: Vec<Label>,
}

#[derive(Debug, Deserialize)]
struct ManifestRecord {
    #[serde(default)]
    layers: Vec<ManifestLayer>,
}

#[derive(Debug, Deserialize)]
struct ManifestLayer {
    blob_digest: String,
}

/// Blocking client for Quay's manifest label API.
#[derive(Debug, Clone)]
pub struct QuayClient {
    http: Client,
    config: QuayConfig,
}

impl QuayClient {
    pub fn new(config: QuayConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    pub fn is_dry_run(&self) -> bool {
        self.token().is_none()
    }

    pub fn pullspec(&self, node: &Node) -> Result<Pullspec, ValidationError> {
        Pullspec::parse(&node.payload, &self.config.registry)
    }

    pub fn manifest_uri(&self, node: &Node) -> Result<String, ValidationError> {
        let pullspec = self.pullspec(node)?;
        Ok(format!(
            "{}/api/v1/repository/{}/manifest/{}",
            self.api_base(),
            pullspec.repository(),
            pullspec.digest()
        ))
    }

    pub fn labels_uri(&self, node: &Node) -> Result<String, ValidationError> {
        Ok(format!("{}/labels", self.manifest_uri(node)?))
    }

    pub fn label_uri(&self, node: &Node, key: LabelKey) -> Result<String, ValidationError> {
        Ok(format!("{}/{}", self.labels_uri(node)?, key.as_str()))
    }

    pub fn blob_uri(&self, pullspec: &Pullspec, digest: &str) -> String {
        format!(
            "{}/v2/{}/blobs/{}",
            self.api_base(),
            pullspec.repository(),
            digest
        )
    }

    fn api_base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }

    fn token(&self) -> Option<&str> {
        self.config
            .token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    fn get(&self, uri: &str) -> Result<Response> {
        tracing::debug!(%uri, "GET");
        self.http
            .get(uri)
            .send()
            .with_context(|| format!("GET {uri} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {uri} returned an error status"))
    }

    fn get_json<T: DeserializeOwned>(&self, uri: &str) -> Result<T> {
        self.get(uri)?
            .json::<T>()
            .with_context(|| format!("failed to parse JSON from {uri}"))
    }
}

impl LabelRegistry for QuayClient {
    fn get_labels(&self, node: &Node) -> Result<LabelSet> {
        let uri = self.labels_uri(node)?;
        let list: LabelList = self.get_json(&uri)?;
        Ok(list
            .labels
            .into_iter()
            .map(|label| (label.key.clone(), label))
            .collect())
    }

    fn get_release_metadata(&self, node: &Node) -> Result<ReleaseMetadata> {
        let pullspec = self.pullspec(node)?;
        tracing::debug!(version = %node.version, %pullspec, "looking up release metadata");
        let manifest: ManifestRecord = self.get_json(&self.manifest_uri(node)?)?;

        for layer in manifest.layers.iter().rev() {
            let uri = self.blob_uri(&pullspec, &layer.blob_digest);
            let bytes = self
                .get(&uri)?
                .bytes()
                .with_context(|| format!("failed reading blob {uri}"))?;

            if let BlobDigestCheck::Mismatch { actual } =
                verify_blob_digest(&bytes, &layer.blob_digest)?
            {
                return Err(ValidationError::BlobDigestMismatch {
                    digest: layer.blob_digest.clone(),
                    actual,
                }
                .into());
            }

            let metadata = extract_release_metadata(&bytes)
                .with_context(|| format!("failed inspecting layer {}", layer.blob_digest))?;
            if let Some(metadata) = metadata {
                tracing::debug!(
                    version = %node.version,
                    layer = %layer.blob_digest,
                    previous = metadata.previous.len(),
                    "found release metadata"
                );
                return Ok(metadata);
            }
        }

        Err(GraphError::MetadataNotFound {
            version: node.version.clone(),
            layers: manifest.layers.len(),
        }
        .into())
    }

    fn post_label(&mut self, node: &Node, label: &NewLabel) -> Result<MutationOutcome> {
        let uri = self.labels_uri(node)?;
        tracing::info!("{} post {} ({}={})", node.version, uri, label.key, label.value);
        let Some(token) = self.token() else {
            tracing::debug!(%uri, "dry run: skipping post");
            return Ok(MutationOutcome::DryRun);
        };

        self.http
            .post(&uri)
            .bearer_auth(token)
            .json(label)
            .send()
            .with_context(|| format!("POST {uri} failed"))?
            .error_for_status()
            .with_context(|| format!("POST {uri} returned an error status"))?;
        Ok(MutationOutcome::Applied)
    }

    fn delete_label(&mut self, node: &Node, key: LabelKey) -> Result<MutationOutcome> {
        let uri = self.label_uri(node, key)?;
        tracing::info!("{} delete {}", node.version, uri);
        let Some(token) = self.token() else {
            tracing::debug!(%uri, "dry run: skipping delete");
            return Ok(MutationOutcome::DryRun);
        };

        self.http
            .delete(&uri)
            .bearer_auth(token)
            .send()
            .with_context(|| format!("DELETE {uri} failed"))?
            .error_for_status()
            .with_context(|| format!("DELETE {uri} returned an error status"))?;
        Ok(MutationOutcome::Applied)
    }
}

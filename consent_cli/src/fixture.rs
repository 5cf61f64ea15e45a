//! A consent service backed by a local JSON document.

use anyhow::Context;
use async_trait::async_trait;
use consent_core::model::{RawCatalogResponse, RequestItem};
use consent_core::service::{ConsentService, ServiceResult};
use consent_core::{Identity, RemoteFailure};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Canned answers for every service call.
///
/// When `failure` is set every call fails with it as the remote payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureConsentService {
    #[serde(default)]
    pub approvals: Value,
    #[serde(default)]
    pub catalog: RawCatalogResponse,
    #[serde(default)]
    pub failure: Option<Value>,
}

impl FixtureConsentService {
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid fixture {}", path.display()))
    }

    fn check(&self) -> ServiceResult<()> {
        match &self.failure {
            Some(payload) => Err(RemoteFailure::WithPayload(payload.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ConsentService for FixtureConsentService {
    async fn request_approval(
        &self,
        identity: &Identity,
        items: &[RequestItem],
    ) -> ServiceResult<Value> {
        debug!(tenant = identity.tenant_url(), items = items.len(), "Fixture approval request");
        self.check()?;
        Ok(self.approvals.clone())
    }

    async fn get_consent_metadata(
        &self,
        identity: &Identity,
        purpose_ids: &[String],
    ) -> ServiceResult<RawCatalogResponse> {
        debug!(tenant = identity.tenant_url(), purposes = ?purpose_ids, "Fixture metadata request");
        self.check()?;
        Ok(self.catalog.clone())
    }
}

/// Read a JSON list of request items
pub async fn load_items(path: &Path) -> anyhow::Result<Vec<RequestItem>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read items {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid items {}", path.display()))
}

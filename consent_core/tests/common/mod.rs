#![allow(dead_code)]

use async_trait::async_trait;
use consent_core::model::{ConsentRecord, RawCatalogResponse, RequestItem};
use consent_core::service::{ConsentService, ServiceResult};
use consent_core::{AuthConfig, Identity, Privacy, RemoteFailure, SubjectContext, TenantConfig};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("consent_core=trace"))
        .with_test_writer()
        .try_init();
}

/// Calls seen by the mock, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    RequestApproval(Vec<RequestItem>),
    GetConsentMetadata(Vec<String>),
    StoreConsents(Vec<ConsentRecord>),
    GetUserConsents,
}

/// In-process consent service with canned answers
#[derive(Debug, Default)]
pub struct MockConsentService {
    pub approvals: Option<Value>,
    pub catalog: RawCatalogResponse,
    pub consents: Vec<ConsentRecord>,
    pub failure: Option<RemoteFailure>,
    pub calls: Mutex<Vec<Call>>,
    pub identities: Mutex<Vec<Identity>>,
}

impl MockConsentService {
    pub fn with_approvals(approvals: Value) -> Self {
        Self {
            approvals: Some(approvals),
            ..Self::default()
        }
    }

    pub fn with_catalog(catalog: RawCatalogResponse) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn failing(failure: RemoteFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, identity: &Identity, call: Call) -> ServiceResult<()> {
        self.identities.lock().unwrap().push(identity.clone());
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ConsentService for MockConsentService {
    async fn request_approval(
        &self,
        identity: &Identity,
        items: &[RequestItem],
    ) -> ServiceResult<Value> {
        self.record(identity, Call::RequestApproval(items.to_vec()))?;
        Ok(self.approvals.clone().unwrap_or(Value::Array(vec![])))
    }

    async fn get_consent_metadata(
        &self,
        identity: &Identity,
        purpose_ids: &[String],
    ) -> ServiceResult<RawCatalogResponse> {
        self.record(identity, Call::GetConsentMetadata(purpose_ids.to_vec()))?;
        Ok(self.catalog.clone())
    }

    async fn store_consents(
        &self,
        identity: &Identity,
        consents: &[ConsentRecord],
    ) -> ServiceResult<()> {
        self.record(identity, Call::StoreConsents(consents.to_vec()))
    }

    async fn get_user_consents(&self, identity: &Identity) -> ServiceResult<Vec<ConsentRecord>> {
        self.record(identity, Call::GetUserConsents)?;
        Ok(self.consents.clone())
    }
}

pub fn privacy(service: MockConsentService) -> (Privacy<Arc<MockConsentService>>, Arc<MockConsentService>) {
    init_test_logging();
    let service = Arc::new(service);
    let privacy = Privacy::new(
        TenantConfig::new("https://tenant.example.com"),
        AuthConfig::new("test-token"),
        SubjectContext::for_subject("user-1").with_ip_address("10.0.0.1"),
        Arc::clone(&service),
    )
    .expect("valid configuration");
    (privacy, service)
}

//! Client entry point tying identity, service and evaluation together.

use crate::aggregator::{aggregate_raw, decode_approvals, ApprovalPayload};
use crate::config::{AuthConfig, Identity, SubjectContext, TenantConfig};
use crate::error::{RemoteFailure, Result};
use crate::model::{
    ConsentRecord, RequestItem, WrappedAssessment, WrappedConsents, WrappedMetadata, WrappedStore,
};
use crate::normalizer::requested_slots;
use crate::service::ConsentService;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Evaluates data-usage requests against a consent service.
///
/// The identity is fixed at construction. Calls hold no mutable state, so a
/// `Privacy` can be cloned and used from many tasks at once.
#[derive(Debug)]
pub struct Privacy<S> {
    identity: Arc<Identity>,
    service: Arc<S>,
}

impl<S: ConsentService> Privacy<S> {
    /// Validate the identity and build a client. No request is made.
    pub fn new(
        config: TenantConfig,
        auth: AuthConfig,
        context: SubjectContext,
        service: S,
    ) -> Result<Self> {
        let identity = Identity::new(config, auth, context)?;
        Ok(Self::with_identity(identity, service))
    }

    pub fn with_identity(identity: Identity, service: S) -> Self {
        Self {
            identity: Arc::new(identity),
            service: Arc::new(service),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Ask whether the items may be used and reduce the answers to one status
    pub async fn assess(&self, items: &[RequestItem]) -> WrappedAssessment {
        let span = info_span!("assess", request_id = %Uuid::new_v4(), items = items.len());

        async move {
            let payload = match self.service.request_approval(&self.identity, items).await {
                Ok(payload) => payload,
                Err(failure) => return WrappedAssessment::error(failure_detail(failure)),
            };

            let assessment = match decode_approvals(payload) {
                ApprovalPayload::Valid(assessment) => assessment,
                ApprovalPayload::Malformed(received) => {
                    warn!(received = %received, "Approval response is not a list");
                    return WrappedAssessment::invalid_datatype(&received);
                }
            };

            let status = aggregate_raw(&assessment);
            info!(status = ?status, "Assessment complete");
            WrappedAssessment::new(status, assessment)
        }
        .instrument(span)
        .await
    }

    /// Fetch the metadata needed to render consent for the requested items
    pub async fn get_consent_metadata(&self, items: &[RequestItem]) -> WrappedMetadata {
        let span = info_span!(
            "get_consent_metadata",
            request_id = %Uuid::new_v4(),
            items = items.len()
        );

        async move {
            let slots = requested_slots(items);
            debug!(purposes = ?slots.purposes, "Requesting consent metadata");

            let catalog = match self
                .service
                .get_consent_metadata(&self.identity, &slots.purposes)
                .await
            {
                Ok(catalog) => catalog,
                Err(failure) => return WrappedMetadata::error(failure_detail(failure)),
            };

            match self
                .service
                .process_consent_metadata(&slots.keys, catalog)
                .await
            {
                Ok(metadata) => {
                    info!(entries = metadata.len(), "Consent metadata ready");
                    WrappedMetadata::done(metadata)
                }
                Err(failure) => WrappedMetadata::error(failure_detail(failure)),
            }
        }
        .instrument(span)
        .await
    }

    /// Record consent decisions for the configured subject
    pub async fn store_consents(&self, consents: &[ConsentRecord]) -> WrappedStore {
        let span = info_span!(
            "store_consents",
            request_id = %Uuid::new_v4(),
            consents = consents.len()
        );

        async move {
            match self.service.store_consents(&self.identity, consents).await {
                Ok(()) => {
                    info!("Consents stored");
                    WrappedStore::done()
                }
                Err(failure) => WrappedStore::error(failure_detail(failure)),
            }
        }
        .instrument(span)
        .await
    }

    /// List the consents the configured subject has given
    pub async fn get_user_consents(&self) -> WrappedConsents {
        let span = info_span!("get_user_consents", request_id = %Uuid::new_v4());

        async move {
            match self.service.get_user_consents(&self.identity).await {
                Ok(consents) => {
                    debug!(count = consents.len(), "Fetched user consents");
                    WrappedConsents::done(consents)
                }
                Err(failure) => WrappedConsents::error(failure_detail(failure)),
            }
        }
        .instrument(span)
        .await
    }
}

impl<S> Clone for Privacy<S> {
    fn clone(&self) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            service: Arc::clone(&self.service),
        }
    }
}

/// Log a service failure and keep the remote payload, if any
fn failure_detail(failure: RemoteFailure) -> Option<Value> {
    match failure {
        RemoteFailure::WithPayload(payload) => {
            warn!(detail = %payload, "Consent service returned an error");
            Some(payload)
        }
        RemoteFailure::Opaque(reason) => {
            error!(reason = %reason, "Consent service call failed");
            None
        }
    }
}

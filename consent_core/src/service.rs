//! The remote consent service seam.
//!
//! Transport and authentication live behind [`ConsentService`]. The client
//! only interprets what the service returns.

use crate::config::Identity;
use crate::error::RemoteFailure;
use crate::model::{ConsentRecord, MetadataBuckets, RawCatalogResponse, RequestItem, SlotKey};
use crate::normalizer;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

pub type ServiceResult<T> = std::result::Result<T, RemoteFailure>;

#[async_trait]
pub trait ConsentService: Send + Sync {
    /// Ask the service whether each item may be used.
    ///
    /// The payload is returned untouched; it is expected to be a list with
    /// one assessment per item, but the caller checks that.
    async fn request_approval(
        &self,
        identity: &Identity,
        items: &[RequestItem],
    ) -> ServiceResult<Value>;

    /// Fetch catalog metadata and consent state for the given purposes in a
    /// single request.
    async fn get_consent_metadata(
        &self,
        identity: &Identity,
        purpose_ids: &[String],
    ) -> ServiceResult<RawCatalogResponse>;

    /// Reduce a catalog to the requested slots
    async fn process_consent_metadata(
        &self,
        requested: &BTreeSet<SlotKey>,
        catalog: RawCatalogResponse,
    ) -> ServiceResult<MetadataBuckets> {
        Ok(normalizer::process_catalog(requested, catalog))
    }

    async fn store_consents(
        &self,
        _identity: &Identity,
        _consents: &[ConsentRecord],
    ) -> ServiceResult<()> {
        Err(RemoteFailure::Opaque(
            "storing consents is not supported by this service".into(),
        ))
    }

    async fn get_user_consents(&self, _identity: &Identity) -> ServiceResult<Vec<ConsentRecord>> {
        Err(RemoteFailure::Opaque(
            "listing consents is not supported by this service".into(),
        ))
    }
}

#[async_trait]
impl<S: ConsentService + ?Sized> ConsentService for Arc<S> {
    async fn request_approval(
        &self,
        identity: &Identity,
        items: &[RequestItem],
    ) -> ServiceResult<Value> {
        (**self).request_approval(identity, items).await
    }

    async fn get_consent_metadata(
        &self,
        identity: &Identity,
        purpose_ids: &[String],
    ) -> ServiceResult<RawCatalogResponse> {
        (**self).get_consent_metadata(identity, purpose_ids).await
    }

    async fn process_consent_metadata(
        &self,
        requested: &BTreeSet<SlotKey>,
        catalog: RawCatalogResponse,
    ) -> ServiceResult<MetadataBuckets> {
        (**self).process_consent_metadata(requested, catalog).await
    }

    async fn store_consents(
        &self,
        identity: &Identity,
        consents: &[ConsentRecord],
    ) -> ServiceResult<()> {
        (**self).store_consents(identity, consents).await
    }

    async fn get_user_consents(&self, identity: &Identity) -> ServiceResult<Vec<ConsentRecord>> {
        (**self).get_user_consents(identity).await
    }
}

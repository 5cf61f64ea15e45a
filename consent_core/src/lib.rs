pub mod aggregator;
pub mod config;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod privacy;
pub mod service;

pub use config::{AuthConfig, ClientSettings, Identity, SubjectContext, TenantConfig};
pub use error::{ConsentError, RemoteFailure, Result};
pub use model::{
    AssessmentStatus, CallStatus, RequestItem, SlotKey, WrappedAssessment, WrappedMetadata,
};
pub use privacy::Privacy;
pub use service::ConsentService;

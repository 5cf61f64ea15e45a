//! Tenant identity and client configuration.
//!
//! An [`Identity`] is built once from the tenant configuration, the auth
//! credential and an optional subject context. It is validated up front and
//! never changes afterwards.

use crate::error::{ConsentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

pub const TENANT_URL_ENV: &str = "CONSENT_TENANT_URL";
pub const ACCESS_TOKEN_ENV: &str = "CONSENT_ACCESS_TOKEN";

/// Tenant endpoint configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    #[serde(default, alias = "tenantUrl")]
    pub tenant_url: Option<String>,
}

impl TenantConfig {
    pub fn new(tenant_url: impl Into<String>) -> Self {
        Self {
            tenant_url: Some(tenant_url.into()),
        }
    }
}

/// Bearer credential used for every call to the consent service
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, alias = "accessToken")]
    pub access_token: Option<String>,
}

impl AuthConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Optional information about the data subject the calls are made for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectContext {
    #[serde(alias = "subjectId", skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(alias = "isExternalSubject")]
    pub is_external_subject: bool,
    #[serde(alias = "ipAddress", skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl SubjectContext {
    pub fn for_subject(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: Some(subject_id.into()),
            ..Self::default()
        }
    }

    pub fn external(mut self) -> Self {
        self.is_external_subject = true;
        self
    }

    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }
}

/// Validated, immutable identity shared by every call of a client
#[derive(Clone, PartialEq)]
pub struct Identity {
    tenant_url: String,
    access_token: String,
    context: SubjectContext,
}

impl Identity {
    /// Validate the configuration and build the identity.
    ///
    /// Fails with [`ConsentError::Configuration`] when the tenant URL or the
    /// access token is missing or blank.
    pub fn new(config: TenantConfig, auth: AuthConfig, context: SubjectContext) -> Result<Self> {
        let tenant_url = required(config.tenant_url, "tenantUrl", "config")?;
        let access_token = required(auth.access_token, "accessToken", "auth")?;

        debug!(tenant_url = %tenant_url, subject = ?context.subject_id, "Identity configured");

        Ok(Self {
            tenant_url,
            access_token,
            context,
        })
    }

    pub fn tenant_url(&self) -> &str {
        &self.tenant_url
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn context(&self) -> &SubjectContext {
        &self.context
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("tenant_url", &self.tenant_url)
            .field("access_token", &"<redacted>")
            .field("context", &self.context)
            .finish()
    }
}

fn required(value: Option<String>, field: &str, owner: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConsentError::Configuration(format!(
            "{} parameter is required in the {} object",
            field, owner
        ))),
    }
}

/// Client settings as read from a TOML file
///
/// ```toml
/// [tenant]
/// tenant_url = "https://tenant.example.com"
///
/// [auth]
/// access_token = "..."
///
/// [context]
/// subject_id = "user-1"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub tenant: TenantConfig,
    pub auth: AuthConfig,
    pub context: SubjectContext,
}

impl ClientSettings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading client settings from {:?}", path);

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ConsentError::ConfigLoad(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Override tenant URL and access token from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override tenant URL and access token using the given lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(TENANT_URL_ENV) {
            debug!("Tenant URL overridden from {}", TENANT_URL_ENV);
            self.tenant.tenant_url = Some(url);
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV) {
            debug!("Access token overridden from {}", ACCESS_TOKEN_ENV);
            self.auth.access_token = Some(token);
        }
    }

    pub fn into_identity(self) -> Result<Identity> {
        Identity::new(self.tenant, self.auth, self.context)
    }
}

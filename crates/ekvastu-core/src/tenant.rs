//! Tenant types and the resolved tenant context

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload returned by the tenant ping endpoint.
///
/// Only the identifiers and media settings consumed by the request layer are
/// typed; the display configuration (labels, web items, forms, socials...) is
/// kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantPing {
    pub name: String,
    pub tenant_id: String,
    pub org_id: String,
    #[serde(default)]
    pub org_gu_id: Option<String>,
    #[serde(default)]
    pub master_org_id: Option<String>,
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub environment_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tenant object embedded in sign-in, sign-up and Google login responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInTenant {
    pub name: String,
    pub org_id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub master_org_id: Option<String>,
    #[serde(default)]
    pub cloudinary_cloud_name: Option<String>,
    #[serde(default)]
    pub cloudinary_preset: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tenant identifiers and media settings every tenant-scoped call depends on.
///
/// Created empty at process start. It is only ever replaced as a whole, either
/// from a tenant ping or from a tenant embedded in an auth response, and
/// reset to empty on logout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantContext {
    pub name: String,
    pub org_id: String,
    pub tenant_id: String,
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: String,
    pub loaded: bool,
    /// Remaining tenant fields from the payload that produced this context
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl TenantContext {
    /// Create the empty, not-loaded context
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check whether a successful resolution produced this context
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Build a context from a tenant ping payload
    ///
    /// The ping carries no upload preset; the media client falls back to its
    /// configured preset when the context value is empty.
    pub fn from_ping(ping: &TenantPing) -> Self {
        Self {
            name: ping.name.clone(),
            org_id: ping.org_id.clone(),
            tenant_id: ping.tenant_id.clone(),
            cloud_name: ping.cloud_name.clone(),
            upload_preset: String::new(),
            folder: ping.name.clone(),
            loaded: true,
            attributes: ping.extra.clone(),
        }
    }

    /// Build a context from a tenant embedded in an auth response
    pub fn from_sign_in_tenant(tenant: &SignInTenant) -> Self {
        Self {
            name: tenant.name.clone(),
            org_id: tenant.org_id.clone(),
            tenant_id: tenant.tenant_id.clone().unwrap_or_default(),
            cloud_name: tenant.cloudinary_cloud_name.clone().unwrap_or_default(),
            upload_preset: tenant.cloudinary_preset.clone().unwrap_or_default(),
            folder: tenant.name.clone(),
            loaded: true,
            attributes: tenant.extra.clone(),
        }
    }
}

impl From<&TenantPing> for TenantContext {
    fn from(ping: &TenantPing) -> Self {
        Self::from_ping(ping)
    }
}

impl From<&SignInTenant> for TenantContext {
    fn from(tenant: &SignInTenant) -> Self {
        Self::from_sign_in_tenant(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ping_json() -> Value {
        json!({
            "c": 1,
            "name": "marksampletest",
            "tenantId": "tid-42",
            "orgId": "org-7",
            "orgGuId": "guid-7",
            "masterOrgId": "master-1",
            "cloudName": "demo-cloud",
            "country": "IN",
            "timezone": "Asia/Kolkata",
            "environmentName": "prod",
            "buyButtonLabel": "Buy",
            "isShowCourses": true,
            "socials": [{"name": "x", "value": "@ekvastu"}]
        })
    }

    #[test]
    fn test_ping_keeps_display_fields() {
        let ping: TenantPing = serde_json::from_value(ping_json()).unwrap();
        assert_eq!(ping.tenant_id, "tid-42");
        assert_eq!(ping.cloud_name, "demo-cloud");
        assert_eq!(ping.extra.get("buyButtonLabel"), Some(&json!("Buy")));
        assert_eq!(ping.extra.get("isShowCourses"), Some(&json!(true)));
        assert!(!ping.extra.contains_key("tenantId"));
    }

    #[test]
    fn test_ping_requires_identifiers() {
        let result: Result<TenantPing, _> = serde_json::from_value(json!({"name": "only-name"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_context_from_ping() {
        let ping: TenantPing = serde_json::from_value(ping_json()).unwrap();
        let ctx = TenantContext::from(&ping);

        assert!(ctx.is_loaded());
        assert_eq!(ctx.org_id, "org-7");
        assert_eq!(ctx.tenant_id, "tid-42");
        assert_eq!(ctx.cloud_name, "demo-cloud");
        assert_eq!(ctx.folder, "marksampletest");
        assert!(ctx.upload_preset.is_empty());
        assert_eq!(ctx.attributes.get("c"), Some(&json!(1)));
    }

    #[test]
    fn test_context_from_embedded_tenant() {
        let tenant: SignInTenant = serde_json::from_value(json!({
            "name": "embedded",
            "orgId": "org-9",
            "cloudinaryCloudName": "embedded-cloud",
            "cloudinaryPreset": "preset-x",
            "dateFormat": "dd/MM/yyyy"
        }))
        .unwrap();

        let ctx = TenantContext::from(&tenant);
        assert!(ctx.loaded);
        assert_eq!(ctx.org_id, "org-9");
        assert_eq!(ctx.tenant_id, "");
        assert_eq!(ctx.cloud_name, "embedded-cloud");
        assert_eq!(ctx.upload_preset, "preset-x");
        assert_eq!(ctx.folder, "embedded");
        assert_eq!(ctx.attributes.get("dateFormat"), Some(&json!("dd/MM/yyyy")));
    }

    #[test]
    fn test_empty_context_not_loaded() {
        let ctx = TenantContext::empty();
        assert!(!ctx.is_loaded());
        assert!(ctx.tenant_id.is_empty());
        assert_eq!(ctx, TenantContext::default());
    }
}

//! Tenant context storage and resolution

use crate::dispatcher::Dispatcher;
use crate::endpoint::{ApiEndpoint, RequestDescriptor};
use crate::Result;
use ekvastu_core::{TenantContext, TenantPing};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, instrument, warn};

/// Shared holder of the current tenant context
///
/// The context is only ever replaced as a whole.
#[derive(Default)]
pub struct TenantStore {
    context: RwLock<TenantContext>,
}

impl TenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TenantContext {
        self.context
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.context
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .loaded
    }

    pub fn replace(&self, context: TenantContext) {
        let mut current = self.context.write().unwrap_or_else(|p| p.into_inner());
        *current = context;
    }

    /// Reset to the empty, not-loaded context
    pub fn clear(&self) {
        self.replace(TenantContext::empty());
    }
}

/// Resolves the configured tenant through the tenant ping
pub struct TenantResolver {
    dispatcher: Arc<Dispatcher>,
    store: Arc<TenantStore>,
    tenant_name: String,
}

impl TenantResolver {
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<TenantStore>, tenant_name: impl Into<String>) -> Self {
        Self {
            dispatcher,
            store,
            tenant_name: tenant_name.into(),
        }
    }

    pub fn tenant_name(&self) -> &str {
        &self.tenant_name
    }

    pub fn store(&self) -> &Arc<TenantStore> {
        &self.store
    }

    /// Ping the tenant and build its context without storing it
    #[instrument(skip(self), fields(tenant = %self.tenant_name))]
    pub async fn fetch_tenant(&self) -> Result<TenantContext> {
        let descriptor = RequestDescriptor::get(ApiEndpoint::TenantPing {
            name: self.tenant_name.clone(),
        });

        match self.dispatcher.send::<TenantPing>(&descriptor).await {
            Ok(ping) => {
                let context = TenantContext::from(&ping);
                info!(
                    "Resolved tenant {} (org {}, tenant {})",
                    context.name, context.org_id, context.tenant_id
                );
                Ok(context)
            }
            Err(e) => {
                warn!("Tenant ping failed: {}", e);
                Err(e)
            }
        }
    }

    /// Ping the tenant and overwrite the context on success.
    ///
    /// On failure the previous context is left untouched.
    pub async fn resolve_tenant(&self) -> Result<TenantContext> {
        let context = self.fetch_tenant().await?;
        self.store.replace(context.clone());
        Ok(context)
    }

    /// Return the loaded context, resolving it first if needed
    pub async fn ensure_loaded(&self) -> Result<TenantContext> {
        let context = self.store.snapshot();
        if context.is_loaded() {
            debug!("Reusing loaded tenant context for {}", context.name);
            return Ok(context);
        }
        self.resolve_tenant().await
    }
}

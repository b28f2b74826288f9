//! Tenant-scoped, authenticated domain services

mod evaluation;
mod photos;
mod profile;
mod properties;
mod remedies;
mod rooms;

pub use evaluation::EvaluationService;
pub use photos::PhotoService;
pub use profile::ProfileService;
pub use properties::PropertyService;
pub use remedies::RemedyService;
pub use rooms::RoomService;

use crate::dispatcher::{Dispatcher, RawResponse};
use crate::endpoint::RequestDescriptor;
use crate::tenant::TenantResolver;
use crate::token_store::TokenStore;
use crate::{ApiError, Result};
use ekvastu_core::TenantContext;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Collaborators every domain service dispatches through
#[derive(Clone)]
pub struct ServiceContext {
    dispatcher: Arc<Dispatcher>,
    resolver: Arc<TenantResolver>,
    tokens: Arc<TokenStore>,
}

impl ServiceContext {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        resolver: Arc<TenantResolver>,
        tokens: Arc<TokenStore>,
    ) -> Self {
        Self {
            dispatcher,
            resolver,
            tokens,
        }
    }

    /// Require a token, then make sure the tenant context is loaded
    pub async fn authorize(&self) -> Result<TenantContext> {
        if !self.tokens.has_valid_token() {
            debug!("No access token; refusing domain request");
            return Err(ApiError::Unauthorized);
        }
        self.resolver.ensure_loaded().await
    }

    pub async fn send<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T> {
        self.authorize().await?;
        self.dispatcher.send(&descriptor).await
    }

    pub async fn send_raw(&self, descriptor: RequestDescriptor) -> Result<RawResponse> {
        self.authorize().await?;
        self.dispatcher.send_raw(&descriptor).await
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }
}

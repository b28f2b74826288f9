//! EkVastu API Client
//!
//! This crate talks to the EkVastu backends:
//! - Tenant resolution and authentication on the auth host
//! - Property, room, photo, profile, evaluation and remedy calls on the domain host
//! - Image upload and management on Cloudinary

pub mod auth;
pub mod client;
pub mod cloudinary;
pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod error_message;
pub mod services;
pub mod tenant;
pub mod token_store;

pub use auth::{AuthService, AuthStatus};
pub use cloudinary::CloudinaryClient;
pub use config::ClientConfig;
pub use dispatcher::Dispatcher;
pub use endpoint::{ApiEndpoint, ApiHost, RequestDescriptor};
pub use error::{ApiError, CloudinaryError, Result};
pub use error_message::extract_user_message;
pub use tenant::{TenantResolver, TenantStore};
pub use token_store::TokenStore;

use services::{
    EvaluationService, PhotoService, ProfileService, PropertyService, RemedyService, RoomService,
    ServiceContext,
};
use std::sync::Arc;

/// One client per process: shared token store, tenant context and services
pub struct VastuClient {
    pub tokens: Arc<TokenStore>,
    pub tenant: Arc<TenantStore>,
    pub resolver: Arc<TenantResolver>,
    pub dispatcher: Arc<Dispatcher>,
    pub auth: AuthService,
    pub properties: PropertyService,
    pub rooms: RoomService,
    pub photos: PhotoService,
    pub profile: ProfileService,
    pub evaluation: EvaluationService,
    pub remedies: RemedyService,
    pub cloudinary: CloudinaryClient,
}

impl VastuClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let tokens = match &config.token_file {
            Some(path) => TokenStore::persistent(config.auth_scheme.clone(), path)?,
            None => TokenStore::in_memory(config.auth_scheme.clone()),
        };
        Self::with_token_store(config, Arc::new(tokens))
    }

    pub fn with_token_store(config: &ClientConfig, tokens: Arc<TokenStore>) -> Result<Self> {
        let http = client::create_client(&config.http)?;
        let dispatcher = Arc::new(Dispatcher::with_client(
            http.clone(),
            config,
            tokens.clone(),
        )?);
        let tenant = Arc::new(TenantStore::new());
        let resolver = Arc::new(TenantResolver::new(
            dispatcher.clone(),
            tenant.clone(),
            config.tenant_name.clone(),
        ));
        let ctx = ServiceContext::new(dispatcher.clone(), resolver.clone(), tokens.clone());

        Ok(Self {
            auth: AuthService::new(dispatcher.clone(), resolver.clone(), tokens.clone()),
            properties: PropertyService::new(ctx.clone()),
            rooms: RoomService::new(ctx.clone()),
            photos: PhotoService::new(ctx.clone()),
            profile: ProfileService::new(ctx.clone()),
            evaluation: EvaluationService::new(ctx.clone()),
            remedies: RemedyService::new(ctx),
            cloudinary: CloudinaryClient::new(http, config.cloudinary.clone(), resolver.clone()),
            tokens,
            tenant,
            resolver,
            dispatcher,
        })
    }
}

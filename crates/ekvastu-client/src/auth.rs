//! Authentication pipelines
//!
//! Every entry point runs the same two steps under one async mutex:
//! resolve the tenant, then dispatch the auth call with the resolved
//! identifiers. Only a successful response commits anything: the token pair,
//! the resolved tenant context, and then the embedded tenant when present.
//! A failure at either step leaves the tokens and the context untouched.

use crate::dispatcher::{Dispatcher, RawResponse};
use crate::endpoint::{ApiEndpoint, RequestDescriptor};
use crate::error_message::extract_user_message;
use crate::tenant::{TenantResolver, TenantStore};
use crate::token_store::{TokenStore, token_prefix};
use crate::{ApiError, Result};
use ekvastu_core::auth::{
    EmailLoginRequest, EmailLoginResponse, GoogleLoginRequest, GoogleLoginResponse,
    GoogleSignUpForm, GoogleSignUpRequest, GoogleSignUpResponse, SignInRequest, SignInResponse,
    SignUpForm, SignUpRequest, SignUpResponse,
};
use ekvastu_core::{AuthPayload, TenantContext};
use serde::de::Error as _;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{info, instrument, warn};

/// Observable state of the auth pipelines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthStatus {
    pub loading: bool,
    pub error_message: Option<String>,
}

pub struct AuthService {
    dispatcher: Arc<Dispatcher>,
    resolver: Arc<TenantResolver>,
    tenant: Arc<TenantStore>,
    tokens: Arc<TokenStore>,
    pipeline: Mutex<()>,
    status: watch::Sender<AuthStatus>,
}

impl AuthService {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        resolver: Arc<TenantResolver>,
        tokens: Arc<TokenStore>,
    ) -> Self {
        let (status, _) = watch::channel(AuthStatus::default());
        Self {
            tenant: resolver.store().clone(),
            dispatcher,
            resolver,
            tokens,
            pipeline: Mutex::new(()),
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> AuthStatus {
        self.status.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.has_valid_token()
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse> {
        self.run_pipeline(
            "sign in",
            |tenant| {
                RequestDescriptor::post(ApiEndpoint::SignIn).with_json(&SignInRequest {
                    tid: tenant.tenant_id.clone(),
                    email: email.to_string(),
                    password: password.to_string(),
                    auth_type: "email".to_string(),
                })
            },
            RawResponse::decode::<SignInResponse>,
            extract_user_message,
        )
        .await
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn sign_up(&self, form: SignUpForm) -> Result<SignUpResponse> {
        self.run_pipeline(
            "sign up",
            |tenant| {
                RequestDescriptor::post(ApiEndpoint::SignUp).with_json(&SignUpRequest {
                    form,
                    tenant_id: tenant.tenant_id.clone(),
                    org_id: tenant.org_id.clone(),
                })
            },
            RawResponse::decode::<SignUpResponse>,
            extract_user_message,
        )
        .await
    }

    #[instrument(skip(self, id_token))]
    pub async fn google_login(&self, id_token: &str) -> Result<GoogleLoginResponse> {
        self.run_pipeline(
            "google login",
            |tenant| {
                RequestDescriptor::post(ApiEndpoint::GoogleLogin).with_json(&GoogleLoginRequest {
                    tid: tenant.tenant_id.clone(),
                    org_id: tenant.org_id.clone(),
                    id_token: id_token.to_string(),
                })
            },
            RawResponse::decode::<GoogleLoginResponse>,
            extract_user_message,
        )
        .await
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn google_sign_up(&self, form: GoogleSignUpForm) -> Result<GoogleSignUpResponse> {
        self.run_pipeline(
            "google sign up",
            |tenant| {
                RequestDescriptor::post(ApiEndpoint::SignUp).with_json(&GoogleSignUpRequest {
                    form,
                    tenant_id: tenant.tenant_id.clone(),
                    org_id: tenant.org_id.clone(),
                })
            },
            RawResponse::decode::<GoogleSignUpResponse>,
            extract_user_message,
        )
        .await
    }

    /// Email login; the backend reports failures as `data.msg` in the body
    #[instrument(skip(self, password))]
    pub async fn email_login(&self, email: &str, password: &str) -> Result<SignInResponse> {
        self.run_pipeline(
            "email login",
            |tenant| {
                RequestDescriptor::post(ApiEndpoint::EmailLogin).with_json(&EmailLoginRequest {
                    tid: tenant.tenant_id.clone(),
                    email: email.to_string(),
                    password: password.to_string(),
                })
            },
            decode_email_login,
            |error| match error {
                ApiError::ServerError { message, .. } if !message.is_empty() => message.clone(),
                other => extract_user_message(other),
            },
        )
        .await
    }

    /// Clear the token pair and the tenant context
    pub async fn logout(&self) {
        let _guard = self.pipeline.lock().await;
        self.tokens.clear();
        self.tenant.clear();
        self.status.send_replace(AuthStatus::default());
        info!("Logged out");
    }

    async fn run_pipeline<T, B>(
        &self,
        flow: &'static str,
        build: B,
        decode: fn(&RawResponse) -> Result<T>,
        describe: fn(&ApiError) -> String,
    ) -> Result<T>
    where
        T: AuthPayload,
        B: FnOnce(&TenantContext) -> Result<RequestDescriptor>,
    {
        let _guard = self.pipeline.lock().await;
        self.status.send_replace(AuthStatus {
            loading: true,
            error_message: None,
        });

        let result = self.run_steps(flow, build, decode).await;

        let error_message = result.as_ref().err().map(describe);
        if let Some(message) = &error_message {
            warn!("{} failed: {}", flow, message);
        }
        self.status.send_replace(AuthStatus {
            loading: false,
            error_message,
        });
        result
    }

    async fn run_steps<T, B>(
        &self,
        flow: &'static str,
        build: B,
        decode: fn(&RawResponse) -> Result<T>,
    ) -> Result<T>
    where
        T: AuthPayload,
        B: FnOnce(&TenantContext) -> Result<RequestDescriptor>,
    {
        let tenant = match self.resolver.fetch_tenant().await {
            Ok(tenant) => tenant,
            Err(e) => {
                warn!("Aborting {}: tenant resolution failed: {}", flow, e);
                return Err(ApiError::TenantUnavailable);
            }
        };

        let descriptor = build(&tenant)?;
        let response = decode(&self.dispatcher.send_raw(&descriptor).await?)?;
        self.apply(flow, tenant, &response);
        Ok(response)
    }

    fn apply<T: AuthPayload>(&self, flow: &str, resolved: TenantContext, response: &T) {
        if let Some((access, refresh)) = response.token_pair() {
            self.tokens.store_tokens(access, refresh);
            info!("{} succeeded (token prefix: {})", flow, token_prefix(access));
        } else {
            info!("{} succeeded without tokens", flow);
        }

        self.tenant.replace(resolved);
        if let Some(tenant) = response.embedded_tenant() {
            self.tenant.replace(TenantContext::from(tenant));
            info!("Tenant context replaced from {} response", flow);
        }
    }
}

/// Decode the email login envelope, which is read regardless of status
fn decode_email_login(raw: &RawResponse) -> Result<SignInResponse> {
    let envelope: EmailLoginResponse = match serde_json::from_slice(&raw.body) {
        Ok(envelope) => envelope,
        Err(e) => {
            return match raw.decode::<serde_json::Value>() {
                Ok(_) => Err(ApiError::DecodingError(e)),
                Err(status_err) => Err(status_err),
            };
        }
    };

    let data = envelope.data;
    if let Some(msg) = data.msg {
        return Err(ApiError::ServerError {
            status_code: raw.status,
            message: msg,
        });
    }

    let missing = |field: &'static str| ApiError::DecodingError(serde_json::Error::missing_field(field));
    Ok(SignInResponse {
        access_token: data.access_token.ok_or_else(|| missing("access_token"))?,
        refresh_token: data.refresh_token.ok_or_else(|| missing("refresh_token"))?,
        email: data.email.ok_or_else(|| missing("email"))?,
        is_new_profile: false,
        role: data.role.ok_or_else(|| missing("role"))?,
        contact: data.contact.ok_or_else(|| missing("contact"))?,
        tenant: None,
        org_list: None,
    })
}

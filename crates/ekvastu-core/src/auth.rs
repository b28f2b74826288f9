//! Authentication requests, responses and token pairs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tenant::SignInTenant;

/// Access/refresh token pair issued by a successful sign-in, sign-up or Google login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub issued_at: DateTime<Utc>,
}

impl TokenPair {
    /// Create a pair issued now
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            issued_at: Utc::now(),
        }
    }
}

/// Data an auth response hands to the token store and tenant context.
pub trait AuthPayload {
    /// `(access, refresh)` tokens carried by the response, if any
    fn token_pair(&self) -> Option<(&str, &str)>;

    /// Tenant embedded in the response, if any
    fn embedded_tenant(&self) -> Option<&SignInTenant>;
}

/// Contact record attached to an authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    #[serde(default)]
    pub gu_id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub is_first_login: bool,
    #[serde(default)]
    pub is_admin_verified: bool,
    #[serde(default)]
    pub has_accepted_terms: bool,
    #[serde(default)]
    pub balance: Option<f64>,
}

/// Email/password sign-in body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub tid: String,
    pub email: String,
    pub password: String,
    pub auth_type: String,
}

/// Sign-in (and Google login) response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    #[serde(rename = "access_token")]
    pub access_token: String,
    #[serde(rename = "refresh_token")]
    pub refresh_token: String,
    pub email: String,
    #[serde(default)]
    pub is_new_profile: bool,
    #[serde(default)]
    pub role: String,
    pub contact: Contact,
    #[serde(default)]
    pub tenant: Option<SignInTenant>,
    #[serde(default)]
    pub org_list: Option<Vec<String>>,
}

/// Google login shares the sign-in response shape
pub type GoogleLoginResponse = SignInResponse;

impl AuthPayload for SignInResponse {
    fn token_pair(&self) -> Option<(&str, &str)> {
        Some((&self.access_token, &self.refresh_token))
    }

    fn embedded_tenant(&self) -> Option<&SignInTenant> {
        self.tenant.as_ref()
    }
}

/// Caller-supplied profile fields for email sign-up
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interested_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl SignUpForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Default::default()
        }
    }
}

/// Email sign-up body: the form plus the resolved tenant identifiers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[serde(flatten)]
    pub form: SignUpForm,
    pub tenant_id: String,
    pub org_id: String,
}

/// Caller-supplied fields for Google sign-up
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignUpForm {
    pub id_token: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl GoogleSignUpForm {
    /// Split a provider display name into first name and the remaining last name
    pub fn from_display_name(
        id_token: impl Into<String>,
        display_name: Option<&str>,
        phone: Option<String>,
    ) -> Self {
        let display_name = display_name.unwrap_or_default().trim();
        let (name, last_name) = match display_name.split_once(' ') {
            Some((first, rest)) if !rest.trim().is_empty() => {
                (first.to_string(), Some(rest.trim().to_string()))
            }
            _ => (display_name.to_string(), None),
        };

        Self {
            id_token: id_token.into(),
            name,
            last_name,
            phone,
        }
    }
}

/// Google sign-up body, posted to the shared sign-up path
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignUpRequest {
    #[serde(flatten)]
    pub form: GoogleSignUpForm,
    pub tenant_id: String,
    pub org_id: String,
}

/// Optional account record echoed back by sign-up
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpData {
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub tenant_id: Option<String>,
    pub created_at: Option<String>,
    pub status: Option<String>,
}

/// Sign-up (email and Google) response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignUpResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<SignUpData>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub tenant: Option<SignInTenant>,
}

pub type GoogleSignUpResponse = SignUpResponse;

impl AuthPayload for SignUpResponse {
    fn token_pair(&self) -> Option<(&str, &str)> {
        self.access_token
            .as_deref()
            .map(|access| (access, self.refresh_token.as_deref().unwrap_or_default()))
    }

    fn embedded_tenant(&self) -> Option<&SignInTenant> {
        self.tenant.as_ref()
    }
}

/// Google login body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub tid: String,
    pub org_id: String,
    pub id_token: String,
}

/// Email login body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailLoginRequest {
    pub tid: String,
    pub email: String,
    pub password: String,
}

/// Email login response; every field is optional because failures come back
/// through the same envelope with only `msg` set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailLoginData {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub contact: Option<Contact>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailLoginResponse {
    pub data: EmailLoginData,
}

//! Endpoint catalogue, host routing and request descriptors

use crate::{ApiError, Result};
use reqwest::{Method, Url};
use serde::Serialize;

/// Backend host an endpoint is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiHost {
    /// Authentication and tenant resolution
    Auth,
    /// Property, room, photo, profile and evaluation CRUD
    Domain,
}

/// Every backend route the client talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiEndpoint {
    SignIn,
    /// Shared by email and Google sign-up
    SignUp,
    GoogleLogin,
    EmailLogin,
    TenantPing { name: String },
    Profile,
    Properties,
    Property(String),
    PropertyRooms(String),
    Room(String),
    RoomPhotos(String),
    RoomPhotoUrl(String),
    Photo(String),
    RoomQuestions(String),
    RoomAnswers(String),
    RoomScore(String),
    Remedies {
        room_type: Option<String>,
        issue_type: Option<String>,
    },
    Remedy(String),
}

impl ApiEndpoint {
    pub fn host(&self) -> ApiHost {
        match self {
            ApiEndpoint::SignIn
            | ApiEndpoint::SignUp
            | ApiEndpoint::GoogleLogin
            | ApiEndpoint::EmailLogin
            | ApiEndpoint::TenantPing { .. } => ApiHost::Auth,
            _ => ApiHost::Domain,
        }
    }

    /// Path segments; each one is percent-encoded on its own
    pub fn segments(&self) -> Vec<&str> {
        match self {
            ApiEndpoint::SignIn => vec!["smobile", "tenant", "plogin"],
            ApiEndpoint::SignUp => vec!["smobile", "rest", "signup"],
            ApiEndpoint::GoogleLogin => vec!["smobile", "rest", "glogin"],
            ApiEndpoint::EmailLogin => vec!["smobile", "tenant", "email", "login"],
            ApiEndpoint::TenantPing { .. } => vec!["snode", "tenant", "ping"],
            ApiEndpoint::Profile => vec!["profile"],
            ApiEndpoint::Properties => vec!["properties"],
            ApiEndpoint::Property(id) => vec!["properties", id.as_str()],
            ApiEndpoint::PropertyRooms(id) => vec!["properties", id.as_str(), "rooms"],
            ApiEndpoint::Room(id) => vec!["rooms", id.as_str()],
            ApiEndpoint::RoomPhotos(id) => vec!["rooms", id.as_str(), "photos"],
            ApiEndpoint::RoomPhotoUrl(id) => vec!["rooms", id.as_str(), "photos", "url"],
            ApiEndpoint::Photo(id) => vec!["photos", id.as_str()],
            ApiEndpoint::RoomQuestions(id) => vec!["room", "questions", id.as_str()],
            ApiEndpoint::RoomAnswers(id) => vec!["room", id.as_str(), "questions"],
            ApiEndpoint::RoomScore(id) => vec!["room", id.as_str(), "vastuscore"],
            ApiEndpoint::Remedies { .. } => vec!["remedies"],
            ApiEndpoint::Remedy(id) => vec!["remedies", id.as_str()],
        }
    }

    pub fn query(&self) -> Vec<(&'static str, &str)> {
        match self {
            ApiEndpoint::TenantPing { name } => vec![("name", name.as_str())],
            ApiEndpoint::Remedies {
                room_type,
                issue_type,
            } => {
                let mut query = Vec::new();
                if let Some(room_type) = room_type {
                    query.push(("roomType", room_type.as_str()));
                }
                if let Some(issue_type) = issue_type {
                    query.push(("issueType", issue_type.as_str()));
                }
                query
            }
            _ => Vec::new(),
        }
    }

    /// Resolve against a host base URL
    pub fn url(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base).map_err(|_| ApiError::InvalidURL)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidURL)?
            .pop_if_empty()
            .extend(self.segments());

        let query = self.query();
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(query);
        }
        Ok(url)
    }
}

/// One outgoing request, built per call and never reused
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub endpoint: ApiEndpoint,
    pub method: Method,
    pub body: Option<Vec<u8>>,
    pub headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(endpoint: ApiEndpoint, method: Method) -> Self {
        Self {
            endpoint,
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(endpoint: ApiEndpoint) -> Self {
        Self::new(endpoint, Method::GET)
    }

    pub fn post(endpoint: ApiEndpoint) -> Self {
        Self::new(endpoint, Method::POST)
    }

    pub fn put(endpoint: ApiEndpoint) -> Self {
        Self::new(endpoint, Method::PUT)
    }

    pub fn delete(endpoint: ApiEndpoint) -> Self {
        Self::new(endpoint, Method::DELETE)
    }

    /// Serialize `body` as the JSON request body
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let bytes = serde_json::to_vec(body).map_err(|_| ApiError::InvalidRequest)?;
        self.body = Some(bytes);
        Ok(self)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

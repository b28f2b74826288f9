use super::ServiceContext;
use crate::dispatcher::{RawResponse, StatusClass, classify_status};
use crate::endpoint::{ApiEndpoint, RequestDescriptor};
use crate::{ApiError, Result};
use ekvastu_core::profile::{CreateProfileRequest, ProfileResponse, UpdateProfileRequest};
use tracing::{info, instrument, warn};

/// Backend texts that mean the access token was rejected as malformed
const INVALID_TOKEN_MARKERS: [&str; 2] = [
    "signature verification failed",
    "Not enough or too many segments",
];

pub struct ProfileService {
    ctx: ServiceContext,
}

impl ProfileService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Fetch the profile; a 404 carrying a profile envelope means "no profile yet"
    #[instrument(skip(self))]
    pub async fn check(&self) -> Result<ProfileResponse> {
        let raw = self
            .ctx
            .send_raw(RequestDescriptor::get(ApiEndpoint::Profile))
            .await?;

        if raw.status == 404 {
            if let Ok(response) = serde_json::from_slice::<ProfileResponse>(&raw.body) {
                info!("No profile exists yet");
                return Ok(response);
            }
        }
        self.finish(raw)
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: &CreateProfileRequest) -> Result<ProfileResponse> {
        let raw = self
            .ctx
            .send_raw(RequestDescriptor::post(ApiEndpoint::Profile).with_json(request)?)
            .await?;
        self.finish(raw)
    }

    #[instrument(skip(self, request))]
    pub async fn update(&self, request: &UpdateProfileRequest) -> Result<ProfileResponse> {
        let raw = self
            .ctx
            .send_raw(RequestDescriptor::put(ApiEndpoint::Profile).with_json(request)?)
            .await?;
        self.finish(raw)
    }

    fn finish(&self, raw: RawResponse) -> Result<ProfileResponse> {
        if classify_status(raw.status) == StatusClass::Failure && is_invalid_token(&raw.body) {
            warn!("Access token rejected by profile endpoint; clearing tokens");
            self.ctx.tokens().clear();
            return Err(ApiError::Unauthorized);
        }
        raw.decode()
    }
}

fn is_invalid_token(body: &[u8]) -> bool {
    let body = String::from_utf8_lossy(body);
    INVALID_TOKEN_MARKERS
        .iter()
        .any(|marker| body.contains(marker))
}

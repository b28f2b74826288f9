use super::ServiceContext;
use crate::endpoint::{ApiEndpoint, RequestDescriptor};
use crate::Result;
use ekvastu_core::property::{CreatePhotoRequest, PhotoResponse, PhotosResponse};
use ekvastu_core::DeleteResponse;
use tracing::instrument;

pub struct PhotoService {
    ctx: ServiceContext,
}

impl PhotoService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register an image already hosted on the media CDN
    #[instrument(skip(self, request))]
    pub async fn add_by_url(
        &self,
        room_id: &str,
        request: &CreatePhotoRequest,
    ) -> Result<PhotoResponse> {
        self.ctx
            .send(
                RequestDescriptor::post(ApiEndpoint::RoomPhotoUrl(room_id.to_string()))
                    .with_json(request)?,
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, room_id: &str) -> Result<PhotosResponse> {
        self.ctx
            .send(RequestDescriptor::get(ApiEndpoint::RoomPhotos(
                room_id.to_string(),
            )))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, photo_id: &str) -> Result<DeleteResponse> {
        self.ctx
            .send(RequestDescriptor::delete(ApiEndpoint::Photo(
                photo_id.to_string(),
            )))
            .await
    }
}

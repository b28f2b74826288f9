use super::ServiceContext;
use crate::endpoint::{ApiEndpoint, RequestDescriptor};
use crate::{ApiError, Result};
use ekvastu_core::property::{
    CreateRoomRequest, RoomData, RoomResponse, RoomsResponse, UpdateRoomRequest,
};
use tracing::instrument;

pub struct RoomService {
    ctx: ServiceContext,
}

impl RoomService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        property_id: &str,
        request: &CreateRoomRequest,
    ) -> Result<RoomResponse> {
        self.ctx
            .send(
                RequestDescriptor::post(ApiEndpoint::PropertyRooms(property_id.to_string()))
                    .with_json(request)?,
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, property_id: &str) -> Result<RoomsResponse> {
        self.ctx
            .send(RequestDescriptor::get(ApiEndpoint::PropertyRooms(
                property_id.to_string(),
            )))
            .await
    }

    /// Room with its questions and answers; `NoData` when the envelope has no room
    #[instrument(skip(self))]
    pub async fn get(&self, room_id: &str) -> Result<RoomData> {
        let response: RoomResponse = self
            .ctx
            .send(RequestDescriptor::get(ApiEndpoint::Room(room_id.to_string())))
            .await?;
        response.into_data().ok_or(ApiError::NoData)
    }

    #[instrument(skip(self, request))]
    pub async fn update(&self, room_id: &str, request: &UpdateRoomRequest) -> Result<RoomResponse> {
        self.ctx
            .send(
                RequestDescriptor::put(ApiEndpoint::Room(room_id.to_string())).with_json(request)?,
            )
            .await
    }
}

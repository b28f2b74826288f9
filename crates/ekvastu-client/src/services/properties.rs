use super::ServiceContext;
use crate::endpoint::{ApiEndpoint, RequestDescriptor};
use crate::Result;
use ekvastu_core::property::{
    CreatePropertyRequest, PropertiesResponse, PropertyResponse, UpdatePropertyRequest,
};
use ekvastu_core::DeleteResponse;
use tracing::instrument;

pub struct PropertyService {
    ctx: ServiceContext,
}

impl PropertyService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<PropertiesResponse> {
        self.ctx
            .send(RequestDescriptor::get(ApiEndpoint::Properties))
            .await
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: &CreatePropertyRequest) -> Result<PropertyResponse> {
        self.ctx
            .send(RequestDescriptor::post(ApiEndpoint::Properties).with_json(request)?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, property_id: &str) -> Result<PropertyResponse> {
        self.ctx
            .send(RequestDescriptor::get(ApiEndpoint::Property(
                property_id.to_string(),
            )))
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        property_id: &str,
        request: &UpdatePropertyRequest,
    ) -> Result<PropertyResponse> {
        self.ctx
            .send(
                RequestDescriptor::put(ApiEndpoint::Property(property_id.to_string()))
                    .with_json(request)?,
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, property_id: &str) -> Result<DeleteResponse> {
        self.ctx
            .send(RequestDescriptor::delete(ApiEndpoint::Property(
                property_id.to_string(),
            )))
            .await
    }
}

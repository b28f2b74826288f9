use super::ServiceContext;
use crate::endpoint::{ApiEndpoint, RequestDescriptor};
use crate::Result;
use ekvastu_core::remedy::{Remedy, RemedyFilter};
use tracing::instrument;

pub struct RemedyService {
    ctx: ServiceContext,
}

impl RemedyService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: RemedyFilter) -> Result<Vec<Remedy>> {
        let (room_type, issue_type) = match filter {
            RemedyFilter::All => (None, None),
            RemedyFilter::RoomType(room_type) => (Some(room_type), None),
            RemedyFilter::IssueType(issue_type) => (None, Some(issue_type)),
        };
        self.ctx
            .send(RequestDescriptor::get(ApiEndpoint::Remedies {
                room_type,
                issue_type,
            }))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, remedy_id: &str) -> Result<Remedy> {
        self.ctx
            .send(RequestDescriptor::get(ApiEndpoint::Remedy(
                remedy_id.to_string(),
            )))
            .await
    }
}

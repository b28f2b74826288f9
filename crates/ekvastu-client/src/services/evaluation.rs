use super::ServiceContext;
use crate::endpoint::{ApiEndpoint, RequestDescriptor};
use crate::Result;
use ekvastu_core::evaluation::{
    RoomAnswerItem, RoomQuestionsResponse, RoomScoreResponse, SubmitRoomAnswersRequest,
    SubmitRoomAnswersResponse,
};
use tracing::{debug, instrument};

pub struct EvaluationService {
    ctx: ServiceContext,
}

impl EvaluationService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn questions(&self, room_id: &str) -> Result<RoomQuestionsResponse> {
        let response: RoomQuestionsResponse = self
            .ctx
            .send(RequestDescriptor::get(ApiEndpoint::RoomQuestions(
                room_id.to_string(),
            )))
            .await?;
        debug!("Fetched {} questions", response.data.len());
        Ok(response)
    }

    #[instrument(skip(self, answers), fields(count = answers.len()))]
    pub async fn submit_answers(
        &self,
        room_id: &str,
        answers: Vec<RoomAnswerItem>,
    ) -> Result<SubmitRoomAnswersResponse> {
        let request = SubmitRoomAnswersRequest { answers };
        self.ctx
            .send(
                RequestDescriptor::post(ApiEndpoint::RoomAnswers(room_id.to_string()))
                    .with_json(&request)?,
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn room_score(&self, room_id: &str) -> Result<RoomScoreResponse> {
        self.ctx
            .send(RequestDescriptor::get(ApiEndpoint::RoomScore(
                room_id.to_string(),
            )))
            .await
    }
}

//! Room evaluation: questions, answers and the backend-computed score

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomQuestion {
    pub id: String,
    pub question: String,
    /// `yes_no` or `multiple_choice`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomQuestionsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<RoomQuestion>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomAnswerItem {
    pub question_id: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRoomAnswersRequest {
    pub answers: Vec<RoomAnswerItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRoomAnswersResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomScore {
    pub room_id: String,
    pub score: f64,
    #[serde(rename = "maxScore")]
    pub max_score: f64,
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default)]
    pub calculated_at: Option<String>,
}

impl RoomScore {
    /// Percentage reported by the backend, else derived from the raw score
    pub fn display_percentage(&self) -> f64 {
        match self.percentage {
            Some(percentage) => percentage,
            None if self.max_score > 0.0 => self.score / self.max_score * 100.0,
            None => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomScoreResponse {
    #[serde(default)]
    pub success: bool,
    pub data: RoomScore,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn score(percentage: Option<f64>, score: f64, max_score: f64) -> RoomScore {
        RoomScore {
            room_id: "r1".to_string(),
            score,
            max_score,
            room_name: None,
            percentage,
            analysis: None,
            calculated_at: None,
        }
    }

    #[test]
    fn test_display_percentage() {
        assert_eq!(score(Some(42.0), 1.0, 10.0).display_percentage(), 42.0);
        assert_eq!(score(None, 7.5, 10.0).display_percentage(), 75.0);
        assert_eq!(score(None, 3.0, 0.0).display_percentage(), 0.0);
    }

    #[test]
    fn test_score_wire_names() {
        let resp: RoomScoreResponse = serde_json::from_value(json!({
            "success": true,
            "data": {"room_id": "r1", "score": 8, "maxScore": 10}
        }))
        .unwrap();
        assert_eq!(resp.data.max_score, 10.0);
        assert_eq!(resp.data.display_percentage(), 80.0);
    }
}

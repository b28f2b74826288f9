//! Property, room and photo records

use serde::{Deserialize, Serialize};

use crate::envelope::ApiEnvelope;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyData {
    pub id: String,
    pub name: String,
    pub property_type: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePropertyRequest {
    pub name: String,
    pub property_type: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// Partial property update; absent fields are left untouched by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePropertyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

pub type PropertyResponse = ApiEnvelope<PropertyData>;
pub type PropertiesResponse = ApiEnvelope<Vec<PropertyData>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionData {
    pub id: String,
    pub room_type: String,
    pub question_text: String,
    pub question_order: i32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerData {
    pub id: String,
    pub room_id: String,
    pub question_id: String,
    pub answer_text: String,
    #[serde(default)]
    pub answer_value: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomData {
    pub id: String,
    pub name: String,
    #[serde(rename = "room_type")]
    pub kind: String,
    pub property_id: String,
    #[serde(default)]
    pub floor_level: Option<i32>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub questions: Vec<QuestionData>,
    #[serde(default)]
    pub answers: Vec<AnswerData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRoomRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

pub type RoomResponse = ApiEnvelope<RoomData>;
pub type RoomsResponse = ApiEnvelope<Vec<RoomData>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoData {
    pub id: String,
    pub room_id: String,
    pub photo_url: String,
    pub cloud_name: String,
    pub folder_name: String,
    pub uri: String,
    pub created_at: String,
}

/// Register an already uploaded image against a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePhotoRequest {
    pub cloud_name: String,
    pub uri: String,
}

pub type PhotoResponse = ApiEnvelope<PhotoData>;
pub type PhotosResponse = ApiEnvelope<Vec<PhotoData>>;

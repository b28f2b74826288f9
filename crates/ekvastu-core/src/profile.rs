//! Astrological profile attached to a signed-in contact

use serde::{Deserialize, Serialize};

use crate::envelope::ApiEnvelope;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub dob: String,
    pub place_of_birth: String,
    pub time_of_birth: String,
    pub contact_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub dob: String,
    pub place_of_birth: String,
    pub time_of_birth: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_birth: Option<String>,
}

/// A `success: false` envelope with no data means the contact has no profile yet
pub type ProfileResponse = ApiEnvelope<ProfileData>;

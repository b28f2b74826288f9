//! Remedies suggested for room types and issues

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemedyStep {
    #[serde(rename = "_id")]
    pub id: String,
    pub step_number: u32,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remedy {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub steps: Vec<RemedyStep>,
}

/// Filter applied when listing remedies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemedyFilter {
    All,
    RoomType(String),
    IssueType(String),
}

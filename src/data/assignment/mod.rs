use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod ops;

pub static ASSIGNMENT_COLLECTION_NAME: &str = "assignments";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    Individual,
    Group,
}

impl std::default::Default for SubmissionType {
    fn default() -> Self {
        SubmissionType::Individual
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub course: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due: DateTime<Utc>,
    /// External hand-in location, e.g. a shared document link.
    #[serde(default)]
    pub submission_link: Option<String>,
    #[serde(default)]
    pub submission_type: SubmissionType,
    pub created_by: Uuid,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentCreateData {
    pub course: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submission_link: Option<String>,
    #[serde(default)]
    pub submission_type: SubmissionType,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod ops;

pub static ACKNOWLEDGMENT_COLLECTION_NAME: &str = "acknowledgments";

/// A student's (or their group leader's) confirmation that an assignment
/// was submitted. At most one exists per (assignment, student) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledgment {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub assignment: Uuid,
    pub student: Uuid,
    #[serde(default)]
    pub group: Option<Uuid>,
    pub acknowledged: bool,
    #[serde(default = "Utc::now")]
    pub acknowledged_at: DateTime<Utc>,
}

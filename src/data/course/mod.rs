use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod ops;

pub static COURSE_COLLECTION_NAME: &str = "courses";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub semester: String,
    pub professor: Uuid,
    #[serde(default)]
    pub students: Vec<Uuid>,
    /// Display color tag used by the dashboards, e.g. "bg-indigo-500".
    #[serde(default)]
    pub color: String,
}

impl Course {
    pub fn has_student(&self, student: Uuid) -> bool {
        self.students.contains(&student)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseCreateData {
    pub name: String,
    pub code: String,
    pub semester: String,
    #[serde(default)]
    pub color: String,
}

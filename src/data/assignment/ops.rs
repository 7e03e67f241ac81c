use chrono::Utc;
use uuid::Uuid;

use crate::data::course::ops::{problem as course_problem, CourseStoreExt};
use crate::resp::problem::Problem;
use crate::store::Store;

use super::{Assignment, AssignmentCreateData};

pub mod problem {
    use crate::resp::problem::{Problem, ProblemKind};
    use uuid::Uuid;

    #[inline]
    pub fn bad_assignment(detail: impl ToString) -> Problem {
        Problem::new(ProblemKind::BadRequest, "Bad assignment.")
            .detail(detail)
            .to_owned()
    }

    #[inline]
    pub fn not_found(id: Uuid) -> Problem {
        Problem::new(ProblemKind::NotFound, "Assignment doesn't exist.")
            .insert("id", id.to_string())
            .clone()
    }
}

impl AssignmentCreateData {
    pub fn validate(&self) -> Result<(), Problem> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() || self.due.is_none()
        {
            return Err(problem::bad_assignment(
                "Title, Description, and Due Date are required.",
            ));
        }

        if let Some(link) = &self.submission_link {
            if !link.starts_with("http://") && !link.starts_with("https://") {
                return Err(problem::bad_assignment(
                    "Submission link must be an http(s) URL.",
                ));
            }
        }

        Ok(())
    }
}

pub trait AssignmentStoreExt {
    /// Appends an assignment stamped with its creator and creation time.
    /// There is deliberately no check that the creator teaches the target
    /// course; dashboards only offer the form to course owners.
    fn create_assignment(
        &mut self,
        data: AssignmentCreateData,
        creator: Uuid,
    ) -> Result<Assignment, Problem>;

    /// Removes the assignment. Acknowledgments referencing it are left in
    /// place; an unknown id is a no-op.
    fn delete_assignment(&mut self, id: Uuid);

    fn assignment(&self, id: Uuid) -> Option<&Assignment>;
    fn assignments_for_course(&self, course: Uuid) -> Vec<&Assignment>;

    /// (acknowledged, enrolled) counts backing the per-assignment progress
    /// bar on the professor dashboard.
    fn acknowledgment_progress(&self, assignment: Uuid) -> (usize, usize);
}

impl AssignmentStoreExt for Store {
    #[tracing::instrument(skip(self, data))]
    fn create_assignment(
        &mut self,
        data: AssignmentCreateData,
        creator: Uuid,
    ) -> Result<Assignment, Problem> {
        data.validate()?;

        if self.course(data.course).is_none() {
            return Err(course_problem::not_found(data.course));
        }

        let assignment = Assignment {
            id: Uuid::new_v4(),
            course: data.course,
            title: data.title,
            description: data.description,
            due: data.due.expect("validate checked the due date"),
            submission_link: data.submission_link,
            submission_type: data.submission_type,
            created_by: creator,
            created: Utc::now(),
        };

        self.assignments_mut().push(assignment.clone());
        self.persist_assignments();

        tracing::info!("Created assignment '{}'", assignment.title);
        Ok(assignment)
    }

    #[tracing::instrument(skip(self))]
    fn delete_assignment(&mut self, id: Uuid) {
        let before = self.assignments().len();
        self.assignments_mut().retain(|a| a.id != id);

        if self.assignments().len() != before {
            self.persist_assignments();
            tracing::info!("Deleted assignment {}", id);
        }
    }

    fn assignment(&self, id: Uuid) -> Option<&Assignment> {
        self.assignments().iter().find(|a| a.id == id)
    }

    fn assignments_for_course(&self, course: Uuid) -> Vec<&Assignment> {
        self.assignments()
            .iter()
            .filter(|a| a.course == course)
            .collect()
    }

    fn acknowledgment_progress(&self, assignment: Uuid) -> (usize, usize) {
        let assignment = match self.assignment(assignment) {
            Some(a) => a,
            None => return (0, 0),
        };

        let enrolled = self
            .course(assignment.course)
            .map(|c| c.students.len())
            .unwrap_or(0);
        let acknowledged = self
            .acknowledgments()
            .iter()
            .filter(|a| a.assignment == assignment.id && a.acknowledged)
            .count();

        (acknowledged, enrolled)
    }
}

///////////////////////
//       TESTS
///////////////////////

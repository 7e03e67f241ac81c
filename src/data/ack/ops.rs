use chrono::Utc;
use uuid::Uuid;

use crate::data::assignment::ops::{problem as assignment_problem, AssignmentStoreExt};
use crate::data::assignment::SubmissionType;
use crate::data::group::ops::GroupStoreExt;
use crate::resp::problem::Problem;
use crate::store::Store;

use super::Acknowledgment;

pub mod problem {
    use crate::resp::problem::{Problem, ProblemKind};

    #[inline]
    pub fn no_group() -> Problem {
        Problem::new(
            ProblemKind::Forbidden,
            "You must be part of a group to acknowledge this assignment.",
        )
    }

    #[inline]
    pub fn not_leader() -> Problem {
        Problem::new(
            ProblemKind::Forbidden,
            "Only the group leader can acknowledge this assignment.",
        )
    }
}

pub trait AckStoreExt {
    /// Records that `student` confirmed the assignment. Group-type
    /// assignments may only be acknowledged by the leader of the student's
    /// group in that course, on behalf of the whole group. A repeated call
    /// returns the existing record unchanged.
    fn acknowledge(
        &mut self,
        assignment: Uuid,
        student: Uuid,
        group: Option<Uuid>,
    ) -> Result<Acknowledgment, Problem>;

    fn acknowledgment_for(&self, assignment: Uuid, student: Uuid) -> Option<&Acknowledgment>;
    fn has_acknowledged(&self, assignment: Uuid, student: Uuid) -> bool;

    /// Whether the assignment reads as acknowledged from `student`'s side:
    /// either they acknowledged it themselves, or their group leader did.
    fn is_acknowledged_for(&self, assignment: Uuid, student: Uuid) -> bool;
}

impl AckStoreExt for Store {
    #[tracing::instrument(skip(self))]
    fn acknowledge(
        &mut self,
        assignment: Uuid,
        student: Uuid,
        group: Option<Uuid>,
    ) -> Result<Acknowledgment, Problem> {
        let (course, submission_type) = match self.assignment(assignment) {
            Some(a) => (a.course, a.submission_type),
            None => return Err(assignment_problem::not_found(assignment)),
        };

        let group = match submission_type {
            SubmissionType::Group => {
                let g = self
                    .group_for_student(course, student)
                    .ok_or_else(problem::no_group)?;
                if !g.is_leader(student) {
                    return Err(problem::not_leader());
                }
                Some(g.id)
            }
            SubmissionType::Individual => group,
        };

        if let Some(existing) = self.acknowledgment_for(assignment, student) {
            // check-before-insert keeps the (assignment, student) pair unique
            return Ok(existing.clone());
        }

        let ack = Acknowledgment {
            id: Uuid::new_v4(),
            assignment,
            student,
            group,
            acknowledged: true,
            acknowledged_at: Utc::now(),
        };

        self.acknowledgments_mut().push(ack.clone());
        self.persist_acknowledgments();

        tracing::info!("Student {} acknowledged assignment {}", student, assignment);
        Ok(ack)
    }

    fn acknowledgment_for(&self, assignment: Uuid, student: Uuid) -> Option<&Acknowledgment> {
        self.acknowledgments()
            .iter()
            .find(|a| a.assignment == assignment && a.student == student)
    }

    fn has_acknowledged(&self, assignment: Uuid, student: Uuid) -> bool {
        self.acknowledgment_for(assignment, student)
            .map(|a| a.acknowledged)
            .unwrap_or(false)
    }

    fn is_acknowledged_for(&self, assignment: Uuid, student: Uuid) -> bool {
        if self.has_acknowledged(assignment, student) {
            return true;
        }

        let a = match self.assignment(assignment) {
            Some(a) => a,
            None => return false,
        };
        if a.submission_type != SubmissionType::Group {
            return false;
        }

        match self.group_for_student(a.course, student) {
            Some(g) => self
                .acknowledgments()
                .iter()
                .any(|ack| ack.assignment == assignment && ack.group == Some(g.id) && ack.acknowledged),
            None => false,
        }
    }
}

///////////////////////
//       TESTS
///////////////////////

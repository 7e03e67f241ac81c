use uuid::Uuid;

use crate::data::user::ops::{problem as user_problem, UserStoreExt};
use crate::data::user::{RoleProfile, User};
use crate::resp::problem::Problem;
use crate::role::Role;
use crate::store::Store;

use super::{Course, CourseCreateData};

pub mod problem {
    use crate::resp::problem::{Problem, ProblemKind};
    use uuid::Uuid;

    #[inline]
    pub fn bad_course(detail: impl ToString) -> Problem {
        Problem::new(ProblemKind::BadRequest, "Bad course.")
            .detail(detail)
            .to_owned()
    }

    #[inline]
    pub fn not_found(id: Uuid) -> Problem {
        Problem::new(ProblemKind::NotFound, "Course doesn't exist.")
            .insert("id", id.to_string())
            .clone()
    }

    #[inline]
    pub fn not_a_professor() -> Problem {
        Problem::new(ProblemKind::Unauthorized, "Only professors can create courses.")
    }

    #[inline]
    pub fn not_a_student() -> Problem {
        Problem::new(ProblemKind::Unauthorized, "Only students can enroll in courses.")
    }
}

impl CourseCreateData {
    pub fn validate(&self) -> Result<(), Problem> {
        if self.name.trim().is_empty() {
            return Err(problem::bad_course("Course name is required."));
        }

        if self.code.trim().is_empty() {
            return Err(problem::bad_course("Course code is required."));
        }

        Ok(())
    }
}

pub trait CourseStoreExt {
    /// Appends a course owned by `professor` with an empty roster, and
    /// records it on the professor's taught list in the same call.
    fn create_course(&mut self, data: CourseCreateData, professor: Uuid)
        -> Result<Course, Problem>;

    /// Puts `student` on the course roster and the course on the student's
    /// enrollment list. The two sides never update separately; calling this
    /// twice is a no-op.
    fn enroll_course(&mut self, student: Uuid, course: Uuid) -> Result<(), Problem>;

    fn course(&self, id: Uuid) -> Option<&Course>;
    fn courses_taught_by(&self, professor: Uuid) -> Vec<&Course>;
    fn courses_enrolled_by(&self, student: Uuid) -> Vec<&Course>;
    fn available_courses_for(&self, student: Uuid) -> Vec<&Course>;
    fn students_in_course(&self, course: Uuid) -> Vec<&User>;
}

impl CourseStoreExt for Store {
    #[tracing::instrument(skip(self, data))]
    fn create_course(
        &mut self,
        data: CourseCreateData,
        professor: Uuid,
    ) -> Result<Course, Problem> {
        data.validate()?;

        let owner = self
            .user(professor)
            .ok_or_else(|| user_problem::not_found(professor))?;
        if !owner.role().can_teach() {
            return Err(problem::not_a_professor());
        }

        let course = Course {
            id: Uuid::new_v4(),
            name: data.name,
            code: data.code,
            semester: data.semester,
            professor,
            students: vec![],
            color: data.color,
        };

        if let Some(user) = self.users_mut().iter_mut().find(|u| u.id == professor) {
            if let RoleProfile::Admin { courses } = &mut user.profile {
                courses.push(course.id);
            }
        }
        self.courses_mut().push(course.clone());

        self.persist_courses();
        self.persist_users();

        tracing::info!("Created course '{}' ({})", course.name, course.code);
        Ok(course)
    }

    #[tracing::instrument(skip(self))]
    fn enroll_course(&mut self, student: Uuid, course: Uuid) -> Result<(), Problem> {
        let user = self
            .user(student)
            .ok_or_else(|| user_problem::not_found(student))?;
        if user.role() != Role::Student {
            return Err(problem::not_a_student());
        }
        if self.course(course).is_none() {
            return Err(problem::not_found(course));
        }
        if user.is_enrolled(course) {
            return Ok(());
        }

        if let Some(user) = self.users_mut().iter_mut().find(|u| u.id == student) {
            if let RoleProfile::Student {
                enrolled_courses, ..
            } = &mut user.profile
            {
                enrolled_courses.push(course);
            }
        }
        if let Some(c) = self.courses_mut().iter_mut().find(|c| c.id == course) {
            if !c.students.contains(&student) {
                c.students.push(student);
            }
        }

        self.persist_users();
        self.persist_courses();

        Ok(())
    }

    fn course(&self, id: Uuid) -> Option<&Course> {
        self.courses().iter().find(|c| c.id == id)
    }

    fn courses_taught_by(&self, professor: Uuid) -> Vec<&Course> {
        self.courses()
            .iter()
            .filter(|c| c.professor == professor)
            .collect()
    }

    fn courses_enrolled_by(&self, student: Uuid) -> Vec<&Course> {
        self.courses()
            .iter()
            .filter(|c| c.has_student(student))
            .collect()
    }

    fn available_courses_for(&self, student: Uuid) -> Vec<&Course> {
        self.courses()
            .iter()
            .filter(|c| !c.has_student(student))
            .collect()
    }

    fn students_in_course(&self, course: Uuid) -> Vec<&User> {
        match self.course(course) {
            Some(c) => self
                .users()
                .iter()
                .filter(|u| c.students.contains(&u.id))
                .collect(),
            None => vec![],
        }
    }
}

///////////////////////
//       TESTS
///////////////////////

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::data::ack::{Acknowledgment, ACKNOWLEDGMENT_COLLECTION_NAME};
use crate::data::assignment::{Assignment, ASSIGNMENT_COLLECTION_NAME};
use crate::data::course::{Course, COURSE_COLLECTION_NAME};
use crate::data::group::{Group, GroupInvitation, GROUP_COLLECTION_NAME, INVITATION_COLLECTION_NAME};
use crate::data::user::{User, USER_COLLECTION_NAME};
use crate::resp::session::{Session, SessionToken};
use crate::security::Security;
use crate::storage::Storage;

/// The application state store: every entity collection, the active
/// session, and cache-through persistence. Mutations go through the
/// per-entity operation traits in [crate::data]; each one writes the
/// affected collection(s) back in full under their fixed storage keys.
pub struct Store {
    storage: Box<dyn Storage>,
    security: Security,
    semester: String,
    session: Option<Session>,

    users: Vec<User>,
    courses: Vec<Course>,
    assignments: Vec<Assignment>,
    groups: Vec<Group>,
    invitations: Vec<GroupInvitation>,
    acknowledgments: Vec<Acknowledgment>,
}

impl Store {
    /// Hydrates a store from whatever `storage` holds. A collection that is
    /// absent, or no longer matches the current schema, starts out empty;
    /// the stale persisted copy sits untouched until the next write.
    pub fn open(storage: Box<dyn Storage>, security: Security, config: &Config) -> Store {
        let users = load_collection(storage.as_ref(), USER_COLLECTION_NAME);
        let courses = load_collection(storage.as_ref(), COURSE_COLLECTION_NAME);
        let assignments = load_collection(storage.as_ref(), ASSIGNMENT_COLLECTION_NAME);
        let groups = load_collection(storage.as_ref(), GROUP_COLLECTION_NAME);
        let invitations = load_collection(storage.as_ref(), INVITATION_COLLECTION_NAME);
        let acknowledgments = load_collection(storage.as_ref(), ACKNOWLEDGMENT_COLLECTION_NAME);

        Store {
            storage,
            security,
            semester: config.semester.clone(),
            session: None,
            users,
            courses,
            assignments,
            groups,
            invitations,
            acknowledgments,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn invitations(&self) -> &[GroupInvitation] {
        &self.invitations
    }

    pub fn acknowledgments(&self) -> &[Acknowledgment] {
        &self.acknowledgments
    }

    /// The session opened by the latest login/registration, if any. Its
    /// token is opaque: presence alone marks the store as authenticated.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn current_user(&self) -> Option<&User> {
        let session = self.session.as_ref()?;
        self.users.iter().find(|u| u.id == session.user)
    }

    pub(crate) fn open_session(&mut self, user: &User) -> SessionToken {
        let session = Session::open(user);
        let token = session.token.clone();
        self.session = Some(session);
        token
    }

    pub(crate) fn clear_session(&mut self) {
        self.session = None;
    }

    pub(crate) fn security(&self) -> &Security {
        &self.security
    }

    /// Semester label stamped onto newly registered students.
    pub(crate) fn semester(&self) -> &str {
        &self.semester
    }

    pub(crate) fn users_mut(&mut self) -> &mut Vec<User> {
        &mut self.users
    }

    pub(crate) fn courses_mut(&mut self) -> &mut Vec<Course> {
        &mut self.courses
    }

    pub(crate) fn assignments_mut(&mut self) -> &mut Vec<Assignment> {
        &mut self.assignments
    }

    pub(crate) fn groups_mut(&mut self) -> &mut Vec<Group> {
        &mut self.groups
    }

    pub(crate) fn invitations_mut(&mut self) -> &mut Vec<GroupInvitation> {
        &mut self.invitations
    }

    pub(crate) fn acknowledgments_mut(&mut self) -> &mut Vec<Acknowledgment> {
        &mut self.acknowledgments
    }

    pub(crate) fn persist_users(&mut self) {
        persist_collection(&mut *self.storage, USER_COLLECTION_NAME, &self.users);
    }

    pub(crate) fn persist_courses(&mut self) {
        persist_collection(&mut *self.storage, COURSE_COLLECTION_NAME, &self.courses);
    }

    pub(crate) fn persist_assignments(&mut self) {
        persist_collection(
            &mut *self.storage,
            ASSIGNMENT_COLLECTION_NAME,
            &self.assignments,
        );
    }

    pub(crate) fn persist_groups(&mut self) {
        persist_collection(&mut *self.storage, GROUP_COLLECTION_NAME, &self.groups);
    }

    pub(crate) fn persist_invitations(&mut self) {
        persist_collection(
            &mut *self.storage,
            INVITATION_COLLECTION_NAME,
            &self.invitations,
        );
    }

    pub(crate) fn persist_acknowledgments(&mut self) {
        persist_collection(
            &mut *self.storage,
            ACKNOWLEDGMENT_COLLECTION_NAME,
            &self.acknowledgments,
        );
    }
}

fn load_collection<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Vec<T> {
    let value = match storage.get(key) {
        Some(value) => value,
        None => return vec![],
    };

    match serde_json::from_value(value) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(
                "Stored '{}' doesn't match the current schema, starting empty: {}",
                key,
                e
            );
            vec![]
        }
    }
}

fn persist_collection<T: Serialize>(storage: &mut dyn Storage, key: &str, items: &[T]) {
    let value = match serde_json::to_value(items) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Unable to serialize '{}' collection: {}", key, e);
            return;
        }
    };

    // the in-memory state stays authoritative; on failure the persisted
    // copy just lags behind
    if let Err(e) = storage.set(key, value) {
        tracing::error!("Unable to persist '{}' collection: {}", key, e);
    }
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod store_persistence {
    use super::*;
    use crate::config::Config;
    use crate::data::course::ops::CourseStoreExt;
    use crate::data::course::CourseCreateData;
    use crate::data::user::ops::{UserSignupData, UserStoreExt};
    use crate::role::Role;
    use crate::security::Security;
    use crate::storage::DirStorage;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("coursetrack-store-{}", Uuid::new_v4()))
    }

    fn open(dir: &PathBuf) -> Store {
        let storage = DirStorage::open(dir).expect("unable to open scratch storage");
        Store::open(
            Box::new(storage),
            Security::with_salt([7; 16]),
            &Config::default(),
        )
    }

    #[test]
    fn mutations_survive_a_reopen() {
        let dir = scratch_dir();

        {
            let mut store = open(&dir);
            let (_, anya) = store
                .register(UserSignupData {
                    name: "Professor Anya".to_string(),
                    email: "anya@university.edu".to_string(),
                    password: "password123".to_string(),
                    role: Role::Admin,
                })
                .expect("unable to register");
            store
                .create_course(
                    CourseCreateData {
                        name: "Calculus I".to_string(),
                        code: "MATH101".to_string(),
                        semester: "Fall 2025".to_string(),
                        color: String::new(),
                    },
                    anya.id,
                )
                .expect("unable to create course");
        }

        let store = open(&dir);
        assert_eq!(store.users().len(), 1);
        assert_eq!(store.courses().len(), 1);
        assert_eq!(store.courses()[0].code, "MATH101");
        assert!(store.session().is_none(), "sessions are not persisted");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn corrupt_collection_hydrates_empty() {
        let dir = scratch_dir();

        {
            let mut store = open(&dir);
            store
                .register(UserSignupData {
                    name: "Ben Carter".to_string(),
                    email: "ben@student.edu".to_string(),
                    password: "password123".to_string(),
                    role: Role::Student,
                })
                .expect("unable to register");
        }

        // a stale schema from an older build of the app
        std::fs::write(dir.join("users.json"), br#"[{"id": 1, "name": "Ben"}]"#).unwrap();

        let store = open(&dir);
        assert!(store.users().is_empty(), "unreadable users start empty");

        std::fs::remove_dir_all(dir).ok();
    }
}

use serde::Deserialize;
use uuid::Uuid;

use crate::resp::problem::Problem;
use crate::resp::session::SessionToken;
use crate::role::Role;
use crate::store::Store;

use super::{PasswordHash, RoleProfile, User};

pub mod problem {
    use crate::resp::problem::{Problem, ProblemKind};
    use uuid::Uuid;

    #[inline]
    pub fn bad_name(detail: impl ToString) -> Problem {
        Problem::new(ProblemKind::BadRequest, "Bad name.")
            .detail(detail)
            .to_owned()
    }

    #[inline]
    pub fn bad_email(email: impl ToString, detail: impl ToString) -> Problem {
        Problem::new(ProblemKind::BadRequest, "Bad email.")
            .insert_str("email", email)
            .detail(detail)
            .to_owned()
    }

    #[inline]
    pub fn bad_password(detail: impl ToString) -> Problem {
        Problem::new(ProblemKind::BadRequest, "Bad password.")
            .detail(detail)
            .to_owned()
    }

    #[inline]
    pub fn not_found(id: Uuid) -> Problem {
        Problem::new(ProblemKind::NotFound, "User doesn't exist.")
            .insert("id", id.to_string())
            .clone()
    }

    #[inline]
    pub fn bad_login() -> Problem {
        Problem::new(
            ProblemKind::Unauthorized,
            "Invalid credentials. Please try again.",
        )
    }
}

#[derive(Clone, Deserialize)]
pub struct UserSignupData {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl std::fmt::Debug for UserSignupData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserSignupData:{}", self.email)
    }
}

impl UserSignupData {
    pub fn validate(&self) -> Result<(), Problem> {
        if self.name.trim().is_empty() {
            return Err(problem::bad_name("Name is required."));
        }

        if !valid_email(&self.email) {
            return Err(problem::bad_email(
                self.email.to_string(),
                "Not a valid e-mail address.",
            ));
        }

        if self.password.len() < 6 {
            return Err(problem::bad_password(
                "Password must be at least 6 characters long.",
            ));
        }

        if self.password.len() > 1024 {
            return Err(problem::bad_password(
                "Passwords longer than 1024 characters aren't supported.",
            ));
        }

        Ok(())
    }
}

#[cfg(feature = "validation-regex")]
fn valid_email(email: &str) -> bool {
    regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .expect("email pattern is well formed")
        .is_match(email)
}

#[cfg(not(feature = "validation-regex"))]
fn valid_email(email: &str) -> bool {
    email.contains('@')
}

#[derive(Clone, Deserialize)]
pub struct UserLoginData {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for UserLoginData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserLoginData:{}", self.email)
    }
}

pub trait UserStoreExt {
    /// Appends a new user and opens their session. Fails without appending
    /// when the email is already registered (exact, case-sensitive match).
    fn register(&mut self, signup: UserSignupData) -> Result<(SessionToken, User), Problem>;

    /// Checks credentials and opens a session. The stored session is left
    /// untouched on a failed attempt.
    fn login(&mut self, login: UserLoginData) -> Result<(SessionToken, User), Problem>;

    fn logout(&mut self);

    fn user(&self, id: Uuid) -> Option<&User>;
    fn find_user_by_email(&self, email: &str) -> Option<&User>;
    fn students(&self) -> Vec<&User>;
}

impl UserStoreExt for Store {
    #[tracing::instrument(skip(self))]
    fn register(&mut self, signup: UserSignupData) -> Result<(SessionToken, User), Problem> {
        signup.validate()?;

        if self.find_user_by_email(&signup.email).is_some() {
            return Err(problem::bad_email(
                signup.email,
                "Email already registered. Please login instead.",
            ));
        }

        let profile = match signup.role {
            Role::Admin => RoleProfile::Admin { courses: vec![] },
            Role::Student => RoleProfile::Student {
                enrolled_courses: vec![],
                semester: self.semester().to_string(),
            },
        };

        let user = User::new(
            &signup.name,
            &signup.email,
            &signup.password,
            profile,
            &self.security().salt,
        );

        self.users_mut().push(user.clone());
        self.persist_users();

        let token = self.open_session(&user);
        Ok((token, user))
    }

    #[tracing::instrument(skip(self))]
    fn login(&mut self, login: UserLoginData) -> Result<(SessionToken, User), Problem> {
        // hash up front so a miss costs the same as a mismatch
        let hash = PasswordHash::new(&login.password, &self.security().salt);

        let user = match self.find_user_by_email(&login.email) {
            Some(user) if user.pw_hash == hash => user.clone(),
            _ => return Err(problem::bad_login()),
        };

        let token = self.open_session(&user);
        tracing::info!("Logged in user {}", user.id);

        Ok((token, user))
    }

    fn logout(&mut self) {
        self.clear_session();
    }

    fn user(&self, id: Uuid) -> Option<&User> {
        self.users().iter().find(|u| u.id == id)
    }

    fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.users().iter().find(|u| u.email == email)
    }

    fn students(&self) -> Vec<&User> {
        self.users()
            .iter()
            .filter(|u| u.role() == Role::Student)
            .collect()
    }
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod user_operations {
    use super::*;
    use crate::config::Config;
    use crate::security::Security;
    use crate::seed;
    use crate::storage::MemoryStorage;

    fn test_store() -> Store {
        Store::open(
            Box::new(MemoryStorage::default()),
            Security::with_salt([7; 16]),
            &Config::default(),
        )
    }

    fn signup(name: &str, email: &str, role: Role) -> UserSignupData {
        UserSignupData {
            name: name.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            role,
        }
    }

    #[test]
    fn register_appends_and_opens_session() {
        let mut store = test_store();

        let (token, user) = store
            .register(signup("Ben Carter", "ben.carter@student.edu", Role::Student))
            .expect("unable to register test user");

        assert!(!token.as_str().is_empty());
        assert_eq!(store.users().len(), 1);
        assert_eq!(store.current_user().map(|u| u.id), Some(user.id));
        assert_eq!(user.role(), Role::Student);
        assert_eq!(user.enrolled_courses(), &[] as &[Uuid]);
    }

    #[test]
    fn register_rejects_duplicate_email_without_appending() {
        let mut store = test_store();

        store
            .register(signup("Ben Carter", "ben.carter@student.edu", Role::Student))
            .expect("unable to register test user");

        let result = store.register(signup(
            "Someone Else",
            "ben.carter@student.edu",
            Role::Student,
        ));

        assert!(result.is_err(), "duplicate email must be refused");
        assert_eq!(store.users().len(), 1, "no user may be appended");
    }

    #[test]
    fn duplicate_email_check_is_case_sensitive() {
        let mut store = test_store();

        store
            .register(signup("Ben Carter", "ben.carter@student.edu", Role::Student))
            .expect("unable to register test user");

        store
            .register(signup("Ben Carter", "Ben.Carter@student.edu", Role::Student))
            .expect("differently-cased email is a distinct account");

        assert_eq!(store.users().len(), 2);
    }

    #[test]
    fn register_validates_input() {
        let mut store = test_store();

        assert!(store
            .register(signup("", "ben.carter@student.edu", Role::Student))
            .is_err());
        assert!(store
            .register(signup("Ben Carter", "not-an-email", Role::Student))
            .is_err());
        assert!(store
            .register(UserSignupData {
                name: "Ben Carter".to_string(),
                email: "ben.carter@student.edu".to_string(),
                password: "short".to_string(),
                role: Role::Student,
            })
            .is_err());
        assert!(store.users().is_empty());
    }

    #[test]
    fn seeded_professor_can_login() {
        let mut store = test_store();
        seed::apply(&mut store);

        let (_, user) = store
            .login(UserLoginData {
                email: "prof.anya@university.edu".to_string(),
                password: "password123".to_string(),
            })
            .expect("seeded professor login should succeed");

        assert_eq!(user.role(), Role::Admin);
        assert!(store.current_user().is_some());
    }

    #[test]
    fn wrong_password_leaves_session_unset() {
        let mut store = test_store();
        seed::apply(&mut store);

        let result = store.login(UserLoginData {
            email: "prof.anya@university.edu".to_string(),
            password: "hunter2hunter2".to_string(),
        });

        assert!(result.is_err());
        assert!(store.current_user().is_none());
        assert!(store.session().is_none());
    }

    #[test]
    fn logout_clears_session() {
        let mut store = test_store();

        store
            .register(signup("Ben Carter", "ben.carter@student.edu", Role::Student))
            .expect("unable to register test user");
        assert!(store.session().is_some());

        store.logout();
        assert!(store.session().is_none());
        assert!(store.current_user().is_none());
    }
}

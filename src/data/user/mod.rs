use crypto::bcrypt::bcrypt;
use crypto::util::fixed_time_eq;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::role::Role;
use crate::security::Salt;

pub mod ops;

pub static USER_COLLECTION_NAME: &str = "users";

const BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordHash([u8; 24]);

impl PasswordHash {
    pub fn new(password: impl AsRef<str>, salt: &Salt) -> PasswordHash {
        let mut pw_hash: [u8; 24] = [0; 24];

        let mut sha = Sha256::new();
        sha2::Digest::update(&mut sha, password.as_ref().as_bytes());

        bcrypt(BCRYPT_COST, salt, sha.finalize().as_slice(), &mut pw_hash);

        PasswordHash(pw_hash)
    }
}

impl PartialEq for PasswordHash {
    fn eq(&self, other: &Self) -> bool {
        // comparison must not short-circuit on the first differing byte
        fixed_time_eq(&self.0, &other.0)
    }
}

impl Eq for PasswordHash {}

/// Role-conditional part of a [User]. The tag doubles as the persisted
/// `role` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Admin {
        /// Courses taught, maintained by course creation.
        #[serde(default)]
        courses: Vec<Uuid>,
    },
    Student {
        #[serde(default)]
        enrolled_courses: Vec<Uuid>,
        semester: String,
    },
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Admin { .. } => Role::Admin,
            RoleProfile::Student { .. } => Role::Student,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub pw_hash: PasswordHash,
    #[serde(flatten)]
    pub profile: RoleProfile,
}

impl User {
    pub fn new(
        name: impl ToString,
        email: impl ToString,
        password: impl AsRef<str>,
        profile: RoleProfile,
        salt: &Salt,
    ) -> User {
        let pw_hash = PasswordHash::new(password, salt);

        let id = Uuid::new_v4();
        tracing::info!("Creating a new user with UUID: {}", id.to_string());

        User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            pw_hash,
            profile,
        }
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn enrolled_courses(&self) -> &[Uuid] {
        match &self.profile {
            RoleProfile::Student {
                enrolled_courses, ..
            } => enrolled_courses,
            RoleProfile::Admin { .. } => &[],
        }
    }

    pub fn is_enrolled(&self, course: Uuid) -> bool {
        self.enrolled_courses().contains(&course)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_password_same_salt_matches() {
        let salt: Salt = [3; 16];

        assert_eq!(
            PasswordHash::new("password123", &salt),
            PasswordHash::new("password123", &salt)
        );
        assert_ne!(
            PasswordHash::new("password123", &salt),
            PasswordHash::new("password124", &salt)
        );
        assert_ne!(
            PasswordHash::new("password123", &salt),
            PasswordHash::new("password123", &[4; 16])
        );
    }

    #[test]
    fn profile_tag_is_the_role_field() {
        let salt: Salt = [3; 16];
        let user = User::new(
            "Ben Carter",
            "ben.carter@student.edu",
            "password123",
            RoleProfile::Student {
                enrolled_courses: vec![],
                semester: "Fall 2025".to_string(),
            },
            &salt,
        );

        let json = serde_json::to_value(&user).expect("user must serialize");
        assert_eq!(json["role"], "student");
        assert_eq!(json["semester"], "Fall 2025");

        let back: User = serde_json::from_value(json).expect("user must deserialize");
        assert_eq!(back.role(), Role::Student);
    }
}

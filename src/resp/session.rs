use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::user::User;
use crate::util;

const TOKEN_BYTES: usize = 24;

/// Opaque session credential handed out at login/registration time. It
/// carries no claims and is never parsed; its presence alone marks an
/// authenticated session.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn mint() -> SessionToken {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);

        SessionToken(util::base64_engine().encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The store's current authenticated user, if any.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub user: Uuid,
}

impl Session {
    pub fn open(user: &User) -> Session {
        tracing::debug!("opening session for user {}", user.id);

        Session {
            token: SessionToken::mint(),
            user: user.id,
        }
    }
}

use std::convert::TryInto;
use std::path::PathBuf;
use std::{env, fs};

const PASSWORD_SALT: &'static str = "password.salt";

pub type Salt = [u8; 16];

/// Secret material owned by the store. Unlike the persisted collections,
/// the salt lives under its own directory and survives a storage wipe.
#[derive(Debug, Clone)]
pub struct Security {
    pub salt: Salt,
}

#[inline]
fn security_dir() -> PathBuf {
    PathBuf::from(env::var("SECURITY_DIR").unwrap_or("./security".to_string()))
}

impl Security {
    pub fn load() -> Security {
        let dir = security_dir();

        fs::create_dir_all(dir.clone())
            .expect("unable to create directory for storing security information");

        tracing::info!("Loading password salt...");
        let mut salt: Option<Salt> = fs::read(dir.join(PASSWORD_SALT))
            .map(|s| s.try_into().ok())
            .ok()
            .flatten();

        match salt {
            None => {
                tracing::info!(
                    "Salt not found in '{}'. Generating a new password salt.",
                    dir.join(PASSWORD_SALT).display()
                );
                salt = Some(rand::random());

                fs::write(dir.join(PASSWORD_SALT), salt.unwrap()).expect("unable to write salt");
            }
            Some(_) => tracing::info!("Salt found and loaded."),
        }

        Security {
            salt: salt.unwrap(),
        }
    }

    /// Fixed salt, for deterministic construction in tests.
    pub fn with_salt(salt: Salt) -> Security {
        Security { salt }
    }
}

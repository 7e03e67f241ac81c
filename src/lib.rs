use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::error::{ConfigurationError, TrackerError};
use crate::security::Security;
use crate::storage::DirStorage;
use crate::store::Store;

pub mod config;
pub mod data;
pub mod error;
pub mod resp;
pub mod role;
pub mod security;
pub mod seed;
pub mod storage;
pub mod store;
pub mod util;

/// Wires up the application state store: logging, `.env`, configuration,
/// security material, local storage, and (when enabled) the demo dataset.
/// Presentation layers keep the returned [Store] for the whole session and
/// call the operation traits under [data] on it.
pub fn create(log_level: Option<Level>) -> Result<Store, TrackerError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(_)) => {
            let c = Config::default();
            if c.save().is_err() {
                tracing::warn!("Unable to save generated configuration.");
            }
            c
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    tracing::info!("Initializing security information...");
    let security = Security::load();

    tracing::info!("Opening local storage in '{}'...", c.storage_dir.display());
    let storage = DirStorage::open(&c.storage_dir)?;

    let mut store = Store::open(Box::new(storage), security, &c);

    if store.users().is_empty() && c.seed_demo {
        tracing::info!("No users found, seeding demo data...");
        seed::apply(&mut store);
    }

    Ok(store)
}

use crate::error::ConfigurationError;
use crate::util;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

fn default_storage_dir() -> PathBuf {
    PathBuf::from(env::var("STORAGE_DIR").unwrap_or("./data".to_string()))
}

fn default_semester() -> String {
    env::var("SEMESTER_LABEL").unwrap_or("Fall 2025".to_string())
}

#[cfg(debug_assertions)]
fn default_seed_demo() -> bool {
    true
}
#[cfg(not(debug_assertions))]
fn default_seed_demo() -> bool {
    false
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    file_path: PathBuf,

    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Semester label stamped onto newly registered students.
    #[serde(default = "default_semester")]
    pub semester: String,

    /// Populate an empty store with the demo dataset on startup.
    #[serde(default = "default_seed_demo")]
    pub seed_demo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_path: config_dir().join("settings.yml"),
            storage_dir: default_storage_dir(),
            semester: default_semester(),
            seed_demo: default_seed_demo(),
        }
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    pub fn load() -> Result<Config, ConfigurationError> {
        let config_file = util::find_first_subpath(
            config_dir(),
            &["settings.yml", "settings.yaml"],
            Path::exists,
        )
        .ok_or_else(|| ConfigurationError::NotFound(config_dir()))?;

        let file = File::open(&config_file)?;
        let mut config: Config = serde_yaml::from_reader(BufReader::new(file))?;
        config.file_path = config_file;

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigurationError> {
        let file = File::create(&self.file_path)?;
        let mut out = BufWriter::new(file);
        serde_yaml::to_writer(&mut out, self)?;
        out.flush()?;
        Ok(())
    }
}

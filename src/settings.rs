//! Per-user settings.
//!
//! Read from `<config dir>/git-crypt-agessh/config.toml` when present:
//!
//! ```toml
//! identity = "~/.ssh/id_ed25519_work"
//! age_identities = ["~/.config/age/keys.txt"]
//! ```
//!
//! `GIT_CRYPT_AGESSH_CONFIG` points at another file and
//! `GIT_CRYPT_AGESSH_IDENTITY` overrides `identity`.

use std::env;
use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};
use serde::Deserialize;

use crate::error::{GitCryptError, Result};

const APP_DIR: &str = "git-crypt-agessh";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "GIT_CRYPT_AGESSH_";
const DEFAULT_SSH_KEY: &str = ".ssh/id_ed25519";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// SSH private key used to decrypt.
    #[serde(default)]
    pub identity: Option<PathBuf>,
    /// Native age identity files tried in addition to the SSH key.
    #[serde(default)]
    pub age_identities: Vec<PathBuf>,
}

impl Settings {
    /// Load the user's settings, applying environment overrides.
    pub fn load() -> Result<Self> {
        let path = env::var_os(format!("{ENV_PREFIX}CONFIG"))
            .map(PathBuf::from)
            .or_else(default_config_path);

        let mut settings = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(identity) = env::var_os(format!("{ENV_PREFIX}IDENTITY")) {
            settings.identity = Some(PathBuf::from(identity));
        }

        Ok(settings)
    }

    /// Read settings from a TOML file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| GitCryptError::Config("Invalid config path".into()))?;

        Config::builder()
            .add_source(File::new(path_str, FileFormat::Toml))
            .build()
            .and_then(|cfg| cfg.try_deserialize::<Settings>())
            .map_err(|err| {
                GitCryptError::Config(format!("Failed to load {}: {err}", path.display()))
            })
    }

    /// Location of the SSH private key, `~/.ssh/id_ed25519` unless
    /// configured otherwise.
    pub fn ssh_identity_path(&self) -> Result<PathBuf> {
        match &self.identity {
            Some(path) => Ok(expand_home(path)),
            None => dirs::home_dir()
                .map(|home| home.join(DEFAULT_SSH_KEY))
                .ok_or_else(|| {
                    GitCryptError::MissingIdentity(PathBuf::from("~").join(DEFAULT_SSH_KEY))
                }),
        }
    }

    pub fn age_identity_paths(&self) -> Vec<PathBuf> {
        self.age_identities.iter().map(|p| expand_home(p)).collect()
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

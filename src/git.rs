use std::env;
use std::path::{Component, Path, PathBuf};

use git2::{Config, ConfigLevel, ErrorCode, Repository};

use crate::error::{GitCryptError, Result};
use crate::history::{HeadBlob, HeadSource};
use crate::path::PathComponents;

/// Name of the filter and diff driver in git's configuration.
pub const DRIVER: &str = "git-crypt-agessh";

pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open repository at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|_| GitCryptError::NotInGitRepo)?;
        Ok(Self { repo })
    }

    /// Get the git directory path
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Get repository root path
    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or(GitCryptError::Other(
            "Repository has no working directory".into(),
        ))
    }

    /// Turn a path given on the command line (absolute, or relative to the
    /// current directory) into components relative to the repository root.
    ///
    /// The path does not need to exist.
    pub fn components(&self, path: &Path) -> Result<PathComponents> {
        let absolute = if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&env::current_dir()?.join(path))
        };

        let workdir = self.workdir()?;
        let roots = [normalize(workdir), normalize(&workdir.canonicalize()?)];
        let relative = roots
            .iter()
            .find_map(|root| absolute.strip_prefix(root).ok())
            .ok_or_else(|| GitCryptError::PathOutsideRepo(path.to_path_buf()))?;

        Ok(PathComponents::from_segments(
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        ))
    }

    /// Install the filter and diff drivers in the repository's config.
    pub fn install_filters(&self, verbose: bool) -> Result<()> {
        let mut config = self.local_config()?;
        if self.filters_present(&config)? {
            return Err(GitCryptError::AlreadyInitialized(self.git_dir().join("config")));
        }

        let flag = if verbose { " -v" } else { "" };
        config.set_bool(&format!("filter.{DRIVER}.required"), true)?;
        config.set_str(
            &format!("filter.{DRIVER}.smudge"),
            &format!("{DRIVER} smudge{flag} %f"),
        )?;
        config.set_str(
            &format!("filter.{DRIVER}.clean"),
            &format!("{DRIVER} clean{flag} %f"),
        )?;
        config.set_str(&format!("diff.{DRIVER}.textconv"), &format!("{DRIVER} textconv"))?;

        Ok(())
    }

    /// Remove the filter and diff drivers from the repository's config.
    pub fn remove_filters(&self) -> Result<()> {
        let mut config = self.local_config()?;
        if !self.filters_present(&config)? {
            return Err(GitCryptError::NotInitialized);
        }

        for key in driver_keys() {
            match config.remove(&key) {
                Ok(()) => {}
                Err(e) if e.code() == ErrorCode::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// True when any of the driver settings exist in the local config.
    #[cfg(test)]
    fn is_initialized(&self) -> Result<bool> {
        let config = self.local_config()?;
        self.filters_present(&config)
    }

    fn local_config(&self) -> Result<Config> {
        Ok(self.repo.config()?.open_level(ConfigLevel::Local)?)
    }

    fn filters_present(&self, config: &Config) -> Result<bool> {
        for key in driver_keys() {
            match config.get_entry(&key) {
                Ok(_) => return Ok(true),
                Err(e) if e.code() == ErrorCode::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(false)
    }
}

impl HeadSource for GitRepo {
    /// Reads the path straight from the tip commit's tree, the working
    /// directory and index are left alone.
    fn head_blob(&self, path: &PathComponents) -> Result<HeadBlob> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(HeadBlob::Headless);
            }
            Err(e) => return Err(e.into()),
        };

        let tree = head.peel_to_tree()?;
        let entry = match tree.get_path(Path::new(&path.relative())) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(HeadBlob::Absent),
            Err(e) => return Err(e.into()),
        };

        let object = entry.to_object(&self.repo)?;
        Ok(match object.as_blob() {
            Some(blob) => HeadBlob::Present(blob.content().to_vec()),
            None => HeadBlob::Absent,
        })
    }
}

fn driver_keys() -> [String; 4] {
    [
        format!("filter.{DRIVER}.required"),
        format!("filter.{DRIVER}.smudge"),
        format!("filter.{DRIVER}.clean"),
        format!("diff.{DRIVER}.textconv"),
    ]
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

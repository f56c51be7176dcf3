//! Configuration management

use crate::error::{KlogError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "KLOG_CONFIG";

/// Written on first run and handed to the editor
pub const CONFIG_TEMPLATE: &str = "\
# klog configuration
#
# cache: directory holding the local clone of the log repository
# repo:  remote location of the log repository, as passed to `git clone`

[klog]
cache = \"~/.cache/klog\"
repo = \"\"
";

/// On-disk layout: a single `[klog]` table
#[derive(Debug, Deserialize)]
struct ConfigFile {
    klog: Option<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    cache: Option<String>,
    repo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Expanded cache directory
    pub cache: PathBuf,
    /// Remote location of the log repository
    pub repo: String,
}

impl Config {
    /// `$KLOG_CONFIG`, else `~/.config/klogrc`
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        dirs::home_dir()
            .map(|home| home.join(".config").join("klogrc"))
            .ok_or_else(|| KlogError::Config("Cannot determine the home directory".to_string()))
    }

    /// Load and validate the config file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| {
            KlogError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        let section = file.klog.ok_or_else(|| {
            KlogError::Config(format!("missing [klog] section in {}", path.display()))
        })?;

        let cache = Self::required("cache", section.cache, path)?;
        let repo = Self::required("repo", section.repo, path)?;

        let cache = shellexpand::full(&cache).map_err(|e| {
            KlogError::Config(format!("cannot expand cache path '{}': {}", cache, e))
        })?;

        Ok(Config {
            cache: PathBuf::from(cache.into_owned()),
            repo,
        })
    }

    fn required(key: &str, value: Option<String>, path: &Path) -> Result<String> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(KlogError::Config(format!(
                "missing required key '{}' in section [klog] of {}",
                key,
                path.display()
            ))),
        }
    }

    /// Directory name of the local clone: last component of the remote
    /// location without `.git`
    pub fn repo_name(&self) -> String {
        let trimmed = self.repo.trim_end_matches('/');
        let last = trimmed
            .rsplit(['/', ':', '\\'])
            .next()
            .unwrap_or(trimmed);
        let name = last.strip_suffix(".git").unwrap_or(last);

        if name.is_empty() {
            "klog".to_string()
        } else {
            name.to_string()
        }
    }

    /// Local clone of the log repository inside the cache directory
    pub fn repo_dir(&self) -> PathBuf {
        self.cache.join(self.repo_name())
    }
}

//! Repository preparation use case

use crate::error::Result;
use crate::infrastructure::{Config, VersionControl};
use std::fs;
use tracing::{debug, info};

/// Make the local clone ready for use.
///
/// A missing clone is always cloned, even with sync off, since there is
/// nothing to work on otherwise. An existing clone is pulled only with sync.
pub fn prepare<V, F>(config: &Config, sync: bool, open: F) -> Result<V>
where
    V: VersionControl,
    F: FnOnce(std::path::PathBuf) -> V,
{
    let path = config.repo_dir();

    if !path.exists() {
        info!("No local clone at {}", path.display());
        fs::create_dir_all(&config.cache)?;
        return V::clone_from_remote(&config.repo, &path);
    }

    let repo = open(path);
    if sync {
        repo.pull()?;
    } else {
        debug!("Sync disabled, not pulling");
    }
    Ok(repo)
}

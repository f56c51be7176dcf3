use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

pub fn klog_cmd() -> Command {
    let mut cmd = Command::cargo_bin("klog").unwrap();
    cmd.env_remove("KLOG_CONFIG");
    cmd.env_remove("KLOG_LOG");
    cmd.env_remove("EDITOR");
    cmd.env_remove("VISUAL");
    cmd
}

/// Write a config whose clone lives in `<root>/cache/kitchenlog` and return
/// the config path
pub fn write_config(root: &Path) -> PathBuf {
    let path = root.join("klogrc");
    fs::write(
        &path,
        format!(
            "[klog]\ncache = {:?}\nrepo = \"git@example.org:kitchenlog.git\"\n",
            root.join("cache").to_string_lossy()
        ),
    )
    .unwrap();
    path
}

pub fn repo_dir(root: &Path) -> PathBuf {
    root.join("cache").join("kitchenlog")
}

pub fn write_entry(root: &Path, rel_dir: &str, contents: &str) {
    let dir = repo_dir(root).join(rel_dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("entry.txt"), contents).unwrap();
}

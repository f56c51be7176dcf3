//! First-run configuration use case

use crate::error::Result;
use crate::infrastructure::config::CONFIG_TEMPLATE;
use crate::infrastructure::{Config, TextEditor};
use std::fs;
use std::path::Path;
use tracing::info;

/// Load the config at `path`, creating it through the editor on first run.
///
/// The edited template is saved verbatim; validation happens on load, so a
/// template left incomplete is reported as a configuration error.
pub fn load_or_create<E: TextEditor>(path: &Path, editor: &E) -> Result<Config> {
    if !path.exists() {
        info!("No config at {}, creating one", path.display());
        println!(
            "No configuration found, opening a template for {}",
            path.display()
        );

        let contents = editor.edit(CONFIG_TEMPLATE)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, contents)?;
    }

    Config::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KlogError;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct FixedEditor {
        output: &'static str,
        calls: Cell<usize>,
    }

    impl FixedEditor {
        fn new(output: &'static str) -> Self {
            FixedEditor {
                output,
                calls: Cell::new(0),
            }
        }
    }

    impl TextEditor for FixedEditor {
        fn edit(&self, text: &str) -> Result<String> {
            assert_eq!(text, CONFIG_TEMPLATE);
            self.calls.set(self.calls.get() + 1);
            Ok(self.output.to_string())
        }
    }

    const FILLED: &str = "[klog]\ncache = \"/tmp/klog-cache\"\nrepo = \"git@example.org:kitchenlog.git\"\n";

    #[test]
    fn test_first_run_writes_edited_template() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".config").join("klogrc");
        let editor = FixedEditor::new(FILLED);

        let config = load_or_create(&path, &editor).unwrap();

        assert_eq!(editor.calls.get(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), FILLED);
        assert_eq!(config.repo, "git@example.org:kitchenlog.git");
    }

    #[test]
    fn test_existing_config_skips_editor() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("klogrc");
        fs::write(&path, FILLED).unwrap();
        let editor = FixedEditor::new("unused");

        load_or_create(&path, &editor).unwrap();
        assert_eq!(editor.calls.get(), 0);
    }

    #[test]
    fn test_incomplete_template_is_saved_but_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("klogrc");
        let editor = FixedEditor::new(CONFIG_TEMPLATE);

        let result = load_or_create(&path, &editor);
        assert!(matches!(result, Err(KlogError::Config(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);
    }
}

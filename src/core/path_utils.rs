/*
 * Resolves and creates the per-user directories the installation keeps its
 * files in: the local config directory (config.json, the log file) and the
 * local data directory (the session store). Both come from
 * `directories::ProjectDirs` without an organization qualifier.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/*
 * Ensures `path` exists as a directory, creating it and any missing parents.
 * Returns `None` (after logging) if it cannot be created.
 */
pub fn ensure_dir(path: &Path) -> Option<PathBuf> {
    if path.is_dir() {
        log::trace!("PathUtils: Directory already exists: {path:?}");
        return Some(path.to_path_buf());
    }
    match fs::create_dir_all(path) {
        Ok(()) => {
            log::debug!("PathUtils: Created directory: {path:?}");
            Some(path.to_path_buf())
        }
        Err(e) => {
            log::error!("PathUtils: Failed to create directory {path:?}: {e}");
            None
        }
    }
}

pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Resolving local config dir for '{app_name}'");
    ProjectDirs::from("", "", app_name).and_then(|dirs| ensure_dir(dirs.config_local_dir()))
}

pub fn get_base_app_data_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Resolving local data dir for '{app_name}'");
    ProjectDirs::from("", "", app_name).and_then(|dirs| ensure_dir(dirs.data_local_dir()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_creates_nested_directories() {
        let root = tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        assert_eq!(ensure_dir(&nested), Some(nested.clone()));
        assert!(nested.is_dir());
    }

    #[test]
    fn test_ensure_dir_returns_existing() {
        let root = tempdir().unwrap();
        assert_eq!(ensure_dir(root.path()), Some(root.path().to_path_buf()));
    }

    #[test]
    fn test_ensure_dir_fails_when_a_file_is_in_the_way() {
        let root = tempdir().unwrap();
        let blocker = root.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();
        assert_eq!(ensure_dir(&blocker.join("child")), None);
    }
}

//! Crash-time autosave: snapshot format, candidate scanning, recovery
//! session control, and the scheduled-write loop.

pub mod recovery;
pub mod scan;
pub mod scheduler;
pub mod snapshot;

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::platform;

/// Every autosave artifact carries this suffix; the scanner matches on it.
pub const AUTOSAVE_SUFFIX: &str = ".autosave";

/// Derive the scheduler's write target. The target is always a distinct
/// `.autosave`-suffixed path, never the project file itself; without a known
/// project path it falls back to a timestamped name in the temp directory.
pub fn autosave_target(project_path: Option<&Path>) -> PathBuf {
    match project_path {
        Some(project) => {
            let mut name = project.as_os_str().to_os_string();
            name.push(AUTOSAVE_SUFFIX);
            PathBuf::from(name)
        }
        None => platform::temp_dir().join(format!(
            "autosave_{}{}",
            Utc::now().timestamp_millis(),
            AUTOSAVE_SUFFIX
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_appends_suffix_to_project_path() {
        let target = autosave_target(Some(Path::new("/work/film.vlm")));
        assert_eq!(target, PathBuf::from("/work/film.vlm.autosave"));
    }

    #[test]
    fn test_target_never_equals_project_path() {
        let project = Path::new("/work/film.vlm");
        assert_ne!(autosave_target(Some(project)), project);
    }

    #[test]
    fn test_fallback_target_lands_in_temp() {
        let target = autosave_target(None);
        assert!(target.starts_with(platform::temp_dir()));
        let name = target.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("autosave_"));
        assert!(name.ends_with(AUTOSAVE_SUFFIX));
    }
}

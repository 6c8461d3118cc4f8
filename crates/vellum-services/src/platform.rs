use std::path::PathBuf;

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/vellum/ (XDG standard)
    // instead of macOS Application Support for consistency
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join("vellum")
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vellum")
    }
}

pub fn config_dir() -> PathBuf {
    // On macOS and Linux, always use ~/.config/vellum/
    // (avoid macOS Application Support folder for consistency)
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("vellum")
    }
    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vellum")
    }
}

pub fn temp_dir() -> PathBuf {
    std::env::temp_dir()
}

/// Directories inspected for crash-time autosave artifacts, in scan order:
/// the process working directory, the system temp directory, and the
/// application data directory.
pub fn autosave_scan_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::with_capacity(3);
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    dirs.push(temp_dir());
    dirs.push(data_dir());
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_dirs_include_temp_and_data() {
        let dirs = autosave_scan_dirs();
        assert!(dirs.contains(&temp_dir()));
        assert!(dirs.contains(&data_dir()));
        assert!(dirs.len() >= 2);
    }
}

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

const APP_NAME: &str = "eidx";
const STATE_FILE: &str = "state.json";

/// Get the application data directory for storing registry snapshots
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Default location of the registry snapshot file
pub fn default_state_path() -> Result<PathBuf> {
    Ok(get_app_data_dir()?.join(STATE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_path_shape() {
        let path = default_state_path().unwrap();
        assert!(path.ends_with(format!("{APP_NAME}/{STATE_FILE}")) || path.ends_with(STATE_FILE));
        assert!(path.parent().unwrap().exists());
    }
}

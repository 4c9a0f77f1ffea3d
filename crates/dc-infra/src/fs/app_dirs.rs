use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the driveclip configuration root directory.
///
/// - macOS: ~/Library/Application Support/driveclip
/// - Windows: %APPDATA%\driveclip
/// - Linux: $XDG_CONFIG_HOME/driveclip or ~/.config/driveclip
///
/// This function does not create directories; the caller decides when.
fn config_root() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Failed to get platform config directory")?;
    Ok(base.join("driveclip"))
}

/// Default location of the settings file.
pub fn default_settings_path() -> Result<PathBuf> {
    Ok(config_root()?.join("settings.json"))
}

/// Directory for rolling log files.
pub fn log_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Failed to get platform data directory")?;
    Ok(base.join("driveclip").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_live_under_the_app_directory() {
        let settings = default_settings_path().expect("settings path");
        assert!(settings.ends_with("driveclip/settings.json") || settings.ends_with("settings.json"));
        assert!(settings.components().any(|c| c.as_os_str() == "driveclip"));

        let logs = log_dir().expect("log dir");
        assert!(logs.ends_with("logs"));
        assert!(logs.components().any(|c| c.as_os_str() == "driveclip"));
    }
}

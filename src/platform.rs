// marksync platform paths
// Config: ~/.config/marksync (Linux), ~/Library/Application Support/Marksync
// (macOS), %APPDATA%/Marksync (Windows).

use std::env;
use std::path::PathBuf;

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Returns the platform-specific configuration directory for marksync.
///
/// - **Linux**: `$XDG_CONFIG_HOME/marksync` if set, else `~/.config/marksync`
/// - **macOS**: `~/Library/Application Support/Marksync`
/// - **Windows**: `%APPDATA%/Marksync`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg).join("marksync")
        } else {
            home_dir().join(".config").join("marksync")
        }
    }
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join("Marksync")
    }
    #[cfg(target_os = "windows")]
    {
        let appdata = env::var("APPDATA")
            .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
        PathBuf::from(appdata).join("Marksync")
    }
}

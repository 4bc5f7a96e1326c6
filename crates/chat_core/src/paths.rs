use std::path::PathBuf;

/// Config directory (~/.portfolio-chat)
pub fn config_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(".portfolio-chat")
}

/// config.json inside the config directory
pub fn config_json_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Project-local TOML config, relative to the working directory
pub const LOCAL_CONFIG_FILE: &str = "portfolio-chat.toml";

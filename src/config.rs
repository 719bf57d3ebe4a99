use std::path::{Path, PathBuf};

use color_eyre::eyre::{OptionExt, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::services::spotify::client::SpotifyApiCredentials;

const APP_DIR: &str = "playlist-mirror";

pub const DEFAULT_CONFIG: &str = r#"# playlist-mirror configuration

# Where update snapshots of the target playlist are written.
# Defaults to the platform data directory.
# backup_directory = "~/playlist-backups"

[spotify]
# App credentials from https://developer.spotify.com/dashboard
# client_id = ""
# client_secret = ""
# Optional user tokens, required for listing your own playlists
# access_token = ""
# refresh_token = ""
# Read public playlists from the web player when the API fails
web_fallback = true

[youtube_music]
# JSON object of request headers copied from an authenticated music.youtube.com session.
# Defaults to browser.json next to this file.
# headers_file = "~/.config/playlist-mirror/browser.json"
"#;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    backup_directory: Option<String>,
    spotify: SpotifyConfig,
    youtube_music: YouTubeMusicConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub web_fallback: bool,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            access_token: None,
            refresh_token: None,
            web_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeMusicConfig {
    pub headers_file: Option<String>,
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Default config file location
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join(APP_DIR).join("config.toml"))
    }

    /// Load an explicitly given config file, or the default one if it exists.
    /// A missing default file yields defaults so that environment variables alone suffice.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the commented default config. Returns false if the file already exists.
    pub fn create_default(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).wrap_err(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }
        std::fs::write(path, DEFAULT_CONFIG)
            .wrap_err(format!("Failed to write config file: {}", path.display()))?;
        Ok(true)
    }

    pub fn backup_directory(&self) -> Result<PathBuf> {
        match &self.backup_directory {
            Some(dir) => Ok(expand_path(dir)),
            None => dirs::data_dir()
                .map(|path| path.join(APP_DIR).join("backups"))
                .ok_or_eyre("Could not determine a backup directory, set backup_directory"),
        }
    }

    pub fn headers_file(&self) -> Result<PathBuf> {
        match &self.youtube_music.headers_file {
            Some(file) => Ok(expand_path(file)),
            None => dirs::config_dir()
                .map(|path| path.join(APP_DIR).join("browser.json"))
                .ok_or_eyre("Could not determine the headers file, set youtube_music.headers_file"),
        }
    }

    pub fn web_fallback(&self) -> bool {
        self.spotify.web_fallback
    }

    /// Spotify credentials, falling back to `SPOTIFY_*` environment variables for unset values
    pub fn spotify_credentials(&self) -> SpotifyApiCredentials {
        self.spotify_credentials_with(|name| std::env::var(name).ok())
    }

    fn spotify_credentials_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> SpotifyApiCredentials {
        let pick = |configured: &Option<String>, var: &str| {
            configured
                .clone()
                .or_else(|| env(var))
                .filter(|value| !value.is_empty())
        };

        SpotifyApiCredentials {
            client_id: pick(&self.spotify.client_id, "SPOTIFY_CLIENT_ID"),
            client_secret: pick(&self.spotify.client_secret, "SPOTIFY_CLIENT_SECRET"),
            access_token: pick(&self.spotify.access_token, "SPOTIFY_ACCESS_TOKEN"),
            refresh_token: pick(&self.spotify.refresh_token, "SPOTIFY_REFRESH_TOKEN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(config.web_fallback());
        assert!(config.backup_directory.is_none());
        assert!(config.youtube_music.headers_file.is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
backup_directory = "/var/backups/playlists"

[spotify]
client_id = "id"
client_secret = "secret"
web_fallback = false

[youtube_music]
headers_file = "/etc/headers.json"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(
            config.backup_directory().unwrap(),
            PathBuf::from("/var/backups/playlists")
        );
        assert_eq!(config.headers_file().unwrap(), PathBuf::from("/etc/headers.json"));
        assert!(!config.web_fallback());
        assert_eq!(config.spotify.client_id.as_deref(), Some("id"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_invalid_toml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "backup_directory = [").unwrap();

        let error = Config::from_file(&path).unwrap_err();

        assert!(format!("{error}").contains("Failed to parse config file"));
    }

    #[test]
    fn test_create_default_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(Config::create_default(&path).unwrap());
        std::fs::write(&path, "# edited").unwrap();
        assert!(!Config::create_default(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited");
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/backups"), home.join("backups"));
        }
    }

    #[test]
    fn test_spotify_credentials_env_fallback() {
        let config: Config = toml::from_str(
            r#"
[spotify]
client_id = "from-file"
access_token = ""
"#,
        )
        .unwrap();

        let creds = config.spotify_credentials_with(|name| match name {
            "SPOTIFY_CLIENT_ID" => Some("from-env".into()),
            "SPOTIFY_CLIENT_SECRET" => Some("secret-env".into()),
            _ => None,
        });

        assert_eq!(creds.client_id.as_deref(), Some("from-file"));
        assert_eq!(creds.client_secret.as_deref(), Some("secret-env"));
        assert!(creds.access_token.is_none());
        assert!(creds.refresh_token.is_none());
    }
}

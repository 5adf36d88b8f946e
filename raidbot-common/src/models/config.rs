// File: raidbot-common/src/models/config.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use raidbot_obs::ObsInstance;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

const DEFAULT_OBS_PORT: u16 = 4455;

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Contents of `config.json`. Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidConfig {
    pub obs_host: String,
    #[serde(default)]
    pub obs_password: Option<String>,
    /// Target scene (switch mode) or overlay source name (nested mode).
    pub obs_scene_name: String,
    #[serde(default)]
    pub show_game: bool,
    #[serde(default)]
    pub separate_game: bool,
    #[serde(default)]
    pub nested: bool,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// The two booleans that shape the artifact text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayOptions {
    pub show_game: bool,
    pub separate_game: bool,
}

impl RaidConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let cfg: RaidConfig = serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("invalid config: {e}")))?;
        Ok(cfg)
    }

    /// `TWITCH_CLIENT_ID` / `TWITCH_CLIENT_SECRET` win over the file when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var("TWITCH_CLIENT_ID") {
            if !id.is_empty() {
                self.client_id = id;
            }
        }
        if let Ok(secret) = std::env::var("TWITCH_CLIENT_SECRET") {
            if !secret.is_empty() {
                self.client_secret = secret;
            }
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.obs_scene_name.trim().is_empty() {
            return Err(Error::Config("obsSceneName must not be empty".into()));
        }
        if self.client_id.trim().is_empty() {
            return Err(Error::Config("clientId must not be empty".into()));
        }
        self.obs_instance()?;
        Ok(())
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            show_game: self.show_game,
            separate_game: self.separate_game,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Accepts `ws://host:port`, `host:port` or a bare host.
    pub fn obs_instance(&self) -> Result<ObsInstance, Error> {
        let raw = self.obs_host.trim();
        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("ws://{raw}")
        };
        let url = Url::parse(&with_scheme)?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::Config(format!("obsHost '{}' has no host", self.obs_host)))?
            .to_string();
        let password = self
            .obs_password
            .clone()
            .filter(|p| !p.is_empty());

        Ok(ObsInstance {
            host,
            port: url.port().unwrap_or(DEFAULT_OBS_PORT),
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RaidConfig {
        RaidConfig::from_json(
            r#"{
                "obsHost": "ws://127.0.0.1:4455",
                "obsPassword": "hunter2",
                "obsSceneName": "Raid",
                "showGame": true,
                "separateGame": false,
                "nested": true,
                "clientId": "cid",
                "clientSecret": "secret"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let cfg = base();
        assert_eq!(cfg.settle_delay(), Duration::from_millis(2000));
        assert_eq!(cfg.output_dir, PathBuf::from("."));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn obs_host_variants() {
        let mut cfg = base();
        let inst = cfg.obs_instance().unwrap();
        assert_eq!((inst.host.as_str(), inst.port), ("127.0.0.1", 4455));
        assert_eq!(inst.password.as_deref(), Some("hunter2"));

        cfg.obs_host = "localhost:4460".into();
        let inst = cfg.obs_instance().unwrap();
        assert_eq!((inst.host.as_str(), inst.port), ("localhost", 4460));

        cfg.obs_host = "studio.lan".into();
        cfg.obs_password = Some(String::new());
        let inst = cfg.obs_instance().unwrap();
        assert_eq!((inst.host.as_str(), inst.port), ("studio.lan", 4455));
        assert!(inst.password.is_none());
    }

    #[test]
    fn empty_scene_name_is_rejected() {
        let mut cfg = base();
        cfg.obs_scene_name = " ".into();
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }
}

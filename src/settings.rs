//! Runtime settings
//!
//! Read from a JSON file at startup. Gameplay tuning stays in `consts`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::TICKS_PER_SECOND;
use crate::error::ConfigError;

/// What the binary runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Relay only, no simulation
    Server,
    /// Join a relay and play a match
    Client,
    /// Bots fighting on the title screen
    #[default]
    Demo,
    Tutorial,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Server => "server",
            GameMode::Client => "client",
            GameMode::Demo => "demo",
            GameMode::Tutorial => "tutorial",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "server" | "relay" => Some(GameMode::Server),
            "client" | "join" => Some(GameMode::Client),
            "demo" => Some(GameMode::Demo),
            "tutorial" => Some(GameMode::Tutorial),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: GameMode,

    // === Simulation ===
    /// Ticks per second
    pub tick_rate: u32,
    /// Seed for the stage RNG; 0 picks one from the clock
    pub seed: u64,
    pub tanks_per_team: usize,
    /// Demo/tutorial length in ticks; 0 runs until interrupted
    pub demo_ticks: u64,

    // === Network ===
    pub server_addr: String,
    pub player_name: String,
    /// Relay slots
    pub max_connections: usize,

    // === Presentation ===
    /// Asset directory; none runs headless
    pub assets_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::Demo,

            tick_rate: TICKS_PER_SECOND,
            seed: 0,
            tanks_per_team: 2,
            demo_ticks: 20 * TICKS_PER_SECOND as u64,

            server_addr: "127.0.0.1:8888".to_string(),
            player_name: "player".to_string(),
            max_connections: 4,

            assets_dir: None,
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Like [`Settings::load`], falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(ConfigError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Configured seed, or one derived from the clock when unset
    pub fn effective_seed(&self) -> u64 {
        if self.seed != 0 {
            return self.seed;
        }
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    }
}

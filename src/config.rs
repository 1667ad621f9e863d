//! `config.json` for the terminal front-end.
//!
//! Every field has a default, so a missing file or a partial file is fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::message::{validate_channel, validate_value};

pub const CONFIG_ENV: &str = "MIDI_TOOLS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Client name announced to the MIDI backend.
    pub client_name: String,
    /// Output port id, or a substring of its name. Empty = ask.
    pub output_port: String,
    /// Channel 0-15.
    pub channel: u8,
    /// Note On velocity for the `on` command when none is typed.
    pub velocity: u8,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            client_name: "midi-tools".to_string(),
            output_port: String::new(),
            channel: 0,
            velocity: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub midi: MidiConfig,
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            midi: MidiConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when `path` does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_json(&text).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Loads from `$MIDI_TOOLS_CONFIG`, falling back to `./config.json`.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load(&path)
    }

    fn validate(&self) -> Result<()> {
        validate_channel(self.midi.channel).map_err(|e| Error::Config(e.to_string()))?;
        validate_value(self.midi.velocity, "velocity").map_err(|e| Error::Config(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_json(r#"{"midi": {"channel": 9}}"#).unwrap();
        assert_eq!(config.midi.channel, 9);
        assert_eq!(config.midi.velocity, 100);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn out_of_range_channel_rejected() {
        let err = Config::from_json(r#"{"midi": {"channel": 16}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Invalid MIDI channel: 16"));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_file_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}

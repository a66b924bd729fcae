use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::midi::MidiMapping;

impl std::fmt::Display for AudioSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Input Left Port: {}", self.input_left_port)?;
        writeln!(f, "Input Right Port: {}", self.input_right_port)?;
        writeln!(f, "Output Left Port: {}", self.output_left_port)?;
        writeln!(f, "Output Right Port: {}", self.output_right_port)?;
        writeln!(f, "Buffer Size: {}", self.buffer_size)?;
        writeln!(f, "Sample Rate: {}", self.sample_rate)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioSettings {
    pub input_left_port: String,
    pub input_right_port: String,
    pub output_left_port: String,
    pub output_right_port: String,
    pub buffer_size: u32,
    pub sample_rate: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            input_left_port: "system:capture_1".to_string(),
            input_right_port: "system:capture_2".to_string(),
            output_left_port: "system:playback_1".to_string(),
            output_right_port: "system:playback_2".to_string(),
            buffer_size: 128,
            sample_rate: 48000,
        }
    }
}

impl std::fmt::Display for MidiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Controller Name: {}",
            self.controller_name.as_deref().unwrap_or("None")
        )?;
        writeln!(f, "Program Change Selects Effect: {}", self.program_change)?;
        writeln!(f, "Mappings:")?;
        for mapping in &self.mappings {
            writeln!(f, "  {mapping:?}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MidiSettings {
    /// The name of the selected MIDI controller
    pub controller_name: Option<String>,
    /// Whether program change messages select effects by registry index
    #[serde(default = "default_true")]
    pub program_change: bool,
    /// CC to knob mappings
    #[serde(default)]
    pub mappings: Vec<MidiMapping>,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            controller_name: None,
            program_change: true,
            mappings: Vec::new(),
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Host configuration. Only the environment is stored here; the selected
/// effect and knob positions are deliberately not persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Settings {
    pub audio: AudioSettings,
    #[serde(default)]
    pub midi: MidiSettings,
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "------------------------------")?;

        writeln!(f, "Audio Settings:")?;
        writeln!(f, "{}", self.audio)?;

        writeln!(f, "MIDI Settings:")?;
        writeln!(f, "{}", self.midi)?;
        Ok(())
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_settings_path())
    }

    pub fn load_from(settings_path: &Path) -> Result<Self> {
        if settings_path.exists() {
            let contents =
                fs::read_to_string(settings_path).context("Failed to read settings file")?;
            let settings: Self =
                serde_json::from_str(&contents).context("Failed to parse settings")?;
            debug!("Loaded settings from {settings_path:?}");
            Ok(settings)
        } else {
            info!("No settings file found, using defaults");
            let settings = Self::default();
            // Try to save defaults, but don't fail if we can't
            let _ = settings.save_to(settings_path);
            Ok(settings)
        }
    }

    pub fn save_to(&self, settings_path: &Path) -> Result<()> {
        // Ensure the config directory exists
        if let Some(parent) = settings_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(settings_path, json).context("Failed to write settings file")?;

        debug!("Saved settings to {settings_path:?}");
        Ok(())
    }

    pub fn get_settings_path() -> PathBuf {
        const SETTINGS_FILENAME: &str = "settings.json";

        // Try to use XDG config directory on Linux
        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(config_dir)
                .join("fxslot")
                .join(SETTINGS_FILENAME)
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("fxslot")
                .join(SETTINGS_FILENAME)
        } else {
            // Fallback to current directory
            PathBuf::from(".").join(SETTINGS_FILENAME)
        }
    }

    /// Half the deal of working with PipeWire JACK is setting the right environment variables
    pub fn apply_to_environment(&self) {
        unsafe {
            // Try and configure PipeWire JACK settings
            std::env::set_var("PIPEWIRE_LATENCY", self.get_pipewire_latency());
            if std::env::var("JACK_PROMISCUOUS_SERVER").is_err() {
                std::env::set_var("JACK_PROMISCUOUS_SERVER", "pipewire");
            }
        }
    }

    fn get_pipewire_latency(&self) -> String {
        format!("{}/{}", self.audio.buffer_size, self.audio.sample_rate)
    }
}

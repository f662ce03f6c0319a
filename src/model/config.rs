use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Configuration from guide.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuideConfig {
    #[serde(default)]
    pub guide: GuideInfo,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideInfo {
    #[serde(default = "default_guide_name")]
    pub name: String,
}

impl Default for GuideInfo {
    fn default() -> Self {
        GuideInfo {
            name: default_guide_name(),
        }
    }
}

fn default_guide_name() -> String {
    "guide".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Data file, relative to the guide/ directory
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            data_file: default_data_file(),
        }
    }
}

fn default_data_file() -> String {
    "data.json".to_string()
}

/// Pointer precision of the input device driving the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    /// Mouse-like: a press must be held before it turns into a drag
    #[default]
    Fine,
    /// Touch-like: a press on a handle arms immediately
    Coarse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionConfig {
    #[serde(default)]
    pub pointer: PointerKind,
    /// Hold time before a press on a handle becomes a drag (fine pointers)
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
    /// Movement (cells) in either axis that turns a pending press into a scroll
    #[serde(default = "default_move_threshold")]
    pub move_threshold: u16,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        InteractionConfig {
            pointer: PointerKind::default(),
            long_press_ms: default_long_press_ms(),
            move_threshold: default_move_threshold(),
        }
    }
}

impl InteractionConfig {
    pub fn long_press_delay(&self) -> Duration {
        match self.pointer {
            PointerKind::Fine => Duration::from_millis(self.long_press_ms),
            PointerKind::Coarse => Duration::ZERO,
        }
    }
}

fn default_long_press_ms() -> u64 {
    200
}

fn default_move_threshold() -> u16 {
    6
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// tracing filter directive; `GUIDE_LOG` overrides it
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Console appearance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Color overrides by theme slot name, as "#RRGGBB"
    #[serde(default)]
    pub colors: IndexMap<String, String>,
}

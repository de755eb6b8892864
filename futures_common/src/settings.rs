//! Persisted board settings.
//!
//! Settings live in a JSON file; every field is optional and falls back to its
//! default. The core only reads them, except for the sort order which is written
//! back whenever the user cycles it.
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::label::LabelFormat;
use crate::result::Result;
use crate::sort::SortMode;

/// Default color for rising records.
pub const DEFAULT_RISE_COLOR: &str = "#ff785d";
/// Default color for falling records.
pub const DEFAULT_FALL_COLOR: &str = "#95ec69";
/// Default cap on per-code retries after a failed batch.
pub const DEFAULT_MAX_FANOUT: usize = 64;

/// Board configuration as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Futures codes tracked by the service, in request order.
    pub futures: Vec<String>,
    /// Futures codes pinned to status-bar slots, in slot order.
    pub status_bar_futures: Vec<String>,
    /// Stock codes pinned to status-bar slots, in slot order.
    pub status_bar_stocks: Vec<String>,
    /// Ordering applied after each fetch.
    pub future_sort: SortMode,
    /// Hide every status-bar slot.
    pub hide_status_bar: bool,
    /// Hide the futures slots.
    pub hide_status_bar_future: bool,
    /// Hide the stock slots.
    pub hide_status_bar_stock: bool,
    /// Slot color for rising records.
    pub rise_color: String,
    /// Slot color for falling records.
    pub fall_color: String,
    /// Label templates.
    pub label_format: LabelFormat,
    /// Maximum number of single-code retries after a batch failure.
    pub max_fanout: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            futures: Vec::new(),
            status_bar_futures: Vec::new(),
            status_bar_stocks: Vec::new(),
            future_sort: SortMode::Normal,
            hide_status_bar: false,
            hide_status_bar_future: false,
            hide_status_bar_stock: false,
            rise_color: DEFAULT_RISE_COLOR.to_string(),
            fall_color: DEFAULT_FALL_COLOR.to_string(),
            label_format: LabelFormat::default(),
            max_fanout: DEFAULT_MAX_FANOUT,
        }
    }
}

impl Settings {
    /// Load settings from `path`, returning defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Settings> {
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        let text = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&text)?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings to `path` as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"futures":["RB2405"],"future_sort":-1}"#).unwrap();
        assert_eq!(settings.futures, vec!["RB2405"]);
        assert_eq!(settings.future_sort, SortMode::Desc);
        assert_eq!(settings.rise_color, DEFAULT_RISE_COLOR);
        assert_eq!(settings.max_fanout, DEFAULT_MAX_FANOUT);
        assert_eq!(settings.label_format, LabelFormat::default());
    }

    #[test]
    fn save_then_load_keeps_sort_order() {
        let path = std::env::temp_dir().join(format!("futures-board-{}.json", std::process::id()));
        let settings = Settings {
            future_sort: SortMode::Asc,
            status_bar_futures: vec!["AG2412".to_string()],
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn absent_file_gives_defaults() {
        let loaded = Settings::load(Path::new("/nonexistent/futures-board.json")).unwrap();
        assert_eq!(loaded, Settings::default());
    }
}

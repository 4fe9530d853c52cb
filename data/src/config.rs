use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::{Deserialize, Serialize};

pub const DEFAULT_DATA_FILE: &str = "./NVDA.csv";
pub const DEFAULT_LOG_LEVEL: &str = "debug";
pub const DEFAULT_LOG_MAX_SIZE_MB: u64 = 10;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub data_file: PathBuf,
    pub window: WindowSpec,
    /// Parsed as a `log::Level` by the logger.
    pub log_level: String,
    /// The log file is never allowed to grow past this.
    pub log_max_size_mb: u64,
    pub chart: ChartConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            window: WindowSpec::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_max_size_mb: DEFAULT_LOG_MAX_SIZE_MB,
            chart: ChartConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct WindowSpec {
    pub width: f32,
    pub height: f32,
}

impl WindowSpec {
    pub fn size(&self) -> iced_core::Size {
        iced_core::Size::new(self.width, self.height)
    }
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    /// Narrowest visible window, in candles.
    pub min_view_width: f32,
    pub initial_visible_bars: usize,
    /// Share of the visible width moved per arrow key press.
    pub pan_fraction: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    pub grid_lines: usize,
    /// Target horizontal pixels per date label.
    pub label_spacing: f32,
    pub margin_x: f32,
    pub margin_y: f32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            min_view_width: 5.0,
            initial_visible_bars: 30,
            pan_fraction: 0.1,
            zoom_in_factor: 0.95,
            zoom_out_factor: 1.05,
            grid_lines: 5,
            label_spacing: 50.0,
            margin_x: 0.05,
            margin_y: 0.05,
        }
    }
}

pub fn read(path: &Path) -> Result<Config, Error> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "chart": { "grid_lines": 8 }, "log_level": "info" }"#)
                .unwrap();

        assert_eq!(config.chart.grid_lines, 8);
        assert_eq!(config.chart.min_view_width, 5.0);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(config.window, WindowSpec::default());
        assert_eq!(config.log_max_size_mb, DEFAULT_LOG_MAX_SIZE_MB);
    }

    #[test]
    fn log_size_cap_is_configurable() {
        let config: Config = serde_json::from_str(r#"{ "log_max_size_mb": 2 }"#).unwrap();

        assert_eq!(config.log_max_size_mb, 2);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = read(Path::new("/definitely/not/here.json")).unwrap_err();

        assert!(err.is_not_found());
    }
}

pub mod annotation;
pub mod chart;
pub mod config;
pub mod interaction;
pub mod log;

pub use config::Config;
pub use interaction::{Action, Controller, Input};

use std::path::PathBuf;

pub const CONFIG_FILE: &str = "candleview.json";

const APP_DIR: &str = "candleview";

/// Location of a file inside the per-user application directory, or the
/// directory itself when `path_name` is `None`.
pub fn data_path(path_name: Option<&str>) -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    let app_dir = base.join(APP_DIR);

    match path_name {
        Some(name) => app_dir.join(name),
        None => app_dir,
    }
}

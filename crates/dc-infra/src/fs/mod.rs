mod app_dirs;

pub use app_dirs::{default_settings_path, log_dir};

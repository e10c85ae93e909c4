use std::fs::{self, OpenOptions};
use std::path::Path;

use env_logger::{Builder, Env, Target};

use crate::app_dirs::AppDirs;

/// Sends log output to `keystride.log` in the state directory. The terminal
/// belongs to the TUI, so nothing is written to stderr. Level comes from
/// `RUST_LOG` and defaults to `warn`.
pub fn init() {
    match AppDirs::log_path() {
        Some(path) => init_with_file(&path),
        None => {
            let _ = Builder::new()
                .filter_level(log::LevelFilter::Off)
                .try_init();
        }
    }
}

pub fn init_with_file(path: &Path) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));

    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            // no log file, stay quiet rather than corrupt the screen
            builder.filter_level(log::LevelFilter::Off);
        }
    }

    let _ = builder.try_init();
}

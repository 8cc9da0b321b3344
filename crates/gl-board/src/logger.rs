//! One log file per run, written through simplelog
//!
//! Debug builds log next to the binary's working directory, release builds
//! into the cache directory (`~/.cache/gl-board/` on Linux). Nothing goes to
//! the terminal: stdout carries command output and host responses.

use anyhow::{Context, Result};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::{env, fs::File, path::PathBuf, str::FromStr};

const LEVEL_ENV: &str = "RUST_LOG";

fn log_dir() -> PathBuf {
    if cfg!(debug_assertions) {
        return PathBuf::new();
    }
    gl_board_config::cache_dir().unwrap_or_default()
}

fn log_file_name(started: chrono::DateTime<chrono::Local>) -> String {
    format!("gl-board-{}.log", started.format("%Y%m%d-%H%M%S"))
}

/// Level named by `RUST_LOG`; anything unrecognised logs at `Info`
fn parse_level(value: &str) -> LevelFilter {
    LevelFilter::from_str(value.trim()).unwrap_or(LevelFilter::Info)
}

fn level_from_env() -> LevelFilter {
    env::var(LEVEL_ENV)
        .map(|value| parse_level(&value))
        .unwrap_or(LevelFilter::Debug)
}

/// Install the file logger and return the path it writes to
pub fn init() -> Result<PathBuf> {
    let path = log_dir().join(log_file_name(chrono::Local::now()));

    let mut builder = ConfigBuilder::new();
    builder.set_time_format_rfc3339();
    // Keep UTC when the local offset cannot be determined
    let _ = builder.set_time_offset_to_local();

    let file =
        File::create(&path).with_context(|| format!("Cannot create {}", path.display()))?;
    WriteLogger::init(level_from_env(), builder.build(), file)
        .context("A logger is already installed")?;

    Ok(path)
}

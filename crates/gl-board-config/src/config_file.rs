//! Locating `.gl-board.toml`

use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// File name looked up in the working and home directories
pub const CONFIG_FILE_NAME: &str = ".gl-board.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "GL_BOARD_CONFIG";

/// A config file that was found and read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub content: String,
}

/// Places a config file may live, most specific first
///
/// `$GL_BOARD_CONFIG` when set, then the working directory, then home.
pub fn candidate_paths() -> Vec<PathBuf> {
    let explicit = env::var_os(CONFIG_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    let home = dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME));

    explicit
        .into_iter()
        .chain(std::iter::once(PathBuf::from(CONFIG_FILE_NAME)))
        .chain(home)
        .collect()
}

/// Read the first candidate that exists
pub fn read_first<P: AsRef<Path>>(candidates: &[P]) -> Option<ConfigSource> {
    candidates.iter().find_map(|candidate| {
        let path = candidate.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Some(ConfigSource {
                path: path.to_path_buf(),
                content,
            }),
            Err(e) => {
                log::trace!("No config at {}: {}", path.display(), e);
                None
            }
        }
    })
}

pub fn load_config_file() -> Option<ConfigSource> {
    read_first(&candidate_paths())
}

//! Locating and loading the project configuration.

use std::path::{Path, PathBuf};

use nocmap_config::{ProjectConfig, CONFIG_FILE_NAME};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing
/// `nocmap.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Loads the configuration selected by the global flags.
///
/// `--config` may name a file or a directory holding `nocmap.toml`; without
/// it the current directory and its parents are searched. Returns the
/// project directory, against which relative output paths are resolved,
/// together with the parsed configuration.
pub fn load_project(
    global: &GlobalArgs,
) -> Result<(PathBuf, ProjectConfig), Box<dyn std::error::Error>> {
    match global.config {
        Some(ref config_path) => {
            let path = PathBuf::from(config_path);
            if path.is_file() {
                let config = nocmap_config::load_config_file(&path)?;
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                Ok((dir, config))
            } else {
                let config = nocmap_config::load_config(&path)?;
                Ok((path, config))
            }
        }
        None => {
            let dir = find_project_root(&std::env::current_dir()?)?;
            let config = nocmap_config::load_config(&dir)?;
            Ok((dir, config))
        }
    }
}

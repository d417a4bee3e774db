//! Parsing and validation of `nocmap.toml` mapping configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`ProjectConfig`]: mesh topology, energy model, mapping mode, annealing
//! schedule overrides, the cores to place and the traffic between them.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME, MAX_MESH_NODES,
};
pub use types::*;

//! `nocmap init`: project scaffolding command.
//!
//! Writes a `nocmap.toml` describing a square mesh, a small pipeline of cores
//! and the traffic between them, ready to be edited and mapped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use nocmap_config::{CONFIG_FILE_NAME, MAX_MESH_NODES};

/// Runs the `nocmap init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory, refusing to
/// overwrite an existing `nocmap.toml`. Returns exit code 0 on success.
pub fn run(name: Option<String>, edge: u32) -> Result<i32, Box<dyn std::error::Error>> {
    if edge == 0 {
        return Err("mesh edge must be at least 1".into());
    }
    if edge.checked_mul(edge).map_or(true, |n| n > MAX_MESH_NODES) {
        return Err(format!("a {edge}x{edge} mesh exceeds the {MAX_MESH_NODES} node limit").into());
    }

    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{}' already exists", n).into());
            }
            fs::create_dir_all(&dir)?;
            dir
        }
        None => {
            let dir = std::env::current_dir()?;
            if dir.join(CONFIG_FILE_NAME).exists() {
                return Err(format!("{CONFIG_FILE_NAME} already exists in {}", dir.display()).into());
            }
            dir
        }
    };

    let project_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("noc_project");

    eprintln!("  Creating new mapping project `{project_name}`");

    write_config(&project_dir, project_name, edge)?;

    eprintln!(
        "     Created {}",
        project_dir.join(CONFIG_FILE_NAME).display()
    );

    Ok(0)
}

/// Number of cores in the generated pipeline for a mesh of `edge * edge`
/// nodes.
fn pipeline_length(edge: u32) -> u32 {
    edge.saturating_mul(edge).min(4)
}

/// Writes the `nocmap.toml` configuration file.
fn write_config(root: &Path, name: &str, edge: u32) -> io::Result<()> {
    let cores = pipeline_length(edge);
    let mut content = format!(
        r#"[project]
name = "{name}"

[topology]
edge = {edge}
link_bandwidth = 1000.0

[mapping]
algorithm = "anneal"
routing = "xy"

[[cores]]
app = "{name}"
count = {cores}
"#
    );

    // A chain 0 -> 1 -> ... with halving volumes.
    for src in 1..cores {
        let volume = 1000.0 / f64::from(1u32 << (src - 1));
        content.push_str(&format!(
            r#"
[[traffic]]
src = {}
dst = {}
volume = {volume:.1}
bandwidth = {:.1}
"#,
            src - 1,
            src,
            volume / 2.0
        ));
    }

    fs::write(root.join(CONFIG_FILE_NAME), content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_in(tmp: &TempDir, name: &str, edge: u32) -> PathBuf {
        let project_dir = tmp.path().join(name);
        run(Some(project_dir.to_str().unwrap().to_string()), edge).unwrap();
        project_dir
    }

    #[test]
    fn init_creates_config() {
        let tmp = TempDir::new().unwrap();
        let project_dir = init_in(&tmp, "mesh_proj", 4);
        assert!(project_dir.join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn init_generates_valid_toml() {
        let tmp = TempDir::new().unwrap();
        let project_dir = init_in(&tmp, "toml_proj", 3);

        let toml_str = fs::read_to_string(project_dir.join(CONFIG_FILE_NAME)).unwrap();
        let config = nocmap_config::load_config_from_str(&toml_str);
        assert!(
            config.is_ok(),
            "generated nocmap.toml should be valid: {config:?}"
        );
        let config = config.unwrap();
        assert_eq!(config.project.name, "toml_proj");
        assert_eq!(config.topology.dimensions().unwrap(), (3, 3));
        assert_eq!(config.core_count(), 4);
        assert_eq!(config.traffic.len(), 3);
    }

    #[test]
    fn init_single_node_mesh_has_no_traffic() {
        let tmp = TempDir::new().unwrap();
        let project_dir = init_in(&tmp, "tiny", 1);

        let config = nocmap_config::load_config(&project_dir).unwrap();
        assert_eq!(config.core_count(), 1);
        assert!(config.traffic.is_empty());
    }

    #[test]
    fn generated_project_maps() {
        let tmp = TempDir::new().unwrap();
        let project_dir = init_in(&tmp, "runnable", 2);

        let config = nocmap_config::load_config(&project_dir).unwrap();
        let result = nocmap_mapper::map_project(
            &config,
            Some(1),
            &nocmap_mapper::Cancellation::new(),
        )
        .unwrap();
        assert_eq!(result.placement.iter().flatten().count(), 4);
    }

    #[test]
    fn init_existing_dir_error() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("exists");
        fs::create_dir_all(&project_dir).unwrap();

        let result = run(Some(project_dir.to_str().unwrap().to_string()), 4);
        assert!(result.is_err());
    }

    #[test]
    fn init_zero_edge_error() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("empty_mesh");
        assert!(run(Some(project_dir.to_str().unwrap().to_string()), 0).is_err());
        assert!(!project_dir.exists());
    }

    #[test]
    fn init_oversized_edge_error() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("huge");
        let err = run(Some(project_dir.to_str().unwrap().to_string()), 65536).unwrap_err();
        assert!(err.to_string().contains("node limit"));
        assert!(!project_dir.exists());
    }

    #[test]
    fn pipeline_length_caps_at_four() {
        assert_eq!(pipeline_length(1), 1);
        assert_eq!(pipeline_length(2), 4);
        assert_eq!(pipeline_length(8), 4);
    }
}

//! Thermal simulator invocation against stub shell scripts.
#![cfg(unix)]

use nocmap_config::ThermalConfig;
use nocmap_mapper::{
    map_project, simulate_temperature, Cancellation, MapError, PowerTrace, ThermalError,
    ThermalSimulator,
};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const WRITE_STEADY: &str = r#"
out=""
trace=""
while [ $# -gt 0 ]; do
  case "$1" in
    -steady_file) out="$2"; shift ;;
    -p) trace="$2"; shift ;;
  esac
  shift
done
[ -f "$trace" ] || exit 4
printf 'node_0\t330.5\nnode_1\t341.25\n' > "$out"
"#;

/// Writes `body` as a script and returns a simulator that runs it with `sh`.
fn stub(dir: &TempDir, body: &str) -> ThermalSimulator {
    let script = dir.path().join("sim.sh");
    fs::write(&script, body).unwrap();
    ThermalSimulator::new("sh", dir.path().join("chip.flp"))
        .with_args(vec![script.display().to_string()])
        .with_timeout(Duration::from_secs(10))
}

fn run(sim: &ThermalSimulator, dir: &Path) -> Result<nocmap_mapper::SteadyTemperatures, ThermalError> {
    sim.run(
        &PowerTrace::from_node_power(&[1.0, 2.0]),
        &dir.join("power.ptrace"),
        &dir.join("out.steady"),
    )
}

#[test]
fn successful_run_reads_temperatures() {
    let dir = TempDir::new().unwrap();
    let temps = run(&stub(&dir, WRITE_STEADY), dir.path()).unwrap();
    assert_eq!(temps.len(), 2);
    assert_eq!(temps.hottest(), Some(("node_1", 341.25)));
    let trace = fs::read_to_string(dir.path().join("power.ptrace")).unwrap();
    assert_eq!(trace, "node_0\tnode_1\n1\t2\n");
}

#[test]
fn non_zero_exit_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = run(&stub(&dir, "exit 3\n"), dir.path()).unwrap_err();
    assert!(matches!(err, ThermalError::Failed { code: 3 }));
}

#[test]
fn killed_simulator_is_interrupted() {
    let dir = TempDir::new().unwrap();
    let err = run(&stub(&dir, "kill -9 $$\n"), dir.path()).unwrap_err();
    assert!(matches!(err, ThermalError::Interrupted));
}

#[test]
fn slow_simulator_times_out() {
    let dir = TempDir::new().unwrap();
    let sim = stub(&dir, "sleep 5\n").with_timeout(Duration::from_millis(200));
    let err = run(&sim, dir.path()).unwrap_err();
    assert!(matches!(err, ThermalError::Timeout(_)));
}

#[test]
fn missing_steady_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = run(&stub(&dir, "exit 0\n"), dir.path()).unwrap_err();
    assert!(matches!(err, ThermalError::Io(_)));
}

#[test]
fn mapping_result_drives_thermal_run() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("sim.sh");
    fs::write(&script, WRITE_STEADY).unwrap();
    let config = nocmap_config::load_config_from_str(
        r#"
[project]
name = "hot"

[topology]
edge = 2
link_bandwidth = 100.0

[mapping]
algorithm = "exhaustive"

[[cores]]
app = "hot"
count = 2

[[traffic]]
src = 0
dst = 1
volume = 10.0
bandwidth = 1.0
"#,
    )
    .unwrap();
    let result = map_project(&config, Some(1), &Cancellation::new()).unwrap();
    let thermal = ThermalConfig {
        program: "sh".to_string(),
        args: vec![script.display().to_string()],
        floorplan: "chip.flp".to_string(),
        config: None,
        timeout_secs: 10,
        power_trace: "power.ptrace".to_string(),
        steady_file: "temperature.steady".to_string(),
    };
    let temps = simulate_temperature(&result, &thermal, dir.path()).unwrap();
    assert_eq!(temps.get("node_0"), Some(330.5));
    let trace = fs::read_to_string(dir.path().join("power.ptrace")).unwrap();
    assert!(trace.starts_with("node_0\tnode_1\tnode_2\tnode_3\n"));

    let failing = ThermalConfig {
        program: dir.path().join("absent").display().to_string(),
        ..thermal
    };
    let err = simulate_temperature(&result, &failing, dir.path()).unwrap_err();
    assert!(matches!(err, MapError::Thermal(ThermalError::Spawn { .. })));
}

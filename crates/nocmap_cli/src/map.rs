//! `nocmap map`: placement search and export.
//!
//! Runs the configured search, optionally hands the per-node energy to the
//! external thermal simulator, and writes the mapping either as `node core`
//! lines or as a JSON document together with the diagnostics of the run.

use std::fs;
use std::path::Path;

use nocmap_config::ProjectConfig;
use nocmap_diagnostics::{
    Category, Diagnostic, DiagnosticCode, DiagnosticRenderer, DiagnosticSink, TerminalRenderer,
};
use nocmap_mapper::{map_project, simulate_temperature, Cancellation, MappingResult};

use crate::project::load_project;
use crate::{GlobalArgs, MapArgs, ReportFormat};

/// Runs the `nocmap map` command.
///
/// Returns exit code 0 when the run produced no error diagnostics, 1
/// otherwise. Warnings such as overloaded links do not change the exit code.
pub fn run(args: &MapArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (project_dir, mut config) = load_project(global)?;
    apply_overrides(&mut config, args);

    if args.thermal && config.thermal.is_none() {
        return Err("--thermal requires a [thermal] section in nocmap.toml".into());
    }

    if !global.quiet {
        eprintln!(
            "     Mapping {} ({} cores)",
            config.project.name,
            config.core_count()
        );
    }

    let result = map_project(&config, args.seed, &Cancellation::new())?;

    let sink = DiagnosticSink::new();
    result.report(config.core_count(), &sink);

    if args.thermal {
        if let Some(ref thermal) = config.thermal {
            run_thermal(&result, thermal, &project_dir, &sink);
        }
    }

    let diagnostics = sink.diagnostics();
    let rendered = match args.format {
        ReportFormat::Text => result.to_mapping_text(),
        ReportFormat::Json => {
            let document = serde_json::json!({
                "mapping": result,
                "diagnostics": diagnostics,
            });
            format!("{}\n", serde_json::to_string_pretty(&document)?)
        }
    };

    match args.output {
        Some(ref path) => fs::write(path, &rendered)?,
        None => print!("{rendered}"),
    }

    if args.format == ReportFormat::Text {
        let renderer = TerminalRenderer::new(global.color);
        for diag in &diagnostics {
            eprint!("{}", renderer.render(diag));
        }
    }

    if !global.quiet {
        eprintln!("{}", summary_line(&result));
        if global.verbose {
            if let Some(ratio) = result.mean_accept_ratio() {
                eprintln!(
                    "   Annealing: {} rounds, mean accept ratio {ratio:.3}",
                    result.rounds.len()
                );
            }
        }
        if let Some(ref path) = args.output {
            eprintln!("       Wrote {path}");
        }
    }

    if sink.has_errors() {
        Ok(1)
    } else {
        Ok(0)
    }
}

/// Applies the command-line algorithm and routing overrides.
fn apply_overrides(config: &mut ProjectConfig, args: &MapArgs) {
    if let Some(algorithm) = args.algorithm {
        config.mapping.algorithm = algorithm.into();
    }
    if let Some(routing) = args.routing {
        config.mapping.routing = routing.into();
    }
}

/// Runs the thermal simulator, reporting the hottest node or the failure.
fn run_thermal(
    result: &MappingResult,
    thermal: &nocmap_config::ThermalConfig,
    project_dir: &Path,
    sink: &DiagnosticSink,
) {
    match simulate_temperature(result, thermal, project_dir) {
        Ok(temperatures) => {
            if let Some((unit, kelvin)) = temperatures.hottest() {
                sink.emit(
                    Diagnostic::note(
                        DiagnosticCode::new(Category::Thermal, 201),
                        format!("hottest unit {unit} at {kelvin:.2}"),
                    )
                    .with_note(format!("{} units simulated", temperatures.len())),
                );
            }
        }
        Err(e) => sink.emit(
            Diagnostic::error(
                DiagnosticCode::new(Category::Error, 201),
                "thermal simulation failed",
            )
            .with_note(e.to_string())
            .with_help("check thermal.program and thermal.floorplan in nocmap.toml"),
        ),
    }
}

/// One-line cost summary printed after a run.
fn summary_line(result: &MappingResult) -> String {
    let seed = result
        .seed
        .map(|s| format!(", seed {s}"))
        .unwrap_or_default();
    match result.total_cost {
        Some(total) => format!(
            "    Finished cost {total:.3} (energy {:.3}, penalty {:.3}) after {} evaluations, {:?}{seed}",
            result.cost.communication_energy(),
            result.cost.overload_penalty,
            result.evaluations,
            result.termination,
        ),
        None => format!(
            "    Finished without a placement after {} evaluations, {:?}{seed}",
            result.evaluations, result.termination,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlgorithmChoice, RoutingChoice};
    use nocmap_config::{Algorithm, RoutingMode, CONFIG_FILE_NAME};
    use tempfile::TempDir;

    const PAIR: &str = r#"
[project]
name = "pair"

[topology]
edge = 2
link_bandwidth = 1000.0

[[cores]]
app = "pair"
count = 2

[[traffic]]
src = 0
dst = 1
volume = 100.0
bandwidth = 50.0
"#;

    fn args() -> MapArgs {
        MapArgs {
            seed: Some(3),
            algorithm: Some(AlgorithmChoice::Exhaustive),
            routing: None,
            format: ReportFormat::Text,
            output: None,
            thermal: false,
        }
    }

    fn project(toml: &str) -> (TempDir, GlobalArgs) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), toml).unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(tmp.path().display().to_string()),
        };
        (tmp, global)
    }

    #[test]
    fn overrides_replace_config_choices() {
        let mut config = nocmap_config::load_config_from_str(PAIR).unwrap();
        let mut args = args();
        args.routing = Some(RoutingChoice::WestFirst);
        apply_overrides(&mut config, &args);
        assert_eq!(config.mapping.algorithm, Algorithm::Exhaustive);
        assert_eq!(config.mapping.routing, RoutingMode::WestFirst);
    }

    #[test]
    fn writes_mapping_text() {
        let (tmp, global) = project(PAIR);
        let out = tmp.path().join("mapping.txt");
        let mut args = args();
        args.output = Some(out.display().to_string());

        assert_eq!(run(&args, &global).unwrap(), 0);
        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert_eq!(text.lines().filter(|l| l.ends_with(" -1")).count(), 2);
    }

    #[test]
    fn writes_json_with_diagnostics() {
        let overloaded = PAIR.replace("link_bandwidth = 1000.0", "link_bandwidth = 10.0");
        let (tmp, global) = project(&overloaded);
        let out = tmp.path().join("mapping.json");
        let mut args = args();
        args.format = ReportFormat::Json;
        args.output = Some(out.display().to_string());

        assert_eq!(run(&args, &global).unwrap(), 0);
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["mapping"]["rows"], 2);
        assert_eq!(value["mapping"]["termination"], "Exhausted");
        let diagnostics = value["diagnostics"].as_array().unwrap();
        assert!(diagnostics
            .iter()
            .any(|d| d["code"]["category"] == "Warning" && d["code"]["number"] == 101));
    }

    #[test]
    fn thermal_flag_requires_section() {
        let (_tmp, global) = project(PAIR);
        let mut args = args();
        args.thermal = true;
        let err = run(&args, &global).unwrap_err();
        assert!(err.to_string().contains("[thermal]"));
    }

    #[test]
    fn failing_thermal_tool_sets_exit_code() {
        let with_thermal = format!(
            "{PAIR}\n[thermal]\nprogram = \"/nonexistent/nocmap-thermal\"\nfloorplan = \"chip.flp\"\n"
        );
        let (tmp, global) = project(&with_thermal);
        let mut args = args();
        args.thermal = true;
        args.output = Some(tmp.path().join("m.txt").display().to_string());
        assert_eq!(run(&args, &global).unwrap(), 1);
    }

    #[test]
    fn summary_mentions_seed() {
        let config = nocmap_config::load_config_from_str(PAIR).unwrap();
        let result = map_project(&config, Some(9), &Cancellation::new()).unwrap();
        let line = summary_line(&result);
        assert!(line.contains("seed 9"));
        assert!(line.contains("Frozen") || line.contains("RoundLimit"));
    }

    #[test]
    fn summary_without_placement() {
        let mut config = nocmap_config::load_config_from_str(PAIR).unwrap();
        config.mapping.algorithm = Algorithm::Exhaustive;
        config.mapping.routing = RoutingMode::WestFirst;
        let cancel = Cancellation::new();
        cancel.cancel();
        let result = map_project(&config, Some(2), &cancel).unwrap();
        let line = summary_line(&result);
        assert!(line.contains("without a placement"));
        assert!(line.contains("Cancelled"));
    }
}

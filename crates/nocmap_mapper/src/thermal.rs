//! External steady-state thermal simulator.
//!
//! The simulator is an opaque HotSpot-style program. It is handed a power
//! trace (one header line of unit names, one line of per-unit power) and a
//! floorplan whose units are named `node_<id>`, and it writes a steady-state
//! file of `unit temperature` lines. The run blocks until the program exits
//! or the timeout expires. A non-zero exit, death by signal or timeout is
//! fatal and never retried.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Errors from writing the power trace, running the simulator or reading its
/// output.
#[derive(Debug, thiserror::Error)]
pub enum ThermalError {
    /// A trace or result file could not be accessed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The simulator could not be started.
    #[error("cannot start `{program}`: {source}")]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// The underlying error.
        source: io::Error,
    },

    /// The simulator exited with a non-zero status.
    #[error("simulator exited with status {code}")]
    Failed {
        /// The exit code.
        code: i32,
    },

    /// The simulator was terminated by a signal.
    #[error("simulator was interrupted")]
    Interrupted,

    /// The simulator did not finish in time and was killed.
    #[error("simulator did not finish within {0:?}")]
    Timeout(Duration),

    /// The power trace or temperature file is malformed.
    #[error("malformed thermal data: {0}")]
    Malformed(String),
}

/// Per-unit power for one simulator run.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerTrace {
    units: Vec<String>,
    values: Vec<f64>,
}

impl PowerTrace {
    /// Creates a trace; `units` and `values` must have equal length.
    pub fn new(units: Vec<String>, values: Vec<f64>) -> Result<Self, ThermalError> {
        if units.len() != values.len() {
            return Err(ThermalError::Malformed(format!(
                "{} units but {} power values",
                units.len(),
                values.len()
            )));
        }
        Ok(Self { units, values })
    }

    /// A trace with one `node_<id>` unit per mesh node.
    pub fn from_node_power(node_power: &[f64]) -> Self {
        Self {
            units: (0..node_power.len()).map(|i| format!("node_{i}")).collect(),
            values: node_power.to_vec(),
        }
    }

    /// Returns the unit names.
    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Renders the trace in `.ptrace` layout.
    pub fn render(&self) -> String {
        let values: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        format!("{}\n{}\n", self.units.join("\t"), values.join("\t"))
    }

    /// Writes the trace to `path`.
    pub fn write(&self, path: &Path) -> Result<(), ThermalError> {
        fs::write(path, self.render())?;
        Ok(())
    }
}

/// Steady-state temperature of every floorplan unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SteadyTemperatures {
    units: Vec<(String, f64)>,
}

impl SteadyTemperatures {
    /// Parses `unit temperature` lines; blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, ThermalError> {
        let mut units = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let Some(name) = fields.next() else {
                continue;
            };
            let value = fields
                .next()
                .ok_or_else(|| {
                    ThermalError::Malformed(format!("line {}: missing temperature", number + 1))
                })?
                .parse::<f64>()
                .map_err(|e| ThermalError::Malformed(format!("line {}: {e}", number + 1)))?;
            units.push((name.to_string(), value));
        }
        Ok(Self { units })
    }

    /// Reads and parses a steady-state file.
    pub fn read(path: &Path) -> Result<Self, ThermalError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Returns the temperature of `unit`.
    pub fn get(&self, unit: &str) -> Option<f64> {
        self.units
            .iter()
            .find(|(name, _)| name == unit)
            .map(|&(_, t)| t)
    }

    /// Returns the hottest unit.
    pub fn hottest(&self) -> Option<(&str, f64)> {
        self.units
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, t)| (name.as_str(), *t))
    }

    /// Returns the number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if no unit was reported.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Invocation of the external simulator.
#[derive(Debug, Clone)]
pub struct ThermalSimulator {
    program: PathBuf,
    args: Vec<String>,
    floorplan: PathBuf,
    config: Option<PathBuf>,
    timeout: Duration,
}

impl ThermalSimulator {
    /// A simulator run of `program` on `floorplan` with a 60 second timeout.
    pub fn new(program: impl Into<PathBuf>, floorplan: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            floorplan: floorplan.into(),
            config: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Arguments placed before the generated ones.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// A simulator configuration file, passed as `-c`.
    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, trace_path: &Path, steady_path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("-f")
            .arg(&self.floorplan)
            .arg("-p")
            .arg(trace_path)
            .arg("-steady_file")
            .arg(steady_path);
        if let Some(config) = &self.config {
            cmd.arg("-c").arg(config);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }

    /// Writes `trace` to `trace_path`, runs the simulator and reads the
    /// temperatures it wrote to `steady_path`.
    pub fn run(
        &self,
        trace: &PowerTrace,
        trace_path: &Path,
        steady_path: &Path,
    ) -> Result<SteadyTemperatures, ThermalError> {
        trace.write(trace_path)?;
        log::info!(
            "running thermal simulator {} on {}",
            self.program.display(),
            self.floorplan.display()
        );

        let mut child = self
            .command(trace_path, steady_path)
            .spawn()
            .map_err(|source| ThermalError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if started.elapsed() >= self.timeout {
                // The child may exit between the check and the kill.
                let _ = child.kill();
                child.wait()?;
                return Err(ThermalError::Timeout(self.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };

        match status.code() {
            Some(0) => SteadyTemperatures::read(steady_path),
            Some(code) => Err(ThermalError::Failed { code }),
            None => Err(ThermalError::Interrupted),
        }
    }
}

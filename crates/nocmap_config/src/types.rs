//! Configuration types deserialized from `nocmap.toml`.

use crate::error::ConfigError;
use serde::Deserialize;

/// The top-level mapping configuration parsed from `nocmap.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata.
    pub project: ProjectMeta,
    /// Mesh dimensions and link capacity.
    pub topology: TopologyConfig,
    /// Per-bit energies of switches, links and buffers.
    #[serde(default)]
    pub energy: EnergyConfig,
    /// Search algorithm, routing mode and seed.
    #[serde(default)]
    pub mapping: MappingConfig,
    /// Overrides for the annealing schedule.
    #[serde(default)]
    pub anneal: AnnealConfig,
    /// Groups of cores to place, numbered consecutively in declaration order.
    #[serde(default)]
    pub cores: Vec<CoreGroup>,
    /// Directed traffic between cores.
    #[serde(default)]
    pub traffic: Vec<TrafficSpec>,
    /// Optional external thermal simulator.
    #[serde(default)]
    pub thermal: Option<ThermalConfig>,
}

impl ProjectConfig {
    /// Returns the total number of cores declared across all groups.
    pub fn core_count(&self) -> usize {
        self.cores.iter().map(|g| g.count as usize).sum()
    }
}

/// Project metadata.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Mesh dimensions and link capacity.
///
/// Either `edge` (square mesh) or both `rows` and `cols` must be given.
#[derive(Debug, Deserialize)]
pub struct TopologyConfig {
    /// Edge size of a square mesh.
    pub edge: Option<u32>,
    /// Number of mesh rows.
    pub rows: Option<u32>,
    /// Number of mesh columns.
    pub cols: Option<u32>,
    /// Capacity of every unidirectional link.
    pub link_bandwidth: f64,
}

impl TopologyConfig {
    /// Resolves the mesh dimensions as `(rows, cols)`.
    pub fn dimensions(&self) -> Result<(u32, u32), ConfigError> {
        match (self.edge, self.rows, self.cols) {
            (Some(edge), None, None) => Ok((edge, edge)),
            (None, Some(rows), Some(cols)) => Ok((rows, cols)),
            (None, None, None) => Err(ConfigError::MissingField(
                "topology.edge or topology.rows/cols".to_string(),
            )),
            _ => Err(ConfigError::ValidationError(
                "topology needs either edge or both rows and cols".to_string(),
            )),
        }
    }
}

/// Per-bit energies. Unset fields fall back to the mapper's defaults.
#[derive(Debug, Default, Deserialize)]
pub struct EnergyConfig {
    /// Switching energy per bit, charged at every node on a path.
    pub switch_bit: Option<f64>,
    /// Link traversal energy per bit.
    pub link_bit: Option<f64>,
    /// Buffer read energy per bit.
    pub buffer_read_bit: Option<f64>,
    /// Buffer write energy per bit.
    pub buffer_write_bit: Option<f64>,
}

/// Search algorithm, routing mode and random seed.
#[derive(Debug, Default, Deserialize)]
pub struct MappingConfig {
    /// The placement search algorithm.
    #[serde(default)]
    pub algorithm: Algorithm,
    /// The routing strategy.
    #[serde(default)]
    pub routing: RoutingMode,
    /// Random seed; a time-derived seed is used when absent.
    pub seed: Option<u64>,
}

/// Placement search algorithm.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Simulated annealing.
    #[default]
    Anneal,
    /// Exhaustive enumeration of every placement.
    Exhaustive,
}

/// Routing strategy selection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingMode {
    /// Static dimension-order routing, no routing table is programmed.
    #[default]
    Xy,
    /// Adaptive West-First turn-model routing.
    WestFirst,
    /// Adaptive Odd-Even turn-model routing.
    OddEven,
}

/// Overrides for the annealing schedule. Unset fields keep the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct AnnealConfig {
    /// Starting temperature.
    pub initial_temperature: Option<f64>,
    /// Temperature multiplier applied after every round.
    pub cooling_rate: Option<f64>,
    /// Attempts per round, as a multiplier of the squared node count.
    pub attempts_factor: Option<u64>,
    /// Accept ratio below which the search may freeze.
    pub min_accept: Option<f64>,
    /// Relative cost change below which the search may freeze.
    pub tolerance: Option<f64>,
    /// Minimum number of rounds before freezing.
    pub min_rounds: Option<u32>,
    /// Consecutive zero-cost-only rounds that force an early stop.
    pub max_free_rounds: Option<u32>,
    /// Hard cap on the number of rounds.
    pub max_rounds: Option<u32>,
    /// Record every swap attempt in the result.
    #[serde(default)]
    pub record_moves: bool,
}

/// A group of cores belonging to one application.
#[derive(Debug, Deserialize)]
pub struct CoreGroup {
    /// Owning application identifier.
    pub app: String,
    /// Number of cores in the group.
    pub count: u32,
}

/// Directed traffic from one core to another.
///
/// The bandwidth requirement is either given directly or derived from a
/// `rate` in `[0, 1]` times `multiplier` times the link bandwidth.
#[derive(Debug, Clone, Deserialize)]
pub struct TrafficSpec {
    /// Sending core.
    pub src: u32,
    /// Receiving core.
    pub dst: u32,
    /// Communication volume in bits.
    pub volume: f64,
    /// Required bandwidth.
    pub bandwidth: Option<f64>,
    /// Communication rate, as a fraction of the link bandwidth.
    pub rate: Option<f64>,
    /// Scales `rate`; defaults to 1.
    pub multiplier: Option<f64>,
}

/// External thermal simulator invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct ThermalConfig {
    /// Path to the simulator executable.
    pub program: String,
    /// Arguments passed before the generated ones.
    #[serde(default)]
    pub args: Vec<String>,
    /// Floorplan file handed to the simulator unchanged.
    pub floorplan: String,
    /// Optional simulator configuration file.
    pub config: Option<String>,
    /// Seconds to wait before the run is considered failed.
    #[serde(default = "default_thermal_timeout")]
    pub timeout_secs: u64,
    /// Where the generated power trace is written.
    #[serde(default = "default_power_trace")]
    pub power_trace: String,
    /// Where the simulator writes steady-state temperatures.
    #[serde(default = "default_steady_file")]
    pub steady_file: String,
}

fn default_thermal_timeout() -> u64 {
    60
}

fn default_power_trace() -> String {
    "power.ptrace".to_string()
}

fn default_steady_file() -> String {
    "temperature.steady".to_string()
}

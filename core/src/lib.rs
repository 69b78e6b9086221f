#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the fire propagation engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams and respond
//! exclusively with new command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical title shown by adapters when the simulation boots.
pub const TITLE: &str = "Fire propagation";

/// Side length used when no grid size is configured.
pub const DEFAULT_GRID_SIZE: u32 = 20;

/// Propagation interval used when no speed is configured.
pub const DEFAULT_INTERVAL_MS: u32 = 500;

/// Largest accepted propagation interval.
pub const MAX_INTERVAL_MS: u32 = 1_000;

/// Probability of a wall used by random wall generation when none is configured.
pub const DEFAULT_WALL_DENSITY: f64 = 0.1;

/// State held by a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Open ground that fire may spread into.
    #[default]
    Safe,
    /// Impermeable cell that blocks propagation.
    Wall,
    /// Cell that is currently burning.
    OnFire,
}

impl CellState {
    /// Reports whether the cell is burning.
    #[must_use]
    pub const fn is_burning(self) -> bool {
        matches!(self, Self::OnFire)
    }

    /// Reports whether the cell is a wall.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall)
    }
}

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Side length of the square simulation grid. Always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridSize(u32);

impl GridSize {
    /// Validates the provided side length.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGridSize`] when `value` is zero.
    pub const fn new(value: u32) -> Result<Self, ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidGridSize(value));
        }
        Ok(Self(value))
    }

    /// Retrieves the side length in cells.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Total number of cells contained in a grid of this size.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let side = self.0 as usize;
        side.saturating_mul(side)
    }

    /// Reports whether the cell lies within a grid of this size.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.row() < self.0 && cell.column() < self.0
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self(DEFAULT_GRID_SIZE)
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.0, self.0)
    }
}

/// Delay between two propagation steps, bounded to `0..=MAX_INTERVAL_MS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropagationInterval(u32);

impl PropagationInterval {
    /// Validates the provided interval measured in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IntervalOutOfRange`] when `millis` exceeds
    /// [`MAX_INTERVAL_MS`].
    pub const fn from_millis(millis: u32) -> Result<Self, ConfigError> {
        if millis > MAX_INTERVAL_MS {
            return Err(ConfigError::IntervalOutOfRange(millis));
        }
        Ok(Self(millis))
    }

    /// Interval expressed in whole milliseconds.
    #[must_use]
    pub const fn millis(&self) -> u32 {
        self.0
    }

    /// Interval expressed as a [`Duration`].
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0 as u64)
    }
}

impl Default for PropagationInterval {
    fn default() -> Self {
        Self(DEFAULT_INTERVAL_MS)
    }
}

/// Probability that random wall generation turns a cell into a wall.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct WallDensity(f64);

impl WallDensity {
    /// Validates the provided probability.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DensityOutOfRange`] when `value` is NaN or lies
    /// outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::DensityOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Retrieves the probability.
    #[must_use]
    pub const fn get(&self) -> f64 {
        self.0
    }
}

impl Default for WallDensity {
    fn default() -> Self {
        Self(DEFAULT_WALL_DENSITY)
    }
}

/// Lifecycle of the propagation timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SimulationState {
    /// No timer is active; the grid may be edited.
    #[default]
    Idle,
    /// The timer is active and each tick advances one generation.
    Running,
    /// The timer is suspended and the fire is frozen until resumed.
    Paused,
}

impl SimulationState {
    /// Reports whether walls, ignition points and grid size may be edited.
    #[must_use]
    pub const fn can_edit(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Reports whether the propagation timer is active.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Reports whether the simulation is suspended.
    #[must_use]
    pub const fn is_paused(self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Starts the timer. Starting a running simulation is a no-op.
    ///
    /// # Errors
    ///
    /// A paused simulation must be resumed rather than started.
    pub const fn start(self) -> Result<Self, TransitionError> {
        match self {
            Self::Idle | Self::Running => Ok(Self::Running),
            Self::Paused => Err(TransitionError::new(self, SimulationAction::Start)),
        }
    }

    /// Suspends the timer. Pausing a paused simulation is a no-op.
    ///
    /// # Errors
    ///
    /// An idle simulation has nothing to pause.
    pub const fn pause(self) -> Result<Self, TransitionError> {
        match self {
            Self::Running | Self::Paused => Ok(Self::Paused),
            Self::Idle => Err(TransitionError::new(self, SimulationAction::Pause)),
        }
    }

    /// Resumes a suspended timer. Resuming a running simulation is a no-op.
    ///
    /// # Errors
    ///
    /// An idle simulation has nothing to resume.
    pub const fn resume(self) -> Result<Self, TransitionError> {
        match self {
            Self::Paused | Self::Running => Ok(Self::Running),
            Self::Idle => Err(TransitionError::new(self, SimulationAction::Resume)),
        }
    }

    /// Forces the simulation back to idle from any state.
    #[must_use]
    pub const fn reset(self) -> Self {
        Self::Idle
    }

    /// Stops a running simulation once the fire can no longer spread.
    ///
    /// # Errors
    ///
    /// Only a running simulation can saturate.
    pub const fn saturate(self) -> Result<Self, TransitionError> {
        match self {
            Self::Running => Ok(Self::Idle),
            Self::Idle | Self::Paused => {
                Err(TransitionError::new(self, SimulationAction::Saturate))
            }
        }
    }
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
        };
        f.write_str(label)
    }
}

/// Transitions requested of the simulation state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimulationAction {
    /// Transition into [`SimulationState::Running`] from idle.
    Start,
    /// Transition into [`SimulationState::Paused`].
    Pause,
    /// Transition from paused back into running.
    Resume,
    /// Automatic stop once the fire has nowhere left to spread.
    Saturate,
}

impl fmt::Display for SimulationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Saturate => "saturate",
        };
        f.write_str(label)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the grid with a fresh all-safe grid of the provided size.
    ConfigureGrid {
        /// Side length of the new grid.
        size: GridSize,
    },
    /// Flips a cell between safe and wall.
    ToggleWall {
        /// Cell targeted by the toggle.
        cell: CellCoord,
    },
    /// Sets a cell on fire and starts the simulation.
    Ignite {
        /// Cell forced into the burning state.
        cell: CellCoord,
    },
    /// Starts the simulation, igniting a random cell when nothing burns yet.
    StartSimulation,
    /// Suspends the propagation timer.
    PauseSimulation,
    /// Resumes a suspended propagation timer.
    ResumeSimulation,
    /// Extinguishes every burning cell and returns to idle.
    ResetFire,
    /// Turns every wall back into safe ground.
    ClearWalls,
    /// Replaces the current walls with randomly placed ones.
    RandomizeWalls {
        /// Probability that any non-burning cell becomes a wall.
        density: WallDensity,
    },
    /// Reconfigures the delay between propagation steps.
    SetSpeed {
        /// New delay between two steps.
        interval: PropagationInterval,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Computes and commits the next fire generation.
    StepGeneration,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a fresh grid replaced the previous one.
    GridConfigured {
        /// Side length of the new grid.
        size: GridSize,
    },
    /// Confirms that a cell switched between safe and wall.
    WallToggled {
        /// Cell that was toggled.
        cell: CellCoord,
        /// State the cell holds after the toggle.
        state: CellState,
    },
    /// Confirms that a cell was set on fire outside the propagation rule.
    CellIgnited {
        /// Cell that was ignited.
        cell: CellCoord,
    },
    /// Announces a transition of the simulation state machine.
    SimulationStateChanged {
        /// State before the transition.
        from: SimulationState,
        /// State after the transition.
        to: SimulationState,
    },
    /// Confirms that the propagation interval changed.
    IntervalChanged {
        /// Interval that applies from the next scheduled step onward.
        interval: PropagationInterval,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a new generation was committed.
    GenerationAdvanced {
        /// Number of generations committed since the last reset.
        generation: u64,
        /// Cells that caught fire during this generation, in row-major order.
        ignited: Vec<CellCoord>,
    },
    /// Reports that a step changed nothing and the simulation stopped.
    FireSaturated {
        /// Number of generations committed before saturation.
        generation: u64,
    },
    /// Confirms that every burning cell reverted to safe ground.
    FireCleared {
        /// Number of cells that were extinguished.
        extinguished: usize,
    },
    /// Confirms that every wall reverted to safe ground.
    WallsCleared {
        /// Number of walls that were removed.
        removed: usize,
    },
    /// Confirms that random walls were generated.
    WallsRandomized {
        /// Number of walls placed.
        placed: usize,
    },
    /// Reports that a command was refused without mutating the world.
    CommandRejected {
        /// Command that was refused.
        command: Command,
        /// Specific reason the command failed.
        reason: RejectionReason,
    },
}

/// Reasons the world may refuse a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// Editing is only allowed while the simulation is idle.
    SimulationActive {
        /// State the simulation was in when the edit arrived.
        state: SimulationState,
    },
    /// The referenced cell lies outside the grid.
    OutOfBounds,
    /// The state machine does not allow the requested transition.
    InvalidTransition(TransitionError),
}

/// Errors produced while validating configuration values at the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Grids must contain at least one cell.
    #[error("grid size must be positive, got {0}")]
    InvalidGridSize(u32),
    /// Propagation intervals are limited to `0..=MAX_INTERVAL_MS`.
    #[error("propagation interval must be between 0 and 1000 ms, got {0}")]
    IntervalOutOfRange(u32),
    /// Wall densities are probabilities.
    #[error("wall density must be within [0, 1], got {0}")]
    DensityOutOfRange(f64),
}

/// Errors produced by grid operations whose preconditions were violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum GridError {
    /// The referenced cell lies outside the grid.
    #[error("cell {cell} is outside the {size} grid")]
    OutOfBounds {
        /// Cell that was referenced.
        cell: CellCoord,
        /// Size of the grid that was addressed.
        size: GridSize,
    },
}

/// Error returned when the simulation state machine refuses a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("cannot {action} while {from}")]
pub struct TransitionError {
    from: SimulationState,
    action: SimulationAction,
}

impl TransitionError {
    const fn new(from: SimulationState, action: SimulationAction) -> Self {
        Self { from, action }
    }

    /// State the simulation was in when the transition was requested.
    #[must_use]
    pub const fn state(&self) -> SimulationState {
        self.from
    }

    /// Transition that was refused.
    #[must_use]
    pub const fn action(&self) -> SimulationAction {
        self.action
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the fire propagation engine.

mod grid;

pub use grid::{CellCensus, Generation, Grid};

use fire_propagation_core::{
    CellCoord, Command, Event, GridSize, PropagationInterval, RejectionReason, SimulationState,
    WallDensity,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

const DEFAULT_RNG_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

/// Represents the authoritative fire propagation world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    state: SimulationState,
    interval: PropagationInterval,
    generation: u64,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a new world with a default-sized, all-safe grid.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_RNG_SEED)
    }

    /// Creates a new world whose random choices derive from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            grid: Grid::new(GridSize::default()),
            state: SimulationState::Idle,
            interval: PropagationInterval::default(),
            generation: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn ensure_editable(&self) -> Result<(), RejectionReason> {
        if self.state.can_edit() {
            Ok(())
        } else {
            Err(RejectionReason::SimulationActive { state: self.state })
        }
    }

    fn transition(&mut self, next: SimulationState, out_events: &mut Vec<Event>) {
        let from = self.state;
        if from == next {
            return;
        }
        self.state = next;
        info!(%from, to = %next, "simulation state changed");
        out_events.push(Event::SimulationStateChanged { from, to: next });
    }

    fn configure_grid(
        &mut self,
        size: GridSize,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        self.ensure_editable()?;
        self.grid = Grid::new(size);
        self.generation = 0;
        out_events.push(Event::GridConfigured { size });
        Ok(())
    }

    fn toggle_wall(
        &mut self,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        self.ensure_editable()?;
        let toggled = self
            .grid
            .toggle_wall(cell)
            .map_err(|_| RejectionReason::OutOfBounds)?;
        if let Some(state) = toggled {
            out_events.push(Event::WallToggled { cell, state });
        }
        Ok(())
    }

    fn ignite(
        &mut self,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        self.ensure_editable()?;
        let ignited = self
            .grid
            .ignite(cell)
            .map_err(|_| RejectionReason::OutOfBounds)?;
        if ignited {
            out_events.push(Event::CellIgnited { cell });
        }
        self.transition(SimulationState::Running, out_events);
        Ok(())
    }

    fn start(&mut self, out_events: &mut Vec<Event>) -> Result<(), RejectionReason> {
        let next = self
            .state
            .start()
            .map_err(RejectionReason::InvalidTransition)?;
        if self.state.is_running() {
            return Ok(());
        }

        if !self.grid.has_fire() {
            let cell = self.grid.ignite_random(&mut self.rng);
            debug!(%cell, "ignited random cell");
            out_events.push(Event::CellIgnited { cell });
        }
        self.transition(next, out_events);
        Ok(())
    }

    fn reset_fire(&mut self, out_events: &mut Vec<Event>) {
        let extinguished = self.grid.clear_fire();
        self.generation = 0;
        self.transition(self.state.reset(), out_events);
        out_events.push(Event::FireCleared { extinguished });
    }

    fn clear_walls(&mut self, out_events: &mut Vec<Event>) -> Result<(), RejectionReason> {
        self.ensure_editable()?;
        let removed = self.grid.clear_walls();
        out_events.push(Event::WallsCleared { removed });
        Ok(())
    }

    fn randomize_walls(
        &mut self,
        density: WallDensity,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RejectionReason> {
        self.ensure_editable()?;
        let placed = self.grid.randomize_walls(density, &mut self.rng);
        out_events.push(Event::WallsRandomized { placed });
        Ok(())
    }

    fn step_generation(&mut self, out_events: &mut Vec<Event>) -> Result<(), RejectionReason> {
        if !self.state.is_running() {
            debug!(state = %self.state, "dropping step outside running state");
            return Ok(());
        }

        let generation = self.grid.step();
        if !generation.any_changed() {
            let next = self
                .state
                .saturate()
                .map_err(RejectionReason::InvalidTransition)?;
            info!(generation = self.generation, "fire saturated");
            out_events.push(Event::FireSaturated {
                generation: self.generation,
            });
            self.transition(next, out_events);
            return Ok(());
        }

        let (grid, ignited) = generation.into_parts();
        self.grid = grid;
        self.generation = self.generation.saturating_add(1);
        debug!(
            generation = self.generation,
            ignited = ignited.len(),
            "generation committed"
        );
        out_events.push(Event::GenerationAdvanced {
            generation: self.generation,
            ignited,
        });
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands the current state does not allow are answered with
/// [`Event::CommandRejected`] and leave the world untouched.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let outcome = match &command {
        Command::ConfigureGrid { size } => world.configure_grid(*size, out_events),
        Command::ToggleWall { cell } => world.toggle_wall(*cell, out_events),
        Command::Ignite { cell } => world.ignite(*cell, out_events),
        Command::StartSimulation => world.start(out_events),
        Command::PauseSimulation => world
            .state
            .pause()
            .map(|next| world.transition(next, out_events))
            .map_err(RejectionReason::InvalidTransition),
        Command::ResumeSimulation => world
            .state
            .resume()
            .map(|next| world.transition(next, out_events))
            .map_err(RejectionReason::InvalidTransition),
        Command::ResetFire => {
            world.reset_fire(out_events);
            Ok(())
        }
        Command::ClearWalls => world.clear_walls(out_events),
        Command::RandomizeWalls { density } => world.randomize_walls(*density, out_events),
        Command::SetSpeed { interval } => {
            world.interval = *interval;
            out_events.push(Event::IntervalChanged {
                interval: *interval,
            });
            Ok(())
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt: *dt });
            Ok(())
        }
        Command::StepGeneration => world.step_generation(out_events),
    };

    if let Err(reason) = outcome {
        warn!(?command, ?reason, "command rejected");
        out_events.push(Event::CommandRejected { command, reason });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use fire_propagation_core::{
        CellCoord, CellState, GridError, PropagationInterval, SimulationState,
    };

    use super::{CellCensus, Grid, World};

    /// Provides read-only access to the current generation.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Returns the state of a single cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when the cell lies outside the grid.
    pub fn cell(world: &World, cell: CellCoord) -> Result<CellState, GridError> {
        world.grid.cell(cell)
    }

    /// Reports the current state of the simulation state machine.
    #[must_use]
    pub fn simulation_state(world: &World) -> SimulationState {
        world.state
    }

    /// Reports the configured delay between propagation steps.
    #[must_use]
    pub fn interval(world: &World) -> PropagationInterval {
        world.interval
    }

    /// Number of generations committed since the last reset or resize.
    #[must_use]
    pub fn generation(world: &World) -> u64 {
        world.generation
    }

    /// Counts the cells of the current generation per state.
    #[must_use]
    pub fn census(world: &World) -> CellCensus {
        world.grid.census()
    }
}

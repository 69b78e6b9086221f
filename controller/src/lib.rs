#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation controller that serializes every mutation of the fire world.
//!
//! The [`Controller`] is the only owner of the [`World`]. User edits, timer
//! advances and the step commands produced by the [`Ticker`] all pass through
//! one FIFO queue and reach `world::apply` strictly one at a time, so a step
//! can never interleave with an edit.

use std::{collections::VecDeque, time::Duration};

use fire_propagation_core::{
    CellCoord, CellState, Command, Event, GridError, GridSize, PropagationInterval,
    RejectionReason, SimulationState, WallDensity,
};
use fire_propagation_system_ticker::Ticker;
use fire_propagation_world::{self as world, query, CellCensus, Grid, World};
use tracing::debug;

/// Seed used for random ignition and wall placement when none is configured.
pub const DEFAULT_SEED: u64 = 0x0f12_e5a7_c0de_b10c;

/// Parameters required to construct a [`Controller`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerConfig {
    /// Side length of the initial grid.
    pub size: GridSize,
    /// Delay between two propagation steps.
    pub interval: PropagationInterval,
    /// Probability used by [`Controller::randomize_walls`].
    pub wall_density: WallDensity,
    /// Seed for every random choice made by the world.
    pub seed: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            size: GridSize::default(),
            interval: PropagationInterval::default(),
            wall_density: WallDensity::default(),
            seed: DEFAULT_SEED,
        }
    }
}

/// Owns the world and drives it from a cooperative timer.
#[derive(Debug)]
pub struct Controller {
    world: World,
    ticker: Ticker,
    wall_density: WallDensity,
    queue: VecDeque<Command>,
    events: Vec<Event>,
}

impl Controller {
    /// Creates a controller with a fresh idle grid built from `config`.
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        let mut controller = Self {
            world: World::with_seed(config.seed),
            ticker: Ticker::new(config.interval),
            wall_density: config.wall_density,
            queue: VecDeque::new(),
            events: Vec::new(),
        };
        let _ = controller.submit(Command::ConfigureGrid { size: config.size });
        let _ = controller.submit(Command::SetSpeed {
            interval: config.interval,
        });
        controller
    }

    /// Routes a command through the queue and drains every follow-up.
    ///
    /// # Errors
    ///
    /// Returns the world's rejection reason when the submitted command was
    /// refused. Follow-up commands never turn into errors.
    pub fn submit(&mut self, command: Command) -> Result<(), RejectionReason> {
        debug!(?command, "submitting command");
        let mut generated = Vec::new();
        world::apply(&mut self.world, command, &mut generated);
        let outcome = match generated.iter().find_map(rejection) {
            Some(reason) => Err(reason),
            None => Ok(()),
        };
        self.dispatch(generated);

        while let Some(command) = self.queue.pop_front() {
            let mut generated = Vec::new();
            world::apply(&mut self.world, command, &mut generated);
            self.dispatch(generated);
        }

        outcome
    }

    fn dispatch(&mut self, generated: Vec<Event>) {
        let mut follow_up = Vec::new();
        self.ticker.handle(&generated, &mut follow_up);
        self.queue.extend(follow_up);
        self.events.extend(generated);
    }

    /// Starts the simulation, igniting a random cell if nothing burns yet.
    ///
    /// # Errors
    ///
    /// Refused while paused; use [`Controller::resume`] instead.
    pub fn start(&mut self) -> Result<(), RejectionReason> {
        self.submit(Command::StartSimulation)
    }

    /// Suspends the propagation timer.
    ///
    /// # Errors
    ///
    /// Refused while idle.
    pub fn pause(&mut self) -> Result<(), RejectionReason> {
        self.submit(Command::PauseSimulation)
    }

    /// Resumes a suspended propagation timer.
    ///
    /// # Errors
    ///
    /// Refused while idle.
    pub fn resume(&mut self) -> Result<(), RejectionReason> {
        self.submit(Command::ResumeSimulation)
    }

    /// Pauses a running simulation or resumes a paused one.
    ///
    /// # Errors
    ///
    /// Refused while idle.
    pub fn toggle_pause(&mut self) -> Result<(), RejectionReason> {
        if self.is_paused() {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Extinguishes every fire and returns to idle from any state.
    pub fn reset_fire(&mut self) {
        let _ = self.submit(Command::ResetFire);
    }

    /// Changes the delay between propagation steps.
    pub fn set_speed(&mut self, interval: PropagationInterval) {
        let _ = self.submit(Command::SetSpeed { interval });
    }

    /// Flips a cell between safe and wall.
    ///
    /// # Errors
    ///
    /// Refused unless idle, or when the cell lies outside the grid.
    pub fn toggle_wall(&mut self, cell: CellCoord) -> Result<(), RejectionReason> {
        self.submit(Command::ToggleWall { cell })
    }

    /// Sets a cell on fire and starts the simulation.
    ///
    /// # Errors
    ///
    /// Refused unless idle, or when the cell lies outside the grid.
    pub fn ignite(&mut self, cell: CellCoord) -> Result<(), RejectionReason> {
        self.submit(Command::Ignite { cell })
    }

    /// Removes every wall.
    ///
    /// # Errors
    ///
    /// Refused unless idle.
    pub fn clear_walls(&mut self) -> Result<(), RejectionReason> {
        self.submit(Command::ClearWalls)
    }

    /// Replaces the walls with a random layout at the configured density.
    ///
    /// # Errors
    ///
    /// Refused unless idle.
    pub fn randomize_walls(&mut self) -> Result<(), RejectionReason> {
        self.submit(Command::RandomizeWalls {
            density: self.wall_density,
        })
    }

    /// Changes the density used by [`Controller::randomize_walls`].
    pub fn set_wall_density(&mut self, density: WallDensity) {
        self.wall_density = density;
    }

    /// Replaces the grid with a fresh all-safe grid of the provided size.
    ///
    /// # Errors
    ///
    /// Refused unless idle.
    pub fn resize(&mut self, size: GridSize) -> Result<(), RejectionReason> {
        self.submit(Command::ConfigureGrid { size })
    }

    /// Advances the timer by `dt`, stepping every generation that fell due.
    pub fn advance(&mut self, dt: Duration) {
        let _ = self.submit(Command::Tick { dt });
    }

    /// Takes every event recorded since the previous call.
    ///
    /// Events accumulate until drained, so hosts drain after each advance.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Current state of the simulation state machine.
    #[must_use]
    pub fn state(&self) -> SimulationState {
        query::simulation_state(&self.world)
    }

    /// Reports whether the propagation timer is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Reports whether the simulation is suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state().is_paused()
    }

    /// Reports whether walls, ignition points and grid size may be edited.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.state().can_edit()
    }

    /// Configured delay between propagation steps.
    #[must_use]
    pub fn interval(&self) -> PropagationInterval {
        query::interval(&self.world)
    }

    /// Density used by [`Controller::randomize_walls`].
    #[must_use]
    pub fn wall_density(&self) -> WallDensity {
        self.wall_density
    }

    /// Number of generations committed since the last reset or resize.
    #[must_use]
    pub fn generation(&self) -> u64 {
        query::generation(&self.world)
    }

    /// Time remaining until the next step, while running.
    #[must_use]
    pub fn until_next_step(&self) -> Option<Duration> {
        self.ticker.until_next_step()
    }

    /// Returns the state of a single cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when the cell lies outside the grid.
    pub fn cell(&self, cell: CellCoord) -> Result<CellState, GridError> {
        query::cell(&self.world, cell)
    }

    /// Read-only view of the current generation.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        query::grid(&self.world)
    }

    /// Counts the cells of the current generation per state.
    #[must_use]
    pub fn census(&self) -> CellCensus {
        query::census(&self.world)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

fn rejection(event: &Event) -> Option<RejectionReason> {
    match event {
        Event::CommandRejected { reason, .. } => Some(*reason),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_controller_applies_configuration() {
        let config = ControllerConfig {
            size: GridSize::new(5).expect("size"),
            interval: PropagationInterval::from_millis(200).expect("interval"),
            ..ControllerConfig::default()
        };

        let mut controller = Controller::new(config);

        assert_eq!(controller.grid().size(), config.size);
        assert_eq!(controller.interval(), config.interval);
        assert_eq!(controller.state(), SimulationState::Idle);
        let events = controller.drain_events();
        assert_eq!(
            events,
            vec![
                Event::GridConfigured { size: config.size },
                Event::IntervalChanged {
                    interval: config.interval,
                },
            ]
        );
        assert!(controller.drain_events().is_empty());
    }

    #[test]
    fn toggle_pause_requires_active_simulation() {
        let mut controller = Controller::default();
        assert!(controller.toggle_pause().is_err());

        controller.start().expect("start");
        controller.toggle_pause().expect("pause");
        assert!(controller.is_paused());
        controller.toggle_pause().expect("resume");
        assert!(controller.is_running());
    }
}

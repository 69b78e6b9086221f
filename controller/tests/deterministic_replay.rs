use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use fire_propagation_controller::{Controller, ControllerConfig};
use fire_propagation_core::{
    CellCoord, CellState, Command, Event, GridSize, PropagationInterval, SimulationState,
    WallDensity,
};

#[test]
fn deterministic_replay_produces_identical_outcome() {
    let first = replay(scripted_commands(), 0x5eed_cafe);
    let second = replay(scripted_commands(), 0x5eed_cafe);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.state, SimulationState::Idle);
}

#[test]
fn propagation_preserves_every_wall() {
    let mut controller = Controller::new(config(0x0dd_ba11));
    controller.randomize_walls().expect("randomize walls");
    let walls: Vec<CellCoord> = controller
        .grid()
        .iter()
        .filter(|(_, state)| state.is_wall())
        .map(|(cell, _)| cell)
        .collect();
    let origin = controller
        .grid()
        .iter()
        .find(|(_, state)| *state == CellState::Safe)
        .map(|(cell, _)| cell)
        .expect("at least one safe cell");

    controller.ignite(origin).expect("ignite");
    run_until_idle(&mut controller);

    assert!(!walls.is_empty());
    for wall in walls {
        assert_eq!(controller.cell(wall), Ok(CellState::Wall));
    }
}

fn config(seed: u64) -> ControllerConfig {
    ControllerConfig {
        size: GridSize::new(12).expect("size"),
        interval: PropagationInterval::from_millis(200).expect("interval"),
        wall_density: WallDensity::new(0.25).expect("density"),
        seed,
    }
}

fn run_until_idle(controller: &mut Controller) {
    for _ in 0..200 {
        if !controller.is_running() {
            break;
        }
        controller.advance(Duration::from_millis(200));
    }
}

fn replay(commands: Vec<Command>, seed: u64) -> ReplayOutcome {
    let mut controller = Controller::new(config(seed));

    for command in commands {
        let _ = controller.submit(command);
    }
    run_until_idle(&mut controller);

    ReplayOutcome {
        cells: controller.grid().iter().map(|(_, state)| state).collect(),
        generation: controller.generation(),
        state: controller.state(),
        events: controller.drain_events(),
    }
}

fn scripted_commands() -> Vec<Command> {
    vec![
        Command::RandomizeWalls {
            density: WallDensity::new(0.25).expect("density"),
        },
        Command::ToggleWall {
            cell: CellCoord::new(6, 6),
        },
        Command::StartSimulation,
        Command::Tick {
            dt: Duration::from_millis(450),
        },
        Command::PauseSimulation,
        Command::Tick {
            dt: Duration::from_secs(3),
        },
        Command::SetSpeed {
            interval: PropagationInterval::from_millis(100).expect("interval"),
        },
        Command::ResumeSimulation,
        Command::Tick {
            dt: Duration::from_millis(350),
        },
    ]
}

#[derive(Clone, Debug, PartialEq)]
struct ReplayOutcome {
    cells: Vec<CellState>,
    generation: u64,
    state: SimulationState,
    events: Vec<Event>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.cells.hash(&mut hasher);
        self.generation.hash(&mut hasher);
        self.state.hash(&mut hasher);
        self.events.len().hash(&mut hasher);
        hasher.finish()
    }
}

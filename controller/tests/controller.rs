use std::time::Duration;

use fire_propagation_controller::{Controller, ControllerConfig};
use fire_propagation_core::{
    CellCoord, CellState, Event, GridSize, PropagationInterval, RejectionReason,
    SimulationState, WallDensity,
};
use fire_propagation_world::Grid;

const TICK: Duration = Duration::from_millis(100);

fn controller(size: u32) -> Controller {
    let mut controller = Controller::new(ControllerConfig {
        size: GridSize::new(size).expect("size"),
        interval: PropagationInterval::from_millis(100).expect("interval"),
        ..ControllerConfig::default()
    });
    let _ = controller.drain_events();
    controller
}

fn burning(controller: &Controller) -> usize {
    controller.census().burning
}

#[test]
fn center_ignition_runs_to_saturation_and_stops() {
    let mut controller = controller(3);
    controller.ignite(CellCoord::new(1, 1)).expect("ignite");
    assert!(controller.is_running());

    controller.advance(TICK);
    assert_eq!(burning(&controller), 5);
    for corner in [(0, 0), (0, 2), (2, 0), (2, 2)] {
        assert_eq!(
            controller.cell(CellCoord::new(corner.0, corner.1)),
            Ok(CellState::Safe)
        );
    }

    controller.advance(TICK);
    assert_eq!(burning(&controller), 9);
    assert!(controller.is_running(), "saturation is detected on the next tick");

    controller.advance(TICK);
    assert_eq!(controller.state(), SimulationState::Idle);
    assert_eq!(controller.generation(), 2);

    let events = controller.drain_events();
    assert!(events.contains(&Event::FireSaturated { generation: 2 }));
}

#[test]
fn walled_center_stops_after_one_tick() {
    let mut controller = controller(3);
    for (row, column) in [(0, 1), (1, 0), (1, 2), (2, 1)] {
        controller
            .toggle_wall(CellCoord::new(row, column))
            .expect("toggle wall");
    }
    controller.ignite(CellCoord::new(1, 1)).expect("ignite");

    controller.advance(TICK);

    assert_eq!(controller.state(), SimulationState::Idle);
    assert_eq!(burning(&controller), 1);
    assert_eq!(controller.census().walls, 4);
}

#[test]
fn pause_freezes_fire_until_resumed() {
    let mut controller = controller(5);
    controller.ignite(CellCoord::new(0, 0)).expect("ignite");
    controller.advance(TICK);
    assert_eq!(burning(&controller), 3);

    controller.pause().expect("pause");
    controller.advance(Duration::from_secs(5));
    assert_eq!(burning(&controller), 3, "paused fire must not spread");
    assert!(controller.is_paused());

    controller.resume().expect("resume");
    controller.advance(TICK);
    assert_eq!(burning(&controller), 6);
}

#[test]
fn reset_fire_clears_fire_and_keeps_walls() {
    let mut controller = controller(4);
    controller
        .toggle_wall(CellCoord::new(3, 3))
        .expect("toggle wall");
    controller.ignite(CellCoord::new(0, 0)).expect("ignite");
    controller.advance(TICK);
    controller.pause().expect("pause");

    controller.reset_fire();

    assert_eq!(controller.state(), SimulationState::Idle);
    assert_eq!(burning(&controller), 0);
    assert_eq!(controller.census().walls, 1);
    assert_eq!(controller.generation(), 0);

    controller.advance(Duration::from_secs(1));
    assert_eq!(burning(&controller), 0, "no tick may fire after reset");
}

#[test]
fn editing_is_rejected_while_fire_is_active() {
    let mut controller = controller(4);
    controller.start().expect("start");
    let running = RejectionReason::SimulationActive {
        state: SimulationState::Running,
    };

    assert_eq!(controller.toggle_wall(CellCoord::new(0, 0)), Err(running));
    assert_eq!(controller.clear_walls(), Err(running));
    assert_eq!(controller.randomize_walls(), Err(running));
    assert_eq!(
        controller.resize(GridSize::new(8).expect("size")),
        Err(running)
    );
    assert!(!controller.can_edit());

    controller.pause().expect("pause");
    assert_eq!(
        controller.ignite(CellCoord::new(1, 1)),
        Err(RejectionReason::SimulationActive {
            state: SimulationState::Paused,
        })
    );
}

#[test]
fn out_of_range_cells_are_rejected() {
    let mut controller = controller(4);
    assert_eq!(
        controller.ignite(CellCoord::new(4, 0)),
        Err(RejectionReason::OutOfBounds)
    );
    assert_eq!(controller.state(), SimulationState::Idle);
    assert!(controller.cell(CellCoord::new(0, 4)).is_err());
}

#[test]
fn speed_change_while_running_applies_to_next_tick() {
    let mut controller = controller(9);
    controller.ignite(CellCoord::new(4, 4)).expect("ignite");
    controller.advance(Duration::from_millis(60));
    assert_eq!(controller.generation(), 0);

    controller.set_speed(PropagationInterval::from_millis(80).expect("interval"));
    controller.advance(Duration::from_millis(20));
    assert_eq!(controller.generation(), 1, "in-flight tick fires once");

    controller.advance(Duration::from_millis(79));
    assert_eq!(controller.generation(), 1);
    controller.advance(Duration::from_millis(1));
    assert_eq!(controller.generation(), 2);
    assert_eq!(controller.until_next_step(), Some(Duration::from_millis(80)));
}

#[test]
fn zero_interval_steps_on_every_advance() {
    let mut controller = controller(6);
    controller.set_speed(PropagationInterval::from_millis(0).expect("interval"));
    controller.ignite(CellCoord::new(0, 0)).expect("ignite");

    controller.advance(Duration::ZERO);
    controller.advance(Duration::ZERO);

    assert_eq!(controller.generation(), 2);
}

#[test]
fn resize_replaces_layout_with_fresh_grid() {
    let mut controller = controller(4);
    controller.set_wall_density(WallDensity::new(0.5).expect("density"));
    controller.randomize_walls().expect("randomize");
    let size = GridSize::new(6).expect("size");

    controller.resize(size).expect("resize");

    assert_eq!(controller.grid(), &Grid::new(size));
}

#[test]
fn start_after_saturation_finishes_immediately() {
    let mut controller = controller(2);
    controller.ignite(CellCoord::new(0, 0)).expect("ignite");
    for _ in 0..4 {
        controller.advance(TICK);
    }
    assert_eq!(controller.state(), SimulationState::Idle);
    let _ = controller.drain_events();

    controller.start().expect("start");
    controller.advance(TICK);

    assert_eq!(controller.state(), SimulationState::Idle);
    let events = controller.drain_events();
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::CellIgnited { .. })),
        "existing fire suppresses random ignition"
    );
}

#[test]
fn long_stall_advances_a_single_generation() {
    let mut controller = controller(3);
    controller.set_speed(PropagationInterval::from_millis(1).expect("interval"));
    controller.ignite(CellCoord::new(1, 1)).expect("ignite");

    controller.advance(Duration::from_secs(3_600));

    assert_eq!(controller.generation(), 1);
    assert!(controller.is_running());
    let steps = controller
        .drain_events()
        .iter()
        .filter(|event| matches!(event, Event::GenerationAdvanced { .. }))
        .count();
    assert_eq!(steps, 1);
}

//! End-to-end scenarios for training and querying the controller

mod common;

use std::{collections::BTreeSet, time::Duration};

use ghostgrid::{
    Action, Adversary, Board, Controller, ControllerConfig, Coord, Error, GridWorld, Locations,
    controller::{Phase, StopReason},
    pipeline::MetricsObserver,
    ports::TrainingObserver,
};

use common::{floor_bound_config, reference_board};

fn trained(board: Board, config: ControllerConfig) -> Controller {
    Controller::with_config(board, 100, config, &mut []).unwrap()
}

/// Red next to an item, agent in the far corner
#[test]
fn test_reference_scenario_updates_start_cell() {
    let start = Coord::new(0, 0);
    let locations = Locations::new(start).with_adversary(Adversary::Red, Coord::new(1, 4));
    let items: BTreeSet<Coord> = [
        Coord::new(0, 5),
        Coord::new(1, 5),
        Coord::new(2, 4),
        Coord::new(3, 1),
        Coord::new(4, 4),
    ]
    .into_iter()
    .collect();

    let board = Board::from_placement(5, 6, &locations, &items).unwrap();
    let mut controller = trained(board, floor_bound_config(17, 0.99));
    assert_eq!(controller.phase(), Phase::Ready);
    assert!(controller.training_summary().episodes > 0);

    let action = controller.choose_next_move(&locations, &items).unwrap();
    assert!(Action::ALL.contains(&action));
    assert_ne!(controller.q_table().get(start, action), 0.0);
}

#[test]
fn test_default_constructor_on_small_board() {
    let locations = Locations::new(Coord::new(0, 0));
    let items: BTreeSet<Coord> = [Coord::new(0, 2)].into_iter().collect();

    let mut controller = Controller::new(1, 3, locations, items.clone(), 20).unwrap();
    assert_eq!(controller.phase(), Phase::Ready);
    assert_eq!(controller.config(), &ControllerConfig::default());
    assert!(controller.choose_next_move(&locations, &items).is_ok());
}

#[test]
fn test_training_stops_at_exploration_floor() {
    // 1.0 * 0.5^5 is the first value at or below 0.05
    let config = floor_bound_config(11, 0.5);
    assert_eq!(config.exploration_episodes(), Some(5));

    let controller = trained(reference_board(), config);
    let summary = controller.training_summary();

    assert_eq!(summary.episodes, 5);
    assert_eq!(summary.stop_reason, StopReason::ExplorationFloor);
    assert_eq!(
        summary.cleared + summary.caught + summary.exhausted,
        summary.episodes
    );
    assert!(summary.final_epsilon <= 0.05);
    assert_eq!(controller.epsilon(), summary.final_epsilon);
}

#[test]
fn test_training_stops_at_deadline() {
    let config = ControllerConfig::default()
        .with_seed(5)
        .with_epsilon_decay(0.999_999_999)
        .with_time_budget(Duration::from_millis(50));

    let controller = trained(reference_board(), config);
    let summary = controller.training_summary();

    assert_eq!(summary.stop_reason, StopReason::Deadline);
    assert!(summary.episodes >= 1);
    assert!(summary.elapsed >= Duration::from_millis(50));
}

#[test]
fn test_seeded_training_is_reproducible() {
    let first = trained(reference_board(), floor_bound_config(42, 0.98));
    let second = trained(reference_board(), floor_bound_config(42, 0.98));

    assert_eq!(
        first.training_summary().total_steps,
        second.training_summary().total_steps
    );
    for row in 0..5 {
        for col in 0..6 {
            let cell = Coord::new(row, col);
            assert_eq!(first.q_table().values(cell), second.q_table().values(cell));
        }
    }
}

#[test]
fn test_repeated_identical_queries_never_fail() {
    let board = reference_board();
    let mut controller = trained(board.clone(), floor_bound_config(3, 0.9));
    let world = GridWorld::new(board);

    for _ in 0..50 {
        controller
            .choose_next_move(world.locations(), world.items())
            .unwrap();
    }

    // The agent never moved, so no fidelity evidence was collected
    assert_eq!(controller.fidelity().observations(), 0);
    assert_eq!(controller.fidelity().value(), 0.75);
}

#[test]
fn test_off_board_agent_is_rejected() {
    let board = reference_board();
    let mut controller = trained(board.clone(), floor_bound_config(4, 0.9));
    let locations = Locations::new(Coord::new(5, 0));

    let err = controller
        .choose_next_move(&locations, board.initial_items())
        .unwrap_err();
    assert!(matches!(err, Error::OutOfBounds { row: 5, col: 0, .. }));
}

#[test]
fn test_fidelity_tracks_observed_displacements() {
    // Open 3x3 board, agent in the centre so every move stays on the board
    let board: Board = "10,10,10/10,70,10/10,10,11".parse().unwrap();
    let mut controller = trained(board.clone(), floor_bound_config(8, 0.9));
    let items = board.initial_items().clone();
    let centre = Coord::new(1, 1);

    let first = controller
        .choose_next_move(&Locations::new(centre), &items)
        .unwrap();
    let followed = centre.offset(first).unwrap();
    controller
        .choose_next_move(&Locations::new(followed), &items)
        .unwrap();

    assert_eq!(controller.fidelity().observations(), 1);
    assert_eq!(controller.fidelity().value(), 1.0);

    // Staying put is not evidence either way
    controller
        .choose_next_move(&Locations::new(followed), &items)
        .unwrap();
    assert_eq!(controller.fidelity().observations(), 1);
}

#[test]
fn test_opponent_estimates_reflect_lethality() {
    // Green guards the only item next to the agent
    let board: Board = "70,51/10,10".parse().unwrap();
    let controller = trained(board, floor_bound_config(21, 0.985));
    let model = controller.opponent_model();

    assert!(model.encounters(Adversary::Green) > 10);
    assert!(model.survival_estimate(Adversary::Green) < 0.5);
    assert_eq!(model.encounters(Adversary::Red), 0);
    assert_eq!(model.survival_estimate(Adversary::Red), 0.5);
}

#[test]
fn test_observers_see_every_episode() {
    let mut metrics = MetricsObserver::new(2);
    let controller = {
        let mut observers: Vec<&mut dyn TrainingObserver> = Vec::new();
        observers.push(&mut metrics);
        Controller::with_config(
            reference_board(),
            100,
            floor_bound_config(13, 0.5),
            &mut observers,
        )
        .unwrap()
    };

    assert_eq!(metrics.episodes(), controller.training_summary().episodes);
    assert_eq!(
        metrics.cleared() + metrics.caught() + metrics.exhausted(),
        metrics.episodes()
    );
    assert_eq!(metrics.windows().len(), 3);
}

#[test]
fn test_invalid_configuration_is_rejected_before_training() {
    let config = ControllerConfig::default().with_epsilon_decay(1.0);
    let err = Controller::with_config(reference_board(), 100, config, &mut []).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration { .. }));
}

//! Simulator rules exercised through the public API

mod common;

use ghostgrid::{
    Action, Adversary, Board, Coord, Error, GridWorld, Locations,
    grid::{CAUGHT_PENALTY, CLEARED_BONUS, Termination},
};
use rand::{SeedableRng, rngs::StdRng};

#[test]
fn test_reference_board_placement() {
    let board = common::reference_board();
    let locations = board.initial_locations();

    assert_eq!(locations.agent, Coord::new(4, 0));
    assert_eq!(locations.adversary(Adversary::Red), Some(Coord::new(0, 0)));
    assert_eq!(locations.adversary(Adversary::Yellow), Some(Coord::new(1, 4)));
    assert_eq!(locations.adversary(Adversary::Blue), None);
    assert_eq!(board.initial_items().len(), 8);
    assert!(board.initial_items().contains(&Coord::new(1, 4)));
}

#[test]
fn test_lethality_increases_with_identity() {
    let lethality: Vec<f64> = Adversary::ALL.iter().map(|a| a.lethality()).collect();
    assert!(lethality.windows(2).all(|pair| pair[0] < pair[1]));
    assert!((Adversary::Red.lethality() - 0.2).abs() < 1e-12);
    assert!((Adversary::Green.lethality() - 0.8).abs() < 1e-12);
}

#[test]
fn test_walking_off_the_board_keeps_the_episode_running() {
    let mut world = GridWorld::new(common::reference_board());
    let mut rng = StdRng::seed_from_u64(0);

    for action in [Action::Down, Action::Left] {
        let step = world.step(action, &mut rng);
        assert_eq!(step.reward, 0.0);
        assert!(!step.is_terminal());
        assert_eq!(world.locations().agent, Coord::new(4, 0));
    }
}

#[test]
fn test_collecting_every_item_clears_the_board() {
    let board: Board = "70,11,11".parse().unwrap();
    let mut world = GridWorld::new(board);
    let mut rng = StdRng::seed_from_u64(0);

    let first = world.step(Action::Right, &mut rng);
    assert_eq!(first.reward, 1.0);
    assert_eq!(first.termination, None);

    let last = world.step(Action::Right, &mut rng);
    assert_eq!(last.reward, 1.0);
    assert_eq!(last.termination, Some(Termination::Cleared));
    assert_eq!(last.total_reward(), 1.0 + CLEARED_BONUS);
    assert!(world.items().is_empty());
    assert!(world.is_terminated());
}

#[test]
fn test_fatal_encounter_keeps_agent_in_place() {
    // Green kills 80% of the time; find a seed where it does
    let board: Board = "70,50,11".parse().unwrap();
    let mut world = GridWorld::new(board);
    let caught = (0..50).find_map(|seed| {
        world.reset();
        let mut rng = StdRng::seed_from_u64(seed);
        let step = world.step(Action::Right, &mut rng);
        step.is_terminal().then_some(step)
    });

    let step = caught.unwrap();
    assert_eq!(
        step.termination,
        Some(Termination::Caught {
            by: Some(Adversary::Green)
        })
    );
    assert_eq!(step.total_reward(), CAUGHT_PENALTY);
    assert_eq!(world.locations().agent, Coord::new(0, 0));
    assert_eq!(
        world.locations().adversary(Adversary::Green),
        Some(Coord::new(0, 1))
    );
}

#[test]
fn test_placement_and_codes_build_the_same_board() {
    let locations = Locations::new(Coord::new(1, 0)).with_adversary(Adversary::Blue, Coord::new(0, 1));
    let items = [Coord::new(0, 1), Coord::new(1, 1)].into_iter().collect();

    let placed = Board::from_placement(2, 2, &locations, &items).unwrap();
    let parsed: Board = "10,31/70,11".parse().unwrap();

    assert_eq!(placed, parsed);
    assert_eq!(placed.to_layout_string(), "10,31/70,11");
}

#[test]
fn test_invalid_layouts_are_reported() {
    let no_rows: [Vec<u8>; 0] = [];
    assert!(matches!(Board::from_codes(&no_rows), Err(Error::EmptyBoard)));
    assert!("".parse::<Board>().is_err());
    assert!(matches!(
        "70,10/10".parse::<Board>(),
        Err(Error::RaggedRow { .. })
    ));
    assert!(matches!(
        "10,11".parse::<Board>(),
        Err(Error::MissingAgent)
    ));
    assert!(matches!(
        "70,20,20".parse::<Board>(),
        Err(Error::DuplicateEntity { .. })
    ));
    assert!(matches!(
        "70,x1".parse::<Board>(),
        Err(Error::InvalidLayoutToken { .. })
    ));

    let outside = Locations::new(Coord::new(0, 0));
    let items = [Coord::new(3, 3)].into_iter().collect();
    assert!(matches!(
        Board::from_placement(2, 2, &outside, &items),
        Err(Error::OutOfBounds { .. })
    ));
}

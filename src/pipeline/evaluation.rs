//! Evaluation harness
//!
//! Replays the game driver: the policy is asked for a move every step, the
//! actuator executes a different move with probability `1 - fidelity`, and
//! a finished episode is reset before the next decision. Scores are the sum
//! of raw rewards and terminal adjustments over a fixed number of steps.

use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::baseline::RandomPolicy;
use crate::{
    Error, Result,
    controller::{Controller, ControllerConfig, TrainingSummary},
    grid::{Board, GridWorld, Termination},
    ports::{Policy, TrainingObserver},
};

/// Configuration for an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Independent rounds, each with a freshly trained controller
    pub rounds: usize,
    /// Games averaged per round
    pub games: usize,
    /// Decisions per game, also the training episode length
    pub steps: usize,
    /// Probability that the executed move is the chosen one
    pub fidelity: f64,
    /// Base seed; round `i` uses `seed + i`
    pub seed: Option<u64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            rounds: 5,
            games: 30,
            steps: 100,
            fidelity: 0.7,
            seed: None,
        }
    }
}

impl EvaluationConfig {
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_games(mut self, games: usize) -> Self {
        self.games = games;
        self
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_fidelity(mut self, fidelity: f64) -> Self {
        self.fidelity = fidelity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(Error::InvalidConfiguration {
                message: "rounds must be at least 1".into(),
            });
        }
        if self.games == 0 {
            return Err(Error::InvalidConfiguration {
                message: "games must be at least 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.fidelity) {
            return Err(Error::InvalidConfiguration {
                message: format!("fidelity must lie in [0, 1], got {}", self.fidelity),
            });
        }
        Ok(())
    }

    fn round_seed(&self, round: usize) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(round as u64))
    }
}

/// Score of a single game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub score: f64,
    /// Episodes within the game that ended with every item collected
    pub cleared: usize,
    /// Episodes within the game that ended in a fatal encounter
    pub caught: usize,
}

/// Play `steps` decisions of `policy` on `world`.
///
/// The world is reset before the first decision and after every
/// termination.
pub fn play_game<P, R>(
    world: &mut GridWorld,
    policy: &mut P,
    steps: usize,
    fidelity: f64,
    rng: &mut R,
) -> Result<GameResult>
where
    P: Policy + ?Sized,
    R: Rng,
{
    let mut result = GameResult {
        score: 0.0,
        cleared: 0,
        caught: 0,
    };
    world.reset();

    for _ in 0..steps {
        if world.is_terminated() {
            world.reset();
        }

        let chosen = policy.choose_next_move(world.locations(), world.items())?;
        let executed = if rng.random::<f64>() < fidelity {
            chosen
        } else {
            chosen.random_other(rng)
        };

        let step = world.step(executed, rng);
        result.score += step.total_reward();
        match step.termination {
            Some(Termination::Cleared) => result.cleared += 1,
            Some(Termination::Caught { .. }) => result.caught += 1,
            None => {}
        }
    }

    Ok(result)
}

/// Mean score of `policy` over `games` games.
pub fn evaluate_policy<P, R>(
    world: &mut GridWorld,
    policy: &mut P,
    steps: usize,
    fidelity: f64,
    games: usize,
    rng: &mut R,
) -> Result<f64>
where
    P: Policy + ?Sized,
    R: Rng,
{
    if games == 0 {
        return Ok(0.0);
    }
    let mut total = 0.0;
    for game in 0..games {
        let result = play_game(world, policy, steps, fidelity, rng)?;
        debug!(game, score = result.score, "game finished");
        total += result.score;
    }
    Ok(total / games as f64)
}

/// Which policy an evaluation run exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyKind {
    /// A freshly trained Q-learning controller per round
    QLearning,
    /// Uniformly random moves
    Random,
}

/// Outcome of one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundReport {
    /// One-based round number
    pub round: usize,
    pub mean_score: f64,
    /// Present when the round trained a controller
    pub training: Option<TrainingSummary>,
}

/// Result of an evaluation run, serializable for export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub layout: String,
    pub policy: String,
    pub config: EvaluationConfig,
    /// Present when the rounds trained controllers
    pub controller: Option<ControllerConfig>,
    pub rounds: Vec<RoundReport>,
    pub mean_score: f64,
}

impl EvaluationReport {
    /// Save report to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| Error::Io {
            operation: format!("create {}", path.display()),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load report from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: format!("open {}", path.display()),
            source,
        })?;
        Ok(serde_json::from_reader(file)?)
    }
}

/// Runs rounds of train-then-evaluate on one board
pub struct EvaluationRunner {
    board: Board,
    config: EvaluationConfig,
    controller_config: ControllerConfig,
    policy: PolicyKind,
}

impl EvaluationRunner {
    pub fn new(board: Board, config: EvaluationConfig) -> Self {
        Self {
            board,
            config,
            controller_config: ControllerConfig::default(),
            policy: PolicyKind::QLearning,
        }
    }

    /// Configuration for the controllers trained each round. Its seed is
    /// replaced by the round seed when the evaluation is seeded.
    pub fn with_controller_config(mut self, config: ControllerConfig) -> Self {
        self.controller_config = config;
        self
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Run every round. `observers` see each round's training run.
    pub fn run(&self, observers: &mut [&mut dyn TrainingObserver]) -> Result<EvaluationReport> {
        self.config.validate()?;
        self.controller_config.validate()?;

        let mut world = GridWorld::new(self.board.clone());
        let mut rounds = Vec::with_capacity(self.config.rounds);
        let mut policy_name = String::new();

        for round in 1..=self.config.rounds {
            let seed = self.config.round_seed(round);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            };

            let (mean_score, training) = match self.policy {
                PolicyKind::QLearning => {
                    let mut config = self.controller_config.clone();
                    if seed.is_some() {
                        config.seed = seed;
                    }
                    let mut controller = Controller::with_config(
                        self.board.clone(),
                        self.config.steps,
                        config,
                        observers,
                    )?;
                    policy_name = controller.name().to_string();
                    let mean = self.evaluate(&mut world, &mut controller, &mut rng)?;
                    (mean, Some(controller.training_summary().clone()))
                }
                PolicyKind::Random => {
                    let mut policy = RandomPolicy::new("Random");
                    if let Some(seed) = seed {
                        policy = policy.with_seed(seed);
                    }
                    policy_name = policy.name().to_string();
                    (self.evaluate(&mut world, &mut policy, &mut rng)?, None)
                }
            };

            info!(round, mean_score, policy = %policy_name, "round finished");
            rounds.push(RoundReport {
                round,
                mean_score,
                training,
            });
        }

        let mean_score =
            rounds.iter().map(|round| round.mean_score).sum::<f64>() / rounds.len() as f64;

        Ok(EvaluationReport {
            layout: self.board.to_layout_string(),
            policy: policy_name,
            config: self.config.clone(),
            controller: match self.policy {
                PolicyKind::QLearning => Some(self.controller_config.clone()),
                PolicyKind::Random => None,
            },
            rounds,
            mean_score,
        })
    }

    fn evaluate<P: Policy>(
        &self,
        world: &mut GridWorld,
        policy: &mut P,
        rng: &mut StdRng,
    ) -> Result<f64> {
        evaluate_policy(
            world,
            policy,
            self.config.steps,
            self.config.fidelity,
            self.config.games,
            rng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Action, ItemSet, Locations};

    /// Always moves in one direction
    struct Fixed(Action);

    impl Policy for Fixed {
        fn choose_next_move(&mut self, _locations: &Locations, _items: &ItemSet) -> Result<Action> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "Fixed"
        }
    }

    #[test]
    fn test_play_game_resets_after_clearing() {
        // Agent next to the only item: every right move clears the board
        let board: Board = "70,11".parse().unwrap();
        let mut world = GridWorld::new(board);
        let mut rng = StdRng::seed_from_u64(1);

        let result = play_game(&mut world, &mut Fixed(Action::Right), 4, 1.0, &mut rng).unwrap();

        assert_eq!(result.cleared, 4);
        assert_eq!(result.caught, 0);
        assert_eq!(result.score, 4.0 * 11.0);
    }

    #[test]
    fn test_play_game_zero_fidelity_never_executes_choice() {
        // Right would clear; with fidelity 0 it is never executed
        let board: Board = "70,11".parse().unwrap();
        let mut world = GridWorld::new(board);
        let mut rng = StdRng::seed_from_u64(2);

        let result = play_game(&mut world, &mut Fixed(Action::Right), 20, 0.0, &mut rng).unwrap();

        assert_eq!(result.cleared, 0);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_evaluate_policy_mean() {
        let board: Board = "70,11".parse().unwrap();
        let mut world = GridWorld::new(board);
        let mut rng = StdRng::seed_from_u64(3);

        let mean =
            evaluate_policy(&mut world, &mut Fixed(Action::Right), 2, 1.0, 5, &mut rng).unwrap();
        assert_eq!(mean, 22.0);
        assert_eq!(
            evaluate_policy(&mut world, &mut Fixed(Action::Right), 2, 1.0, 0, &mut rng).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(EvaluationConfig::default().validate().is_ok());
        assert!(EvaluationConfig::default().with_games(0).validate().is_err());
        assert!(EvaluationConfig::default().with_rounds(0).validate().is_err());
        assert!(
            EvaluationConfig::default()
                .with_fidelity(1.5)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_random_baseline_report() {
        let board: Board = "70,10,11/10,10,10".parse().unwrap();
        let config = EvaluationConfig::default()
            .with_rounds(2)
            .with_games(3)
            .with_steps(20)
            .with_seed(9);
        let report = EvaluationRunner::new(board, config)
            .with_policy(PolicyKind::Random)
            .run(&mut [])
            .unwrap();

        assert_eq!(report.policy, "Random");
        assert_eq!(report.rounds.len(), 2);
        assert_eq!(report.rounds[0].round, 1);
        assert!(report.rounds.iter().all(|round| round.training.is_none()));
        assert!(report.controller.is_none());
        assert_eq!(report.layout, "70,10,11/10,10,10");
    }
}

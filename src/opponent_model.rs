//! Running survival estimates per adversary
//!
//! Every encounter the agent walks into during training is recorded as
//! either survived or fatal. The resulting running mean is the agent's
//! belief about how dangerous each adversary is, and feeds the reward
//! estimate used at decision time.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::grid::Adversary;

/// Survival estimate before any encounter has been observed
pub const PRIOR_SURVIVAL: f64 = 0.5;

/// Outcome of one encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterOutcome {
    Fatal,
    Survived,
}

impl EncounterOutcome {
    fn survived(self) -> f64 {
        match self {
            EncounterOutcome::Fatal => 0.0,
            EncounterOutcome::Survived => 1.0,
        }
    }
}

/// Encounter statistics for one adversary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentEntry {
    pub adversary: Adversary,
    pub encounters: u64,
    pub survival: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Estimate {
    encounters: u64,
    survival: f64,
}

impl Default for Estimate {
    fn default() -> Self {
        Self {
            encounters: 0,
            survival: PRIOR_SURVIVAL,
        }
    }
}

/// Per-adversary survival estimates, never reset or decayed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpponentModel {
    estimates: [Estimate; 4],
}

impl OpponentModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one encounter outcome into the running mean
    pub fn record_outcome(&mut self, adversary: Adversary, outcome: EncounterOutcome) {
        let estimate = &mut self.estimates[adversary.slot()];
        estimate.encounters += 1;
        let n = estimate.encounters as f64;
        let updated = (estimate.survival * (n - 1.0) + outcome.survived()) / n;

        estimate.survival = if updated.is_finite() {
            updated.clamp(0.0, 1.0)
        } else {
            warn!(%adversary, updated, "survival estimate degenerated, restoring prior");
            PRIOR_SURVIVAL
        };
    }

    pub fn survival_estimate(&self, adversary: Adversary) -> f64 {
        self.estimates[adversary.slot()].survival
    }

    pub fn encounters(&self, adversary: Adversary) -> u64 {
        self.estimates[adversary.slot()].encounters
    }

    /// All entries in identity order
    pub fn snapshot(&self) -> Vec<OpponentEntry> {
        Adversary::ALL
            .into_iter()
            .map(|adversary| OpponentEntry {
                adversary,
                encounters: self.encounters(adversary),
                survival: self.survival_estimate(adversary),
            })
            .collect()
    }
}

//! Hyper-parameters, reward scheme and transition model for the maze learner

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Result, error::Error};

/// How moves into walls are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Only actions leading to an open in-bounds cell are candidates. The
    /// bootstrap maximum is taken over the successor's valid actions.
    #[default]
    ActionFiltered,
    /// All four actions are candidates. A blocked move leaves the agent in
    /// place with the wall-bump reward. The bootstrap maximum is taken over
    /// all four actions.
    BouncePenalized,
}

impl TransitionMode {
    pub const VARIANTS: &'static str = "action-filtered, bounce-penalized";
}

impl fmt::Display for TransitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionMode::ActionFiltered => f.write_str("action-filtered"),
            TransitionMode::BouncePenalized => f.write_str("bounce-penalized"),
        }
    }
}

impl FromStr for TransitionMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "action-filtered" | "filtered" => Ok(TransitionMode::ActionFiltered),
            "bounce-penalized" | "bounce" | "legacy" => Ok(TransitionMode::BouncePenalized),
            other => Err(Error::InvalidConfiguration {
                message: format!(
                    "unknown transition mode '{other}' (expected one of: {})",
                    Self::VARIANTS
                ),
            }),
        }
    }
}

/// Rewards returned by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardScheme {
    /// Reward for the move that reaches the goal.
    pub goal: f64,
    /// Reward for any other successful move.
    pub step: f64,
    /// Reward for a blocked move (bounce-penalized mode only).
    pub wall_bump: f64,
    /// Reward for the move that exhausts the step budget away from the goal.
    pub timeout: f64,
}

impl Default for RewardScheme {
    fn default() -> Self {
        Self {
            goal: 100.0,
            step: -0.1,
            wall_bump: -1.0,
            timeout: -1.0,
        }
    }
}

/// Configuration of a Q-learning agent.
///
/// Two presets reproduce the two learner flavours:
/// [`QLearningConfig::action_filtered`] (the default) and
/// [`QLearningConfig::bounce_penalized`].
///
/// # Examples
///
/// ```
/// use mazebench::q_learning::{QLearningConfig, TransitionMode};
///
/// let config = QLearningConfig::bounce_penalized()
///     .with_learning_rate(0.2)
///     .with_max_steps(300);
/// assert_eq!(config.transition, TransitionMode::BouncePenalized);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount_factor: f64,
    /// Initial exploration rate ε
    pub epsilon: f64,
    /// Multiplicative ε decay applied after every episode
    pub epsilon_decay: f64,
    /// Floor for ε
    pub min_epsilon: f64,
    pub transition: TransitionMode,
    pub rewards: RewardScheme,
    /// Per-episode step budget; `None` means `rows * cols * 2`.
    pub max_steps: Option<usize>,
}

impl QLearningConfig {
    /// Valid-actions learner: large goal reward, small step cost.
    pub fn action_filtered() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.95,
            epsilon: 0.1,
            epsilon_decay: 0.995,
            min_epsilon: 0.01,
            transition: TransitionMode::ActionFiltered,
            rewards: RewardScheme::default(),
            max_steps: None,
        }
    }

    /// Wall-bounce learner with a constant exploration rate.
    pub fn bounce_penalized() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            epsilon: 0.2,
            epsilon_decay: 1.0,
            min_epsilon: 0.2,
            transition: TransitionMode::BouncePenalized,
            rewards: RewardScheme {
                goal: 10.0,
                step: -1.0,
                wall_bump: -1.0,
                timeout: -1.0,
            },
            max_steps: Some(500),
        }
    }

    pub fn for_mode(mode: TransitionMode) -> Self {
        match mode {
            TransitionMode::ActionFiltered => Self::action_filtered(),
            TransitionMode::BouncePenalized => Self::bounce_penalized(),
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64, decay: f64, min_epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self.epsilon_decay = decay;
        self.min_epsilon = min_epsilon;
        self
    }

    pub fn with_rewards(mut self, rewards: RewardScheme) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Step budget for a maze of the given size.
    pub fn step_budget(&self, rows: usize, cols: usize) -> usize {
        self.max_steps.unwrap_or(rows * cols * 2)
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::InvalidConfiguration {
                    message: format!("{name} must be within [0, 1], got {value}"),
                })
            }
        };
        unit("learning_rate", self.learning_rate)?;
        unit("discount_factor", self.discount_factor)?;
        unit("epsilon", self.epsilon)?;
        unit("epsilon_decay", self.epsilon_decay)?;
        unit("min_epsilon", self.min_epsilon)?;

        let rewards = [
            self.rewards.goal,
            self.rewards.step,
            self.rewards.wall_bump,
            self.rewards.timeout,
        ];
        if rewards.iter().any(|r| !r.is_finite()) {
            return Err(Error::InvalidConfiguration {
                message: "rewards must be finite".to_string(),
            });
        }
        if self.max_steps == Some(0) {
            return Err(Error::InvalidConfiguration {
                message: "max_steps must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self::action_filtered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(QLearningConfig::action_filtered().validate().is_ok());
        assert!(QLearningConfig::bounce_penalized().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_rate_rejected() {
        let config = QLearningConfig::default().with_learning_rate(1.5);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_default_budget_scales_with_maze() {
        let config = QLearningConfig::action_filtered();
        assert_eq!(config.step_budget(10, 12), 240);
        assert_eq!(QLearningConfig::bounce_penalized().step_budget(10, 12), 500);
    }

    #[test]
    fn test_transition_mode_parse() {
        assert_eq!(
            "bounce_penalized".parse::<TransitionMode>().unwrap(),
            TransitionMode::BouncePenalized
        );
        assert_eq!(
            "Action-Filtered".parse::<TransitionMode>().unwrap(),
            TransitionMode::ActionFiltered
        );
        assert!("teleport".parse::<TransitionMode>().is_err());
    }
}

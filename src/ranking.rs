use crate::agent::AgentHandle;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Primary sort key computed from an agent's recorded metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FitnessKey {
    /// `alive ? lifetime : trial_time`
    SurvivalTime,
    /// `alive ? primary - penalties * penalty_weight : 0`
    PenalizedMetric { penalty_weight: f32 },
    /// `alive ? primary : primary / dead_divisor`
    DeathDiscountedMetric { dead_divisor: f32 },
}

/// Secondary key consulted when primary keys are equal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// `alive ? trial_time : lifetime`, so earlier deaths sort first
    EarlierDeathFirst,
}

/// Orders a population for breeding. Whatever ends up at the back of the
/// ordering is what the pairing window reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingPolicy {
    pub key: FitnessKey,
    pub tie_break: Option<TieBreak>,
    pub order: SortOrder,
}

impl RankingPolicy {
    pub fn survival_time() -> Self {
        Self {
            key: FitnessKey::SurvivalTime,
            tie_break: None,
            order: SortOrder::Descending,
        }
    }

    pub fn penalized_metric(penalty_weight: f32) -> Self {
        Self {
            key: FitnessKey::PenalizedMetric { penalty_weight },
            tie_break: None,
            order: SortOrder::Ascending,
        }
    }

    pub fn composite(dead_divisor: f32) -> Self {
        Self {
            key: FitnessKey::DeathDiscountedMetric { dead_divisor },
            tie_break: Some(TieBreak::EarlierDeathFirst),
            order: SortOrder::Ascending,
        }
    }

    pub fn primary_key(&self, agent: &AgentHandle, trial_time: f32) -> f32 {
        let metrics = agent.metrics();
        match self.key {
            FitnessKey::SurvivalTime => {
                if agent.is_alive() {
                    metrics.lifetime
                } else {
                    trial_time
                }
            }
            FitnessKey::PenalizedMetric { penalty_weight } => {
                if agent.is_alive() {
                    metrics.primary - metrics.penalties as f32 * penalty_weight
                } else {
                    0.0
                }
            }
            FitnessKey::DeathDiscountedMetric { dead_divisor } => {
                if agent.is_alive() {
                    metrics.primary
                } else {
                    metrics.primary / dead_divisor
                }
            }
        }
    }

    fn secondary_key(&self, agent: &AgentHandle, trial_time: f32) -> f32 {
        match self.tie_break {
            Some(TieBreak::EarlierDeathFirst) => {
                if agent.is_alive() {
                    trial_time
                } else {
                    agent.metrics().lifetime
                }
            }
            None => 0.0,
        }
    }

    /// Slot indices of `agents` in ranking order. Stable: equal keys keep
    /// their population order regardless of direction.
    pub fn rank(&self, agents: &[AgentHandle], trial_time: f32) -> Vec<usize> {
        let keys: Vec<(f32, f32)> = agents
            .iter()
            .map(|a| (self.primary_key(a, trial_time), self.secondary_key(a, trial_time)))
            .collect();

        let mut order: Vec<usize> = (0..agents.len()).collect();
        order.sort_by(|&a, &b| {
            let ordering = compare_keys(keys[a], keys[b]);
            match self.order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
        order
    }
}

fn compare_keys(a: (f32, f32), b: (f32, f32)) -> Ordering {
    a.0.total_cmp(&b.0).then_with(|| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentReport;
    use crate::genome::Genome;

    fn agent(alive: bool, lifetime: f32, primary: f32, penalties: u32) -> AgentHandle {
        let mut agent = AgentHandle::new(Genome::from_genes(vec![0], 1).unwrap());
        agent.record(AgentReport { alive, lifetime, primary, penalties });
        agent
    }

    #[test]
    fn survival_time_puts_survivors_last() {
        // dead agents score the full trial, survivors only their stamped lifetime
        let agents = vec![
            agent(true, 0.0, 0.0, 0),
            agent(false, 3.0, 0.0, 0),
            agent(true, 0.0, 0.0, 0),
            agent(false, 7.0, 0.0, 0),
        ];
        let order = RankingPolicy::survival_time().rank(&agents, 10.0);
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn penalized_metric_discounts_crashes() {
        let agents = vec![
            agent(true, 1.0, 5.0, 20),
            agent(true, 1.0, 4.0, 0),
            agent(false, 1.0, 50.0, 0),
        ];
        let policy = RankingPolicy::penalized_metric(0.1);
        assert_eq!(policy.primary_key(&agents[0], 15.0), 3.0);
        assert_eq!(policy.rank(&agents, 15.0), vec![2, 0, 1]);
    }

    #[test]
    fn composite_breaks_ties_by_earlier_death() {
        let agents = vec![
            agent(true, 2.0, 1.0, 0),
            agent(false, 4.0, 1.0, 0),
            agent(false, 1.0, 1.0, 0),
            agent(true, 2.0, 0.5, 0),
        ];
        let order = RankingPolicy::composite(1.0).rank(&agents, 5.0);
        assert_eq!(order, vec![3, 2, 1, 0]);
    }

    #[test]
    fn composite_discounts_dead_agents() {
        let dead = agent(false, 1.0, 8.0, 0);
        let alive = agent(true, 1.0, 2.0, 0);
        let policy = RankingPolicy::composite(8.0);
        assert_eq!(policy.primary_key(&dead, 5.0), 1.0);
        assert_eq!(policy.rank(&[dead, alive], 5.0), vec![0, 1]);
    }

    #[test]
    fn equal_keys_keep_population_order() {
        let agents: Vec<_> = (0..6).map(|_| agent(true, 1.0, 2.0, 0)).collect();
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let policy = RankingPolicy {
                order,
                ..RankingPolicy::penalized_metric(0.0)
            };
            assert_eq!(policy.rank(&agents, 1.0), vec![0, 1, 2, 3, 4, 5]);
        }
    }
}

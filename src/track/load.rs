use super::agent::Agent;
use super::pair::Pair;
use crate::AgentId;
use anyhow::Context;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// a loaded tracking session: every agent and every ordered agent pair,
/// pre-segmented into labeled blocks by the upstream feature extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub agents: Vec<Agent>,
    pub pairs: Vec<Pair>,
}

impl Dataset {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open dataset {}", path.display()))?;
        let mut dataset: Self = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("parse dataset {}", path.display()))?;
        dataset.normalize();
        Ok(dataset)
    }

    /// block order is an engine invariant, not a file-format promise
    fn normalize(&mut self) {
        for agent in &mut self.agents {
            agent.normalize();
        }
        for pair in &mut self.pairs {
            pair.normalize();
        }
    }

    /// index by identity for the search driver
    pub fn into_maps(
        self,
    ) -> (
        BTreeMap<AgentId, Agent>,
        BTreeMap<(AgentId, AgentId), Pair>,
    ) {
        let agents = self.agents.into_iter().map(|a| (a.id, a)).collect();
        let pairs = self
            .pairs
            .into_iter()
            .map(|p| ((p.actor, p.target), p))
            .collect();
        (agents, pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::feature::Direction;
    use crate::track::feature::Speed;
    use crate::track::motion::Motion;
    use chrono::TimeZone;
    use chrono::Utc;

    #[test]
    fn dataset_round_trips_through_json() {
        let at = |s| Utc.timestamp_opt(s, 0).unwrap();
        let dataset = Dataset {
            agents: vec![Agent::from((
                7,
                vec![Motion::new(at(0), at(10), Speed::Walk, Direction::Left)],
            ))],
            pairs: vec![],
        };
        let text = serde_json::to_string(&dataset).unwrap();
        let back: Dataset = serde_json::from_str(&text).unwrap();
        assert_eq!(back.agents, dataset.agents);
        let (agents, pairs) = back.into_maps();
        assert_eq!(agents[&7].blocks().len(), 1);
        assert!(pairs.is_empty());
    }
}

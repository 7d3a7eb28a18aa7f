use super::motion::Motion;
use super::slice::clip_blocks;
use crate::clock::Frame;
use crate::AgentId;
use crate::Delta;
use crate::Stamp;
use serde::Deserialize;
use serde::Serialize;

/// a semantically enriched trajectory: an identity plus a chronological,
/// non-overlapping (gaps allowed) list of feature blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    blocks: Vec<Motion>,
}

impl From<(AgentId, Vec<Motion>)> for Agent {
    fn from((id, blocks): (AgentId, Vec<Motion>)) -> Self {
        let mut agent = Self { id, blocks };
        agent.normalize();
        agent
    }
}

impl Agent {
    pub fn blocks(&self) -> &[Motion] {
        &self.blocks
    }
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// outer presence interval, gaps ignored
    pub fn frame(&self) -> Option<Frame> {
        match (self.blocks.first(), self.blocks.last()) {
            (Some(first), Some(last)) => Some(Frame::from((first.start, last.end))),
            _ => None,
        }
    }

    pub fn duration(&self) -> Delta {
        self.frame()
            .map(|f| f.duration())
            .unwrap_or_else(Delta::zero)
    }

    /// the block in effect at an instant, both endpoints inclusive
    pub fn at(&self, time: Stamp) -> Option<&Motion> {
        let index = self.blocks.partition_point(|b| b.start <= time);
        match index {
            0 => None,
            _ => Some(&self.blocks[index - 1]).filter(|b| time <= b.end),
        }
    }

    /// restrict the trajectory to a frame, truncating border blocks
    pub fn clip(&self, frame: &Frame) -> Self {
        Self {
            id: self.id,
            blocks: clip_blocks(&self.blocks, frame),
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.blocks.sort_by_key(|b| b.start);
    }
}

impl std::fmt::Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "agent {} ({} blocks)", self.id, self.blocks.len())
    }
}

use super::contact::Contact;
use super::slice::clip_blocks;
use crate::clock::Frame;
use crate::AgentId;
use serde::Deserialize;
use serde::Serialize;

/// a semantically enriched trajectory pair, stored per ordered
/// (actor, target) combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub actor: AgentId,
    pub target: AgentId,
    blocks: Vec<Contact>,
}

impl From<(AgentId, AgentId, Vec<Contact>)> for Pair {
    fn from((actor, target, blocks): (AgentId, AgentId, Vec<Contact>)) -> Self {
        let mut pair = Self {
            actor,
            target,
            blocks,
        };
        pair.normalize();
        pair
    }
}

impl Pair {
    pub fn blocks(&self) -> &[Contact] {
        &self.blocks
    }
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn clip(&self, frame: &Frame) -> Self {
        Self {
            actor: self.actor,
            target: self.target,
            blocks: clip_blocks(&self.blocks, frame),
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.blocks.sort_by_key(|b| b.start);
    }
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "pair {} -> {} ({} blocks)",
            self.actor,
            self.target,
            self.blocks.len()
        )
    }
}

use super::agent::Agent;
use super::contact::Contact;
use super::granulate::Granulate;
use super::motion::Motion;
use super::pair::Pair;
use super::slice::Slice;
use crate::Delta;
use crate::Stamp;
use std::collections::BTreeMap;

/// one granulated time slice across every considered stream: a block per
/// agent (in template-variable order) and an actor x target matrix of
/// pair blocks with a none diagonal
#[derive(Debug, Clone)]
pub struct Window {
    pub start: Stamp,
    pub motions: Vec<Option<Motion>>,
    pub contacts: Vec<Vec<Option<Contact>>>,
    pub duration: Delta,
}

/// single- and pair-blocks interleaved through one granulation so their
/// window boundaries line up
#[derive(Clone)]
enum Trace {
    Move(Motion),
    Link(Contact),
}

impl Slice for Trace {
    fn start(&self) -> Stamp {
        match self {
            Self::Move(b) => b.start,
            Self::Link(b) => b.start,
        }
    }
    fn end(&self) -> Stamp {
        match self {
            Self::Move(b) => b.end,
            Self::Link(b) => b.end,
        }
    }
    fn clip(&self, start: Stamp, end: Stamp) -> Self {
        match self {
            Self::Move(b) => Self::Move(b.clip(start, end)),
            Self::Link(b) => Self::Link(b.clip(start, end)),
        }
    }
}

/// granulate the selected agents and their pairs into aligned windows.
/// agents arrive in template-variable order and index the matrix.
pub fn cut_to_windows(
    agents: &[Agent],
    pairs: &[Pair],
    strip: bool,
    max_window: Delta,
) -> Vec<Window> {
    let n = agents.len();
    let index = agents
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id, i))
        .collect::<BTreeMap<_, _>>();
    let streams = agents
        .iter()
        .map(|a| a.blocks().iter().copied().map(Trace::Move).collect())
        .chain(
            pairs
                .iter()
                .map(|p| p.blocks().iter().copied().map(Trace::Link).collect()),
        )
        .collect::<Vec<Vec<Trace>>>();

    Granulate::new(streams, strip, max_window)
        .map(|(section, frame)| {
            let motions = section[..n]
                .iter()
                .map(|t| match t {
                    Some(Trace::Move(b)) => Some(*b),
                    _ => None,
                })
                .collect();
            let mut contacts = vec![vec![None; n]; n];
            for (pair, entry) in pairs.iter().zip(section[n..].iter()) {
                if let Some(Trace::Link(block)) = entry {
                    let actor = index[&pair.actor];
                    let target = index[&pair.target];
                    contacts[actor][target] = Some(*block);
                }
            }
            Window {
                start: frame.start,
                motions,
                contacts,
                duration: frame.duration(),
            }
        })
        .collect()
}

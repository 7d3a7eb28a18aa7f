use super::feature::Direction;
use super::feature::Distance;
use super::feature::DistanceChange;
use super::feature::MutualDirection;
use super::slice::Slice;
use crate::Stamp;
use serde::Deserialize;
use serde::Serialize;

/// feature values of one ordered agent pair over one segment.
/// `intended` and `relative` describe the actor against the target;
/// `actual`, `mutual` and `distance` are symmetric readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub start: Stamp,
    pub end: Stamp,
    pub intended: DistanceChange,
    pub actual: DistanceChange,
    pub relative: Direction,
    pub mutual: MutualDirection,
    pub distance: Distance,
}

impl Slice for Contact {
    fn start(&self) -> Stamp {
        self.start
    }
    fn end(&self) -> Stamp {
        self.end
    }
    fn clip(&self, start: Stamp, end: Stamp) -> Self {
        Self {
            start: start.max(self.start),
            end: end.min(self.end),
            ..*self
        }
    }
}
